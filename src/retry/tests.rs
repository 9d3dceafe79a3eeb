//! Tests for the retry loop.

use super::*;
use crate::CancellationToken;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, PartialEq, Clone)]
enum TestError {
    Transient,
    Permanent,
}

fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy::constant(Duration::from_millis(1)).with_max_retries(max_retries)
}

#[tokio::test]
async fn test_retry_succeeds_on_third_attempt() {
    let attempts = AtomicU32::new(0);

    let result = retry(
        &fast_policy(5),
        &CancellationToken::new(),
        || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(TestError::Transient)
                } else {
                    Ok("success")
                }
            }
        },
        |_| true,
        |_| {},
    )
    .await;

    assert_eq!(result, Ok("success"));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_exhausted_returns_final_error() {
    let attempts = AtomicU32::new(0);

    let result: Result<(), _> = retry(
        &fast_policy(3),
        &CancellationToken::new(),
        || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError::Transient) }
        },
        |_| true,
        |_| {},
    )
    .await;

    match result {
        Err(RetryError::Exhausted(exhausted)) => {
            assert_eq!(exhausted.attempts, 4); // 1 initial + 3 retries
            assert_eq!(exhausted.final_error, TestError::Transient);
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_non_retryable_error_stops_immediately() {
    let attempts = AtomicU32::new(0);
    let hook_calls = AtomicU32::new(0);

    let result: Result<(), _> = retry(
        &fast_policy(5),
        &CancellationToken::new(),
        || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError::Permanent) }
        },
        |err| matches!(err, TestError::Transient),
        |_| {
            hook_calls.fetch_add(1, Ordering::SeqCst);
        },
    )
    .await;

    assert_eq!(
        result,
        Err(RetryError::Rejected {
            attempt: 1,
            error: TestError::Permanent
        })
    );
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(hook_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_hook_called_before_each_retry() {
    let attempts = AtomicU32::new(0);
    let events = Mutex::new(Vec::new());

    let result = retry(
        &fast_policy(5),
        &CancellationToken::new(),
        || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(TestError::Transient)
                } else {
                    Ok(n)
                }
            }
        },
        |_| true,
        |event: &RetryEvent<'_, TestError>| {
            events
                .lock()
                .unwrap()
                .push((event.attempt, event.next_delay));
        },
    )
    .await;

    assert_eq!(result, Ok(2));
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            (1, Duration::from_millis(1)),
            (2, Duration::from_millis(1))
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_exponential_backoff_timing() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let policy = RetryPolicy::exponential(Duration::from_secs(2)).with_max_retries(3);

    let result: Result<(), _> = retry(
        &policy,
        &CancellationToken::new(),
        || {
            calls.lock().unwrap().push(tokio::time::Instant::now());
            async { Err(TestError::Transient) }
        },
        |_| true,
        |_| {},
    )
    .await;

    assert!(matches!(result, Err(RetryError::Exhausted(_))));

    let calls = calls.lock().unwrap();
    let gaps: Vec<_> = calls.windows(2).map(|w| w[1] - w[0]).collect();
    assert_eq!(
        gaps,
        vec![
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(8)
        ]
    );
}

#[tokio::test]
async fn test_cancelled_before_first_attempt() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let attempts = AtomicU32::new(0);

    let result: Result<(), RetryError<TestError>> = retry(
        &fast_policy(5),
        &cancel,
        || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        },
        |_| true,
        |_| {},
    )
    .await;

    assert_eq!(result, Err(RetryError::Cancelled));
    assert_eq!(attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_during_backoff_stops_retrying() {
    let cancel = CancellationToken::new();
    let attempts = Arc::new(AtomicU32::new(0));

    let task = {
        let cancel = cancel.clone();
        let attempts = attempts.clone();
        tokio::spawn(async move {
            retry(
                &RetryPolicy::constant(Duration::from_secs(30)).with_max_retries(5),
                &cancel,
                || {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    async { Err::<(), _>(TestError::Transient) }
                },
                |_| true,
                |_| {},
            )
            .await
        })
    };

    tokio::time::sleep(Duration::from_secs(1)).await;
    cancel.cancel();

    let result = task.await.unwrap();
    assert_eq!(result, Err(RetryError::Cancelled));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_during_attempt() {
    let cancel = CancellationToken::new();

    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            retry(
                &fast_policy(5),
                &cancel,
                || std::future::pending::<Result<(), TestError>>(),
                |_| true,
                |_| {},
            )
            .await
        })
    };

    tokio::time::sleep(Duration::from_secs(5)).await;
    cancel.cancel();

    assert_eq!(task.await.unwrap(), Err(RetryError::Cancelled));
}
