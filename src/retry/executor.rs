//! The async retry loop.

use std::future::Future;

use tokio::time::Instant;

use crate::cancel::CancellationToken;
use crate::retry::{RetryError, RetryEvent, RetryExhausted, RetryPolicy};

/// Run `make_attempt` until it succeeds, the policy runs out of retries, the
/// predicate rejects an error, or `cancel` fires.
///
/// Each attempt calls `make_attempt` afresh. `should_retry` decides whether a
/// failure is transient. `on_retry` is invoked once per retry, after the delay
/// is computed and before sleeping; it is meant for logging.
///
/// Cancellation is checked before every attempt, and both the in-flight
/// attempt and the backoff sleep are raced against it.
///
/// # Example
///
/// ```rust
/// use database_setup::{retry, CancellationToken, RetryPolicy};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let mut calls = 0;
/// let result = retry(
///     &RetryPolicy::constant(Duration::from_millis(1)).with_max_retries(3),
///     &CancellationToken::new(),
///     || {
///         calls += 1;
///         let n = calls;
///         async move { if n < 3 { Err("busy") } else { Ok(n) } }
///     },
///     |_err| true,
///     |_event| {},
/// )
/// .await;
///
/// assert_eq!(result, Ok(3));
/// # });
/// ```
pub async fn retry<T, E, F, Fut, P, H>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut make_attempt: F,
    should_retry: P,
    on_retry: H,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    H: Fn(&RetryEvent<'_, E>),
{
    let start = Instant::now();
    let mut attempt = 0u32;

    loop {
        if cancel.is_cancelled() {
            return Err(RetryError::Cancelled);
        }

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RetryError::Cancelled),
            outcome = make_attempt() => outcome,
        };

        let error = match outcome {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if !should_retry(&error) {
            return Err(RetryError::Rejected {
                attempt: attempt + 1,
                error,
            });
        }

        let Some(delay) = policy.delay_with_jitter(attempt) else {
            return Err(RetryError::Exhausted(RetryExhausted::new(
                error,
                attempt + 1,
                start.elapsed(),
            )));
        };

        on_retry(&RetryEvent {
            attempt: attempt + 1,
            error: &error,
            next_delay: delay,
            elapsed: start.elapsed(),
        });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RetryError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }

        attempt += 1;
    }
}
