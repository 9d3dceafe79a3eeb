//! Bounded retry with exponential backoff and jitter.
//!
//! - **Pure data**: [`RetryPolicy`] describes the schedule and never sleeps
//! - **Explicit loop**: [`retry`] drives attempts, honours a
//!   [`CancellationToken`](crate::CancellationToken) and reports every retry
//!   through a hook
//!
//! # Quick Start
//!
//! ```rust
//! use database_setup::{retry, CancellationToken, RetryError, RetryPolicy};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let policy = RetryPolicy::constant(Duration::from_millis(1)).with_max_retries(2);
//!
//! let result: Result<(), _> = retry(
//!     &policy,
//!     &CancellationToken::new(),
//!     || async { Err("always fails") },
//!     |_err| true,
//!     |_event| {},
//! )
//! .await;
//!
//! match result {
//!     Err(RetryError::Exhausted(exhausted)) => assert_eq!(exhausted.attempts, 3),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! # });
//! ```
//!
//! # Backoff
//!
//! - **Constant**: fixed delay between retries
//! - **Exponential**: delay doubles each retry (2s, 4s, 8s, ...)
//!
//! [`JitterStrategy::Additive`] adds a uniformly random `[0, bound)` on top of
//! the computed delay so that many callers restarting together do not retry
//! in lockstep.

mod error;
mod executor;
mod policy;

pub use error::{RetryError, RetryExhausted};
pub use executor::retry;
pub use policy::{JitterStrategy, RetryEvent, RetryPolicy, RetryStrategy};

#[cfg(test)]
mod tests;
