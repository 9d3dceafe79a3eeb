//! Error types for retry operations.

use std::time::Duration;

/// Error returned when all retry attempts are exhausted.
///
/// Contains the final error along with metadata about the retry sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    /// The error from the final attempt.
    pub final_error: E,
    /// Total number of attempts made (initial + retries).
    pub attempts: u32,
    /// Total time spent, including backoff.
    pub total_duration: Duration,
}

impl<E> RetryExhausted<E> {
    /// Create a new RetryExhausted error.
    pub fn new(final_error: E, attempts: u32, total_duration: Duration) -> Self {
        Self {
            final_error,
            attempts,
            total_duration,
        }
    }

    /// Extract the final error, discarding metadata.
    pub fn into_error(self) -> E {
        self.final_error
    }

    /// Get a reference to the final error.
    pub fn error(&self) -> &E {
        &self.final_error
    }
}

impl<E: std::fmt::Display> std::fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "retry exhausted after {} attempts ({:?}): {}",
            self.attempts, self.total_duration, self.final_error
        )
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryExhausted<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.final_error)
    }
}

/// Why [`retry`](super::retry) gave up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetryError<E> {
    /// The cancellation token fired before or during an attempt or backoff.
    #[error("operation cancelled")]
    Cancelled,

    /// The predicate classified the error as not worth retrying.
    #[error("non-retryable failure on attempt {attempt}: {error}")]
    Rejected {
        /// The failing attempt (1-indexed).
        attempt: u32,
        /// The error returned by that attempt.
        error: E,
    },

    /// Every attempt allowed by the policy failed.
    #[error("{0}")]
    Exhausted(RetryExhausted<E>),
}

impl<E> RetryError<E> {
    /// Returns true if the retry loop stopped because of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns the last error observed, if any attempt completed.
    pub fn last_error(&self) -> Option<&E> {
        match self {
            Self::Cancelled => None,
            Self::Rejected { error, .. } => Some(error),
            Self::Exhausted(exhausted) => Some(exhausted.error()),
        }
    }
}
