//! Retry policy types and configuration.

use std::time::Duration;

/// A retry policy describing how to retry a failed store call.
///
/// Policies are pure data. They describe the backoff schedule but never sleep
/// or call anything themselves, so they are cheap to clone and easy to test.
///
/// # Bounds Behavior
///
/// [`validate`](Self::validate) only passes when `max_retries` is set. A
/// `max_delay` cap limits each delay but not the number of attempts.
///
/// # Examples
///
/// ```rust
/// use database_setup::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::exponential(Duration::from_secs(2))
///     .with_max_retries(5);
///
/// assert_eq!(policy.max_retries(), Some(5));
/// assert_eq!(policy.delay_for_attempt(0), Some(Duration::from_secs(2)));
/// assert_eq!(policy.delay_for_attempt(4), Some(Duration::from_secs(32)));
/// assert_eq!(policy.delay_for_attempt(5), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    strategy: RetryStrategy,
    max_retries: Option<u32>,
    max_delay: Option<Duration>,
    jitter: JitterStrategy,
}

/// The backoff strategy for retry delays.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryStrategy {
    /// Fixed delay between attempts.
    Constant(Duration),
    /// Delay doubles: base * 2^attempt.
    Exponential {
        /// Base delay duration.
        base: Duration,
    },
}

/// Strategy for adding randomness to delays.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JitterStrategy {
    /// No jitter applied.
    #[default]
    None,
    /// Add a uniformly random duration in `[0, bound)` on top of the delay.
    Additive(Duration),
}

/// Information about a failed attempt, passed to the retry hook.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, E> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The error from the failed attempt.
    pub error: &'a E,
    /// Delay before the next attempt.
    pub next_delay: Duration,
    /// Total elapsed time since the first attempt.
    pub elapsed: Duration,
}

impl RetryPolicy {
    /// The policy used for create-if-absent: 5 retries, `2^n` seconds plus up
    /// to one second of jitter before retry `n`.
    ///
    /// ```rust
    /// use database_setup::{JitterStrategy, RetryPolicy};
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::database_default();
    /// assert_eq!(policy.max_retries(), Some(5));
    /// assert_eq!(policy.jitter(), &JitterStrategy::Additive(Duration::from_secs(1)));
    /// ```
    pub fn database_default() -> Self {
        Self::exponential(Duration::from_secs(2))
            .with_max_retries(5)
            .with_additive_jitter(Duration::from_secs(1))
    }

    /// Create a policy with constant delay between retries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use database_setup::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::constant(Duration::from_millis(500))
    ///     .with_max_retries(3);
    ///
    /// assert_eq!(policy.delay_for_attempt(0), Some(Duration::from_millis(500)));
    /// assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(500)));
    /// assert_eq!(policy.delay_for_attempt(3), None);
    /// ```
    pub fn constant(delay: Duration) -> Self {
        Self {
            strategy: RetryStrategy::Constant(delay),
            max_retries: None,
            max_delay: None,
            jitter: JitterStrategy::None,
        }
    }

    /// Create a policy with exponentially increasing delay.
    ///
    /// Delay = base * 2^attempt
    pub fn exponential(base: Duration) -> Self {
        Self {
            strategy: RetryStrategy::Exponential { base },
            max_retries: None,
            max_delay: None,
            jitter: JitterStrategy::None,
        }
    }

    /// Set the maximum number of retry attempts.
    ///
    /// This does not include the initial attempt. `with_max_retries(5)` means
    /// up to 6 total attempts.
    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    /// Set the maximum delay cap.
    ///
    /// The cap applies to the backoff before jitter is added, so the jitter
    /// bound always stays visible in the final delay.
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = Some(d);
        self
    }

    /// Add a uniformly random `[0, bound)` duration to each delay.
    pub fn with_additive_jitter(mut self, bound: Duration) -> Self {
        self.jitter = JitterStrategy::Additive(bound);
        self
    }

    /// Remove any jitter from the policy.
    pub fn without_jitter(mut self) -> Self {
        self.jitter = JitterStrategy::None;
        self
    }

    /// Get the maximum number of retries.
    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    /// Get the maximum delay cap.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Get the jitter strategy.
    pub fn jitter(&self) -> &JitterStrategy {
        &self.jitter
    }

    /// Get the retry strategy.
    pub fn strategy(&self) -> &RetryStrategy {
        &self.strategy
    }

    /// Calculate the delay before retry N (0-indexed), without jitter.
    ///
    /// Returns None if no more retries should be attempted.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if let Some(max) = self.max_retries {
            if attempt >= max {
                return None;
            }
        }

        let base_delay = match &self.strategy {
            RetryStrategy::Constant(d) => *d,
            RetryStrategy::Exponential { base } => {
                base.saturating_mul(2u32.saturating_pow(attempt))
            }
        };

        let capped = match self.max_delay {
            Some(max) => base_delay.min(max),
            None => base_delay,
        };

        Some(capped)
    }

    /// Calculate the delay before retry N (0-indexed) with jitter applied.
    pub fn delay_with_jitter(&self, attempt: u32) -> Option<Duration> {
        let base_delay = self.delay_for_attempt(attempt)?;
        Some(self.jitter.apply(base_delay))
    }

    /// Validate that the policy bounds the number of attempts.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_retries.is_none() {
            Err("RetryPolicy must set max_retries")
        } else {
            Ok(())
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::database_default()
    }
}

impl JitterStrategy {
    /// Apply jitter to a base delay.
    pub fn apply(&self, base_delay: Duration) -> Duration {
        match self {
            JitterStrategy::None => base_delay,
            JitterStrategy::Additive(bound) => {
                use rand::Rng;
                let bound_nanos = u64::try_from(bound.as_nanos()).unwrap_or(u64::MAX);
                if bound_nanos == 0 {
                    base_delay
                } else {
                    let extra = rand::rng().random_range(0..bound_nanos);
                    base_delay.saturating_add(Duration::from_nanos(extra))
                }
            }
        }
    }
}
