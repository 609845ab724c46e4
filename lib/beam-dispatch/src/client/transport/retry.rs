use std::time::Duration;

use backon::ExponentialBuilder;

/// Exponential backoff applied to connection-level failures.
///
/// Only failures where no response was received are retried, see
/// [`TransportError::is_retryable`](super::TransportError::is_retryable). A response with an
/// error status is always returned as is.
///
/// ```rust
/// use std::time::Duration;
/// use beam_dispatch::RetryPolicy;
///
/// let policy = RetryPolicy::default()
///     .with_max_times(5)
///     .with_min_delay(Duration::from_millis(50))
///     .with_jitter(true);
/// assert_eq!(policy.max_times(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    min_delay: Duration,
    max_delay: Duration,
    max_times: usize,
    jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            max_times: 3,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// Delay before the first retry.
    #[must_use]
    pub fn with_min_delay(mut self, min_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self
    }

    /// Upper bound of the delay between two attempts.
    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Number of retries after the first attempt.
    #[must_use]
    pub fn with_max_times(mut self, max_times: usize) -> Self {
        self.max_times = max_times;
        self
    }

    /// Randomizes delays to spread the retries of concurrent callers.
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Number of retries after the first attempt.
    pub fn max_times(&self) -> usize {
        self.max_times
    }

    pub(super) fn backoff(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_times);

        if self.jitter {
            builder.with_jitter()
        } else {
            builder
        }
    }
}
