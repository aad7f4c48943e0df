//! Client-side request rate limiting.
//!
//! [`RateLimiter`] is a token bucket with a capacity of one token that refills
//! at the configured requests-per-second. Callers reserve the next free slot
//! under a short lock and then sleep outside of it, so only the calling task
//! waits. An idle limiter admits the next request immediately; there is never
//! a burst above one request.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use epub_downloader::api::RateLimiter;
//!
//! # async fn example() {
//! let limiter = Arc::new(RateLimiter::new(10));
//!
//! // Admitted immediately.
//! limiter.acquire(None).await.unwrap();
//!
//! // Admitted 100ms after the first one.
//! limiter.acquire(None).await.unwrap();
//! # }
//! ```

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use crate::errors::{AppError, ErrorCode, StructuredError};

/// Maximum Retry-After value (1 hour) to prevent excessive delays.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);

/// Shared request limiter.
///
/// `RateLimiter` is `Send + Sync`; wrap it in `Arc` to share it between tasks.
/// Admission order between concurrent waiters is not guaranteed to be FIFO,
/// only the rate ceiling is.
#[derive(Debug)]
pub struct RateLimiter {
    /// Time between two admitted requests.
    interval: Duration,

    /// Earliest instant the next request may be admitted.
    /// `None` until the first request.
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter admitting `requests_per_second` requests per second.
    /// A rate of zero is treated as one.
    #[must_use]
    #[instrument]
    pub fn new(requests_per_second: u32) -> Self {
        let rps = requests_per_second.max(1);
        debug!(rps, "creating rate limiter");
        Self {
            interval: Duration::from_secs(1) / rps,
            next_slot: Mutex::new(None),
        }
    }

    /// Returns the minimum spacing between admitted requests.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits for permission to send one request.
    ///
    /// When `deadline` is set and the next slot falls after it, fails at once
    /// without consuming the slot.
    ///
    /// # Errors
    ///
    /// Returns a retryable `NET_003` error when the slot cannot be granted
    /// before `deadline`.
    #[instrument(level = "debug", skip(self))]
    pub async fn acquire(&self, deadline: Option<Instant>) -> Result<(), AppError> {
        let slot = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = next_slot.map_or(now, |next| next.max(now));

            if let Some(deadline) = deadline
                && slot > deadline
            {
                warn!(
                    wait_ms = slot.saturating_duration_since(now).as_millis(),
                    "rate limiter wait exceeds deadline"
                );
                return Err(StructuredError::new(
                    ErrorCode::RateLimit,
                    "rate limiter wait canceled: deadline would be exceeded",
                    StructuredError::rate_limit().user_message(),
                    true,
                )
                .into());
            }

            *next_slot = Some(slot + self.interval);
            slot
        };

        let wait = slot.saturating_duration_since(Instant::now());
        if !wait.is_zero() {
            debug!(delay_ms = wait.as_millis(), "applying rate limit delay");
            tokio::time::sleep_until(slot).await;
        }
        Ok(())
    }
}

/// Parses a Retry-After header value into a Duration.
///
/// Supports integer seconds (`120`) and HTTP-dates
/// (`Wed, 21 Oct 2025 07:28:00 GMT`). Returns `None` if the value cannot be
/// parsed. Caps excessive values at 1 hour.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use epub_downloader::api::parse_retry_after;
///
/// assert_eq!(parse_retry_after("120"), Some(Duration::from_secs(120)));
/// assert_eq!(parse_retry_after("invalid"), None);
/// ```
#[must_use]
#[instrument(level = "debug")]
pub fn parse_retry_after(header_value: &str) -> Option<Duration> {
    let header_value = header_value.trim();

    if let Ok(seconds) = header_value.parse::<i64>() {
        if seconds < 0 {
            debug!(seconds, "negative Retry-After value, ignoring");
            return None;
        }

        #[allow(clippy::cast_sign_loss)]
        let duration = Duration::from_secs(seconds as u64);
        return Some(duration.min(MAX_RETRY_AFTER));
    }

    let Ok(datetime) = httpdate::parse_http_date(header_value) else {
        debug!(header_value, "unparseable Retry-After value");
        return None;
    };

    // A date in the past means "retry now".
    let duration = datetime
        .duration_since(std::time::SystemTime::now())
        .unwrap_or(Duration::ZERO);
    Some(duration.min(MAX_RETRY_AFTER))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_rate_limiter_interval_from_rps() {
        assert_eq!(RateLimiter::new(10).interval(), Duration::from_millis(100));
        assert_eq!(RateLimiter::new(1).interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_rate_limiter_zero_rps_treated_as_one() {
        assert_eq!(RateLimiter::new(0).interval(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_rate_limiter_first_request_no_delay() {
        tokio::time::pause();

        let limiter = RateLimiter::new(1);
        let start = Instant::now();
        limiter.acquire(None).await.unwrap();

        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_rate_limiter_thirty_acquisitions_take_at_least_2_9_seconds() {
        tokio::time::pause();

        let limiter = RateLimiter::new(10);
        let start = Instant::now();
        let mut admitted = Vec::with_capacity(30);
        for _ in 0..30 {
            limiter.acquire(None).await.unwrap();
            admitted.push(Instant::now());
        }

        assert!(start.elapsed() >= Duration::from_millis(2900));
        for pair in admitted.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(100));
        }
    }

    #[tokio::test]
    async fn test_rate_limiter_concurrent_tasks_are_spaced() {
        tokio::time::pause();

        let limiter = Arc::new(RateLimiter::new(10));
        let start = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..10 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter.acquire(None).await.unwrap();
                Instant::now()
            }));
        }

        let mut admitted = Vec::new();
        for handle in handles {
            admitted.push(handle.await.unwrap());
        }
        admitted.sort();

        assert!(start.elapsed() >= Duration::from_millis(900));
        for pair in admitted.windows(2) {
            assert_ne!(pair[0], pair[1], "two requests admitted at the same instant");
        }
    }

    #[tokio::test]
    async fn test_rate_limiter_idle_bucket_refills_to_one_token() {
        tokio::time::pause();

        let limiter = RateLimiter::new(10);
        limiter.acquire(None).await.unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;

        // After idling only one request is immediate, the next one waits.
        let start = Instant::now();
        limiter.acquire(None).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(10));
        limiter.acquire(None).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_rate_limiter_deadline_exceeded_fails_with_rate_limit() {
        tokio::time::pause();

        let limiter = RateLimiter::new(1);
        limiter.acquire(None).await.unwrap();

        let deadline = Instant::now() + Duration::from_millis(500);
        let err = limiter.acquire(Some(deadline)).await.unwrap_err();
        assert_eq!(err.code(), "NET_003");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_rate_limiter_failed_acquire_does_not_consume_slot() {
        tokio::time::pause();

        let limiter = RateLimiter::new(1);
        limiter.acquire(None).await.unwrap();
        let deadline = Instant::now() + Duration::from_millis(10);
        assert!(limiter.acquire(Some(deadline)).await.is_err());

        let start = Instant::now();
        limiter.acquire(None).await.unwrap();
        // A consumed slot would push the wait out to two seconds.
        assert!(start.elapsed() < Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_rate_limiter_deadline_within_wait_succeeds() {
        tokio::time::pause();

        let limiter = RateLimiter::new(10);
        limiter.acquire(None).await.unwrap();

        let deadline = Instant::now() + Duration::from_secs(1);
        limiter.acquire(Some(deadline)).await.unwrap();
    }

    #[test]
    fn test_parse_retry_after_seconds() {
        assert_eq!(parse_retry_after("120"), Some(Duration::from_secs(120)));
        assert_eq!(parse_retry_after(" 5 "), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_parse_retry_after_negative() {
        assert_eq!(parse_retry_after("-5"), None);
    }

    #[test]
    fn test_parse_retry_after_caps_at_one_hour() {
        assert_eq!(parse_retry_after("999999"), Some(MAX_RETRY_AFTER));
    }

    #[test]
    fn test_parse_retry_after_past_http_date_is_zero() {
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_parse_retry_after_garbage() {
        assert_eq!(parse_retry_after("soon"), None);
    }
}
