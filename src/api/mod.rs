//! Content service API client.
//!
//! # Overview
//!
//! - [`ApiClient`] sends authenticated requests through a shared
//!   [`RateLimiter`] and classifies failures into structured errors.
//! - [`ApiClient::validate_session`] checks the imported cookies against the
//!   profile endpoint and returns the [`UserProfile`].
//! - [`RetryPolicy`] retries transient failures with exponential backoff.
//! - [`Session`] pairs a validated client with its profile.

mod client;
mod profile;
mod rate_limiter;
mod retry;
mod session;

pub use client::{
    ApiClient, BROWSER_USER_AGENT, DEFAULT_BASE_URL, DEFAULT_REQUESTS_PER_SECOND, REQUEST_TIMEOUT,
};
pub use profile::{Subscription, UserProfile};
pub use rate_limiter::{RateLimiter, parse_retry_after};
pub use retry::{DEFAULT_MAX_ATTEMPTS, RetryDecision, RetryPolicy};
pub use session::Session;
