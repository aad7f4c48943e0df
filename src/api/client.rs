//! Authenticated, rate-limited HTTP client for the content service.
//!
//! Every request first takes a token from the shared [`RateLimiter`], then
//! goes out with browser-like headers and the imported session cookies.
//! Failures are classified into structured errors where they are detected.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, RETRY_AFTER};
use reqwest::{Client, Method, Response, StatusCode};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::profile::UserProfile;
use super::rate_limiter::{RateLimiter, parse_retry_after};
use crate::auth::{Cookie, load_cookies_into_jar};
use crate::errors::{AppError, ErrorCode, StructuredError};

/// Service origin all requests are sent to.
pub const DEFAULT_BASE_URL: &str = "https://learning.oreilly.com";

/// Browser User-Agent sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default requests per second admitted by the limiter.
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;

/// Fixed timeout applied to every request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Profile endpoint used to validate a session.
const PROFILE_PATH: &str = "/api/v1/me/";

const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";

/// HTTP client bound to one service origin and one set of session cookies.
///
/// Cloning is cheap and clones share the connection pool, cookie jar and rate
/// limiter.
///
/// # Example
///
/// ```no_run
/// use epub_downloader::api::ApiClient;
/// use epub_downloader::auth::parse_cookies_json;
///
/// # async fn example() -> Result<(), epub_downloader::errors::AppError> {
/// let cookies = parse_cookies_json(r#"[{"name": "orm-jwt", "value": "..."}]"#)?;
/// let client = ApiClient::new(&cookies, 10)?;
/// let profile = client.validate_session(None).await?;
/// println!("signed in as {}", profile.display_name());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    limiter: Arc<RateLimiter>,
}

impl ApiClient {
    /// Creates a client for the default service origin.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(cookies: &[Cookie], requests_per_second: u32) -> Result<Self, AppError> {
        Self::with_base_url(DEFAULT_BASE_URL, cookies, requests_per_second)
    }

    /// Creates a client for `base_url`, binding `cookies` to that origin.
    ///
    /// # Errors
    ///
    /// Returns `CFG_001` when `base_url` is not a valid URL, or `NET_001` when
    /// the HTTP client cannot be built.
    #[instrument(level = "debug", skip(cookies), fields(cookie_count = cookies.len()))]
    pub fn with_base_url(
        base_url: &str,
        cookies: &[Cookie],
        requests_per_second: u32,
    ) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            StructuredError::new(
                ErrorCode::Config,
                format!("invalid base URL: {base_url}"),
                "",
                false,
            )
            .with_cause(e)
        })?;

        let jar = load_cookies_into_jar(cookies, &base_url);
        let http = Client::builder()
            .cookie_provider(jar)
            .timeout(REQUEST_TIMEOUT)
            .gzip(true)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(|e| {
                StructuredError::new(
                    ErrorCode::Network,
                    "failed to build HTTP client",
                    "",
                    false,
                )
                .with_cause(e)
            })?;

        debug!(base_url = %base_url, rps = requests_per_second, "created API client");
        Ok(Self {
            http,
            base_url,
            limiter: Arc::new(RateLimiter::new(requests_per_second)),
        })
    }

    /// Returns the service origin.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the shared limiter.
    #[must_use]
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Sends a request to `path` (relative to the service origin).
    ///
    /// Waits for a limiter token first; the wait and the request are bounded
    /// by `deadline` when set. Any HTTP status is returned as a response.
    ///
    /// # Errors
    ///
    /// - `NET_003` when the limiter cannot admit the request before `deadline`
    /// - `NET_004` when the request times out
    /// - `NET_001` for other transport failures
    #[instrument(skip(self), fields(method = %method))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        deadline: Option<Instant>,
    ) -> Result<Response, AppError> {
        self.limiter.acquire(deadline).await?;

        let url = self.endpoint(path)?;
        let mut builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json")
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE);

        if let Some(deadline) = deadline {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(StructuredError::timeout().into());
            }
            builder = builder.timeout(remaining.min(REQUEST_TIMEOUT));
        }

        let response = builder.send().await.map_err(classify_transport_error)?;
        debug!(status = response.status().as_u16(), "received response");
        Ok(response)
    }

    /// Validates the session by fetching the account profile.
    ///
    /// The profile is fetched fresh on every call. The body is decoded before
    /// the subscription is checked.
    ///
    /// # Errors
    ///
    /// - `AUTH_001` when the server answers 401
    /// - `AUTH_002` when the server answers 403
    /// - `NET_003` when the server answers 429
    /// - `NET_002` for any other non-200 status (retryable) or an undecodable
    ///   body (not retryable)
    /// - `AUTH_003` when the subscription is inactive
    /// - any error from [`ApiClient::request`]
    #[instrument(skip(self))]
    pub async fn validate_session(
        &self,
        deadline: Option<Instant>,
    ) -> Result<UserProfile, AppError> {
        let response = self.request(Method::GET, PROFILE_PATH, deadline).await?;
        let status = response.status();

        match status {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => {
                warn!("session rejected by server");
                return Err(StructuredError::session_expired().into());
            }
            StatusCode::FORBIDDEN => {
                warn!("credentials refused by server");
                return Err(StructuredError::invalid_credentials().into());
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(parse_retry_after);
                warn!(retry_after_secs = retry_after.map(|d| d.as_secs()), "rate limited by server");
                let message = match retry_after {
                    Some(delay) => format!(
                        "rate limited by server (retry after {}s)",
                        delay.as_secs()
                    ),
                    None => "rate limited by server".to_string(),
                };
                return Err(StructuredError::new(
                    ErrorCode::RateLimit,
                    message,
                    StructuredError::rate_limit().user_message(),
                    true,
                )
                .into());
            }
            other => {
                warn!(status = other.as_u16(), "unexpected status from profile endpoint");
                return Err(StructuredError::new(
                    ErrorCode::Api,
                    format!("unexpected status code: {}", other.as_u16()),
                    "The server returned an unexpected response. Try again later.",
                    true,
                )
                .into());
            }
        }

        let body = response.bytes().await.map_err(classify_transport_error)?;
        let profile: UserProfile = serde_json::from_slice(&body).map_err(|e| {
            StructuredError::new(
                ErrorCode::Api,
                "failed to decode profile response",
                "The server returned an unexpected response.",
                false,
            )
            .with_cause(e)
        })?;

        if !profile.subscription.active {
            warn!("account has no active subscription");
            return Err(StructuredError::no_subscription().into());
        }

        info!(user = %profile.username, "session validated");
        Ok(profile)
    }

    fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|e| {
            StructuredError::new(
                ErrorCode::InvalidInput,
                format!("invalid request path: {path}"),
                "",
                false,
            )
            .with_cause(e)
            .into()
        })
    }
}

fn classify_transport_error(error: reqwest::Error) -> AppError {
    if error.is_timeout() {
        warn!(error = %error, "request timed out");
        StructuredError::timeout().with_cause(error).into()
    } else {
        warn!(error = %error, "request failed");
        StructuredError::network().with_cause(error).into()
    }
}
