//! Structured application errors.
//!
//! Every fallible operation in the client and the UI returns an [`AppError`]
//! rather than a raw transport or I/O error. A structured error separates
//! three concerns:
//!
//! - *what failed* ([`ErrorCode`], stable, for branching and log correlation),
//! - *what to tell the user* ([`StructuredError::user_message`]),
//! - *whether an automatic retry may help* ([`StructuredError::is_retryable`]).
//!
//! Errors are classified once, where the failure is detected, and then travel
//! up unchanged. The free functions [`is_retryable`], [`user_message`] and
//! [`code`] accept any `std::error::Error` and search its source chain, so
//! callers never need to type-test at each call site.
//!
//! # Example
//!
//! ```
//! use epub_downloader::errors::{self, ErrorCode, StructuredError};
//!
//! let io = std::io::Error::other("disk full");
//! let err = errors::wrap(
//!     Some(io),
//!     ErrorCode::File,
//!     "failed to write cookies file",
//!     "Could not save your session.",
//!     false,
//! )
//! .unwrap();
//!
//! assert_eq!(err.code(), ErrorCode::File);
//! assert_eq!(errors::code(&err), "STOR_002");
//! assert!(!errors::is_retryable(&err));
//! ```

mod code;

use std::error::Error as StdError;
use std::fmt;

pub use code::{ErrorCategory, ErrorCode};

/// Boxed, thread-safe error used for wrapped causes.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// An error carrying a stable code, technical and user-facing messages, and a
/// retryability flag fixed at construction.
#[derive(Debug)]
pub struct StructuredError {
    code: ErrorCode,
    message: String,
    user_message: String,
    retryable: bool,
    cause: Option<BoxError>,
}

impl StructuredError {
    /// Creates a structured error without an underlying cause.
    pub fn new(
        code: ErrorCode,
        message: impl Into<String>,
        user_message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            user_message: user_message.into(),
            retryable,
            cause: None,
        }
    }

    /// Attaches an underlying cause.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Returns the taxonomy code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Returns the technical message intended for logs.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the message to display, falling back to the technical message.
    #[must_use]
    pub fn user_message(&self) -> &str {
        if self.user_message.is_empty() {
            &self.message
        } else {
            &self.user_message
        }
    }

    /// Returns whether an automatic retry may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// Returns the wrapped cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Session has expired or is invalid.
    #[must_use]
    pub fn session_expired() -> Self {
        Self::new(
            ErrorCode::SessionExpired,
            "Session has expired or is invalid",
            "Your session has expired. Please enter your cookies again.",
            false,
        )
    }

    /// Credentials were rejected.
    #[must_use]
    pub fn invalid_credentials() -> Self {
        Self::new(
            ErrorCode::InvalidCredentials,
            "Invalid authentication credentials",
            "The provided credentials are not valid.",
            false,
        )
    }

    /// The account has no active subscription.
    #[must_use]
    pub fn no_subscription() -> Self {
        Self::new(
            ErrorCode::NoSubscription,
            "Active O'Reilly subscription required",
            "You need an active O'Reilly subscription to use this feature.",
            false,
        )
    }

    /// Imported cookies are malformed or incomplete.
    #[must_use]
    pub fn invalid_cookies() -> Self {
        Self::new(
            ErrorCode::InvalidCookies,
            "Cookies format is invalid or incomplete",
            "The cookies format is invalid. Verify that they are valid cookies from learning.oreilly.com",
            false,
        )
    }

    /// Network connection failure.
    #[must_use]
    pub fn network() -> Self {
        Self::new(
            ErrorCode::Network,
            "Network connection error",
            "Connection error. Check your internet connection and try again.",
            true,
        )
    }

    /// Rate limit exceeded.
    #[must_use]
    pub fn rate_limit() -> Self {
        Self::new(
            ErrorCode::RateLimit,
            "Rate limit exceeded",
            "Too many requests have been made. Wait a moment and try again.",
            true,
        )
    }

    /// Request timed out.
    #[must_use]
    pub fn timeout() -> Self {
        Self::new(
            ErrorCode::Timeout,
            "Request timeout",
            "The operation took too long. Try again.",
            true,
        )
    }

    /// Configuration file not found.
    #[must_use]
    pub fn config_not_found() -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            "Configuration file not found",
            "Configuration file not found. A new one will be created.",
            false,
        )
    }
}

// The cause is reachable through `source()`, not the display text.
impl fmt::Display for StructuredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl StdError for StructuredError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

/// Application error: either a classified [`StructuredError`] or an opaque
/// error that was never classified.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Classified failure with a known code.
    #[error(transparent)]
    Structured(#[from] StructuredError),

    /// Unclassified failure.
    #[error(transparent)]
    Other(BoxError),
}

impl AppError {
    /// Wraps an arbitrary error without classifying it.
    pub fn other(error: impl Into<BoxError>) -> Self {
        Self::Other(error.into())
    }

    /// Returns the structured error if this error was classified.
    #[must_use]
    pub fn as_structured(&self) -> Option<&StructuredError> {
        match self {
            Self::Structured(inner) => Some(inner),
            Self::Other(_) => None,
        }
    }

    /// Returns the code, if this error was classified.
    #[must_use]
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.as_structured().map(StructuredError::code)
    }

    /// Returns the stable code string, or an empty string when unclassified.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.error_code().map_or("", ErrorCode::as_str)
    }

    /// Returns whether an automatic retry may succeed. Unclassified errors are
    /// never retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.as_structured().is_some_and(StructuredError::is_retryable)
    }

    /// Returns the message to display to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Structured(inner) => inner.user_message().to_string(),
            Self::Other(error) => error.to_string(),
        }
    }
}

/// Creates a structured error.
pub fn make(
    code: ErrorCode,
    message: impl Into<String>,
    user_message: impl Into<String>,
    retryable: bool,
) -> StructuredError {
    StructuredError::new(code, message, user_message, retryable)
}

/// Wraps `cause` in a structured error. Wrapping nothing yields nothing.
pub fn wrap<E>(
    cause: Option<E>,
    code: ErrorCode,
    message: impl Into<String>,
    user_message: impl Into<String>,
    retryable: bool,
) -> Option<StructuredError>
where
    E: Into<BoxError>,
{
    let cause = cause?;
    Some(StructuredError::new(code, message, user_message, retryable).with_cause(cause))
}

/// Finds the first structured error in `err`'s source chain.
fn find_structured<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a StructuredError> {
    std::iter::successors(Some(err), |&current| current.source()).find_map(|current| {
        if let Some(structured) = current.downcast_ref::<StructuredError>() {
            return Some(structured);
        }
        current
            .downcast_ref::<AppError>()
            .and_then(AppError::as_structured)
    })
}

/// Returns whether `err` (or a structured error it wraps) is retryable.
#[must_use]
pub fn is_retryable(err: &(dyn StdError + 'static)) -> bool {
    find_structured(err).is_some_and(StructuredError::is_retryable)
}

/// Returns the user-facing message for `err`, or its display text when no
/// structured error is found.
#[must_use]
pub fn user_message(err: &(dyn StdError + 'static)) -> String {
    find_structured(err).map_or_else(|| err.to_string(), |s| s.user_message().to_string())
}

/// Returns the stable code of `err`, or an empty string when unclassified.
#[must_use]
pub fn code(err: &(dyn StdError + 'static)) -> &'static str {
    find_structured(err).map_or("", |s| s.code().as_str())
}
