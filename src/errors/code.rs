//! Stable error codes grouped by category.

use std::fmt;

/// Category an [`ErrorCode`] belongs to. Each category owns a code prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Auth,
    Network,
    Validation,
    Storage,
    Epub,
    Config,
    Download,
}

impl ErrorCategory {
    /// Returns the prefix shared by every code in this category.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Auth => "AUTH",
            Self::Network => "NET",
            Self::Validation => "VAL",
            Self::Storage => "STOR",
            Self::Epub => "EPUB",
            Self::Config => "CFG",
            Self::Download => "DL",
        }
    }
}

/// Closed set of error codes used across the application.
///
/// The string form (see [`ErrorCode::as_str`]) is stable and safe to use for
/// programmatic branching, metrics and log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Session has expired or is invalid.
    SessionExpired,
    /// Authentication credentials were rejected.
    InvalidCredentials,
    /// The account has no active subscription.
    NoSubscription,
    /// Imported cookies are malformed or incomplete.
    InvalidCookies,
    /// Transport-level failure (DNS, connect, TLS, reset).
    Network,
    /// The API answered with an unexpected status or payload.
    Api,
    /// Client-side or server-side rate limit hit.
    RateLimit,
    /// The request did not complete in time.
    Timeout,
    /// Generic validation failure.
    Validation,
    /// User input could not be accepted.
    InvalidInput,
    /// Database failure.
    Database,
    /// File system failure.
    File,
    /// EPUB generation failed.
    EpubGeneration,
    /// EPUB output is structurally invalid.
    EpubInvalidFormat,
    /// Generic configuration failure.
    Config,
    /// Configuration file is missing.
    ConfigNotFound,
    /// Configuration file could not be parsed.
    ConfigInvalidYaml,
    /// Generic download failure.
    Download,
    /// Download was canceled.
    DownloadCanceled,
}

impl ErrorCode {
    /// Every code in the taxonomy, in declaration order.
    pub const ALL: [Self; 19] = [
        Self::SessionExpired,
        Self::InvalidCredentials,
        Self::NoSubscription,
        Self::InvalidCookies,
        Self::Network,
        Self::Api,
        Self::RateLimit,
        Self::Timeout,
        Self::Validation,
        Self::InvalidInput,
        Self::Database,
        Self::File,
        Self::EpubGeneration,
        Self::EpubInvalidFormat,
        Self::Config,
        Self::ConfigNotFound,
        Self::ConfigInvalidYaml,
        Self::Download,
        Self::DownloadCanceled,
    ];

    /// Returns the stable string identifier (e.g. `AUTH_001`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SessionExpired => "AUTH_001",
            Self::InvalidCredentials => "AUTH_002",
            Self::NoSubscription => "AUTH_003",
            Self::InvalidCookies => "AUTH_004",
            Self::Network => "NET_001",
            Self::Api => "NET_002",
            Self::RateLimit => "NET_003",
            Self::Timeout => "NET_004",
            Self::Validation => "VAL_001",
            Self::InvalidInput => "VAL_002",
            Self::Database => "STOR_001",
            Self::File => "STOR_002",
            Self::EpubGeneration => "EPUB_001",
            Self::EpubInvalidFormat => "EPUB_002",
            Self::Config => "CFG_001",
            Self::ConfigNotFound => "CFG_002",
            Self::ConfigInvalidYaml => "CFG_003",
            Self::Download => "DL_001",
            Self::DownloadCanceled => "DL_002",
        }
    }

    /// Returns the category this code belongs to.
    #[must_use]
    pub fn category(self) -> ErrorCategory {
        match self {
            Self::SessionExpired
            | Self::InvalidCredentials
            | Self::NoSubscription
            | Self::InvalidCookies => ErrorCategory::Auth,
            Self::Network | Self::Api | Self::RateLimit | Self::Timeout => ErrorCategory::Network,
            Self::Validation | Self::InvalidInput => ErrorCategory::Validation,
            Self::Database | Self::File => ErrorCategory::Storage,
            Self::EpubGeneration | Self::EpubInvalidFormat => ErrorCategory::Epub,
            Self::Config | Self::ConfigNotFound | Self::ConfigInvalidYaml => ErrorCategory::Config,
            Self::Download | Self::DownloadCanceled => ErrorCategory::Download,
        }
    }

    /// Looks up a code by its stable string identifier.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
