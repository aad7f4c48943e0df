//! Session cookie model, JSON import parser and reqwest jar loader.
//!
//! Cookies are imported as a JSON array of objects, the format produced by
//! browser devtools and cookie-export extensions:
//!
//! ```json
//! [{"name": "orm-jwt", "value": "...", "domain": ".oreilly.com", "path": "/",
//!   "secure": true, "httpOnly": true, "sameSite": "Lax"}]
//! ```
//!
//! Records without a `name` or `value` are skipped rather than failing the
//! whole import.

use std::fmt;
use std::sync::Arc;

use reqwest::cookie::Jar;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::errors::{AppError, ErrorCode, StructuredError};

/// `SameSite` policy of a cookie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SameSite {
    Strict,
    Lax,
    None,
    /// No explicit policy; the browser default applies.
    #[default]
    Default,
}

impl SameSite {
    /// Maps an import value to a policy. Unknown or absent values map to
    /// [`SameSite::Default`].
    #[must_use]
    pub fn from_import(value: Option<&str>) -> Self {
        match value {
            Some("Strict") => Self::Strict,
            Some("Lax") => Self::Lax,
            Some("None") => Self::None,
            _ => Self::Default,
        }
    }

    /// Returns the label written to the persisted cookie file.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
            Self::Default => "Default",
        }
    }
}

/// A session cookie.
///
/// The value is redacted from `Debug` output so cookies can be traced safely.
#[derive(Clone, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name (never empty).
    pub name: String,
    /// Value (sensitive, never log).
    value: String,
    /// Domain scope; empty means host-only for the service origin.
    pub domain: String,
    /// Path scope; empty means `/`.
    pub path: String,
    /// Max-Age in seconds: 0 = unspecified, negative = expire now.
    pub max_age: i64,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl Cookie {
    /// Creates a cookie with default attributes.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: String::new(),
            max_age: 0,
            secure: false,
            http_only: false,
            same_site: SameSite::Default,
        }
    }

    /// Sets the domain scope.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Sets the path scope.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Returns the cookie value.
    ///
    /// Cookie values are sensitive; never log the return value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Builds the `Set-Cookie` header form used to seed the cookie jar.
    #[must_use]
    pub fn to_set_cookie(&self) -> String {
        let mut parts = vec![format!("{}={}", self.name, self.value)];

        let path = if self.path.is_empty() { "/" } else { &self.path };
        parts.push(format!("Path={path}"));

        if !self.domain.is_empty() {
            parts.push(format!("Domain={}", self.domain));
        }
        if self.max_age != 0 {
            parts.push(format!("Max-Age={}", self.max_age));
        }
        if self.secure {
            parts.push("Secure".to_string());
        }
        if self.http_only {
            parts.push("HttpOnly".to_string());
        }
        if self.same_site != SameSite::Default {
            parts.push(format!("SameSite={}", self.same_site.as_str()));
        }

        parts.join("; ")
    }
}

impl fmt::Debug for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cookie")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("max_age", &self.max_age)
            .field("secure", &self.secure)
            .field("http_only", &self.http_only)
            .field("same_site", &self.same_site)
            .finish()
    }
}

/// One record of the JSON cookie format, shared by import and persistence.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CookieRecord {
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) domain: Option<String>,
    /// Accepted for compatibility with browser exports; expiry is carried by
    /// `maxAge`.
    #[serde(default, skip_serializing)]
    pub(crate) expires: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) max_age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) secure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) http_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) same_site: Option<String>,
}

impl CookieRecord {
    pub(crate) fn from_cookie(cookie: &Cookie) -> Self {
        Self {
            name: Some(cookie.name.clone()),
            value: Some(cookie.value.clone()),
            path: non_empty(&cookie.path),
            domain: non_empty(&cookie.domain),
            expires: None,
            max_age: (cookie.max_age != 0).then_some(cookie.max_age),
            secure: cookie.secure.then_some(true),
            http_only: cookie.http_only.then_some(true),
            same_site: Some(cookie.same_site.as_str().to_string()),
        }
    }

    /// Converts the record into a cookie, or `None` when name or value is
    /// missing or empty.
    fn into_cookie(self) -> Option<Cookie> {
        let name = self.name.filter(|name| !name.is_empty())?;
        let value = self.value.filter(|value| !value.is_empty())?;
        Some(Cookie {
            name,
            value,
            domain: self.domain.unwrap_or_default(),
            path: self.path.unwrap_or_default(),
            max_age: self.max_age.unwrap_or(0),
            secure: self.secure.unwrap_or(false),
            http_only: self.http_only.unwrap_or(false),
            same_site: SameSite::from_import(self.same_site.as_deref()),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Parses cookies from JSON text.
///
/// # Errors
///
/// Returns an invalid-cookies error (`AUTH_004`) when the text is not a JSON
/// array, or when no record with both a name and a value remains.
#[instrument(level = "debug", skip(json_text))]
pub fn parse_cookies_json(json_text: &str) -> Result<Vec<Cookie>, AppError> {
    let entries: Vec<Value> = serde_json::from_str(json_text.trim()).map_err(|e| {
        StructuredError::new(
            ErrorCode::InvalidCookies,
            "invalid JSON format: expected an array of cookie objects",
            StructuredError::invalid_cookies().user_message(),
            false,
        )
        .with_cause(e)
    })?;

    let total = entries.len();
    let mut cookies = Vec::with_capacity(total);
    for (index, entry) in entries.into_iter().enumerate() {
        let record = match serde_json::from_value::<CookieRecord>(entry) {
            Ok(record) => record,
            Err(e) => {
                warn!(entry = index + 1, reason = %e, "skipping malformed cookie record");
                continue;
            }
        };
        match record.into_cookie() {
            Some(cookie) => {
                debug!(name = %cookie.name, domain = %cookie.domain, "parsed cookie");
                cookies.push(cookie);
            }
            None => debug!(entry = index + 1, "skipping cookie without name or value"),
        }
    }

    if cookies.is_empty() {
        return Err(StructuredError::new(
            ErrorCode::InvalidCookies,
            format!("no usable cookies found ({total} records)"),
            "No usable cookies were found. Each cookie needs a name and a value.",
            false,
        )
        .into());
    }

    debug!(count = cookies.len(), skipped = total - cookies.len(), "parsed cookies");
    Ok(cookies)
}

/// Loads cookies into a `reqwest::cookie::Jar` bound to `origin`.
///
/// Cookies whose attributes the jar rejects (for example a `Domain` that does
/// not match the origin) are dropped by the jar.
#[instrument(level = "debug", skip(cookies), fields(origin = %origin))]
pub fn load_cookies_into_jar(cookies: &[Cookie], origin: &Url) -> Arc<Jar> {
    let jar = Arc::new(Jar::default());
    for cookie in cookies {
        jar.add_cookie_str(&cookie.to_set_cookie(), origin);
        debug!(name = %cookie.name, domain = %cookie.domain, "loaded cookie into jar");
    }
    jar
}
