//! Authentication and cookie management.
//!
//! Sessions are established from cookies exported out of a logged-in
//! browser. This module parses the JSON export, persists it between runs and
//! loads it into the HTTP client's cookie jar.

mod cookies;
mod storage;

pub use cookies::{Cookie, SameSite, load_cookies_into_jar, parse_cookies_json};
pub use storage::CookieStore;
