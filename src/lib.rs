//! EPUB Downloader Library
//!
//! Terminal client for a subscription content service. Sessions are
//! authenticated with cookies exported from a browser and every request goes
//! through a shared rate limiter.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`errors`] - Closed error taxonomy shared by every layer
//! - [`auth`] - Cookie import format and on-disk cookie store
//! - [`api`] - Rate-limited session client, profile validation and retries
//! - [`config`] - Configuration file, XDG paths and logging setup
//! - [`tui`] - Message-driven screen state machine and its event loop

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod tui;

// Re-export commonly used types
pub use api::{ApiClient, RateLimiter, RetryPolicy, Session, UserProfile};
pub use auth::{Cookie, CookieStore};
pub use config::{AppPaths, Config, LogContext};
pub use errors::{AppError, ErrorCode, StructuredError};
