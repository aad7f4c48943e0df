//! An authenticated session: a client plus the profile it was validated with.

use tokio::time::Instant;
use tracing::{info, instrument};

use super::client::ApiClient;
use super::profile::UserProfile;
use super::retry::RetryPolicy;
use crate::auth::{CookieStore, parse_cookies_json};
use crate::errors::AppError;

/// Validated session shared with the UI and download collaborators.
#[derive(Debug, Clone)]
pub struct Session {
    pub client: ApiClient,
    pub profile: UserProfile,
}

impl Session {
    /// Validates `client` once and wraps it with the returned profile.
    ///
    /// # Errors
    ///
    /// Returns any error from [`ApiClient::validate_session`].
    pub async fn establish(client: ApiClient, deadline: Option<Instant>) -> Result<Self, AppError> {
        let profile = client.validate_session(deadline).await?;
        Ok(Self { client, profile })
    }

    /// Parses pasted cookie JSON, validates it and saves the cookies.
    ///
    /// Cookies are saved only after the session validates.
    ///
    /// # Errors
    ///
    /// Returns the parse, validation or save error.
    #[instrument(skip(json_text, store))]
    pub async fn import(
        json_text: &str,
        store: &CookieStore,
        base_url: &str,
        requests_per_second: u32,
        deadline: Option<Instant>,
    ) -> Result<Self, AppError> {
        let cookies = parse_cookies_json(json_text)?;
        let client = ApiClient::with_base_url(base_url, &cookies, requests_per_second)?;
        let session = Self::establish(client, deadline).await?;
        store.save(&cookies)?;
        info!(cookies = cookies.len(), "imported session cookies");
        Ok(session)
    }

    /// Loads saved cookies and validates them, retrying transient failures
    /// with `policy`.
    ///
    /// # Errors
    ///
    /// Returns the load error or the error of the last validation attempt.
    #[instrument(skip(store, policy), fields(path = %store.path().display()))]
    pub async fn restore(
        store: &CookieStore,
        base_url: &str,
        requests_per_second: u32,
        policy: &RetryPolicy,
    ) -> Result<Self, AppError> {
        let cookies = store.load()?;
        let client = ApiClient::with_base_url(base_url, &cookies, requests_per_second)?;
        let validating = &client;
        let profile = policy
            .run(move || validating.validate_session(None))
            .await?;
        info!("restored saved session");
        Ok(Self { client, profile })
    }
}
