//! Session exchange: present an identity token to the backend

use std::time::Duration;

use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;

use super::errors::{AuthFailure, ErrorKind, ProviderErrorCode};
use super::models::{IdentityToken, SessionResponse};

/// Message used when the backend rejects the token without an `error` field
pub const DEFAULT_EXCHANGE_ERROR: &str = "Login failed. Please try again.";

#[derive(Serialize)]
struct ExchangeRequest<'a> {
    id_token: &'a str,
}

/// HTTP client for the backend session endpoints
///
/// Keeps a cookie jar so the session cookie minted by the exchange is sent
/// back on sign-out.
#[derive(Clone)]
pub struct SessionExchangeClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl SessionExchangeClient {
    /// Create a client that resolves relative endpoints against `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve an endpoint that may be absolute or a path on the backend
    #[must_use]
    pub fn resolve(&self, endpoint: &str) -> String {
        if url::Url::parse(endpoint).is_ok() {
            endpoint.to_string()
        } else if endpoint.starts_with('/') {
            format!("{}{endpoint}", self.base_url)
        } else {
            format!("{}/{endpoint}", self.base_url)
        }
    }

    /// POST `{"id_token": token}` to `endpoint`
    ///
    /// Any 2xx is success whatever the body looks like; a body that is not JSON
    /// comes back as `null`.
    ///
    /// # Errors
    ///
    /// - non-2xx: `Unknown` carrying the body's `error` field, or
    ///   [`DEFAULT_EXCHANGE_ERROR`] when there is none
    /// - transport failure: `Network`
    pub async fn exchange_token(
        &self,
        token: &IdentityToken,
        endpoint: &str,
    ) -> Result<SessionResponse, AuthFailure> {
        let url = self.resolve(endpoint);
        debug!("🔄 Exchanging identity token at {url}");

        let response = self
            .http_client
            .post(&url)
            .json(&ExchangeRequest {
                id_token: token.as_str(),
            })
            .send()
            .await
            .map_err(|e| {
                warn!("Session exchange request to {url} failed: {e}");
                AuthFailure::from(ProviderErrorCode::network())
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            warn!("Failed to read session exchange response: {e}");
            AuthFailure::from(ProviderErrorCode::network())
        })?;
        let json = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);

        if status.is_success() {
            debug!("Session exchange succeeded with status {status}");
            return Ok(SessionResponse(json));
        }

        let message = json
            .get("error")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .unwrap_or(DEFAULT_EXCHANGE_ERROR);
        warn!("Session exchange rejected with status {status}: {message}");
        Err(AuthFailure::new(ErrorKind::Unknown, message))
    }

    /// Notify the backend that the user signed out
    ///
    /// # Errors
    ///
    /// Returns `SignOutFailed` on transport failure or a non-2xx status
    pub async fn end_session(&self, endpoint: &str) -> Result<(), AuthFailure> {
        let url = self.resolve(endpoint);
        let response = self.http_client.post(&url).send().await.map_err(|e| {
            warn!("Sign-out request to {url} failed: {e}");
            AuthFailure::sign_out_failed()
        })?;

        if response.status().is_success() {
            Ok(())
        } else {
            warn!("Sign-out rejected with status {}", response.status());
            Err(AuthFailure::sign_out_failed())
        }
    }
}
