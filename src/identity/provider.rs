//! Identity provider seams
//!
//! [`IdentityProvider`] performs one authentication operation against the
//! managed identity service. [`OAuthPopup`] stands in for the interactive
//! browser step of an OAuth sign-in and yields the provider credential.

use async_trait::async_trait;

use super::errors::ProviderErrorCode;
use super::models::{Credential, IdentityToken, OAuthProviderKind, OAuthToken, UserAccount};

/// Identity provider operations, each a single outstanding request
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account, set its display name and send a verification email
    ///
    /// # Errors
    ///
    /// Returns the provider's error code if any of the three steps fails
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserAccount, ProviderErrorCode>;

    /// Authenticate with a credential and cache the resulting account
    ///
    /// # Errors
    ///
    /// Returns the provider's error code if authentication fails
    async fn sign_in(&self, credential: &Credential) -> Result<UserAccount, ProviderErrorCode>;

    /// Ask the provider to email a password reset link
    ///
    /// # Errors
    ///
    /// Returns the provider's error code if the request fails
    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderErrorCode>;

    /// Forget the cached account
    ///
    /// # Errors
    ///
    /// Returns an error if the cached state could not be cleared
    async fn sign_out(&self) -> Result<(), ProviderErrorCode>;

    /// Return the current identity token, refreshing it when close to expiry
    ///
    /// # Errors
    ///
    /// Returns the provider's error code if a refresh was needed and failed
    async fn current_token(
        &self,
        force_refresh: bool,
    ) -> Result<Option<IdentityToken>, ProviderErrorCode>;

    /// Snapshot of the cached account, if any
    async fn current_user(&self) -> Option<UserAccount>;
}

/// Interactive OAuth step (a browser popup on the web)
#[async_trait]
pub trait OAuthPopup: Send + Sync {
    /// Run the interactive flow and return the provider's token
    ///
    /// # Errors
    ///
    /// Returns `PopupClosedByUser`, `CancelledPopupRequest` or `PopupBlocked`
    /// when the interaction does not complete
    async fn open(&self, provider: OAuthProviderKind) -> Result<OAuthToken, ProviderErrorCode>;
}

/// Popup stand-in for callers that already hold an OAuth token, such as a
/// native shell that ran the consent screen itself
pub struct PreissuedToken {
    token: OAuthToken,
}

impl PreissuedToken {
    #[must_use]
    pub fn new(token: OAuthToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl OAuthPopup for PreissuedToken {
    async fn open(&self, _provider: OAuthProviderKind) -> Result<OAuthToken, ProviderErrorCode> {
        Ok(self.token.clone())
    }
}
