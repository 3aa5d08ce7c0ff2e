//! Stub implementations of the identity and verification seams

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::identity::{
    Credential, IdentityProvider, IdentityToken, OAuthProviderKind, OAuthPopup, OAuthToken,
    ProviderErrorCode, UserAccount,
};
use crate::verification::{TokenVerificationError, TokenVerifier, VerifiedIdentity};

use super::fixtures::TestFixtures;

/// Verifier that accepts a fixed set of tokens
#[derive(Default)]
pub struct StubTokenVerifier {
    accepted: HashMap<String, VerifiedIdentity>,
}

impl StubTokenVerifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as `identity`
    #[must_use]
    pub fn accepting(mut self, token: &str, identity: VerifiedIdentity) -> Self {
        self.accepted.insert(token.to_string(), identity);
        self
    }
}

#[async_trait]
impl TokenVerifier for StubTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, TokenVerificationError> {
        self.accepted
            .get(token)
            .cloned()
            .ok_or(TokenVerificationError::SignatureInvalid)
    }
}

/// In-memory identity provider with scripted outcomes
pub struct StubIdentityProvider {
    issued_token: String,
    failure: Option<ProviderErrorCode>,
    sign_out_failure: bool,
    account: RwLock<Option<UserAccount>>,
}

impl StubIdentityProvider {
    /// A provider whose operations succeed and issue `issued_token`
    #[must_use]
    pub fn issuing(issued_token: &str) -> Self {
        Self {
            issued_token: issued_token.to_string(),
            failure: None,
            sign_out_failure: false,
            account: RwLock::new(None),
        }
    }

    /// Fail register, sign-in and password reset with `code`
    #[must_use]
    pub fn failing_with(mut self, code: ProviderErrorCode) -> Self {
        self.failure = Some(code);
        self
    }

    #[must_use]
    pub fn failing_sign_out(mut self) -> Self {
        self.sign_out_failure = true;
        self
    }

    async fn authenticate(&self) -> Result<UserAccount, ProviderErrorCode> {
        if let Some(code) = &self.failure {
            return Err(code.clone());
        }
        let account = TestFixtures::user_account(&self.issued_token);
        *self.account.write().await = Some(account.clone());
        Ok(account)
    }
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn register(
        &self,
        _email: &str,
        _password: &str,
        _display_name: &str,
    ) -> Result<UserAccount, ProviderErrorCode> {
        self.authenticate().await
    }

    async fn sign_in(&self, _credential: &Credential) -> Result<UserAccount, ProviderErrorCode> {
        self.authenticate().await
    }

    async fn send_password_reset(&self, _email: &str) -> Result<(), ProviderErrorCode> {
        self.failure.clone().map_or(Ok(()), Err)
    }

    async fn sign_out(&self) -> Result<(), ProviderErrorCode> {
        if self.sign_out_failure {
            return Err(ProviderErrorCode::NetworkRequestFailed);
        }
        *self.account.write().await = None;
        Ok(())
    }

    async fn current_token(
        &self,
        _force_refresh: bool,
    ) -> Result<Option<IdentityToken>, ProviderErrorCode> {
        Ok(self
            .account
            .read()
            .await
            .as_ref()
            .map(|account| account.id_token.clone()))
    }

    async fn current_user(&self) -> Option<UserAccount> {
        self.account.read().await.clone()
    }
}

/// Popup that fails as if the user closed it
pub struct ClosedPopup;

#[async_trait]
impl OAuthPopup for ClosedPopup {
    async fn open(&self, _provider: OAuthProviderKind) -> Result<OAuthToken, ProviderErrorCode> {
        Err(ProviderErrorCode::PopupClosedByUser)
    }
}
