//! Auth client: one identity operation, then session exchange
//!
//! Every public operation returns an [`AuthResult`]; provider and backend
//! failures are caught here and normalised through the error taxonomy.

use std::sync::Arc;
use std::time::Duration;

use log::warn;

use super::errors::{AuthFailure, ProviderErrorCode};
use super::exchange::SessionExchangeClient;
use super::models::{AuthResult, Credential, IdentityToken, OAuthProviderKind, SessionResponse};
use super::provider::{IdentityProvider, OAuthPopup};
use crate::settings::IdentitySettings;
use crate::utils::logging::LoggingHelper;

pub const REGISTER_SUCCESS_MESSAGE: &str =
    "Account created! Please check your email to verify your account.";
pub const SIGN_IN_SUCCESS_MESSAGE: &str = "Welcome back!";
pub const RESET_SUCCESS_MESSAGE: &str = "Password reset email sent. Please check your inbox.";
pub const SIGN_OUT_SUCCESS_MESSAGE: &str = "You have been signed out.";

/// Orchestrates identity operations and the backend session exchange
#[derive(Clone)]
pub struct AuthClient {
    provider: Arc<dyn IdentityProvider>,
    popup: Option<Arc<dyn OAuthPopup>>,
    exchange: SessionExchangeClient,
    session_endpoint: String,
    logout_endpoint: String,
}

impl AuthClient {
    /// Build a client from the identity settings
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange HTTP client cannot be constructed
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        settings: &IdentitySettings,
    ) -> anyhow::Result<Self> {
        let exchange = SessionExchangeClient::new(
            &settings.backend_base_url,
            Duration::from_secs(settings.request_timeout_seconds),
        )?;
        Ok(Self {
            provider,
            popup: None,
            exchange,
            session_endpoint: settings.session_endpoint.clone(),
            logout_endpoint: settings.logout_endpoint.clone(),
        })
    }

    /// Attach the interactive OAuth step used by [`Self::sign_in_with_provider`]
    #[must_use]
    pub fn with_popup(mut self, popup: Arc<dyn OAuthPopup>) -> Self {
        self.popup = Some(popup);
        self
    }

    /// Create an account, then establish a backend session
    pub async fn register(&self, email: &str, password: &str, display_name: &str) -> AuthResult {
        let outcome = async {
            self.provider
                .register(email, password, display_name)
                .await
                .map_err(AuthFailure::from)?;
            let token = self.establish_session().await?;
            Ok::<_, AuthFailure>(AuthResult::success(Some(token), REGISTER_SUCCESS_MESSAGE))
        }
        .await;
        Self::finish("register", outcome)
    }

    /// Sign in with email and password, then establish a backend session
    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult {
        let credential = Credential::EmailPassword {
            email: email.to_string(),
            password: password.to_string(),
        };
        let outcome = self.sign_in_with_credential(&credential).await;
        Self::finish("sign_in", outcome)
    }

    /// Run the interactive OAuth flow, then establish a backend session
    pub async fn sign_in_with_provider(&self) -> AuthResult {
        let outcome = async {
            let popup = self.popup.as_ref().ok_or_else(|| {
                AuthFailure::from(ProviderErrorCode::OperationNotAllowed)
            })?;
            let provider = OAuthProviderKind::default();
            let token = popup.open(provider).await.map_err(AuthFailure::from)?;
            self.sign_in_with_credential(&Credential::OAuthToken { provider, token })
                .await
        }
        .await;
        Self::finish("sign_in_with_provider", outcome)
    }

    /// Ask the provider to send a password reset email
    pub async fn send_password_reset(&self, email: &str) -> AuthResult {
        let outcome = self
            .provider
            .send_password_reset(email)
            .await
            .map(|()| AuthResult::success(None, RESET_SUCCESS_MESSAGE))
            .map_err(AuthFailure::from);
        Self::finish("send_password_reset", outcome)
    }

    /// Forget the local account and end the backend session
    ///
    /// A provider failure is reported as `SignOutFailed`. Once the provider has
    /// signed out the user is signed out; a backend that rejects the logout
    /// (no session, expired cookie) is only logged.
    pub async fn sign_out(&self) -> AuthResult {
        let outcome = async {
            self.provider
                .sign_out()
                .await
                .map_err(|_| AuthFailure::sign_out_failed())?;
            if let Err(e) = self.exchange.end_session(&self.logout_endpoint).await {
                warn!("Backend logout failed after local sign-out: {e}");
            }
            Ok::<_, AuthFailure>(AuthResult::success(None, SIGN_OUT_SUCCESS_MESSAGE))
        }
        .await;
        Self::finish("sign_out", outcome)
    }

    /// POST an identity token to `endpoint`
    ///
    /// # Errors
    ///
    /// See [`SessionExchangeClient::exchange_token`]
    pub async fn exchange_token(
        &self,
        token: &IdentityToken,
        endpoint: &str,
    ) -> Result<SessionResponse, AuthFailure> {
        self.exchange.exchange_token(token, endpoint).await
    }

    async fn sign_in_with_credential(
        &self,
        credential: &Credential,
    ) -> Result<AuthResult, AuthFailure> {
        self.provider
            .sign_in(credential)
            .await
            .map_err(AuthFailure::from)?;
        let token = self.establish_session().await?;
        Ok(AuthResult::success(Some(token), SIGN_IN_SUCCESS_MESSAGE))
    }

    async fn establish_session(&self) -> Result<IdentityToken, AuthFailure> {
        let token = self
            .provider
            .current_token(false)
            .await
            .map_err(AuthFailure::from)?
            .ok_or_else(|| AuthFailure::from(ProviderErrorCode::InvalidCredential))?;
        self.exchange
            .exchange_token(&token, &self.session_endpoint)
            .await?;
        Ok(token)
    }

    fn finish(operation: &str, outcome: Result<AuthResult, AuthFailure>) -> AuthResult {
        LoggingHelper::log_auth_outcome(operation, outcome.as_ref().err());
        AuthResult::from(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::errors::ErrorKind;
    use crate::identity::models::OAuthToken;
    use crate::identity::provider::PreissuedToken;
    use crate::testing::constants::{TEST_EMAIL, TEST_PASSWORD};
    use crate::testing::{ClosedPopup, StubIdentityProvider};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, provider: StubIdentityProvider) -> AuthClient {
        let settings = IdentitySettings {
            backend_base_url: server.uri(),
            ..IdentitySettings::default()
        };
        AuthClient::new(Arc::new(provider), &settings).unwrap()
    }

    #[tokio::test]
    async fn test_sign_in_exchanges_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .and(body_json(json!({ "id_token": "issued-token" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client(&server, StubIdentityProvider::issuing("issued-token"))
            .sign_in(TEST_EMAIL, TEST_PASSWORD)
            .await;

        assert!(result.success);
        assert_eq!(result.token, Some(IdentityToken::new("issued-token")));
        assert_eq!(result.message.as_deref(), Some(SIGN_IN_SUCCESS_MESSAGE));
    }

    #[tokio::test]
    async fn test_provider_failure_skips_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = StubIdentityProvider::issuing("issued-token")
            .failing_with(ProviderErrorCode::WrongPassword);
        let result = client(&server, provider)
            .sign_in(TEST_EMAIL, "nope")
            .await;

        assert!(!result.success);
        assert!(result.token.is_none());
        assert_eq!(result.error_kind, Some(ErrorKind::WrongPassword));
        assert_eq!(
            result.message.as_deref(),
            Some("Incorrect password. Please try again.")
        );
    }

    #[tokio::test]
    async fn test_rejected_exchange_reports_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "success": false, "error": "Invalid token" })),
            )
            .mount(&server)
            .await;

        let result = client(&server, StubIdentityProvider::issuing("issued-token"))
            .register(TEST_EMAIL, TEST_PASSWORD, "Ada")
            .await;

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::Unknown));
        assert_eq!(result.message.as_deref(), Some("Invalid token"));
    }

    #[tokio::test]
    async fn test_popup_closed() {
        let server = MockServer::start().await;
        let result = client(&server, StubIdentityProvider::issuing("issued-token"))
            .with_popup(Arc::new(ClosedPopup))
            .sign_in_with_provider()
            .await;

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::PopupClosed));
    }

    #[tokio::test]
    async fn test_provider_sign_in_with_preissued_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let popup = PreissuedToken::new(OAuthToken::IdToken("google-id-token".to_string()));
        let result = client(&server, StubIdentityProvider::issuing("issued-token"))
            .with_popup(Arc::new(popup))
            .sign_in_with_provider()
            .await;

        assert!(result.success);
        assert_eq!(result.token, Some(IdentityToken::new("issued-token")));
    }

    #[tokio::test]
    async fn test_provider_sign_in_without_popup() {
        let server = MockServer::start().await;
        let result = client(&server, StubIdentityProvider::issuing("issued-token"))
            .sign_in_with_provider()
            .await;

        assert_eq!(result.error_kind, Some(ErrorKind::OperationNotAllowed));
    }

    #[tokio::test]
    async fn test_password_reset() {
        let server = MockServer::start().await;
        let result = client(&server, StubIdentityProvider::issuing("issued-token"))
            .send_password_reset(TEST_EMAIL)
            .await;
        assert!(result.success);
        assert!(result.token.is_none());
        assert_eq!(result.message.as_deref(), Some(RESET_SUCCESS_MESSAGE));

        let provider = StubIdentityProvider::issuing("issued-token")
            .failing_with(ProviderErrorCode::UserNotFound);
        let result = client(&server, provider).send_password_reset(TEST_EMAIL).await;
        assert_eq!(result.error_kind, Some(ErrorKind::UserNotFound));
    }

    #[tokio::test]
    async fn test_sign_out_reports_provider_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/logout"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let result = client(&server, StubIdentityProvider::issuing("issued-token"))
            .sign_out()
            .await;
        assert!(result.success);
        assert_eq!(result.message.as_deref(), Some(SIGN_OUT_SUCCESS_MESSAGE));

        let provider = StubIdentityProvider::issuing("issued-token").failing_sign_out();
        let result = client(&server, provider).sign_out().await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::SignOutFailed));
    }

    #[tokio::test]
    async fn test_sign_out_without_backend_session_still_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/logout"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "error": "Authentication required" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = Arc::new(StubIdentityProvider::issuing("issued-token"));
        let settings = IdentitySettings {
            backend_base_url: server.uri(),
            ..IdentitySettings::default()
        };
        let client = AuthClient::new(provider.clone(), &settings).unwrap();
        assert!(client.sign_in(TEST_EMAIL, TEST_PASSWORD).await.success);

        let result = client.sign_out().await;
        assert!(result.success);
        assert_eq!(result.message.as_deref(), Some(SIGN_OUT_SUCCESS_MESSAGE));
        assert!(provider.current_user().await.is_none());
    }
}
