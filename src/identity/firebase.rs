//! Firebase Authentication over the Identity Toolkit REST API
//!
//! One method per provider operation; each is a single request (registration
//! is three sequential requests) and nothing is retried. The signed-in account
//! is cached in memory only.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info, warn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::RwLock;

use super::errors::ProviderErrorCode;
use super::models::{Credential, IdentityToken, OAuthProviderKind, OAuthToken, UserAccount};
use super::provider::IdentityProvider;
use crate::settings::{FirebaseConfig, IdentitySettings};

/// Lifetime assumed when the provider omits or garbles `expiresIn`
const DEFAULT_TOKEN_LIFETIME_SECONDS: i64 = 3600;

/// Upper bound on a reported `expiresIn`
const MAX_TOKEN_LIFETIME_SECONDS: i64 = 24 * 3600;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_idp_credential: bool,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id_token: Option<&'a str>,
}

/// Body shared by `signUp`, `signInWithPassword` and `signInWithIdp`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    need_confirmation: bool,
}

/// `securetoken.googleapis.com` answers in `snake_case`
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RestErrorBody {
    error: RestError,
}

#[derive(Debug, Deserialize)]
struct RestError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Ignored {}

// ============================================================================
// Provider
// ============================================================================

/// Identity provider backed by Firebase Authentication
#[derive(Clone)]
pub struct FirebaseIdentityProvider {
    http_client: reqwest::Client,
    api_key: String,
    identity_toolkit_url: String,
    secure_token_url: String,
    /// Continue URI reported to the toolkit for OAuth sign-in
    request_uri: String,
    account: Arc<RwLock<Option<UserAccount>>>,
}

impl FirebaseIdentityProvider {
    /// Build a provider from the Firebase web app configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed
    pub fn new(firebase: &FirebaseConfig, identity: &IdentitySettings) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(identity.request_timeout_seconds))
            .build()?;

        Ok(Self {
            http_client,
            api_key: firebase.api_key.clone(),
            identity_toolkit_url: identity.identity_toolkit_url.trim_end_matches('/').to_string(),
            secure_token_url: identity.secure_token_url.trim_end_matches('/').to_string(),
            request_uri: format!("https://{}", firebase.auth_domain),
            account: Arc::new(RwLock::new(None)),
        })
    }

    async fn toolkit_call<B, R>(&self, method: &str, body: &B) -> Result<R, ProviderErrorCode>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/accounts:{method}", self.identity_toolkit_url);
        debug!("🔐 Identity toolkit call: accounts:{method}");

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("Identity toolkit request accounts:{method} failed: {e}");
                ProviderErrorCode::network()
            })?;

        Self::parse_response(response).await
    }

    async fn parse_response<R: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<R, ProviderErrorCode> {
        let status = response.status();
        if status.is_success() {
            return response.json::<R>().await.map_err(|e| {
                warn!("Identity provider returned an unreadable body: {e}");
                ProviderErrorCode::Unrecognized {
                    code: "invalid-response".to_string(),
                    message: None,
                }
            });
        }

        match response.json::<RestErrorBody>().await {
            Ok(body) => {
                debug!("Identity provider rejected request ({status}): {}", body.error.message);
                Err(ProviderErrorCode::from_rest_message(&body.error.message))
            }
            Err(_) => Err(ProviderErrorCode::Unrecognized {
                code: status.as_str().to_string(),
                message: None,
            }),
        }
    }

    fn account_from_response(response: TokenResponse) -> UserAccount {
        UserAccount {
            uid: response.local_id,
            email: response.email,
            display_name: response.display_name,
            email_verified: response.email_verified,
            id_token: IdentityToken::new(response.id_token),
            refresh_token: response.refresh_token,
            expires_at: expiry_from_now(response.expires_in.as_deref()),
        }
    }

    async fn store_account(&self, account: &UserAccount) {
        *self.account.write().await = Some(account.clone());
    }

    fn idp_post_body(provider: OAuthProviderKind, token: &OAuthToken) -> String {
        let (param, value) = match token {
            OAuthToken::IdToken(value) => ("id_token", value),
            OAuthToken::AccessToken(value) => ("access_token", value),
        };
        format!(
            "{param}={}&providerId={}",
            urlencoding::encode(value),
            provider.provider_id()
        )
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ProviderErrorCode> {
        let url = format!("{}/token", self.secure_token_url);
        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .send()
            .await
            .map_err(|e| {
                warn!("Token refresh request failed: {e}");
                ProviderErrorCode::network()
            })?;

        Self::parse_response(response).await
    }
}

fn parse_expires_in(expires_in: Option<&str>) -> i64 {
    expires_in
        .and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECONDS)
        .clamp(0, MAX_TOKEN_LIFETIME_SECONDS)
}

/// Expiry instant for a token issued now; unrepresentable instants count as expired
fn expiry_from_now(expires_in: Option<&str>) -> DateTime<Utc> {
    let now = Utc::now();
    TimeDelta::try_seconds(parse_expires_in(expires_in))
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or(now)
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserAccount, ProviderErrorCode> {
        let created: TokenResponse = self
            .toolkit_call(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        let mut account = Self::account_from_response(created);

        let _: Ignored = self
            .toolkit_call(
                "update",
                &UpdateProfileRequest {
                    id_token: account.id_token.as_str(),
                    display_name,
                    return_secure_token: false,
                },
            )
            .await?;
        account.display_name = Some(display_name.to_string());

        let _: Ignored = self
            .toolkit_call(
                "sendOobCode",
                &OobCodeRequest {
                    request_type: "VERIFY_EMAIL",
                    email: None,
                    id_token: Some(account.id_token.as_str()),
                },
            )
            .await?;

        info!("✅ Registered account {} and sent verification email", account.uid);
        self.store_account(&account).await;
        Ok(account)
    }

    async fn sign_in(&self, credential: &Credential) -> Result<UserAccount, ProviderErrorCode> {
        let response: TokenResponse = match credential {
            Credential::EmailPassword { email, password } => {
                self.toolkit_call(
                    "signInWithPassword",
                    &PasswordRequest {
                        email,
                        password,
                        return_secure_token: true,
                    },
                )
                .await?
            }
            Credential::OAuthToken { provider, token } => {
                self.toolkit_call(
                    "signInWithIdp",
                    &IdpRequest {
                        post_body: Self::idp_post_body(*provider, token),
                        request_uri: &self.request_uri,
                        return_idp_credential: true,
                        return_secure_token: true,
                    },
                )
                .await?
            }
        };

        if response.need_confirmation {
            return Err(ProviderErrorCode::AccountExistsWithDifferentCredential);
        }

        let account = Self::account_from_response(response);
        info!("✅ Signed in account {}", account.uid);
        self.store_account(&account).await;
        Ok(account)
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderErrorCode> {
        let _: Ignored = self
            .toolkit_call(
                "sendOobCode",
                &OobCodeRequest {
                    request_type: "PASSWORD_RESET",
                    email: Some(email),
                    id_token: None,
                },
            )
            .await?;
        info!("📧 Password reset email requested");
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), ProviderErrorCode> {
        let previous = self.account.write().await.take();
        if let Some(account) = previous {
            info!("Signed out account {}", account.uid);
        }
        Ok(())
    }

    async fn current_token(
        &self,
        force_refresh: bool,
    ) -> Result<Option<IdentityToken>, ProviderErrorCode> {
        let Some(account) = self.account.read().await.clone() else {
            return Ok(None);
        };

        if !force_refresh && !account.needs_refresh(Utc::now()) {
            return Ok(Some(account.id_token));
        }

        // The lock is not held across the refresh request
        debug!("🔄 Refreshing identity token for {}", account.uid);
        let refreshed = self.refresh(&account.refresh_token).await?;
        let token = IdentityToken::new(refreshed.id_token);

        let mut cache = self.account.write().await;
        if let Some(cached) = cache.as_mut().filter(|cached| cached.uid == account.uid) {
            cached.id_token = token.clone();
            cached.refresh_token = refreshed.refresh_token;
            cached.expires_at = expiry_from_now(refreshed.expires_in.as_deref());
        }
        Ok(Some(token))
    }

    async fn current_user(&self) -> Option<UserAccount> {
        self.account.read().await.clone()
    }
}
