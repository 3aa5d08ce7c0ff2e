use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{AuthFailure, ErrorKind};

/// Refresh the cached identity token when it is this close to expiry
pub const TOKEN_REFRESH_MARGIN_SECONDS: i64 = 300;

/// Short-lived bearer token issued by the identity provider
///
/// The value is never printed by `Debug` and this crate never writes it to
/// durable storage.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityToken(String);

impl IdentityToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityToken(<{} chars>)", self.0.len())
    }
}

/// OAuth identity providers that can back an interactive sign-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProviderKind {
    #[default]
    Google,
}

impl OAuthProviderKind {
    /// Provider identifier understood by the identity toolkit
    #[must_use]
    pub fn provider_id(self) -> &'static str {
        match self {
            Self::Google => "google.com",
        }
    }
}

/// Token returned by an OAuth popup
#[derive(Clone, PartialEq, Eq)]
pub enum OAuthToken {
    IdToken(String),
    AccessToken(String),
}

/// Transient credential for one authentication call
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    EmailPassword {
        email: String,
        password: String,
    },
    OAuthToken {
        provider: OAuthProviderKind,
        token: OAuthToken,
    },
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmailPassword { email, .. } => f
                .debug_struct("EmailPassword")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
            Self::OAuthToken { provider, .. } => f
                .debug_struct("OAuthToken")
                .field("provider", provider)
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

/// Account held in the provider client's in-memory cache
#[derive(Clone)]
pub struct UserAccount {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub email_verified: bool,
    pub id_token: IdentityToken,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAccount")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("email_verified", &self.email_verified)
            .field("id_token", &self.id_token)
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl UserAccount {
    /// Whether the cached token should be refreshed before use
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECONDS) >= self.expires_at
    }
}

/// Opaque body returned by the session exchange endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionResponse(pub serde_json::Value);

impl SessionResponse {
    #[must_use]
    pub fn body(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Uniform outcome of every auth operation, consumed by the UI layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResult {
    pub success: bool,
    #[serde(skip)]
    pub token: Option<IdentityToken>,
    pub error_kind: Option<ErrorKind>,
    pub message: Option<String>,
}

impl AuthResult {
    #[must_use]
    pub fn success(token: Option<IdentityToken>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            token,
            error_kind: None,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn failure(failure: AuthFailure) -> Self {
        Self {
            success: false,
            token: None,
            error_kind: Some(failure.kind),
            message: Some(failure.message),
        }
    }
}

impl From<Result<AuthResult, AuthFailure>> for AuthResult {
    fn from(result: Result<AuthResult, AuthFailure>) -> Self {
        result.unwrap_or_else(Self::failure)
    }
}
