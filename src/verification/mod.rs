//! Backend verification of identity tokens
//!
//! Handlers depend on the [`TokenVerifier`] trait; [`FirebaseTokenVerifier`]
//! is the production implementation, checking RS256 signatures against the
//! provider's published JWK set.

pub mod firebase;
pub mod jwks;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use firebase::FirebaseTokenVerifier;
pub use jwks::{JsonWebKey, JsonWebKeySet, JwksCache};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenVerificationError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("Key not found: {0}")]
    KeyNotFound(String),
    #[error("Failed to decode key: {0}")]
    KeyDecodingFailed(String),
    #[error("Token signature verification failed")]
    SignatureInvalid,
    #[error("Failed to fetch signing keys: {0}")]
    JwksFetchFailed(String),
    #[error("Token has expired")]
    TokenExpired,
    #[error("Token was issued in the future")]
    TokenNotYetValid,
    #[error("Claim '{claim}' validation failed: expected '{expected}', got '{actual}'")]
    ClaimValidationFailed {
        claim: String,
        expected: String,
        actual: String,
    },
}

/// The user a verified token speaks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub email_verified: bool,
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify `token` and return the identity it carries
    ///
    /// # Errors
    ///
    /// Returns an error if the token is malformed, its signature does not
    /// verify, or any claim check fails
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, TokenVerificationError>;
}
