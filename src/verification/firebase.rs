// Firebase ID token verification: RS256 signatures against the published JWK set,
// plus issuer, audience, subject and lifetime checks

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use log::debug;
use rsa::{pkcs1v15::VerifyingKey, RsaPublicKey};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use tokio::sync::RwLock;

use super::jwks::{JsonWebKey, JsonWebKeySet, JwksCache};
use super::{TokenVerificationError, TokenVerifier, VerifiedIdentity};
use crate::settings::VisioneerSettings;
use crate::utils::logging::LoggingHelper;

#[derive(Debug, Deserialize)]
struct JwtHeader {
    alg: String,
    kid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    iss: Option<String>,
    aud: Option<Value>,
    exp: Option<i64>,
    iat: Option<i64>,
    sub: Option<String>,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

#[derive(Clone)]
pub struct FirebaseTokenVerifier {
    http_client: reqwest::Client,
    jwks_url: String,
    project_id: String,
    issuer: String,
    clock_skew: i64,
    cache: Arc<RwLock<JwksCache>>,
}

impl FirebaseTokenVerifier {
    /// Build a verifier for the configured Firebase project
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed
    pub fn new(settings: &VisioneerSettings) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.identity.request_timeout_seconds))
            .build()?;
        Ok(Self {
            http_client,
            jwks_url: settings.identity.jwks_url.clone(),
            project_id: settings.firebase.project_id.clone(),
            issuer: settings.firebase.token_issuer(),
            clock_skew: i64::try_from(settings.token_validation.clock_skew_seconds)
                .unwrap_or(i64::MAX),
            cache: Arc::new(RwLock::new(JwksCache::new(Duration::from_secs(
                settings.token_validation.cache_duration_seconds,
            )))),
        })
    }

    /// Fetch the JWK set and replace the cached keys
    ///
    /// # Errors
    ///
    /// Returns an error during the back-off after a failed fetch, or if the
    /// keys cannot be fetched or parsed
    pub async fn refresh_keys(&self) -> Result<(), TokenVerificationError> {
        if !self.cache.read().await.should_retry_fetch() {
            return Err(TokenVerificationError::JwksFetchFailed(
                "Skipping fetch due to recent failure and backoff".to_string(),
            ));
        }

        debug!("🔑 Fetching signing keys from {}", self.jwks_url);
        match self.fetch_jwks().await {
            Ok(jwks) => {
                let mut cache = self.cache.write().await;
                cache.store_keys(jwks.keys);
                LoggingHelper::log_jwks_refreshed(cache.len());
                Ok(())
            }
            Err(e) => {
                self.cache.write().await.record_fetch_failure();
                Err(e)
            }
        }
    }

    async fn fetch_jwks(&self) -> Result<JsonWebKeySet, TokenVerificationError> {
        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| TokenVerificationError::JwksFetchFailed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(TokenVerificationError::JwksFetchFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }
        response.json().await.map_err(|e| {
            TokenVerificationError::JwksFetchFailed(format!("Failed to parse JWKS: {e}"))
        })
    }

    async fn get_public_key(&self, kid: &str) -> Result<JsonWebKey, TokenVerificationError> {
        {
            let cache = self.cache.read().await;
            if cache.is_cache_valid() {
                if let Some(key) = cache.get_key(kid) {
                    return Ok(key.clone());
                }
                if !cache.should_refetch_for_unknown_key() {
                    debug!("Unknown key id {kid}; keys were refreshed too recently to refetch");
                    return Err(TokenVerificationError::KeyNotFound(kid.to_string()));
                }
            }
        }

        // Expired cache or a rotated key
        self.refresh_keys().await?;
        self.cache
            .read()
            .await
            .get_key(kid)
            .cloned()
            .ok_or_else(|| TokenVerificationError::KeyNotFound(kid.to_string()))
    }

    fn validate_claims(
        &self,
        claims: &FirebaseClaims,
        now: i64,
    ) -> Result<(), TokenVerificationError> {
        let exp = claims
            .exp
            .ok_or_else(|| TokenVerificationError::InvalidToken("missing exp".to_string()))?;
        if now > exp.saturating_add(self.clock_skew) {
            return Err(TokenVerificationError::TokenExpired);
        }

        let iat = claims
            .iat
            .ok_or_else(|| TokenVerificationError::InvalidToken("missing iat".to_string()))?;
        if iat > now.saturating_add(self.clock_skew) {
            return Err(TokenVerificationError::TokenNotYetValid);
        }

        let issuer = claims.iss.as_deref().unwrap_or_default();
        if issuer != self.issuer {
            return Err(claim_mismatch("iss", &self.issuer, issuer));
        }

        let audience_matches = match &claims.aud {
            Some(Value::String(aud)) => *aud == self.project_id,
            Some(Value::Array(auds)) => auds
                .iter()
                .any(|aud| aud.as_str() == Some(self.project_id.as_str())),
            _ => false,
        };
        if !audience_matches {
            let actual = claims.aud.as_ref().map(ToString::to_string).unwrap_or_default();
            return Err(claim_mismatch("aud", &self.project_id, &actual));
        }

        if claims.sub.as_deref().is_none_or(str::is_empty) {
            return Err(claim_mismatch("sub", "non-empty subject", ""));
        }

        Ok(())
    }
}

#[async_trait]
impl TokenVerifier for FirebaseTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, TokenVerificationError> {
        let parts: Vec<&str> = token.split('.').collect();
        let [header_b64, claims_b64, signature_b64] = parts.as_slice() else {
            return Err(TokenVerificationError::InvalidToken(
                "Invalid JWT format".to_string(),
            ));
        };

        let header: JwtHeader = decode_part(header_b64, "header")?;
        if header.alg != "RS256" {
            return Err(TokenVerificationError::UnsupportedAlgorithm(header.alg));
        }
        let kid = header
            .kid
            .ok_or_else(|| TokenVerificationError::InvalidToken("missing kid".to_string()))?;

        let public_key = self.get_public_key(&kid).await?;
        let signature = general_purpose::URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|e| {
                TokenVerificationError::InvalidToken(format!("Invalid signature encoding: {e}"))
            })?;
        verify_rs256(
            format!("{header_b64}.{claims_b64}").as_bytes(),
            &signature,
            &public_key,
        )?;

        let claims: FirebaseClaims = decode_part(claims_b64, "claims")?;
        self.validate_claims(&claims, chrono::Utc::now().timestamp())?;

        Ok(VerifiedIdentity {
            uid: claims.sub.unwrap_or_default(),
            email: claims.email,
            name: claims.name,
            picture: claims.picture,
            email_verified: claims.email_verified,
        })
    }
}

fn claim_mismatch(claim: &str, expected: &str, actual: &str) -> TokenVerificationError {
    TokenVerificationError::ClaimValidationFailed {
        claim: claim.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

fn decode_part<T: serde::de::DeserializeOwned>(
    part: &str,
    name: &str,
) -> Result<T, TokenVerificationError> {
    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|e| TokenVerificationError::InvalidToken(format!("Invalid {name} encoding: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| TokenVerificationError::InvalidToken(format!("Invalid {name} JSON: {e}")))
}

fn verify_rs256(
    signing_input: &[u8],
    signature: &[u8],
    public_key: &JsonWebKey,
) -> Result<(), TokenVerificationError> {
    use rsa::signature::Verifier;

    let decode = |value: Option<&String>, what: &str| {
        let value = value.ok_or_else(|| {
            TokenVerificationError::KeyDecodingFailed(format!("Missing RSA {what}"))
        })?;
        general_purpose::URL_SAFE_NO_PAD.decode(value).map_err(|e| {
            TokenVerificationError::KeyDecodingFailed(format!("Invalid {what} encoding: {e}"))
        })
    };
    let n = decode(public_key.n.as_ref(), "modulus")?;
    let e = decode(public_key.e.as_ref(), "exponent")?;

    let rsa_key = RsaPublicKey::new(
        rsa::BigUint::from_bytes_be(&n),
        rsa::BigUint::from_bytes_be(&e),
    )
    .map_err(|e| TokenVerificationError::KeyDecodingFailed(format!("Invalid RSA key: {e}")))?;

    let signature = rsa::pkcs1v15::Signature::try_from(signature)
        .map_err(|_| TokenVerificationError::SignatureInvalid)?;
    VerifyingKey::<Sha256>::new(rsa_key)
        .verify(signing_input, &signature)
        .map_err(|_| TokenVerificationError::SignatureInvalid)
}
