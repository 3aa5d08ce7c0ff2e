//! Session Manager - stateless encrypted sessions
//!
//! All session state lives in the `visioneer_session` cookie; the manager
//! only holds the derived key and cookie policy.

use actix_web::cookie::Cookie;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use anyhow::{anyhow, Result};

use crate::models::SessionUser;
use crate::session::cookie::{CookieFactory, COOKIE_NAME};
use crate::settings::{VisioneerSettings, MAX_SESSION_DURATION_HOURS};
use crate::utils::crypto::{decrypt_data, derive_encryption_key};
use crate::utils::logging::LoggingHelper;
use crate::utils::responses::ResponseBuilder;
use crate::verification::VerifiedIdentity;

/// Error wrapper so session failures can be returned from handlers
#[derive(Debug)]
pub struct SessionError(anyhow::Error);

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<anyhow::Error> for SessionError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl ResponseError for SessionError {
    fn error_response(&self) -> HttpResponse {
        ResponseBuilder::authentication_required()
    }
}

#[derive(Clone)]
pub struct SessionManager {
    encryption_key: [u8; 32],
    cookie_secure: bool,
    session_duration_hours: u64,
    cookie_factory: CookieFactory,
}

impl SessionManager {
    #[must_use]
    pub fn new(key: &[u8], cookie_secure: bool, session_duration_hours: u64) -> Self {
        let encryption_key = derive_encryption_key(key);
        let session_duration_hours = session_duration_hours.min(MAX_SESSION_DURATION_HOURS);
        Self {
            encryption_key,
            cookie_secure,
            session_duration_hours,
            cookie_factory: CookieFactory::new(
                encryption_key,
                cookie_secure,
                session_duration_hours,
            ),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &VisioneerSettings) -> Self {
        Self::new(
            settings.session.session_secret.as_bytes(),
            settings.cookies.secure,
            settings.session.session_duration_hours,
        )
    }

    /// Start a session for a verified identity
    #[must_use]
    pub fn create_session(&self, identity: VerifiedIdentity) -> SessionUser {
        let session = SessionUser::from_identity(identity, self.session_duration_hours);
        LoggingHelper::log_session_created(&session.uid, session.email.as_deref());
        session
    }

    /// Encrypt `session` into its cookie
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails
    pub fn create_session_cookie(&self, session: &SessionUser) -> Result<Cookie<'static>> {
        self.cookie_factory.create_session_cookie(session)
    }

    /// Cookie that removes the session from the browser
    #[must_use]
    pub fn clear_session_cookie(&self) -> Cookie<'static> {
        self.cookie_factory.create_expired_cookie()
    }

    /// Read and validate the session carried by `req`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No session cookie is found
    /// - Session decryption fails
    /// - The session has expired
    pub fn extract_session(&self, req: &HttpRequest) -> Result<SessionUser> {
        let cookie = req
            .cookie(COOKIE_NAME)
            .ok_or_else(|| anyhow!("No session cookie found"))?;

        let session = self.decrypt_session(cookie.value())?;
        if session.is_expired() {
            LoggingHelper::log_session_rejected("expired");
            return Err(anyhow!("Session has expired"));
        }
        Ok(session)
    }

    /// Decrypt a raw cookie value without checking expiry
    ///
    /// # Errors
    ///
    /// Returns an error if the value was not produced with this manager's key
    pub fn decrypt_session(&self, cookie_value: &str) -> Result<SessionUser> {
        decrypt_data::<SessionUser>(cookie_value, &self.encryption_key).inspect_err(|e| {
            LoggingHelper::log_session_rejected(&e.to_string());
        })
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    #[must_use]
    pub fn session_duration_hours(&self) -> u64 {
        self.session_duration_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::TestFixtures;
    use crate::testing::RequestBuilder;
    use actix_web::http::StatusCode;
    use chrono::{Duration, Utc};

    const TEST_KEY: &[u8] = b"test_session_secret_key_32_chars";

    #[test]
    fn test_session_round_trip_through_request() {
        let manager = SessionManager::new(TEST_KEY, false, 24);
        let session = manager.create_session(TestFixtures::verified_identity());
        let cookie = manager.create_session_cookie(&session).unwrap();

        let req = RequestBuilder::new().with_cookie(cookie).build();
        let extracted = manager.extract_session(&req).unwrap();
        assert_eq!(extracted, session);
    }

    #[test]
    fn test_session_extraction_without_cookie() {
        let manager = SessionManager::new(TEST_KEY, false, 24);
        let req = RequestBuilder::new().build();

        let err = manager.extract_session(&req).unwrap_err();
        assert!(err.to_string().contains("No session cookie found"));
    }

    #[test]
    fn test_expired_session_is_rejected() {
        let manager = SessionManager::new(TEST_KEY, false, 24);
        let mut session = TestFixtures::session_user();
        session.expires_at = Utc::now() - Duration::minutes(1);
        let cookie = manager.create_session_cookie(&session).unwrap();

        let req = RequestBuilder::new().with_cookie(cookie).build();
        let err = manager.extract_session(&req).unwrap_err();
        assert!(err.to_string().contains("Session has expired"));
    }

    #[test]
    fn test_cookie_from_another_key_is_rejected() {
        let issuer = SessionManager::new(b"first key", false, 24);
        let verifier = SessionManager::new(b"second key", false, 24);
        let cookie = issuer
            .create_session_cookie(&TestFixtures::session_user())
            .unwrap();

        let req = RequestBuilder::new().with_cookie(cookie).build();
        assert!(verifier.extract_session(&req).is_err());
    }

    #[test]
    fn test_clear_cookie_respects_secure_flag() {
        let manager = SessionManager::new(TEST_KEY, true, 24);
        let cookie = manager.clear_session_cookie();
        assert_eq!(cookie.name(), COOKIE_NAME);
        assert_eq!(cookie.secure(), Some(true));
        assert!(manager.cookie_secure());
        assert_eq!(manager.session_duration_hours(), 24);
    }

    #[test]
    fn test_oversized_lifetime_still_issues_sessions() {
        let manager = SessionManager::new(TEST_KEY, false, u64::MAX);
        assert_eq!(manager.session_duration_hours(), MAX_SESSION_DURATION_HOURS);

        let session = manager.create_session(TestFixtures::verified_identity());
        let cookie = manager.create_session_cookie(&session).unwrap();
        let req = RequestBuilder::new().with_cookie(cookie).build();
        assert_eq!(manager.extract_session(&req).unwrap(), session);
    }

    #[test]
    fn test_session_error_is_unauthorized() {
        let error = SessionError::from(anyhow!("No session cookie found"));
        assert_eq!(error.error_response().status(), StatusCode::UNAUTHORIZED);
    }
}
