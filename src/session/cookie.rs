use actix_web::cookie::{time::Duration, Cookie, SameSite};
use anyhow::Result;

use crate::models::SessionUser;
use crate::settings::MAX_SESSION_DURATION_HOURS;
use crate::utils::crypto::encrypt_data;

pub const COOKIE_NAME: &str = "visioneer_session";

/// Creates encrypted session cookies with the configured security attributes
#[derive(Clone)]
pub struct CookieFactory {
    encryption_key: [u8; 32],
    cookie_secure: bool,
    session_duration_hours: u64,
}

impl CookieFactory {
    #[must_use]
    pub fn new(encryption_key: [u8; 32], cookie_secure: bool, session_duration_hours: u64) -> Self {
        Self {
            encryption_key,
            cookie_secure,
            session_duration_hours: session_duration_hours.min(MAX_SESSION_DURATION_HOURS),
        }
    }

    /// Create the encrypted session cookie
    ///
    /// HttpOnly, SameSite=Lax, path `/`, Secure when configured, max-age of
    /// the session lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails
    pub fn create_session_cookie(&self, session: &SessionUser) -> Result<Cookie<'static>> {
        let value = encrypt_data(session, &self.encryption_key)?;
        let hours = i64::try_from(self.session_duration_hours).unwrap_or(24);

        Ok(Cookie::build(COOKIE_NAME, value)
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(Duration::hours(hours))
            .finish())
    }

    #[must_use]
    pub fn create_expired_cookie(&self) -> Cookie<'static> {
        create_expired_cookie(COOKIE_NAME, self.cookie_secure)
    }
}

/// Create an expired cookie to clear a specific cookie
#[must_use]
pub fn create_expired_cookie(name: &str, secure: bool) -> Cookie<'static> {
    Cookie::build(name.to_owned(), "")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(-1))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::TestFixtures;
    use crate::utils::crypto::{decrypt_data, derive_encryption_key};

    #[test]
    fn test_session_cookie_attributes() {
        let key = derive_encryption_key(b"secret");
        let factory = CookieFactory::new(key, true, 12);
        let session = TestFixtures::session_user();

        let cookie = factory.create_session_cookie(&session).unwrap();
        assert_eq!(cookie.name(), COOKIE_NAME);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::hours(12)));

        let decrypted: SessionUser = decrypt_data(cookie.value(), &key).unwrap();
        assert_eq!(decrypted, session);
    }

    #[test]
    fn test_insecure_cookies_when_configured() {
        let factory = CookieFactory::new(derive_encryption_key(b"secret"), false, 24);
        let cookie = factory
            .create_session_cookie(&TestFixtures::session_user())
            .unwrap();
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn test_oversized_lifetime_is_capped() {
        let factory = CookieFactory::new(derive_encryption_key(b"secret"), true, u64::MAX);
        let cookie = factory
            .create_session_cookie(&TestFixtures::session_user())
            .unwrap();
        let max_hours = i64::try_from(MAX_SESSION_DURATION_HOURS).unwrap();
        assert_eq!(cookie.max_age(), Some(Duration::hours(max_hours)));
    }

    #[test]
    fn test_create_expired_cookie() {
        let cookie = create_expired_cookie(COOKIE_NAME, true);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::seconds(-1)));
        assert_eq!(cookie.secure(), Some(true));
    }
}
