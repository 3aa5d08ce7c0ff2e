//! Pre-built test objects

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::identity::{IdentityToken, UserAccount};
use crate::models::SessionUser;
use crate::session::SessionManager;
use crate::settings::{CookieSettings, FirebaseConfig, SessionSettings, VisioneerSettings};
use crate::verification::VerifiedIdentity;

use super::constants::{
    TEST_DISPLAY_NAME, TEST_EMAIL, TEST_PROJECT_ID, TEST_SESSION_SECRET, TEST_UID,
};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    #[must_use]
    pub fn firebase_config() -> FirebaseConfig {
        FirebaseConfig {
            api_key: "test-api-key".to_string(),
            auth_domain: format!("{TEST_PROJECT_ID}.firebaseapp.com"),
            project_id: TEST_PROJECT_ID.to_string(),
            storage_bucket: format!("{TEST_PROJECT_ID}.appspot.com"),
            messaging_sender_id: "1234567890".to_string(),
            app_id: "1:1234567890:web:abcdef".to_string(),
            measurement_id: None,
        }
    }

    /// Settings with a fixed session secret and insecure cookies
    #[must_use]
    pub fn settings() -> VisioneerSettings {
        VisioneerSettings {
            firebase: Self::firebase_config(),
            session: SessionSettings {
                session_secret: TEST_SESSION_SECRET.to_string(),
                ..SessionSettings::default()
            },
            cookies: CookieSettings { secure: false },
            ..VisioneerSettings::default()
        }
    }

    #[must_use]
    pub fn session_manager() -> SessionManager {
        SessionManager::from_settings(&Self::settings())
    }

    #[must_use]
    pub fn verified_identity() -> VerifiedIdentity {
        VerifiedIdentity {
            uid: TEST_UID.to_string(),
            email: Some(TEST_EMAIL.to_string()),
            name: Some(TEST_DISPLAY_NAME.to_string()),
            picture: Some("https://example.com/avatar.png".to_string()),
            email_verified: true,
        }
    }

    #[must_use]
    pub fn session_user() -> SessionUser {
        let now = Utc::now();
        SessionUser {
            session_id: Uuid::new_v4(),
            uid: TEST_UID.to_string(),
            email: Some(TEST_EMAIL.to_string()),
            name: Some(TEST_DISPLAY_NAME.to_string()),
            picture: None,
            email_verified: true,
            authenticated_at: now,
            expires_at: now + Duration::hours(1),
        }
    }

    /// A signed-in account whose token does not need a refresh
    #[must_use]
    pub fn user_account(id_token: &str) -> UserAccount {
        UserAccount {
            uid: TEST_UID.to_string(),
            email: Some(TEST_EMAIL.to_string()),
            display_name: Some(TEST_DISPLAY_NAME.to_string()),
            email_verified: false,
            id_token: IdentityToken::new(id_token),
            refresh_token: "test-refresh-token".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }
}
