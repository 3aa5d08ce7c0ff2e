use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::settings::MAX_SESSION_DURATION_HOURS;
use crate::verification::VerifiedIdentity;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
}

/// Session data carried in the encrypted `visioneer_session` cookie
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SessionUser {
    pub session_id: Uuid,
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub email_verified: bool,
    pub authenticated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionUser {
    /// Start a session for a verified identity lasting `duration_hours`,
    /// capped at [`MAX_SESSION_DURATION_HOURS`]
    #[must_use]
    pub fn from_identity(identity: VerifiedIdentity, duration_hours: u64) -> Self {
        let now = Utc::now();
        let hours = i64::try_from(duration_hours.min(MAX_SESSION_DURATION_HOURS)).unwrap_or(24);
        let expires_at = TimeDelta::try_hours(hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(now);
        Self {
            session_id: Uuid::new_v4(),
            uid: identity.uid,
            email: identity.email,
            name: identity.name,
            picture: identity.picture,
            email_verified: identity.email_verified,
            authenticated_at: now,
            expires_at,
        }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// The user as returned by the API
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            uid: self.uid.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            picture: self.picture.clone(),
        }
    }
}

/// Public user fields in API responses
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserProfile {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> VerifiedIdentity {
        VerifiedIdentity {
            uid: "uid-1".to_string(),
            email: Some("ada@example.com".to_string()),
            name: Some("Ada".to_string()),
            picture: None,
            email_verified: true,
        }
    }

    #[test]
    fn test_session_from_identity() {
        let session = SessionUser::from_identity(identity(), 24);
        assert_eq!(session.uid, "uid-1");
        assert!(!session.is_expired());
        assert_eq!(
            (session.expires_at - session.authenticated_at).num_hours(),
            24
        );
    }

    #[test]
    fn test_oversized_duration_is_capped() {
        let session = SessionUser::from_identity(identity(), 10_000_000_000_000_000);
        assert!(!session.is_expired());
        assert_eq!(
            (session.expires_at - session.authenticated_at).num_hours(),
            i64::try_from(MAX_SESSION_DURATION_HOURS).unwrap()
        );
    }

    #[test]
    fn test_zero_duration_session_is_expired() {
        assert!(SessionUser::from_identity(identity(), 0).is_expired());
    }

    #[test]
    fn test_profile_omits_session_fields() {
        let profile = serde_json::to_value(SessionUser::from_identity(identity(), 1).profile())
            .unwrap();
        assert_eq!(
            profile,
            serde_json::json!({
                "uid": "uid-1",
                "email": "ada@example.com",
                "name": "Ada",
                "picture": null
            })
        );
    }
}
