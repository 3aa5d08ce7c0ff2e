// Centralized logging for recurring auth events. Tokens and passwords never reach these.
use log::{debug, info, warn};

use crate::identity::AuthFailure;
use crate::settings::FirebaseConfig;

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log the outcome of a client-side identity operation
    pub fn log_auth_outcome(operation: &str, failure: Option<&AuthFailure>) {
        match failure {
            None => info!("✅ {operation} succeeded"),
            Some(failure) => warn!(
                "❌ {operation} failed: {:?} ({})",
                failure.kind, failure.message
            ),
        }
    }

    /// Log the identity provider configuration status at startup
    pub fn log_firebase_config(config: &FirebaseConfig) {
        let missing = config.validate();
        if missing.is_empty() {
            info!(
                "✅ Firebase configured for project {} ({})",
                config.project_id, config.auth_domain
            );
        } else {
            warn!("❌ Firebase configuration incomplete, missing: {missing:?}");
        }
    }

    pub fn log_session_created(uid: &str, email: Option<&str>) {
        info!(
            "🔐 Session created for user {} ({})",
            uid,
            email.unwrap_or("no email")
        );
    }

    pub fn log_session_ended(uid: &str) {
        info!("👋 Session ended for user {uid}");
    }

    pub fn log_token_verification_failed(reason: &dyn std::fmt::Display) {
        warn!("🚫 ID token verification failed: {reason}");
    }

    pub fn log_jwks_refreshed(key_count: usize) {
        debug!("🔄 Refreshed signing keys: {key_count} key(s) cached");
    }

    pub fn log_session_rejected(reason: &str) {
        debug!("Session cookie rejected: {reason}");
    }
}
