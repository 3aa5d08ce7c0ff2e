//! Identity error taxonomy
//!
//! Provider error codes are stringly typed on the wire (`auth/wrong-password`
//! from the web SDK, `INVALID_PASSWORD` from the REST API). Both are parsed at
//! the boundary into [`ProviderErrorCode`], and [`map_error`] turns that closed
//! enum into exactly one [`ErrorKind`] plus a fixed user-facing message.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fallback message for codes the taxonomy does not know about
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please try again.";

/// Message reported when sign-out fails for any reason
pub const SIGN_OUT_FAILED_MESSAGE: &str = "Failed to sign out. Please try again.";

/// Fixed taxonomy of identity failures surfaced to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmailInUse,
    InvalidEmail,
    OperationNotAllowed,
    WeakPassword,
    UserDisabled,
    UserNotFound,
    WrongPassword,
    TooManyAttempts,
    Network,
    PopupClosed,
    PopupBlocked,
    AccountExistsDifferentCredential,
    InvalidCredential,
    RequiresRecentLogin,
    SignOutFailed,
    Unknown,
}

/// Error codes reported by the identity provider
///
/// Every known code has its own variant. Anything else is carried verbatim in
/// [`ProviderErrorCode::Unrecognized`] together with the provider's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderErrorCode {
    EmailAlreadyInUse,
    InvalidEmail,
    OperationNotAllowed,
    WeakPassword,
    UserDisabled,
    UserNotFound,
    WrongPassword,
    TooManyRequests,
    NetworkRequestFailed,
    PopupClosedByUser,
    CancelledPopupRequest,
    PopupBlocked,
    AccountExistsWithDifferentCredential,
    InvalidCredential,
    RequiresRecentLogin,
    Unrecognized {
        code: String,
        message: Option<String>,
    },
}

impl ProviderErrorCode {
    /// All codes with a dedicated mapping, in taxonomy order
    pub const KNOWN: [Self; 15] = [
        Self::EmailAlreadyInUse,
        Self::InvalidEmail,
        Self::OperationNotAllowed,
        Self::WeakPassword,
        Self::UserDisabled,
        Self::UserNotFound,
        Self::WrongPassword,
        Self::TooManyRequests,
        Self::NetworkRequestFailed,
        Self::PopupClosedByUser,
        Self::CancelledPopupRequest,
        Self::PopupBlocked,
        Self::AccountExistsWithDifferentCredential,
        Self::InvalidCredential,
        Self::RequiresRecentLogin,
    ];

    /// Parse a web SDK style code such as `auth/wrong-password`
    #[must_use]
    pub fn from_sdk_code(code: &str) -> Self {
        match code.trim() {
            "auth/email-already-in-use" => Self::EmailAlreadyInUse,
            "auth/invalid-email" => Self::InvalidEmail,
            "auth/operation-not-allowed" => Self::OperationNotAllowed,
            "auth/weak-password" => Self::WeakPassword,
            "auth/user-disabled" => Self::UserDisabled,
            "auth/user-not-found" => Self::UserNotFound,
            "auth/wrong-password" => Self::WrongPassword,
            "auth/too-many-requests" => Self::TooManyRequests,
            "auth/network-request-failed" => Self::NetworkRequestFailed,
            "auth/popup-closed-by-user" => Self::PopupClosedByUser,
            "auth/cancelled-popup-request" => Self::CancelledPopupRequest,
            "auth/popup-blocked" => Self::PopupBlocked,
            "auth/account-exists-with-different-credential" => {
                Self::AccountExistsWithDifferentCredential
            }
            "auth/invalid-credential" => Self::InvalidCredential,
            "auth/requires-recent-login" => Self::RequiresRecentLogin,
            other => Self::Unrecognized {
                code: other.to_string(),
                message: None,
            },
        }
    }

    /// Parse an Identity Toolkit REST error message such as `EMAIL_EXISTS`
    ///
    /// The REST API sometimes appends a detail (`WEAK_PASSWORD : Password should
    /// be at least 6 characters`); only the leading token is classified.
    #[must_use]
    pub fn from_rest_message(message: &str) -> Self {
        let code = message.split(" : ").next().unwrap_or(message).trim();
        match code {
            "EMAIL_EXISTS" => Self::EmailAlreadyInUse,
            "INVALID_EMAIL" | "MISSING_EMAIL" => Self::InvalidEmail,
            "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => Self::OperationNotAllowed,
            "WEAK_PASSWORD" => Self::WeakPassword,
            "USER_DISABLED" => Self::UserDisabled,
            "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => Self::UserNotFound,
            "INVALID_PASSWORD" => Self::WrongPassword,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyRequests,
            "FEDERATED_USER_ID_ALREADY_LINKED" | "NEED_CONFIRMATION" => {
                Self::AccountExistsWithDifferentCredential
            }
            "INVALID_LOGIN_CREDENTIALS" | "INVALID_IDP_RESPONSE" => Self::InvalidCredential,
            "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" | "TOKEN_EXPIRED" | "INVALID_ID_TOKEN" => {
                Self::RequiresRecentLogin
            }
            other => Self::Unrecognized {
                code: other.to_string(),
                message: Some(message.to_string()),
            },
        }
    }

    /// Transport-level failure (connection refused, DNS, TLS, timeout)
    #[must_use]
    pub fn network() -> Self {
        Self::NetworkRequestFailed
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::InvalidEmail => "auth/invalid-email",
            Self::OperationNotAllowed => "auth/operation-not-allowed",
            Self::WeakPassword => "auth/weak-password",
            Self::UserDisabled => "auth/user-disabled",
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::TooManyRequests => "auth/too-many-requests",
            Self::NetworkRequestFailed => "auth/network-request-failed",
            Self::PopupClosedByUser => "auth/popup-closed-by-user",
            Self::CancelledPopupRequest => "auth/cancelled-popup-request",
            Self::PopupBlocked => "auth/popup-blocked",
            Self::AccountExistsWithDifferentCredential => {
                "auth/account-exists-with-different-credential"
            }
            Self::InvalidCredential => "auth/invalid-credential",
            Self::RequiresRecentLogin => "auth/requires-recent-login",
            Self::Unrecognized { code, .. } => code,
        };
        f.write_str(code)
    }
}

/// A normalised identity failure: one taxonomy member plus a user-facing message
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl AuthFailure {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn sign_out_failed() -> Self {
        Self::new(ErrorKind::SignOutFailed, SIGN_OUT_FAILED_MESSAGE)
    }
}

impl From<ProviderErrorCode> for AuthFailure {
    fn from(code: ProviderErrorCode) -> Self {
        map_error(&code)
    }
}

/// Map a provider code to its taxonomy member and fixed message
#[must_use]
pub fn map_error(code: &ProviderErrorCode) -> AuthFailure {
    let (kind, message) = match code {
        ProviderErrorCode::EmailAlreadyInUse => (
            ErrorKind::EmailInUse,
            "An account with this email already exists.",
        ),
        ProviderErrorCode::InvalidEmail => {
            (ErrorKind::InvalidEmail, "Please enter a valid email address.")
        }
        ProviderErrorCode::OperationNotAllowed => (
            ErrorKind::OperationNotAllowed,
            "This sign-in method is not enabled.",
        ),
        ProviderErrorCode::WeakPassword => (
            ErrorKind::WeakPassword,
            "Password should be at least 6 characters.",
        ),
        ProviderErrorCode::UserDisabled => {
            (ErrorKind::UserDisabled, "This account has been disabled.")
        }
        ProviderErrorCode::UserNotFound => (
            ErrorKind::UserNotFound,
            "No account found with this email address.",
        ),
        ProviderErrorCode::WrongPassword => (
            ErrorKind::WrongPassword,
            "Incorrect password. Please try again.",
        ),
        ProviderErrorCode::TooManyRequests => (
            ErrorKind::TooManyAttempts,
            "Too many failed attempts. Please try again later.",
        ),
        ProviderErrorCode::NetworkRequestFailed => (
            ErrorKind::Network,
            "Network error. Please check your connection and try again.",
        ),
        ProviderErrorCode::PopupClosedByUser => (
            ErrorKind::PopupClosed,
            "Sign-in popup was closed before completing.",
        ),
        ProviderErrorCode::CancelledPopupRequest => (
            ErrorKind::PopupClosed,
            "Sign-in was cancelled because another popup was opened.",
        ),
        ProviderErrorCode::PopupBlocked => (
            ErrorKind::PopupBlocked,
            "Sign-in popup was blocked. Please allow popups for this site.",
        ),
        ProviderErrorCode::AccountExistsWithDifferentCredential => (
            ErrorKind::AccountExistsDifferentCredential,
            "An account already exists with the same email but different sign-in credentials.",
        ),
        ProviderErrorCode::InvalidCredential => (
            ErrorKind::InvalidCredential,
            "Invalid credentials. Please check your email and password.",
        ),
        ProviderErrorCode::RequiresRecentLogin => (
            ErrorKind::RequiresRecentLogin,
            "Please sign in again to complete this action.",
        ),
        ProviderErrorCode::Unrecognized { message, .. } => {
            let message = message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(GENERIC_ERROR_MESSAGE);
            return AuthFailure::new(ErrorKind::Unknown, message);
        }
    };
    AuthFailure::new(kind, message)
}
