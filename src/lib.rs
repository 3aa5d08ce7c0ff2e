#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the visioneer application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod handlers;
pub mod identity;
pub mod models;
pub mod preferences;
pub mod session;
pub mod settings;
pub mod ui;
pub mod utils;
pub mod validation;
pub mod verification;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use handlers::{api_login, api_logout, get_user, health};
pub use identity::{AuthClient, FirebaseIdentityProvider};
pub use models::SessionUser;
pub use session::SessionManager;
pub use settings::VisioneerSettings;
pub use verification::{FirebaseTokenVerifier, TokenVerifier};
