//! Shared test utilities
//!
//! Available to unit tests and, with the `testing` feature, to the
//! integration tests under `tests/`.
//!
//! - [`fixtures`] - pre-built settings, identities and sessions
//! - [`requests`] - HTTP request builders for handler tests
//! - [`mock`] - stub identity provider, popup and token verifier
//! - [`keys`] - RSA key for minting signed identity tokens

pub mod fixtures;
pub mod keys;
pub mod mock;
pub mod requests;

pub use fixtures::TestFixtures;
pub use keys::TestSigningKey;
pub use mock::{ClosedPopup, StubIdentityProvider, StubTokenVerifier};
pub use requests::RequestBuilder;

/// Common test constants
pub mod constants {
    pub const TEST_EMAIL: &str = "ada@example.com";
    pub const TEST_DISPLAY_NAME: &str = "Ada Lovelace";
    pub const TEST_UID: &str = "firebase-uid-123";
    pub const TEST_PROJECT_ID: &str = "visioneer-test";
    pub const TEST_SESSION_SECRET: &str = "test_session_secret_for_visioneer_32b";
    pub const TEST_PASSWORD: &str = "Sup3rSecret";
}
