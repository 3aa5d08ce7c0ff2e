//! Client-side identity flow
//!
//! - [`provider`] - seams for the identity provider and the interactive OAuth step
//! - [`firebase`] - Firebase Authentication over its REST API
//! - [`exchange`] - POSTing identity tokens to the backend session endpoint
//! - [`client`] - orchestration producing a uniform [`AuthResult`]
//! - [`errors`] - provider codes and the fixed error taxonomy

pub mod client;
pub mod errors;
pub mod exchange;
pub mod firebase;
pub mod models;
pub mod provider;

pub use client::AuthClient;
pub use errors::{map_error, AuthFailure, ErrorKind, ProviderErrorCode};
pub use exchange::SessionExchangeClient;
pub use firebase::FirebaseIdentityProvider;
pub use models::{
    AuthResult, Credential, IdentityToken, OAuthProviderKind, OAuthToken, SessionResponse,
    UserAccount,
};
pub use provider::{IdentityProvider, OAuthPopup, PreissuedToken};
