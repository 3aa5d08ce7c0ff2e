//! Session Management Module
//!
//! - [`manager`] - creating, reading and clearing encrypted sessions
//! - [`cookie`] - cookie construction with the configured security attributes

pub mod cookie;
pub mod manager;

pub use cookie::{create_expired_cookie, CookieFactory, COOKIE_NAME};
pub use manager::{SessionError, SessionManager};
