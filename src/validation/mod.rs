//! Request validation
//!
//! - [`core`] - lenient JSON body and field extraction
//! - [`input`] - email format and password strength rules

pub mod core;
pub mod input;

pub use self::core::{extract_optional_string, parse_json_object};
pub use input::{InputValidator, PasswordCheck};
