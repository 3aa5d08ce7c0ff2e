use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Result of a password strength check; `errors` lists every rule that failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCheck {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Server-side checks on user input
pub struct InputValidator;

impl InputValidator {
    #[must_use]
    pub fn validate_email(email: &str) -> bool {
        EMAIL_PATTERN.is_match(email)
    }

    #[must_use]
    pub fn validate_password(password: &str) -> PasswordCheck {
        let mut errors = Vec::new();

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
            ));
        }
        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push("Password must contain at least one uppercase letter".to_string());
        }
        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push("Password must contain at least one lowercase letter".to_string());
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push("Password must contain at least one number".to_string());
        }

        PasswordCheck {
            valid: errors.is_empty(),
            errors,
        }
    }
}
