use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VisioneerSettings {
    pub application: ApplicationSettings,
    pub firebase: FirebaseConfig,
    pub identity: IdentitySettings,
    pub session: SessionSettings,
    pub cookies: CookieSettings,
    pub token_validation: TokenValidationSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

/// Firebase web app configuration, as issued by the Firebase console
///
/// Field names follow the console's `firebaseConfig` object so the snippet can
/// be pasted into `Settings.toml` as-is.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    pub measurement_id: Option<String>,
}

/// Endpoints used by the client-side identity flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentitySettings {
    /// Identity Toolkit REST base, e.g. `https://identitytoolkit.googleapis.com/v1`
    pub identity_toolkit_url: String,
    /// Secure token REST base used for refreshing identity tokens
    pub secure_token_url: String,
    /// JWK set used by the backend to verify identity tokens
    pub jwks_url: String,
    /// Base URL of the backend that hosts the session endpoints
    pub backend_base_url: String,
    pub session_endpoint: String,
    pub logout_endpoint: String,
    pub request_timeout_seconds: u64,
}

/// Longest accepted session lifetime (one year)
pub const MAX_SESSION_DURATION_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    pub session_duration_hours: u64,
    pub session_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieSettings {
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenValidationSettings {
    #[serde(default = "default_clock_skew")]
    pub clock_skew_seconds: u64,
    #[serde(default = "default_cache_duration")]
    pub cache_duration_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

// Helper functions for serde defaults
fn default_clock_skew() -> u64 { 300 }
fn default_cache_duration() -> u64 { 3600 }

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: "http://localhost:5000,http://127.0.0.1:5000".to_string(),
        }
    }
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            identity_toolkit_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
            secure_token_url: "https://securetoken.googleapis.com/v1".to_string(),
            jwks_url:
                "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com"
                    .to_string(),
            backend_base_url: "http://localhost:5000".to_string(),
            session_endpoint: "/api/login".to_string(),
            logout_endpoint: "/api/logout".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            session_duration_hours: 24,
            session_secret: String::new(), // Will be generated if empty
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: true, // Default to secure cookies
        }
    }
}

impl Default for TokenValidationSettings {
    fn default() -> Self {
        Self {
            clock_skew_seconds: default_clock_skew(),
            cache_duration_seconds: default_cache_duration(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl FirebaseConfig {
    /// List the required values that are missing
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        [
            ("apiKey", &self.api_key),
            ("authDomain", &self.auth_domain),
            ("projectId", &self.project_id),
            ("storageBucket", &self.storage_bucket),
            ("appId", &self.app_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| format!("Missing required Firebase setting: {name}"))
        .collect()
    }

    /// Issuer expected in identity tokens minted for this project
    #[must_use]
    pub fn token_issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }
}

impl VisioneerSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Environment initialization fails
    /// - Settings file cannot be read or parsed
    /// - TOML parsing fails
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        // Initialize environment and logging
        Self::initialize_environment()?;

        // Load base settings from TOML or defaults
        let mut settings = Self::load_base_settings()?;

        // Apply environment variable overrides
        Self::apply_env_overrides(&mut settings);

        Ok(settings)
    }

    /// Initialize environment variables and logging
    ///
    /// # Errors
    ///
    /// Returns an error if logger initialization fails
    fn initialize_environment() -> Result<(), Box<dyn std::error::Error>> {
        Self::load_env_file();
        env_logger::try_init()?;
        Ok(())
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `VISIONEER_SECRETS_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read
    /// - TOML parsing fails
    fn load_base_settings() -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings = Self::default();

        let default_config_path = std::path::PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            settings = Self::from_toml_file(&default_config_path)?;
            println!(
                "✓ Loaded base settings from {}",
                default_config_path.display()
            );
        }

        if let Ok(secrets_dir) = std::env::var("VISIONEER_SECRETS_DIR") {
            let secrets_path = std::path::Path::new(&secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                settings = Self::from_toml_file(&secrets_path)?;
                println!("✓ Overriding settings from {}", secrets_path.display());
            } else {
                println!(
                    "ℹ VISIONEER_SECRETS_DIR set but no Settings.toml found at: {}",
                    secrets_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Parse a single settings file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML
    pub fn from_toml_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let toml_content = fs::read_to_string(path)?;
        Ok(basic_toml::from_str(&toml_content)?)
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        Self::apply_application_env_overrides(&mut settings.application);
        Self::apply_firebase_env_overrides(&mut settings.firebase);
        Self::apply_identity_env_overrides(&mut settings.identity);
        Self::apply_session_env_overrides(&mut settings.session);
        Self::apply_cookie_env_overrides(&mut settings.cookies);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    fn apply_application_env_overrides(app_settings: &mut ApplicationSettings) {
        if let Ok(host) = std::env::var("HOST") {
            app_settings.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
        if let Ok(cors_origins) = std::env::var("CORS_ORIGINS") {
            app_settings.cors_origins = cors_origins;
        }
    }

    /// Apply `FIREBASE_*` overrides
    pub fn apply_firebase_env_overrides(firebase: &mut FirebaseConfig) {
        Self::apply_string_env_override("FIREBASE_API_KEY", &mut firebase.api_key);
        Self::apply_string_env_override("FIREBASE_AUTH_DOMAIN", &mut firebase.auth_domain);
        Self::apply_string_env_override("FIREBASE_PROJECT_ID", &mut firebase.project_id);
        Self::apply_string_env_override("FIREBASE_STORAGE_BUCKET", &mut firebase.storage_bucket);
        Self::apply_string_env_override(
            "FIREBASE_MESSAGING_SENDER_ID",
            &mut firebase.messaging_sender_id,
        );
        Self::apply_string_env_override("FIREBASE_APP_ID", &mut firebase.app_id);
        if let Ok(measurement_id) = std::env::var("FIREBASE_MEASUREMENT_ID") {
            if !measurement_id.is_empty() {
                firebase.measurement_id = Some(measurement_id);
            }
        }
    }

    fn apply_identity_env_overrides(identity: &mut IdentitySettings) {
        Self::apply_string_env_override("BACKEND_BASE_URL", &mut identity.backend_base_url);
        Self::apply_string_env_override(
            "SESSION_EXCHANGE_ENDPOINT",
            &mut identity.session_endpoint,
        );
    }

    /// Apply environment overrides for session settings
    ///
    /// The session lifetime is capped at [`MAX_SESSION_DURATION_HOURS`].
    pub fn apply_session_env_overrides(session_settings: &mut SessionSettings) {
        Self::apply_numeric_env_override(
            "SESSION_DURATION_HOURS",
            &mut session_settings.session_duration_hours,
        );
        if session_settings.session_duration_hours > MAX_SESSION_DURATION_HOURS {
            log::warn!(
                "session_duration_hours {} exceeds the maximum, using {MAX_SESSION_DURATION_HOURS}",
                session_settings.session_duration_hours
            );
            session_settings.session_duration_hours = MAX_SESSION_DURATION_HOURS;
        }

        Self::handle_session_secret_override(session_settings);
    }

    fn apply_string_env_override(env_var: &str, target: &mut String) {
        if let Ok(value) = std::env::var(env_var) {
            if !value.is_empty() {
                *target = value;
            }
        }
    }

    fn apply_numeric_env_override(env_var: &str, target: &mut u64) {
        if let Ok(value_str) = std::env::var(env_var) {
            if let Ok(value) = value_str.parse::<u64>() {
                *target = value;
            }
        }
    }

    fn handle_session_secret_override(session_settings: &mut SessionSettings) {
        let env_secret_set = std::env::var("SESSION_SECRET").is_ok_and(|secret| {
            if secret.is_empty() {
                false
            } else {
                session_settings.session_secret = secret;
                true
            }
        });

        if !env_secret_set && session_settings.session_secret.is_empty() {
            session_settings.session_secret = Self::generate_random_session_secret();
            Self::warn_about_generated_secret();
        }
    }

    /// Generate 32 bytes (256 bits) of entropy for AES-256 compatibility
    fn generate_random_session_secret() -> String {
        crate::utils::crypto::generate_nonce(32)
    }

    fn warn_about_generated_secret() {
        eprintln!("⚠️  WARNING: Using auto-generated session secret");
        eprintln!("🔒 For production use, set the SESSION_SECRET environment variable");
        eprintln!("   or configure session_secret in Settings.toml");
        eprintln!("💡 Sessions will not survive a restart unless the secret is configured");
    }

    fn apply_cookie_env_overrides(cookie_settings: &mut CookieSettings) {
        if let Ok(cookie_secure_str) = std::env::var("COOKIE_SECURE") {
            if let Ok(cookie_secure) = cookie_secure_str.parse::<bool>() {
                cookie_settings.secure = cookie_secure;
            }
        }
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Get CORS origins as a vector of strings
    #[must_use]
    pub fn get_cors_origins(&self) -> Vec<String> {
        self.application
            .cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
