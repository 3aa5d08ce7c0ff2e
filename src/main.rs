#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::warn;
use visioneer::{
    handlers::configure,
    settings::VisioneerSettings,
    utils::{headers::security_headers, logging::LoggingHelper},
    verification::{FirebaseTokenVerifier, TokenVerifier},
    SessionManager,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Loads .env and initializes the logger before reading configuration
    let settings = VisioneerSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    LoggingHelper::log_firebase_config(&settings.firebase);

    let verifier = FirebaseTokenVerifier::new(&settings)
        .map_err(|e| std::io::Error::other(format!("Failed to build token verifier: {e}")))?;
    if let Err(e) = verifier.refresh_keys().await {
        // Keys are fetched again on the first login
        warn!("Initial JWK fetch failed: {e}");
    }

    start_server(settings, Arc::new(verifier)).await
}

/// Start the session service
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(
    settings: VisioneerSettings,
    verifier: Arc<dyn TokenVerifier>,
) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    let session_manager = SessionManager::from_settings(&settings);
    let verifier = web::Data::from(verifier);
    let cors_origins = settings.get_cors_origins();

    HttpServer::new(move || {
        let cors_origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                cors_origins
                    .iter()
                    .any(|allowed| allowed == origin.to_str().unwrap_or(""))
            })
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(settings.clone()))
            .app_data(web::Data::new(session_manager.clone()))
            .app_data(verifier.clone())
            .wrap(security_headers())
            .wrap(cors)
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn print_startup_info(bind_address: &str, settings: &VisioneerSettings) {
    println!("Starting Visioneer session service on http://{bind_address}");
    println!("Firebase project: {}", settings.firebase.project_id);
    println!(
        "Session lifetime: {} hours",
        settings.session.session_duration_hours
    );
    println!();
    println!("Session endpoints:");
    println!("  POST /api/login           - Exchange an ID token for a session cookie");
    println!("  POST /api/logout          - Clear the session");
    println!("  GET  /api/user            - Current user");
    println!("  POST /api/register        - Validate registration input");
    println!("  POST /api/forgot-password - Validate a password reset request");
    println!();
    println!("System endpoints:");
    println!("  GET  /health              - Health check");
}
