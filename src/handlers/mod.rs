// HTTP request handlers for the session service
pub mod auth;
pub mod health;

pub use auth::{api_forgot_password, api_login, api_logout, api_register, get_user};
pub use health::health;

use actix_web::web;

/// Register every route on an actix `App` or scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health)).service(
        web::scope("/api")
            .route("/login", web::post().to(api_login))
            .route("/logout", web::post().to(api_logout))
            .route("/user", web::get().to(get_user))
            .route("/register", web::post().to(api_register))
            .route("/forgot-password", web::post().to(api_forgot_password)),
    );
}
