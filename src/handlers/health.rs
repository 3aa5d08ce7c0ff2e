use actix_web::{HttpResponse, Result};

use crate::models::HealthResponse;

/// Liveness probe
///
/// # Errors
/// Never returns an error
pub async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        message: "Visioneer session service is running".to_string(),
        version: crate::VERSION.to_string(),
    }))
}
