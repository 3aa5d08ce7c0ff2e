//! HTTP response helpers
//!
//! API errors share one body shape, `{"success": false, "error": <message>}`,
//! optionally extended with a `details` list. Bodies that never vary are
//! serialized once and reused.

use actix_web::{cookie::Cookie, http::header, http::StatusCode, HttpResponse};
use serde::Serialize;
use serde_json::{json, Value};

pub const AUTHENTICATION_REQUIRED: &str = "Authentication required";
pub const INVALID_TOKEN: &str = "Invalid token";
pub const ID_TOKEN_REQUIRED: &str = "ID token is required";

static CACHED_RESPONSES: std::sync::LazyLock<CachedResponses> =
    std::sync::LazyLock::new(CachedResponses::new);

/// Pre-serialized bodies for the fixed auth errors
struct CachedResponses {
    authentication_required: String,
    invalid_token: String,
    id_token_required: String,
}

impl CachedResponses {
    fn new() -> Self {
        Self {
            // Route guards answer without the success flag
            authentication_required: json!({ "error": AUTHENTICATION_REQUIRED }).to_string(),
            invalid_token: failure_body(INVALID_TOKEN, None).to_string(),
            id_token_required: failure_body(ID_TOKEN_REQUIRED, None).to_string(),
        }
    }

    fn respond(status: StatusCode, body: &str) -> HttpResponse {
        HttpResponse::build(status)
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(body.to_owned())
    }
}

fn failure_body(message: &str, details: Option<&[String]>) -> Value {
    let mut body = json!({
        "success": false,
        "error": message,
    });
    if let Some(details) = details {
        body["details"] = json!(details);
    }
    body
}

/// Unified response builder for the API handlers
pub struct ResponseBuilder;

impl ResponseBuilder {
    #[must_use]
    pub fn bad_request() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(StatusCode::BAD_REQUEST)
    }

    #[must_use]
    pub fn unauthorized() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(StatusCode::UNAUTHORIZED)
    }

    #[must_use]
    pub fn not_found() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(StatusCode::NOT_FOUND)
    }

    #[must_use]
    pub fn internal_server_error() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// 401 for routes that need a session
    #[must_use]
    pub fn authentication_required() -> HttpResponse {
        CachedResponses::respond(
            StatusCode::UNAUTHORIZED,
            &CACHED_RESPONSES.authentication_required,
        )
    }

    /// 401 for an ID token that failed verification
    #[must_use]
    pub fn invalid_token() -> HttpResponse {
        CachedResponses::respond(StatusCode::UNAUTHORIZED, &CACHED_RESPONSES.invalid_token)
    }

    #[must_use]
    pub fn missing_id_token() -> HttpResponse {
        CachedResponses::respond(StatusCode::BAD_REQUEST, &CACHED_RESPONSES.id_token_required)
    }

    #[must_use]
    pub fn ok() -> JsonResponseBuilder {
        JsonResponseBuilder {
            status_code: StatusCode::OK,
            cookies: Vec::new(),
        }
    }
}

/// Builder for `{"success": false, ...}` error responses
pub struct ErrorResponseBuilder {
    status_code: StatusCode,
    message: Option<String>,
    details: Option<Vec<String>>,
}

impl ErrorResponseBuilder {
    fn new(status_code: StatusCode) -> Self {
        Self {
            status_code,
            message: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    /// Attach a list of individual problems, e.g. password rules that failed
    #[must_use]
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }

    #[must_use]
    pub fn build(self) -> HttpResponse {
        let message = self
            .message
            .unwrap_or_else(|| default_message(self.status_code).to_string());
        HttpResponse::build(self.status_code)
            .json(failure_body(&message, self.details.as_deref()))
    }
}

fn default_message(status_code: StatusCode) -> &'static str {
    match status_code {
        StatusCode::BAD_REQUEST => "The request is malformed or invalid",
        StatusCode::UNAUTHORIZED => AUTHENTICATION_REQUIRED,
        StatusCode::NOT_FOUND => "Not found",
        _ => "An internal server error occurred",
    }
}

/// Builder for successful JSON responses
pub struct JsonResponseBuilder {
    status_code: StatusCode,
    cookies: Vec<Cookie<'static>>,
}

impl JsonResponseBuilder {
    #[must_use]
    pub fn with_cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.cookies.push(cookie);
        self
    }

    pub fn json<T: Serialize>(self, data: &T) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code);
        for cookie in self.cookies {
            response.cookie(cookie);
        }
        response.json(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(response: HttpResponse) -> Value {
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn test_cached_auth_errors() {
        let response = ResponseBuilder::authentication_required();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Authentication required" })
        );

        let response = ResponseBuilder::invalid_token();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({ "success": false, "error": "Invalid token" })
        );

        let response = ResponseBuilder::missing_id_token();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "ID token is required");
    }

    #[actix_web::test]
    async fn test_error_with_details() {
        let response = ResponseBuilder::bad_request()
            .with_message("Password validation failed")
            .with_details(vec!["too short".to_string()])
            .build();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({
                "success": false,
                "error": "Password validation failed",
                "details": ["too short"]
            })
        );
    }

    #[actix_web::test]
    async fn test_default_message() {
        let response = ResponseBuilder::not_found().build();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Not found");
    }

    #[actix_web::test]
    async fn test_ok_with_cookie() {
        let response = ResponseBuilder::ok()
            .with_cookie(Cookie::new("visioneer_session", "value"))
            .json(&json!({ "success": true }));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.cookies().count(), 1);
        assert_eq!(body_json(response).await, json!({ "success": true }));
    }
}
