// Session exchange and account endpoints under /api
use actix_web::{web, HttpRequest, HttpResponse, Result};
use log::error;
use serde_json::json;

use crate::session::{SessionError, SessionManager};
use crate::utils::logging::LoggingHelper;
use crate::utils::responses::ResponseBuilder;
use crate::validation::{extract_optional_string, parse_json_object, InputValidator};
use crate::verification::TokenVerifier;

/// Exchange a verified identity token for a session cookie
///
/// # Errors
/// Never returns an error; failures are reported in the response body
pub async fn api_login(
    body: web::Bytes,
    verifier: web::Data<dyn TokenVerifier>,
    session_manager: web::Data<SessionManager>,
) -> Result<HttpResponse> {
    let Some(id_token) = parse_json_object(&body)
        .and_then(|data| extract_optional_string(&data, "id_token"))
        .filter(|token| !token.is_empty())
    else {
        return Ok(ResponseBuilder::missing_id_token());
    };

    let identity = match verifier.verify(&id_token).await {
        Ok(identity) => identity,
        Err(e) => {
            LoggingHelper::log_token_verification_failed(&e);
            return Ok(ResponseBuilder::invalid_token());
        }
    };

    let session = session_manager.create_session(identity);
    let cookie = match session_manager.create_session_cookie(&session) {
        Ok(cookie) => cookie,
        Err(e) => {
            error!("Failed to create session cookie: {e}");
            return Ok(ResponseBuilder::internal_server_error()
                .with_message("Login failed")
                .build());
        }
    };

    Ok(ResponseBuilder::ok().with_cookie(cookie).json(&json!({
        "success": true,
        "status": "success",
        "message": "Login successful",
        "user": session.profile(),
    })))
}

/// End the current session
///
/// # Errors
/// Returns `SessionError` (401) without a valid session
pub async fn api_logout(
    req: HttpRequest,
    session_manager: web::Data<SessionManager>,
) -> Result<HttpResponse, SessionError> {
    let session = session_manager.extract_session(&req)?;
    LoggingHelper::log_session_ended(&session.uid);

    Ok(ResponseBuilder::ok()
        .with_cookie(session_manager.clear_session_cookie())
        .json(&json!({
            "success": true,
            "status": "success",
            "message": "Logout successful",
        })))
}

/// Return the signed-in user
///
/// # Errors
/// Returns `SessionError` (401) without a valid session
pub async fn get_user(
    req: HttpRequest,
    session_manager: web::Data<SessionManager>,
) -> Result<HttpResponse, SessionError> {
    let session = session_manager.extract_session(&req)?;
    Ok(ResponseBuilder::ok().json(&json!({
        "success": true,
        "status": "success",
        "user": session.profile(),
    })))
}

/// Validate registration input; the account itself is created at the identity provider
///
/// # Errors
/// Never returns an error; failures are reported in the response body
pub async fn api_register(body: web::Bytes) -> Result<HttpResponse> {
    let Some(data) = parse_json_object(&body) else {
        return Ok(ResponseBuilder::bad_request()
            .with_message("Registration data is required")
            .build());
    };

    if !extract_optional_string(&data, "email").is_some_and(|e| InputValidator::validate_email(&e))
    {
        return Ok(ResponseBuilder::bad_request()
            .with_message("Valid email is required")
            .build());
    }

    let Some(password) = extract_optional_string(&data, "password") else {
        return Ok(ResponseBuilder::bad_request()
            .with_message("Password is required")
            .build());
    };

    let check = InputValidator::validate_password(&password);
    if !check.valid {
        return Ok(ResponseBuilder::bad_request()
            .with_message("Password validation failed")
            .with_details(check.errors)
            .build());
    }

    Ok(ResponseBuilder::ok().json(&json!({
        "success": true,
        "status": "success",
        "message": "Registration successful. Please verify your email.",
    })))
}

/// Validate a password reset request; the email is sent by the identity provider
///
/// # Errors
/// Never returns an error; failures are reported in the response body
pub async fn api_forgot_password(body: web::Bytes) -> Result<HttpResponse> {
    let Some(email) =
        parse_json_object(&body).and_then(|data| extract_optional_string(&data, "email"))
    else {
        return Ok(ResponseBuilder::bad_request()
            .with_message("Email is required")
            .build());
    };

    if !InputValidator::validate_email(&email) {
        return Ok(ResponseBuilder::bad_request()
            .with_message("Valid email is required")
            .build());
    }

    Ok(ResponseBuilder::ok().json(&json!({
        "success": true,
        "status": "success",
        "message": "Password reset email sent",
    })))
}
