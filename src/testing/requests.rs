//! HTTP request builders for testing handlers

use actix_web::cookie::Cookie;
use actix_web::http::Method;
use actix_web::{test, HttpRequest};
use serde_json::Value;

use crate::session::COOKIE_NAME;

/// Builder for creating HTTP requests for testing
pub struct RequestBuilder {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    cookies: Vec<Cookie<'static>>,
    body: Option<Value>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            method: Method::GET,
            uri: "/".to_string(),
            headers: Vec::new(),
            cookies: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn uri(mut self, uri: &str) -> Self {
        self.uri = uri.to_string();
        self
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn with_cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Add a session cookie with a raw (already encrypted) value
    #[must_use]
    pub fn with_session_cookie(self, session_value: String) -> Self {
        self.with_cookie(Cookie::new(COOKIE_NAME, session_value))
    }

    #[must_use]
    pub fn json_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Apply the builder to an actix `TestRequest`, for use with `test::call_service`
    #[must_use]
    pub fn into_test_request(self) -> test::TestRequest {
        let mut req = test::TestRequest::default()
            .method(self.method)
            .uri(&self.uri);

        for (name, value) in self.headers {
            req = req.insert_header((name, value));
        }
        for cookie in self.cookies {
            req = req.cookie(cookie);
        }
        if let Some(body) = self.body {
            req = req.set_json(body);
        }
        req
    }

    #[must_use]
    pub fn build(self) -> HttpRequest {
        self.into_test_request().to_http_request()
    }
}

/// Quick builder functions for common request types
impl RequestBuilder {
    /// A JSON POST to `uri`
    #[must_use]
    pub fn api_post(uri: &str, body: Value) -> test::TestRequest {
        Self::new()
            .method(Method::POST)
            .uri(uri)
            .header("Accept", "application/json")
            .json_body(body)
            .into_test_request()
    }
}
