// Security headers added to every response
use actix_web::middleware::DefaultHeaders;

pub const CONTENT_SECURITY_POLICY: &str =
    "default-src 'self'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'";
pub const STRICT_TRANSPORT_SECURITY: &str = "max-age=31536000; includeSubDomains";

/// Middleware setting the browser hardening headers
///
/// Headers already set by a handler are left alone.
#[must_use]
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-Frame-Options", "DENY"))
        .add(("X-XSS-Protection", "1; mode=block"))
        .add(("Strict-Transport-Security", STRICT_TRANSPORT_SECURITY))
        .add(("Content-Security-Policy", CONTENT_SECURITY_POLICY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    #[actix_web::test]
    async fn test_headers_on_every_response() {
        let app = test::init_service(
            App::new()
                .wrap(security_headers())
                .route("/ok", web::get().to(HttpResponse::Ok))
                .route("/denied", web::get().to(HttpResponse::Unauthorized)),
        )
        .await;

        for uri in ["/ok", "/denied", "/missing"] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request())
                .await;
            let headers = resp.headers();
            assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff", "{uri}");
            assert_eq!(headers.get("x-frame-options").unwrap(), "DENY", "{uri}");
            assert_eq!(
                headers.get("strict-transport-security").unwrap(),
                STRICT_TRANSPORT_SECURITY
            );
            assert_eq!(
                headers.get("content-security-policy").unwrap(),
                CONTENT_SECURITY_POLICY
            );
        }
    }
}
