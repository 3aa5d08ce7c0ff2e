// Identity provider REST calls followed by the backend session exchange
use serde_json::json;
use std::sync::Arc;
use visioneer::identity::{
    AuthClient, ErrorKind, FirebaseIdentityProvider, IdentityProvider, IdentityToken,
};
use visioneer::settings::IdentitySettings;
use visioneer::testing::constants::{TEST_EMAIL, TEST_PASSWORD, TEST_UID};
use visioneer::testing::TestFixtures;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn identity_settings(server: &MockServer) -> IdentitySettings {
    IdentitySettings {
        identity_toolkit_url: server.uri(),
        secure_token_url: server.uri(),
        backend_base_url: server.uri(),
        ..IdentitySettings::default()
    }
}

fn auth_client(server: &MockServer) -> (AuthClient, Arc<FirebaseIdentityProvider>) {
    let settings = identity_settings(server);
    let provider = Arc::new(
        FirebaseIdentityProvider::new(&TestFixtures::firebase_config(), &settings)
            .expect("Should build provider"),
    );
    let client = AuthClient::new(provider.clone(), &settings).expect("Should build client");
    (client, provider)
}

fn token_response(id_token: &str) -> serde_json::Value {
    json!({
        "idToken": id_token,
        "refreshToken": "refresh-1",
        "expiresIn": "3600",
        "localId": TEST_UID,
        "email": TEST_EMAIL,
    })
}

#[tokio::test]
async fn test_sign_in_with_password_establishes_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signInWithPassword"))
        .and(query_param("key", "test-api-key"))
        .and(body_json(json!({
            "email": TEST_EMAIL,
            "password": TEST_PASSWORD,
            "returnSecureToken": true,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response("id-token-1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({ "id_token": "id-token-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, provider) = auth_client(&server);
    let result = client.sign_in(TEST_EMAIL, TEST_PASSWORD).await;

    assert!(result.success, "{result:?}");
    assert_eq!(result.token, Some(IdentityToken::new("id-token-1")));
    let account = provider.current_user().await.expect("Account should be cached");
    assert_eq!(account.uid, TEST_UID);
}

#[tokio::test]
async fn test_wrong_password_is_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signInWithPassword"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": { "code": 400, "message": "INVALID_PASSWORD" } })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, provider) = auth_client(&server);
    let result = client.sign_in(TEST_EMAIL, "wrong").await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::WrongPassword));
    assert!(provider.current_user().await.is_none());
}

#[tokio::test]
async fn test_register_updates_profile_and_sends_verification() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signUp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response("new-token")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts:update"))
        .and(body_partial_json(json!({ "idToken": "new-token", "displayName": "Ada" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts:sendOobCode"))
        .and(body_json(json!({ "requestType": "VERIFY_EMAIL", "idToken": "new-token" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({ "id_token": "new-token" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, provider) = auth_client(&server);
    let result = client.register(TEST_EMAIL, TEST_PASSWORD, "Ada").await;

    assert!(result.success, "{result:?}");
    let account = provider.current_user().await.expect("Account should be cached");
    assert_eq!(account.display_name.as_deref(), Some("Ada"));
}

#[tokio::test]
async fn test_email_in_use_on_register() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signUp"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": { "code": 400, "message": "EMAIL_EXISTS" } })),
        )
        .mount(&server)
        .await;

    let (client, _) = auth_client(&server);
    let result = client.register(TEST_EMAIL, TEST_PASSWORD, "Ada").await;

    assert_eq!(result.error_kind, Some(ErrorKind::EmailInUse));
    assert_eq!(
        result.message.as_deref(),
        Some("An account with this email already exists.")
    );
}

#[tokio::test]
async fn test_password_reset_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:sendOobCode"))
        .and(body_json(json!({ "requestType": "PASSWORD_RESET", "email": TEST_EMAIL })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "email": TEST_EMAIL })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = auth_client(&server);
    let result = client.send_password_reset(TEST_EMAIL).await;

    assert!(result.success);
    assert!(result.token.is_none());
}

#[tokio::test]
async fn test_sign_out_ends_backend_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response("id-token-1")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, provider) = auth_client(&server);
    assert!(client.sign_in(TEST_EMAIL, TEST_PASSWORD).await.success);

    let result = client.sign_out().await;
    assert!(result.success);
    assert!(provider.current_user().await.is_none());
}

#[tokio::test]
async fn test_backend_down_is_a_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response("id-token-1")))
        .mount(&server)
        .await;

    let settings = IdentitySettings {
        backend_base_url: "http://127.0.0.1:9".to_string(),
        ..identity_settings(&server)
    };
    let provider = Arc::new(
        FirebaseIdentityProvider::new(&TestFixtures::firebase_config(), &settings)
            .expect("Should build provider"),
    );
    let client = AuthClient::new(provider, &settings).expect("Should build client");

    let result = client.sign_in(TEST_EMAIL, TEST_PASSWORD).await;
    assert_eq!(result.error_kind, Some(ErrorKind::Network));
}

#[tokio::test]
async fn test_token_near_expiry_is_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "idToken": "short-lived",
            "refreshToken": "refresh-1",
            "expiresIn": "60",
            "localId": TEST_UID,
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(query_param("key", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id_token": "refreshed",
            "refresh_token": "refresh-2",
            "expires_in": "3600",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({ "id_token": "refreshed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, provider) = auth_client(&server);
    let result = client.sign_in(TEST_EMAIL, TEST_PASSWORD).await;
    assert_eq!(result.token, Some(IdentityToken::new("refreshed")));

    // Fresh token is served from the cache without another refresh
    let token = provider
        .current_token(false)
        .await
        .expect("Should read token")
        .expect("Should be signed in");
    assert_eq!(token.as_str(), "refreshed");
}

#[tokio::test]
async fn test_oversized_expires_in_is_tolerated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "idToken": "id-token-1",
            "refreshToken": "refresh-1",
            "expiresIn": "9223372036854775807",
            "localId": TEST_UID,
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let (client, provider) = auth_client(&server);
    let result = client.sign_in(TEST_EMAIL, TEST_PASSWORD).await;

    assert!(result.success, "{result:?}");
    let account = provider.current_user().await.expect("Account should be cached");
    assert!(account.expires_at <= chrono::Utc::now() + chrono::TimeDelta::hours(24));
}
