//! Tests for the identity provider adapter using wiremock.

mod common;

use std::collections::HashMap;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sso_credential::client::AadTokenClient;
use sso_credential::credential::{IdentityProvider, ProviderErrorKind};
use sso_credential::token::now_timestamp;
use sso_credential::{AuthConfig, ErrorCode, OnBehalfOfCredential, Scopes};

const TOKEN_PATH: &str = "/fake-tenant-id/oauth2/v2.0/token";

fn client_for(server: &MockServer) -> AadTokenClient {
    let config = AuthConfig::for_testing(&server.uri());
    AadTokenClient::new(config.obo_settings().unwrap(), &config).unwrap()
}

// =============================================================================
// Request shape
// =============================================================================

#[tokio::test]
async fn test_sends_on_behalf_of_form() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("requested_token_use=on_behalf_of"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "A1", "expires_in": 3600})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let assertion = common::valid_sso_token();
    let token = client_for(&server)
        .acquire_token_on_behalf_of(&assertion, &Scopes::parse("User.Read Mail.Read"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(token.access_token, "A1");
    let now = now_timestamp();
    assert!((now + 3590..=now + 3600).contains(&token.expires_on));

    let requests = server.received_requests().await.unwrap();
    let form: HashMap<String, String> = serde_urlencoded::from_bytes(&requests[0].body).unwrap();

    assert_eq!(form["grant_type"], "urn:ietf:params:oauth:grant-type:jwt-bearer");
    assert_eq!(form["client_id"], "fake-client-id");
    assert_eq!(form["client_secret"], "fake-client-secret");
    assert_eq!(form["assertion"], assertion);
    assert_eq!(form["scope"], "User.Read Mail.Read");
}

#[tokio::test]
async fn test_accepts_string_expires_in() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "A1", "expires_in": "600"})),
        )
        .mount(&server)
        .await;

    let token = client_for(&server)
        .acquire_token_on_behalf_of("assertion", &Scopes::parse("User.Read"))
        .await
        .unwrap()
        .unwrap();

    assert!(token.expires_on > now_timestamp() + 500);
}

#[tokio::test]
async fn test_missing_access_token_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "Bearer"})))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .acquire_token_on_behalf_of("assertion", &Scopes::parse("User.Read"))
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_out_of_range_expires_in_is_rejected() {
    for expires_in in [json!(i64::MAX), json!("9223372036854775807"), json!(-5)] {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "A1", "expires_in": expires_in})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .acquire_token_on_behalf_of("assertion", &Scopes::parse("User.Read"))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ProviderErrorKind::Other, "expires_in: {expires_in}");
        assert!(err.message.contains("expires_in"));
    }
}

#[tokio::test]
async fn test_out_of_range_expires_in_surfaces_as_service_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "A1", "expires_in": i64::MAX})),
        )
        .mount(&server)
        .await;

    let config = AuthConfig::for_testing(&server.uri());
    let credential = OnBehalfOfCredential::new(&config, &common::valid_sso_token()).unwrap();

    let err = credential.get_token(&Scopes::parse("User.Read")).await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::ServiceError);
}

// =============================================================================
// Error classification
// =============================================================================

async fn error_kind_for(body: serde_json::Value) -> ProviderErrorKind {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(body))
        .mount(&server)
        .await;

    client_for(&server)
        .acquire_token_on_behalf_of("assertion", &Scopes::parse("User.Read"))
        .await
        .unwrap_err()
        .kind
}

#[tokio::test]
async fn test_interaction_required_errors() {
    for error in ["interaction_required", "consent_required", "login_required"] {
        let kind = error_kind_for(json!({"error": error, "error_description": "AADSTS65001"})).await;
        assert_eq!(kind, ProviderErrorKind::InteractionRequired, "error: {error}");
    }

    let kind = error_kind_for(json!({"error": "invalid_grant", "suberror": "consent_required"})).await;
    assert_eq!(kind, ProviderErrorKind::InteractionRequired);
}

#[tokio::test]
async fn test_unlisted_suberror_is_not_interaction() {
    let kind = error_kind_for(json!({
        "error": "invalid_grant",
        "error_description": "AADSTS50013: Assertion failed signature validation.",
        "suberror": "client_mismatch"
    }))
    .await;

    assert_eq!(kind, ProviderErrorKind::Other);
}

#[tokio::test]
async fn test_expired_assertion_error() {
    let kind = error_kind_for(json!({
        "error": "invalid_grant",
        "error_description": "AADSTS500133: Assertion is not within its valid time range."
    }))
    .await;

    assert_eq!(kind, ProviderErrorKind::AssertionExpired);
}

#[tokio::test]
async fn test_other_errors() {
    let kind = error_kind_for(json!({"error": "invalid_client"})).await;
    assert_eq!(kind, ProviderErrorKind::Other);
}

#[tokio::test]
async fn test_non_json_error_body_keeps_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .acquire_token_on_behalf_of("assertion", &Scopes::parse("User.Read"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ProviderErrorKind::Other);
    assert!(err.message.contains("503"));
    assert!(err.message.contains("upstream unavailable"));
}

// =============================================================================
// End to end through the credential
// =============================================================================

#[tokio::test]
async fn test_credential_exchanges_once_then_serves_from_cache() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "A1", "expires_in": 3600})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = AuthConfig::for_testing(&server.uri());
    let credential = OnBehalfOfCredential::new(&config, &common::valid_sso_token()).unwrap();
    let scopes = Scopes::parse("User.Read");

    assert_eq!(credential.get_token(&scopes).await.unwrap().token, "A1");
    assert_eq!(credential.get_token(&scopes).await.unwrap().token, "A1");
}

#[tokio::test]
async fn test_credential_surfaces_ui_required() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "interaction_required",
            "error_description": "AADSTS50079: multi-factor authentication required"
        })))
        .mount(&server)
        .await;

    let config = AuthConfig::for_testing(&server.uri());
    let credential = OnBehalfOfCredential::new(&config, &common::valid_sso_token()).unwrap();

    let err = credential.get_token(&Scopes::parse("User.Read")).await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::UiRequiredError);
    assert!(err.to_string().contains("AADSTS50079"));
}
