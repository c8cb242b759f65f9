//! FCM transport tests against a local mock server

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nb_core::errors::DeliveryError;
use nb_core::services::{PushNotification, PushTransport};
use nb_shared::config::PushProviderConfig;

use crate::push::{
    classify_fcm_error, fcm_error_code, AccessTokenCache, FcmPushTransport, ServiceAccountKey,
};

const TEST_KEY_PEM: &str = include_str!("../../../tests/fixtures/test_service_account_key.pem");
const SEND_PATH: &str = "/v1/projects/school-app/messages:send";

fn provider_config(server: &MockServer) -> PushProviderConfig {
    let service_account = json!({
        "type": "service_account",
        "project_id": "school-app",
        "client_email": "notifier@school-app.iam.gserviceaccount.com",
        // Escaped newlines, the way the key usually arrives via environment
        "private_key": TEST_KEY_PEM.replace('\n', "\\n"),
        "token_uri": format!("{}/token", server.uri()),
    });

    PushProviderConfig {
        service_account_json: service_account.to_string(),
        api_base: server.uri(),
        request_timeout_secs: 5,
    }
}

fn transport_for(server: &MockServer) -> FcmPushTransport {
    let config = provider_config(server);
    let key = ServiceAccountKey::from_json(&config.service_account_json).unwrap();
    FcmPushTransport::new(&config, key, Arc::new(AccessTokenCache::default())).unwrap()
}

async fn mount_token_endpoint(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.test-token",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn notification(link: &str) -> PushNotification {
    PushNotification {
        message_id: "6b0f7c43-2f7e-4c43-9a4c-0d3b8f3d9e11".to_string(),
        title: "Field trip".to_string(),
        body: "Permission slips due Friday".to_string(),
        link: link.to_string(),
    }
}

#[tokio::test]
async fn test_send_builds_v1_payload() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(header("authorization", "Bearer ya29.test-token"))
        .and(body_partial_json(json!({
            "message": {
                "token": "device-token-1",
                "notification": {
                    "title": "Field trip",
                    "body": "Permission slips due Friday"
                },
                "data": {
                    "messageId": "6b0f7c43-2f7e-4c43-9a4c-0d3b8f3d9e11",
                    "link": "https://school.example/trips"
                },
                "webpush": {
                    "notification": {
                        "icon": "/favicon.ico",
                        "badge": "/favicon.ico"
                    }
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/school-app/messages/0:1700000000000000%abc"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let receipt = transport
        .send_push("device-token-1", &notification("https://school.example/trips"))
        .await
        .unwrap();

    assert_eq!(
        receipt.provider_message_id.as_deref(),
        Some("projects/school-app/messages/0:1700000000000000%abc")
    );
    assert!(!receipt.simulated);
}

#[tokio::test]
async fn test_missing_link_sent_as_empty_string() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(body_partial_json(json!({
            "message": { "data": { "link": "" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "n" })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    transport
        .send_push("device-token-1", &notification(""))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_access_token_reused_across_sends() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "n" })))
        .expect(3)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    for token in ["a", "b", "c"] {
        transport.send_push(token, &notification("")).await.unwrap();
    }
}

#[tokio::test]
async fn test_concurrent_senders_share_one_exchange() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "n" })))
        .expect(6)
        .mount(&server)
        .await;

    let transport = Arc::new(transport_for(&server));
    let handles: Vec<_> = (0..6)
        .map(|i| {
            let transport = transport.clone();
            tokio::spawn(async move {
                transport
                    .send_push(&format!("token-{}", i), &notification(""))
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
}

#[tokio::test]
async fn test_unregistered_token_classified_invalid() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    let body = json!({
        "error": {
            "code": 404,
            "message": "Requested entity was not found.",
            "status": "NOT_FOUND",
            "details": [{
                "@type": "type.googleapis.com/google.firebase.fcm.v1.FcmError",
                "errorCode": "UNREGISTERED"
            }]
        }
    })
    .to_string();

    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string(body.clone()))
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let err = transport
        .send_push("stale-token", &notification(""))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DeliveryError::TokenInvalid {
            code: "UNREGISTERED".to_string(),
            body,
        }
    );
    assert!(err.invalidates_token());
}

#[tokio::test]
async fn test_server_error_is_not_token_invalid() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    let body = r#"{"error":{"code":503,"message":"unavailable","status":"UNAVAILABLE"}}"#;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string(body))
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let err = transport
        .send_push("token", &notification(""))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DeliveryError::ProviderRejected {
            status: 503,
            body: body.to_string(),
        }
    );
}

#[tokio::test]
async fn test_failed_token_exchange_skips_send() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_grant"}"#))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let err = transport
        .send_push("token", &notification(""))
        .await
        .unwrap_err();

    assert!(matches!(err, DeliveryError::ProviderRejected { status: 401, .. }));
    assert!(!err.invalidates_token());
}

#[test]
fn test_error_code_prefers_details() {
    let body = r#"{"error":{"status":"NOT_FOUND","details":[{"errorCode":"UNREGISTERED"}]}}"#;
    assert_eq!(fcm_error_code(body).as_deref(), Some("UNREGISTERED"));
}

#[test]
fn test_error_code_falls_back_to_status() {
    let body = r#"{"error":{"code":400,"status":"INVALID_ARGUMENT"}}"#;
    assert_eq!(fcm_error_code(body).as_deref(), Some("INVALID_ARGUMENT"));
    assert!(classify_fcm_error(400, body.to_string()).invalidates_token());
}

#[test]
fn test_error_code_absent_for_non_json() {
    assert_eq!(fcm_error_code("Bad Gateway"), None);
    assert!(matches!(
        classify_fcm_error(502, "Bad Gateway".to_string()),
        DeliveryError::ProviderRejected { status: 502, .. }
    ));
}
