//! Authenticated request dispatch against a mocked OAuth2 server and API.
//!
//! Uses wiremock for both the token endpoint and the API so that the number
//! of token exchanges and API calls can be asserted exactly.

use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use odp::{ApiTarget, ClientConfig, Method, OdpClient, OdpError};
use wiremock::matchers::{any, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(&server.uri(), &server.uri(), "abc", "xyz", ["read", "write"]).unwrap()
}

fn token_response(token: &str, expires_in: Option<u64>) -> ResponseTemplate {
    let mut body = serde_json::json!({
        "access_token": token,
        "token_type": "bearer",
    });
    if let Some(expires_in) = expires_in {
        body["expires_in"] = expires_in.into();
    }
    ResponseTemplate::new(200).set_body_json(body)
}

#[tokio::test]
async fn test_request_exchanges_token_then_sends_bearer() {
    let server = MockServer::start().await;

    let basic = format!("Basic {}", general_purpose::STANDARD.encode("abc:xyz"));
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(header("authorization", basic.as_str()))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("scope=read+write"))
        .respond_with(token_response("tok-1", Some(3600)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/records"))
        .and(header("authorization", "Bearer tok-1"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = OdpClient::new(config_for(&server)).unwrap();
    let response = client
        .request(Method::GET, "/records", ApiTarget::Public, None::<&()>)
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_cached_token_is_reused() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(token_response("tok-1", Some(3600)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/project/"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(3)
        .mount(&server)
        .await;

    let client = OdpClient::new(config_for(&server)).unwrap();
    for _ in 0..3 {
        client
            .request(Method::GET, "/project/", ApiTarget::Public, None::<&()>)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_token_without_expiry_is_reused() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(token_response("tok-forever", None))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;

    let client = OdpClient::new(config_for(&server)).unwrap();
    for _ in 0..2 {
        client
            .request(Method::GET, "/ping", ApiTarget::Public, None::<&()>)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_expired_token_triggers_one_exchange_per_request() {
    let server = MockServer::start().await;

    // expires_in = 0: every cached token is already expired on next use
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(token_response("tok-short", Some(0)))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/project/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let client = OdpClient::new(config_for(&server)).unwrap();
    for _ in 0..2 {
        client
            .request(Method::GET, "/project/", ApiTarget::Public, None::<&()>)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_concurrent_requests_share_one_exchange() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(token_response("tok-1", Some(3600)).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/project/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(8)
        .mount(&server)
        .await;

    let client = OdpClient::new(config_for(&server)).unwrap();
    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .request(Method::GET, "/project/", ApiTarget::Public, None::<&()>)
                    .await
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_rejected_exchange_never_sends_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "invalid_client",
            "error_description": "Client authentication failed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = OdpClient::new(config_for(&server)).unwrap();
    let err = client
        .request(Method::GET, "/records", ApiTarget::Public, None::<&()>)
        .await
        .unwrap_err();

    assert!(err.is_authentication(), "expected authentication error, got {err:?}");
    assert_eq!(err.status_code(), Some(401));
    assert!(err.to_string().contains("invalid_client"));
}

#[tokio::test]
async fn test_non_bearer_token_type_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok",
            "token_type": "mac"
        })))
        .mount(&server)
        .await;

    let client = OdpClient::new(config_for(&server)).unwrap();
    let err = client.access_token().await.unwrap_err();

    assert!(matches!(err, OdpError::Authentication { .. }));
}

#[tokio::test]
async fn test_admin_without_url_never_reaches_network() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = OdpClient::new(config_for(&server)).unwrap();
    let err = client
        .request(Method::GET, "/institution/", ApiTarget::Admin, None::<&()>)
        .await
        .unwrap_err();

    assert!(matches!(err, OdpError::AdminApiUnavailable));
    assert!(err.is_configuration());
}

#[tokio::test]
async fn test_admin_target_uses_admin_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(token_response("tok-1", Some(3600)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/institution/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server)
        .with_admin_api_url(&format!("{}/admin", server.uri()))
        .unwrap();
    let client = OdpClient::new(config).unwrap();

    client
        .request(Method::GET, "/institution/", ApiTarget::Admin, None::<&()>)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_raw_response_is_not_interpreted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(token_response("tok-1", Some(3600)))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/project/"))
        .and(header("content-type", "application/json"))
        .and(body_string_contains("\"key\":\"dup\""))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(serde_json::json!({"detail": "Project 'dup' already exists"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = OdpClient::new(config_for(&server)).unwrap();
    let body = serde_json::json!({"key": "dup", "name": "Duplicate"});
    let response = client
        .request(Method::POST, "/project/", ApiTarget::Public, Some(&body))
        .await
        .expect("non-success status is returned, not raised");

    assert_eq!(response.status(), 409);
    let detail: serde_json::Value = response.json().await.unwrap();
    assert_eq!(detail["detail"], "Project 'dup' already exists");
}

#[tokio::test]
async fn test_unreachable_auth_server_is_transport_error() {
    // Nothing listens on port 1
    let config = ClientConfig::new(
        "http://127.0.0.1:1",
        "http://127.0.0.1:1",
        "abc",
        "xyz",
        ["read"],
    )
    .unwrap();
    let client = OdpClient::new(config).unwrap();

    let err = client
        .request(Method::GET, "/records", ApiTarget::Public, None::<&()>)
        .await
        .unwrap_err();

    assert!(err.is_transport(), "expected transport error, got {err:?}");
}

#[tokio::test]
async fn test_refresh_and_invalidate_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(token_response("tok", Some(3600)))
        .expect(3)
        .mount(&server)
        .await;

    let client = OdpClient::new(config_for(&server)).unwrap();

    client.access_token().await.unwrap();
    client.access_token().await.unwrap();
    client.refresh_token().await.unwrap();
    client.invalidate_token().await;
    let token = client.access_token().await.unwrap();

    assert_eq!(token.value(), "tok");
    assert!(!token.is_expired());
}

#[tokio::test]
async fn test_paths_cannot_leave_the_base_url() {
    let api = MockServer::start().await;
    let other = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&api)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&other)
        .await;

    let config = ClientConfig::new(
        &format!("{}/public", api.uri()),
        &api.uri(),
        "abc",
        "xyz",
        ["read"],
    )
    .unwrap();
    let client = OdpClient::new(config).unwrap();

    let foreign = format!("{}/steal", other.uri());
    for target in [foreign.as_str(), "../admin/institution/"] {
        let err = client
            .request(Method::GET, target, ApiTarget::Public, None::<&()>)
            .await
            .unwrap_err();

        assert!(
            matches!(err, OdpError::InvalidArgument(_)),
            "{target}: expected invalid argument, got {err:?}"
        );
    }
}

#[tokio::test]
async fn test_huge_expires_in_is_treated_as_no_expiry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(token_response("tok-1", Some(u64::MAX)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/records"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let client = OdpClient::new(config_for(&server)).unwrap();
    for _ in 0..2 {
        client
            .request(Method::GET, "/records", ApiTarget::Public, None::<&()>)
            .await
            .unwrap();
    }

    assert!(!client.access_token().await.unwrap().is_expired());
}
