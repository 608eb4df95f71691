//! OAuth2 token endpoint and bearer token checks.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::detail;
use crate::mock_server::state::MockState;

/// Form body of a token request.
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub grant_type: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
}

fn oauth_error(status: StatusCode, error: &str, description: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": error,
            "error_description": description,
        })),
    )
        .into_response()
}

/// Client credentials from an HTTP Basic `Authorization` header.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = general_purpose::STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (id, secret) = decoded.split_once(':')?;
    Some((id.to_string(), secret.to_string()))
}

/// POST /oauth2/token
pub async fn issue_token(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Form(form): Form<TokenForm>,
) -> Response {
    let mut state = state.write().await;

    if form.grant_type != "client_credentials" {
        state.token_requests += 1;
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "unsupported_grant_type",
            "Only client_credentials is supported",
        );
    }

    let credentials = basic_credentials(&headers)
        .or_else(|| form.client_id.clone().zip(form.client_secret.clone()));
    let Some((client_id, client_secret)) = credentials else {
        state.token_requests += 1;
        return oauth_error(
            StatusCode::UNAUTHORIZED,
            "invalid_client",
            "Client credentials missing",
        );
    };

    match state.issue_token(&client_id, &client_secret) {
        Some(token) => {
            let mut body = serde_json::json!({
                "access_token": token,
                "token_type": "bearer",
                "scope": form.scope.unwrap_or_default(),
            });
            if let Some(lifetime) = state.token_lifetime_secs {
                body["expires_in"] = lifetime.into();
            }
            (StatusCode::OK, Json(body)).into_response()
        }
        None => oauth_error(
            StatusCode::UNAUTHORIZED,
            "invalid_client",
            "Client authentication failed",
        ),
    }
}

/// Check the bearer token of an API request and count it.
pub(crate) fn authorize(state: &mut MockState, headers: &HeaderMap) -> Result<(), Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(token) if state.is_valid_token(token) => {
            state.api_requests += 1;
            Ok(())
        }
        Some(_) => Err(detail(StatusCode::UNAUTHORIZED, "Invalid token")),
        None => Err(detail(StatusCode::UNAUTHORIZED, "Not authenticated")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_basic_credentials_decode() {
        let mut headers = HeaderMap::new();
        let encoded = general_purpose::STANDARD.encode("client:s3cret:with-colon");
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
        );

        let (id, secret) = basic_credentials(&headers).unwrap();
        assert_eq!(id, "client");
        assert_eq!(secret, "s3cret:with-colon");
    }

    #[test]
    fn test_authorize_rejects_unknown_token() {
        let mut state = MockState::new();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer forged"),
        );

        assert!(authorize(&mut state, &headers).is_err());
        assert_eq!(state.api_requests, 0);
    }
}
