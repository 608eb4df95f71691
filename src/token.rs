//! OAuth2 client credentials token handling.
//!
//! The [`TokenProvider`] owns the cached [`AccessToken`] and performs the
//! RFC 6749 §4.4 exchange against `<OAUTH2_SERVER>/oauth2/token` whenever the
//! cached token is missing or expired. The cache lock is held across the
//! exchange so concurrent callers share a single refresh.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{header, Client};
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{OdpError, Result};

/// Tokens are refreshed this long before the server-reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// A bearer token obtained from the OAuth2 server.
#[derive(Clone)]
pub struct AccessToken {
    value: String,
    /// `None` when the server did not report a lifetime.
    refresh_at: Option<Instant>,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("refresh_at", &self.refresh_at)
            .finish_non_exhaustive()
    }
}

impl AccessToken {
    /// Create a token that was issued now with the given lifetime.
    ///
    /// Short-lived tokens are refreshed at half their lifetime rather than
    /// [`EXPIRY_MARGIN`] before expiry. A lifetime too large to represent as
    /// an [`Instant`] is treated like no lifetime at all.
    pub fn new(value: impl Into<String>, expires_in: Option<Duration>) -> Self {
        let refresh_at = expires_in.and_then(|lifetime| {
            let margin = EXPIRY_MARGIN.min(lifetime / 2);
            Instant::now().checked_add(lifetime.saturating_sub(margin))
        });
        Self {
            value: value.into(),
            refresh_at,
        }
    }

    /// The raw token to present as `Authorization: Bearer <value>`.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the token must be replaced before its next use.
    pub fn is_expired(&self) -> bool {
        self.refresh_at
            .is_some_and(|refresh_at| Instant::now() >= refresh_at)
    }
}

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Error body defined by RFC 6749 §5.2.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Owns the cached access token and refreshes it on demand.
pub(crate) struct TokenProvider {
    http: Client,
    token_endpoint: Url,
    client_id: String,
    client_secret: String,
    scope: String,
    current: Mutex<Option<Arc<AccessToken>>>,
}

impl fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenProvider")
            .field("token_endpoint", &self.token_endpoint.as_str())
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl TokenProvider {
    pub(crate) fn new(http: Client, config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            http,
            token_endpoint: config.token_endpoint()?,
            client_id: config.client_id().to_string(),
            client_secret: config.client_secret().to_string(),
            scope: config.scope_param(),
            current: Mutex::new(None),
        })
    }

    /// Return the cached token, exchanging credentials first if needed.
    pub(crate) async fn token(&self) -> Result<Arc<AccessToken>> {
        let mut current = self.current.lock().await;

        if let Some(token) = current.as_ref().filter(|t| !t.is_expired()) {
            tracing::debug!("reusing cached access token");
            return Ok(Arc::clone(token));
        }

        let token = Arc::new(self.exchange().await?);
        *current = Some(Arc::clone(&token));
        Ok(token)
    }

    /// Replace the cached token with a freshly exchanged one.
    pub(crate) async fn refresh(&self) -> Result<Arc<AccessToken>> {
        let mut current = self.current.lock().await;
        // A failed exchange must not leave the stale token usable.
        *current = None;

        let token = Arc::new(self.exchange().await?);
        *current = Some(Arc::clone(&token));
        Ok(token)
    }

    /// Drop the cached token; the next call exchanges credentials again.
    pub(crate) async fn invalidate(&self) {
        self.current.lock().await.take();
    }

    /// The currently cached token, if any, without refreshing.
    #[cfg(test)]
    pub(crate) async fn cached(&self) -> Option<Arc<AccessToken>> {
        self.current.lock().await.clone()
    }

    #[tracing::instrument(skip(self), fields(token_endpoint = %self.token_endpoint))]
    async fn exchange(&self) -> Result<AccessToken> {
        tracing::debug!("requesting access token with client credentials");

        let form = [
            ("grant_type", "client_credentials"),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .http
            .post(self.token_endpoint.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(OdpError::HttpError)?;

        let status = response.status();
        let body = response.text().await.map_err(OdpError::HttpError)?;

        if !status.is_success() {
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) if body.trim().is_empty() => format!("HTTP {status}"),
                Err(_) => body,
            };
            tracing::warn!(status = status.as_u16(), %message, "token exchange rejected");
            return Err(OdpError::Authentication {
                message,
                status_code: Some(status.as_u16()),
            });
        }

        let token: TokenResponse = serde_json::from_str(&body)?;

        if let Some(token_type) = token.token_type.as_deref() {
            if !token_type.eq_ignore_ascii_case("bearer") {
                return Err(OdpError::Authentication {
                    message: format!("unsupported token type '{token_type}'"),
                    status_code: None,
                });
            }
        }

        tracing::debug!(expires_in = ?token.expires_in, "access token issued");
        Ok(AccessToken::new(
            token.access_token,
            token.expires_in.map(Duration::from_secs),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> TokenProvider {
        let config = ClientConfig::new(
            "https://api.example.org",
            "https://auth.example.org",
            "abc",
            "xyz",
            ["read"],
        )
        .unwrap();
        TokenProvider::new(Client::new(), &config).unwrap()
    }

    #[test]
    fn test_token_without_lifetime_never_expires() {
        let token = AccessToken::new("tok", None);
        assert!(!token.is_expired());
        assert_eq!(token.value(), "tok");
    }

    #[test]
    fn test_zero_lifetime_is_expired() {
        let token = AccessToken::new("tok", Some(Duration::ZERO));
        assert!(token.is_expired());
    }

    #[test]
    fn test_unrepresentable_lifetime_never_expires() {
        let token = AccessToken::new("tok", Some(Duration::from_secs(u64::MAX)));
        assert!(!token.is_expired());
        assert!(token.refresh_at.is_none());
    }

    #[test]
    fn test_long_lifetime_is_fresh() {
        let token = AccessToken::new("tok", Some(Duration::from_secs(3600)));
        assert!(!token.is_expired());
    }

    #[test]
    fn test_debug_hides_token_value() {
        let token = AccessToken::new("super-secret-token", Some(Duration::from_secs(60)));
        let debug = format!("{token:?}");
        assert!(debug.contains("AccessToken"));
        assert!(!debug.contains("super-secret-token"));

        let debug = format!("{:?}", provider());
        assert!(!debug.contains("xyz"));
    }

    #[test]
    fn test_invalidate_empty_cache() {
        let provider = provider();
        tokio_test::block_on(async {
            assert!(provider.cached().await.is_none());
            provider.invalidate().await;
            assert!(provider.cached().await.is_none());
        });
    }

    #[test]
    fn test_token_error_response_parses() {
        let err: TokenErrorResponse = serde_json::from_str(
            r#"{"error":"invalid_client","error_description":"Client authentication failed"}"#,
        )
        .unwrap();
        assert_eq!(err.error, "invalid_client");
        assert_eq!(
            err.error_description.as_deref(),
            Some("Client authentication failed")
        );
    }
}
