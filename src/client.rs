//! ODP API client.
//!
//! Low-level HTTP client that handles authentication and raw requests.
//! Higher-level operations are implemented via traits on entity types.

use std::fs;
use std::sync::Arc;

use reqwest::{header, Certificate, Client, Method, RequestBuilder, Response};
use serde::Serialize;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiErrorKind, OdpError, Result};
use crate::token::{AccessToken, TokenProvider};

const USER_AGENT: &str = concat!("odp-client/", env!("CARGO_PKG_VERSION"));

/// Which ODP API a request is sent to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiTarget {
    /// The Public API (`ODP_PUBLIC_API`).
    #[default]
    Public,
    /// The Admin API (`ODP_ADMIN_API`), usually only reachable internally.
    Admin,
}

/// Low-level ODP API client.
///
/// Handles the client credentials grant and HTTP requests. Entity-specific
/// operations are implemented via the `Get`, `List`, and `Create` traits on
/// model types.
///
/// This struct is cheaply cloneable; clones share the same connection pool
/// and the same cached access token.
///
/// # Example
///
/// ```no_run
/// use odp::{ApiTarget, ClientConfig, OdpClient};
/// use reqwest::Method;
///
/// # async fn example() -> odp::Result<()> {
/// // Create from environment variables
/// let client = OdpClient::from_env()?;
///
/// // Or configure manually
/// let config = ClientConfig::new(
///     "https://odp.example.org/api/public",
///     "https://odp.example.org/auth",
///     "my-client",
///     "my-secret",
///     ["ODP.Metadata"],
/// )?;
/// let client = OdpClient::new(config)?;
///
/// let response = client
///     .request(Method::GET, "/project/", ApiTarget::Public, None::<&()>)
///     .await?;
/// println!("HTTP {}", response.status());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OdpClient {
    http: Client,
    config: Arc<ClientConfig>,
    tokens: Arc<TokenProvider>,
}

impl std::fmt::Debug for OdpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OdpClient")
            .field("public_api_url", &self.config.public_api_url().as_str())
            .field(
                "admin_api_url",
                &self.config.admin_api_url().map(Url::as_str),
            )
            .finish_non_exhaustive()
    }
}

impl OdpClient {
    /// Create a client from environment variables.
    ///
    /// See [`ClientConfig::from_env`] for the variables read.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or malformed.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Create a new client from a resolved configuration.
    ///
    /// No network traffic happens here; the first token exchange is deferred
    /// to the first request.
    ///
    /// # Errors
    ///
    /// Returns an error if the CA bundle cannot be read or the HTTP client
    /// cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .danger_accept_invalid_certs(config.accepts_invalid_certs());

        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        if let Some(path) = config.ca_bundle() {
            let pem = fs::read(path).map_err(|source| OdpError::Io {
                path: path.display().to_string(),
                source,
            })?;
            for cert in Certificate::from_pem_bundle(&pem).map_err(OdpError::HttpError)? {
                builder = builder.add_root_certificate(cert);
            }
        }

        let http = builder.build().map_err(OdpError::HttpError)?;
        let tokens = TokenProvider::new(http.clone(), &config)?;

        Ok(Self {
            http,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
        })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base URL for the given target.
    ///
    /// # Errors
    ///
    /// Returns [`OdpError::AdminApiUnavailable`] for [`ApiTarget::Admin`] when
    /// no admin URL is configured.
    pub fn base_url(&self, target: ApiTarget) -> Result<&Url> {
        match target {
            ApiTarget::Public => Ok(self.config.public_api_url()),
            ApiTarget::Admin => self
                .config
                .admin_api_url()
                .ok_or(OdpError::AdminApiUnavailable),
        }
    }

    /// Resolve `path` against the target's base URL.
    ///
    /// A leading `/` is ignored so that paths extend the base URL rather than
    /// replacing its path. The result always stays under the base URL:
    /// absolute URLs and `.`/`..` segments are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`OdpError::InvalidArgument`] if the path would leave the base
    /// URL, or another error if the target is unavailable.
    pub fn url(&self, target: ApiTarget, path: &str) -> Result<Url> {
        let base = self.base_url(target)?;
        let relative = path.trim_start_matches('/');

        if Url::parse(relative).is_ok() || has_dot_segment(relative) {
            return Err(OdpError::InvalidArgument(format!(
                "path must be relative to the API base URL: {path}"
            )));
        }

        let url = base.join(relative)?;
        if url.origin() != base.origin() || !url.path().starts_with(base.path()) {
            return Err(OdpError::InvalidArgument(format!(
                "path resolves outside the API base URL: {path}"
            )));
        }
        Ok(url)
    }

    /// Return a valid access token, exchanging credentials if needed.
    ///
    /// # Errors
    ///
    /// Returns [`OdpError::Authentication`] if the OAuth2 server rejects the
    /// exchange, or [`OdpError::HttpError`] if it cannot be reached.
    pub async fn access_token(&self) -> Result<Arc<AccessToken>> {
        self.tokens.token().await
    }

    /// Force a new client credentials exchange, replacing the cached token.
    ///
    /// # Errors
    ///
    /// Same as [`OdpClient::access_token`].
    pub async fn refresh_token(&self) -> Result<Arc<AccessToken>> {
        self.tokens.refresh().await
    }

    /// Drop the cached token so the next request performs a new exchange.
    pub async fn invalidate_token(&self) {
        self.tokens.invalidate().await;
    }

    /// Send an authenticated request and return the raw response.
    ///
    /// The response status is not interpreted; non-success responses are
    /// returned as-is.
    ///
    /// # Errors
    ///
    /// - [`OdpError::AdminApiUnavailable`] if `target` is [`ApiTarget::Admin`]
    ///   and no admin URL is configured (nothing is sent).
    /// - [`OdpError::InvalidArgument`] if `path` does not stay under the base
    ///   URL (nothing is sent).
    /// - [`OdpError::Authentication`] if the token exchange is rejected (the
    ///   request is not sent).
    /// - [`OdpError::HttpError`] on transport failure.
    #[tracing::instrument(skip(self, body))]
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        target: ApiTarget,
        body: Option<&B>,
    ) -> Result<Response> {
        let mut builder = self.authorized(method, target, path).await?;
        if let Some(body) = body {
            builder = builder.json(body);
        }

        builder.send().await.map_err(OdpError::HttpError)
    }

    /// Make a GET request.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, target: ApiTarget, path: &str) -> Result<Response> {
        let builder = self.authorized(Method::GET, target, path).await?;
        Self::send_checked(builder).await
    }

    /// Make a GET request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        target: ApiTarget,
        path: &str,
        query: &Q,
    ) -> Result<Response> {
        let builder = self.authorized(Method::GET, target, path).await?;
        Self::send_checked(builder.query(query)).await
    }

    /// Make a POST request with JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        target: ApiTarget,
        path: &str,
        body: &B,
    ) -> Result<Response> {
        let builder = self.authorized(Method::POST, target, path).await?;
        Self::send_checked(builder.json(body)).await
    }

    /// Make a PUT request with JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        target: ApiTarget,
        path: &str,
        body: &B,
    ) -> Result<Response> {
        let builder = self.authorized(Method::PUT, target, path).await?;
        Self::send_checked(builder.json(body)).await
    }

    /// Build a request carrying the bearer token.
    ///
    /// The target is resolved before the token so that an unavailable admin
    /// API never triggers a token exchange.
    async fn authorized(
        &self,
        method: Method,
        target: ApiTarget,
        path: &str,
    ) -> Result<RequestBuilder> {
        let url = self.url(target, path)?;
        let token = self.tokens.token().await?;

        Ok(self
            .http
            .request(method, url)
            .bearer_auth(token.value())
            .header(header::ACCEPT, "application/json"))
    }

    async fn send_checked(builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(OdpError::HttpError)?;
        Self::check_response(response).await
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let detail = Self::extract_error_detail(response, status).await;
        Err(OdpError::Api {
            kind: ApiErrorKind::from_status(status.as_u16()),
            status_code: status.as_u16(),
            detail,
        })
    }

    /// Extract the error body of a failed response, as JSON when possible.
    async fn extract_error_detail(
        response: Response,
        status: reqwest::StatusCode,
    ) -> serde_json::Value {
        let body = match response.text().await {
            Ok(b) if !b.trim().is_empty() => b,
            _ => return serde_json::Value::String(format!("HTTP {status}")),
        };

        serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body))
    }
}

/// Whether the path part of `relative` contains a `.` or `..` segment,
/// including percent-encoded and backslash-separated forms.
fn has_dot_segment(relative: &str) -> bool {
    let path = relative.split(['?', '#']).next().unwrap_or_default();
    path.split(['/', '\\']).any(|segment| {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(admin: Option<&str>) -> OdpClient {
        let mut config = ClientConfig::new(
            "https://api.example.org/public",
            "https://auth.example.org",
            "abc",
            "xyz",
            ["read", "write"],
        )
        .unwrap();
        if let Some(admin) = admin {
            config = config.with_admin_api_url(admin).unwrap();
        }
        OdpClient::new(config).unwrap()
    }

    #[test]
    fn test_client_debug() {
        let client = client(None);
        let debug = format!("{:?}", client);
        assert!(debug.contains("OdpClient"));
        assert!(debug.contains("public_api_url"));
        // Secret should not be in debug output
        assert!(!debug.contains("xyz"));
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = client(None);
        let url = client.url(ApiTarget::Public, "/project/").unwrap();
        assert_eq!(url.as_str(), "https://api.example.org/public/project/");

        let url = client
            .url(ApiTarget::Public, "saeon/metadata/?offset=0&limit=100")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.org/public/saeon/metadata/?offset=0&limit=100"
        );
    }

    #[test]
    fn test_admin_url_requires_configuration() {
        let client = client(None);
        assert!(matches!(
            client.url(ApiTarget::Admin, "/institution/"),
            Err(OdpError::AdminApiUnavailable)
        ));

        let client = client_with_admin();
        assert_eq!(
            client.url(ApiTarget::Admin, "/institution/").unwrap().as_str(),
            "https://admin.example.org/institution/"
        );
    }

    #[test]
    fn test_url_rejects_paths_leaving_base() {
        let client = client(None);

        for path in [
            "https://evil.example.com/steal",
            "\\\\evil.example.com/steal",
            "../admin/institution/",
            "saeon/../../admin/",
            "%2e%2e/admin/",
            "./project/",
        ] {
            let err = client.url(ApiTarget::Public, path).unwrap_err();
            assert!(
                matches!(err, OdpError::InvalidArgument(_)),
                "{path} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn test_url_allows_dots_inside_segments() {
        let client = client(None);
        let url = client
            .url(ApiTarget::Public, "saeon/metadata/10.15493..x")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.org/public/saeon/metadata/10.15493..x"
        );

        let url = client.url(ApiTarget::Public, "//evil.example.com/x").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.org/public/evil.example.com/x"
        );
    }

    fn client_with_admin() -> OdpClient {
        client(Some("https://admin.example.org"))
    }

    #[test]
    fn test_missing_ca_bundle_is_configuration_error() {
        let config = ClientConfig::new(
            "https://api.example.org",
            "https://auth.example.org",
            "abc",
            "xyz",
            ["read"],
        )
        .unwrap()
        .with_ca_bundle("/nonexistent/odp-ca-bundle.pem");

        let err = OdpClient::new(config).unwrap_err();
        assert!(err.is_configuration());
    }
}
