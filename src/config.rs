//! Client configuration.
//!
//! [`ClientConfig`] is resolved once, usually from the process environment,
//! and handed to [`OdpClient::new`](crate::OdpClient::new). The client never
//! reads the environment on its own after construction.

use std::collections::BTreeSet;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{OdpError, Result};

/// URL of the ODP Public API.
pub const ENV_PUBLIC_API: &str = "ODP_PUBLIC_API";
/// URL of the ODP Admin API (optional).
pub const ENV_ADMIN_API: &str = "ODP_ADMIN_API";
/// URL of the OAuth2 server.
pub const ENV_OAUTH2_SERVER: &str = "OAUTH2_SERVER";
/// Registered client ID.
pub const ENV_CLIENT_ID: &str = "OAUTH2_CLIENT_ID";
/// Registered client secret.
pub const ENV_CLIENT_SECRET: &str = "OAUTH2_CLIENT_SECRET";
/// Whitespace-delimited list of scopes.
pub const ENV_SCOPE: &str = "OAUTH2_SCOPE";
/// PEM bundle of extra trusted CAs, for non-production servers.
pub const ENV_CA_BUNDLE: &str = "REQUESTS_CA_BUNDLE";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolved ODP client configuration.
///
/// Base URLs are normalized to end with `/` so that request paths join onto
/// them instead of replacing their last segment.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    public_api_url: Url,
    admin_api_url: Option<Url>,
    oauth2_server_url: Url,
    client_id: String,
    client_secret: String,
    scope: BTreeSet<String>,
    timeout: Option<Duration>,
    accept_invalid_certs: bool,
    ca_bundle: Option<PathBuf>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("public_api_url", &self.public_api_url.as_str())
            .field("admin_api_url", &self.admin_api_url.as_ref().map(Url::as_str))
            .field("oauth2_server_url", &self.oauth2_server_url.as_str())
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Build a configuration explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`OdpError::InvalidEnv`] naming the corresponding environment
    /// variable if either URL is invalid or the scope list is empty.
    pub fn new<I, S>(
        public_api_url: &str,
        oauth2_server_url: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scope: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scope: BTreeSet<String> = scope.into_iter().map(Into::into).collect();
        if scope.is_empty() {
            return Err(OdpError::InvalidEnv {
                variable: ENV_SCOPE,
                reason: "at least one scope is required".to_string(),
            });
        }

        Ok(Self {
            public_api_url: parse_env_url(ENV_PUBLIC_API, public_api_url)?,
            admin_api_url: None,
            oauth2_server_url: parse_env_url(ENV_OAUTH2_SERVER, oauth2_server_url)?,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope,
            timeout: Some(DEFAULT_TIMEOUT),
            accept_invalid_certs: false,
            ca_bundle: None,
        })
    }

    /// Resolve the configuration from the process environment.
    ///
    /// Reads `ODP_PUBLIC_API`, `ODP_ADMIN_API` (optional), `OAUTH2_SERVER`,
    /// `OAUTH2_CLIENT_ID`, `OAUTH2_CLIENT_SECRET`, `OAUTH2_SCOPE` and
    /// `REQUESTS_CA_BUNDLE` (optional).
    ///
    /// # Errors
    ///
    /// Returns [`OdpError::MissingEnv`] naming the first required variable
    /// that is unset, or [`OdpError::InvalidEnv`] if a value is malformed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve the configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(OdpError::MissingEnv(name));

        let public_api = require(ENV_PUBLIC_API)?;
        let oauth2_server = require(ENV_OAUTH2_SERVER)?;
        let client_id = require(ENV_CLIENT_ID)?;
        let client_secret = require(ENV_CLIENT_SECRET)?;
        let scope = require(ENV_SCOPE)?;

        let mut config = Self {
            public_api_url: parse_env_url(ENV_PUBLIC_API, &public_api)?,
            admin_api_url: None,
            oauth2_server_url: parse_env_url(ENV_OAUTH2_SERVER, &oauth2_server)?,
            client_id,
            client_secret,
            scope: scope.split_whitespace().map(str::to_string).collect(),
            timeout: Some(DEFAULT_TIMEOUT),
            accept_invalid_certs: false,
            ca_bundle: get(ENV_CA_BUNDLE).map(PathBuf::from),
        };

        if let Some(admin_api) = get(ENV_ADMIN_API) {
            config.admin_api_url = Some(parse_env_url(ENV_ADMIN_API, &admin_api)?);
        }

        Ok(config)
    }

    /// Set the admin API URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn with_admin_api_url(mut self, url: &str) -> Result<Self> {
        self.admin_api_url = Some(parse_env_url(ENV_ADMIN_API, url)?);
        Ok(self)
    }

    /// Set the per-request timeout. `None` disables it.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Skip TLS certificate verification.
    ///
    /// Only meant for local development instances of the API and auth servers.
    #[must_use]
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Trust the CAs in the given PEM bundle in addition to the system roots.
    #[must_use]
    pub fn with_ca_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_bundle = Some(path.into());
        self
    }

    /// Base URL of the Public API.
    pub fn public_api_url(&self) -> &Url {
        &self.public_api_url
    }

    /// Base URL of the Admin API, if configured.
    pub fn admin_api_url(&self) -> Option<&Url> {
        self.admin_api_url.as_ref()
    }

    /// Base URL of the OAuth2 server.
    pub fn oauth2_server_url(&self) -> &Url {
        &self.oauth2_server_url
    }

    /// OAuth2 token endpoint (`<server>/oauth2/token`).
    ///
    /// # Errors
    ///
    /// Returns an error if the server URL cannot be joined.
    pub fn token_endpoint(&self) -> Result<Url> {
        Ok(self.oauth2_server_url.join("oauth2/token")?)
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Requested scopes.
    pub fn scope(&self) -> &BTreeSet<String> {
        &self.scope
    }

    /// Scopes joined for the token request's `scope` parameter.
    pub fn scope_param(&self) -> String {
        self.scope.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }

    pub fn ca_bundle(&self) -> Option<&PathBuf> {
        self.ca_bundle.as_ref()
    }
}

fn parse_env_url(variable: &'static str, value: &str) -> Result<Url> {
    parse_base_url(value).map_err(|reason| OdpError::InvalidEnv { variable, reason })
}

/// Parse a base URL, ensuring it ends with `/`.
fn parse_base_url(value: &str) -> core::result::Result<Url, String> {
    let value = value.trim();
    let base = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    };

    let url = Url::parse(&base).map_err(|e| format!("{e} ({value})"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{other}' in {value}")),
    }
}
