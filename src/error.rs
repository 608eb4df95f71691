//! Error types for ODP API operations.

use std::fmt;

use thiserror::Error;

/// Errors that can occur during ODP API operations.
#[derive(Debug, Error)]
pub enum OdpError {
    /// A required environment variable is not set (or is empty).
    #[error("ODP configuration required: environment variable {0} not set")]
    MissingEnv(&'static str),

    /// An environment variable is set but cannot be used.
    #[error("ODP configuration invalid: {variable}: {reason}")]
    InvalidEnv {
        variable: &'static str,
        reason: String,
    },

    /// An admin API operation was requested but no admin URL is configured.
    #[error("ODP admin API not configured (set ODP_ADMIN_API)")]
    AdminApiUnavailable,

    /// The OAuth2 server rejected the client credentials exchange.
    #[error("OAuth2 token exchange rejected: {message}")]
    Authentication {
        message: String,
        status_code: Option<u16>,
    },

    /// The API answered with a non-success status.
    #[error("ODP API error ({kind}, HTTP {status_code}): {detail}")]
    Api {
        kind: ApiErrorKind,
        status_code: u16,
        detail: serde_json::Value,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Listing every page would exceed the page limit; no partial result is
    /// returned.
    #[error("Pagination limit reached after {pages} pages")]
    PageLimitExceeded { pages: u32 },

    /// A caller-supplied argument is unusable.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Reading a file named by the configuration failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Classification of a non-success API response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// HTTP 403: the token lacks the scope or role for this operation.
    Forbidden,
    /// Any other 4xx.
    Client,
    /// 5xx.
    Server,
    /// Anything else that is not a success.
    Other,
}

impl ApiErrorKind {
    /// Classify an HTTP status code.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            403 => Self::Forbidden,
            400..=499 => Self::Client,
            500..=599 => Self::Server,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Forbidden => "forbidden",
            Self::Client => "client error",
            Self::Server => "server error",
            Self::Other => "unexpected status",
        };
        f.write_str(s)
    }
}

impl OdpError {
    /// True for missing/invalid configuration or an unavailable API target.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingEnv(_)
                | Self::InvalidEnv { .. }
                | Self::AdminApiUnavailable
                | Self::UrlError(_)
                | Self::Io { .. }
        )
    }

    /// True when the token exchange was rejected, or the API refused the token.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. }
                | Self::Api {
                    kind: ApiErrorKind::Forbidden,
                    ..
                }
        )
    }

    /// True for network or TLS failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::HttpError(_))
    }

    /// The HTTP status associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication { status_code, .. } => *status_code,
            Self::Api { status_code, .. } => Some(*status_code),
            Self::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for ODP operations.
pub type Result<T> = core::result::Result<T, OdpError>;
