//! SAEON Open Data Platform (ODP) API client library.
//!
//! Requests are authorized with an OAuth2 client credentials grant: the
//! client exchanges its ID and secret for a bearer token, caches it, and
//! attaches it to every call to the Public or Admin API.
//!
//! # Quick Start
//!
//! ```no_run
//! use odp::{ListPaged, MetadataListQuery, MetadataRecord, OdpClient};
//!
//! #[tokio::main]
//! async fn main() -> odp::Result<()> {
//!     // Create client from environment variables
//!     let client = OdpClient::from_env()?;
//!
//!     // First page of an institution's metadata records
//!     let query = MetadataListQuery::new("saeon");
//!     let page = MetadataRecord::list_page(&client, &query, 0, 100).await?;
//!     println!("Found {} records", page.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! [`OdpClient::request`] is the authenticated pass-through: it picks the base
//! URL for an [`ApiTarget`], attaches the token and returns the raw response.
//! Typed operations are organized around three traits:
//!
//! - [`Get`] - Fetch a single entity by ID
//! - [`List`] / [`ListPaged`] - Fetch collections of entities
//! - [`Create`] - Add an entity
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `ODP_PUBLIC_API` (required) - URL of the ODP Public API
//! - `ODP_ADMIN_API` (optional) - URL of the ODP Admin API
//! - `OAUTH2_SERVER` (required) - URL of the OAuth2 server
//! - `OAUTH2_CLIENT_ID` (required) - registered client ID
//! - `OAUTH2_CLIENT_SECRET` (required) - registered client secret
//! - `OAUTH2_SCOPE` (required) - whitespace-delimited list of scopes
//! - `REQUESTS_CA_BUNDLE` (optional) - extra CA certificates (PEM) to trust

pub mod cli;
mod client;
mod config;
mod error;
mod models;
pub mod output;
mod pagination;
mod token;
mod traits;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::{ApiTarget, OdpClient};
pub use config::{
    ClientConfig, ENV_ADMIN_API, ENV_CA_BUNDLE, ENV_CLIENT_ID, ENV_CLIENT_SECRET,
    ENV_OAUTH2_SERVER, ENV_PUBLIC_API, ENV_SCOPE,
};
pub use error::{ApiErrorKind, OdpError, Result};
pub use pagination::{Page, PaginationParams};
pub use token::AccessToken;

// Re-export traits
pub use traits::{Create, Get, List, ListPaged, DEFAULT_PAGE_SIZE, MAX_PAGES};

// Re-export models
pub use models::{
    // Institution types
    Institution,
    InstitutionCreateParams,
    // Metadata types
    MetadataListQuery,
    MetadataRecord,
    MetadataRecordKey,
    MetadataRecordParams,
    // Project types
    Project,
    ProjectCreateParams,
};

// Re-export the HTTP method type used by `OdpClient::request`
pub use reqwest::Method;
