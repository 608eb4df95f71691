//! Mock ODP API server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates both the
//! OAuth2 token endpoint and the ODP Public/Admin APIs. Unlike wiremock,
//! which mocks at the HTTP level per-test, this server maintains state
//! across requests, enabling realistic workflow testing.
//!
//! # Example
//!
//! ```ignore
//! use odp::mock_server::MockServer;
//! use odp::{List, OdpClient, Project};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = OdpClient::new(server.client_config()).unwrap();
//!
//!     // Server comes with default fixtures
//!     let projects = Project::list(&client, &()).await.unwrap();
//!     assert_eq!(projects[0].key, "ocean-obs");
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures};
pub use server::MockServer;
pub use state::{MockState, MOCK_CLIENT_ID, MOCK_CLIENT_SECRET};
