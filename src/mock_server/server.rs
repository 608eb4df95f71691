//! Mock ODP API server.
//!
//! Provides an axum-based HTTP server that simulates the OAuth2 token
//! endpoint and the ODP Public and Admin APIs on a single port.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::{DefaultScenario, Fixtures};
use super::handlers;
use super::state::MockState;
use crate::ClientConfig;

/// A mock ODP server for testing.
///
/// The server runs in the background and can be used to test the ODP client
/// against a realistic API implementation. The Public API lives under
/// `/public`, the Admin API under `/admin`, and the token endpoint at
/// `/oauth2/token`.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    pub async fn start() -> Self {
        Self::with_state(Self::default_state()).await
    }

    /// Start a mock server with empty state.
    ///
    /// Useful when you want to control exactly what data is available.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url: format!("http://{}", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server (also the OAuth2 server URL).
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Base URL of the mock Public API.
    pub fn public_url(&self) -> String {
        format!("{}/public", self.url)
    }

    /// Base URL of the mock Admin API.
    pub fn admin_url(&self) -> String {
        format!("{}/admin", self.url)
    }

    /// Client configuration pointing at this server, with the default
    /// credentials and both APIs configured.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(
            &self.public_url(),
            &self.url,
            super::MOCK_CLIENT_ID,
            super::MOCK_CLIENT_SECRET,
            ["ODP.Admin", "ODP.Metadata"],
        )
        .and_then(|config| config.with_admin_api_url(&self.admin_url()))
        .expect("mock server URLs are valid")
    }

    /// Get access to the server's shared state.
    ///
    /// This allows modifying the mock data during a test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Number of token requests the server has received.
    pub async fn token_requests(&self) -> usize {
        self.state.read().await.token_requests
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the default state with common test fixtures.
    fn default_state() -> MockState {
        let scenario = Fixtures::default_scenario();
        Self::state_from_scenario(scenario)
    }

    /// Create state from a scenario.
    fn state_from_scenario(scenario: DefaultScenario) -> MockState {
        let mut state = MockState::new();

        for institution in scenario.institutions {
            state = state.with_institution(institution);
        }

        for project in scenario.projects {
            state = state.with_project(project);
        }

        for (institution_key, record) in scenario.records {
            state = state.with_record(&institution_key, record);
        }

        state
    }

    /// Create the axum router with all routes.
    fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        Router::new()
            // OAuth2
            .route("/oauth2/token", post(handlers::issue_token))
            // Admin API
            .route(
                "/admin/institution/",
                get(handlers::list_institutions).post(handlers::create_institution),
            )
            // Public API
            .route(
                "/public/project/",
                get(handlers::list_projects).post(handlers::create_project),
            )
            .route(
                "/public/:institution/metadata/",
                get(handlers::list_records).post(handlers::upsert_record),
            )
            .route(
                "/public/:institution/metadata/:id",
                get(handlers::get_record),
            )
            // Health check
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}
