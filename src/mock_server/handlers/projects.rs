//! Project endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::RwLock;

use super::auth::authorize;
use super::detail;
use crate::mock_server::state::MockState;
use crate::{Project, ProjectCreateParams};

/// GET /public/project/
pub async fn list_projects(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.write().await;
    if let Err(response) = authorize(&mut state, &headers) {
        return response;
    }

    let projects: Vec<Project> = state.projects.values().cloned().collect();
    (StatusCode::OK, Json(projects)).into_response()
}

/// POST /public/project/
pub async fn create_project(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Json(params): Json<ProjectCreateParams>,
) -> Response {
    let mut state = state.write().await;
    if let Err(response) = authorize(&mut state, &headers) {
        return response;
    }

    if state.projects.contains_key(&params.key) {
        return detail(
            StatusCode::CONFLICT,
            format!("Project '{}' already exists", params.key),
        );
    }

    let project = Project {
        key: params.key,
        name: params.name,
        description: params.description,
        extra: serde_json::Map::new(),
    };
    state.projects.insert(project.key.clone(), project.clone());

    (StatusCode::OK, Json(project)).into_response()
}
