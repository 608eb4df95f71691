//! Institution endpoint handlers (Admin API).

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
use crate::{Institution, InstitutionCreateParams};

/// GET /admin/institution/
pub async fn list_institutions(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.write().await;
    if let Err(response) = authorize(&mut state, &headers) {
        return response;
    }

    let institutions: Vec<Institution> = state.institutions.values().cloned().collect();
    (StatusCode::OK, Json(institutions)).into_response()
}

/// POST /admin/institution/
pub async fn create_institution(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Json(params): Json<InstitutionCreateParams>,
) -> Response {
    let mut state = state.write().await;
    if let Err(response) = authorize(&mut state, &headers) {
        return response;
    }

    if state.institutions.contains_key(&params.key) {
        return detail(
            StatusCode::CONFLICT,
            format!("Institution '{}' already exists", params.key),
        );
    }

    if let Some(ref parent) = params.parent_key {
        if !state.institutions.contains_key(parent) {
            return detail(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Parent institution '{parent}' not found"),
            );
        }
    }

    let institution = Institution {
        key: params.key,
        name: params.name,
        parent_key: params.parent_key,
        extra: serde_json::Map::new(),
    };
    state
        .institutions
        .insert(institution.key.clone(), institution.clone());

    (StatusCode::OK, Json(institution)).into_response()
}
