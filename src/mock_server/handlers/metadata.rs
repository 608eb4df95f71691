//! Metadata record endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::auth::authorize;
use super::detail;
use crate::mock_server::state::MockState;
use crate::{MetadataRecord, MetadataRecordParams};

/// Query parameters for listing records.
#[derive(Debug, Default, Deserialize)]
pub struct ListRecordsQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

fn institution_known(state: &MockState, institution_key: &str) -> bool {
    state.institutions.contains_key(institution_key) || state.records.contains_key(institution_key)
}

/// GET /public/{institution}/metadata/
pub async fn list_records(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(institution_key): Path<String>,
    Query(query): Query<ListRecordsQuery>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.write().await;
    if let Err(response) = authorize(&mut state, &headers) {
        return response;
    }

    if !institution_known(&state, &institution_key) {
        return detail(StatusCode::NOT_FOUND, "Institution not found");
    }

    let records: Vec<MetadataRecord> = state
        .list_records(
            &institution_key,
            query.offset.unwrap_or(0),
            query.limit.unwrap_or(100),
        )
        .into_iter()
        .cloned()
        .collect();

    (StatusCode::OK, Json(records)).into_response()
}

/// GET /public/{institution}/metadata/{id}
pub async fn get_record(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((institution_key, record_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.write().await;
    if let Err(response) = authorize(&mut state, &headers) {
        return response;
    }

    match state.get_record(&institution_key, &record_id) {
        Some(record) => (StatusCode::OK, Json(record.clone())).into_response(),
        None => detail(
            StatusCode::NOT_FOUND,
            format!("Metadata record '{record_id}' not found"),
        ),
    }
}

/// POST /public/{institution}/metadata/
pub async fn upsert_record(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(institution_key): Path<String>,
    headers: HeaderMap,
    Json(mut params): Json<MetadataRecordParams>,
) -> Response {
    let mut state = state.write().await;
    if let Err(response) = authorize(&mut state, &headers) {
        return response;
    }

    if !institution_known(&state, &institution_key) {
        return detail(StatusCode::NOT_FOUND, "Institution not found");
    }

    if !params.data_agreement_accepted || !params.terms_conditions_accepted {
        return detail(
            StatusCode::FORBIDDEN,
            "The data agreement and terms and conditions must be accepted",
        );
    }

    params.institution_key = institution_key.clone();
    let record = state.upsert_record(&institution_key, params).clone();
    (StatusCode::OK, Json(record)).into_response()
}
