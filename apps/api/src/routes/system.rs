//! Root banner, client status checks and provider self-tests.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::llm_client::Provider;
use crate::models::status::{NewStatusCheck, StatusCheck};
use crate::state::AppState;
use crate::store::{find_records, insert_record, Collection, Filter, MAX_LIST_RESULTS};

/// GET /api/
pub async fn handle_root() -> Json<Value> {
    Json(json!({ "message": "LinkedIn AI Automation System" }))
}

/// POST /api/status
pub async fn handle_create_status(
    State(state): State<AppState>,
    Json(input): Json<NewStatusCheck>,
) -> Result<Json<StatusCheck>, AppError> {
    let check = StatusCheck::create(input);
    insert_record(state.store.as_ref(), Collection::StatusChecks, &check).await?;
    Ok(Json(check))
}

/// GET /api/status
pub async fn handle_list_status(
    State(state): State<AppState>,
) -> Result<Json<Vec<StatusCheck>>, AppError> {
    let checks = find_records(
        state.store.as_ref(),
        Collection::StatusChecks,
        &Filter::all(),
        None,
        Some(MAX_LIST_RESULTS),
    )
    .await?;
    Ok(Json(checks))
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProviderTestResponse {
    Success { response: String },
    Error { error: String },
}

/// GET /api/test/:provider
///
/// Always answers 200; the body says whether the round trip worked.
pub async fn handle_provider_test(
    State(state): State<AppState>,
    Path(provider): Path<Provider>,
) -> Json<ProviderTestResponse> {
    let body = match state.llm.ping(provider).await {
        Ok(response) => ProviderTestResponse::Success { response },
        Err(e) => ProviderTestResponse::Error {
            error: e.to_string(),
        },
    };
    Json(body)
}
