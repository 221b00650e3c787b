use axum::{
    extract::{Path, State},
    Json,
};

use crate::errors::AppError;
use crate::models::target::{NewTarget, Target, TargetPatch};
use crate::state::AppState;
use crate::targets::{create_target, get_target, list_targets, update_target};

/// POST /api/targets
pub async fn handle_create_target(
    State(state): State<AppState>,
    Json(input): Json<NewTarget>,
) -> Result<Json<Target>, AppError> {
    Ok(Json(create_target(state.store.as_ref(), input).await?))
}

/// GET /api/targets
pub async fn handle_list_targets(
    State(state): State<AppState>,
) -> Result<Json<Vec<Target>>, AppError> {
    Ok(Json(list_targets(state.store.as_ref()).await?))
}

/// GET /api/targets/:id
pub async fn handle_get_target(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Target>, AppError> {
    Ok(Json(get_target(state.store.as_ref(), &id).await?))
}

/// PUT /api/targets/:id
///
/// Body is a `TargetPatch`; unknown keys are rejected before reaching here.
pub async fn handle_update_target(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<TargetPatch>,
) -> Result<Json<Target>, AppError> {
    Ok(Json(update_target(state.store.as_ref(), &id, patch).await?))
}
