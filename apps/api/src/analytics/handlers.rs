use axum::{extract::State, Json};
use chrono::Utc;

use crate::analytics::{compute, AnalyticsSnapshot};
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/analytics
pub async fn handle_get_analytics(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsSnapshot>, AppError> {
    let snapshot = compute(state.store.as_ref(), Utc::now()).await?;
    Ok(Json(snapshot))
}
