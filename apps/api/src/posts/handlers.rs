use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::models::post::{GeneratedPost, NewViralPost, ViralPost};
use crate::posts::{create_viral_post, list_generated_posts, list_viral_posts};
use crate::state::AppState;

/// GET /api/viral-posts
pub async fn handle_list_viral_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<ViralPost>>, AppError> {
    Ok(Json(list_viral_posts(state.store.as_ref()).await?))
}

/// POST /api/viral-posts
pub async fn handle_create_viral_post(
    State(state): State<AppState>,
    Json(input): Json<NewViralPost>,
) -> Result<Json<ViralPost>, AppError> {
    Ok(Json(create_viral_post(state.store.as_ref(), input).await?))
}

/// GET /api/generated-posts
pub async fn handle_list_generated_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<GeneratedPost>>, AppError> {
    Ok(Json(list_generated_posts(state.store.as_ref()).await?))
}
