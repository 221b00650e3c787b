//! Reference (viral) posts and the generated posts derived from them.

use tracing::info;

use crate::errors::AppError;
use crate::models::post::{GeneratedPost, NewViralPost, ViralPost, MAX_ENGAGEMENT_SCORE};
use crate::store::{
    find_records, insert_record, Collection, DocumentStore, Filter, Sort, SortKey, StoreError,
};

pub mod handlers;

/// Cap on the ranked post listings.
pub const POST_LIST_LIMIT: usize = 10;

pub async fn create_viral_post(
    store: &dyn DocumentStore,
    input: NewViralPost,
) -> Result<ViralPost, AppError> {
    if input.original_content.trim().is_empty() {
        return Err(AppError::Validation(
            "original_content cannot be empty".to_string(),
        ));
    }

    if input
        .engagement_score
        .is_some_and(|score| score > MAX_ENGAGEMENT_SCORE)
    {
        return Err(AppError::Validation(format!(
            "engagement_score cannot exceed {MAX_ENGAGEMENT_SCORE}"
        )));
    }
    if input.id.as_deref().is_some_and(|id| id.trim().is_empty()) {
        return Err(AppError::Validation("id cannot be empty".to_string()));
    }

    let post = ViralPost::create(input);
    insert_record(store, Collection::ViralPosts, &post)
        .await
        .map_err(|e| match e {
            StoreError::DuplicateId { id, .. } => {
                AppError::Validation(format!("Viral post {id} already exists"))
            }
            other => AppError::Store(other),
        })?;

    info!(
        "Stored viral post {} (engagement {})",
        post.id, post.engagement_score
    );
    Ok(post)
}

/// Highest engagement first; ties in insertion order.
pub async fn list_viral_posts(store: &dyn DocumentStore) -> Result<Vec<ViralPost>, AppError> {
    let posts = find_records(
        store,
        Collection::ViralPosts,
        &Filter::all(),
        Some(Sort::desc(SortKey::Int("engagement_score"))),
        Some(POST_LIST_LIMIT),
    )
    .await?;
    Ok(posts)
}

/// Newest first.
pub async fn list_generated_posts(
    store: &dyn DocumentStore,
) -> Result<Vec<GeneratedPost>, AppError> {
    let posts = find_records(
        store,
        Collection::GeneratedPosts,
        &Filter::all(),
        Some(Sort::desc(SortKey::Time("created_at"))),
        Some(POST_LIST_LIMIT),
    )
    .await?;
    Ok(posts)
}
