//! Target records: create, list, fetch, partial update. Targets are never deleted.

use chrono::Utc;
use tracing::info;

use crate::errors::AppError;
use crate::models::target::{NewTarget, Target, TargetPatch};
use crate::store::{
    find_record, find_records, insert_record, Collection, DocumentStore, Filter, MAX_LIST_RESULTS,
};

pub mod handlers;

fn require_non_blank(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn validate_new(input: &NewTarget) -> Result<(), AppError> {
    require_non_blank("name", &input.name)?;
    require_non_blank("title", &input.title)?;
    require_non_blank("company", &input.company)?;
    require_non_blank("linkedin_url", &input.linkedin_url)
}

fn validate_patch(patch: &TargetPatch) -> Result<(), AppError> {
    let required = [
        ("name", &patch.name),
        ("title", &patch.title),
        ("company", &patch.company),
        ("linkedin_url", &patch.linkedin_url),
    ];
    for (field, value) in required {
        if let Some(value) = value {
            require_non_blank(field, value)?;
        }
    }
    Ok(())
}

pub async fn create_target(store: &dyn DocumentStore, input: NewTarget) -> Result<Target, AppError> {
    validate_new(&input)?;

    let target = Target::create(input, Utc::now());
    insert_record(store, Collection::Targets, &target).await?;

    info!("Created target {} ({})", target.id, target.name);
    Ok(target)
}

pub async fn list_targets(store: &dyn DocumentStore) -> Result<Vec<Target>, AppError> {
    let targets = find_records(
        store,
        Collection::Targets,
        &Filter::all(),
        None,
        Some(MAX_LIST_RESULTS),
    )
    .await?;
    Ok(targets)
}

pub async fn get_target(store: &dyn DocumentStore, id: &str) -> Result<Target, AppError> {
    find_record(store, Collection::Targets, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Target {id} not found")))
}

/// Applies the patch and returns the updated record. `updated_at` is always refreshed,
/// even for an empty patch.
pub async fn update_target(
    store: &dyn DocumentStore,
    id: &str,
    patch: TargetPatch,
) -> Result<Target, AppError> {
    validate_patch(&patch)?;

    let set = patch
        .into_set(Utc::now())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize TargetPatch: {e}")))?;

    let matched = store
        .update_one(Collection::Targets, &Filter::by_id(id), set)
        .await?;
    if matched == 0 {
        return Err(AppError::NotFound(format!("Target {id} not found")));
    }

    get_target(store, id).await
}
