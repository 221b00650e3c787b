//! Document store adapter: named collections of flat JSON records.
//!
//! Callers never see SQL: they address a [`Collection`], narrow it with a
//! [`Filter`], and optionally order it with a [`Sort`]. Two backends exist:
//! `PgDocumentStore` (JSONB rows in Postgres) and `MemoryDocumentStore`.
//! Both honour the same ordering rule: ties on the sort key fall back to
//! insertion order, oldest first.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Fixed result cap for unpaginated list reads.
pub const MAX_LIST_RESULTS: usize = 1000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document has no string `id` field")]
    MissingId,

    #[error("Document `{id}` already exists in {collection}")]
    DuplicateId {
        collection: &'static str,
        id: String,
    },

    #[error("In-memory store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Targets,
    Messages,
    ViralPosts,
    GeneratedPosts,
    StatusChecks,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Targets => "targets",
            Collection::Messages => "messages",
            Collection::ViralPosts => "viral_posts",
            Collection::GeneratedPosts => "generated_posts",
            Collection::StatusChecks => "status_checks",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Filters and sorting
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// String field equals the value.
    Eq(&'static str, String),
    /// Timestamp field is at or after the instant.
    Gte(&'static str, DateTime<Utc>),
    /// Timestamp field is strictly before the instant.
    Lt(&'static str, DateTime<Utc>),
}

/// A conjunction of conditions. The empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub conditions: Vec<Condition>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: &str) -> Self {
        Self::all().eq("id", id)
    }

    pub fn eq(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::Eq(field, value.into()));
        self
    }

    /// Half-open time window: `start <= field < end`.
    pub fn within(mut self, field: &'static str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.conditions.push(Condition::Gte(field, start));
        self.conditions.push(Condition::Lt(field, end));
        self
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.conditions.iter().all(|cond| match cond {
            Condition::Eq(field, value) => doc.get(*field).and_then(Value::as_str) == Some(value.as_str()),
            Condition::Gte(field, t) => time_field(doc, field).is_some_and(|v| v >= *t),
            Condition::Lt(field, t) => time_field(doc, field).is_some_and(|v| v < *t),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Int(&'static str),
    Time(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub descending: bool,
}

impl Sort {
    pub fn desc(key: SortKey) -> Self {
        Self {
            key,
            descending: true,
        }
    }

    /// Compares two documents on the sort key alone. Missing values sort lowest.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let ord = match self.key {
            SortKey::Int(field) => {
                let get = |d: &Value| d.get(field).and_then(Value::as_i64);
                get(a).cmp(&get(b))
            }
            SortKey::Time(field) => time_field(a, field).cmp(&time_field(b, field)),
        };
        if self.descending {
            ord.reverse()
        } else {
            ord
        }
    }
}

fn time_field(doc: &Value, field: &str) -> Option<DateTime<Utc>> {
    doc.get(field)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Generic CRUD over named collections. Carried in `AppState` as
/// `Arc<dyn DocumentStore>`; every document must carry a string `id`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fails with [`StoreError::DuplicateId`] if the collection already holds the id.
    async fn insert_one(&self, collection: Collection, doc: Value) -> Result<(), StoreError>;

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        sort: Option<Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<Value>, StoreError>;

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError>;

    /// Merges `set` into the first matching document. Returns the matched count (0 or 1).
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Map<String, Value>,
    ) -> Result<u64, StoreError>;

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Value>, StoreError> {
        Ok(self
            .find(collection, filter, None, Some(1))
            .await?
            .into_iter()
            .next())
    }

    /// Releases backend resources at shutdown.
    async fn close(&self) {}
}

// ────────────────────────────────────────────────────────────────────────────
// Typed helpers
// ────────────────────────────────────────────────────────────────────────────

pub async fn insert_record<T: Serialize + Sync>(
    store: &dyn DocumentStore,
    collection: Collection,
    record: &T,
) -> Result<(), StoreError> {
    let doc = serde_json::to_value(record)?;
    store.insert_one(collection, doc).await
}

pub async fn find_records<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    filter: &Filter,
    sort: Option<Sort>,
    limit: Option<usize>,
) -> Result<Vec<T>, StoreError> {
    store
        .find(collection, filter, sort, limit)
        .await?
        .into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
        .collect()
}

pub async fn find_record<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
) -> Result<Option<T>, StoreError> {
    store
        .find_one(collection, &Filter::by_id(id))
        .await?
        .map(serde_json::from_value)
        .transpose()
        .map_err(StoreError::from)
}

pub(crate) fn document_id(doc: &Value) -> Result<&str, StoreError> {
    doc.get("id").and_then(Value::as_str).ok_or(StoreError::MissingId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::all().matches(&json!({"id": "a"})));
    }

    #[test]
    fn test_eq_requires_string_match() {
        let filter = Filter::all().eq("status", "sent");
        assert!(filter.matches(&json!({"status": "sent"})));
        assert!(!filter.matches(&json!({"status": "replied"})));
        assert!(!filter.matches(&json!({"other": "sent"})));
    }

    #[test]
    fn test_within_is_half_open() {
        let end = Utc::now();
        let start = end - Duration::days(1);
        let filter = Filter::all().within("created_at", start, end);

        assert!(filter.matches(&json!({ "created_at": start })));
        assert!(!filter.matches(&json!({ "created_at": end })));
        assert!(filter.matches(&json!({ "created_at": end - Duration::seconds(1) })));
        assert!(!filter.matches(&json!({ "created_at": start - Duration::seconds(1) })));
    }

    #[test]
    fn test_sort_desc_int_puts_missing_last() {
        let sort = Sort::desc(SortKey::Int("engagement_score"));
        let high = json!({"engagement_score": 90});
        let low = json!({"engagement_score": 50});
        let missing = json!({});
        assert_eq!(sort.compare(&high, &low), Ordering::Less);
        assert_eq!(sort.compare(&missing, &low), Ordering::Greater);
    }

    #[test]
    fn test_document_id_requires_string() {
        assert_eq!(document_id(&json!({"id": "x"})).unwrap(), "x");
        assert!(matches!(
            document_id(&json!({"id": 5})),
            Err(StoreError::MissingId)
        ));
    }
}
