//! In-memory document store for tests and database-less runs.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{document_id, Collection, DocumentStore, Filter, Sort, StoreError};

/// Each collection is a vector in insertion order, so a stable sort keeps
/// the insertion-order tie-break for free.
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<Value>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert_one(&self, collection: Collection, doc: Value) -> Result<(), StoreError> {
        let id = document_id(&doc)?;
        let mut collections = self.collections.write().map_err(|_| StoreError::Poisoned)?;
        let docs = collections.entry(collection).or_default();
        if docs.iter().any(|d| document_id(d).is_ok_and(|existing| existing == id)) {
            return Err(StoreError::DuplicateId {
                collection: collection.as_str(),
                id: id.to_string(),
            });
        }
        docs.push(doc);
        Ok(())
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        sort: Option<Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().map_err(|_| StoreError::Poisoned)?;
        let mut docs: Vec<Value> = collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default();

        if let Some(sort) = sort {
            docs.sort_by(|a, b| sort.compare(a, b));
        }
        if let Some(limit) = limit {
            docs.truncate(limit);
        }
        Ok(docs)
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        let collections = self.collections.read().map_err(|_| StoreError::Poisoned)?;
        let count = collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Map<String, Value>,
    ) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().map_err(|_| StoreError::Poisoned)?;
        let Some(doc) = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| filter.matches(d)))
        else {
            return Ok(0);
        };

        if let Value::Object(fields) = doc {
            fields.extend(set);
        }
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SortKey;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_rejects_document_without_id() {
        let store = MemoryDocumentStore::new();
        let err = store
            .insert_one(Collection::Targets, json!({"name": "x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingId));
        assert_eq!(store.count(Collection::Targets, &Filter::all()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id_within_collection() {
        let store = MemoryDocumentStore::new();
        store
            .insert_one(Collection::ViralPosts, json!({"id": "dup", "engagement_score": 1}))
            .await
            .unwrap();

        let err = store
            .insert_one(Collection::ViralPosts, json!({"id": "dup", "engagement_score": 2}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId { ref id, .. } if id == "dup"));
        assert_eq!(store.count(Collection::ViralPosts, &Filter::all()).await.unwrap(), 1);

        store
            .insert_one(Collection::Targets, json!({"id": "dup"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_sorted_find_breaks_ties_by_insertion_order() {
        let store = MemoryDocumentStore::new();
        for (id, score) in [("a", 10), ("b", 30), ("c", 10), ("d", 30)] {
            store
                .insert_one(
                    Collection::ViralPosts,
                    json!({"id": id, "engagement_score": score}),
                )
                .await
                .unwrap();
        }

        let docs = store
            .find(
                Collection::ViralPosts,
                &Filter::all(),
                Some(Sort::desc(SortKey::Int("engagement_score"))),
                Some(3),
            )
            .await
            .unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["b", "d", "a"]);
    }

    #[tokio::test]
    async fn test_update_one_merges_fields_and_reports_match() {
        let store = MemoryDocumentStore::new();
        store
            .insert_one(Collection::Targets, json!({"id": "t1", "name": "Ann", "title": "CTO"}))
            .await
            .unwrap();

        let mut set = Map::new();
        set.insert("title".into(), json!("CEO"));
        let matched = store
            .update_one(Collection::Targets, &Filter::by_id("t1"), set.clone())
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let doc = store
            .find_one(Collection::Targets, &Filter::by_id("t1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc["title"], "CEO");
        assert_eq!(doc["name"], "Ann");

        let missed = store
            .update_one(Collection::Targets, &Filter::by_id("nope"), set)
            .await
            .unwrap();
        assert_eq!(missed, 0);
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = MemoryDocumentStore::new();
        store
            .insert_one(Collection::Messages, json!({"id": "m1"}))
            .await
            .unwrap();
        assert_eq!(store.count(Collection::Targets, &Filter::all()).await.unwrap(), 0);
        assert_eq!(store.count(Collection::Messages, &Filter::all()).await.unwrap(), 1);
    }
}
