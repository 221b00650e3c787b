//! Postgres-backed document store: one JSONB row per document.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;

use super::{document_id, Collection, Condition, DocumentStore, Filter, Sort, SortKey, StoreError};

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends `WHERE collection = .. AND <conditions>` to the builder.
/// Field names are bound as parameters, never spliced into the SQL text.
fn push_where<'a>(qb: &mut QueryBuilder<'a, Postgres>, collection: Collection, filter: &'a Filter) {
    qb.push(" WHERE collection = ").push_bind(collection.as_str());

    for cond in &filter.conditions {
        match cond {
            Condition::Eq(field, value) => {
                qb.push(" AND body->>")
                    .push_bind(*field)
                    .push(" = ")
                    .push_bind(value.as_str());
            }
            Condition::Gte(field, t) => {
                qb.push(" AND (body->>")
                    .push_bind(*field)
                    .push(")::timestamptz >= ")
                    .push_bind(*t);
            }
            Condition::Lt(field, t) => {
                qb.push(" AND (body->>")
                    .push_bind(*field)
                    .push(")::timestamptz < ")
                    .push_bind(*t);
            }
        }
    }
}

fn push_order(qb: &mut QueryBuilder<'_, Postgres>, sort: Option<Sort>) {
    if let Some(sort) = sort {
        let (field, cast) = match sort.key {
            SortKey::Int(field) => (field, "bigint"),
            SortKey::Time(field) => (field, "timestamptz"),
        };
        let direction = if sort.descending {
            "DESC NULLS LAST"
        } else {
            "ASC NULLS FIRST"
        };
        qb.push(" ORDER BY (body->>")
            .push_bind(field)
            .push(format!(")::{cast} {direction}, seq ASC"));
    } else {
        qb.push(" ORDER BY seq ASC");
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert_one(&self, collection: Collection, doc: Value) -> Result<(), StoreError> {
        let doc_id = document_id(&doc)?.to_string();

        sqlx::query("INSERT INTO documents (collection, doc_id, body) VALUES ($1, $2, $3)")
            .bind(collection.as_str())
            .bind(&doc_id)
            .bind(&doc)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    StoreError::DuplicateId {
                        collection: collection.as_str(),
                        id: doc_id.clone(),
                    }
                }
                other => StoreError::Database(other),
            })?;

        Ok(())
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        sort: Option<Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<Value>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT body FROM documents");
        push_where(&mut qb, collection, filter);
        push_order(&mut qb, sort);
        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }

        let docs = qb
            .build_query_scalar::<Value>()
            .fetch_all(&self.pool)
            .await?;
        Ok(docs)
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM documents");
        push_where(&mut qb, collection, filter);

        let count = qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Map<String, Value>,
    ) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE documents SET body = body || ");
        qb.push_bind(Value::Object(set));
        qb.push(" WHERE seq = (SELECT seq FROM documents");
        push_where(&mut qb, collection, filter);
        qb.push(" ORDER BY seq ASC LIMIT 1)");

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL connection pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn select<'a>() -> QueryBuilder<'a, Postgres> {
        QueryBuilder::new("SELECT body FROM documents")
    }

    #[test]
    fn test_empty_filter_scopes_to_collection_only() {
        let filter = Filter::all();
        let mut qb = select();
        push_where(&mut qb, Collection::Targets, &filter);
        push_order(&mut qb, None);

        assert_eq!(
            qb.sql(),
            "SELECT body FROM documents WHERE collection = $1 ORDER BY seq ASC"
        );
    }

    #[test]
    fn test_conditions_bind_field_names_and_values() {
        let end = Utc::now();
        let filter = Filter::all()
            .eq("status", "sent")
            .within("created_at", end - Duration::days(1), end);
        let mut qb = select();
        push_where(&mut qb, Collection::Messages, &filter);

        assert_eq!(
            qb.sql(),
            "SELECT body FROM documents WHERE collection = $1 \
             AND body->>$2 = $3 \
             AND (body->>$4)::timestamptz >= $5 \
             AND (body->>$6)::timestamptz < $7"
        );
    }

    #[test]
    fn test_descending_sort_puts_nulls_last_and_breaks_ties_by_seq() {
        let filter = Filter::all();
        let mut qb = select();
        push_where(&mut qb, Collection::ViralPosts, &filter);
        push_order(&mut qb, Some(Sort::desc(SortKey::Int("engagement_score"))));

        assert_eq!(
            qb.sql(),
            "SELECT body FROM documents WHERE collection = $1 \
             ORDER BY (body->>$2)::bigint DESC NULLS LAST, seq ASC"
        );
    }

    #[test]
    fn test_time_sort_casts_to_timestamptz() {
        let mut qb = select();
        push_order(
            &mut qb,
            Some(Sort {
                key: SortKey::Time("created_at"),
                descending: false,
            }),
        );

        assert_eq!(
            qb.sql(),
            "SELECT body FROM documents ORDER BY (body->>$1)::timestamptz ASC NULLS FIRST, seq ASC"
        );
    }
}
