use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the single JSONB table backing every collection, if missing.
///
/// `seq` records insertion order and is the tie-breaker for sorted reads.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            seq        BIGSERIAL PRIMARY KEY,
            collection TEXT NOT NULL,
            doc_id     TEXT NOT NULL,
            body       JSONB NOT NULL,
            UNIQUE (collection, doc_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS documents_collection_idx ON documents (collection)")
        .execute(pool)
        .await?;

    info!("Document schema ready");
    Ok(())
}
