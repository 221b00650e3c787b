use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::Completer;
use crate::store::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once in `main`; the store is closed there on shutdown.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable document store. Postgres when DATABASE_URL is set, in-memory otherwise.
    pub store: Arc<dyn DocumentStore>,
    pub llm: Arc<dyn Completer>,
    pub config: Config,
}
