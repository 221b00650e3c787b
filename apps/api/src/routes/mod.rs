pub mod health;
pub mod system;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analytics::handlers as analytics;
use crate::generation::handlers as generation;
use crate::messages::handlers as messages;
use crate::posts::handlers as posts;
use crate::state::AppState;
use crate::targets::handlers as targets;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api", get(system::handle_root))
        .route("/api/", get(system::handle_root))
        .route(
            "/api/status",
            get(system::handle_list_status).post(system::handle_create_status),
        )
        // Targets
        .route(
            "/api/targets",
            get(targets::handle_list_targets).post(targets::handle_create_target),
        )
        .route(
            "/api/targets/:id",
            get(targets::handle_get_target).put(targets::handle_update_target),
        )
        // Messages
        .route(
            "/api/messages",
            get(messages::handle_list_messages).post(messages::handle_create_message),
        )
        .route(
            "/api/messages/generate",
            post(generation::handle_generate_message),
        )
        // Posts
        .route(
            "/api/viral-posts",
            get(posts::handle_list_viral_posts).post(posts::handle_create_viral_post),
        )
        .route("/api/generate-post", post(generation::handle_generate_post))
        .route(
            "/api/generated-posts",
            get(posts::handle_list_generated_posts),
        )
        // Analytics and provider self-tests
        .route("/api/analytics", get(analytics::handle_get_analytics))
        .route("/api/test/:provider", get(system::handle_provider_test))
        .with_state(state)
}
