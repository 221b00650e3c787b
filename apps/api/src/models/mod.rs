pub mod message;
pub mod post;
pub mod status;
pub mod target;

/// Fresh opaque document id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
