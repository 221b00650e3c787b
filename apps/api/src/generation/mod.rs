// Outreach message and synthetic post generation.
// All completions go through llm_client::Completer; no direct provider calls here.

pub mod generator;
pub mod handlers;
pub mod prompts;
