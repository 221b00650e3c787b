//! Generation Service.
//!
//! Both pipelines run strictly in order: compose prompts → one completion call
//! → one insert. A failure at any step returns before the insert, so nothing
//! is ever persisted for a failed generation.

use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::generation::prompts::{
    compose_message_prompt, compose_viral_post_prompt, ProfileData, MAX_REFERENCE_POSTS,
};
use crate::llm_client::{Completer, Provider, SamplingParams};
use crate::models::message::{Message, MessageType};
use crate::models::post::{GeneratedPost, ViralPost};
use crate::models::target::Target;
use crate::store::{
    find_record, find_records, insert_record, Collection, DocumentStore, Filter, Sort, SortKey,
};

/// Request body for outreach message generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateMessageRequest {
    pub target_id: String,
    /// Falls back to the stored target's fields when omitted.
    pub profile_data: Option<ProfileData>,
    #[serde(default)]
    pub message_type: MessageType,
    #[serde(default)]
    pub llm_provider: Provider,
}

/// Generates a personalized outreach message and stores it as a `draft`.
///
/// The target must exist; the lookup happens before the provider is called.
pub async fn generate_message(
    store: &dyn DocumentStore,
    llm: &dyn Completer,
    request: GenerateMessageRequest,
) -> Result<Message, AppError> {
    let GenerateMessageRequest {
        target_id,
        profile_data,
        message_type,
        llm_provider,
    } = request;

    let target: Target = find_record(store, Collection::Targets, &target_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Target {target_id} not found")))?;

    let profile = profile_data.unwrap_or_else(|| ProfileData::from(&target));
    let prompts = compose_message_prompt(&profile, message_type.as_str());

    info!(
        "Generating {} for target {} via {}",
        message_type, target.id, llm_provider
    );
    let content = llm
        .complete(
            &prompts.system,
            &prompts.user,
            llm_provider,
            SamplingParams::OUTREACH_MESSAGE,
        )
        .await?;

    let message = Message::draft(target.id, content, message_type);
    insert_record(store, Collection::Messages, &message).await?;

    info!("Stored draft message {}", message.id);
    Ok(message)
}

/// Synthesizes a new post from the highest-engagement reference posts.
///
/// Reads at most [`MAX_REFERENCE_POSTS`] posts by descending engagement score,
/// ties in insertion order. Always uses the hosted provider.
pub async fn generate_viral_post(
    store: &dyn DocumentStore,
    llm: &dyn Completer,
) -> Result<GeneratedPost, AppError> {
    let sources: Vec<ViralPost> = find_records(
        store,
        Collection::ViralPosts,
        &Filter::all(),
        Some(Sort::desc(SortKey::Int("engagement_score"))),
        Some(MAX_REFERENCE_POSTS),
    )
    .await?;

    if sources.is_empty() {
        return Err(AppError::NotFound("No viral posts available".to_string()));
    }

    let prompts = compose_viral_post_prompt(&sources);
    info!("Generating viral post from {} reference posts", sources.len());

    let content = llm
        .complete(
            &prompts.system,
            &prompts.user,
            Provider::OpenAi,
            SamplingParams::VIRAL_POST,
        )
        .await?;

    let source_ids = sources.into_iter().map(|p| p.id).collect();
    let post = GeneratedPost::draft(content, source_ids);
    insert_record(store, Collection::GeneratedPosts, &post).await?;

    info!("Stored draft generated post {}", post.id);
    Ok(post)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::stub::StubCompleter;
    use crate::models::message::MessageStatus;
    use crate::models::post::GeneratedPostStatus;
    use crate::models::target::NewTarget;
    use crate::store::MemoryDocumentStore;
    use chrono::Utc;

    async fn seed_target(store: &MemoryDocumentStore) -> Target {
        let target = Target::create(
            NewTarget {
                name: "John Smith".into(),
                title: "AI Research Scientist".into(),
                company: "TechCorp AI".into(),
                linkedin_url: "https://linkedin.com/in/johnsmith".into(),
                email: None,
                phone: None,
                location: "San Francisco, CA".into(),
                profile_summary: Some("Transformer researcher".into()),
                recent_activity: None,
            },
            Utc::now(),
        );
        insert_record(store, Collection::Targets, &target).await.unwrap();
        target
    }

    async fn seed_viral_post(store: &MemoryDocumentStore, id: &str, score: u64) {
        let post = ViralPost {
            id: id.to_string(),
            original_content: format!("content of {id}"),
            author: "someone".into(),
            engagement_score: score,
            reactions: score,
            comments: 0,
            shares: 0,
            linkedin_url: format!("https://linkedin.com/posts/{id}"),
            scraped_at: Utc::now(),
        };
        insert_record(store, Collection::ViralPosts, &post).await.unwrap();
    }

    async fn count(store: &MemoryDocumentStore, collection: Collection) -> u64 {
        store.count(collection, &Filter::all()).await.unwrap()
    }

    fn request(target_id: &str, provider: Provider) -> GenerateMessageRequest {
        GenerateMessageRequest {
            target_id: target_id.to_string(),
            profile_data: None,
            message_type: MessageType::ConnectionRequest,
            llm_provider: provider,
        }
    }

    #[tokio::test]
    async fn test_generate_message_persists_draft_for_target() {
        let store = MemoryDocumentStore::new();
        let target = seed_target(&store).await;
        let llm = StubCompleter::replying("Hi John, loved your transformer work.");

        let message = generate_message(&store, &llm, request(&target.id, Provider::Ollama))
            .await
            .unwrap();

        assert_eq!(message.target_id, target.id);
        assert_eq!(message.status, MessageStatus::Draft);
        assert_eq!(message.message_type, MessageType::ConnectionRequest);
        assert_eq!(message.content, "Hi John, loved your transformer work.");

        let stored: Message = find_record(&store, Collection::Messages, &message.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, message);

        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].provider, Provider::Ollama);
        assert_eq!(calls[0].params, SamplingParams::OUTREACH_MESSAGE);
        // Profile fell back to the stored target.
        assert!(calls[0].user.contains("Name: John Smith"));
        assert!(calls[0].user.contains("Profile Summary: Transformer researcher"));
    }

    #[tokio::test]
    async fn test_generate_message_prefers_supplied_profile() {
        let store = MemoryDocumentStore::new();
        let target = seed_target(&store).await;
        let llm = StubCompleter::replying("ok");

        let mut req = request(&target.id, Provider::OpenAi);
        req.profile_data = Some(ProfileData {
            name: Some("Johnny".into()),
            ..Default::default()
        });
        req.message_type = MessageType::FollowUp;
        generate_message(&store, &llm, req).await.unwrap();

        let calls = llm.calls();
        assert!(calls[0].user.contains("Name: Johnny\n"));
        assert!(calls[0].user.contains("Company: Unknown\n"));
        assert!(calls[0].system.contains("LinkedIn follow_up messages"));
    }

    #[tokio::test]
    async fn test_generate_message_provider_failure_persists_nothing() {
        for provider in [Provider::OpenAi, Provider::Ollama] {
            let store = MemoryDocumentStore::new();
            let target = seed_target(&store).await;
            let llm = StubCompleter::failing();

            let err = generate_message(&store, &llm, request(&target.id, provider))
                .await
                .unwrap_err();

            match err {
                AppError::Provider(e) => assert_eq!(e.provider, provider),
                other => panic!("expected provider error, got {other:?}"),
            }
            assert_eq!(count(&store, Collection::Messages).await, 0);
        }
    }

    #[tokio::test]
    async fn test_generate_message_unknown_target_is_not_found() {
        let store = MemoryDocumentStore::new();
        let llm = StubCompleter::replying("unused");

        let err = generate_message(&store, &llm, request("missing", Provider::OpenAi))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(llm.calls().is_empty());
        assert_eq!(count(&store, Collection::Messages).await, 0);
    }

    #[tokio::test]
    async fn test_generate_viral_post_without_sources_is_not_found() {
        let store = MemoryDocumentStore::new();
        let llm = StubCompleter::replying("unused");

        let err = generate_viral_post(&store, &llm).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(llm.calls().is_empty());
        assert_eq!(count(&store, Collection::GeneratedPosts).await, 0);
    }

    #[tokio::test]
    async fn test_generate_viral_post_orders_sources_by_score() {
        let store = MemoryDocumentStore::new();
        seed_viral_post(&store, "p50", 50).await;
        seed_viral_post(&store, "p90", 90).await;
        seed_viral_post(&store, "p70", 70).await;
        let llm = StubCompleter::replying("AI is changing hiring. Here's how.");

        let post = generate_viral_post(&store, &llm).await.unwrap();

        assert_eq!(post.based_on_viral_posts, vec!["p90", "p70", "p50"]);
        assert_eq!(post.status, GeneratedPostStatus::Draft);
        assert_eq!(post.content, "AI is changing hiring. Here's how.");

        let calls = llm.calls();
        assert_eq!(calls[0].provider, Provider::OpenAi);
        assert_eq!(calls[0].params, SamplingParams::VIRAL_POST);
        let first = calls[0].user.find("content of p90").unwrap();
        let last = calls[0].user.find("content of p50").unwrap();
        assert!(first < last);

        let stored: GeneratedPost = find_record(&store, Collection::GeneratedPosts, &post.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, post);
        // Sources are read, never written.
        assert_eq!(count(&store, Collection::ViralPosts).await, 3);
    }

    #[tokio::test]
    async fn test_generate_viral_post_takes_top_five_with_stable_ties() {
        let store = MemoryDocumentStore::new();
        for (id, score) in [("a", 10), ("b", 40), ("c", 40), ("d", 5), ("e", 30), ("f", 40), ("g", 20)] {
            seed_viral_post(&store, id, score).await;
        }
        let llm = StubCompleter::replying("post");

        let post = generate_viral_post(&store, &llm).await.unwrap();
        assert_eq!(post.based_on_viral_posts, vec!["b", "c", "f", "e", "g"]);
    }

    #[tokio::test]
    async fn test_generate_viral_post_failure_persists_nothing() {
        let store = MemoryDocumentStore::new();
        seed_viral_post(&store, "p1", 1).await;
        let llm = StubCompleter::failing();

        let err = generate_viral_post(&store, &llm).await.unwrap_err();
        assert!(matches!(err, AppError::Provider(_)));
        assert_eq!(count(&store, Collection::GeneratedPosts).await, 0);
    }
}
