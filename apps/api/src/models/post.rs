use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::new_id;

/// Largest storable engagement score. Ranking compares scores as signed 64-bit
/// integers in both store backends.
pub const MAX_ENGAGEMENT_SCORE: u64 = i64::MAX as u64;

/// An externally sourced reference post. Write-once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViralPost {
    pub id: String,
    pub original_content: String,
    pub author: String,
    pub engagement_score: u64,
    pub reactions: u64,
    pub comments: u64,
    pub shares: u64,
    pub linkedin_url: String,
    pub scraped_at: DateTime<Utc>,
}

/// Request body for storing a reference post. Missing id, score and
/// timestamp are filled in by [`ViralPost::create`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewViralPost {
    pub id: Option<String>,
    pub original_content: String,
    pub author: String,
    pub engagement_score: Option<u64>,
    #[serde(default)]
    pub reactions: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub shares: u64,
    pub linkedin_url: String,
    pub scraped_at: Option<DateTime<Utc>>,
}

impl ViralPost {
    pub fn create(input: NewViralPost) -> Self {
        let derived_score = input
            .reactions
            .saturating_add(input.comments)
            .saturating_add(input.shares)
            .min(MAX_ENGAGEMENT_SCORE);

        ViralPost {
            id: input.id.unwrap_or_else(new_id),
            original_content: input.original_content,
            author: input.author,
            engagement_score: input.engagement_score.unwrap_or(derived_score),
            reactions: input.reactions,
            comments: input.comments,
            shares: input.shares,
            linkedin_url: input.linkedin_url,
            scraped_at: input.scraped_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GeneratedPostStatus {
    #[default]
    Draft,
    Approved,
    Published,
}

/// A synthesized post, traceable to the reference posts it was built from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedPost {
    pub id: String,
    pub content: String,
    /// Source ViralPost ids, in the order they were fed to the model.
    pub based_on_viral_posts: Vec<String>,
    #[serde(default)]
    pub status: GeneratedPostStatus,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
}

impl GeneratedPost {
    pub fn draft(content: String, based_on_viral_posts: Vec<String>) -> Self {
        GeneratedPost {
            id: new_id(),
            content,
            based_on_viral_posts,
            status: GeneratedPostStatus::Draft,
            created_at: Utc::now(),
            approved_at: None,
            published_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_viral_post_derives_score_when_omitted() {
        let input: NewViralPost = serde_json::from_value(json!({
            "original_content": "LLMs are eating the world",
            "author": "Jane",
            "reactions": 40,
            "comments": 7,
            "shares": 3,
            "linkedin_url": "https://linkedin.com/posts/1"
        }))
        .unwrap();
        let post = ViralPost::create(input);
        assert_eq!(post.engagement_score, 50);
        assert!(!post.id.is_empty());
    }

    #[test]
    fn test_viral_post_keeps_explicit_score_and_id() {
        let input: NewViralPost = serde_json::from_value(json!({
            "id": "vp-1",
            "original_content": "x",
            "author": "y",
            "engagement_score": 900,
            "reactions": 1,
            "linkedin_url": "https://linkedin.com/posts/2"
        }))
        .unwrap();
        let post = ViralPost::create(input);
        assert_eq!(post.id, "vp-1");
        assert_eq!(post.engagement_score, 900);
    }

    #[test]
    fn test_derived_score_is_capped() {
        let input: NewViralPost = serde_json::from_value(json!({
            "original_content": "x",
            "author": "y",
            "reactions": u64::MAX,
            "comments": 10,
            "linkedin_url": "https://linkedin.com/posts/3"
        }))
        .unwrap();
        assert_eq!(ViralPost::create(input).engagement_score, MAX_ENGAGEMENT_SCORE);
    }
}
