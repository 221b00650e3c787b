// Prompt Composer for outreach messages and synthetic posts.
// Pure string templating: no I/O, no randomness, same input -> same prompts.

use serde::Deserialize;

use crate::models::post::ViralPost;
use crate::models::target::Target;

/// Most reference posts fed into one viral-post prompt.
pub const MAX_REFERENCE_POSTS: usize = 5;
/// Characters of each reference post kept in the prompt.
pub const REFERENCE_SNIPPET_CHARS: usize = 200;

const UNKNOWN: &str = "Unknown";
const NO_SUMMARY: &str = "No summary available";
const NO_ACTIVITY: &str = "No recent activity";

/// System prompt for outreach messages. Replace `{message_type}` before sending.
pub const MESSAGE_SYSTEM_TEMPLATE: &str = "You are an expert at writing personalized LinkedIn {message_type} messages.

Guidelines:
- Keep messages under 250 words
- Be professional but friendly
- Reference specific details from their profile
- Focus on AI/ML expertise and hiring
- Include a clear call to action
- Avoid generic phrases";

/// User prompt for outreach messages.
/// Replace: {message_type}, {name}, {title}, {company}, {profile_summary}, {recent_activity}
pub const MESSAGE_USER_TEMPLATE: &str = "Generate a {message_type} message for this LinkedIn profile:

Name: {name}
Title: {title}
Company: {company}
Profile Summary: {profile_summary}
Recent Activity: {recent_activity}

The message should be personalized and mention their AI/ML work and hiring expertise.";

pub const VIRAL_POST_SYSTEM: &str = "You are an expert at creating viral LinkedIn posts about AI/ML.

Guidelines:
- Keep posts under 1300 characters
- Start with a compelling hook
- Include a data point or insight
- End with a clear call to action
- Use line breaks for readability
- Make it algorithm-friendly";

/// User prompt for viral posts. Replace `{reference_posts}` before sending.
pub const VIRAL_POST_USER_TEMPLATE: &str = "Based on these viral AI/ML posts, create a new viral post:

{reference_posts}

Create an original post that captures the essence of what makes these posts viral while adding your own unique perspective on AI/ML trends.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Profile fields a message prompt can reference. All optional; unknown keys
/// in the request body are ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProfileData {
    pub name: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub profile_summary: Option<String>,
    pub recent_activity: Option<String>,
}

impl From<&Target> for ProfileData {
    fn from(target: &Target) -> Self {
        ProfileData {
            name: Some(target.name.clone()),
            title: Some(target.title.clone()),
            company: Some(target.company.clone()),
            profile_summary: target.profile_summary.clone(),
            recent_activity: target.recent_activity.clone(),
        }
    }
}

fn or_placeholder<'a>(value: &'a Option<String>, placeholder: &'a str) -> &'a str {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(placeholder)
}

/// Substitutes `{key}` placeholders in one left-to-right pass, so values that
/// themselves contain braces are never re-expanded.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Builds the outreach-message prompt pair. `message_type` is a free-form label,
/// normally one of `connection_request`, `follow_up`, `viral_post`.
pub fn compose_message_prompt(profile: &ProfileData, message_type: &str) -> PromptPair {
    let system = fill(MESSAGE_SYSTEM_TEMPLATE, &[("message_type", message_type)]);
    let user = fill(
        MESSAGE_USER_TEMPLATE,
        &[
            ("message_type", message_type),
            ("name", or_placeholder(&profile.name, UNKNOWN)),
            ("title", or_placeholder(&profile.title, UNKNOWN)),
            ("company", or_placeholder(&profile.company, UNKNOWN)),
            (
                "profile_summary",
                or_placeholder(&profile.profile_summary, NO_SUMMARY),
            ),
            (
                "recent_activity",
                or_placeholder(&profile.recent_activity, NO_ACTIVITY),
            ),
        ],
    );
    PromptPair { system, user }
}

/// Renders up to [`MAX_REFERENCE_POSTS`] posts as a numbered reference block,
/// each cut to its first [`REFERENCE_SNIPPET_CHARS`] characters.
pub fn reference_block(posts: &[ViralPost]) -> String {
    posts
        .iter()
        .take(MAX_REFERENCE_POSTS)
        .enumerate()
        .map(|(i, post)| {
            let snippet: String = post
                .original_content
                .chars()
                .take(REFERENCE_SNIPPET_CHARS)
                .collect();
            format!("Post {}: {}...", i + 1, snippet)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds the viral-post prompt pair from posts already ordered by engagement.
///
/// Callers must reject an empty `posts` slice before composing.
pub fn compose_viral_post_prompt(posts: &[ViralPost]) -> PromptPair {
    debug_assert!(!posts.is_empty(), "viral post prompt needs reference posts");
    let block = reference_block(posts);
    PromptPair {
        system: VIRAL_POST_SYSTEM.to_string(),
        user: fill(VIRAL_POST_USER_TEMPLATE, &[("reference_posts", &block)]),
    }
}
