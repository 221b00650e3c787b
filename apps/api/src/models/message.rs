use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::new_id;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    ConnectionRequest,
    FollowUp,
    ViralPost,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::ConnectionRequest => "connection_request",
            MessageType::FollowUp => "follow_up",
            MessageType::ViralPost => "viral_post",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of an outreach message. Transitions past `Draft` happen outside this service.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    #[default]
    Draft,
    Sent,
    Delivered,
    Replied,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Draft => "draft",
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Replied => "replied",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub target_id: String,
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
    #[serde(default)]
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub replied_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn draft(target_id: String, content: String, message_type: MessageType) -> Self {
        Message {
            id: new_id(),
            target_id,
            content,
            message_type,
            status: MessageStatus::Draft,
            created_at: Utc::now(),
            sent_at: None,
            replied_at: None,
        }
    }
}

/// Request body for direct message creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    pub target_id: String,
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
}
