//! Objects supplied by the MTProto client adapter.
//!
//! These mirror what the client library hands back after a fetch; nothing
//! here talks to the network.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Telegram message id (numeric). Forum topics are identified by the id of
/// their root message.
pub type MessageId = i32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Chat,
    Channel,
}

/// A user, basic group or channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub id: i64,
    pub kind: EntityKind,
    pub title: Option<String>,
    pub username: Option<String>,
    pub forum: bool,
    pub broadcast: bool,
    pub megagroup: bool,
}

impl Entity {
    /// Coarse type name used in tool output.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            EntityKind::User => "user",
            EntityKind::Chat => "group",
            EntityKind::Channel if self.megagroup => "group",
            EntityKind::Channel => "channel",
        }
    }
}

/// Reply metadata attached to a message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplyDescriptor {
    pub reply_to_top_id: Option<MessageId>,
    pub reply_to_msg_id: Option<MessageId>,
    /// The reply lives inside a forum topic.
    pub forum_topic: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Document,
    Video,
    Audio,
    Voice,
    Sticker,
    WebPage,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MediaInfo {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub date: DateTime<Utc>,
    pub edit_date: Option<DateTime<Utc>>,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub media: Option<MediaInfo>,
    pub reply_to_msg_id: Option<MessageId>,
    pub reply_to: Option<ReplyDescriptor>,
}

impl Message {
    /// Message text, falling back to the media caption.
    pub fn body(&self) -> &str {
        match (self.text.as_deref(), self.caption.as_deref()) {
            (Some(t), _) if !t.is_empty() => t,
            (_, Some(c)) => c,
            (Some(t), None) => t,
            (None, None) => "",
        }
    }
}

/// Sender description produced by the client adapter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SenderInfo {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_bot: bool,
}

/// Forward header description produced by the client adapter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ForwardInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_post: Option<MessageId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseMode {
    Markdown,
    Html,
}

impl ParseMode {
    /// Lenient parse of a tool argument; unknown values mean plain text.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw?.trim().to_lowercase().as_str() {
            "md" | "markdown" => Some(ParseMode::Markdown),
            "html" => Some(ParseMode::Html),
            _ => None,
        }
    }
}
