use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    client::TelegramClient,
    domain::{Entity, EntityKind, ForwardInfo, MediaInfo, Message, MessageId, SenderInfo},
    topics::{extract_topic_metadata, TopicMetadata},
    Result,
};

/// Outward-facing record for a fetched message.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MessageResult {
    pub id: MessageId,
    pub date: DateTime<Utc>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_msg_id: Option<MessageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<SenderInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwarded_from: Option<ForwardInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(flatten)]
    pub topic: TopicMetadata,
}

/// Public `t.me` link to a channel or supergroup message.
///
/// Users and basic groups have no message links.
pub fn message_link(entity: &Entity, message_id: MessageId) -> Option<String> {
    if entity.kind != EntityKind::Channel {
        return None;
    }
    Some(match entity.username.as_deref() {
        Some(username) if !username.is_empty() => format!("https://t.me/{username}/{message_id}"),
        _ => format!("https://t.me/c/{}/{message_id}", entity.id),
    })
}

/// Topic fields for `message` when `entity` is a forum, empty otherwise.
pub fn topic_fields(message: &Message, entity: &Entity) -> TopicMetadata {
    if entity.forum {
        extract_topic_metadata(message)
    } else {
        TopicMetadata::default()
    }
}

/// Build the result record for `message` fetched from `entity`.
///
/// Sender and forward lookups always go to the client; a failure in either
/// fails the whole record.
pub async fn build_message_result(
    client: &dyn TelegramClient,
    message: &Message,
    entity: &Entity,
    link: Option<String>,
) -> Result<MessageResult> {
    let sender = client.sender_info(message).await?;
    let forwarded_from = client.forward_info(message).await?;

    Ok(MessageResult {
        id: message.id,
        date: message.date,
        text: message.body().to_string(),
        edit_date: message.edit_date,
        reply_to_msg_id: message.reply_to_msg_id,
        sender,
        forwarded_from,
        media: message.media.clone(),
        link,
        topic: topic_fields(message, entity),
    })
}
