use serde::Serialize;

use crate::domain::{Message, MessageId};

/// Topic fields merged into message-shaped results.
///
/// Serializes to `{}` when no topic is known, never to `"topic_id": null`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TopicMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<MessageId>,
}

/// Derive the forum topic a message belongs to.
///
/// Only replies flagged as `forum_topic` qualify. Candidates in order: the
/// thread's top message, the message's own reply target, the descriptor's
/// reply target. Zero ids are treated as unset.
pub fn extract_topic_metadata(message: &Message) -> TopicMetadata {
    let Some(reply) = message.reply_to.as_ref() else {
        return TopicMetadata::default();
    };
    if !reply.forum_topic {
        return TopicMetadata::default();
    }

    let topic_id = [
        reply.reply_to_top_id,
        message.reply_to_msg_id,
        reply.reply_to_msg_id,
    ]
    .into_iter()
    .flatten()
    .find(|id| *id != 0);

    TopicMetadata { topic_id }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::ReplyDescriptor;

    fn msg(own: Option<i32>, reply: Option<ReplyDescriptor>) -> Message {
        Message {
            id: 10,
            date: Utc::now(),
            edit_date: None,
            text: Some("hello".to_string()),
            caption: None,
            media: None,
            reply_to_msg_id: own,
            reply_to: reply,
        }
    }

    fn reply(top: Option<i32>, to: Option<i32>, forum_topic: bool) -> Option<ReplyDescriptor> {
        Some(ReplyDescriptor {
            reply_to_top_id: top,
            reply_to_msg_id: to,
            forum_topic,
        })
    }

    #[test]
    fn prefers_top_id() {
        let m = msg(Some(42), reply(Some(51), Some(99), true));
        assert_eq!(extract_topic_metadata(&m).topic_id, Some(51));
    }

    #[test]
    fn falls_back_to_message_reply_to() {
        let m = msg(Some(42), reply(None, Some(99), true));
        assert_eq!(extract_topic_metadata(&m).topic_id, Some(42));
    }

    #[test]
    fn falls_back_to_descriptor_reply_to() {
        let m = msg(None, reply(None, Some(99), true));
        assert_eq!(extract_topic_metadata(&m).topic_id, Some(99));
    }

    #[test]
    fn empty_without_any_id() {
        let m = msg(None, reply(None, None, true));
        assert_eq!(extract_topic_metadata(&m), TopicMetadata::default());
    }

    #[test]
    fn empty_when_not_a_forum_topic() {
        let m = msg(Some(51), reply(Some(51), Some(51), false));
        assert_eq!(extract_topic_metadata(&m).topic_id, None);
        assert_eq!(extract_topic_metadata(&msg(Some(51), None)).topic_id, None);
    }

    #[test]
    fn zero_ids_do_not_count() {
        let m = msg(Some(0), reply(Some(0), Some(7), true));
        assert_eq!(extract_topic_metadata(&m).topic_id, Some(7));
    }

    #[test]
    fn serializes_without_null_placeholder() {
        let empty = serde_json::to_value(TopicMetadata::default()).unwrap();
        assert_eq!(empty, serde_json::json!({}));
        let set = serde_json::to_value(TopicMetadata { topic_id: Some(5) }).unwrap();
        assert_eq!(set, serde_json::json!({ "topic_id": 5 }));
    }
}
