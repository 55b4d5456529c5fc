use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    client::{OutgoingMessage, TelegramClient},
    domain::{Entity, Message, MessageId, ParseMode},
    errors::Error,
    format::{build_message_result, message_link, topic_fields, MessageResult},
    topics::TopicMetadata,
    Result,
};

use super::{ToolError, ToolResult};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SendRequest {
    pub message: String,
    pub files: Option<Vec<String>>,
    pub reply_to_msg_id: Option<MessageId>,
    pub topic_id: Option<MessageId>,
    pub parse_mode: Option<ParseMode>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SendResult {
    pub status: &'static str,
    pub chat_id: i64,
    pub message_ids: Vec<MessageId>,
    pub date: DateTime<Utc>,
    #[serde(flatten)]
    pub topic: TopicMetadata,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EditResult {
    pub status: &'static str,
    pub chat_id: i64,
    pub message_id: MessageId,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_date: Option<DateTime<Utc>>,
    pub text: String,
    #[serde(flatten)]
    pub topic: TopicMetadata,
}

/// Send text, or files captioned with the text, to `entity`.
///
/// An explicit reply target wins over `topic_id`; posting into a topic is a
/// reply to its root message.
pub async fn send_message_or_files(
    client: &dyn TelegramClient,
    entity: &Entity,
    request: &SendRequest,
) -> Result<Vec<Message>> {
    let outgoing = OutgoingMessage {
        text: request.message.clone(),
        reply_to: request.reply_to_msg_id.or(request.topic_id),
        parse_mode: request.parse_mode,
    };

    match request.files.as_deref() {
        Some(files) if !files.is_empty() => client.send_files(entity, files, outgoing).await,
        _ if outgoing.text.trim().is_empty() => Err(Error::InvalidInput(
            "message text or at least one file is required".to_string(),
        )),
        _ => Ok(vec![client.send_message(entity, outgoing).await?]),
    }
}

pub async fn send_message(
    client: &dyn TelegramClient,
    chat_id: &str,
    request: SendRequest,
) -> ToolResult<SendResult> {
    const OPERATION: &str = "send_message";
    let params = || {
        serde_json::json!({
            "chat_id": chat_id,
            "reply_to_msg_id": request.reply_to_msg_id,
            "topic_id": request.topic_id,
            "files": request.files,
        })
    };

    let entity = client
        .get_entity(chat_id)
        .await
        .map_err(|e| ToolError::from_error(OPERATION, &e, params()))?;
    let sent = send_message_or_files(client, &entity, &request)
        .await
        .map_err(|e| ToolError::from_error(OPERATION, &e, params()))?;

    let Some(first) = sent.first() else {
        return Err(ToolError::rejected(
            OPERATION,
            "NOTHING_SENT",
            "the client reported no sent messages",
        ));
    };

    Ok(SendResult {
        status: "sent",
        chat_id: entity.id,
        message_ids: sent.iter().map(|m| m.id).collect(),
        date: first.date,
        topic: topic_fields(first, &entity),
    })
}

pub async fn edit_message(
    client: &dyn TelegramClient,
    chat_id: &str,
    message_id: MessageId,
    new_text: &str,
    parse_mode: Option<ParseMode>,
) -> ToolResult<EditResult> {
    const OPERATION: &str = "edit_message";
    let params = || serde_json::json!({ "chat_id": chat_id, "message_id": message_id });

    let entity = client
        .get_entity(chat_id)
        .await
        .map_err(|e| ToolError::from_error(OPERATION, &e, params()))?;
    let edited = client
        .edit_message(&entity, message_id, new_text, parse_mode)
        .await
        .map_err(|e| ToolError::from_error(OPERATION, &e, params()))?;

    Ok(EditResult {
        status: "edited",
        chat_id: entity.id,
        message_id: edited.id,
        date: edited.date,
        edit_date: edited.edit_date,
        text: edited.body().to_string(),
        topic: topic_fields(&edited, &entity),
    })
}

/// Fetch messages by id and format them. Ids the client does not return are
/// skipped.
pub async fn read_messages(
    client: &dyn TelegramClient,
    chat_id: &str,
    message_ids: &[MessageId],
) -> ToolResult<Vec<MessageResult>> {
    const OPERATION: &str = "read_messages";
    let params = || serde_json::json!({ "chat_id": chat_id, "message_ids": message_ids });

    let entity = client
        .get_entity(chat_id)
        .await
        .map_err(|e| ToolError::from_error(OPERATION, &e, params()))?;
    let messages = client
        .get_messages(&entity, message_ids)
        .await
        .map_err(|e| ToolError::from_error(OPERATION, &e, params()))?;

    let mut out = Vec::with_capacity(messages.len());
    for m in &messages {
        let link = message_link(&entity, m.id);
        let res = build_message_result(client, m, &entity, link)
            .await
            .map_err(|e| ToolError::from_error(OPERATION, &e, params()))?;
        out.push(res);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        domain::ReplyDescriptor,
        testing::{channel, text_message, FakeClient},
    };

    fn req(reply_to_msg_id: Option<i32>, topic_id: Option<i32>) -> SendRequest {
        SendRequest {
            message: "hello".to_string(),
            reply_to_msg_id,
            topic_id,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn topic_id_is_the_reply_target() {
        let client = FakeClient::new();
        let entity = channel(1, "c", false);

        send_message_or_files(&client, &entity, &req(None, Some(77)))
            .await
            .unwrap();
        assert_eq!(client.sent.lock().unwrap()[0].message.reply_to, Some(77));
    }

    #[tokio::test]
    async fn reply_to_wins_over_topic_id() {
        let client = FakeClient::new();
        let entity = channel(1, "c", false);

        send_message_or_files(&client, &entity, &req(Some(123), Some(77)))
            .await
            .unwrap();
        assert_eq!(client.sent.lock().unwrap()[0].message.reply_to, Some(123));
    }

    #[tokio::test]
    async fn files_are_sent_with_caption() {
        let client = FakeClient::new();
        let entity = channel(1, "c", false);
        let request = SendRequest {
            message: "caption".to_string(),
            files: Some(vec!["/tmp/a.png".to_string(), "/tmp/b.png".to_string()]),
            ..Default::default()
        };

        let sent = send_message_or_files(&client, &entity, &request).await.unwrap();
        assert_eq!(sent.len(), 2);
        let records = client.sent.lock().unwrap();
        assert_eq!(records[0].files.len(), 2);
        assert_eq!(records[0].message.text, "caption");
    }

    #[tokio::test]
    async fn empty_send_is_rejected() {
        let client = FakeClient::new();
        let entity = channel(1, "c", false);
        let request = SendRequest {
            message: "  ".to_string(),
            files: Some(Vec::new()),
            ..Default::default()
        };

        let err = send_message_or_files(&client, &entity, &request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(client.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_into_forum_topic_reports_topic_id() {
        let client = FakeClient::new().with_entity("-1001", channel(1, "Forum Chat", true));

        let res = send_message(&client, "-1001", req(None, Some(77))).await.unwrap();
        let v = serde_json::to_value(&res).unwrap();
        assert_eq!(v["status"], "sent");
        assert_eq!(v["topic_id"], 77);
        assert_eq!(v["message_ids"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn send_to_regular_chat_has_no_topic() {
        let client = FakeClient::new().with_entity("5", channel(5, "Regular", false));

        let res = send_message(&client, "5", req(Some(3), None)).await.unwrap();
        let v = serde_json::to_value(&res).unwrap();
        assert!(v.get("topic_id").is_none());
    }

    #[tokio::test]
    async fn edit_in_forum_includes_topic_id_only() {
        let client = FakeClient::new().with_entity("-1001", channel(1, "Forum Chat", true));
        let mut edited = text_message(123, "updated");
        edited.edit_date = Some(Utc::now());
        edited.reply_to_msg_id = Some(51);
        edited.reply_to = Some(ReplyDescriptor {
            reply_to_top_id: Some(51),
            reply_to_msg_id: None,
            forum_topic: true,
        });
        *client.edit_response.lock().unwrap() = Some(edited);

        let res = edit_message(&client, "-1001", 123, "updated", None).await.unwrap();
        let v = serde_json::to_value(&res).unwrap();
        assert_eq!(v["status"], "edited");
        assert_eq!(v["topic_id"], 51);
        assert_eq!(v["text"], "updated");
        assert!(v.get("top_msg_id").is_none());
        assert_eq!(client.edits.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn edit_passes_parse_mode() {
        let client = FakeClient::new().with_entity("5", channel(5, "Regular", false));

        edit_message(&client, "5", 9, "<b>x</b>", Some(ParseMode::Html))
            .await
            .unwrap();
        let edits = client.edits.lock().unwrap();
        assert_eq!(edits[0].message_id, 9);
        assert_eq!(edits[0].parse_mode, Some(ParseMode::Html));
    }

    #[tokio::test]
    async fn read_messages_formats_and_skips_missing() {
        let client = FakeClient::new()
            .with_entity("5", channel(5, "Regular", false))
            .with_messages(vec![text_message(1, "one"), text_message(3, "three")]);

        let out = read_messages(&client, "5", &[1, 2, 3]).await.unwrap();
        let ids: Vec<_> = out.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(out[1].text, "three");
        assert_eq!(out[0].link.as_deref(), Some("https://t.me/c/5/1"));
    }
}
