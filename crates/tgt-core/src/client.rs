use async_trait::async_trait;

use crate::{
    domain::{Entity, ForwardInfo, Message, MessageId, ParseMode, SenderInfo},
    Result,
};

/// A `channels.getForumTopics` request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForumTopicsRequest {
    pub channel_id: i64,
    pub offset_date: i32,
    pub offset_id: MessageId,
    pub offset_topic: i32,
    pub limit: u32,
    pub query: Option<String>,
}

impl ForumTopicsRequest {
    pub fn first_page(channel_id: i64, limit: u32) -> Self {
        Self {
            channel_id,
            offset_date: 0,
            offset_id: 0,
            offset_topic: 0,
            limit,
            query: None,
        }
    }
}

/// One entry of a `getForumTopics` response.
///
/// Deleted topics come back without a title, so both fields are optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawTopic {
    pub id: Option<MessageId>,
    pub title: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ForumTopicsResponse {
    pub topics: Vec<RawTopic>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub reply_to: Option<MessageId>,
    pub parse_mode: Option<ParseMode>,
}

/// Port over the connected MTProto client.
///
/// Implementations own the connection and session lifecycle, timeouts and
/// retries. Each method is a single awaited request.
#[async_trait]
pub trait TelegramClient: Send + Sync {
    /// Resolve a chat id, `@username` or invite link to an entity.
    async fn get_entity(&self, chat_id: &str) -> Result<Entity>;

    /// Fetch messages by id. Missing or deleted ids are left out.
    async fn get_messages(&self, entity: &Entity, ids: &[MessageId]) -> Result<Vec<Message>>;

    async fn sender_info(&self, message: &Message) -> Result<Option<SenderInfo>>;

    async fn forward_info(&self, message: &Message) -> Result<Option<ForwardInfo>>;

    async fn get_forum_topics(&self, request: ForumTopicsRequest) -> Result<ForumTopicsResponse>;

    async fn send_message(&self, entity: &Entity, message: OutgoingMessage) -> Result<Message>;

    /// Send local files, using `message.text` as caption.
    async fn send_files(
        &self,
        entity: &Entity,
        files: &[String],
        message: OutgoingMessage,
    ) -> Result<Vec<Message>>;

    async fn edit_message(
        &self,
        entity: &Entity,
        message_id: MessageId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<Message>;

    /// Invoke a raw TL method (`messages.ImportChatInvite`, ...) with JSON
    /// parameters. With `resolve`, peer-like parameters are resolved to input
    /// peers by the adapter first.
    async fn invoke(
        &self,
        method: &str,
        params: serde_json::Map<String, serde_json::Value>,
        resolve: bool,
    ) -> Result<serde_json::Value>;
}
