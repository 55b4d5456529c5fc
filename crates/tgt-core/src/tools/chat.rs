use serde::Serialize;

use crate::{
    client::TelegramClient,
    domain::Entity,
    forum::{self, Topic, TopicPage},
};

use super::{ToolError, ToolResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntityInfo {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_forum: bool,
}

impl From<&Entity> for EntityInfo {
    fn from(e: &Entity) -> Self {
        Self {
            id: e.id,
            title: e.title.clone(),
            kind: e.type_name(),
            username: e.username.clone(),
            is_forum: e.forum,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatInfo {
    #[serde(flatten)]
    pub entity: EntityInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Topic>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics_has_more: Option<bool>,
}

/// Describe a chat, attaching its topics when it is a forum.
///
/// `topics_limit: None` skips topic listing entirely. A failing topic
/// listing does not fail the call; the topic fields are left out instead.
pub async fn get_chat_info(
    client: &dyn TelegramClient,
    chat_id: &str,
    topics_limit: Option<u32>,
) -> ToolResult<ChatInfo> {
    let entity = client.get_entity(chat_id).await.map_err(|e| {
        ToolError::from_error("get_chat_info", &e, serde_json::json!({ "chat_id": chat_id }))
    })?;

    let mut info = ChatInfo {
        entity: EntityInfo::from(&entity),
        topics: None,
        topics_has_more: None,
    };

    let Some(limit) = topics_limit.filter(|_| entity.forum) else {
        return Ok(info);
    };

    match forum::list_forum_topics(client, &entity, limit).await {
        Ok(page) => {
            info.topics = Some(page.topics);
            info.topics_has_more = Some(page.has_more);
        }
        Err(e) => {
            tracing::warn!(chat_id, error = %e, "could not list forum topics, omitting them");
        }
    }

    Ok(info)
}

/// List topics of a forum chat.
pub async fn list_topics(
    client: &dyn TelegramClient,
    chat_id: &str,
    limit: u32,
) -> ToolResult<TopicPage> {
    const OPERATION: &str = "list_forum_topics";
    let params = || serde_json::json!({ "chat_id": chat_id, "limit": limit });

    let entity = client
        .get_entity(chat_id)
        .await
        .map_err(|e| ToolError::from_error(OPERATION, &e, params()))?;
    if !entity.forum {
        return Err(ToolError::rejected(
            OPERATION,
            "NOT_A_FORUM",
            format!("chat {chat_id} does not have topics enabled"),
        ));
    }

    forum::list_forum_topics(client, &entity, limit)
        .await
        .map_err(|e| ToolError::from_error(OPERATION, &e, params()))
}
