//! Forum topic listing with a probe-ahead `has_more`.
//!
//! The server caps a `getForumTopics` page at 100 entries. Below that cap we
//! over-fetch by one to learn whether more topics exist; at the cap we issue
//! a one-item probe past the page instead.

use serde::Serialize;

use crate::{
    client::{ForumTopicsRequest, RawTopic, TelegramClient},
    domain::{Entity, MessageId},
    Result,
};

pub const DEFAULT_TOPICS_LIMIT: u32 = 20;
pub const MAX_TOPICS_LIMIT: u32 = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Topic {
    pub topic_id: MessageId,
    pub title: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TopicPage {
    pub topics: Vec<Topic>,
    pub has_more: bool,
}

/// Clamp a caller-supplied limit to `1..=100`.
///
/// Integers, floats (truncated) and numeric strings are accepted; anything
/// else, including a missing value, becomes [`DEFAULT_TOPICS_LIMIT`].
pub fn normalize_topics_limit(raw: Option<&serde_json::Value>) -> u32 {
    use serde_json::Value;

    let parsed: Option<i64> = match raw {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match parsed {
        Some(n) => n.clamp(1, MAX_TOPICS_LIMIT as i64) as u32,
        None => DEFAULT_TOPICS_LIMIT,
    }
}

fn valid_topics(raw: Vec<RawTopic>) -> Vec<Topic> {
    raw.into_iter()
        .filter_map(|t| match (t.id, t.title) {
            (Some(topic_id), Some(title)) if topic_id != 0 && !title.is_empty() => {
                Some(Topic { topic_id, title })
            }
            _ => None,
        })
        .collect()
}

/// List up to `limit` topics of a forum entity.
///
/// `limit` is expected to be normalized already; out-of-range values are
/// clamped again. Entries without an id or title, or with a zero id, are
/// dropped before they count toward the limit. Client errors from either
/// request propagate.
pub async fn list_forum_topics(
    client: &dyn TelegramClient,
    entity: &Entity,
    limit: u32,
) -> Result<TopicPage> {
    let limit = limit.clamp(1, MAX_TOPICS_LIMIT);

    if limit < MAX_TOPICS_LIMIT {
        let resp = client
            .get_forum_topics(ForumTopicsRequest::first_page(entity.id, limit + 1))
            .await?;
        let mut topics = valid_topics(resp.topics);
        let has_more = topics.len() > limit as usize;
        topics.truncate(limit as usize);

        tracing::debug!(
            chat_id = entity.id,
            limit,
            returned = topics.len(),
            has_more,
            "listed forum topics"
        );
        return Ok(TopicPage { topics, has_more });
    }

    let resp = client
        .get_forum_topics(ForumTopicsRequest::first_page(entity.id, limit))
        .await?;
    let mut topics = valid_topics(resp.topics);
    topics.truncate(limit as usize);

    let probe = client
        .get_forum_topics(ForumTopicsRequest {
            offset_topic: limit as i32,
            ..ForumTopicsRequest::first_page(entity.id, 1)
        })
        .await?;
    let has_more = !probe.topics.is_empty();

    tracing::debug!(
        chat_id = entity.id,
        limit,
        returned = topics.len(),
        has_more,
        "listed forum topics with probe"
    );
    Ok(TopicPage { topics, has_more })
}
