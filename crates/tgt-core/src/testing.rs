//! In-memory [`TelegramClient`] for tests.
//!
//! Responses are scripted up front; every call is recorded so tests can
//! assert on what was sent.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicI32, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    client::{ForumTopicsRequest, ForumTopicsResponse, OutgoingMessage, RawTopic, TelegramClient},
    domain::{
        Entity, EntityKind, ForwardInfo, Message, MessageId, ParseMode, ReplyDescriptor,
        SenderInfo,
    },
    errors::Error,
    Result,
};

#[derive(Clone, Debug, PartialEq)]
pub struct SentRecord {
    pub chat_id: i64,
    pub message: OutgoingMessage,
    pub files: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EditRecord {
    pub chat_id: i64,
    pub message_id: MessageId,
    pub text: String,
    pub parse_mode: Option<ParseMode>,
}

#[derive(Default)]
pub struct FakeClient {
    pub entities: Mutex<HashMap<String, Entity>>,
    pub messages: Mutex<Vec<Message>>,
    pub sender: Mutex<Option<SenderInfo>>,
    pub forward: Mutex<Option<ForwardInfo>>,
    pub topic_responses: Mutex<VecDeque<Result<ForumTopicsResponse>>>,
    pub invoke_responses: Mutex<VecDeque<Result<serde_json::Value>>>,
    pub edit_response: Mutex<Option<Message>>,

    pub lookups: Mutex<Vec<&'static str>>,
    pub topic_requests: Mutex<Vec<ForumTopicsRequest>>,
    pub sent: Mutex<Vec<SentRecord>>,
    pub edits: Mutex<Vec<EditRecord>>,
    pub invocations: Mutex<Vec<(String, serde_json::Map<String, serde_json::Value>, bool)>>,

    next_id: AtomicI32,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI32::new(1000),
            ..Default::default()
        }
    }

    pub fn with_entity(self, key: &str, entity: Entity) -> Self {
        self.entities
            .lock()
            .unwrap()
            .insert(key.to_string(), entity);
        self
    }

    pub fn with_messages(self, messages: Vec<Message>) -> Self {
        *self.messages.lock().unwrap() = messages;
        self
    }

    pub fn with_sender(self, sender: SenderInfo) -> Self {
        *self.sender.lock().unwrap() = Some(sender);
        self
    }

    pub fn push_topics(&self, response: Result<ForumTopicsResponse>) {
        self.topic_responses.lock().unwrap().push_back(response);
    }

    pub fn push_invoke(&self, response: Result<serde_json::Value>) {
        self.invoke_responses.lock().unwrap().push_back(response);
    }

    fn alloc_id(&self) -> MessageId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn outgoing(&self, entity: &Entity, text: &str, reply_to: Option<MessageId>) -> Message {
        let reply = reply_to.map(|id| ReplyDescriptor {
            reply_to_top_id: None,
            reply_to_msg_id: Some(id),
            forum_topic: entity.forum,
        });
        Message {
            id: self.alloc_id(),
            date: Utc::now(),
            edit_date: None,
            text: Some(text.to_string()),
            caption: None,
            media: None,
            reply_to_msg_id: reply_to,
            reply_to: reply,
        }
    }
}

#[async_trait]
impl TelegramClient for FakeClient {
    async fn get_entity(&self, chat_id: &str) -> Result<Entity> {
        self.entities
            .lock()
            .unwrap()
            .get(chat_id)
            .cloned()
            .ok_or_else(|| Error::External(format!("cannot find any entity for {chat_id}")))
    }

    async fn get_messages(&self, _entity: &Entity, ids: &[MessageId]) -> Result<Vec<Message>> {
        let messages = self.messages.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| messages.iter().find(|m| m.id == *id).cloned())
            .collect())
    }

    async fn sender_info(&self, _message: &Message) -> Result<Option<SenderInfo>> {
        self.lookups.lock().unwrap().push("sender");
        Ok(self.sender.lock().unwrap().clone())
    }

    async fn forward_info(&self, _message: &Message) -> Result<Option<ForwardInfo>> {
        self.lookups.lock().unwrap().push("forward");
        Ok(self.forward.lock().unwrap().clone())
    }

    async fn get_forum_topics(&self, request: ForumTopicsRequest) -> Result<ForumTopicsResponse> {
        self.topic_requests.lock().unwrap().push(request);
        self.topic_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ForumTopicsResponse::default()))
    }

    async fn send_message(&self, entity: &Entity, message: OutgoingMessage) -> Result<Message> {
        let sent = self.outgoing(entity, &message.text, message.reply_to);
        self.sent.lock().unwrap().push(SentRecord {
            chat_id: entity.id,
            message,
            files: Vec::new(),
        });
        Ok(sent)
    }

    async fn send_files(
        &self,
        entity: &Entity,
        files: &[String],
        message: OutgoingMessage,
    ) -> Result<Vec<Message>> {
        let out: Vec<Message> = files
            .iter()
            .map(|_| self.outgoing(entity, &message.text, message.reply_to))
            .collect();
        self.sent.lock().unwrap().push(SentRecord {
            chat_id: entity.id,
            message,
            files: files.to_vec(),
        });
        Ok(out)
    }

    async fn edit_message(
        &self,
        entity: &Entity,
        message_id: MessageId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<Message> {
        self.edits.lock().unwrap().push(EditRecord {
            chat_id: entity.id,
            message_id,
            text: text.to_string(),
            parse_mode,
        });
        if let Some(m) = self.edit_response.lock().unwrap().clone() {
            return Ok(m);
        }
        let mut m = self.outgoing(entity, text, None);
        m.id = message_id;
        m.edit_date = Some(Utc::now());
        Ok(m)
    }

    async fn invoke(
        &self,
        method: &str,
        params: serde_json::Map<String, serde_json::Value>,
        resolve: bool,
    ) -> Result<serde_json::Value> {
        self.invocations
            .lock()
            .unwrap()
            .push((method.to_string(), params, resolve));
        self.invoke_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(serde_json::Value::Null))
    }
}

pub fn channel(id: i64, title: &str, forum: bool) -> Entity {
    Entity {
        id,
        kind: EntityKind::Channel,
        title: Some(title.to_string()),
        username: None,
        forum,
        broadcast: !forum,
        megagroup: forum,
    }
}

pub fn text_message(id: MessageId, text: &str) -> Message {
    Message {
        id,
        date: Utc::now(),
        edit_date: None,
        text: Some(text.to_string()),
        caption: None,
        media: None,
        reply_to_msg_id: None,
        reply_to: None,
    }
}

/// `count` well-formed topics with ids `first..first + count`.
pub fn topics(first: MessageId, count: usize) -> ForumTopicsResponse {
    ForumTopicsResponse {
        topics: (0..count)
            .map(|i| {
                let id = first + i as MessageId;
                RawTopic {
                    id: Some(id),
                    title: Some(format!("Topic {id}")),
                }
            })
            .collect(),
    }
}
