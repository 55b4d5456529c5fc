//! Tool schemas and argument decoding for `tools/call`.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tgt_core::{
    client::TelegramClient,
    config::Config,
    domain::{MessageId, ParseMode},
    forum::normalize_topics_limit,
    tools::{chat, messages, mtproto, ToolResult},
};

use crate::rpc::{INTERNAL_ERROR, INVALID_PARAMS};

/// JSON-RPC level failure of a `tools/call` (as opposed to a tool reporting
/// `isError`).
#[derive(Debug)]
pub struct CallError {
    pub code: i64,
    pub message: String,
}

impl CallError {
    fn invalid(message: impl Into<String>) -> Self {
        Self {
            code: INVALID_PARAMS,
            message: message.into(),
        }
    }
}

/// Chat ids arrive either as numbers or as strings (`@name`, `-100...`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChatRef {
    Id(i64),
    Name(String),
}

impl ChatRef {
    fn into_string(self) -> String {
        match self {
            ChatRef::Id(id) => id.to_string(),
            ChatRef::Name(name) => name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GetChatInfoArgs {
    chat_id: ChatRef,
    #[serde(default)]
    topics_limit: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ListTopicsArgs {
    chat_id: ChatRef,
    #[serde(default)]
    limit: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ReadMessagesArgs {
    chat_id: ChatRef,
    message_ids: Vec<MessageId>,
}

#[derive(Debug, Deserialize)]
struct SendMessageArgs {
    chat_id: ChatRef,
    #[serde(default)]
    message: String,
    #[serde(default)]
    files: Option<Vec<String>>,
    #[serde(default)]
    reply_to_msg_id: Option<MessageId>,
    #[serde(default)]
    topic_id: Option<MessageId>,
    #[serde(default)]
    parse_mode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EditMessageArgs {
    chat_id: ChatRef,
    message_id: MessageId,
    new_text: String,
    #[serde(default)]
    parse_mode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InvokeMtprotoArgs {
    method: String,
    #[serde(default)]
    params_json: String,
    #[serde(default = "default_true")]
    resolve: bool,
}

fn default_true() -> bool {
    true
}

fn decode<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, CallError> {
    serde_json::from_value(args).map_err(|e| CallError::invalid(format!("{tool}: {e}")))
}

/// Wrap a tool outcome as MCP `content`, flagging failures with `isError`.
fn content<T: Serialize>(res: ToolResult<T>) -> Result<Value, CallError> {
    let (body, is_error) = match res {
        Ok(v) => (serde_json::to_string(&v), false),
        Err(e) => (serde_json::to_string(&e), true),
    };
    let text = body.map_err(|e| CallError {
        code: INTERNAL_ERROR,
        message: format!("failed to encode tool result: {e}"),
    })?;

    Ok(json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    }))
}

pub async fn call_tool(
    cfg: &Config,
    client: &dyn TelegramClient,
    name: &str,
    args: Value,
) -> Result<Value, CallError> {
    match name {
        "get_chat_info" => {
            let a: GetChatInfoArgs = decode(name, args)?;
            let limit = cfg.chat_info_topics.then(|| match a.topics_limit {
                Some(raw) => normalize_topics_limit(Some(&raw)),
                None => cfg.chat_info_topics_limit,
            });
            content(chat::get_chat_info(client, &a.chat_id.into_string(), limit).await)
        }

        "list_forum_topics" => {
            let a: ListTopicsArgs = decode(name, args)?;
            let limit = normalize_topics_limit(a.limit.as_ref());
            content(chat::list_topics(client, &a.chat_id.into_string(), limit).await)
        }

        "read_messages" => {
            let a: ReadMessagesArgs = decode(name, args)?;
            if a.message_ids.is_empty() {
                return Err(CallError::invalid("read_messages: message_ids is empty"));
            }
            content(messages::read_messages(client, &a.chat_id.into_string(), &a.message_ids).await)
        }

        "send_message" => {
            let a: SendMessageArgs = decode(name, args)?;
            let request = messages::SendRequest {
                message: a.message,
                files: a.files,
                reply_to_msg_id: a.reply_to_msg_id,
                topic_id: a.topic_id,
                parse_mode: ParseMode::parse(a.parse_mode.as_deref()),
            };
            content(messages::send_message(client, &a.chat_id.into_string(), request).await)
        }

        "edit_message" => {
            let a: EditMessageArgs = decode(name, args)?;
            let parse_mode = ParseMode::parse(a.parse_mode.as_deref());
            content(
                messages::edit_message(
                    client,
                    &a.chat_id.into_string(),
                    a.message_id,
                    &a.new_text,
                    parse_mode,
                )
                .await,
            )
        }

        "invoke_mtproto" => {
            let a: InvokeMtprotoArgs = decode(name, args)?;
            content(mtproto::invoke_mtproto(client, &a.method, &a.params_json, a.resolve).await)
        }

        _ => Err(CallError::invalid("Unknown tool")),
    }
}

/// `tools/list` payload.
pub fn tool_definitions() -> Value {
    let chat_id = json!({
        "type": ["string", "integer"],
        "description": "Chat id, @username or invite link"
    });

    json!({
      "tools": [
        {
          "name": "get_chat_info",
          "description": "Describe a chat. For forum chats the response also lists topics (topics, topics_has_more).",
          "inputSchema": {
            "type": "object",
            "properties": {
              "chat_id": chat_id,
              "topics_limit": { "type": "integer", "minimum": 1, "maximum": 100, "description": "Max topics to include (default 20)" }
            },
            "required": ["chat_id"]
          }
        },
        {
          "name": "list_forum_topics",
          "description": "List topics of a forum chat with a has_more flag.",
          "inputSchema": {
            "type": "object",
            "properties": {
              "chat_id": chat_id,
              "limit": { "type": "integer", "minimum": 1, "maximum": 100, "description": "Max topics to return (default 20)" }
            },
            "required": ["chat_id"]
          }
        },
        {
          "name": "read_messages",
          "description": "Fetch messages by id. Messages in forum topics carry topic_id.",
          "inputSchema": {
            "type": "object",
            "properties": {
              "chat_id": chat_id,
              "message_ids": { "type": "array", "items": { "type": "integer" }, "minItems": 1 }
            },
            "required": ["chat_id", "message_ids"]
          }
        },
        {
          "name": "send_message",
          "description": "Send a message or files. Use topic_id to post into a forum topic; reply_to_msg_id takes precedence.",
          "inputSchema": {
            "type": "object",
            "properties": {
              "chat_id": chat_id,
              "message": { "type": "string" },
              "files": { "type": "array", "items": { "type": "string" } },
              "reply_to_msg_id": { "type": "integer" },
              "topic_id": { "type": "integer" },
              "parse_mode": { "type": "string", "enum": ["markdown", "md", "html"] }
            },
            "required": ["chat_id"]
          }
        },
        {
          "name": "edit_message",
          "description": "Edit the text of a sent message.",
          "inputSchema": {
            "type": "object",
            "properties": {
              "chat_id": chat_id,
              "message_id": { "type": "integer" },
              "new_text": { "type": "string" },
              "parse_mode": { "type": "string", "enum": ["markdown", "md", "html"] }
            },
            "required": ["chat_id", "message_id", "new_text"]
          }
        },
        {
          "name": "invoke_mtproto",
          "description": "Invoke a raw MTProto method, e.g. messages.ImportChatInvite. RPC failures report a stable error_code.",
          "inputSchema": {
            "type": "object",
            "properties": {
              "method": { "type": "string" },
              "params_json": { "type": "string", "description": "JSON object with method parameters" },
              "resolve": { "type": "boolean", "description": "Resolve peer parameters first (default true)" }
            },
            "required": ["method"]
          }
        }
      ]
    })
}
