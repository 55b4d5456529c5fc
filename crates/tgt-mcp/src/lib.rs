//! MCP server over stdio for the Telegram tool surface.
//!
//! - JSON-RPC over stdio (newline-delimited)
//! - `initialize`, `tools/list`, `tools/call`
//! - Generic over any [`TelegramClient`] adapter; the binary embedding this
//!   crate owns the client connection.

pub mod rpc;
pub mod tools;

use std::sync::Arc;

use serde_json::json;
use tgt_core::{client::TelegramClient, config::Config};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use rpc::{respond_err, respond_ok, RpcRequest, RpcResponse, INVALID_PARAMS, METHOD_NOT_FOUND};

pub struct McpServer {
    cfg: Config,
    client: Arc<dyn TelegramClient>,
}

impl McpServer {
    pub fn new(cfg: Config, client: Arc<dyn TelegramClient>) -> Self {
        Self { cfg, client }
    }

    /// Handle one request. Notifications (no id) get no response.
    pub async fn handle_rpc(&self, req: RpcRequest) -> Option<RpcResponse> {
        let id = req.id?;

        match req.method.as_str() {
            "initialize" => {
                let proto = req
                    .params
                    .as_ref()
                    .and_then(|p| p.get("protocolVersion"))
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown");

                Some(respond_ok(
                    id,
                    json!({
                      "protocolVersion": proto,
                      "serverInfo": {
                        "name": self.cfg.server_name,
                        "version": self.cfg.server_version
                      },
                      "capabilities": { "tools": {} }
                    }),
                ))
            }

            "tools/list" => Some(respond_ok(id, tools::tool_definitions())),

            "tools/call" => {
                let Some(params) = req.params else {
                    return Some(respond_err(id, INVALID_PARAMS, "Missing params"));
                };

                let name = params
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string();
                let args = params
                    .get("arguments")
                    .cloned()
                    .unwrap_or_else(|| json!({}));

                tracing::info!(tool = %name, "tools/call");
                match tools::call_tool(&self.cfg, self.client.as_ref(), &name, args).await {
                    Ok(result) => Some(respond_ok(id, result)),
                    Err(e) => Some(respond_err(id, e.code, &e.message)),
                }
            }

            "ping" => Some(respond_ok(id, json!({}))),

            _ => Some(respond_err(id, METHOD_NOT_FOUND, "Method not found")),
        }
    }

    /// Serve requests line by line until the reader is exhausted.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let req = match serde_json::from_str::<RpcRequest>(&line) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(error = %e, "dropping malformed request line");
                    continue;
                }
            };

            let Some(resp) = self.handle_rpc(req).await else {
                continue;
            };

            let out = serde_json::to_string(&resp)?;
            writer.write_all(out.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        Ok(())
    }
}

/// Run the server on the process's stdin/stdout.
pub async fn run_stdio(cfg: Config, client: Arc<dyn TelegramClient>) -> anyhow::Result<()> {
    tracing::info!(server = %cfg.server_name, "MCP server running on stdio");

    let server = McpServer::new(cfg, client);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    server.serve(stdin, tokio::io::stdout()).await
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use tgt_core::{
        errors::RpcError,
        testing::{channel, topics, FakeClient},
    };

    use super::*;

    fn server(client: FakeClient) -> (McpServer, Arc<FakeClient>) {
        let client = Arc::new(client);
        let server = McpServer::new(Config::default(), client.clone());
        (server, client)
    }

    fn call(name: &str, arguments: Value) -> RpcRequest {
        RpcRequest {
            jsonrpc: Some("2.0".to_string()),
            id: Some(json!(1)),
            method: "tools/call".to_string(),
            params: Some(json!({ "name": name, "arguments": arguments })),
        }
    }

    /// Decode the JSON text payload of a tool result.
    fn payload(resp: &RpcResponse) -> (Value, bool) {
        let result = resp.result.as_ref().unwrap();
        let text = result["content"][0]["text"].as_str().unwrap();
        (
            serde_json::from_str(text).unwrap(),
            result["isError"].as_bool().unwrap(),
        )
    }

    #[tokio::test]
    async fn tools_list_contains_every_tool() {
        let (server, _) = server(FakeClient::new());
        let req = RpcRequest {
            jsonrpc: Some("2.0".to_string()),
            id: Some(json!(1)),
            method: "tools/list".to_string(),
            params: None,
        };
        let resp = server.handle_rpc(req).await.unwrap();
        let tools = resp.result.unwrap()["tools"].as_array().unwrap().clone();
        let names: Vec<_> = tools
            .iter()
            .filter_map(|t| t.get("name").and_then(|n| n.as_str()))
            .collect();
        for expected in [
            "get_chat_info",
            "list_forum_topics",
            "read_messages",
            "send_message",
            "edit_message",
            "invoke_mtproto",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let (server, _) = server(FakeClient::new());
        let req = RpcRequest {
            jsonrpc: Some("2.0".to_string()),
            id: None,
            method: "notifications/initialized".to_string(),
            params: None,
        };
        assert!(server.handle_rpc(req).await.is_none());
    }

    #[tokio::test]
    async fn get_chat_info_lists_topics_for_forums() {
        let client = FakeClient::new().with_entity("999", channel(999, "Forum Chat", true));
        client.push_topics(Ok(topics(7, 1)));
        let (server, client) = server(client);

        let resp = server
            .handle_rpc(call("get_chat_info", json!({ "chat_id": 999, "topics_limit": 5 })))
            .await
            .unwrap();
        let (body, is_error) = payload(&resp);
        assert!(!is_error);
        assert_eq!(body["topics"], json!([{ "topic_id": 7, "title": "Topic 7" }]));
        assert_eq!(client.topic_requests.lock().unwrap()[0].limit, 6);
    }

    #[tokio::test]
    async fn list_forum_topics_defaults_bad_limit() {
        let client = FakeClient::new().with_entity("999", channel(999, "Forum Chat", true));
        let (server, client) = server(client);

        let resp = server
            .handle_rpc(call("list_forum_topics", json!({ "chat_id": "999", "limit": "many" })))
            .await
            .unwrap();
        let (body, is_error) = payload(&resp);
        assert!(!is_error);
        assert_eq!(body["has_more"], false);
        assert_eq!(client.topic_requests.lock().unwrap()[0].limit, 21);
    }

    #[tokio::test]
    async fn invoke_mtproto_reports_error_code() {
        let client = FakeClient::new();
        client.push_invoke(Err(RpcError::new(400, "UserAlreadyParticipantError").into()));
        let (server, _) = server(client);

        let resp = server
            .handle_rpc(call(
                "invoke_mtproto",
                json!({
                    "method": "messages.ImportChatInvite",
                    "params_json": "{\"hash\": \"testinvite123\"}",
                    "resolve": false
                }),
            ))
            .await
            .unwrap();
        let (body, is_error) = payload(&resp);
        assert!(is_error);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error_code"], "USER_ALREADY_PARTICIPANT");
    }

    #[tokio::test]
    async fn bad_arguments_are_rpc_errors() {
        let (server, _) = server(FakeClient::new());

        let resp = server
            .handle_rpc(call("edit_message", json!({ "chat_id": "1" })))
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap()["code"], INVALID_PARAMS);

        let resp = server
            .handle_rpc(call("no_such_tool", json!({})))
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap()["message"], "Unknown tool");
    }

    #[tokio::test]
    async fn serve_answers_each_line() {
        let client = FakeClient::new().with_entity("5", channel(5, "Regular", false));
        let (server, client) = server(client);

        let input = concat!(
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\",\"params\":{\"protocolVersion\":\"2024-11-05\"}}\n",
            "not json\n",
            "\n",
            "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
            "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"tools/call\",\"params\":{\"name\":\"send_message\",\"arguments\":{\"chat_id\":\"5\",\"message\":\"hi\",\"topic_id\":77}}}\n",
        );
        let mut out = Vec::new();
        server.serve(input.as_bytes(), &mut out).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(lines[0]["result"]["serverInfo"]["name"], "telegram-tools");
        assert_eq!(lines[1]["id"], 2);
        assert_eq!(client.sent.lock().unwrap()[0].message.reply_to, Some(77));
    }
}
