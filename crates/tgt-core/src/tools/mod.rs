//! Tool operations exposed to callers (MCP, CLI, ...).
//!
//! Each operation resolves what it needs through the client port and returns
//! either a serializable result or a [`ToolError`] ready to hand back.

pub mod chat;
pub mod messages;
pub mod mtproto;

use serde::Serialize;

use crate::errors::Error;

/// Caller-facing failure of a tool operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolError {
    pub ok: bool,
    pub operation: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

pub type ToolResult<T> = std::result::Result<T, ToolError>;

impl ToolError {
    /// Wrap a client or core error, logging it once here.
    pub fn from_error(operation: &str, err: &Error, params: serde_json::Value) -> Self {
        let error_code = mtproto::rpc_error_code(err);
        tracing::error!(operation, error = %err, code = ?error_code, "tool operation failed");
        Self {
            ok: false,
            operation: operation.to_string(),
            error: err.to_string(),
            error_code,
            params,
        }
    }

    /// A failure detected before any request went out.
    pub fn rejected(operation: &str, code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::warn!(operation, code, %message, "tool call rejected");
        Self {
            ok: false,
            operation: operation.to_string(),
            error: message,
            error_code: Some(code.to_string()),
            params: serde_json::Value::Null,
        }
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error_code {
            Some(code) => write!(f, "{} failed ({code}): {}", self.operation, self.error),
            None => write!(f, "{} failed: {}", self.operation, self.error),
        }
    }
}

impl std::error::Error for ToolError {}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::errors::RpcError;

    #[test]
    fn rpc_failures_carry_a_code() {
        let err: Error = RpcError::new(400, "InviteHashExpiredError").into();
        let te = ToolError::from_error("join_chat", &err, json!({ "hash": "x" }));
        let v = serde_json::to_value(&te).unwrap();
        assert_eq!(v["ok"], false);
        assert_eq!(v["error_code"], "INVITE_HASH_EXPIRED");
        assert_eq!(v["params"]["hash"], "x");
    }

    #[test]
    fn other_failures_have_no_code() {
        let err = Error::External("boom".to_string());
        let te = ToolError::from_error("send_message", &err, serde_json::Value::Null);
        let v = serde_json::to_value(&te).unwrap();
        assert!(v.get("error_code").is_none());
        assert!(v.get("params").is_none());
        assert_eq!(te.to_string(), "send_message failed: external error: boom");
    }
}
