//! Raw MTProto method invocation and its input/error normalization.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{client::TelegramClient, errors::Error};

use super::{ToolError, ToolResult};

const OPERATION: &str = "invoke_mtproto";

/// Hash parameters are 32-bit unsigned on the wire.
const MAX_HASH: u64 = 0xFFFF_FFFF;

static METHOD_RE: OnceLock<Regex> = OnceLock::new();
static CAMEL_BOUNDARY_RE: OnceLock<Regex> = OnceLock::new();
static NUMERIC_SUFFIX_RE: OnceLock<Regex> = OnceLock::new();

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InvokeResult {
    pub ok: bool,
    pub method: String,
    pub result: Value,
}

/// Normalize the `hash` parameter, leaving everything else untouched.
///
/// Strings are trimmed (dropped when empty), integers are kept when they fit
/// an unsigned 32-bit value, and anything else is dropped.
pub fn sanitize_mtproto_params(mut params: Map<String, Value>) -> Map<String, Value> {
    let Some(hash) = params.remove("hash") else {
        return params;
    };

    let keep = match hash {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| Value::String(s.to_string()))
        }
        Value::Number(n) => n.as_u64().filter(|v| *v <= MAX_HASH).map(Value::from),
        _ => None,
    };

    if let Some(v) = keep {
        params.insert("hash".to_string(), v);
    }
    params
}

/// Stable upper-snake code for RPC errors, `None` for everything else.
///
/// Accepts both raw server strings (`FLOOD_WAIT_30` becomes `FLOOD_WAIT_X`)
/// and client class names (`InviteHashExpiredError` becomes
/// `INVITE_HASH_EXPIRED`).
pub fn rpc_error_code(err: &Error) -> Option<String> {
    let Error::Rpc(rpc) = err else {
        return None;
    };

    let name = rpc.name.trim();
    if name.is_empty() {
        return Some(format!("RPC_{}", rpc.code));
    }

    let snake = if name.chars().any(|c| c.is_ascii_lowercase()) {
        let base = name.strip_suffix("Error").unwrap_or(name);
        let re = CAMEL_BOUNDARY_RE
            .get_or_init(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid regex"));
        re.replace_all(base, "${1}_${2}").to_uppercase()
    } else {
        name.to_string()
    };

    let re = NUMERIC_SUFFIX_RE.get_or_init(|| Regex::new(r"_\d+$").expect("valid regex"));
    Some(re.replace(&snake, "_X").into_owned())
}

/// Canonical method name, or `None` when it does not look like a TL method.
///
/// Both the schema spelling (`messages.importChatInvite`) and the class
/// spelling (`messages.ImportChatInvite`) are accepted; the result uses the
/// class spelling. A `Request` suffix is only dropped when it was appended to
/// a method that already ends in `Request` (`HideChatJoinRequestRequest`).
pub fn normalize_method_name(method: &str) -> Option<String> {
    let re = METHOD_RE.get_or_init(|| {
        Regex::new(r"^(?:([a-z][A-Za-z0-9]*)\.)?([A-Za-z][A-Za-z0-9]*)$").expect("valid regex")
    });
    let caps = re.captures(method.trim())?;

    let name = &caps[2];
    let name = match name.strip_suffix("Request") {
        Some(inner) if inner.ends_with("Request") => inner,
        _ => name,
    };
    let mut chars = name.chars();
    let first = chars.next()?.to_ascii_uppercase();
    let name = format!("{first}{}", chars.as_str());

    Some(match caps.get(1) {
        Some(ns) => format!("{}.{name}", ns.as_str()),
        None => name,
    })
}

fn parse_params(params_json: &str) -> Result<Map<String, Value>, String> {
    if params_json.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(params_json) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("params must be a JSON object, got {other}")),
        Err(e) => Err(format!("params are not valid JSON: {e}")),
    }
}

/// Invoke a raw TL method through the client.
pub async fn invoke_mtproto(
    client: &dyn TelegramClient,
    method: &str,
    params_json: &str,
    resolve: bool,
) -> ToolResult<InvokeResult> {
    let Some(method) = normalize_method_name(method) else {
        return Err(ToolError::rejected(
            OPERATION,
            "INVALID_METHOD",
            format!("not a TL method name: {method:?}"),
        ));
    };
    let params = parse_params(params_json)
        .map_err(|msg| ToolError::rejected(OPERATION, "INVALID_PARAMS", msg))?;
    let params = sanitize_mtproto_params(params);

    let log_params = Value::Object(params.clone());
    match client.invoke(&method, params, resolve).await {
        Ok(result) => Ok(InvokeResult {
            ok: true,
            method,
            result,
        }),
        Err(e) => Err(ToolError::from_error(
            OPERATION,
            &e,
            serde_json::json!({ "method": method, "params": log_params }),
        )),
    }
}
