use std::{env, path::Path};

use crate::forum::{normalize_topics_limit, DEFAULT_TOPICS_LIMIT};

const DEFAULT_SERVER_NAME: &str = "telegram-tools";

/// Typed configuration for the tool server.
///
/// Client credentials and session handling belong to the client adapter and
/// are not read here.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_name: String,
    pub server_version: String,

    // get_chat_info
    pub chat_info_topics: bool,
    pub chat_info_topics_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            chat_info_topics: true,
            chat_info_topics_limit: DEFAULT_TOPICS_LIMIT,
        }
    }
}

impl Config {
    /// Load from the process environment, after an optional `.env` in the
    /// working directory.
    pub fn load() -> Self {
        Self::load_with_dotenv(Path::new(".env"))
    }

    /// Like [`Config::load`] with an explicit dotenv file. A missing file is
    /// fine; variables already set in the environment win.
    pub fn load_with_dotenv(path: &Path) -> Self {
        if let Err(e) = dotenvy::from_path(path) {
            if !e.not_found() {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring unreadable dotenv file"
                );
            }
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or malformed values fall back
    /// to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let server_name = lookup("TGT_SERVER_NAME")
            .and_then(non_empty)
            .unwrap_or(defaults.server_name);
        let chat_info_topics = lookup("TGT_CHAT_INFO_TOPICS")
            .and_then(|s| parse_bool(&s))
            .unwrap_or(defaults.chat_info_topics);
        let chat_info_topics_limit = lookup("TGT_CHAT_INFO_TOPICS_LIMIT")
            .map(|s| normalize_topics_limit(Some(&serde_json::Value::String(s))))
            .unwrap_or(defaults.chat_info_topics_limit);

        Self {
            server_name,
            server_version: defaults.server_version,
            chat_info_topics,
            chat_info_topics_limit,
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
