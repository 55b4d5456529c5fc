/// Core error type for the tool surface.
///
/// Client adapters map their failures into this type. Protocol-level
/// rejections from Telegram go into [`Error::Rpc`] so callers can report a
/// stable error code.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rpc error {}: {}", .0.code, .0.name)]
    Rpc(RpcError),

    #[error("external error: {0}")]
    External(String),
}

/// An RPC error as reported by the Telegram server.
///
/// `name` is whatever the adapter has at hand: the raw server string
/// (`FLOOD_WAIT_30`) or a client library's error class name
/// (`FloodWaitError`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcError {
    pub code: i32,
    pub name: String,
}

impl RpcError {
    pub fn new(code: i32, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }
}

impl From<RpcError> for Error {
    fn from(e: RpcError) -> Self {
        Error::Rpc(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
