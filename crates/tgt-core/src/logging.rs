use tracing_subscriber::{fmt, EnvFilter};

use crate::{errors::Error, Result};

/// Initialize tracing for a tool process.
///
/// Output goes to stderr: stdout carries the JSON-RPC stream.
/// The default filter can be overridden with `RUST_LOG`.
pub fn init(service_name: &str) -> Result<()> {
    let target = service_name.replace('-', "_");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,tgt_core=info,{target}=info")));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| Error::Config(format!("logging init failed: {e}")))
}
