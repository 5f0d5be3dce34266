use crate::error::{EscrowError, Result};
use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "ESCROW_LOG";

/// Installs the global subscriber. Logs go to stderr so stdout stays
/// reserved for the CSV report.
pub fn init() -> Result<()> {
    let env = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(LOG_ENV_VAR)
        .from_env()
        .map_err(|e| EscrowError::Config(format!("invalid {}: {}", LOG_ENV_VAR, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init()
        .map_err(|e| EscrowError::Config(format!("logging already initialized: {}", e)))
}
