use std::time::Duration;

use thiserror::Error;

/// Error surface for external command execution, address queries, and
/// service restarts.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("required tool '{tool}' is not installed")]
    ToolMissing { tool: String },

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("address query `{command}` failed: {reason}")]
    QueryFailed { command: String, reason: String },

    #[error("failed to restart service '{service}': {reason}")]
    RestartFailed { service: String, reason: String },
}

pub(crate) fn spawn_err(command: impl Into<String>, source: std::io::Error) -> HostError {
    HostError::Spawn {
        command: command.into(),
        source,
    }
}
