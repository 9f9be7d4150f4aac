//! External command seam.
//!
//! Everything prefixsync asks of the host goes through [`CommandRunner`], so
//! tests can swap in canned output instead of touching real system tools.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{spawn_err, HostError};

/// Upper bound for a single external command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Exit status rendered for diagnostics.
    pub fn status_label(&self) -> String {
        match self.status {
            Some(code) => code.to_string(),
            None => "signal".to_string(),
        }
    }
}

/// Run a program to completion and capture its output.
pub trait CommandRunner {
    /// Returns [`HostError::ToolMissing`] when `program` cannot be found.
    /// A nonzero exit is *not* an error at this level.
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, HostError>;
}

/// Runs real processes, killing any that outlive the timeout.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT)
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, HostError> {
        let command_line = command_line(program, args);
        tracing::debug!(command = %command_line, "running");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| spawn_err(&command_line, e))?;

        runtime.block_on(async {
            let spawned = Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn();
            let child = match spawned {
                Ok(child) => child,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return Err(HostError::ToolMissing {
                        tool: program.to_string(),
                    })
                }
                Err(e) => return Err(spawn_err(&command_line, e)),
            };

            match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
                Ok(Ok(output)) => Ok(CommandOutput {
                    status: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                }),
                Ok(Err(e)) => Err(spawn_err(&command_line, e)),
                // Dropping the wait future drops the child, which kills it.
                Err(_) => Err(HostError::Timeout {
                    command: command_line.clone(),
                    timeout: self.timeout,
                }),
            }
        })
    }
}

pub(crate) fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
