//! Logger construction.
//!
//! The subscriber is built as a [`Dispatch`] and installed only for the scope
//! of a run, never as the process-wide default.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::Dispatch;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// What the user asked for on the command line.
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    /// Log at `info` instead of only `error`.
    pub info: bool,
    /// Append to this file in addition to stderr.
    pub file: Option<PathBuf>,
}

/// `RUST_LOG` wins when set; otherwise `info` or `error`.
fn filter(info: bool) -> EnvFilter {
    let level = if info { "info" } else { "error" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

pub fn build(settings: &LogSettings) -> Result<Dispatch> {
    build_with_filter(filter(settings.info), settings.file.as_deref())
}

fn build_with_filter(filter: EnvFilter, file: Option<&Path>) -> Result<Dispatch> {
    let file_layer = match file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let subscriber = Registry::default()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer);

    Ok(Dispatch::new(subscriber))
}
