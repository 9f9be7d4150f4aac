//! prefixsync — keep Docker's `fixed-cidr-v6` in step with the host's
//! delegated IPv6 prefix.
//!
//! # Usage
//!
//! ```text
//! prefixsync -i <interface> [-d /etc/docker/daemon.json] [-li] [-lf <file>]
//!            [--subnet-size 80] [--service docker] [--timeout 30] [--dry-run]
//! ```
//!
//! Exit status is `0` on success (including "nothing to do") and `1` on any
//! fatal failure.

mod logging;

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use prefixsync_core::InterfaceName;
use prefixsync_host::{SystemRunner, DEFAULT_SERVICE};
use prefixsync_sync::{
    pipeline, FsStore, SyncOptions, DEFAULT_DAEMON_CONFIG, DEFAULT_SUBNET_LEN,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "prefixsync",
    version,
    about = "Check whether the host IPv6 prefix changed and update Docker with the new one",
    long_about = None,
)]
struct Cli {
    /// Host interface to inspect.
    #[arg(short = 'i', long)]
    interface: InterfaceName,

    /// Path to the Docker daemon configuration.
    #[arg(short = 'd', long = "dockerconfig", default_value = DEFAULT_DAEMON_CONFIG)]
    docker_config: PathBuf,

    /// Log informational messages, not only errors (also `-li`).
    #[arg(long = "loginfo")]
    log_info: bool,

    /// Also append log output to this file (also `-lf`).
    #[arg(long = "logfile", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Prefix length of the container subnet written to `fixed-cidr-v6`.
    #[arg(long, default_value_t = DEFAULT_SUBNET_LEN, value_parser = clap::value_parser!(u8).range(1..=128))]
    subnet_size: u8,

    /// Service restarted after the configuration changes.
    #[arg(long, default_value = DEFAULT_SERVICE)]
    service: String,

    /// Seconds allowed for each external command.
    #[arg(long = "timeout", value_name = "SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Report what would change without writing or restarting anything.
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            interface: self.interface.clone(),
            config_path: self.docker_config.clone(),
            subnet_len: self.subnet_size,
            service: self.service.clone(),
            dry_run: self.dry_run,
        }
    }
}

/// Options whose next argument is a value, never a flag.
const VALUE_OPTIONS: &[&str] = &[
    "-i",
    "--interface",
    "-d",
    "--dockerconfig",
    "--logfile",
    "--subnet-size",
    "--service",
    "--timeout",
];

/// Rewrite the two-letter short flags `-li` / `-lf` to their long forms;
/// clap only understands single-character shorts.
///
/// Only tokens in flag position are rewritten. The value of an option and
/// everything after `--` pass through untouched.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut out = Vec::new();
    let mut expects_value = false;
    let mut positional_only = false;

    for arg in args {
        if expects_value || positional_only {
            expects_value = false;
            out.push(arg);
            continue;
        }
        let arg = match arg.to_str() {
            Some("-li") => OsString::from("--loginfo"),
            Some("-lf") => OsString::from("--logfile"),
            Some(s) if s.starts_with("-lf=") => OsString::from(format!("--logfile={}", &s[4..])),
            Some("--") => {
                positional_only = true;
                arg
            }
            _ => arg,
        };
        expects_value = arg.to_str().is_some_and(|s| VALUE_OPTIONS.contains(&s));
        out.push(arg);
    }
    out
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    let settings = logging::LogSettings {
        info: cli.log_info,
        file: cli.log_file.clone(),
    };
    let dispatch = match logging::build(&settings) {
        Ok(dispatch) => dispatch,
        Err(err) => {
            eprintln!("prefixsync: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    tracing::dispatcher::with_default(&dispatch, || run(&cli))
}

fn run(cli: &Cli) -> ExitCode {
    let runner = SystemRunner::new(Duration::from_secs(cli.timeout_secs));
    match pipeline::run(&runner, &FsStore, &cli.sync_options()) {
        Ok(outcome) => {
            tracing::info!(%outcome, "run complete");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
