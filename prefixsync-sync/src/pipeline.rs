//! The synchronization run.
//!
//! ```text
//! QueryAddress → SelectNetwork → LoadConfig → Compare → (NoOp | Update → Restart)
//! ```
//!
//! Failures before `Compare` abort the run. A failed restart is logged and
//! reported in the outcome but does not fail the run, since the new
//! configuration is already on disk.

use std::fmt;
use std::path::PathBuf;

use ipnet::Ipv6Net;

use prefixsync_core::{select::select_preferred_network, InterfaceName};
use prefixsync_host::{query_global_addresses, restart_service, CommandRunner, DEFAULT_SERVICE};

use crate::config::{DaemonConfig, DEFAULT_DAEMON_CONFIG, DEFAULT_SUBNET_LEN};
use crate::error::SyncError;
use crate::store::ConfigStore;

/// Inputs for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    pub interface: InterfaceName,
    pub config_path: PathBuf,
    pub subnet_len: u8,
    pub service: String,
    /// Stop after `Compare`: log what would change, write and restart nothing.
    pub dry_run: bool,
}

impl SyncOptions {
    pub fn new(interface: InterfaceName) -> Self {
        Self {
            interface,
            config_path: PathBuf::from(DEFAULT_DAEMON_CONFIG),
            subnet_len: DEFAULT_SUBNET_LEN,
            service: DEFAULT_SERVICE.to_string(),
            dry_run: false,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The configured subnet already belongs to the host prefix.
    Unchanged { network: Ipv6Net, configured: Ipv6Net },
    /// The configuration was rewritten; `restarted` is false when the restart
    /// failed.
    Updated {
        previous: Ipv6Net,
        current: Ipv6Net,
        restarted: bool,
    },
    /// Dry run: the configuration *would* have been rewritten.
    WouldUpdate { previous: Ipv6Net, current: Ipv6Net },
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Unchanged { network, configured } => {
                write!(f, "prefix unchanged ({configured} within {network})")
            }
            SyncOutcome::Updated {
                previous,
                current,
                restarted,
            } => {
                write!(f, "prefix updated {previous} -> {current}")?;
                if !restarted {
                    write!(f, " (daemon restart failed)")?;
                }
                Ok(())
            }
            SyncOutcome::WouldUpdate { previous, current } => {
                write!(f, "[dry-run] would update prefix {previous} -> {current}")
            }
        }
    }
}

/// Run the pipeline once.
pub fn run<R, S>(runner: &R, store: &S, options: &SyncOptions) -> Result<SyncOutcome, SyncError>
where
    R: CommandRunner + ?Sized,
    S: ConfigStore + ?Sized,
{
    // QueryAddress
    let records = query_global_addresses(runner, &options.interface)?;

    // SelectNetwork
    let network = select_preferred_network(&records)?;
    tracing::info!(interface = %options.interface, %network, "host prefix");

    // LoadConfig
    let mut config = DaemonConfig::load(store, &options.config_path)?;
    let previous = config.fixed_cidr();
    tracing::info!(path = %config.path().display(), configured = %previous, "daemon configuration loaded");

    // Compare
    if config.same_prefix(&network) {
        tracing::info!("prefix unchanged, nothing to do");
        return Ok(SyncOutcome::Unchanged {
            network,
            configured: previous,
        });
    }

    if options.dry_run {
        let current = config.apply_prefix(&network, options.subnet_len)?;
        tracing::info!(%previous, %current, "[dry-run] would rewrite daemon configuration");
        return Ok(SyncOutcome::WouldUpdate { previous, current });
    }

    // Update
    let current = config.update_prefix(store, &network, options.subnet_len)?;

    // Restart
    let restarted = match restart_service(runner, &options.service) {
        Ok(()) => true,
        Err(err) => {
            tracing::error!(service = %options.service, error = %err, "daemon restart failed");
            false
        }
    };

    Ok(SyncOutcome::Updated {
        previous,
        current,
        restarted,
    })
}
