//! # prefixsync-sync
//!
//! Daemon configuration handling and the prefix synchronization pipeline.
//!
//! Call [`pipeline::run`] to query the host, compare against the daemon's
//! `fixed-cidr-v6`, and rewrite + restart when the prefix moved.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod store;

pub use config::{DaemonConfig, DEFAULT_DAEMON_CONFIG, DEFAULT_SUBNET_LEN, FIXED_CIDR_V6_KEY};
pub use error::SyncError;
pub use pipeline::{SyncOptions, SyncOutcome};
pub use store::{ConfigStore, FsStore};
