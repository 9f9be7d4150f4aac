//! The container daemon's JSON configuration (`daemon.json`).
//!
//! The document is kept as a generic JSON object so every key prefixsync does
//! not own survives a rewrite untouched. Only [`FIXED_CIDR_V6_KEY`] is ever
//! changed. `serde_json::Map` is ordered by key, which gives sorted output.

use std::path::{Path, PathBuf};

use ipnet::Ipv6Net;
use serde_json::{Map, Value};

use prefixsync_core::prefix::{last_subnet, same_prefix};

use crate::error::{invalid, io_err, SyncError};
use crate::store::ConfigStore;

/// Daemon key holding the IPv6 subnet handed out to containers.
pub const FIXED_CIDR_V6_KEY: &str = "fixed-cidr-v6";

pub const DEFAULT_DAEMON_CONFIG: &str = "/etc/docker/daemon.json";

/// Prefix length of the container subnet carved from the host prefix.
pub const DEFAULT_SUBNET_LEN: u8 = 80;

/// A loaded daemon configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DaemonConfig {
    path: PathBuf,
    document: Map<String, Value>,
    fixed_cidr: Ipv6Net,
}

impl DaemonConfig {
    /// Load and validate the configuration at `path`.
    ///
    /// Fails with [`SyncError::ConfigNotFound`] when the file is absent and
    /// [`SyncError::ConfigInvalid`] when it is not a JSON object carrying a
    /// parseable `fixed-cidr-v6`.
    pub fn load<S>(store: &S, path: &Path) -> Result<Self, SyncError>
    where
        S: ConfigStore + ?Sized,
    {
        if !store.exists(path) {
            return Err(SyncError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = store.read(path).map_err(|e| io_err(path, e))?;
        Self::parse(path, &contents)
    }

    /// Parse `contents` as the configuration living at `path`.
    pub fn parse(path: &Path, contents: &str) -> Result<Self, SyncError> {
        let value: Value = serde_json::from_str(contents).map_err(|e| invalid(path, e.to_string()))?;
        let Value::Object(document) = value else {
            return Err(invalid(path, "top-level value is not a JSON object"));
        };

        let raw = document
            .get(FIXED_CIDR_V6_KEY)
            .ok_or_else(|| invalid(path, format!("missing key '{FIXED_CIDR_V6_KEY}'")))?;
        let cidr = raw
            .as_str()
            .ok_or_else(|| invalid(path, format!("'{FIXED_CIDR_V6_KEY}' is not a string")))?;
        let fixed_cidr: Ipv6Net = cidr.parse().map_err(|_| {
            invalid(
                path,
                format!("'{FIXED_CIDR_V6_KEY}' value '{cidr}' is not an IPv6 CIDR"),
            )
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            document,
            fixed_cidr,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    /// The currently configured `fixed-cidr-v6`.
    pub fn fixed_cidr(&self) -> Ipv6Net {
        self.fixed_cidr
    }

    /// Whether the configured subnet already lives inside `observed`.
    pub fn same_prefix(&self, observed: &Ipv6Net) -> bool {
        same_prefix(&self.fixed_cidr, observed)
    }

    /// Set `fixed-cidr-v6` to the last `/subnet_len` subnet of `observed`,
    /// in memory only. Returns the subnet that was stored.
    pub fn apply_prefix(&mut self, observed: &Ipv6Net, subnet_len: u8) -> Result<Ipv6Net, SyncError> {
        let subnet = last_subnet(observed, subnet_len).map_err(|e| invalid(&self.path, e.to_string()))?;
        self.document.insert(
            FIXED_CIDR_V6_KEY.to_string(),
            Value::String(subnet.to_string()),
        );
        self.fixed_cidr = subnet;
        Ok(subnet)
    }

    /// Apply the new prefix and write the whole document back.
    pub fn update_prefix<S>(
        &mut self,
        store: &S,
        observed: &Ipv6Net,
        subnet_len: u8,
    ) -> Result<Ipv6Net, SyncError>
    where
        S: ConfigStore + ?Sized,
    {
        let subnet = self.apply_prefix(observed, subnet_len)?;
        self.save(store)?;
        Ok(subnet)
    }

    /// Indented, key-sorted JSON with a trailing newline.
    pub fn render(&self) -> Result<String, SyncError> {
        let mut json = serde_json::to_string_pretty(&self.document)?;
        json.push('\n');
        Ok(json)
    }

    pub fn save<S>(&self, store: &S) -> Result<(), SyncError>
    where
        S: ConfigStore + ?Sized,
    {
        let json = self.render()?;
        store.write(&self.path, &json).map_err(|e| io_err(&self.path, e))?;
        tracing::info!(path = %self.path.display(), cidr = %self.fixed_cidr, "daemon configuration written");
        Ok(())
    }
}
