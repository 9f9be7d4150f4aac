//! Parsing of `ip -6 -json addr show` output.
//!
//! iproute2 emits a JSON array with one object per interface. Interfaces whose
//! addresses were all filtered out by the query show up as empty `{}` objects,
//! and individual `addr_info` entries may lack fields. Such entries are
//! skipped rather than failing the whole listing.

use std::net::Ipv6Addr;

use ipnet::Ipv6Net;
use serde::Deserialize;
use serde_json::Value;

use crate::error::PrefixError;
use crate::types::{AddressRecord, Lifetime};

#[derive(Debug, Deserialize)]
struct IpLink {
    #[serde(default)]
    ifname: Option<String>,
    #[serde(default)]
    addr_info: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IpAddrInfo {
    family: Option<String>,
    local: Option<String>,
    prefixlen: Option<u8>,
    scope: Option<String>,
    valid_life_time: Option<RawLifetime>,
    tentative: bool,
    deprecated: bool,
    dadfailed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLifetime {
    Seconds(u64),
    Text(String),
}

impl RawLifetime {
    fn resolve(&self) -> Option<Lifetime> {
        match self {
            RawLifetime::Seconds(secs) => Some(Lifetime::from_secs(*secs)),
            RawLifetime::Text(text) => text.parse().ok(),
        }
    }
}

/// Parse the JSON listing produced by `ip -6 -json addr show ...`.
///
/// Returns the well-formed IPv6 records in the order they were reported,
/// across all interfaces in the listing. Private addresses are *not* removed
/// here; that is [`crate::select`]'s job.
pub fn parse_ip_json(json: &str) -> Result<Vec<AddressRecord>, PrefixError> {
    // `ip` prints nothing at all when the device has no matching address.
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }

    let links: Vec<IpLink> = serde_json::from_str(json)?;
    let mut records = Vec::new();

    for link in links {
        let ifname = link.ifname.as_deref().unwrap_or("?");
        for entry in link.addr_info {
            match to_record(entry) {
                Some(record) => records.push(record),
                None => tracing::debug!(interface = ifname, "skipping malformed addr_info entry"),
            }
        }
    }

    Ok(records)
}

fn to_record(entry: Value) -> Option<AddressRecord> {
    let info: IpAddrInfo = serde_json::from_value(entry).ok()?;

    if info.family.as_deref().is_some_and(|f| f != "inet6") {
        return None;
    }

    let local: Ipv6Addr = info.local.as_deref()?.parse().ok()?;
    let address = Ipv6Net::new(local, info.prefixlen?).ok()?;
    let valid_lifetime = info.valid_life_time.as_ref()?.resolve()?;

    Some(AddressRecord {
        address,
        scope: info.scope.unwrap_or_default(),
        valid_lifetime,
        tentative: info.tentative,
        deprecated: info.deprecated,
        dad_failed: info.dadfailed,
    })
}
