//! Candidate filtering and preferred-network selection.
//!
//! A record is a candidate when it is global-scoped, not private, and not
//! flagged tentative, deprecated, or DAD-failed. Among candidates the one with
//! the greatest validity lifetime wins; on a tie the first reported record
//! wins.

use std::net::Ipv6Addr;

use ipnet::Ipv6Net;

use crate::error::PrefixError;
use crate::types::AddressRecord;

/// Whether `addr` is private in the sense that it can never carry a
/// delegated global prefix: unique-local (`fc00::/7`), link-local
/// (`fe80::/10`), loopback, or unspecified.
pub fn is_private(addr: &Ipv6Addr) -> bool {
    let first = addr.segments()[0];
    addr.is_loopback()
        || addr.is_unspecified()
        || (first & 0xfe00) == 0xfc00
        || (first & 0xffc0) == 0xfe80
}

/// Whether `record` may be selected at all.
pub fn is_candidate(record: &AddressRecord) -> bool {
    record.scope == "global"
        && !record.tentative
        && !record.deprecated
        && !record.dad_failed
        && !is_private(&record.local())
}

/// Pick the candidate with the greatest validity lifetime (first wins ties).
pub fn select_preferred(records: &[AddressRecord]) -> Option<&AddressRecord> {
    records
        .iter()
        .filter(|r| is_candidate(r))
        .fold(None, |best: Option<&AddressRecord>, r| match best {
            Some(b) if b.valid_lifetime >= r.valid_lifetime => Some(b),
            _ => Some(r),
        })
}

/// Select the preferred record and return its network, host bits cleared.
pub fn select_preferred_network(records: &[AddressRecord]) -> Result<Ipv6Net, PrefixError> {
    let chosen = select_preferred(records).ok_or(PrefixError::NoUsableAddress)?;
    tracing::info!(address = %chosen.address, lifetime = %chosen.valid_lifetime, "selected address");
    Ok(chosen.network())
}
