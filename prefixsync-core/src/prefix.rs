//! Prefix arithmetic: supernet comparison and last-subnet carving.

use ipnet::Ipv6Net;

use crate::error::PrefixError;

/// Whether the configured CIDR belongs to the observed host prefix.
///
/// The daemon stores a narrower subnet carved out of the host prefix, so the
/// configured network is widened to the observed prefix length before
/// comparing. A configured network that is already wider than the observed one
/// never matches.
pub fn same_prefix(configured: &Ipv6Net, observed: &Ipv6Net) -> bool {
    if configured.prefix_len() < observed.prefix_len() {
        return false;
    }
    Ipv6Net::new(configured.network(), observed.prefix_len())
        .map(|supernet| supernet.trunc() == observed.trunc())
        .unwrap_or(false)
}

/// The last `/subnet_len` subnet inside `network`.
///
/// When `subnet_len` equals the network's own prefix length the result is the
/// network itself.
pub fn last_subnet(network: &Ipv6Net, subnet_len: u8) -> Result<Ipv6Net, PrefixError> {
    let out_of_range = || PrefixError::SubnetOutOfRange {
        prefix_len: network.prefix_len(),
        subnet_len,
    };
    if subnet_len < network.prefix_len() {
        return Err(out_of_range());
    }
    Ipv6Net::new(network.broadcast(), subnet_len)
        .map(|subnet| subnet.trunc())
        .map_err(|_| out_of_range())
}
