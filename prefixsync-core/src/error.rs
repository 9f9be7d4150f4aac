//! Error types for prefixsync-core.

use thiserror::Error;

/// All errors that can arise from address parsing and prefix arithmetic.
#[derive(Debug, Error)]
pub enum PrefixError {
    /// The address listing was not a JSON array of interfaces.
    #[error("malformed address listing: {0}")]
    MalformedListing(#[from] serde_json::Error),

    /// Every reported address was filtered out (private, tentative, malformed).
    #[error("no usable global IPv6 address found")]
    NoUsableAddress,

    /// The requested container subnet is wider than the host prefix.
    #[error("cannot carve a /{subnet_len} subnet out of a /{prefix_len} prefix")]
    SubnetOutOfRange { prefix_len: u8, subnet_len: u8 },

    /// An interface name was empty.
    #[error("interface name must not be empty")]
    EmptyInterfaceName,
}
