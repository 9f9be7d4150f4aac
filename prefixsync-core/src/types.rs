//! Domain types shared by every prefixsync crate.

use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

use ipnet::Ipv6Net;

use crate::error::PrefixError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed, non-empty host interface name (e.g. `eth0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterfaceName(String);

impl InterfaceName {
    pub fn new(name: impl Into<String>) -> Result<Self, PrefixError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PrefixError::EmptyInterfaceName);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InterfaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for InterfaceName {
    type Err = PrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// Lifetime
// ---------------------------------------------------------------------------

/// iproute2 reports an infinite lifetime as `u32::MAX` in JSON mode.
pub const INFINITE_LIFETIME: u64 = u32::MAX as u64;

/// Validity lifetime of an address.
///
/// `Forever` orders above every finite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lifetime {
    Seconds(u32),
    Forever,
}

impl Lifetime {
    pub fn from_secs(secs: u64) -> Self {
        if secs >= INFINITE_LIFETIME {
            return Lifetime::Forever;
        }
        u32::try_from(secs).map_or(Lifetime::Forever, Lifetime::Seconds)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Seconds(secs) => write!(f, "{secs}sec"),
            Lifetime::Forever => write!(f, "forever"),
        }
    }
}

impl FromStr for Lifetime {
    type Err = String;

    /// Accepts `forever`, a bare integer, or the text-mode `3600sec` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("forever") {
            return Ok(Lifetime::Forever);
        }
        let digits = s.strip_suffix("sec").unwrap_or(s);
        digits
            .parse::<u64>()
            .map(Lifetime::from_secs)
            .map_err(|_| format!("invalid lifetime '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Address record
// ---------------------------------------------------------------------------

/// One address entry reported for an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRecord {
    /// Local address together with its on-link prefix length (host bits kept).
    pub address: Ipv6Net,
    pub scope: String,
    pub valid_lifetime: Lifetime,
    pub tentative: bool,
    pub deprecated: bool,
    pub dad_failed: bool,
}

impl AddressRecord {
    /// A plain global address with no flags set.
    pub fn global(address: Ipv6Net, valid_lifetime: Lifetime) -> Self {
        Self {
            address,
            scope: "global".to_string(),
            valid_lifetime,
            tentative: false,
            deprecated: false,
            dad_failed: false,
        }
    }

    pub fn local(&self) -> Ipv6Addr {
        self.address.addr()
    }

    /// The network this address lives in, host bits cleared.
    pub fn network(&self) -> Ipv6Net {
        self.address.trunc()
    }
}

impl fmt::Display for AddressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} scope {} valid_lft {}",
            self.address, self.scope, self.valid_lifetime
        )
    }
}
