//! prefixsync core library — address records, candidate selection, prefix math.
//!
//! Everything in this crate is pure: no processes are spawned and no files are
//! touched.
//!
//! - [`types`] — interface names, lifetimes, address records
//! - [`address`] — parsing of `ip -6 -json addr show` output
//! - [`select`] — candidate filtering and preferred-network selection
//! - [`prefix`] — supernet comparison and last-subnet carving
//! - [`error`] — [`PrefixError`]

pub mod address;
pub mod error;
pub mod prefix;
pub mod select;
pub mod types;

pub use error::PrefixError;
pub use types::{AddressRecord, InterfaceName, Lifetime};
