//! Host integration: external command execution, address query, service restart.

mod error;
pub mod ip;
pub mod runner;
pub mod service;

pub use error::HostError;
pub use ip::query_global_addresses;
pub use runner::{CommandOutput, CommandRunner, SystemRunner, DEFAULT_COMMAND_TIMEOUT};
pub use service::{restart_service, DEFAULT_SERVICE};
