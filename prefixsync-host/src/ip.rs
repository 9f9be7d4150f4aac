//! Global address query via iproute2.

use prefixsync_core::{address::parse_ip_json, AddressRecord, InterfaceName};

use crate::error::HostError;
use crate::runner::{command_line, CommandRunner};

pub const IP_TOOL: &str = "ip";

/// Arguments for listing global, non-tentative IPv6 addresses on `interface`.
pub fn query_args(interface: &InterfaceName) -> [&str; 9] {
    [
        "-6",
        "-json",
        "addr",
        "show",
        "dev",
        interface.as_str(),
        "scope",
        "global",
        "-tentative",
    ]
}

/// List the global IPv6 addresses reported for `interface`.
///
/// A missing `ip` binary surfaces as [`HostError::ToolMissing`]; every other
/// failure (nonzero exit, timeout, unparseable output) as
/// [`HostError::QueryFailed`].
pub fn query_global_addresses<R>(
    runner: &R,
    interface: &InterfaceName,
) -> Result<Vec<AddressRecord>, HostError>
where
    R: CommandRunner + ?Sized,
{
    let args = query_args(interface);
    let command = command_line(IP_TOOL, &args);

    let output = match runner.run(IP_TOOL, &args) {
        Ok(output) => output,
        Err(err @ HostError::ToolMissing { .. }) => return Err(err),
        Err(err) => {
            return Err(HostError::QueryFailed {
                command,
                reason: err.to_string(),
            })
        }
    };

    if !output.success() {
        return Err(HostError::QueryFailed {
            command,
            reason: format!("status {}: {}", output.status_label(), output.stderr),
        });
    }

    let records = parse_ip_json(&output.stdout).map_err(|e| HostError::QueryFailed {
        command,
        reason: e.to_string(),
    })?;
    tracing::info!(interface = %interface, count = records.len(), "queried global addresses");
    Ok(records)
}
