//! Service manager integration (systemd).

use crate::error::HostError;
use crate::runner::CommandRunner;

pub const SYSTEMCTL: &str = "systemctl";

/// Unit restarted when the prefix changes.
pub const DEFAULT_SERVICE: &str = "docker";

/// Restart `service` once via `systemctl restart`. No retries.
///
/// Every failure mode, including a missing `systemctl`, is reported as
/// [`HostError::RestartFailed`].
pub fn restart_service<R>(runner: &R, service: &str) -> Result<(), HostError>
where
    R: CommandRunner + ?Sized,
{
    let restart_failed = |reason: String| HostError::RestartFailed {
        service: service.to_string(),
        reason,
    };

    let output = runner
        .run(SYSTEMCTL, &["restart", service])
        .map_err(|e| restart_failed(e.to_string()))?;

    if !output.success() {
        let detail = if output.stderr.is_empty() {
            output.stdout.trim().to_string()
        } else {
            output.stderr.clone()
        };
        return Err(restart_failed(format!(
            "systemctl exited with status {}: {detail}",
            output.status_label()
        )));
    }

    tracing::info!(service, "service restarted");
    Ok(())
}
