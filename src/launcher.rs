//! Default outbound collaborators: the OS URI launcher and the log reporter.

use tracing::{error, info};
use url::Url;

use crate::bindings::{ErrorReporter, UriLauncher};
use crate::error::LaunchError;

/// Hands URIs to the desktop's default application (`xdg-open`, `open`,
/// `ShellExecute`) through the `open` crate.
///
/// The child is detached: we only learn whether it could be spawned, never
/// how the target application fared, so the event loop is never held up.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl UriLauncher for SystemLauncher {
    fn launch_default_handler(&self, uri: &Url) -> Result<(), LaunchError> {
        open::that_detached(uri.as_str()).map_err(|source| LaunchError {
            uri: uri.to_string(),
            source,
        })?;
        info!(%uri, "Launched default handler");
        Ok(())
    }
}

/// Reports failures through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, err: &LaunchError) {
        error!(uri = %err.uri, error = %err.source, "Could not launch URI");
    }
}
