//! Error types for reposync-sync.

use thiserror::Error;

use reposync_core::{CollectError, ConfigError, PlatformError};
use reposync_renderer::RenderError;

/// Run-level failures. Anything below the repository level is recovered
/// inside the stage that hit it and never surfaces here.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A platform call the whole run depends on failed.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The local snapshot could not be read.
    #[error("collect error: {0}")]
    Collect(#[from] CollectError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Pull-request mode without a pull request to comment on.
    #[error("event '{event}' requires a pull request number")]
    MissingPullRequest { event: String },
}
