//! Error types for reposync-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from report rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Filesystem error while loading a template override.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    /// The changeset names a path the snapshot does not contain.
    #[error("changeset path '{path}' for '{repo}' is not in the tracked snapshot")]
    MissingTracked { repo: String, path: String },
}
