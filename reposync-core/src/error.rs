//! Error types for reposync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading `template-sync.yml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error: includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A repository or file pattern is not a valid glob.
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Errors from collecting the local file snapshot.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The workspace walker failed (unreadable directory, bad ignore file).
    #[error("workspace walk failed: {0}")]
    Walk(#[from] ignore::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors returned by a [`crate::Platform`] implementation.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The endpoint answered 404.
    #[error("{endpoint}: not found")]
    NotFound { endpoint: String },

    /// Any other non-success status, with the upstream `message` when present.
    #[error("{endpoint} returned {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// Connection, TLS, or timeout failure before a status was received.
    #[error("{endpoint}: transport error: {message}")]
    Transport { endpoint: String, message: String },

    /// The response body did not have the expected shape.
    #[error("{endpoint}: unexpected response: {message}")]
    Decode { endpoint: String, message: String },
}

impl PlatformError {
    /// The message reported by the upstream API, if it sent one.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            PlatformError::Status { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PlatformError::NotFound { .. })
    }
}

pub(crate) fn config_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}

pub(crate) fn collect_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CollectError {
    CollectError::Io {
        path: path.into(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_only_for_status_errors() {
        let status = PlatformError::Status {
            endpoint: "GET /repos/acme/web".into(),
            status: 403,
            message: "Resource not accessible by integration".into(),
        };
        assert_eq!(
            status.upstream_message(),
            Some("Resource not accessible by integration")
        );

        let transport = PlatformError::Transport {
            endpoint: "GET /repos/acme/web".into(),
            message: "connection reset".into(),
        };
        assert_eq!(transport.upstream_message(), None);
    }

    #[test]
    fn empty_upstream_message_is_none() {
        let status = PlatformError::Status {
            endpoint: "PATCH /repos/acme/web/git/refs/heads/main".into(),
            status: 422,
            message: String::new(),
        };
        assert_eq!(status.upstream_message(), None);
        assert!(status.to_string().contains("422"));
    }
}
