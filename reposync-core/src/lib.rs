//! reposync core library: domain types, configuration, local snapshot
//! collection, and the hosting-platform abstraction.
//!
//! - [`types`]: repository names, tracked files, changesets, run context
//! - [`config`]: `.github/template-sync.yml` loading
//! - [`files`]: workspace walk producing [`TrackedFiles`]
//! - [`pattern`]: glob matching with `!negation`
//! - [`platform`]: the [`Platform`] trait implemented by API clients
//! - [`error`]: [`ConfigError`], [`CollectError`], [`PlatformError`]

pub mod config;
pub mod error;
pub mod files;
pub mod pattern;
pub mod platform;
pub mod types;

pub use config::{CommitConfig, FetchErrorPolicy, FileEntry, ReportConfig, ScanConfig, SyncConfig};
pub use error::{CollectError, ConfigError, PlatformError};
pub use pattern::PatternSet;
pub use platform::{Comment, CommitTip, FetchOutcome, Platform, TreeEntry, FILE_MODE};
pub use types::{
    Changeset, EventKind, OwnerKind, RemoteFile, RepoChanges, RepoName, RepoSlug,
    RepositoryMeta, RunContext, RunMode, TargetRepository, TrackedFiles,
};
