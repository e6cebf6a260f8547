//! `template-sync.yml`: per-template sync configuration.
//!
//! ```yaml
//! dependents:
//!   - "service-*"
//!   - "!service-legacy"
//! additional:
//!   - "docs-site"
//! files:
//!   - "!.github/workflows/release.yml"
//!   - .github/dependabot.template.yml: .github/dependabot.yml
//! commit:
//!   prefix: "chore(template): sync with"
//!   skip_ci: true
//! scan:
//!   concurrency: 4
//!   on_error: skip
//! ```
//!
//! Every key is optional. A missing file yields [`SyncConfig::default`]; a
//! file that exists but does not parse fails the run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{config_io_err, ConfigError};
use crate::types::RepoSlug;

/// Workspace-relative location used when no explicit path is given.
pub const DEFAULT_CONFIG_PATH: &str = ".github/template-sync.yml";

const DEFAULT_COMMIT_PREFIX: &str = "chore(template): sync with";
const SKIP_CI_MARKER: &str = "[skip ci]";

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Root of `template-sync.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Filters applied to repositories generated from this template.
    pub dependents: Vec<String>,
    /// Repositories synced regardless of their template, selected by name.
    pub additional: Vec<String>,
    /// Exclusions (`!pattern`) and remappings (`source: logical`).
    pub files: Vec<FileEntry>,
    pub commit: CommitConfig,
    pub scan: ScanConfig,
    pub report: ReportConfig,
}

/// One item of the `files` list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FileEntry {
    /// A path or glob; a leading `!` excludes matching files.
    Path(String),
    /// `source path -> logical sync path`.
    Remap(BTreeMap<String, String>),
}

/// Commit message composition for push mode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommitConfig {
    pub prefix: String,
    pub suffix: Option<String>,
    /// Append `[skip ci]` so target workflows don't run on the sync commit.
    pub skip_ci: bool,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_COMMIT_PREFIX.to_string(),
            suffix: None,
            skip_ci: false,
        }
    }
}

impl CommitConfig {
    /// `<prefix> <owner>/<repo>[ <suffix>][ [skip ci]]`
    pub fn message(&self, template: &RepoSlug) -> String {
        let mut message = format!("{} {}", self.prefix.trim_end(), template.full_name());
        if let Some(suffix) = self.suffix.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            message.push(' ');
            message.push_str(suffix);
        }
        if self.skip_ci {
            message.push(' ');
            message.push_str(SKIP_CI_MARKER);
        }
        message
    }
}

/// What the scanner does with a remote fetch that failed for a reason other
/// than "not found".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FetchErrorPolicy {
    /// Leave the path out of this run's changeset.
    #[default]
    Skip,
    /// Treat the remote file as absent.
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Repositories fetched in parallel.
    pub concurrency: usize,
    pub on_error: FetchErrorPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            on_error: FetchErrorPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Workspace-relative tera template replacing the embedded report layout.
    pub template: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load the config at `workspace/path` (or the default location).
///
/// Returns the default config when the file is absent, and
/// `ConfigError::Parse` (with path + line context) when it is malformed.
pub fn load_at(workspace: &Path, path: Option<&Path>) -> Result<SyncConfig, ConfigError> {
    let path = workspace.join(path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH)));
    if !path.exists() {
        warn!("no config file found at {}, using defaults", path.display());
        return Ok(SyncConfig::default());
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| config_io_err(&path, e))?;
    let config = parse(&contents).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    debug!("config loaded from {}: {config:?}", path.display());
    Ok(config)
}

/// Parse config YAML. An empty document is the default config.
pub fn parse(contents: &str) -> Result<SyncConfig, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(SyncConfig::default());
    }
    serde_yaml::from_str(contents)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
