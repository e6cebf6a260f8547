//! Local snapshot collection.
//!
//! Walks the template workspace (dotfiles included, `.gitignore` honoured,
//! `.git/` always skipped) and reads every file into [`TrackedFiles`], keyed
//! by its logical sync path. The `files` config refines the walk:
//!
//! - `!pattern` drops matching workspace paths
//! - `source: logical` publishes `source` under a different path
//! - any other string is accepted and adds no restriction

use std::collections::BTreeMap;
use std::path::Path;

use ignore::WalkBuilder;
use tracing::{debug, info};

use crate::config::FileEntry;
use crate::error::{collect_io_err, CollectError};
use crate::pattern::PatternSet;
use crate::types::TrackedFiles;

/// Read the workspace into a snapshot according to `entries`.
pub fn collect(workspace: &Path, entries: &[FileEntry]) -> Result<TrackedFiles, CollectError> {
    let (excludes, remaps) = split_entries(entries)?;

    let walker = WalkBuilder::new(workspace)
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(false)
        .require_git(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| entry.file_name() != ".git")
        .build();

    let mut tracked = TrackedFiles::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        let Some(relative) = relative_path(workspace, entry.path()) else {
            continue;
        };
        if excludes.excludes(&relative) {
            debug!("excluded by config: {relative}");
            continue;
        }

        let content = std::fs::read(entry.path()).map_err(|e| collect_io_err(entry.path(), e))?;
        let logical = remaps.get(&relative).cloned().unwrap_or(relative);
        tracked.insert(logical, content);
    }

    info!("found {} files available to sync", tracked.len());
    if !tracked.is_empty() {
        debug!("tracked paths: {:?}", tracked.paths().collect::<Vec<_>>());
    }
    Ok(tracked)
}

fn split_entries(
    entries: &[FileEntry],
) -> Result<(PatternSet, BTreeMap<String, String>), CollectError> {
    let mut negations = Vec::new();
    let mut remaps = BTreeMap::new();
    for entry in entries {
        match entry {
            FileEntry::Path(path) if path.starts_with('!') => negations.push(path.clone()),
            FileEntry::Path(_) => {}
            FileEntry::Remap(map) => {
                for (source, logical) in map {
                    remaps.insert(normalize(source), normalize(logical));
                }
            }
        }
    }
    Ok((PatternSet::for_paths(&negations)?, remaps))
}

/// Workspace-relative path with `/` separators.
fn relative_path(workspace: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(workspace).ok()?;
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    (!joined.is_empty()).then_some(joined)
}

fn normalize(path: &str) -> String {
    path.trim_start_matches("./").replace('\\', "/")
}
