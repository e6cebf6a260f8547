//! Serializable view of a changeset handed to the report template.

use serde::Serialize;

use reposync_core::{Changeset, TrackedFiles};

use crate::diff::unified_diff;
use crate::error::RenderError;

/// Top-level template context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportContext {
    pub header: String,
    /// Owner of the target repositories, used to link each section.
    pub owner: String,
    pub file_count: usize,
    pub file_noun: &'static str,
    pub repo_count: usize,
    pub repo_noun: &'static str,
    pub repositories: Vec<RepoSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoSection {
    pub name: String,
    pub files: Vec<FileSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSection {
    pub path: String,
    /// `true` when the target repository does not have the file yet.
    pub created: bool,
    pub patch: String,
}

impl ReportContext {
    /// Build the context in changeset order, diffing remote against tracked
    /// content for every path.
    pub fn build(
        header: &str,
        owner: &str,
        changeset: &Changeset,
        tracked: &TrackedFiles,
    ) -> Result<Self, RenderError> {
        let mut repositories = Vec::with_capacity(changeset.len());
        for entry in changeset {
            let mut files = Vec::with_capacity(entry.files.len());
            for (path, remote) in &entry.files {
                let local = tracked.get(path).ok_or_else(|| RenderError::MissingTracked {
                    repo: entry.repo.to_string(),
                    path: path.clone(),
                })?;
                let patch = if remote.is_absent() && local.is_empty() {
                    format!("new empty file b/{}\n", path.trim_start_matches('/'))
                } else {
                    unified_diff(path, remote.bytes(), local)
                };
                files.push(FileSection {
                    path: path.clone(),
                    created: remote.is_absent(),
                    patch,
                });
            }
            repositories.push(RepoSection {
                name: entry.repo.to_string(),
                files,
            });
        }

        let file_count = changeset.file_count();
        let repo_count = changeset.len();
        Ok(Self {
            header: header.to_string(),
            owner: owner.to_string(),
            file_count,
            file_noun: if file_count == 1 { "file" } else { "files" },
            repo_count,
            repo_noun: if repo_count == 1 { "repository" } else { "repositories" },
            repositories,
        })
    }
}
