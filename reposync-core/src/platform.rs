//! Hosting-platform abstraction.
//!
//! The sync engine only talks to the outside world through [`Platform`]. The
//! GitHub REST client implements it for real runs; tests use an in-memory
//! fake. Every call may block for an arbitrary time and none of them hold
//! state across repositories.

use crate::error::PlatformError;
use crate::types::{OwnerKind, RepositoryMeta};

/// File mode given to every synced blob.
pub const FILE_MODE: &str = "100644";

/// Result of fetching one path from a repository's default branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Found { content: Vec<u8>, sha: String },
    /// The repository has no file at that path.
    NotFound,
    /// Auth, rate-limit, network or decoding failure.
    Failed(String),
}

/// The tip commit of a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitTip {
    pub sha: String,
    pub tree_sha: String,
}

/// A blob to layer on top of a base tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub content: Vec<u8>,
    pub mode: &'static str,
}

impl TreeEntry {
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            mode: FILE_MODE,
        }
    }
}

/// An issue / pull-request comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: u64,
    pub body: String,
}

/// Operations the sync engine needs from the hosting platform.
pub trait Platform: Send + Sync {
    /// Metadata for a single repository.
    fn repository(&self, owner: &str, repo: &str) -> Result<RepositoryMeta, PlatformError>;

    /// Every repository of `owner`, following pagination to the end.
    fn list_repositories(
        &self,
        owner: &str,
        kind: OwnerKind,
    ) -> Result<Vec<RepositoryMeta>, PlatformError>;

    /// Content of `path` on the default branch.
    fn fetch_file(&self, owner: &str, repo: &str, path: &str) -> FetchOutcome;

    fn branch_tip(&self, owner: &str, repo: &str, branch: &str)
        -> Result<CommitTip, PlatformError>;

    /// Create a tree on top of `base_tree`; returns the new tree SHA.
    fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String, PlatformError>;

    /// Create a commit object; returns its SHA.
    fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String, PlatformError>;

    /// Move `reference` (e.g. `heads/main`) to `sha`, fast-forward only.
    fn update_ref(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
    ) -> Result<(), PlatformError>;

    fn list_comments(
        &self,
        owner: &str,
        repo: &str,
        issue: u64,
    ) -> Result<Vec<Comment>, PlatformError>;

    fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        issue: u64,
        body: &str,
    ) -> Result<Comment, PlatformError>;

    fn update_comment(
        &self,
        owner: &str,
        repo: &str,
        comment_id: u64,
        body: &str,
    ) -> Result<Comment, PlatformError>;
}
