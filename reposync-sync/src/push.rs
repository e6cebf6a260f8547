//! Push mode: one commit per repository, straight onto the default branch.
//!
//! ## Per-repository protocol
//!
//! 1. Build tree entries (mode `100644`) for every differing path.
//! 2. Dry run → log and stop.
//! 3. Resolve the default branch.
//! 4. Fetch the branch tip (commit SHA + tree SHA).
//! 5. Create a tree layered on the tip's tree with only the changed entries.
//! 6. Create a commit whose single parent is the tip.
//! 7. Fast-forward the branch ref to the new commit.
//!
//! Step 7 is the only externally visible mutation. A failure in 3–7 leaves
//! the repository untouched, is logged, and the next repository proceeds.
//! Repositories are processed one at a time, in changeset order.

use tracing::{debug, info, warn};

use reposync_core::{
    Changeset, CommitConfig, Platform, PlatformError, RepoChanges, RepoName, RunContext,
    TrackedFiles, TreeEntry,
};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What happened to one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    /// The default branch now points at `commit`.
    Updated { commit: String },
    /// Dry run: nothing was written.
    Skipped,
    /// Some step failed; the repository was left as it was.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoResult {
    pub repo: RepoName,
    /// Paths that were (or would have been) written.
    pub paths: Vec<String>,
    pub outcome: RepoOutcome,
}

// ---------------------------------------------------------------------------
// PushExecutor
// ---------------------------------------------------------------------------

pub struct PushExecutor<'a> {
    platform: &'a dyn Platform,
    ctx: &'a RunContext,
    commit: &'a CommitConfig,
}

impl<'a> PushExecutor<'a> {
    pub fn new(platform: &'a dyn Platform, ctx: &'a RunContext, commit: &'a CommitConfig) -> Self {
        Self {
            platform,
            ctx,
            commit,
        }
    }

    /// Apply every entry of `changeset`, returning one result per repository
    /// in changeset order.
    pub fn apply(&self, changeset: &Changeset, tracked: &TrackedFiles) -> Vec<RepoResult> {
        let message = self.commit.message(&self.ctx.template);
        changeset
            .iter()
            .map(|changes| self.apply_repository(changes, tracked, &message))
            .collect()
    }

    fn apply_repository(
        &self,
        changes: &RepoChanges,
        tracked: &TrackedFiles,
        message: &str,
    ) -> RepoResult {
        let repo = &changes.repo;
        let entries = tree_entries(changes, tracked);
        for entry in &entries {
            info!("⚠ {repo}:{} will be updated", entry.path);
        }
        let paths = entries.iter().map(|e| e.path.clone()).collect();

        let outcome = if self.ctx.dry_run {
            info!("[dry-run] {repo}: {} files not pushed", entries.len());
            RepoOutcome::Skipped
        } else {
            match self.push(repo.as_str(), &entries, message) {
                Ok(commit) => {
                    info!("✔ {repo} is updated ({commit})");
                    RepoOutcome::Updated { commit }
                }
                Err(err) => {
                    let reason = err
                        .upstream_message()
                        .map(str::to_owned)
                        .unwrap_or_else(|| err.to_string());
                    warn!("✖ {repo} failed to update: {reason}");
                    RepoOutcome::Failed { reason }
                }
            }
        };

        RepoResult {
            repo: repo.clone(),
            paths,
            outcome,
        }
    }

    /// Steps 3–7. Returns the new commit SHA.
    fn push(&self, repo: &str, entries: &[TreeEntry], message: &str) -> Result<String, PlatformError> {
        let owner = self.ctx.owner();

        let branch = self.platform.repository(owner, repo)?.default_branch;
        debug!("{repo}: default branch: {branch}");

        let tip = self.platform.branch_tip(owner, repo, &branch)?;
        debug!("{repo}: latest commit: {{ sha: {}, tree.sha: {} }}", tip.sha, tip.tree_sha);

        let tree = self.platform.create_tree(owner, repo, &tip.tree_sha, entries)?;
        debug!("{repo}: new tree: {tree}");

        let commit = self
            .platform
            .create_commit(owner, repo, message, &tree, &[tip.sha])?;
        debug!("{repo}: new commit: {commit}");

        self.platform
            .update_ref(owner, repo, &format!("heads/{branch}"), &commit)?;
        Ok(commit)
    }
}

/// Tree entries for the differing paths, with the tracked content.
fn tree_entries(changes: &RepoChanges, tracked: &TrackedFiles) -> Vec<TreeEntry> {
    changes
        .paths()
        .filter_map(|path| match tracked.get(path) {
            Some(content) => Some(TreeEntry::new(path.clone(), content)),
            None => {
                warn!("{}:{path} missing from the tracked snapshot", changes.repo);
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
