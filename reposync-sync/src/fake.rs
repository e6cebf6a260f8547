//! In-memory [`Platform`] for engine tests: scripted repositories, files,
//! failures and comments, with every call recorded.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use reposync_core::{
    Comment, CommitTip, FetchOutcome, OwnerKind, Platform, PlatformError, RepoName,
    RepositoryMeta, TreeEntry,
};

pub(crate) const OWNER: &str = "acme";
pub(crate) const TEMPLATE: &str = "template";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedCommit {
    pub repo: String,
    pub message: String,
    pub tree: String,
    pub parents: Vec<String>,
    pub entries: Vec<TreeEntry>,
}

#[derive(Default)]
struct State {
    repos: Vec<RepositoryMeta>,
    files: BTreeMap<(String, String), FetchOutcome>,
    failing: BTreeSet<String>,
    comments: Vec<Comment>,
    calls: Vec<String>,
    pending_trees: BTreeMap<String, Vec<TreeEntry>>,
    commits: Vec<RecordedCommit>,
}

#[derive(Default)]
pub(crate) struct FakePlatform {
    state: Mutex<State>,
}

/// Non-archived user-owned repository metadata under [`OWNER`].
pub(crate) fn meta(name: &str) -> RepositoryMeta {
    RepositoryMeta {
        name: RepoName::from(name),
        owner: OWNER.to_string(),
        owner_kind: OwnerKind::User,
        archived: false,
        is_template: false,
        template_full_name: None,
        default_branch: "main".to_string(),
    }
}

/// A repository generated from `acme/template`.
pub(crate) fn dependent(name: &str) -> RepositoryMeta {
    RepositoryMeta {
        template_full_name: Some(format!("{OWNER}/{TEMPLATE}")),
        ..meta(name)
    }
}

impl FakePlatform {
    pub fn new() -> Self {
        let template = RepositoryMeta {
            is_template: true,
            ..meta(TEMPLATE)
        };
        Self::default().with_repo(template)
    }

    pub fn with_repo(self, meta: RepositoryMeta) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.repos.retain(|r| r.name != meta.name);
            state.repos.push(meta);
        }
        self
    }

    pub fn with_file(self, repo: &str, path: &str, content: &str) -> Self {
        self.with_fetch(
            repo,
            path,
            FetchOutcome::Found {
                content: content.as_bytes().to_vec(),
                sha: format!("blob-{repo}-{path}"),
            },
        )
    }

    pub fn with_fetch(self, repo: &str, path: &str, outcome: FetchOutcome) -> Self {
        self.state
            .lock()
            .unwrap()
            .files
            .insert((repo.to_string(), path.to_string()), outcome);
        self
    }

    /// Every metadata lookup for `repo` fails with a 500.
    pub fn failing_repository(self, repo: &str) -> Self {
        self.state.lock().unwrap().failing.insert(repo.to_string());
        self
    }

    pub fn with_comment(self, id: u64, body: &str) -> Self {
        self.state.lock().unwrap().comments.push(Comment {
            id,
            body: body.to_string(),
        });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn commits(&self) -> Vec<RecordedCommit> {
        self.state.lock().unwrap().commits.clone()
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.state.lock().unwrap().comments.clone()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl Platform for FakePlatform {
    fn repository(&self, owner: &str, repo: &str) -> Result<RepositoryMeta, PlatformError> {
        self.record(format!("repository {repo}"));
        let state = self.state.lock().unwrap();
        if state.failing.contains(repo) {
            return Err(PlatformError::Status {
                endpoint: format!("GET /repos/{owner}/{repo}"),
                status: 500,
                message: "Server Error".into(),
            });
        }
        state
            .repos
            .iter()
            .find(|r| r.name.as_str() == repo)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound {
                endpoint: format!("GET /repos/{owner}/{repo}"),
            })
    }

    fn list_repositories(
        &self,
        _owner: &str,
        _kind: OwnerKind,
    ) -> Result<Vec<RepositoryMeta>, PlatformError> {
        self.record("list_repositories".into());
        Ok(self.state.lock().unwrap().repos.clone())
    }

    fn fetch_file(&self, _owner: &str, repo: &str, path: &str) -> FetchOutcome {
        self.record(format!("fetch_file {repo}:{path}"));
        self.state
            .lock()
            .unwrap()
            .files
            .get(&(repo.to_string(), path.to_string()))
            .cloned()
            .unwrap_or(FetchOutcome::NotFound)
    }

    fn branch_tip(
        &self,
        _owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<CommitTip, PlatformError> {
        self.record(format!("branch_tip {repo} {branch}"));
        Ok(CommitTip {
            sha: format!("tip-{repo}"),
            tree_sha: format!("tree-{repo}"),
        })
    }

    fn create_tree(
        &self,
        _owner: &str,
        repo: &str,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String, PlatformError> {
        self.record(format!("create_tree {repo} {base_tree}"));
        self.state
            .lock()
            .unwrap()
            .pending_trees
            .insert(repo.to_string(), entries.to_vec());
        Ok(format!("newtree-{repo}"))
    }

    fn create_commit(
        &self,
        _owner: &str,
        repo: &str,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String, PlatformError> {
        self.record(format!("create_commit {repo}"));
        let mut state = self.state.lock().unwrap();
        let entries = state.pending_trees.remove(repo).unwrap_or_default();
        state.commits.push(RecordedCommit {
            repo: repo.to_string(),
            message: message.to_string(),
            tree: tree.to_string(),
            parents: parents.to_vec(),
            entries,
        });
        Ok(format!("commit-{repo}"))
    }

    fn update_ref(
        &self,
        _owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
    ) -> Result<(), PlatformError> {
        self.record(format!("update_ref {repo} {reference} {sha}"));
        Ok(())
    }

    fn list_comments(
        &self,
        _owner: &str,
        _repo: &str,
        issue: u64,
    ) -> Result<Vec<Comment>, PlatformError> {
        self.record(format!("list_comments {issue}"));
        Ok(self.state.lock().unwrap().comments.clone())
    }

    fn create_comment(
        &self,
        _owner: &str,
        _repo: &str,
        issue: u64,
        body: &str,
    ) -> Result<Comment, PlatformError> {
        self.record(format!("create_comment {issue}"));
        let mut state = self.state.lock().unwrap();
        let id = state.comments.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let comment = Comment {
            id,
            body: body.to_string(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    fn update_comment(
        &self,
        _owner: &str,
        _repo: &str,
        comment_id: u64,
        body: &str,
    ) -> Result<Comment, PlatformError> {
        self.record(format!("update_comment {comment_id}"));
        let mut state = self.state.lock().unwrap();
        let comment = state
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| PlatformError::NotFound {
                endpoint: format!("PATCH /issues/comments/{comment_id}"),
            })?;
        comment.body = body.to_string();
        Ok(comment.clone())
    }
}
