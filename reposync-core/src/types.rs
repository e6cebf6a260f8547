//! Domain types shared by every stage of a sync run.
//!
//! Everything here is built once per run and never mutated afterwards: the
//! [`TrackedFiles`] snapshot and the [`Changeset`] are shared by reference
//! between the scanner, the push executor and the report renderer.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A repository name, unique within its owner.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RepoName(pub String);

impl RepoName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepoName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepoName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A fully qualified `owner/name` repository identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// `owner/name`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoSlug {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(format!("expected 'owner/name', got '{s}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Repository metadata
// ---------------------------------------------------------------------------

/// Whether a repository owner is a user or an organization. Decides which
/// listing endpoint enumerates its repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnerKind {
    #[default]
    User,
    Organization,
}

/// Remote repository metadata as reported by the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryMeta {
    pub name: RepoName,
    pub owner: String,
    pub owner_kind: OwnerKind,
    pub archived: bool,
    pub is_template: bool,
    /// `owner/name` of the template this repository was generated from.
    pub template_full_name: Option<String>,
    pub default_branch: String,
}

/// One repository selected by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRepository {
    pub name: RepoName,
    /// Declares the invoking repository as its template.
    pub dependent: bool,
    /// Selected by the `additional` patterns.
    pub additional: bool,
}

// ---------------------------------------------------------------------------
// Tracked files
// ---------------------------------------------------------------------------

/// The local snapshot: logical sync path -> file bytes, ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedFiles(BTreeMap<String, Vec<u8>>);

impl TrackedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.0.insert(path.into(), content.into());
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.0.get(path).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<P: Into<String>, C: Into<Vec<u8>>> FromIterator<(P, C)> for TrackedFiles {
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(p, c)| (p.into(), c.into()))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Remote state & changeset
// ---------------------------------------------------------------------------

/// What a target repository currently holds at a tracked path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteFile {
    Absent,
    Present(Vec<u8>),
}

impl RemoteFile {
    /// Remote bytes; an absent file reads as the empty buffer.
    pub fn bytes(&self) -> &[u8] {
        match self {
            RemoteFile::Absent => &[],
            RemoteFile::Present(content) => content,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, RemoteFile::Absent)
    }
}

/// Differing paths for one repository. Never empty inside a [`Changeset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoChanges {
    pub repo: RepoName,
    pub files: BTreeMap<String, RemoteFile>,
}

/// Per-run mapping of repositories to the files that differ from the
/// snapshot, in resolver order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    entries: Vec<RepoChanges>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the differing paths of `repo`. A repository with no differing
    /// paths is not recorded; returns whether an entry was added.
    pub fn insert(&mut self, repo: RepoName, files: BTreeMap<String, RemoteFile>) -> bool {
        if files.is_empty() {
            return false;
        }
        self.entries.push(RepoChanges { repo, files });
        true
    }

    pub fn get(&self, repo: &str) -> Option<&BTreeMap<String, RemoteFile>> {
        self.entries
            .iter()
            .find(|e| e.repo.as_str() == repo)
            .map(|e| &e.files)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RepoChanges> {
        self.entries.iter()
    }

    /// Number of repositories with at least one differing path.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total differing paths across all repositories.
    pub fn file_count(&self) -> usize {
        self.entries.iter().map(|e| e.files.len()).sum()
    }
}

impl<'a> IntoIterator for &'a Changeset {
    type Item = &'a RepoChanges;
    type IntoIter = std::slice::Iter<'a, RepoChanges>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl RepoChanges {
    pub fn paths(&self) -> btree_map::Keys<'_, String, RemoteFile> {
        self.files.keys()
    }
}

// ---------------------------------------------------------------------------
// Run context
// ---------------------------------------------------------------------------

/// The workflow event that triggered a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Schedule,
    WorkflowDispatch,
    RepositoryDispatch,
    PullRequest,
    PullRequestTarget,
    Release,
    WorkflowRun,
    Push,
    Other(String),
}

impl EventKind {
    pub fn parse(name: &str) -> Self {
        match name {
            "schedule" => EventKind::Schedule,
            "workflow_dispatch" => EventKind::WorkflowDispatch,
            "repository_dispatch" => EventKind::RepositoryDispatch,
            "pull_request" => EventKind::PullRequest,
            "pull_request_target" => EventKind::PullRequestTarget,
            "release" => EventKind::Release,
            "workflow_run" => EventKind::WorkflowRun,
            "push" => EventKind::Push,
            other => EventKind::Other(other.to_owned()),
        }
    }

    /// Names of every event a run may be triggered by.
    pub fn allowed_names() -> &'static [&'static str] {
        &[
            "schedule",
            "workflow_dispatch",
            "repository_dispatch",
            "pull_request",
            "pull_request_target",
            "release",
            "workflow_run",
            "push",
        ]
    }

    pub fn is_allowed(&self) -> bool {
        !matches!(self, EventKind::Other(_))
    }

    /// Pull-request events report; everything else pushes.
    pub fn mode(&self) -> RunMode {
        match self {
            EventKind::PullRequest | EventKind::PullRequestTarget => RunMode::PullRequest,
            _ => RunMode::Push,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Schedule => "schedule",
            EventKind::WorkflowDispatch => "workflow_dispatch",
            EventKind::RepositoryDispatch => "repository_dispatch",
            EventKind::PullRequest => "pull_request",
            EventKind::PullRequestTarget => "pull_request_target",
            EventKind::Release => "release",
            EventKind::WorkflowRun => "workflow_run",
            EventKind::Push => "push",
            EventKind::Other(name) => name,
        };
        f.write_str(name)
    }
}

/// How a changeset is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Commit directly to each target's default branch.
    Push,
    /// Post a diff report on the triggering pull request.
    PullRequest,
}

/// Identity of the invoking run, passed explicitly to every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// The template repository the run executes in.
    pub template: RepoSlug,
    pub event: EventKind,
    /// Triggering pull request, required in [`RunMode::PullRequest`].
    pub pull_request: Option<u64>,
    pub dry_run: bool,
}

impl RunContext {
    pub fn owner(&self) -> &str {
        &self.template.owner
    }

    pub fn mode(&self) -> RunMode {
        self.event.mode()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
