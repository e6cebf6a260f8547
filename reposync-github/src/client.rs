//! Blocking GitHub REST client implementing [`Platform`].

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use reposync_core::{
    Comment, CommitTip, FetchOutcome, OwnerKind, Platform, PlatformError, RepositoryMeta,
    TreeEntry,
};

use crate::payload::{
    decode_base64, encode_base64, CommentPayload, CommitPayload, ContentPayload, ErrorBody,
    RepoPayload, ShaRef,
};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("reposync/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: u32 = 100;
const TIMEOUT: Duration = Duration::from_secs(30);
/// Below this many remaining calls every response logs a warning.
const RATE_LIMIT_WARN: u64 = 50;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct GitHubClient {
    agent: ureq::Agent,
    api_url: String,
    token: String,
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(TIMEOUT)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn send(
        &self,
        method: &str,
        url: &str,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<ureq::Response, PlatformError> {
        debug!("{endpoint}");
        let request = self
            .agent
            .request(method, url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", ACCEPT)
            .set("X-GitHub-Api-Version", API_VERSION);
        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };
        let response = result.map_err(|e| map_error(endpoint, e))?;
        note_rate_limit(&response);
        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PlatformError> {
        let endpoint = format!("GET {path}");
        let response = self.send("GET", &self.url(path), &endpoint, None)?;
        decode(&endpoint, response)
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: Value,
    ) -> Result<T, PlatformError> {
        let endpoint = format!("{method} {path}");
        let response = self.send(method, &self.url(path), &endpoint, Some(&body))?;
        decode(&endpoint, response)
    }

    /// Follow `Link: rel="next"` until the last page.
    fn get_paginated<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, PlatformError> {
        let endpoint = format!("GET {path}");
        let mut url = self.url(path);
        let mut items = Vec::new();
        loop {
            let response = self.send("GET", &url, &endpoint, None)?;
            let next = response.header("link").and_then(next_link);
            let page: Vec<T> = decode(&endpoint, response)?;
            items.extend(page);
            match next {
                Some(next) => url = next,
                None => break,
            }
        }
        Ok(items)
    }

    fn fetch_blob(&self, owner: &str, repo: &str, sha: &str) -> FetchOutcome {
        let path = format!("/repos/{owner}/{repo}/git/blobs/{sha}");
        match self.get_json::<ContentPayload>(&path) {
            Ok(blob) => match blob.content.as_deref().map(decode_base64) {
                Some(Ok(content)) => FetchOutcome::Found {
                    content,
                    sha: blob.sha,
                },
                Some(Err(e)) => FetchOutcome::Failed(format!("GET {path}: {e}")),
                None => FetchOutcome::Failed(format!("GET {path}: blob has no content")),
            },
            Err(e) if e.is_not_found() => FetchOutcome::NotFound,
            Err(e) => FetchOutcome::Failed(e.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

impl Platform for GitHubClient {
    fn repository(&self, owner: &str, repo: &str) -> Result<RepositoryMeta, PlatformError> {
        let payload: RepoPayload = self.get_json(&format!("/repos/{owner}/{repo}"))?;
        Ok(payload.into())
    }

    fn list_repositories(
        &self,
        owner: &str,
        kind: OwnerKind,
    ) -> Result<Vec<RepositoryMeta>, PlatformError> {
        let path = match kind {
            OwnerKind::User => format!("/users/{owner}/repos?per_page={PER_PAGE}"),
            OwnerKind::Organization => format!("/orgs/{owner}/repos?per_page={PER_PAGE}"),
        };
        let repos: Vec<RepoPayload> = self.get_paginated(&path)?;
        Ok(repos.into_iter().map(RepositoryMeta::from).collect())
    }

    fn fetch_file(&self, owner: &str, repo: &str, path: &str) -> FetchOutcome {
        let endpoint = format!(
            "/repos/{owner}/{repo}/contents/{}",
            encode_path(path.trim_start_matches('/'))
        );
        let payload = match self.get_json::<ContentPayload>(&endpoint) {
            Ok(payload) => payload,
            Err(e) if e.is_not_found() => return FetchOutcome::NotFound,
            Err(e) => return FetchOutcome::Failed(e.to_string()),
        };
        match payload.inline() {
            Some(Ok(content)) => FetchOutcome::Found {
                content,
                sha: payload.sha,
            },
            Some(Err(e)) => FetchOutcome::Failed(format!("GET {endpoint}: {e}")),
            None => self.fetch_blob(owner, repo, &payload.sha),
        }
    }

    fn branch_tip(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<CommitTip, PlatformError> {
        let commit: CommitPayload =
            self.get_json(&format!("/repos/{owner}/{repo}/commits/{}", encode_path(branch)))?;
        Ok(CommitTip {
            sha: commit.sha,
            tree_sha: commit.commit.tree.sha,
        })
    }

    fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String, PlatformError> {
        let mut tree = Vec::with_capacity(entries.len());
        for entry in entries {
            let path = entry.path.trim_start_matches('/');
            let item = match std::str::from_utf8(&entry.content) {
                Ok(text) => json!({
                    "path": path,
                    "mode": entry.mode,
                    "type": "blob",
                    "content": text,
                }),
                Err(_) => {
                    let blob: ShaRef = self.send_json(
                        "POST",
                        &format!("/repos/{owner}/{repo}/git/blobs"),
                        json!({ "content": encode_base64(&entry.content), "encoding": "base64" }),
                    )?;
                    json!({ "path": path, "mode": entry.mode, "type": "blob", "sha": blob.sha })
                }
            };
            tree.push(item);
        }

        let created: ShaRef = self.send_json(
            "POST",
            &format!("/repos/{owner}/{repo}/git/trees"),
            json!({ "base_tree": base_tree, "tree": tree }),
        )?;
        Ok(created.sha)
    }

    fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String, PlatformError> {
        let created: ShaRef = self.send_json(
            "POST",
            &format!("/repos/{owner}/{repo}/git/commits"),
            json!({ "message": message, "tree": tree, "parents": parents }),
        )?;
        Ok(created.sha)
    }

    fn update_ref(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
    ) -> Result<(), PlatformError> {
        let _: Value = self.send_json(
            "PATCH",
            &format!("/repos/{owner}/{repo}/git/refs/{}", encode_path(reference)),
            json!({ "sha": sha, "force": false }),
        )?;
        Ok(())
    }

    fn list_comments(
        &self,
        owner: &str,
        repo: &str,
        issue: u64,
    ) -> Result<Vec<Comment>, PlatformError> {
        let comments: Vec<CommentPayload> = self.get_paginated(&format!(
            "/repos/{owner}/{repo}/issues/{issue}/comments?per_page={PER_PAGE}"
        ))?;
        Ok(comments.into_iter().map(into_comment).collect())
    }

    fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        issue: u64,
        body: &str,
    ) -> Result<Comment, PlatformError> {
        let created: CommentPayload = self.send_json(
            "POST",
            &format!("/repos/{owner}/{repo}/issues/{issue}/comments"),
            json!({ "body": body }),
        )?;
        Ok(into_comment(created))
    }

    fn update_comment(
        &self,
        owner: &str,
        repo: &str,
        comment_id: u64,
        body: &str,
    ) -> Result<Comment, PlatformError> {
        let updated: CommentPayload = self.send_json(
            "PATCH",
            &format!("/repos/{owner}/{repo}/issues/comments/{comment_id}"),
            json!({ "body": body }),
        )?;
        Ok(into_comment(updated))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn into_comment(payload: CommentPayload) -> Comment {
    Comment {
        id: payload.id,
        body: payload.body.unwrap_or_default(),
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, response: ureq::Response) -> Result<T, PlatformError> {
    response.into_json().map_err(|e| PlatformError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

fn map_error(endpoint: &str, err: ureq::Error) -> PlatformError {
    match err {
        ureq::Error::Status(404, _) => PlatformError::NotFound {
            endpoint: endpoint.to_string(),
        },
        ureq::Error::Status(status, response) => {
            let message = response
                .into_string()
                .ok()
                .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
                .map(|b| b.message)
                .unwrap_or_default();
            PlatformError::Status {
                endpoint: endpoint.to_string(),
                status,
                message,
            }
        }
        ureq::Error::Transport(transport) => PlatformError::Transport {
            endpoint: endpoint.to_string(),
            message: transport.to_string(),
        },
    }
}

fn note_rate_limit(response: &ureq::Response) {
    let remaining = response
        .header("x-ratelimit-remaining")
        .and_then(|v| v.parse::<u64>().ok());
    if let Some(remaining) = remaining {
        if remaining < RATE_LIMIT_WARN {
            let reset = response.header("x-ratelimit-reset").unwrap_or("unknown");
            warn!("GitHub API rate limit low: {remaining} calls left, resets at {reset}");
        }
    }
}

/// URL of the `rel="next"` page in a `Link` header.
pub(crate) fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let (url, params) = part.split_once(';')?;
        let is_next = params.split(';').any(|p| p.trim() == r#"rel="next""#);
        is_next.then(|| {
            url.trim()
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string()
        })
    })
}

/// Percent-encode a repository path, keeping `/` separators.
pub(crate) fn encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
