//! Response shapes of the GitHub REST endpoints the client calls.

use base64::Engine as _;
use serde::Deserialize;

use reposync_core::{OwnerKind, RepoName, RepositoryMeta};

#[derive(Debug, Deserialize)]
pub(crate) struct RepoPayload {
    pub name: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub is_template: bool,
    #[serde(default)]
    pub template_repository: Option<TemplateRef>,
    #[serde(default)]
    pub default_branch: String,
    pub owner: OwnerPayload,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TemplateRef {
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwnerPayload {
    pub login: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<RepoPayload> for RepositoryMeta {
    fn from(p: RepoPayload) -> Self {
        let owner_kind = match p.owner.kind.as_str() {
            "Organization" => OwnerKind::Organization,
            _ => OwnerKind::User,
        };
        RepositoryMeta {
            name: RepoName::from(p.name),
            owner: p.owner.login,
            owner_kind,
            archived: p.archived,
            is_template: p.is_template,
            template_full_name: p.template_repository.map(|t| t.full_name),
            default_branch: p.default_branch,
        }
    }
}

/// `GET /repos/{owner}/{repo}/contents/{path}` for a file, and
/// `GET /repos/{owner}/{repo}/git/blobs/{sha}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ContentPayload {
    pub sha: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

impl ContentPayload {
    /// Inline content, if the API sent it. Files above 1 MB come back with
    /// `encoding: none` and must be fetched as a blob.
    pub fn inline(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        match (self.encoding.as_deref(), self.content.as_deref()) {
            (Some("base64"), Some(content)) => Some(decode_base64(content)),
            (None, Some("")) | (Some("base64"), None) => Some(Ok(Vec::new())),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitPayload {
    pub sha: String,
    pub commit: CommitInner,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitInner {
    pub tree: ShaRef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShaRef {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentPayload {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}

/// GitHub wraps base64 content at 60 columns.
pub(crate) fn decode_base64(content: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    base64::engine::general_purpose::STANDARD.decode(compact)
}

pub(crate) fn encode_base64(content: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(content)
}
