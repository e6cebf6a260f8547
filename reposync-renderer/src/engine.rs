//! Tera rendering engine: [`ReportRenderer`] and [`SyncReport`].
//!
//! # Layout
//!
//! ```text
//! ## Template Repository Sync Report
//!
//! > Found 3 files to update in 2 repositories
//!
//! <details><summary>service-a (2)</summary>      one section per repository
//!   <details><summary>path</summary> ```diff```   one section per file
//! ```
//!
//! An empty changeset renders the fixed [`NO_CHANGES`] body. A user template
//! may replace the populated layout; the header is always kept in the body
//! so the comment can be found again.

use std::path::Path;

use tera::{Context, Tera};
use tracing::debug;

use reposync_core::{Changeset, TrackedFiles};

use crate::context::ReportContext;
use crate::error::RenderError;

/// Title of every report and the marker used to find a prior report comment.
/// No other comment on a pull request is expected to contain it.
pub const REPORT_HEADER: &str = "## Template Repository Sync Report";

/// Body line for a run with nothing to sync.
pub const NO_CHANGES: &str = "> no changes to sync";

const TEMPLATE_NAME: &str = "report.md";
const EMBEDDED_TEMPLATE: &str = include_str!("templates/report.md.tera");

// ---------------------------------------------------------------------------
// SyncReport
// ---------------------------------------------------------------------------

/// A rendered report: the lookup header and the full comment body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub header: &'static str,
    pub body: String,
}

// ---------------------------------------------------------------------------
// ReportRenderer
// ---------------------------------------------------------------------------

pub struct ReportRenderer {
    tera: Tera,
}

impl ReportRenderer {
    /// Renderer using the embedded template.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_override(None)
    }

    /// Renderer using the template at `template`, or the embedded one.
    pub fn with_override(template: Option<&Path>) -> Result<Self, RenderError> {
        let source = match template {
            Some(path) => {
                debug!("report template: {}", path.display());
                std::fs::read_to_string(path).map_err(|source| RenderError::Io {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => EMBEDDED_TEMPLATE.to_string(),
        };

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(TEMPLATE_NAME, &source)?;
        Ok(Self { tera })
    }

    /// Render the report for `changeset`, whose repositories belong to
    /// `owner`.
    pub fn render(
        &self,
        owner: &str,
        changeset: &Changeset,
        tracked: &TrackedFiles,
    ) -> Result<SyncReport, RenderError> {
        if changeset.is_empty() {
            return Ok(SyncReport {
                header: REPORT_HEADER,
                body: format!("{REPORT_HEADER}\n\n{NO_CHANGES}\n"),
            });
        }

        let ctx = ReportContext::build(REPORT_HEADER, owner, changeset, tracked)?;
        let rendered = self
            .tera
            .render(TEMPLATE_NAME, &Context::from_serialize(&ctx)?)?;

        debug!(
            "rendered report for {} repositories ({} bytes)",
            changeset.len(),
            rendered.len()
        );
        let body = if rendered.starts_with(REPORT_HEADER) {
            rendered
        } else {
            format!("{REPORT_HEADER}\n\n{rendered}")
        };
        Ok(SyncReport {
            header: REPORT_HEADER,
            body,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use reposync_core::{RemoteFile, RepoName};
    use tempfile::TempDir;

    use super::*;

    fn one_change() -> (Changeset, TrackedFiles) {
        let mut files = BTreeMap::new();
        files.insert(
            "/path/file".to_string(),
            RemoteFile::Present(b"remoteContent\n".to_vec()),
        );
        let mut changeset = Changeset::new();
        changeset.insert(RepoName::from("foo"), files);
        let tracked: TrackedFiles = [("/path/file", "localContent\n")].into_iter().collect();
        (changeset, tracked)
    }

    #[test]
    fn empty_changeset_body_is_fixed() {
        let renderer = ReportRenderer::new().expect("renderer");
        let report = renderer
            .render("acme", &Changeset::new(), &TrackedFiles::new())
            .expect("render");
        assert_eq!(report.header, REPORT_HEADER);
        assert_eq!(
            report.body,
            "## Template Repository Sync Report\n\n> no changes to sync\n"
        );
    }

    #[test]
    fn single_file_counts_are_singular() {
        let (changeset, tracked) = one_change();
        let report = ReportRenderer::new()
            .unwrap()
            .render("acme", &changeset, &tracked)
            .unwrap();
        assert!(report
            .body
            .contains("> Found 1 file to update in 1 repository\n"));
    }

    #[test]
    fn new_empty_file_is_not_reported_as_binary() {
        let mut files = BTreeMap::new();
        files.insert(".gitkeep".to_string(), RemoteFile::Absent);
        let mut changeset = Changeset::new();
        changeset.insert(RepoName::from("foo"), files);
        let tracked: TrackedFiles = [(".gitkeep", "")].into_iter().collect();

        let body = ReportRenderer::new()
            .unwrap()
            .render("acme", &changeset, &tracked)
            .unwrap()
            .body;
        assert!(body.contains("<code>.gitkeep</code> (new)"));
        assert!(body.contains("```diff\nnew empty file b/.gitkeep\n```"));
        assert!(!body.contains("Binary files"));
    }

    #[test]
    fn override_template_is_used_and_header_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.md.tera");
        std::fs::write(
            &path,
            "{% for repo in repositories %}* {{ repo.name }}\n{% endfor %}",
        )
        .unwrap();

        let (changeset, tracked) = one_change();
        let report = ReportRenderer::with_override(Some(&path))
            .unwrap()
            .render("acme", &changeset, &tracked)
            .unwrap();
        assert_eq!(
            report.body,
            "## Template Repository Sync Report\n\n* foo\n"
        );
    }

    #[test]
    fn missing_override_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = ReportRenderer::with_override(Some(&dir.path().join("nope.tera")))
            .err()
            .expect("error");
        assert!(matches!(err, RenderError::Io { .. }), "got: {err}");
    }

    #[test]
    fn changeset_path_missing_from_snapshot_is_an_error() {
        let (changeset, _) = one_change();
        let err = ReportRenderer::new()
            .unwrap()
            .render("acme", &changeset, &TrackedFiles::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingTracked { .. }), "got: {err}");
    }
}
