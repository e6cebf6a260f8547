//! # reposync-renderer
//!
//! Turns a [`reposync_core::Changeset`] into the Markdown sync report posted
//! on pull requests. Rendering is deterministic: the same changeset and
//! snapshot always produce the same bytes, so a re-run can update the prior
//! comment in place.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use reposync_core::{Changeset, TrackedFiles};
//! use reposync_renderer::ReportRenderer;
//!
//! fn preview(changeset: &Changeset, tracked: &TrackedFiles) {
//!     if let Ok(renderer) = ReportRenderer::new() {
//!         if let Ok(report) = renderer.render("acme", changeset, tracked) {
//!             println!("{}", report.body);
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod diff;
pub mod engine;
pub mod error;

pub use context::ReportContext;
pub use diff::unified_diff;
pub use engine::{ReportRenderer, SyncReport, NO_CHANGES, REPORT_HEADER};
pub use error::RenderError;
