//! End-to-end run: resolve → collect → scan → push or report.
//!
//! Early exits (not a template, no targets) are outcomes, not errors. The
//! event gate lives in the caller, which decides whether a run starts at all.

use std::path::PathBuf;

use tracing::{info, warn};

use reposync_core::{
    files, Changeset, Platform, RunContext, RunMode, SyncConfig, TargetRepository, TrackedFiles,
};
use reposync_renderer::{ReportRenderer, SyncReport};

use crate::pull_request::{upsert_report, CommentAction};
use crate::push::{PushExecutor, RepoResult};
use crate::resolver::{resolve, Resolution};
use crate::scan::Scanner;
use crate::SyncError;

/// Everything known before any write: who, what, and how it differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub targets: Vec<TargetRepository>,
    pub tracked: TrackedFiles,
    pub changeset: Changeset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    NotTemplate,
    NoTargets,
    /// Push mode: one result per changed repository.
    Pushed(Vec<RepoResult>),
    /// Pull-request mode. `action` is `None` on a dry run.
    Reported {
        pull_request: u64,
        action: Option<CommentAction>,
        changed_files: usize,
    },
}

pub struct Pipeline<'a> {
    platform: &'a dyn Platform,
    ctx: &'a RunContext,
    config: &'a SyncConfig,
    workspace: PathBuf,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        platform: &'a dyn Platform,
        ctx: &'a RunContext,
        config: &'a SyncConfig,
        workspace: impl Into<PathBuf>,
    ) -> Self {
        Self {
            platform,
            ctx,
            config,
            workspace: workspace.into(),
        }
    }

    /// Resolve targets only.
    pub fn targets(&self) -> Result<Option<Vec<TargetRepository>>, SyncError> {
        match resolve(self.platform, self.ctx, self.config)? {
            Resolution::NotTemplate => Ok(None),
            Resolution::Targets(targets) => Ok(Some(targets)),
        }
    }

    /// Resolve, collect and scan. `None` when the invoking repository is not
    /// a template.
    pub fn plan(&self) -> Result<Option<Plan>, SyncError> {
        let Some(targets) = self.targets()? else {
            return Ok(None);
        };
        if targets.is_empty() {
            return Ok(Some(Plan {
                targets,
                tracked: TrackedFiles::new(),
                changeset: Changeset::new(),
            }));
        }

        let tracked = files::collect(&self.workspace, &self.config.files)?;
        let names: Vec<_> = targets.iter().map(|t| t.name.clone()).collect();
        let changeset =
            Scanner::new(self.platform, self.ctx.owner(), &self.config.scan).scan(&names, &tracked);
        info!(
            "{} files differ across {} repositories",
            changeset.file_count(),
            changeset.len()
        );

        Ok(Some(Plan {
            targets,
            tracked,
            changeset,
        }))
    }

    /// Render the report for a plan with the configured renderer.
    pub fn render(&self, plan: &Plan) -> Result<SyncReport, SyncError> {
        let override_path = self
            .config
            .report
            .template
            .as_deref()
            .map(|p| self.workspace.join(p));
        let renderer = ReportRenderer::with_override(override_path.as_deref())?;
        Ok(renderer.render(self.ctx.owner(), &plan.changeset, &plan.tracked)?)
    }

    /// Full run for the context's mode.
    pub fn run(&self) -> Result<RunOutcome, SyncError> {
        // Checked up front so a misconfigured event fails before any API call.
        let pull_request = match self.ctx.mode() {
            RunMode::PullRequest => Some(self.ctx.pull_request.ok_or_else(|| {
                SyncError::MissingPullRequest {
                    event: self.ctx.event.to_string(),
                }
            })?),
            RunMode::Push => None,
        };

        let Some(plan) = self.plan()? else {
            return Ok(RunOutcome::NotTemplate);
        };
        if plan.targets.is_empty() {
            warn!("no target repositories, nothing to sync");
            return Ok(RunOutcome::NoTargets);
        }

        match pull_request {
            None => {
                let results = PushExecutor::new(self.platform, self.ctx, &self.config.commit)
                    .apply(&plan.changeset, &plan.tracked);
                Ok(RunOutcome::Pushed(results))
            }
            Some(number) => {
                let report = self.render(&plan)?;
                let action = if self.ctx.dry_run {
                    info!("[dry-run] report for #{number} not posted:\n{}", report.body);
                    None
                } else {
                    Some(upsert_report(self.platform, self.ctx, number, &report)?)
                };
                Ok(RunOutcome::Reported {
                    pull_request: number,
                    action,
                    changed_files: plan.changeset.file_count(),
                })
            }
        }
    }
}
