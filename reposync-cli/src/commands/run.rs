//! `reposync run`: the full sync for the triggering event.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::{info, warn};

use reposync_core::EventKind;
use reposync_sync::{CommentAction, Pipeline, RepoOutcome, RepoResult, RunOutcome};

use crate::context::{action_input, input_enabled, CommonArgs, ACTION_DRY_RUN_VAR};

/// Arguments for `reposync run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Log what would change without pushing or commenting. Also enabled by
    /// the action's `dry-run` input.
    #[arg(long)]
    pub dry_run: bool,

    /// Pull request to report on (defaults to the one in the event payload).
    #[arg(long)]
    pub pull_request: Option<u64>,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let event = self.common.event();
        if !event.is_allowed() {
            warn!(
                "'{event}' event is not supported, expected one of: {}",
                EventKind::allowed_names().join(", ")
            );
            return Ok(());
        }

        let dry_run =
            self.dry_run || input_enabled(action_input(ACTION_DRY_RUN_VAR).as_deref());
        let config = self.common.load_config()?;
        let ctx = self.common.run_context(event, self.pull_request, dry_run)?;
        if ctx.dry_run {
            info!("[dry-run] nothing will be pushed or posted");
        }
        let client = self.common.client()?;

        let outcome = Pipeline::new(&client, &ctx, &config, self.common.workspace.clone())
            .run()
            .with_context(|| format!("sync failed for '{}'", ctx.template))?;
        print_outcome(&outcome, ctx.dry_run);
        Ok(())
    }
}

fn print_outcome(outcome: &RunOutcome, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    match outcome {
        RunOutcome::NotTemplate => println!("{prefix}✓ not a template repository, nothing to do"),
        RunOutcome::NoTargets => println!("{prefix}✓ no target repositories, nothing to do"),
        RunOutcome::Pushed(results) => print_results(results, prefix),
        RunOutcome::Reported {
            pull_request,
            action,
            changed_files,
        } => {
            let verb = match action {
                Some(CommentAction::Created(_)) => "created",
                Some(CommentAction::Updated(_)) => "updated",
                None => "rendered",
            };
            println!(
                "{prefix}✓ report {verb} on #{pull_request} ({changed_files} files to update)"
            );
        }
    }
}

fn print_results(results: &[RepoResult], prefix: &str) {
    if results.is_empty() {
        println!("{prefix}✓ every target is up to date");
        return;
    }

    for result in results {
        let files = result.paths.len();
        match &result.outcome {
            RepoOutcome::Updated { commit } => println!(
                "  {}  {} ({files} files, {})",
                "✔".green().bold(),
                result.repo,
                commit.bright_black()
            ),
            RepoOutcome::Skipped => println!(
                "  {}  {} ({files} files)",
                "~".yellow().bold(),
                result.repo
            ),
            RepoOutcome::Failed { reason } => println!(
                "  {}  {}: {}",
                "✖".red().bold(),
                result.repo,
                reason.red()
            ),
        }
    }

    let updated = results
        .iter()
        .filter(|r| matches!(r.outcome, RepoOutcome::Updated { .. }))
        .count();
    let failed = results
        .iter()
        .filter(|r| matches!(r.outcome, RepoOutcome::Failed { .. }))
        .count();
    println!(
        "{prefix}✓ {} repositories changed ({updated} updated, {failed} failed)",
        results.len()
    );
}
