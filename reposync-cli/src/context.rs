//! Run-level inputs shared by every subcommand, resolved from flags or the
//! GitHub Actions environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use tracing::debug;

use reposync_core::{config, EventKind, RepoSlug, RunContext, RunMode, SyncConfig};
use reposync_github::{GitHubClient, DEFAULT_API_URL};

// Variables the action runner sets for the step's `with:` inputs.
const ACTION_TOKEN_VAR: &str = "INPUT_GITHUB-TOKEN";
const ACTION_CONFIG_VAR: &str = "INPUT_CONFIG";
pub const ACTION_DRY_RUN_VAR: &str = "INPUT_DRY-RUN";

#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Access token for the GitHub API.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Checkout of the template repository.
    #[arg(long, env = "GITHUB_WORKSPACE", default_value = "/github/workspace")]
    pub workspace: PathBuf,

    /// Config file, relative to the workspace [default: .github/template-sync.yml].
    /// Falls back to the action's `config` input.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// The template repository, as `owner/name`.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: RepoSlug,

    /// Name of the triggering workflow event.
    #[arg(long, env = "GITHUB_EVENT_NAME", default_value = "workflow_dispatch")]
    pub event: String,

    /// JSON payload of the triggering event.
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
}

impl CommonArgs {
    pub fn event(&self) -> EventKind {
        EventKind::parse(&self.event)
    }

    pub fn load_config(&self) -> Result<SyncConfig> {
        let path = self
            .config
            .clone()
            .or_else(|| action_input(ACTION_CONFIG_VAR).map(PathBuf::from));
        config::load_at(&self.workspace, path.as_deref()).context("failed to load sync config")
    }

    /// Build the run context. In pull-request mode the number comes from
    /// `pull_request`, else from the event payload.
    pub fn run_context(
        &self,
        event: EventKind,
        pull_request: Option<u64>,
        dry_run: bool,
    ) -> Result<RunContext> {
        let pull_request = match (event.mode(), pull_request) {
            (RunMode::PullRequest, None) => match self.event_path.as_deref() {
                Some(path) => pull_request_from_payload(path)?,
                None => None,
            },
            (_, number) => number,
        };
        Ok(RunContext {
            template: self.repository.clone(),
            event,
            pull_request,
            dry_run,
        })
    }

    pub fn client(&self) -> Result<GitHubClient> {
        let token = self
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| action_input(ACTION_TOKEN_VAR))
            .context("missing access token: pass --token or set GITHUB_TOKEN")?;
        Ok(GitHubClient::new(&self.api_url, token))
    }
}

/// A non-blank action input.
pub fn action_input(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// Action inputs are strings; `true`, `yes` and `1` turn a switch on.
pub fn input_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1"))
}

/// `pull_request.number`, falling back to a top-level `number`.
fn pull_request_from_payload(path: &Path) -> Result<Option<u64>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event payload at {}", path.display()))?;
    let payload: Value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse event payload at {}", path.display()))?;
    let number = payload
        .pointer("/pull_request/number")
        .and_then(Value::as_u64)
        .or_else(|| payload.get("number").and_then(Value::as_u64));
    debug!("pull request number from payload: {number:?}");
    Ok(number)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;
    use tempfile::TempDir;

    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        common: CommonArgs,
    }

    fn args(extra: &[&str]) -> CommonArgs {
        let mut argv = vec!["reposync", "--repository", "acme/template", "--workspace", "/w"];
        argv.extend_from_slice(extra);
        Harness::parse_from(argv).common
    }

    fn payload(json: &str) -> (TempDir, String) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("event.json");
        fs::write(&path, json).unwrap();
        let path = path.to_string_lossy().into_owned();
        (dir, path)
    }

    #[test]
    fn pull_request_number_read_from_payload() {
        let (_dir, path) = payload(r#"{"action":"opened","pull_request":{"number":42}}"#);
        let common = args(&["--event", "pull_request", "--event-path", &path]);
        let ctx = common.run_context(common.event(), None, false).unwrap();
        assert_eq!(ctx.pull_request, Some(42));
        assert_eq!(ctx.template.full_name(), "acme/template");
    }

    #[test]
    fn top_level_number_is_the_fallback() {
        let (_dir, path) = payload(r#"{"number":7}"#);
        let common = args(&["--event", "pull_request_target", "--event-path", &path]);
        let ctx = common.run_context(common.event(), None, false).unwrap();
        assert_eq!(ctx.pull_request, Some(7));
    }

    #[test]
    fn explicit_number_overrides_payload() {
        let (_dir, path) = payload(r#"{"pull_request":{"number":42}}"#);
        let common = args(&["--event", "pull_request", "--event-path", &path]);
        let ctx = common.run_context(common.event(), Some(3), true).unwrap();
        assert_eq!(ctx.pull_request, Some(3));
        assert!(ctx.dry_run);
    }

    #[test]
    fn push_events_ignore_the_payload() {
        let common = args(&["--event", "push", "--event-path", "/does/not/exist.json"]);
        let ctx = common.run_context(common.event(), None, false).unwrap();
        assert_eq!(ctx.pull_request, None);
        assert_eq!(ctx.mode(), RunMode::Push);
    }

    #[test]
    fn switch_inputs_accept_common_spellings() {
        for on in ["true", "True", " yes ", "1"] {
            assert!(input_enabled(Some(on)), "{on:?}");
        }
        for off in ["false", "no", "0", ""] {
            assert!(!input_enabled(Some(off)), "{off:?}");
        }
        assert!(!input_enabled(None));
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let (_dir, path) = payload("not json");
        let common = args(&["--event", "pull_request", "--event-path", &path]);
        let err = common.run_context(common.event(), None, false).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse event payload"));
    }
}
