//! reposync: keep repositories generated from a template in sync with it.
//!
//! # Usage
//!
//! ```text
//! reposync run     [--dry-run] [--config <path>] [--pull-request <n>]
//! reposync diff    [--config <path>]
//! reposync targets [--config <path>] [--json]
//! ```
//!
//! Every flag falls back to the GitHub Actions environment (`GITHUB_TOKEN`,
//! `GITHUB_WORKSPACE`, `GITHUB_REPOSITORY`, `GITHUB_EVENT_NAME`, ...) or to the
//! step's inputs (`INPUT_GITHUB-TOKEN`, `INPUT_CONFIG`, `INPUT_DRY-RUN`), so
//! the binary runs unchanged as an action step.

mod commands;
mod context;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, run::RunArgs, targets::TargetsArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "reposync",
    version,
    about = "Sync files from a template repository to the repositories generated from it",
    long_about = None,
)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Push the template's files, or report them on the triggering pull request.
    Run(RunArgs),

    /// Print the report of what a run would change, without writing anything.
    Diff(DiffArgs),

    /// List the repositories a run would target.
    Targets(TargetsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Targets(args) => args.run(),
    }
}

/// Logs go to stderr so `diff` and `targets` output stays pipeable.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
