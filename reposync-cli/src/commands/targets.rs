//! `reposync targets`: the repositories a run would sync.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};
use tracing::warn;

use reposync_core::TargetRepository;
use reposync_sync::Pipeline;

use crate::context::CommonArgs;

/// Arguments for `reposync targets`.
#[derive(Args, Debug)]
pub struct TargetsArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct TargetJson<'a> {
    name: &'a str,
    dependent: bool,
    additional: bool,
}

#[derive(Tabled)]
struct TargetRow {
    #[tabled(rename = "repository")]
    name: String,
    #[tabled(rename = "dependent")]
    dependent: String,
    #[tabled(rename = "additional")]
    additional: String,
}

impl TargetsArgs {
    pub fn run(self) -> Result<()> {
        let config = self.common.load_config()?;
        let ctx = self.common.run_context(self.common.event(), None, true)?;
        let client = self.common.client()?;

        let Some(targets) = Pipeline::new(&client, &ctx, &config, self.common.workspace.clone())
            .targets()
            .with_context(|| format!("failed to resolve targets for '{}'", ctx.template))?
        else {
            warn!("{} is not a template repository", ctx.template);
            return Ok(());
        };

        if self.json {
            print_json(&targets)
        } else {
            print_table(&ctx.template.to_string(), &targets);
            Ok(())
        }
    }
}

fn print_json(targets: &[TargetRepository]) -> Result<()> {
    let payload: Vec<TargetJson<'_>> = targets
        .iter()
        .map(|t| TargetJson {
            name: t.name.as_str(),
            dependent: t.dependent,
            additional: t.additional,
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize targets JSON")?
    );
    Ok(())
}

fn print_table(template: &str, targets: &[TargetRepository]) {
    println!("{} | {} targets", template.bold(), targets.len());
    if targets.is_empty() {
        println!("No repositories to sync.");
        return;
    }

    let mark = |on: bool| if on { "✔".to_string() } else { String::new() };
    let rows: Vec<TargetRow> = targets
        .iter()
        .map(|t| TargetRow {
            name: t.name.to_string(),
            dependent: mark(t.dependent),
            additional: mark(t.additional),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
