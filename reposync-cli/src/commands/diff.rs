//! `reposync diff`: print the report a run would post, without writing.

use anyhow::{Context, Result};
use clap::Args;
use tracing::warn;

use reposync_sync::Pipeline;

use crate::context::CommonArgs;

/// Arguments for `reposync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let config = self.common.load_config()?;
        let ctx = self.common.run_context(self.common.event(), None, true)?;
        let client = self.common.client()?;

        let pipeline = Pipeline::new(&client, &ctx, &config, self.common.workspace.clone());
        let Some(plan) = pipeline
            .plan()
            .with_context(|| format!("diff failed for '{}'", ctx.template))?
        else {
            warn!("{} is not a template repository", ctx.template);
            return Ok(());
        };

        let report = pipeline.render(&plan).context("failed to render report")?;
        print!("{}", report.body);
        if !report.body.ends_with('\n') {
            println!();
        }
        Ok(())
    }
}
