use crate::CliContext;
use anyhow::Context;
use std::path::PathBuf;

#[derive(Debug, clap::Args)]
#[command(rename_all = "kebab-case")]
pub struct Check {
    /// Path of the CallFlow document to check, or "-" for stdin.
    #[arg(long)]
    file: PathBuf,
}

#[derive(Debug, serde::Serialize, PartialEq)]
struct Report {
    name: String,
    depth: usize,
    max_depth: usize,
}

impl Check {
    pub async fn run(&self, ctx: &CliContext) -> anyhow::Result<()> {
        let desired: models::CallFlowDef = crate::read_document(&self.file)?;
        let report = check(&desired, ctx.settings())
            .with_context(|| format!("{} is invalid", self.file.display()))?;

        ctx.write_all(&report)
    }
}

// A tree beyond the maximum depth fails the check under either depth policy.
fn check(
    desired: &models::CallFlowDef,
    settings: &callflow::Settings,
) -> Result<Report, callflow::Error> {
    callflow::check_call_flow(desired, settings.max_depth)?;

    Ok(Report {
        name: desired.name.clone(),
        depth: desired.root.depth(),
        max_depth: settings.max_depth,
    })
}
