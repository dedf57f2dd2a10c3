use crate::CliContext;
use anyhow::Context;
use std::path::PathBuf;

#[derive(Debug, clap::Args)]
#[command(rename_all = "kebab-case")]
pub struct Build {
    /// Path of the CallFlow document to build, or "-" for stdin.
    #[arg(long)]
    file: PathBuf,
}

impl Build {
    pub async fn run(&self, ctx: &CliContext) -> anyhow::Result<()> {
        let desired: models::CallFlowDef = crate::read_document(&self.file)?;

        let built = callflow::build_call_flow(&desired, ctx.settings())
            .with_context(|| format!("failed to build {}", self.file.display()))?;

        ctx.write_all(&built)
    }
}
