use crate::CliContext;
use anyhow::Context;
use std::path::PathBuf;

#[derive(Debug, clap::Args)]
#[command(rename_all = "kebab-case")]
pub struct Flatten {
    /// Path of the CallFlow fetched from the remote API, or "-" for stdin.
    #[arg(long)]
    file: PathBuf,
    /// Path of the desired CallFlow document, against which references are echoed.
    #[arg(long)]
    desired: Option<PathBuf>,
}

impl Flatten {
    pub async fn run(&self, ctx: &CliContext) -> anyhow::Result<()> {
        let remote: callflow::RemoteCallFlow = crate::read_document(&self.file)?;
        let desired: Option<models::CallFlowDef> = self
            .desired
            .as_deref()
            .map(crate::read_document)
            .transpose()?;

        let flattened = callflow::flatten_call_flow(&remote, desired.as_ref(), ctx.settings())
            .with_context(|| format!("failed to flatten {}", self.file.display()))?;

        ctx.write_all(&flattened)
    }
}
