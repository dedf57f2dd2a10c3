use crate::CliContext;

#[derive(Debug, clap::Args)]
#[command(rename_all = "kebab-case")]
pub struct Schema {
    /// Unroll the call-routing tree into a statically finite schema,
    /// bounded by the maximum depth.
    #[arg(long)]
    bounded: bool,
}

impl Schema {
    pub async fn run(&self, ctx: &CliContext) -> anyhow::Result<()> {
        ctx.write_all(&self.generate(ctx.settings()))
    }

    fn generate(&self, settings: &callflow::Settings) -> schemars::Schema {
        if self.bounded {
            models::bounded_shape(settings.max_depth)
        } else {
            models::CallFlowDef::root_json_schema()
        }
    }
}
