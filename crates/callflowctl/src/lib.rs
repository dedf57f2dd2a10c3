use anyhow::Context;
use std::path::Path;

mod build;
mod check;
mod config;
mod flatten;
mod output;
mod schema;
mod simulate;

pub use config::SettingsArgs;
pub use output::{Output, OutputType};

/// A command-line tool for building, flattening, and checking CallFlows.
#[derive(Debug, clap::Parser)]
#[command(author, about, version)]
pub struct Cli {
    #[command(subcommand)]
    cmd: Command,

    #[command(flatten)]
    settings: SettingsArgs,

    #[command(flatten)]
    output: Output,
}

#[derive(Debug, clap::Subcommand)]
#[command(rename_all = "kebab-case")]
pub enum Command {
    /// Print the JSON schema of CallFlow documents.
    ///
    /// By default the schema is recursive. With --bounded, the call-routing
    /// tree is instead unrolled into one definition per level, down to the
    /// maximum depth, for consumers which cannot express recursive types.
    Schema(schema::Schema),
    /// Build a CallFlow document into the tree which is sent to the remote API.
    Build(build::Build),
    /// Flatten a CallFlow fetched from the remote API into a document.
    ///
    /// When a --desired document is given, its team references are
    /// echoed positionally, so that team names appear in the output
    /// only where the desired document has them.
    Flatten(flatten::Flatten),
    /// Check that a CallFlow document is within the maximum depth.
    Check(check::Check),
    /// Apply a CallFlow document to an in-memory remote, read it back,
    /// and report whether the read-back document matches.
    Simulate(simulate::Simulate),
}

#[derive(Debug)]
pub struct CliContext {
    settings: callflow::Settings,
    output: Output,
}

impl CliContext {
    pub fn settings(&self) -> &callflow::Settings {
        &self.settings
    }

    pub fn write_all<T: serde::Serialize>(&self, item: &T) -> anyhow::Result<()> {
        self.output.print(item)
    }
}

impl Cli {
    pub async fn run(&self) -> anyhow::Result<()> {
        let settings = self.settings.load()?;
        tracing::debug!(?settings, "loaded settings");

        let context = CliContext {
            settings,
            output: self.output.clone(),
        };

        match &self.cmd {
            Command::Schema(schema) => schema.run(&context).await,
            Command::Build(build) => build.run(&context).await,
            Command::Flatten(flatten) => flatten.run(&context).await,
            Command::Check(check) => check.run(&context).await,
            Command::Simulate(simulate) => simulate.run(&context).await,
        }
    }
}

/// Read and parse a YAML or JSON document from `path`, or from stdin if `path` is "-".
fn read_document<T>(path: &Path) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };

    // YAML is a superset of JSON, so this parses either.
    serde_yaml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}
