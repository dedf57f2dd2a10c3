use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, clap::Args)]
pub struct Output {
    /// How to format CLI output
    #[arg(global = true, short, long, value_enum, default_value_t = OutputType::Json)]
    pub output: OutputType,
}

#[derive(clap::ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputType {
    /// Format output as pretty-printed JSON
    Json,
    /// Format output as YAML
    Yaml,
}

impl Output {
    pub fn print(&self, item: &impl Serialize) -> anyhow::Result<()> {
        match self.output {
            OutputType::Json => print_json(item),
            OutputType::Yaml => print_yaml(item),
        }
    }
}

pub fn print_yaml(item: &impl Serialize) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_yaml::to_writer(&mut stdout, item)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

pub fn print_json(item: &impl Serialize) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, item)?;
    stdout.write_all(b"\n")?;
    Ok(())
}
