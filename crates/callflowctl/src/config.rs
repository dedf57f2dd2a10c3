use anyhow::Context;
use callflow::{DepthPolicy, LengthPolicy, Settings};
use std::path::PathBuf;

/// Arguments which determine the `Settings` used by every command.
///
/// Settings are read from an optional YAML or JSON file, and individual
/// settings may then be overridden by flags or their environment variables.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SettingsArgs {
    /// Path of a YAML or JSON file of settings.
    #[arg(long, global = true, env = "CALLFLOW_CONFIG")]
    pub config: Option<PathBuf>,
    /// Maximum number of node levels of a call-routing tree, counting the root.
    #[arg(long, global = true, env = "CALLFLOW_MAX_DEPTH")]
    pub max_depth: Option<usize>,
    /// What to do with trees deeper than the maximum depth: reject or accept.
    #[arg(long, global = true, env = "CALLFLOW_DEPTH_POLICY")]
    pub depth_policy: Option<DepthPolicy>,
    /// What to do when desired and remote team lists differ in length:
    /// truncate, extend, or reject.
    #[arg(long, global = true, env = "CALLFLOW_ECHO_LENGTH_POLICY")]
    pub echo_length_policy: Option<LengthPolicy>,
}

impl SettingsArgs {
    pub fn load(&self) -> anyhow::Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read settings {}", path.display()))?;
                serde_yaml::from_str(&content)
                    .with_context(|| format!("failed to parse settings {}", path.display()))?
            }
            None => Settings::default(),
        };

        if let Some(max_depth) = self.max_depth {
            settings.max_depth = max_depth;
        }
        if let Some(policy) = self.depth_policy {
            settings.depth_policy = policy;
        }
        if let Some(policy) = self.echo_length_policy {
            settings.echo_length_policy = policy;
        }

        if settings.max_depth == 0 {
            anyhow::bail!("max_depth must be at least 1");
        }
        Ok(settings)
    }
}
