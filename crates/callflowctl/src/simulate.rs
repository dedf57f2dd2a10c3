use crate::CliContext;
use anyhow::Context;
use callflow::RemoteId;
use models::CallFlowDef;
use reconcile::{MemoryDriver, Reconciler};
use std::path::PathBuf;

#[derive(Debug, clap::Args)]
#[command(rename_all = "kebab-case")]
pub struct Simulate {
    /// Path of the CallFlow document to simulate, or "-" for stdin.
    #[arg(long)]
    file: PathBuf,
}

#[derive(Debug, serde::Serialize)]
struct Simulation {
    /// Remote id assigned to the created CallFlow.
    id: RemoteId,
    /// Whether the read-back document matches the desired one,
    /// and remains unchanged when refreshed again.
    converged: bool,
    /// The read-back document, including server-assigned ids.
    observed: CallFlowDef,
}

impl Simulate {
    pub async fn run(&self, ctx: &CliContext) -> anyhow::Result<()> {
        let desired: CallFlowDef = crate::read_document(&self.file)?;
        let simulation = simulate(&desired, ctx.settings())
            .await
            .with_context(|| format!("failed to simulate {}", self.file.display()))?;

        if !simulation.converged {
            tracing::warn!(flow = %desired.name, "read-back document differs from the desired one");
        }
        ctx.write_all(&simulation)
    }
}

async fn simulate(
    desired: &CallFlowDef,
    settings: &callflow::Settings,
) -> Result<Simulation, reconcile::Error> {
    // The remote knows the teams under the names the document gives them.
    let driver = desired
        .teams
        .iter()
        .fold(MemoryDriver::new(), |driver, team| match &team.name {
            Some(name) => driver.with_team(team.id, name),
            None => driver,
        });
    let reconciler = Reconciler::new(driver, settings.clone());

    let applied = reconciler.apply(None, desired).await?;
    let refreshed = reconciler.refresh(applied.id, Some(&applied.flow)).await?;

    let converged = !reconcile::has_drifted(desired, &applied.flow)
        && refreshed.as_ref() == Some(&applied.flow);

    Ok(Simulation {
        id: applied.id,
        converged,
        observed: applied.flow,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use models::{MetadataDef, NodeDef};

    #[tokio::test]
    async fn test_example_converges() {
        let simulation = simulate(&CallFlowDef::example(), &callflow::Settings::default())
            .await
            .unwrap();

        assert!(simulation.converged);
        assert_eq!(simulation.id, RemoteId(1));
        assert_eq!(simulation.observed.without_ids(), CallFlowDef::example());
    }

    #[tokio::test]
    async fn test_denormalized_document_does_not_converge() {
        let desired = CallFlowDef {
            root: NodeDef {
                metadata: Some(MetadataDef {
                    retry_count: Some(0),
                    message: Some("hi".to_string()),
                    ..Default::default()
                }),
                ..NodeDef::new("greeting")
            },
            ..CallFlowDef::example()
        };
        let simulation = simulate(&desired, &callflow::Settings::default())
            .await
            .unwrap();

        assert!(!simulation.converged);
        assert_eq!(
            simulation.observed.root.metadata.unwrap().retry_count,
            None
        );
    }

    #[tokio::test]
    async fn test_over_deep_document_fails() {
        let settings = callflow::Settings {
            max_depth: 2,
            ..Default::default()
        };
        let err = simulate(&CallFlowDef::example(), &settings).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "/root/branches/0/target/branches/0/target: call-routing tree exceeds the maximum depth of 2 levels"
        );
    }
}
