use crate::{Driver, DriverError};
use callflow::{RemoteId, Settings};
use models::CallFlowDef;

#[must_use]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    CallFlow(#[from] callflow::Error),
    #[error("failed to {operation} remote CallFlow")]
    Driver {
        operation: &'static str,
        #[source]
        source: DriverError,
    },
}

impl Error {
    /// Returns true if the error is a transient failure of the remote API.
    /// Reconcilers never retry. Their callers may, if this returns true.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Driver { source, .. } if source.is_retryable())
    }
}

fn driver_err(operation: &'static str) -> impl FnOnce(DriverError) -> Error {
    move |source| Error::Driver { operation, source }
}

/// Outcome of applying a desired-state document.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    /// Remote id of the CallFlow, which is new if it was created.
    pub id: RemoteId,
    /// The CallFlow as read back from the remote, in configuration shape.
    pub flow: CallFlowDef,
}

/// Reconciler applies desired-state CallFlows to a remote through a `Driver`,
/// and refreshes the observed state of CallFlows it manages.
pub struct Reconciler<D> {
    driver: D,
    settings: Settings,
}

impl<D: Driver> Reconciler<D> {
    pub fn new(driver: D, settings: Settings) -> Self {
        Self { driver, settings }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply the `desired` document, creating the CallFlow if `id` is None
    /// and otherwise replacing the tree of the existing CallFlow.
    /// The applied CallFlow is read back and flattened against `desired`.
    pub async fn apply(
        &self,
        id: Option<RemoteId>,
        desired: &CallFlowDef,
    ) -> Result<Applied, Error> {
        let built = callflow::build_call_flow(desired, &self.settings)?;

        let (id, remote) = match id {
            None => {
                let (id, remote) = self
                    .driver
                    .create_tree(&built)
                    .await
                    .map_err(driver_err("create"))?;

                tracing::info!(%id, flow = %desired.name, "created call flow");
                (id, remote)
            }
            Some(id) => {
                self.driver
                    .update_tree(id, &built)
                    .await
                    .map_err(driver_err("update"))?;
                let remote = self
                    .driver
                    .fetch_tree(id)
                    .await
                    .map_err(driver_err("fetch"))?;

                tracing::info!(%id, flow = %desired.name, "updated call flow");
                (id, remote)
            }
        };

        let flow = callflow::flatten_call_flow(&remote, Some(desired), &self.settings)?;
        Ok(Applied { id, flow })
    }

    /// Refresh the observed state of a CallFlow, flattened against the
    /// `desired` document if there is one.
    ///
    /// A CallFlow which no longer exists has drifted away from its desired
    /// state, and is returned as None rather than as an error.
    pub async fn refresh(
        &self,
        id: RemoteId,
        desired: Option<&CallFlowDef>,
    ) -> Result<Option<CallFlowDef>, Error> {
        let remote = match self.driver.fetch_tree(id).await {
            Ok(remote) => remote,
            Err(DriverError::NotFound(_)) => {
                tracing::warn!(%id, "call flow no longer exists and has drifted from its desired state");
                return Ok(None);
            }
            Err(err) => return Err(driver_err("fetch")(err)),
        };

        let observed = callflow::flatten_call_flow(&remote, desired, &self.settings)?;
        if let Some(desired) = desired {
            if has_drifted(desired, &observed) {
                tracing::warn!(%id, flow = %desired.name, "call flow has drifted from its desired state");
            }
        }
        Ok(Some(observed))
    }

    /// Import an existing CallFlow by its id, as given by a user.
    pub async fn import(&self, id: &str) -> Result<Option<CallFlowDef>, Error> {
        let id: RemoteId = id.parse()?;
        self.refresh(id, None).await
    }

    /// Delete a CallFlow. Deleting a CallFlow which no longer exists succeeds.
    pub async fn delete(&self, id: RemoteId) -> Result<(), Error> {
        match self.driver.delete_tree(id).await {
            Ok(()) => {
                tracing::info!(%id, "deleted call flow");
                Ok(())
            }
            Err(DriverError::NotFound(_)) => {
                tracing::debug!(%id, "call flow to delete was already gone");
                Ok(())
            }
            Err(err) => Err(driver_err("delete")(err)),
        }
    }
}

/// Returns true if the `observed` document differs from `desired`.
/// Server-assigned ids and the read-only assigned number are not compared.
pub fn has_drifted(desired: &CallFlowDef, observed: &CallFlowDef) -> bool {
    let comparable = |flow: &CallFlowDef| CallFlowDef {
        assigned_number: None,
        ..flow.without_ids()
    };
    comparable(desired) != comparable(observed)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::MemoryDriver;
    use models::NodeDef;

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_vanished_call_flow_is_logged_as_drift() {
        let reconciler = Reconciler::new(MemoryDriver::new(), Settings::default());
        let desired = CallFlowDef::example();

        let applied = reconciler.apply(None, &desired).await.unwrap();
        assert!(reconciler.driver().remove(applied.id));

        let observed = reconciler.refresh(applied.id, Some(&desired)).await.unwrap();
        assert_eq!(observed, None);
        assert!(logs_contain("no longer exists"));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_out_of_band_change_is_logged_as_drift() {
        let driver = MemoryDriver::new().with_team(7, "Platform");
        let reconciler = Reconciler::new(driver, Settings::default());
        let desired = CallFlowDef::example();
        let applied = reconciler.apply(None, &desired).await.unwrap();

        let changed = CallFlowDef {
            root: NodeDef::new("hangup"),
            ..desired.clone()
        };
        let built = callflow::build_call_flow(&changed, reconciler.settings()).unwrap();
        reconciler
            .driver()
            .update_tree(applied.id, &built)
            .await
            .unwrap();
        assert!(!logs_contain("drifted"));

        let observed = reconciler.refresh(applied.id, Some(&desired)).await.unwrap();
        assert_eq!(observed.map(|flow| flow.root.node_type), Some("hangup".to_string()));
        assert!(logs_contain("has drifted"));
    }

    #[test]
    fn test_drift_ignores_ids_and_assigned_number() {
        let desired = CallFlowDef::example();
        let mut observed = desired.clone();
        observed.root.id = Some("node-1".to_string());
        observed.assigned_number = Some(models::AssignedNumber {
            phone_number: "+15550100".to_string(),
            name: String::new(),
        });
        assert!(!has_drifted(&desired, &observed));

        observed.language = "de".to_string();
        assert!(has_drifted(&desired, &observed));
    }
}
