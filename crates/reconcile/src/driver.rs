use callflow::{domain, RemoteCallFlow, RemoteId};

/// Failure of a remote operation, as classified by the `Driver`.
/// Callers act only upon the classification, never on the wrapped error.
#[derive(thiserror::Error, Debug)]
pub enum DriverError {
    #[error("transient failure of the remote API: {0}")]
    Retryable(anyhow::Error),
    #[error("remote CallFlow {0} does not exist")]
    NotFound(RemoteId),
    #[error(transparent)]
    Permanent(anyhow::Error),
}

impl DriverError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, DriverError::Retryable(_))
    }
}

/// A Driver performs network operations upon whole CallFlow trees.
/// Each create or update is an atomic replacement of one entire tree.
/// Implementations own any retry and backoff of transient failures.
#[async_trait::async_trait]
pub trait Driver: Send + Sync {
    /// Create a new CallFlow, returning its remote id and the stored tree.
    async fn create_tree(
        &self,
        flow: &domain::CallFlow,
    ) -> Result<(RemoteId, RemoteCallFlow), DriverError>;

    /// Fetch the current tree of a CallFlow.
    /// A CallFlow which no longer exists is `DriverError::NotFound`.
    async fn fetch_tree(&self, id: RemoteId) -> Result<RemoteCallFlow, DriverError>;

    /// Replace the tree of an existing CallFlow.
    async fn update_tree(&self, id: RemoteId, flow: &domain::CallFlow) -> Result<(), DriverError>;

    async fn delete_tree(&self, id: RemoteId) -> Result<(), DriverError>;
}
