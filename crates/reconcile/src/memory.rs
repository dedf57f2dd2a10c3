use crate::{Driver, DriverError};
use anyhow::Context;
use callflow::{domain, RemoteCallFlow, RemoteId};
use serde_json::{json, Value};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

/// MemoryDriver is a `Driver` which holds CallFlows in memory.
///
/// Stored trees are read back in the same two encodings a real transport
/// produces: the root node is typed, and every branch target is a loosely
/// typed JSON object whose numbers are floating point. Node and branch ids are assigned by position within
/// the tree, so that an unchanged tree keeps its ids across updates.
#[derive(Default)]
pub struct MemoryDriver {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    last_id: u64,
    flows: BTreeMap<RemoteId, domain::CallFlow>,
    teams: BTreeMap<u64, String>,
    assigned_number: Option<(String, String)>,
    failures: VecDeque<DriverError>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the display name of a team, which is returned with
    /// every CallFlow referencing it.
    pub fn with_team(mut self, id: u64, name: impl Into<String>) -> Self {
        self.state_mut().teams.insert(id, name.into());
        self
    }

    /// Assign a phone number to every CallFlow read from this driver.
    pub fn with_assigned_number(
        mut self,
        phone_number: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.state_mut().assigned_number = Some((phone_number.into(), name.into()));
        self
    }

    /// Cause the next operation to fail with the given error.
    /// Errors queue up, and are returned in the order they were added.
    pub fn fail_next(&self, err: DriverError) {
        self.lock().failures.push_back(err);
    }

    /// Remove a CallFlow out-of-band, as though by another actor.
    /// Returns true if the CallFlow existed.
    pub fn remove(&self, id: RemoteId) -> bool {
        self.lock().flows.remove(&id).is_some()
    }

    /// Returns the tree stored for the CallFlow, including assigned ids.
    pub fn stored(&self, id: RemoteId) -> Option<domain::CallFlow> {
        self.lock().flows.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn state_mut(&mut self) -> &mut State {
        self.state.get_mut().unwrap()
    }
}

impl State {
    fn take_failure(&mut self) -> Result<(), DriverError> {
        match self.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn to_remote(&self, id: RemoteId, flow: &domain::CallFlow) -> Result<RemoteCallFlow, DriverError> {
        let teams: Vec<_> = flow
            .team_ids
            .iter()
            .map(|team| {
                json!({
                    "id": team,
                    "name": self.teams.get(team).cloned().unwrap_or_default(),
                })
            })
            .collect();

        let mut root = json!(flow.root);
        let branches = root.get_mut("branches").and_then(Value::as_array_mut);
        for branch in branches.into_iter().flatten() {
            if let Some(target) = branch.get_mut("target") {
                loosen_numbers(target);
            }
        }

        let wire = json!({
            "id": id,
            "name": flow.name,
            "language": flow.language,
            "teams": teams,
            "root": root,
            "assignedNumber": self.assigned_number.as_ref().map(|(phone_number, name)| json!({
                "phoneNumber": phone_number,
                "name": name,
            })),
        });

        serde_json::from_value(wire)
            .with_context(|| format!("decoding stored CallFlow {id}"))
            .map_err(DriverError::Permanent)
    }
}

// Loosely-typed targets carry their numbers as floating point.
fn loosen_numbers(value: &mut Value) {
    match value {
        Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                *value = Value::from(f);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(loosen_numbers),
        Value::Object(map) => map.values_mut().for_each(loosen_numbers),
        _ => (),
    }
}

// Assign ids to the node and branches of `node`, by their position in the tree.
fn assign_ids(node: &mut domain::Node, path: &str) {
    node.id = Some(format!("node-{path}"));

    for (index, branch) in node.branches.iter_mut().enumerate() {
        let path = format!("{path}.{index}");
        branch.id = Some(format!("branch-{path}"));

        if let Some(target) = branch.target.as_deref_mut() {
            assign_ids(target, &path);
        }
    }
}

fn with_assigned_ids(id: RemoteId, flow: &domain::CallFlow) -> domain::CallFlow {
    let mut flow = flow.clone();
    assign_ids(&mut flow.root, &id.to_string());
    flow
}

#[async_trait::async_trait]
impl Driver for MemoryDriver {
    async fn create_tree(
        &self,
        flow: &domain::CallFlow,
    ) -> Result<(RemoteId, RemoteCallFlow), DriverError> {
        let mut state = self.lock();
        state.take_failure()?;

        state.last_id += 1;
        let id = RemoteId(state.last_id);
        let flow = with_assigned_ids(id, flow);
        let remote = state.to_remote(id, &flow)?;

        tracing::debug!(%id, nodes = flow.root.count(), "stored new call flow");
        state.flows.insert(id, flow);

        Ok((id, remote))
    }

    async fn fetch_tree(&self, id: RemoteId) -> Result<RemoteCallFlow, DriverError> {
        let mut state = self.lock();
        state.take_failure()?;

        let flow = state.flows.get(&id).ok_or(DriverError::NotFound(id))?;
        state.to_remote(id, flow)
    }

    async fn update_tree(&self, id: RemoteId, flow: &domain::CallFlow) -> Result<(), DriverError> {
        let mut state = self.lock();
        state.take_failure()?;

        let Some(current) = state.flows.get_mut(&id) else {
            return Err(DriverError::NotFound(id));
        };
        *current = with_assigned_ids(id, flow);

        tracing::debug!(%id, nodes = current.root.count(), "replaced call flow");
        Ok(())
    }

    async fn delete_tree(&self, id: RemoteId) -> Result<(), DriverError> {
        let mut state = self.lock();
        state.take_failure()?;

        match state.flows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(DriverError::NotFound(id)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use callflow::NodeRepr;

    #[test]
    fn test_ids_are_assigned_by_position() {
        let mut flow = callflow::build_call_flow(
            &models::CallFlowDef::example(),
            &callflow::Settings::default(),
        )
        .unwrap();
        assign_ids(&mut flow.root, "3");

        let root = &flow.root;
        assert_eq!(root.id.as_deref(), Some("node-3"));
        assert_eq!(root.branches[0].id.as_deref(), Some("branch-3.0"));

        let dial = root.branches[0].target.as_deref().unwrap();
        assert_eq!(dial.id.as_deref(), Some("node-3.0"));
        assert_eq!(dial.branches[0].id.as_deref(), Some("branch-3.0.0"));
        assert_eq!(
            dial.branches[0].target.as_deref().unwrap().id.as_deref(),
            Some("node-3.0.0")
        );
    }

    #[test]
    fn test_stored_trees_read_back_in_both_encodings() {
        let driver = MemoryDriver::new()
            .with_team(7, "Platform")
            .with_assigned_number("+15550100", "Main");
        let state = driver.lock();

        let flow = callflow::build_call_flow(
            &models::CallFlowDef::example(),
            &callflow::Settings::default(),
        )
        .unwrap();
        let remote = state
            .to_remote(RemoteId(5), &with_assigned_ids(RemoteId(5), &flow))
            .unwrap();

        assert_eq!(remote.id, RemoteId(5));
        assert_eq!(remote.teams[0].name, "Platform");
        assert_eq!(remote.root.id, "node-5");
        assert_eq!(remote.root.node_type, "greeting");
        assert_eq!(
            remote.assigned_number.as_ref().map(|n| n.phone_number.as_str()),
            Some("+15550100")
        );

        let Some(NodeRepr::Loose(target)) = &remote.root.branches[0].target else {
            panic!("expected a loose target")
        };
        assert_eq!(target["id"], "node-5.0");
        assert_eq!(target["metadata"]["retryCount"], json!(2.0));
        assert!(target["metadata"]["timeoutSeconds"].is_f64());
        assert!(target["branches"][0]["target"]["id"].is_string());
    }

    #[tokio::test]
    async fn test_loose_numbers_flatten_as_integers() {
        let driver = MemoryDriver::new().with_team(7, "Platform");
        let desired = models::CallFlowDef::example();
        let built = callflow::build_call_flow(&desired, &callflow::Settings::default()).unwrap();

        let (id, _) = driver.create_tree(&built).await.unwrap();
        let remote = driver.fetch_tree(id).await.unwrap();
        let flow =
            callflow::flatten_call_flow(&remote, Some(&desired), &callflow::Settings::default())
                .unwrap();

        let dial = flow.root.branches[0].target.as_deref().unwrap();
        let metadata = dial.metadata.as_ref().unwrap();
        assert_eq!(
            (metadata.retry_count, metadata.timeout_seconds),
            (Some(2), Some(30))
        );
        assert_eq!(flow.without_ids(), desired);
    }
}
