use super::MetadataDef;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A node of a call-routing tree.
///
/// The meaning of a node is decided by its `node_type`. Nodes route the
/// call onward through an ordered list of branches, each of which may
/// target a further node. Node and branch ids are assigned by the remote
/// API when the tree is created and are never sent by the client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NodeDef {
    /// # Identifier of the node, assigned by the remote API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// # Display name of the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// # Type of the node.
    pub node_type: String,
    /// # Metadata of the node.
    /// Which metadata fields apply is determined by the node type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataDef>,
    /// # Ordered branches out of this node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<BranchDef>,
}

/// A branch out of a call-routing node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BranchDef {
    /// # Identifier of the branch, assigned by the remote API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// # Type of the branch.
    pub branch_type: String,
    /// # Condition under which the branch is taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// # Node to which the branch routes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Box<NodeDef>>,
}

impl NodeDef {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            id: None,
            name: None,
            node_type: node_type.into(),
            metadata: None,
            branches: Vec::new(),
        }
    }

    /// Number of node levels in the tree rooted at this node, counting itself.
    pub fn depth(&self) -> usize {
        1 + self
            .branches
            .iter()
            .filter_map(|branch| branch.target.as_deref())
            .map(NodeDef::depth)
            .max()
            .unwrap_or_default()
    }

    /// Returns a copy of this tree with all server-assigned ids removed.
    pub fn without_ids(&self) -> Self {
        Self {
            id: None,
            name: self.name.clone(),
            node_type: self.node_type.clone(),
            metadata: self.metadata.clone(),
            branches: self
                .branches
                .iter()
                .map(|branch| BranchDef {
                    id: None,
                    branch_type: branch.branch_type.clone(),
                    condition: branch.condition.clone(),
                    target: branch.target.as_ref().map(|t| Box::new(t.without_ids())),
                })
                .collect(),
        }
    }
}

impl BranchDef {
    pub fn new(branch_type: impl Into<String>) -> Self {
        Self {
            id: None,
            branch_type: branch_type.into(),
            condition: None,
            target: None,
        }
    }

    pub fn to(mut self, target: NodeDef) -> Self {
        self.target = Some(Box::new(target));
        self
    }
}
