//! Remote representations of a CallFlow, as returned by the remote API.
//!
//! The root node of a fetched CallFlow is decoded into typed structures,
//! where unset fields take their zero values. Nodes reached through a
//! branch `target` are not re-typed by the transport, and arrive as
//! loosely-typed JSON objects. `NodeRepr` captures both encodings.

use crate::domain::{
    null_as_default, CallTarget, DtmfOption, EnrichmentSource, Gather, Intent, Variable,
};
use crate::Error;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Identifier of a CallFlow within the remote API.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct RemoteId(pub u64);

impl std::str::FromStr for RemoteId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(RemoteId)
            .map_err(|_| Error::InvalidRemoteId { id: s.to_string() })
    }
}

impl std::fmt::Display for RemoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCallFlow {
    pub id: RemoteId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub language: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub teams: Vec<RemoteReference>,
    pub root: RemoteNode,
    #[serde(default)]
    pub assigned_number: Option<RemoteAssignedNumber>,
}

/// A short reference to another remote entity.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RemoteReference {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoteAssignedNumber {
    #[serde(deserialize_with = "null_as_default")]
    pub phone_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// Either encoding of a remote call-routing node.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum NodeRepr {
    /// A node decoded into typed structures.
    Typed(Box<RemoteNode>),
    /// A node which remains a loosely-typed JSON object with wire keys.
    Loose(Map<String, Value>),
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoteNode {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub node_type: String,
    pub metadata: Option<RemoteMetadata>,
    #[serde(deserialize_with = "null_as_default")]
    pub branches: Vec<RemoteBranch>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoteBranch {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub branch_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub condition: String,
    #[serde(deserialize_with = "deserialize_loose_target")]
    pub target: Option<NodeRepr>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoteMetadata {
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub audio_file: String,
    #[serde(deserialize_with = "null_as_default")]
    pub voice: String,
    #[serde(deserialize_with = "null_as_default")]
    pub variable: Variable,
    #[serde(deserialize_with = "null_as_default")]
    pub dtmf_options: Vec<DtmfOption>,
    #[serde(deserialize_with = "null_as_default")]
    pub support_hours_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub call_targets: Vec<CallTarget>,
    #[serde(deserialize_with = "null_as_default")]
    pub call_style: String,
    #[serde(deserialize_with = "null_as_default")]
    pub alert_source_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub retry_count: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub timeout_seconds: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub deny_list: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub intents: Vec<Intent>,
    #[serde(deserialize_with = "null_as_default")]
    pub gathers: Vec<Gather>,
    #[serde(deserialize_with = "null_as_default")]
    pub enrichment: RemoteEnrichment,
}

/// Enrichment as decoded from the wire. Its maps have no inherent order,
/// and an information type which is null is not enabled.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoteEnrichment {
    #[serde(deserialize_with = "null_as_default")]
    pub enabled: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub information_types: HashMap<String, Option<bool>>,
    #[serde(deserialize_with = "null_as_default")]
    pub sources: HashMap<String, EnrichmentSource>,
}

// Branch targets are never re-typed by the transport.
fn deserialize_loose_target<'de, D>(deserializer: D) -> Result<Option<NodeRepr>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.map(NodeRepr::Loose))
}
