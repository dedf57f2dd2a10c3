//! The domain tree: the in-memory representation of a CallFlow which is
//! submitted to the remote API, and into which both remote encodings are
//! decoded before being flattened into configuration shape.
//!
//! Domain types serialize to exactly the remote wire format, using
//! camelCase keys and keyed maps for the enrichment sets.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CallFlow {
    pub name: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team_ids: Vec<u64>,
    pub root: Node,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Server-assigned id, which is never set by the builder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<Branch>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    /// Server-assigned id, which is never set by the builder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub branch_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Box<Node>>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<Variable>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dtmf_options: Vec<DtmfOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_hours_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub call_targets: Vec<CallTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deny_list: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intents: Vec<Intent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gathers: Vec<Gather>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<Enrichment>,
}

impl Metadata {
    /// Returns true if no field of the metadata is set.
    /// Builders and decoders never produce `Some` of empty metadata.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Variable {
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DtmfOption {
    #[serde(deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CallTarget {
    #[serde(deserialize_with = "null_as_default")]
    pub target: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub target_type: String,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Intent {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub intent_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub examples: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Gather {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub gather_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub var_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub required: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub question: String,
}

/// Enrichment settings. The information types and sources are sets,
/// which the remote API represents as maps keyed by type and by source id.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Enrichment {
    pub enabled: bool,
    pub information_types: BTreeMap<String, bool>,
    pub sources: BTreeMap<String, EnrichmentSource>,
}

impl Enrichment {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EnrichmentSource {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub source_type: String,
}

impl Node {
    /// Number of node levels in the tree rooted at this node, counting itself.
    pub fn depth(&self) -> usize {
        1 + self
            .branches
            .iter()
            .filter_map(|branch| branch.target.as_deref())
            .map(Node::depth)
            .max()
            .unwrap_or_default()
    }

    /// Number of nodes in the tree rooted at this node, counting itself.
    pub fn count(&self) -> usize {
        1 + self
            .branches
            .iter()
            .filter_map(|branch| branch.target.as_deref())
            .map(Node::count)
            .sum::<usize>()
    }
}

/// Deserialize a wire field whose JSON `null` means the same as its absence.
/// Combine with `#[serde(default)]` for fields which may also be missing.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
