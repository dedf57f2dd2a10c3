//! Flattening of remote CallFlows back into configuration shape.
//!
//! A fetched tree arrives in two encodings: its root node is typed, while
//! every node reached through a branch target is a loosely-typed JSON
//! object (see `remote::NodeRepr`). Both encodings are first decoded into
//! the same `domain::Node`, applying the omission rule of the builder so
//! that unset, empty, and zero values never appear. The domain tree is
//! then converted into a `models::NodeDef`.
//!
//! Flattening what was built and stored reaches a fixed point: for a
//! document whose optional fields follow the omission rule,
//! `flatten(fetch(submit(build(doc)))) == doc`, modulo server-assigned ids.

use crate::remote::{NodeRepr, RemoteCallFlow, RemoteNode};
use crate::{domain, echo, Error, Location, Settings};
use models::{
    AssignedNumber, BranchDef, CallFlowDef, CallTarget, DtmfOption, EnrichmentDef,
    EnrichmentSource, Gather, Intent, MetadataDef, NodeDef, Reference, VariableDef,
};
use serde_json::{Map, Value};

mod loose;
mod typed;

/// Flatten a remote node of either encoding.
pub fn flatten(node: &NodeRepr) -> Result<NodeDef, Error> {
    decode(Location::Root, node).map(into_config)
}

/// Flatten the typed root node of a fetched CallFlow.
pub fn flatten_root(node: &RemoteNode) -> Result<NodeDef, Error> {
    typed::decode(Location::Root, node).map(into_config)
}

/// Flatten a loosely-typed node, as found at a branch target.
pub fn flatten_nested(node: &Map<String, Value>) -> Result<NodeDef, Error> {
    loose::decode(Location::Root, node).map(into_config)
}

/// Flatten a fetched CallFlow into a configuration document.
///
/// If the `desired` document is given, its team references are echoed
/// positionally (see `echo_references`), and so is the authored order of
/// its enrichment sets (see `echo_enrichment_order`). Otherwise the remote
/// teams are taken as they are, including their names, as when importing a
/// CallFlow which has no desired state yet.
pub fn flatten_call_flow(
    remote: &RemoteCallFlow,
    desired: Option<&CallFlowDef>,
    settings: &Settings,
) -> Result<CallFlowDef, Error> {
    let RemoteCallFlow {
        id,
        name,
        language,
        teams,
        root,
        assigned_number,
    } = remote;

    let loc = Location::Root;
    let root = typed::decode(loc.push_prop("root"), root)?;
    tracing::debug!(
        flow = %name,
        %id,
        nodes = root.count(),
        depth = root.depth(),
        "flattened call-routing tree"
    );

    let teams = match desired {
        Some(desired) => echo::echo_references(
            loc.push_prop("teams"),
            &desired.teams,
            teams,
            settings.echo_length_policy,
        )?,
        None => teams
            .iter()
            .map(|team| Reference {
                id: team.id,
                name: Some(team.name.clone()).filter(|n| !n.is_empty()),
            })
            .collect(),
    };

    let assigned_number = assigned_number
        .as_ref()
        .filter(|number| !number.phone_number.is_empty())
        .map(|number| AssignedNumber {
            phone_number: number.phone_number.clone(),
            name: number.name.clone(),
        });

    let mut root = into_config(root);
    if let Some(desired) = desired {
        echo::echo_enrichment_order(&desired.root, &mut root);
    }

    Ok(CallFlowDef {
        name: name.clone(),
        language: language.clone(),
        teams,
        root,
        assigned_number,
    })
}

/// Convert a domain node and its descendants into configuration shape.
/// Enrichment sets are emitted in ascending order of their keys.
pub fn into_config(node: domain::Node) -> NodeDef {
    let domain::Node {
        id,
        name,
        node_type,
        metadata,
        branches,
    } = node;

    NodeDef {
        id,
        name,
        node_type,
        metadata: metadata.map(metadata_into_config),
        branches: branches
            .into_iter()
            .map(|branch| BranchDef {
                id: branch.id,
                branch_type: branch.branch_type,
                condition: branch.condition,
                target: branch.target.map(|t| Box::new(into_config(*t))),
            })
            .collect(),
    }
}

// Dispatch to the decoder of the node's encoding.
fn decode(loc: Location, node: &NodeRepr) -> Result<domain::Node, Error> {
    match node {
        NodeRepr::Typed(node) => typed::decode(loc, node),
        NodeRepr::Loose(node) => loose::decode(loc, node),
    }
}

fn metadata_into_config(metadata: domain::Metadata) -> MetadataDef {
    let domain::Metadata {
        message,
        audio_file,
        voice,
        variable,
        dtmf_options,
        support_hours_id,
        call_targets,
        call_style,
        alert_source_id,
        retry_count,
        timeout_seconds,
        deny_list,
        intents,
        gathers,
        enrichment,
    } = metadata;

    MetadataDef {
        message,
        audio_file,
        voice,
        variable: variable.map(|v| VariableDef {
            key: v.key,
            value: v.value,
        }),
        dtmf_options: dtmf_options
            .into_iter()
            .map(|o| DtmfOption {
                code: o.code,
                label: o.label,
            })
            .collect(),
        support_hours_id,
        call_targets: call_targets
            .into_iter()
            .map(|t| CallTarget {
                target: t.target,
                target_type: t.target_type,
            })
            .collect(),
        call_style,
        alert_source_id,
        retry_count,
        timeout_seconds,
        deny_list,
        intents: intents
            .into_iter()
            .map(|i| Intent {
                intent_type: i.intent_type,
                label: i.label,
                description: i.description,
                examples: i.examples,
            })
            .collect(),
        gathers: gathers
            .into_iter()
            .map(|g| Gather {
                gather_type: g.gather_type,
                label: g.label,
                var_type: g.var_type,
                required: g.required,
                question: g.question,
            })
            .collect(),
        enrichment: enrichment.map(|e| EnrichmentDef {
            enabled: e.enabled,
            // BTreeMap iteration is ordered, making these lists deterministic.
            information_types: e
                .information_types
                .into_iter()
                .filter_map(|(info, on)| on.then_some(info))
                .collect(),
            sources: e
                .sources
                .into_iter()
                .map(|(id, source)| EnrichmentSource {
                    id,
                    source_type: source.source_type,
                })
                .collect(),
        }),
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn non_zero(n: u32) -> Option<u32> {
    if n == 0 {
        None
    } else {
        Some(n)
    }
}
