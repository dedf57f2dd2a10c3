use crate::{depth, domain, DepthPolicy, Error, Location, Settings};
use models::{CallFlowDef, MetadataDef, NodeDef};
use serde_json::Value;
use std::collections::BTreeSet;

/// Build the domain tree of a node and its descendants.
///
/// `build` is total: optional fields which are absent, empty, or zero are
/// omitted, and server-assigned ids are never copied. It does not check
/// the depth of the tree. Use `build_call_flow`, or `check_depth`,
/// where the depth bound must be enforced.
pub fn build(node: &NodeDef) -> domain::Node {
    let NodeDef {
        id: _,
        name,
        node_type,
        metadata,
        branches,
    } = node;

    domain::Node {
        id: None,
        name: non_empty(name),
        node_type: node_type.clone(),
        metadata: metadata.as_ref().and_then(build_metadata),
        branches: branches
            .iter()
            .map(|branch| domain::Branch {
                id: None,
                branch_type: branch.branch_type.clone(),
                condition: non_empty(&branch.condition),
                target: branch.target.as_deref().map(|t| Box::new(build(t))),
            })
            .collect(),
    }
}

/// Build the domain CallFlow of a desired-state document,
/// applying the depth policy of `settings`.
///
/// Enrichment sets which repeat an entry are rejected, as the remote
/// keys them by type and by source id.
pub fn build_call_flow(flow: &CallFlowDef, settings: &Settings) -> Result<domain::CallFlow, Error> {
    let CallFlowDef {
        name,
        language,
        teams,
        root,
        assigned_number: _,
    } = flow;

    let loc = Location::Root;
    check_enrichment_sets(loc.push_prop("root"), root)?;

    if let Err(err) = depth::check_call_flow(flow, settings.max_depth) {
        match settings.depth_policy {
            DepthPolicy::Reject => return Err(err),
            DepthPolicy::Accept => {
                tracing::warn!(%err, flow = %name, "building call flow deeper than the maximum depth")
            }
        }
    }

    let root = build(root);
    tracing::debug!(
        flow = %name,
        nodes = root.count(),
        depth = root.depth(),
        "built call-routing tree"
    );

    Ok(domain::CallFlow {
        name: name.clone(),
        language: language.clone(),
        team_ids: teams.iter().map(|team| team.id).collect(),
        root,
    })
}

fn check_enrichment_sets(loc: Location, node: &NodeDef) -> Result<(), Error> {
    if let Some(enrichment) = node.metadata.as_ref().and_then(|m| m.enrichment.as_ref()) {
        let metadata = loc.push_prop("metadata");
        let loc = metadata.push_prop("enrichment");

        let types = &enrichment.information_types;
        if let Some(index) = first_repeat(types.iter().map(String::as_str)) {
            let list = loc.push_prop("information_types");
            return Err(Error::shape(
                list.push_item(index),
                "a distinct information type",
                &Value::String(types[index].clone()),
            ));
        }

        let sources = &enrichment.sources;
        if let Some(index) = first_repeat(sources.iter().map(|s| s.id.as_str())) {
            let list = loc.push_prop("sources");
            let item = list.push_item(index);
            return Err(Error::shape(
                item.push_prop("id"),
                "a distinct source id",
                &Value::String(sources[index].id.clone()),
            ));
        }
    }

    let branches = loc.push_prop("branches");
    for (index, branch) in node.branches.iter().enumerate() {
        if let Some(target) = &branch.target {
            let item = branches.push_item(index);
            check_enrichment_sets(item.push_prop("target"), target)?;
        }
    }
    Ok(())
}

// Index of the first key which repeats an earlier one.
fn first_repeat<'k>(keys: impl Iterator<Item = &'k str>) -> Option<usize> {
    let mut seen = BTreeSet::new();
    keys.enumerate()
        .find_map(|(index, key)| (!seen.insert(key)).then_some(index))
}

fn build_metadata(metadata: &MetadataDef) -> Option<domain::Metadata> {
    let MetadataDef {
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

    let out = domain::Metadata {
        message: non_empty(message),
        audio_file: non_empty(audio_file),
        voice: non_empty(voice),
        variable: variable
            .as_ref()
            .filter(|v| !v.is_empty())
            .map(|v| domain::Variable {
                key: v.key.clone(),
                value: v.value.clone(),
            }),
        dtmf_options: dtmf_options
            .iter()
            .map(|o| domain::DtmfOption {
                code: o.code.clone(),
                label: o.label.clone(),
            })
            .collect(),
        support_hours_id: non_empty(support_hours_id),
        call_targets: call_targets
            .iter()
            .map(|t| domain::CallTarget {
                target: t.target.clone(),
                target_type: t.target_type.clone(),
            })
            .collect(),
        call_style: non_empty(call_style),
        alert_source_id: non_empty(alert_source_id),
        retry_count: non_zero(*retry_count),
        timeout_seconds: non_zero(*timeout_seconds),
        deny_list: deny_list.clone(),
        intents: intents
            .iter()
            .map(|i| domain::Intent {
                intent_type: i.intent_type.clone(),
                label: i.label.clone(),
                description: i.description.clone(),
                examples: i.examples.clone(),
            })
            .collect(),
        gathers: gathers
            .iter()
            .map(|g| domain::Gather {
                gather_type: g.gather_type.clone(),
                label: g.label.clone(),
                var_type: g.var_type.clone(),
                required: g.required,
                question: g.question.clone(),
            })
            .collect(),
        enrichment: enrichment
            .as_ref()
            .filter(|e| !e.is_empty())
            .map(|e| domain::Enrichment {
                enabled: e.enabled,
                information_types: e
                    .information_types
                    .iter()
                    .map(|t| (t.clone(), true))
                    .collect(),
                sources: e
                    .sources
                    .iter()
                    .map(|s| {
                        (
                            s.id.clone(),
                            domain::EnrichmentSource {
                                source_type: s.source_type.clone(),
                            },
                        )
                    })
                    .collect(),
            }),
    };

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn non_empty(s: &Option<String>) -> Option<String> {
    s.as_ref().filter(|s| !s.is_empty()).cloned()
}

fn non_zero(n: Option<u32>) -> Option<u32> {
    n.filter(|n| *n != 0)
}

#[cfg(test)]
mod test {
    use super::*;
    use models::{BranchDef, EnrichmentDef, VariableDef};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_omits_unset_fields() {
        let node = NodeDef {
            id: Some("assigned-by-server".to_string()),
            name: Some(String::new()),
            metadata: Some(MetadataDef {
                message: Some("hello".to_string()),
                voice: Some(String::new()),
                retry_count: Some(0),
                timeout_seconds: Some(20),
                variable: Some(VariableDef::default()),
                ..Default::default()
            }),
            branches: vec![BranchDef {
                id: Some("b1".to_string()),
                condition: Some(String::new()),
                ..BranchDef::new("default")
            }],
            ..NodeDef::new("greeting")
        };

        insta::assert_json_snapshot!(build(&node), @r###"
        {
          "nodeType": "greeting",
          "metadata": {
            "message": "hello",
            "timeoutSeconds": 20
          },
          "branches": [
            {
              "branchType": "default"
            }
          ]
        }
        "###);
    }

    #[test]
    fn test_empty_metadata_is_omitted() {
        let node = NodeDef {
            metadata: Some(MetadataDef {
                retry_count: Some(0),
                enrichment: Some(EnrichmentDef::default()),
                ..Default::default()
            }),
            ..NodeDef::new("hangup")
        };
        assert_eq!(build(&node).metadata, None);
    }

    #[test]
    fn test_build_recurses_through_targets() {
        let built = build(&NodeDef::example());
        assert_eq!(built.depth(), 3);
        assert_eq!(built.count(), 3);

        let dial = built.branches[0].target.as_deref().unwrap();
        assert_eq!(dial.node_type, "dial");
        assert_eq!(dial.metadata.as_ref().unwrap().retry_count, Some(2));

        let voicemail = dial.branches[0].target.as_deref().unwrap();
        assert_eq!(voicemail.node_type, "voicemail");
        assert_eq!(
            dial.branches[0].condition.as_deref(),
            Some("no_answer")
        );
        assert!(voicemail.branches.is_empty());
    }

    #[test]
    fn test_enrichment_sets_become_maps() {
        let node = NodeDef {
            metadata: Some(MetadataDef {
                enrichment: Some(EnrichmentDef::example()),
                ..Default::default()
            }),
            ..NodeDef::new("enrich")
        };
        let wire = serde_json::to_value(build(&node)).unwrap();

        assert_eq!(
            wire["metadata"]["enrichment"],
            serde_json::json!({
                "enabled": true,
                "informationTypes": {"account": true, "incidents": true},
                "sources": {"src-1": {"type": "crm"}},
            })
        );
    }

    #[test]
    fn test_call_flow_never_sends_assigned_number() {
        let mut flow = CallFlowDef::example();
        flow.assigned_number = Some(models::AssignedNumber {
            phone_number: "+15550100".to_string(),
            name: "Support".to_string(),
        });

        let built = build_call_flow(&flow, &Settings::default()).unwrap();
        assert_eq!(built.team_ids, vec![7]);

        let wire = serde_json::to_value(&built).unwrap();
        assert!(wire.get("assignedNumber").is_none(), "{wire}");
        assert_eq!(wire["teamIds"], serde_json::json!([7]));
    }

    #[test]
    fn test_repeated_enrichment_entries_are_rejected() {
        let enriched = |enrichment: EnrichmentDef| CallFlowDef {
            root: NodeDef {
                branches: vec![BranchDef::new("default").to(NodeDef {
                    metadata: Some(MetadataDef {
                        enrichment: Some(enrichment),
                        ..Default::default()
                    }),
                    ..NodeDef::new("enrich")
                })],
                ..NodeDef::new("greeting")
            },
            ..CallFlowDef::example()
        };

        let types = enriched(EnrichmentDef {
            information_types: vec![
                "incidents".to_string(),
                "account".to_string(),
                "incidents".to_string(),
            ],
            ..EnrichmentDef::example()
        });
        let err = build_call_flow(&types, &Settings::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"/root/branches/0/target/metadata/enrichment/information_types/2: expected a distinct information type, but found "incidents""#
        );

        let source = models::EnrichmentSource {
            id: "src-1".to_string(),
            source_type: "crm".to_string(),
        };
        let sources = enriched(EnrichmentDef {
            sources: vec![source.clone(), source],
            ..EnrichmentDef::example()
        });
        let err = build_call_flow(&sources, &Settings::default()).unwrap_err();
        assert_eq!(
            err.ptr(),
            Some("/root/branches/0/target/metadata/enrichment/sources/1/id")
        );

        // Distinct entries in any order are accepted.
        let unsorted = enriched(EnrichmentDef {
            information_types: vec!["incidents".to_string(), "account".to_string()],
            ..EnrichmentDef::example()
        });
        assert!(build_call_flow(&unsorted, &Settings::default()).is_ok());
    }
}
