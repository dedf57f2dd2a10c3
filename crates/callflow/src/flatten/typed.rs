use super::{non_empty, non_zero};
use crate::remote::{RemoteEnrichment, RemoteMetadata, RemoteNode};
use crate::{domain, Error, Location};

// Decode a typed remote node. Fields holding their zero value are omitted.
pub(super) fn decode(loc: Location, node: &RemoteNode) -> Result<domain::Node, Error> {
    let RemoteNode {
        id,
        name,
        node_type,
        metadata,
        branches,
    } = node;

    let branches_loc = loc.push_prop("branches");
    let branches = branches
        .iter()
        .enumerate()
        .map(|(index, branch)| {
            let item = branches_loc.push_item(index);
            let target = match &branch.target {
                Some(target) => Some(Box::new(super::decode(item.push_prop("target"), target)?)),
                None => None,
            };
            Ok(domain::Branch {
                id: non_empty(&branch.id),
                branch_type: branch.branch_type.clone(),
                condition: non_empty(&branch.condition),
                target,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(domain::Node {
        id: non_empty(id),
        name: non_empty(name),
        node_type: node_type.clone(),
        metadata: metadata.as_ref().and_then(decode_metadata),
        branches,
    })
}

fn decode_metadata(metadata: &RemoteMetadata) -> Option<domain::Metadata> {
    let RemoteMetadata {
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
        variable: Some(variable)
            .filter(|v| !v.key.is_empty() || !v.value.is_empty())
            .cloned(),
        dtmf_options: dtmf_options.clone(),
        support_hours_id: non_empty(support_hours_id),
        call_targets: call_targets.clone(),
        call_style: non_empty(call_style),
        alert_source_id: non_empty(alert_source_id),
        retry_count: non_zero(*retry_count),
        timeout_seconds: non_zero(*timeout_seconds),
        deny_list: deny_list.clone(),
        intents: intents.clone(),
        gathers: gathers.clone(),
        enrichment: decode_enrichment(enrichment),
    };

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn decode_enrichment(enrichment: &RemoteEnrichment) -> Option<domain::Enrichment> {
    // Collecting the unordered wire maps into BTreeMaps fixes their order.
    let out = domain::Enrichment {
        enabled: enrichment.enabled,
        information_types: enrichment
            .information_types
            .iter()
            .filter(|(_, on)| **on == Some(true))
            .map(|(info, _)| (info.clone(), true))
            .collect(),
        sources: enrichment
            .sources
            .iter()
            .map(|(id, source)| (id.clone(), source.clone()))
            .collect(),
    };

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::remote::RemoteBranch;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_zero_values_are_omitted() {
        let node = RemoteNode {
            id: "n-1".to_string(),
            node_type: "dial".to_string(),
            metadata: Some(RemoteMetadata {
                retry_count: 0,
                timeout_seconds: 45,
                ..Default::default()
            }),
            branches: vec![RemoteBranch {
                branch_type: "fallback".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };

        assert_eq!(
            decode(Location::Root, &node).unwrap(),
            domain::Node {
                id: Some("n-1".to_string()),
                name: None,
                node_type: "dial".to_string(),
                metadata: Some(domain::Metadata {
                    timeout_seconds: Some(45),
                    ..Default::default()
                }),
                branches: vec![domain::Branch {
                    branch_type: "fallback".to_string(),
                    ..Default::default()
                }],
            }
        );
    }

    #[test]
    fn test_all_zero_metadata_is_omitted() {
        let node = RemoteNode {
            node_type: "hangup".to_string(),
            metadata: Some(RemoteMetadata::default()),
            ..Default::default()
        };
        assert_eq!(decode(Location::Root, &node).unwrap().metadata, None);
    }

    #[test]
    fn test_nulls_decode_as_zero_values() {
        let node: RemoteNode = serde_json::from_value(serde_json::json!({
            "id": null,
            "name": null,
            "nodeType": "greeting",
            "metadata": {
                "message": "hi",
                "audioFile": null,
                "retryCount": null,
                "variable": null,
                "dtmfOptions": [{"code": "1", "label": null}],
                "enrichment": {"enabled": null, "informationTypes": {"account": null}},
            },
            "branches": null,
        }))
        .unwrap();

        assert_eq!(
            decode(Location::Root, &node).unwrap(),
            domain::Node {
                node_type: "greeting".to_string(),
                metadata: Some(domain::Metadata {
                    message: Some("hi".to_string()),
                    dtmf_options: vec![domain::DtmfOption {
                        code: "1".to_string(),
                        label: String::new(),
                    }],
                    ..Default::default()
                }),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_disabled_information_types_are_dropped() {
        let mut enrichment = RemoteEnrichment::default();
        enrichment.information_types.insert("account".to_string(), Some(true));
        enrichment.information_types.insert("billing".to_string(), Some(false));
        enrichment.information_types.insert("crm".to_string(), None);

        let out = decode_enrichment(&enrichment).unwrap();
        assert_eq!(
            out.information_types.keys().collect::<Vec<_>>(),
            vec!["account"]
        );
        assert!(!out.enabled);
    }
}
