use crate::{remote::RemoteReference, Error, LengthPolicy, Location};
use models::{EnrichmentDef, NodeDef, Reference};

/// A short reference to a remote entity: an id and a display name,
/// which is empty if unknown.
pub trait ShortReference {
    fn id(&self) -> u64;
    fn name(&self) -> &str;
}

impl ShortReference for RemoteReference {
    fn id(&self) -> u64 {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl ShortReference for Reference {
    fn id(&self) -> u64 {
        self.id
    }
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// Echo a list of remote references back into configuration shape,
/// without manufacturing differences in fields the user didn't supply.
///
/// Entries are correlated by list position, never by id. Each output
/// entry takes the id of the remote entry, and takes its name only if
/// both the remote name and the desired name at the same position are
/// non-empty.
///
/// Positional correlation mirrors the list semantics of the desired-state
/// document. As a consequence, a re-ordering of an otherwise unchanged
/// list is indistinguishable from a change of its membership.
///
/// Where the lists differ in length, `policy` decides the fate of the
/// overhanging entries.
pub fn echo_references<D, R>(
    loc: Location,
    desired: &[D],
    remote: &[R],
    policy: LengthPolicy,
) -> Result<Vec<Reference>, Error>
where
    D: ShortReference,
    R: ShortReference,
{
    if desired.len() != remote.len() {
        match policy {
            LengthPolicy::Reject => {
                return Err(Error::LengthMismatch {
                    ptr: loc.pointer_str().to_string(),
                    desired: desired.len(),
                    remote: remote.len(),
                })
            }
            LengthPolicy::Truncate => tracing::warn!(
                ptr = %loc.pointer_str(),
                desired = desired.len(),
                remote = remote.len(),
                "reference lists differ in length; dropping the overhanging entries"
            ),
            LengthPolicy::Extend => tracing::debug!(
                ptr = %loc.pointer_str(),
                desired = desired.len(),
                remote = remote.len(),
                "reference lists differ in length; keeping remote entries"
            ),
        }
    }

    let mut out: Vec<Reference> = desired
        .iter()
        .zip(remote.iter())
        .map(|(desired, remote)| Reference {
            id: remote.id(),
            name: if !remote.name().is_empty() && !desired.name().is_empty() {
                Some(remote.name().to_string())
            } else {
                None
            },
        })
        .collect();

    if policy == LengthPolicy::Extend {
        out.extend(
            remote
                .iter()
                .skip(desired.len())
                .map(|remote| Reference::new(remote.id())),
        );
    }
    Ok(out)
}

/// Echo the authored order of enrichment sets onto a flattened tree.
///
/// The remote keeps enrichment sets as keyed maps, which flatten in
/// ascending key order. Nodes of `observed` are correlated with `desired`
/// by branch position. Entries present in both take their authored order,
/// and are followed by remote-only entries in ascending order.
pub fn echo_enrichment_order(desired: &NodeDef, observed: &mut NodeDef) {
    if let (Some(desired), Some(observed)) = (enrichment(desired), enrichment_mut(observed)) {
        order_like(&desired.information_types, &mut observed.information_types, |info| info);
        order_like(&desired.sources, &mut observed.sources, |source| &source.id);
    }

    for (desired, observed) in desired.branches.iter().zip(observed.branches.iter_mut()) {
        if let (Some(desired), Some(observed)) = (&desired.target, &mut observed.target) {
            echo_enrichment_order(desired, observed);
        }
    }
}

fn enrichment(node: &NodeDef) -> Option<&EnrichmentDef> {
    node.metadata.as_ref()?.enrichment.as_ref()
}

fn enrichment_mut(node: &mut NodeDef) -> Option<&mut EnrichmentDef> {
    node.metadata.as_mut()?.enrichment.as_mut()
}

// `observed` is in ascending order, which the stable sort preserves
// for entries that `desired` doesn't have.
fn order_like<T>(desired: &[T], observed: &mut [T], key: impl Fn(&T) -> &String) {
    observed.sort_by_key(|item| {
        desired
            .iter()
            .position(|d| key(d) == key(item))
            .unwrap_or(usize::MAX)
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn remote(id: u64, name: &str) -> RemoteReference {
        RemoteReference {
            id,
            name: name.to_string(),
        }
    }

    fn echo(
        desired: &[Reference],
        remote: &[RemoteReference],
        policy: LengthPolicy,
    ) -> Result<Vec<Reference>, Error> {
        let root = Location::Root;
        echo_references(root.push_prop("teams"), desired, remote, policy)
    }

    #[test]
    fn test_name_is_echoed_only_if_supplied() {
        assert_eq!(
            echo(
                &[Reference::named(7, "X")],
                &[remote(7, "X")],
                LengthPolicy::Truncate
            ),
            Ok(vec![Reference::named(7, "X")])
        );
        assert_eq!(
            echo(&[Reference::new(7)], &[remote(7, "X")], LengthPolicy::Truncate),
            Ok(vec![Reference::new(7)])
        );
        // An empty remote name is never echoed.
        assert_eq!(
            echo(&[Reference::named(7, "X")], &[remote(7, "")], LengthPolicy::Truncate),
            Ok(vec![Reference::new(7)])
        );
    }

    #[test]
    fn test_remote_values_win_at_each_position() {
        // The remote renamed the team and the id changed at position 1.
        let out = echo(
            &[Reference::named(7, "Old name"), Reference::new(8)],
            &[remote(7, "New name"), remote(9, "Nine")],
            LengthPolicy::Truncate,
        );
        assert_eq!(
            out,
            Ok(vec![Reference::named(7, "New name"), Reference::new(9)])
        );
    }

    #[test]
    fn test_reordering_is_indistinguishable_from_change() {
        let desired = [Reference::named(7, "A"), Reference::named(8, "B")];
        let out = echo(
            &desired,
            &[remote(8, "B"), remote(7, "A")],
            LengthPolicy::Truncate,
        )
        .unwrap();

        assert_ne!(out, desired.to_vec());
        assert_eq!(out, vec![Reference::named(8, "B"), Reference::named(7, "A")]);
    }

    #[test]
    fn test_length_mismatch_policies() {
        let desired = [Reference::named(7, "A")];
        let remotes = [remote(7, "A"), remote(8, "B")];

        assert_eq!(
            echo(&desired, &remotes, LengthPolicy::Truncate),
            Ok(vec![Reference::named(7, "A")])
        );
        assert_eq!(
            echo(&desired, &remotes, LengthPolicy::Extend),
            Ok(vec![Reference::named(7, "A"), Reference::new(8)])
        );
        assert_eq!(
            echo(&desired, &remotes, LengthPolicy::Reject),
            Err(Error::LengthMismatch {
                ptr: "/teams".to_string(),
                desired: 1,
                remote: 2,
            })
        );

        // A remote shorter than desired loses the desired tail under every
        // non-rejecting policy, as there's nothing to echo.
        assert_eq!(
            echo(&[Reference::new(7), Reference::new(8)], &[remote(7, "")], LengthPolicy::Extend),
            Ok(vec![Reference::new(7)])
        );
    }

    fn enriched(types: &[&str], sources: &[&str]) -> NodeDef {
        NodeDef {
            metadata: Some(models::MetadataDef {
                enrichment: Some(EnrichmentDef {
                    enabled: true,
                    information_types: types.iter().map(|t| t.to_string()).collect(),
                    sources: sources
                        .iter()
                        .map(|id| models::EnrichmentSource {
                            id: id.to_string(),
                            source_type: "crm".to_string(),
                        })
                        .collect(),
                }),
                ..Default::default()
            }),
            ..NodeDef::new("enrich")
        }
    }

    #[test]
    fn test_enrichment_order_follows_the_desired_tree() {
        let desired = NodeDef {
            branches: vec![
                models::BranchDef::new("dtmf"),
                models::BranchDef::new("default").to(enriched(&["sla", "account"], &["s-2", "s-1"])),
            ],
            ..enriched(&["incidents", "account"], &[])
        };
        // As flattened: in ascending order, with a remote-only entry.
        let mut observed = NodeDef {
            branches: vec![
                models::BranchDef::new("dtmf"),
                models::BranchDef::new("default")
                    .to(enriched(&["account", "billing", "sla"], &["s-1", "s-2", "s-3"])),
            ],
            ..enriched(&["account", "incidents"], &[])
        };
        echo_enrichment_order(&desired, &mut observed);

        let enrichment = enrichment(&observed).unwrap();
        assert_eq!(enrichment.information_types, vec!["incidents", "account"]);

        let target = observed.branches[1].target.as_deref().unwrap();
        let enrichment = super::enrichment(target).unwrap();
        assert_eq!(enrichment.information_types, vec!["sla", "account", "billing"]);
        assert_eq!(
            enrichment
                .sources
                .iter()
                .map(|s| s.id.as_str())
                .collect::<Vec<_>>(),
            vec!["s-2", "s-1", "s-3"]
        );
    }
}
