use super::{NodeDef, Reference};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A CallFlow routes inbound phone calls through a tree of nodes.
/// The whole tree is created, replaced, and deleted as a single unit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CallFlowDef {
    /// # Name of the call flow.
    pub name: String,
    /// # Language in which callers are addressed.
    pub language: String,
    /// # Teams which own the call flow.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teams: Vec<Reference>,
    /// # Root node of the call-routing tree.
    pub root: NodeDef,
    /// # Phone number assigned to the call flow.
    /// Populated by the remote API and never sent by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_number: Option<AssignedNumber>,
}

/// Read-only projection of the phone number assigned to a call flow.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AssignedNumber {
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl CallFlowDef {
    /// Returns a copy of this document with all server-assigned ids removed
    /// from its call-routing tree.
    pub fn without_ids(&self) -> Self {
        Self {
            root: self.root.without_ids(),
            ..self.clone()
        }
    }

    /// Build a root JSON schema for the CallFlow model.
    /// The tree is expressed recursively, without a depth bound.
    /// See `bounded_shape` for a statically finite rendition.
    pub fn root_json_schema() -> schemars::Schema {
        let settings = schemars::generate::SchemaSettings::draft2019_09();
        let generator = schemars::generate::SchemaGenerator::new(settings);
        generator.into_root_schema_for::<Self>()
    }
}

#[cfg(test)]
mod test {
    use super::CallFlowDef;

    #[test]
    fn test_example_parses() {
        let flow = CallFlowDef::example();
        assert_eq!(flow.root.depth(), 3);

        let round_trip: CallFlowDef =
            serde_json::from_value(serde_json::to_value(&flow).unwrap()).unwrap();
        assert_eq!(round_trip, flow);
    }

    #[test]
    fn test_root_schema_is_recursive() {
        let schema = CallFlowDef::root_json_schema();
        let defs = schema
            .get("$defs")
            .and_then(|d| d.as_object())
            .expect("root schema has definitions");

        assert!(defs.contains_key("NodeDef"), "{:?}", defs.keys());
        assert!(defs.contains_key("BranchDef"), "{:?}", defs.keys());
        assert!(defs.contains_key("MetadataDef"), "{:?}", defs.keys());

        // The branch target refers back to NodeDef.
        let target = &defs["BranchDef"]["properties"]["target"];
        assert!(target.to_string().contains("#/$defs/NodeDef"), "{target}");
    }
}
