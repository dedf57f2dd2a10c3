use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A short reference to another remote entity, such as a team, service,
/// or alert source. Only the `id` is sent to the remote API. The `name`
/// is an optional display label which is echoed back on read only if it
/// was supplied at the same list position.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Reference {
    /// # Identifier of the referenced entity.
    pub id: u64,
    /// # Display name of the referenced entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Reference {
    pub fn new(id: u64) -> Self {
        Self { id, name: None }
    }

    pub fn named(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }

    /// Returns true if a non-empty display name was supplied.
    pub fn has_name(&self) -> bool {
        crate::is_set(&self.name)
    }
}
