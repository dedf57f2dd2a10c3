mod call_flows;
mod metadata;
mod nodes;
mod references;
mod schema_support;
mod shape;

pub use call_flows::{AssignedNumber, CallFlowDef};
pub use metadata::{
    CallTarget, DtmfOption, EnrichmentDef, EnrichmentSource, Gather, Intent, MetadataDef,
    VariableDef,
};
pub use nodes::{BranchDef, NodeDef};
pub use references::Reference;
pub use shape::bounded_shape;

/// Maximum number of node levels in a call-routing tree, counting the root.
/// The root consumes one level, and a node on the last level cannot declare branches.
pub const MAX_TREE_DEPTH: usize = 10;

/// Returns true if the Option holds a non-empty string.
/// Used throughout to implement the "present and non-empty" omission rule.
pub fn is_set(s: &Option<String>) -> bool {
    matches!(s, Some(s) if !s.is_empty())
}
