use crate::{Error, Location};
use models::{CallFlowDef, NodeDef};

/// Verify that the tree rooted at `node` has at most `max_depth` node levels.
/// The root is the first level, so a node on level `max_depth` may not
/// route onward to another node. On failure, the error points to the first
/// node found beyond the bound.
pub fn check_depth(node: &NodeDef, max_depth: usize) -> Result<(), Error> {
    walk(Location::Root, node, 1, max_depth)
}

/// Verify the depth of a CallFlow's tree. Errors point into the CallFlow document.
pub fn check_call_flow(flow: &CallFlowDef, max_depth: usize) -> Result<(), Error> {
    let root = Location::Root;
    walk(root.push_prop("root"), &flow.root, 1, max_depth)
}

fn walk(loc: Location, node: &NodeDef, level: usize, max_depth: usize) -> Result<(), Error> {
    if level > max_depth {
        return Err(Error::DepthExceeded {
            ptr: loc.pointer_str().to_string(),
            max_depth,
        });
    }
    let branches = loc.push_prop("branches");

    for (index, branch) in node.branches.iter().enumerate() {
        if let Some(target) = &branch.target {
            let item = branches.push_item(index);
            walk(item.push_prop("target"), target, level + 1, max_depth)?;
        }
    }
    Ok(())
}
