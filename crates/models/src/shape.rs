use super::{AssignedNumber, MetadataDef, Reference};
use schemars::generate::{SchemaGenerator, SchemaSettings};
use schemars::{json_schema, Schema};

/// Generate a statically finite JSON schema of a CallFlow document,
/// whose call-routing tree is bounded to `max_depth` node levels.
///
/// Some declarative front-ends can't express a recursive type. For those,
/// the tree is unrolled into `max_depth` distinct node shapes
/// `NodeLevel1 ..= NodeLevel{max_depth}`, joined by branch shapes
/// `BranchLevel{n}` whose `target` is `NodeLevel{n+1}`. The innermost
/// node shape has no `branches` property at all.
///
/// A `max_depth` of zero is treated as one: the root always exists.
pub fn bounded_shape(max_depth: usize) -> Schema {
    let max_depth = max_depth.max(1);
    let mut generator = SchemaGenerator::new(SchemaSettings::draft2019_09());

    let metadata = generator.subschema_for::<MetadataDef>();
    let reference = generator.subschema_for::<Reference>();
    let assigned_number = generator.subschema_for::<AssignedNumber>();

    let mut defs = generator.definitions().clone();
    for level in 1..=max_depth {
        defs.insert(
            node_name(level),
            node_shape(level, max_depth, &metadata).to_value(),
        );
        if level != max_depth {
            defs.insert(branch_name(level), branch_shape(level).to_value());
        }
    }
    let meta_schema = generator.settings().meta_schema.clone();

    json_schema!({
        "$schema": meta_schema,
        "title": "CallFlowDef",
        "description": format!("A call flow whose routing tree has at most {max_depth} levels."),
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "language": {"type": "string"},
            "teams": {"type": "array", "items": reference},
            "root": {"$ref": def_ref(&node_name(1))},
            "assigned_number": {
                "allOf": [assigned_number],
                "readOnly": true,
            },
        },
        "required": ["name", "language", "root"],
        "additionalProperties": false,
        "$defs": defs,
    })
}

fn node_name(level: usize) -> String {
    format!("NodeLevel{level}")
}

fn branch_name(level: usize) -> String {
    format!("BranchLevel{level}")
}

fn def_ref(name: &str) -> String {
    format!("#/$defs/{name}")
}

fn node_shape(level: usize, max_depth: usize, metadata: &Schema) -> Schema {
    let mut shape = json_schema!({
        "description": format!("Call-routing node at level {level} of {max_depth}."),
        "type": "object",
        "properties": {
            "id": {"type": "string", "readOnly": true},
            "name": {"type": "string"},
            "node_type": {"type": "string"},
            "metadata": metadata,
        },
        "required": ["node_type"],
        "additionalProperties": false,
    });

    // The innermost level cannot declare branches.
    if level != max_depth {
        if let Some(properties) = shape
            .get_mut("properties")
            .and_then(serde_json::Value::as_object_mut)
        {
            properties.insert(
                "branches".to_string(),
                serde_json::json!({
                    "type": "array",
                    "items": {"$ref": def_ref(&branch_name(level))},
                }),
            );
        }
    }
    shape
}

fn branch_shape(level: usize) -> Schema {
    json_schema!({
        "description": format!("Branch out of a node at level {level}."),
        "type": "object",
        "properties": {
            "id": {"type": "string", "readOnly": true},
            "branch_type": {"type": "string"},
            "condition": {"type": "string"},
            "target": {"$ref": def_ref(&node_name(level + 1))},
        },
        "required": ["branch_type"],
        "additionalProperties": false,
    })
}
