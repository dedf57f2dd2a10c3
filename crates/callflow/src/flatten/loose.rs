use crate::{domain, Error, Location};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// Decode a loosely-typed node, and the nodes of its branch targets.
//
// Fields are looked up by their camelCase wire keys, while errors are located
// by their snake_case configuration names. Absent fields, JSON nulls,
// empty strings and lists, and numbers which aren't strictly positive are
// all omitted, exactly as in the typed decoding.
pub(super) fn decode(loc: Location, node: &Map<String, Value>) -> Result<domain::Node, Error> {
    let fields = Fields { loc: &loc, map: node };

    let metadata = match fields.object("metadata", "metadata")? {
        Some(map) => {
            let loc = loc.push_prop("metadata");
            decode_metadata(Fields { loc: &loc, map })?
        }
        None => None,
    };

    let branches = fields.each_object("branches", "branches", |branch| {
        let target = match branch.object("target", "target")? {
            Some(target) => Some(Box::new(decode(branch.loc.push_prop("target"), target)?)),
            None => None,
        };
        Ok(domain::Branch {
            id: branch.id("id", "id")?,
            branch_type: branch.string("branch_type", "branchType")?.unwrap_or_default(),
            condition: branch.string("condition", "condition")?,
            target,
        })
    })?;

    Ok(domain::Node {
        id: fields.id("id", "id")?,
        name: fields.string("name", "name")?,
        node_type: fields.string("node_type", "nodeType")?.unwrap_or_default(),
        metadata,
        branches,
    })
}

fn decode_metadata(fields: Fields) -> Result<Option<domain::Metadata>, Error> {
    let variable = match fields.object("variable", "variable")? {
        Some(map) => {
            let loc = fields.loc.push_prop("variable");
            let variable = Fields { loc: &loc, map };
            Some(domain::Variable {
                key: variable.string("key", "key")?.unwrap_or_default(),
                value: variable.string("value", "value")?.unwrap_or_default(),
            })
            .filter(|v| !v.key.is_empty() || !v.value.is_empty())
        }
        None => None,
    };

    let enrichment = match fields.object("enrichment", "enrichment")? {
        Some(map) => {
            let loc = fields.loc.push_prop("enrichment");
            decode_enrichment(Fields { loc: &loc, map })?
        }
        None => None,
    };

    let out = domain::Metadata {
        message: fields.string("message", "message")?,
        audio_file: fields.string("audio_file", "audioFile")?,
        voice: fields.string("voice", "voice")?,
        variable,
        dtmf_options: fields.each_object("dtmf_options", "dtmfOptions", |option| {
            Ok(domain::DtmfOption {
                code: option.string("code", "code")?.unwrap_or_default(),
                label: option.string("label", "label")?.unwrap_or_default(),
            })
        })?,
        support_hours_id: fields.string("support_hours_id", "supportHoursId")?,
        call_targets: fields.each_object("call_targets", "callTargets", |target| {
            Ok(domain::CallTarget {
                target: target.string("target", "target")?.unwrap_or_default(),
                target_type: target.string("type", "type")?.unwrap_or_default(),
            })
        })?,
        call_style: fields.string("call_style", "callStyle")?,
        alert_source_id: fields.string("alert_source_id", "alertSourceId")?,
        retry_count: fields.positive_int("retry_count", "retryCount")?,
        timeout_seconds: fields.positive_int("timeout_seconds", "timeoutSeconds")?,
        deny_list: fields.strings("deny_list", "denyList")?,
        intents: fields.each_object("intents", "intents", |intent| {
            Ok(domain::Intent {
                intent_type: intent.string("type", "type")?.unwrap_or_default(),
                label: intent.string("label", "label")?.unwrap_or_default(),
                description: intent.string("description", "description")?.unwrap_or_default(),
                examples: intent.strings("examples", "examples")?,
            })
        })?,
        gathers: fields.each_object("gathers", "gathers", |gather| {
            Ok(domain::Gather {
                gather_type: gather.string("type", "type")?.unwrap_or_default(),
                label: gather.string("label", "label")?.unwrap_or_default(),
                var_type: gather.string("var_type", "varType")?.unwrap_or_default(),
                required: gather.boolean("required", "required")?,
                question: gather.string("question", "question")?.unwrap_or_default(),
            })
        })?,
        enrichment,
    };

    Ok(if out.is_empty() { None } else { Some(out) })
}

fn decode_enrichment(fields: Fields) -> Result<Option<domain::Enrichment>, Error> {
    let mut information_types = BTreeMap::new();
    if let Some(map) = fields.object("information_types", "informationTypes")? {
        let loc = fields.loc.push_prop("information_types");

        for (info, on) in map {
            match on {
                Value::Bool(true) => {
                    information_types.insert(info.clone(), true);
                }
                Value::Bool(false) | Value::Null => (),
                other => return Err(Error::shape(loc.push_prop(info), "a boolean", other)),
            }
        }
    }

    let mut sources = BTreeMap::new();
    if let Some(map) = fields.object("sources", "sources")? {
        let loc = fields.loc.push_prop("sources");

        for (id, source) in map {
            let item = loc.push_prop(id);
            let Value::Object(source) = source else {
                return Err(Error::shape(item, "an object", source));
            };
            let source = Fields {
                loc: &item,
                map: source,
            };
            sources.insert(
                id.clone(),
                domain::EnrichmentSource {
                    source_type: source.string("type", "type")?.unwrap_or_default(),
                },
            );
        }
    }

    let out = domain::Enrichment {
        enabled: fields.boolean("enabled", "enabled")?,
        information_types,
        sources,
    };
    Ok(if out.is_empty() { None } else { Some(out) })
}

/// Fields of a loosely-typed JSON object, located within the document.
struct Fields<'m, 'l> {
    loc: &'l Location<'l>,
    map: &'m Map<String, Value>,
}

impl<'m, 'l> Fields<'m, 'l> {
    // JSON nulls are treated as absent.
    fn get(&self, key: &str) -> Option<&'m Value> {
        self.map.get(key).filter(|value| !value.is_null())
    }

    fn string(&self, field: &str, key: &str) -> Result<Option<String>, Error> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(Error::shape(self.loc.push_prop(field), "a string", other)),
        }
    }

    // Ids are usually strings, but integer ids are accepted as well.
    fn id(&self, field: &str, key: &str) -> Result<Option<String>, Error> {
        match self.get(key) {
            Some(Value::Number(n)) if n.is_u64() || n.is_i64() => Ok(Some(n.to_string())),
            Some(Value::Number(n)) => Err(Error::shape(
                self.loc.push_prop(field),
                "a string or integer id",
                &Value::Number(n.clone()),
            )),
            _ => self.string(field, key),
        }
    }

    fn boolean(&self, field: &str, key: &str) -> Result<bool, Error> {
        match self.get(key) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(Error::shape(self.loc.push_prop(field), "a boolean", other)),
        }
    }

    // Loosely-typed numbers are usually floating-point. Values which
    // aren't strictly positive are omitted before any coercion.
    fn positive_int(&self, field: &str, key: &str) -> Result<Option<u32>, Error> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let Some(n) = value.as_f64() else {
            return Err(Error::shape(self.loc.push_prop(field), "a number", value));
        };
        if n <= 0.0 {
            Ok(None)
        } else if n.fract() != 0.0 || n > u32::MAX as f64 {
            Err(Error::shape(
                self.loc.push_prop(field),
                "a positive 32-bit integer",
                value,
            ))
        } else {
            Ok(Some(n as u32))
        }
    }

    fn object(&self, field: &str, key: &str) -> Result<Option<&'m Map<String, Value>>, Error> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(Error::shape(self.loc.push_prop(field), "an object", other)),
        }
    }

    fn array(&self, field: &str, key: &str) -> Result<&'m [Value], Error> {
        match self.get(key) {
            None => Ok(&[]),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(Error::shape(self.loc.push_prop(field), "an array", other)),
        }
    }

    fn strings(&self, field: &str, key: &str) -> Result<Vec<String>, Error> {
        let loc = self.loc.push_prop(field);

        self.array(field, key)?
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(Error::shape(loc.push_item(index), "a string", other)),
            })
            .collect()
    }

    // Map each object item of the array at `key` through `f`.
    fn each_object<T>(
        &self,
        field: &str,
        key: &str,
        mut f: impl FnMut(Fields<'m, '_>) -> Result<T, Error>,
    ) -> Result<Vec<T>, Error> {
        let loc = self.loc.push_prop(field);

        self.array(field, key)?
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let item_loc = loc.push_item(index);
                match item {
                    Value::Object(map) => f(Fields {
                        loc: &item_loc,
                        map,
                    }),
                    other => Err(Error::shape(item_loc, "an object", other)),
                }
            })
            .collect()
    }
}
