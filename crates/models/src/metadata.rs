use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Metadata of a call-routing node.
///
/// Metadata is a flat union of every field used by any node type. Which
/// fields are meaningful for a given `node_type` is decided by the remote
/// system and is not checked here. Every field is optional: unset strings,
/// zero numbers, and empty lists are all omitted.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MetadataDef {
    /// # Message or prompt spoken to the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// # Reference to a recorded audio file played to the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<String>,
    /// # Voice and language used for text-to-speech.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    /// # Variable assigned by this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<VariableDef>,
    /// # Keypad options offered to the caller, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dtmf_options: Vec<DtmfOption>,
    /// # Identifier of the support hours which gate this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_hours_id: Option<String>,
    /// # Targets to be called, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub call_targets: Vec<CallTarget>,
    /// # Style in which call targets are dialed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_style: Option<String>,
    /// # Identifier of the alert source bound to this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_source_id: Option<String>,
    /// # Number of retries before giving up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    /// # Seconds to wait before timing out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
    /// # Caller numbers which are refused.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deny_list: Vec<String>,
    /// # Intents recognized from the caller's speech.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intents: Vec<Intent>,
    /// # Values gathered from the caller.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gathers: Vec<Gather>,
    /// # Enrichment of the call with external information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<EnrichmentDef>,
}

impl MetadataDef {
    /// Returns true if no field of the metadata is set.
    /// Empty metadata is equivalent to no metadata at all.
    pub fn is_empty(&self) -> bool {
        let Self {
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
        } = self;

        !crate::is_set(message)
            && !crate::is_set(audio_file)
            && !crate::is_set(voice)
            && variable.as_ref().map_or(true, VariableDef::is_empty)
            && dtmf_options.is_empty()
            && !crate::is_set(support_hours_id)
            && call_targets.is_empty()
            && !crate::is_set(call_style)
            && !crate::is_set(alert_source_id)
            && retry_count.unwrap_or_default() == 0
            && timeout_seconds.unwrap_or_default() == 0
            && deny_list.is_empty()
            && intents.is_empty()
            && gathers.is_empty()
            && enrichment.as_ref().map_or(true, EnrichmentDef::is_empty)
    }
}

/// A `key=value` variable assignment.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct VariableDef {
    /// # Name of the variable.
    pub key: String,
    /// # Value assigned to the variable.
    #[serde(default)]
    pub value: String,
}

impl VariableDef {
    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && self.value.is_empty()
    }
}

/// A keypad (DTMF) option.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DtmfOption {
    /// # Key pressed by the caller.
    pub code: String,
    /// # Label of the option.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
}

/// A target to be called.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CallTarget {
    /// # Identifier of the target.
    pub target: String,
    /// # Type of the target, such as a user or a schedule.
    #[serde(rename = "type")]
    pub target_type: String,
}

/// An intent recognized from the caller's speech.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Intent {
    #[serde(rename = "type")]
    pub intent_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// # Example utterances of the intent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// A value gathered from the caller by asking a question.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Gather {
    #[serde(rename = "type")]
    pub gather_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    /// # Type of the gathered variable.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub var_type: String,
    /// # Whether the caller must answer.
    #[serde(default)]
    pub required: bool,
    /// # Question asked of the caller.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub question: String,
}

/// Enrichment of a call with information from external sources.
///
/// `information_types` and `sources` behave as sets, and may not repeat an
/// entry. They are keyed maps on the wire. When read back against a desired
/// document they keep its order, and otherwise are in ascending order.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EnrichmentDef {
    #[serde(default)]
    pub enabled: bool,
    /// # Types of information to enrich the call with.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub information_types: Vec<String>,
    /// # Sources of enrichment information.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<EnrichmentSource>,
}

impl EnrichmentDef {
    pub fn is_empty(&self) -> bool {
        !self.enabled && self.information_types.is_empty() && self.sources.is_empty()
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EnrichmentSource {
    pub id: String,
    #[serde(rename = "type")]
    pub source_type: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_emptiness_follows_omission_rule() {
        assert!(MetadataDef::default().is_empty());

        // Zero values and empty strings don't count as set.
        let zeroed = MetadataDef {
            message: Some(String::new()),
            retry_count: Some(0),
            variable: Some(VariableDef::default()),
            enrichment: Some(EnrichmentDef::default()),
            ..Default::default()
        };
        assert!(zeroed.is_empty());

        let set = MetadataDef {
            timeout_seconds: Some(30),
            ..Default::default()
        };
        assert!(!set.is_empty());

        let enabled = MetadataDef {
            enrichment: Some(EnrichmentDef {
                enabled: true,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(!enabled.is_empty());
    }

    #[test]
    fn test_type_fields_use_bare_key() {
        let target: CallTarget =
            serde_json::from_value(serde_json::json!({"target": "u-1", "type": "user"})).unwrap();
        assert_eq!(target.target_type, "user");

        let err = serde_json::from_value::<CallTarget>(
            serde_json::json!({"target": "u-1", "target_type": "user"}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown field"), "{err}");
    }
}
