use super::*;

impl CallFlowDef {
    pub fn example() -> Self {
        Self {
            name: "Support line".to_string(),
            language: "en".to_string(),
            teams: vec![Reference::named(7, "Platform")],
            root: NodeDef::example(),
            assigned_number: None,
        }
    }
}

impl NodeDef {
    pub fn example() -> Self {
        let voicemail = NodeDef {
            name: Some("Leave a message".to_string()),
            metadata: Some(MetadataDef {
                message: Some("Please leave a message after the tone.".to_string()),
                alert_source_id: Some("as-1".to_string()),
                ..Default::default()
            }),
            ..NodeDef::new("voicemail")
        };
        let dial = NodeDef {
            name: Some("Call on-call".to_string()),
            metadata: Some(MetadataDef {
                call_targets: vec![CallTarget::example()],
                call_style: Some("sequential".to_string()),
                retry_count: Some(2),
                timeout_seconds: Some(30),
                ..Default::default()
            }),
            branches: vec![BranchDef {
                condition: Some("no_answer".to_string()),
                ..BranchDef::new("fallback").to(voicemail)
            }],
            ..NodeDef::new("dial")
        };

        NodeDef {
            name: Some("Greeting".to_string()),
            metadata: Some(MetadataDef {
                message: Some("Press 1 for support.".to_string()),
                dtmf_options: vec![DtmfOption::example()],
                ..Default::default()
            }),
            branches: vec![BranchDef {
                condition: Some("digit == 1".to_string()),
                ..BranchDef::new("dtmf").to(dial)
            }],
            ..NodeDef::new("greeting")
        }
    }
}

impl DtmfOption {
    pub fn example() -> Self {
        Self {
            code: "1".to_string(),
            label: "Support".to_string(),
        }
    }
}

impl CallTarget {
    pub fn example() -> Self {
        Self {
            target: "schedule-1".to_string(),
            target_type: "schedule".to_string(),
        }
    }
}

impl EnrichmentDef {
    pub fn example() -> Self {
        Self {
            enabled: true,
            information_types: vec!["account".to_string(), "incidents".to_string()],
            sources: vec![EnrichmentSource {
                id: "src-1".to_string(),
                source_type: "crm".to_string(),
            }],
        }
    }
}
