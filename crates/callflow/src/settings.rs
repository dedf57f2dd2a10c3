use serde::{Deserialize, Serialize};

/// Settings which tune how CallFlows are built and flattened.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Maximum number of node levels of a call-routing tree, counting the root.
    pub max_depth: usize,
    /// What to do when an authored tree is deeper than `max_depth`.
    pub depth_policy: DepthPolicy,
    /// What to do when desired and remote reference lists differ in length.
    pub echo_length_policy: LengthPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: models::MAX_TREE_DEPTH,
            depth_policy: DepthPolicy::default(),
            echo_length_policy: LengthPolicy::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DepthPolicy {
    /// Refuse to build a tree deeper than the maximum depth.
    #[default]
    Reject,
    /// Build the tree anyway, logging a warning.
    Accept,
}

/// Policy for reference lists whose desired and remote lengths differ.
/// Entries are correlated by position, so only the overhanging tail is affected.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LengthPolicy {
    /// Drop entries beyond the shorter of the two lists.
    #[default]
    Truncate,
    /// Append remote entries beyond the desired list as bare ids.
    Extend,
    /// Fail with a `LengthMismatch` error.
    Reject,
}

impl std::str::FromStr for DepthPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reject" => Ok(Self::Reject),
            "accept" => Ok(Self::Accept),
            _ => Err(format!("invalid depth policy {s:?} (expected reject or accept)")),
        }
    }
}

impl std::str::FromStr for LengthPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "truncate" => Ok(Self::Truncate),
            "extend" => Ok(Self::Extend),
            "reject" => Ok(Self::Reject),
            _ => Err(format!(
                "invalid length policy {s:?} (expected truncate, extend, or reject)"
            )),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.max_depth, 10);
        assert_eq!(settings.depth_policy, DepthPolicy::Reject);
        assert_eq!(settings.echo_length_policy, LengthPolicy::Truncate);

        let settings: Settings = serde_json::from_value(serde_json::json!({
            "max_depth": 4,
            "echo_length_policy": "extend",
        }))
        .unwrap();
        assert_eq!(settings.max_depth, 4);
        assert_eq!(settings.echo_length_policy, LengthPolicy::Extend);
        assert_eq!(settings.depth_policy, DepthPolicy::Reject);
    }

    #[test]
    fn test_policies_parse_from_strings() {
        assert_eq!("accept".parse::<DepthPolicy>(), Ok(DepthPolicy::Accept));
        assert_eq!("reject".parse::<LengthPolicy>(), Ok(LengthPolicy::Reject));
        assert!("sometimes".parse::<LengthPolicy>().is_err());
    }
}
