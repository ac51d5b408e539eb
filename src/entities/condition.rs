//! Conditions attached to tree nodes

use serde::{Deserialize, Serialize};
use std::fmt;

/// A constraint on the operational state of a node's descendant assemblies
///
/// Serialized with a `type` discriminant:
///
/// ```yaml
/// - type: REQUIRED_WORKING
///   requiredWorking: 2
/// - type: MAX_MAINTENANCE
///   maxUnderMaintenance: 1
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    /// At least this many descendant assemblies must be operating
    RequiredWorking {
        #[serde(rename = "requiredWorking")]
        required_working: u32,
    },

    /// At most this many descendant assemblies may be under maintenance.
    /// Deprecated: still parsed and evaluated, new plans use `RequiredWorking`.
    MaxMaintenance {
        #[serde(rename = "maxUnderMaintenance")]
        max_under_maintenance: u32,
    },
}

impl Condition {
    pub fn required_working(count: u32) -> Self {
        Condition::RequiredWorking {
            required_working: count,
        }
    }

    pub fn max_maintenance(count: u32) -> Self {
        Condition::MaxMaintenance {
            max_under_maintenance: count,
        }
    }

    pub fn is_deprecated(&self) -> bool {
        matches!(self, Condition::MaxMaintenance { .. })
    }

    /// Discriminant as written in project files
    pub fn type_name(&self) -> &'static str {
        match self {
            Condition::RequiredWorking { .. } => "REQUIRED_WORKING",
            Condition::MaxMaintenance { .. } => "MAX_MAINTENANCE",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::RequiredWorking { required_working } => {
                write!(f, "at least {} working", required_working)
            }
            Condition::MaxMaintenance {
                max_under_maintenance,
            } => write!(f, "at most {} under maintenance", max_under_maintenance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_serialization() {
        let json = serde_json::to_string(&Condition::required_working(2)).unwrap();
        assert_eq!(json, r#"{"type":"REQUIRED_WORKING","requiredWorking":2}"#);

        let legacy: Condition =
            serde_json::from_str(r#"{"type":"MAX_MAINTENANCE","maxUnderMaintenance":1}"#).unwrap();
        assert_eq!(legacy, Condition::max_maintenance(1));
        assert!(legacy.is_deprecated());
    }

    #[test]
    fn test_negative_count_rejected() {
        let parsed: Result<Condition, _> =
            serde_json::from_str(r#"{"type":"REQUIRED_WORKING","requiredWorking":-1}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Condition::required_working(3).to_string(), "at least 3 working");
        assert_eq!(
            Condition::max_maintenance(1).to_string(),
            "at most 1 under maintenance"
        );
    }
}
