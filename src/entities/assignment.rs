//! Ledger records - unit assignments and maintenance events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Address of a component slot on an assembly instance
///
/// `component_path` is a path of slot ids so nested assemblies can be
/// addressed later; today it always holds a single slot id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentOfAssembly {
    pub assembly_id: String,

    pub component_path: Vec<String>,
}

impl ComponentOfAssembly {
    /// Address a top-level slot
    pub fn new(assembly_id: impl Into<String>, slot_id: impl Into<String>) -> Self {
        Self {
            assembly_id: assembly_id.into(),
            component_path: vec![slot_id.into()],
        }
    }

    /// Whether this address points at (or through) the given slot
    pub fn targets(&self, assembly_id: &str, slot_id: &str) -> bool {
        self.assembly_id == assembly_id && self.component_path.iter().any(|s| s == slot_id)
    }

    /// The slot the path ends in
    pub fn slot_id(&self) -> Option<&str> {
        self.component_path.last().map(String::as_str)
    }
}

/// Ledger entry: from `date_time` on, `unit_id` occupies the slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitAssignment {
    pub unit_id: String,

    pub component_of_assembly: ComponentOfAssembly,

    pub date_time: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub custom: bool,
}

/// A scheduled or ad-hoc (`custom`) maintenance occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceEvent {
    /// Minted when the event is recorded; optional in older project files
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    pub maintenance_type_id: String,

    pub unit_id: String,

    pub component_of_assembly: ComponentOfAssembly,

    pub date_time: DateTime<Utc>,

    #[serde(default)]
    pub custom: bool,
}
