//! Assembly type - catalog definition of an assembly's component slots

use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityPrefix;

/// One named position inside an assembly type, typed by a component type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSlot {
    /// Slot id, unique within the owning assembly type
    pub id: String,

    /// Component type this slot accepts (CTYPE-...)
    pub component_type_id: String,

    pub name: String,
}

/// Assembly type: an ordered list of component slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyType {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Component slots in display order
    #[serde(default)]
    pub components: Vec<ComponentSlot>,
}

impl AssemblyType {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            components: Vec::new(),
        }
    }

    /// Append a slot
    pub fn add_slot(
        &mut self,
        id: impl Into<String>,
        component_type_id: impl Into<String>,
        name: impl Into<String>,
    ) {
        self.components.push(ComponentSlot {
            id: id.into(),
            component_type_id: component_type_id.into(),
            name: name.into(),
        });
    }

    /// Look up a slot by id
    pub fn slot(&self, slot_id: &str) -> Option<&ComponentSlot> {
        self.components.iter().find(|slot| slot.id == slot_id)
    }
}

impl Entity for AssemblyType {
    const PREFIX: EntityPrefix = EntityPrefix::Atype;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_lookup() {
        let mut at = AssemblyType::new("ATYPE-1", "Pump");
        at.add_slot("S1", "CTYPE-1", "Bearing");
        at.add_slot("S2", "CTYPE-2", "Seal");

        assert_eq!(at.slot("S2").map(|s| s.name.as_str()), Some("Seal"));
        assert!(at.slot("S3").is_none());
    }

    #[test]
    fn test_camel_case_fields() {
        let json = r#"{"id":"ATYPE-1","name":"Pump","components":[{"id":"S1","componentTypeId":"CTYPE-1","name":"Bearing"}]}"#;
        let at: AssemblyType = serde_json::from_str(json).unwrap();
        assert_eq!(at.components[0].component_type_id, "CTYPE-1");
        assert!(at.description.is_empty());
    }
}
