//! Part model entity - a replaceable part with its maintenance plan and unit pool

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityPrefix;
use crate::entities::maintenance_type::MaintenanceType;

/// One physical, serialized instance of a part model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub serial_number: String,

    #[serde(default)]
    pub manufacture_date: Option<NaiveDate>,

    #[serde(default)]
    pub description: String,

    /// Owning part model (back-reference)
    pub part_model_id: String,
}

impl Unit {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        part_model_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            serial_number: String::new(),
            manufacture_date: None,
            description: String::new(),
            part_model_id: part_model_id.into(),
        }
    }
}

impl Entity for Unit {
    const PREFIX: EntityPrefix = EntityPrefix::Unit;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Catalog entry for a replaceable part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartModel {
    pub id: String,

    pub name: String,

    /// Manufacturer part number, unique across the catalog
    pub uid: String,

    #[serde(default)]
    pub specification: String,

    /// Component type of the slots this part fits
    pub component_type_id: String,

    #[serde(default)]
    pub maintenance_types: Vec<MaintenanceType>,

    #[serde(default)]
    pub units: Vec<Unit>,
}

impl PartModel {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        uid: impl Into<String>,
        component_type_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            uid: uid.into(),
            specification: String::new(),
            component_type_id: component_type_id.into(),
            maintenance_types: Vec::new(),
            units: Vec::new(),
        }
    }

    /// Add a unit to the pool, wiring its back-reference
    pub fn add_unit(&mut self, id: impl Into<String>, name: impl Into<String>) {
        let unit = Unit::new(id, name, self.id.clone());
        self.units.push(unit);
    }

    pub fn unit(&self, unit_id: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == unit_id)
    }
}

impl Entity for PartModel {
    const PREFIX: EntityPrefix = EntityPrefix::Pmod;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
