//! Project aggregate - one immutable snapshot of a maintenance plan
//!
//! The project owns the catalogs, the equipment tree, the append-only unit
//! assignment ledger and the maintenance event log. Commands never edit a
//! snapshot; they build the next one (see [`crate::core::planner`]).

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::entity::find_by_id;
use crate::core::error::CoreError;
use crate::entities::assembly_type::AssemblyType;
use crate::entities::assignment::{MaintenanceEvent, UnitAssignment};
use crate::entities::component_type::ComponentType;
use crate::entities::part_model::PartModel;
use crate::entities::tree::TreeNode;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub component_types: Vec<ComponentType>,

    #[serde(default)]
    pub assembly_types: Vec<AssemblyType>,

    #[serde(default)]
    pub part_models: Vec<PartModel>,

    /// Equipment tree roots
    #[serde(default)]
    pub tree: Vec<Arc<TreeNode>>,

    /// Unit assignment ledger, in append order
    #[serde(default)]
    pub assignments: Vec<UnitAssignment>,

    #[serde(default)]
    pub maintenance_events: Vec<MaintenanceEvent>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn component_type(&self, id: &str) -> Result<&ComponentType, CoreError> {
        find_by_id(&self.component_types, id)
    }

    pub fn assembly_type(&self, id: &str) -> Result<&AssemblyType, CoreError> {
        find_by_id(&self.assembly_types, id)
    }

    pub fn part_model(&self, id: &str) -> Result<&PartModel, CoreError> {
        find_by_id(&self.part_models, id)
    }
}
