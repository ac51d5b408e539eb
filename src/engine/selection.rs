//! Cascading slot selection: assembly, then component slot, then part model,
//! then unit
//!
//! Choosing a level clears every level below it, so a selection can never
//! hold a unit that does not fit the chosen slot.

use crate::core::error::CoreError;
use crate::core::identity::EntityPrefix;
use crate::engine::catalog::{part_models_for_component_type, slot_ref};
use crate::engine::hierarchy::{flatten_maintenance_types, FlatMaintenanceType};
use crate::engine::tree::list_assemblies;
use crate::entities::assembly_type::ComponentSlot;
use crate::entities::assignment::ComponentOfAssembly;
use crate::entities::part_model::{PartModel, Unit};
use crate::entities::project::Project;
use crate::entities::tree::Assembly;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotSelection {
    assembly_id: Option<String>,
    component_id: Option<String>,
    part_model_id: Option<String>,
    unit_id: Option<String>,
}

impl SlotSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assembly_id(&self) -> Option<&str> {
        self.assembly_id.as_deref()
    }

    pub fn component_id(&self) -> Option<&str> {
        self.component_id.as_deref()
    }

    pub fn part_model_id(&self) -> Option<&str> {
        self.part_model_id.as_deref()
    }

    pub fn unit_id(&self) -> Option<&str> {
        self.unit_id.as_deref()
    }

    pub fn select_assembly(&mut self, project: &Project, assembly_id: &str) -> Result<(), CoreError> {
        if !self.assembly_options(project).iter().any(|a| a.id == assembly_id) {
            return Err(CoreError::not_found(EntityPrefix::Asm, assembly_id));
        }
        self.assembly_id = Some(assembly_id.to_string());
        self.component_id = None;
        self.part_model_id = None;
        self.unit_id = None;
        Ok(())
    }

    pub fn select_component(&mut self, project: &Project, slot_id: &str) -> Result<(), CoreError> {
        let assembly_id = self.require(&self.assembly_id, "assembly")?;
        slot_ref(project, assembly_id, slot_id)?;
        self.component_id = Some(slot_id.to_string());
        self.part_model_id = None;
        self.unit_id = None;
        Ok(())
    }

    pub fn select_part_model(&mut self, project: &Project, part_model_id: &str) -> Result<(), CoreError> {
        self.require(&self.component_id, "component slot")?;
        if !self.part_model_options(project).iter().any(|pm| pm.id == part_model_id) {
            return Err(CoreError::consistency(format!(
                "part model {} does not fit the selected slot",
                part_model_id
            )));
        }
        self.part_model_id = Some(part_model_id.to_string());
        self.unit_id = None;
        Ok(())
    }

    pub fn select_unit(&mut self, project: &Project, unit_id: &str) -> Result<(), CoreError> {
        self.require(&self.part_model_id, "part model")?;
        if !self.unit_options(project).iter().any(|u| u.id == unit_id) {
            return Err(CoreError::not_found(EntityPrefix::Unit, unit_id));
        }
        self.unit_id = Some(unit_id.to_string());
        Ok(())
    }

    pub fn assembly_options<'a>(&self, project: &'a Project) -> Vec<&'a Assembly> {
        list_assemblies(&project.tree)
    }

    pub fn component_options<'a>(&self, project: &'a Project) -> Vec<&'a ComponentSlot> {
        let Some(assembly_id) = self.assembly_id.as_deref() else {
            return Vec::new();
        };
        crate::engine::tree::find_assembly(&project.tree, assembly_id)
            .and_then(|a| project.assembly_type(&a.assembly_type_id).ok())
            .map(|at| at.components.iter().collect::<Vec<_>>())
            .unwrap_or_default()
    }

    pub fn part_model_options<'a>(&self, project: &'a Project) -> Vec<&'a PartModel> {
        let (Some(assembly_id), Some(slot_id)) = (self.assembly_id(), self.component_id()) else {
            return Vec::new();
        };
        match slot_ref(project, assembly_id, slot_id) {
            Ok(target) => part_models_for_component_type(project, &target.slot.component_type_id),
            Err(_) => Vec::new(),
        }
    }

    pub fn unit_options<'a>(&self, project: &'a Project) -> Vec<&'a Unit> {
        self.selected_part_model(project)
            .map(|pm| pm.units.iter().collect::<Vec<_>>())
            .unwrap_or_default()
    }

    /// Maintenance types of the selected part model, flattened for a picker
    pub fn maintenance_type_options<'a>(&self, project: &'a Project) -> Vec<FlatMaintenanceType<'a>> {
        self.selected_part_model(project)
            .map(|pm| flatten_maintenance_types(&pm.maintenance_types))
            .unwrap_or_default()
    }

    /// Address of the selected slot, once assembly and slot are chosen
    pub fn target(&self) -> Option<ComponentOfAssembly> {
        Some(ComponentOfAssembly::new(
            self.assembly_id.as_deref()?,
            self.component_id.as_deref()?,
        ))
    }

    fn selected_part_model<'a>(&self, project: &'a Project) -> Option<&'a PartModel> {
        project.part_model(self.part_model_id.as_deref()?).ok()
    }

    fn require<'s>(&self, level: &'s Option<String>, name: &str) -> Result<&'s str, CoreError> {
        level
            .as_deref()
            .ok_or_else(|| CoreError::validation(vec![format!("select a {} first", name)]))
    }
}
