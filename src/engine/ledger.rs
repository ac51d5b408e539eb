//! Append-only history: unit assignments and maintenance events
//!
//! Both functions check a new record against the project and return the
//! extended list. Existing entries are never edited or removed.

use chrono::{DateTime, Utc};

use crate::core::error::CoreError;
use crate::core::identity::EntityPrefix;
use crate::engine::catalog::{find_unit, slot_ref};
use crate::engine::hierarchy::find_maintenance_type;
use crate::entities::assignment::{ComponentOfAssembly, MaintenanceEvent, UnitAssignment};
use crate::entities::project::Project;

/// Bind `unit_id` to a slot from `at` on
///
/// The unit's part model must fit the slot's component type.
pub fn assign_unit(
    project: &Project,
    assembly_id: &str,
    slot_id: &str,
    unit_id: &str,
    at: DateTime<Utc>,
    custom: bool,
) -> Result<Vec<UnitAssignment>, CoreError> {
    let target = slot_ref(project, assembly_id, slot_id)?;
    let (part_model, _) =
        find_unit(project, unit_id).ok_or_else(|| CoreError::not_found(EntityPrefix::Unit, unit_id))?;

    if part_model.component_type_id != target.slot.component_type_id {
        return Err(CoreError::consistency(format!(
            "unit {} is a {} part ({}) but slot {} takes {}",
            unit_id,
            part_model.name,
            part_model.component_type_id,
            slot_id,
            target.slot.component_type_id
        )));
    }

    let mut ledger = project.assignments.clone();
    ledger.push(UnitAssignment {
        unit_id: unit_id.to_string(),
        component_of_assembly: ComponentOfAssembly::new(assembly_id, slot_id),
        date_time: at,
        custom,
    });
    Ok(ledger)
}

/// Append a maintenance event after checking its references
///
/// The maintenance type must belong to the unit's part model, and the unit
/// must fit the addressed slot.
pub fn record_maintenance_event(
    project: &Project,
    event: MaintenanceEvent,
) -> Result<Vec<MaintenanceEvent>, CoreError> {
    let target = &event.component_of_assembly;
    let slot_id = target
        .slot_id()
        .ok_or_else(|| CoreError::validation(vec!["component path is empty".to_string()]))?;
    let slot = slot_ref(project, &target.assembly_id, slot_id)?.slot;

    let (part_model, _) = find_unit(project, &event.unit_id)
        .ok_or_else(|| CoreError::not_found(EntityPrefix::Unit, event.unit_id.as_str()))?;
    if part_model.component_type_id != slot.component_type_id {
        return Err(CoreError::consistency(format!(
            "unit {} does not fit slot {}",
            event.unit_id, slot_id
        )));
    }
    if find_maintenance_type(&part_model.maintenance_types, &event.maintenance_type_id).is_none() {
        return Err(CoreError::not_found(
            EntityPrefix::Mtype,
            event.maintenance_type_id.as_str(),
        ));
    }

    let mut events = project.maintenance_events.clone();
    events.push(event);
    Ok(events)
}
