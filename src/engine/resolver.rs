//! Temporal resolution of slot occupancy from the unit assignment ledger
//!
//! Two lookups are kept apart on purpose:
//!
//! - *strict* ([`resolve_unit_for_slot`]) answers from the ledger only and is
//!   the sole source of assignment history;
//! - *best effort* ([`default_unit_for_slot`]) picks the first compatible unit
//!   from the catalog and is only meant for seeding new maintenance events.
//!
//! [`unit_for_new_event`] combines them but tags which one answered.
//!
//! Tie-break: ledger entries with equal timestamps keep append order and the
//! last appended one wins.

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use thiserror::Error;

use crate::core::error::CoreError;
use crate::core::identity::EntityPrefix;
use crate::engine::catalog::{part_models_for_component_type, slot_ref};
use crate::entities::assembly_type::ComponentSlot;
use crate::entities::assignment::{ComponentOfAssembly, UnitAssignment};
use crate::entities::part_model::Unit;
use crate::entities::project::Project;

/// Failures of slot resolution
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum ResolveError {
    #[error("assembly not found: {0}")]
    #[diagnostic(code(plantree::resolve::assembly))]
    AssemblyNotFound(String),

    #[error("slot {slot_id} is not part of assembly {assembly_id}")]
    #[diagnostic(
        code(plantree::resolve::slot),
        help("List the slots of the assembly with `plantree unit occupancy`")
    )]
    SlotNotFound {
        assembly_id: String,
        slot_id: String,
    },

    #[error("no unit assigned to slot {slot_id} of assembly {assembly_id} as of {as_of}")]
    #[diagnostic(code(plantree::resolve::unassigned))]
    NoUnitAssigned {
        assembly_id: String,
        slot_id: String,
        as_of: DateTime<Utc>,
    },
}

impl From<ResolveError> for CoreError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::AssemblyNotFound(id) => CoreError::not_found(EntityPrefix::Asm, id),
            ResolveError::SlotNotFound {
                assembly_id,
                slot_id,
            } => CoreError::not_found(EntityPrefix::Slot, format!("{}/{}", assembly_id, slot_id)),
            ResolveError::NoUnitAssigned {
                assembly_id,
                slot_id,
                ..
            } => CoreError::NotFound {
                kind: "unit assignment",
                id: format!("{}/{}", assembly_id, slot_id),
            },
        }
    }
}

/// How a unit for a new maintenance event was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventUnit<'a> {
    /// The slot's occupant according to the ledger
    Assigned(&'a str),
    /// No ledger entry yet; first compatible unit of the catalog
    Default(&'a str),
}

impl<'a> EventUnit<'a> {
    pub fn unit_id(&self) -> &'a str {
        match *self {
            EventUnit::Assigned(id) | EventUnit::Default(id) => id,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, EventUnit::Default(_))
    }
}

/// A slot of an assembly with its occupant at some instant
#[derive(Debug, Clone, PartialEq)]
pub struct SlotOccupancy<'a> {
    pub slot: &'a ComponentSlot,
    pub unit_id: Option<&'a str>,
}

/// Most recent ledger entry for the slot at or before `as_of`
///
/// Pure ledger scan; does not check that the assembly or slot exist.
pub fn latest_assignment<'a>(
    ledger: &'a [UnitAssignment],
    assembly_id: &str,
    slot_id: &str,
    as_of: DateTime<Utc>,
) -> Option<&'a UnitAssignment> {
    ledger
        .iter()
        .enumerate()
        .filter(|(_, entry)| {
            entry.component_of_assembly.targets(assembly_id, slot_id) && entry.date_time <= as_of
        })
        .max_by_key(|(index, entry)| (entry.date_time, *index))
        .map(|(_, entry)| entry)
}

/// Which unit occupies the slot at `as_of`, strictly from the ledger
pub fn resolve_unit_for_slot<'a>(
    project: &'a Project,
    assembly_id: &str,
    slot_id: &str,
    as_of: DateTime<Utc>,
) -> Result<&'a str, ResolveError> {
    slot_ref(project, assembly_id, slot_id)?;

    latest_assignment(&project.assignments, assembly_id, slot_id, as_of)
        .map(|entry| entry.unit_id.as_str())
        .ok_or_else(|| ResolveError::NoUnitAssigned {
            assembly_id: assembly_id.to_string(),
            slot_id: slot_id.to_string(),
            as_of,
        })
}

/// First unit of the first part model whose component type fits the slot
///
/// Best effort only: never use this to display assignment history.
pub fn default_unit_for_slot<'a>(
    project: &'a Project,
    assembly_id: &str,
    slot_id: &str,
) -> Result<Option<&'a Unit>, ResolveError> {
    let target = slot_ref(project, assembly_id, slot_id)?;
    Ok(
        part_models_for_component_type(project, &target.slot.component_type_id)
            .into_iter()
            .find_map(|pm| pm.units.first()),
    )
}

/// Unit to attach to a new maintenance event on the slot
///
/// Prefers the strict occupant; falls back to the default unit only when
/// `allow_default` is set and the ledger has nothing for the slot yet.
pub fn unit_for_new_event<'a>(
    project: &'a Project,
    assembly_id: &str,
    slot_id: &str,
    as_of: DateTime<Utc>,
    allow_default: bool,
) -> Result<EventUnit<'a>, ResolveError> {
    match resolve_unit_for_slot(project, assembly_id, slot_id, as_of) {
        Ok(unit_id) => Ok(EventUnit::Assigned(unit_id)),
        Err(err @ ResolveError::NoUnitAssigned { .. }) => {
            if !allow_default {
                return Err(err);
            }
            match default_unit_for_slot(project, assembly_id, slot_id)? {
                Some(unit) => Ok(EventUnit::Default(unit.id.as_str())),
                None => Err(err),
            }
        }
        Err(err) => Err(err),
    }
}

/// All ledger entries for the slot, newest first
///
/// Entries with equal timestamps are listed last-appended first, matching
/// the resolution tie-break.
pub fn assignment_history<'a>(
    ledger: &'a [UnitAssignment],
    assembly_id: &str,
    slot_id: &str,
) -> Vec<&'a UnitAssignment> {
    let mut entries: Vec<(usize, &UnitAssignment)> = ledger
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.component_of_assembly.targets(assembly_id, slot_id))
        .collect();
    entries.sort_by(|(ia, a), (ib, b)| (b.date_time, *ib).cmp(&(a.date_time, *ia)));
    entries.into_iter().map(|(_, entry)| entry).collect()
}

/// Every slot of the assembly with its strict occupant at `as_of`
pub fn slot_occupancy<'a>(
    project: &'a Project,
    assembly_id: &str,
    as_of: DateTime<Utc>,
) -> Result<Vec<SlotOccupancy<'a>>, ResolveError> {
    let assembly = crate::engine::tree::find_assembly(&project.tree, assembly_id)
        .ok_or_else(|| ResolveError::AssemblyNotFound(assembly_id.to_string()))?;
    let Ok(assembly_type) = project.assembly_type(&assembly.assembly_type_id) else {
        return Ok(Vec::new());
    };

    Ok(assembly_type
        .components
        .iter()
        .map(|slot| SlotOccupancy {
            slot,
            unit_id: latest_assignment(&project.assignments, assembly_id, &slot.id, as_of)
                .map(|entry| entry.unit_id.as_str()),
        })
        .collect())
}

/// The slot a unit occupies at `as_of`, if any
///
/// A unit is in a slot when its own latest assignment points there and no
/// later entry has put another unit into that slot since.
pub fn locate_unit<'a>(
    ledger: &'a [UnitAssignment],
    unit_id: &str,
    as_of: DateTime<Utc>,
) -> Option<&'a ComponentOfAssembly> {
    let (_, entry) = ledger
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.unit_id == unit_id && entry.date_time <= as_of)
        .max_by_key(|(index, entry)| (entry.date_time, *index))?;

    let target = &entry.component_of_assembly;
    let slot_id = target.slot_id()?;
    let occupant = latest_assignment(ledger, &target.assembly_id, slot_id, as_of)?;
    (occupant.unit_id == unit_id).then_some(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::assembly_type::AssemblyType;
    use crate::entities::component_type::ComponentType;
    use crate::entities::part_model::PartModel;
    use crate::entities::tree::{Assembly, Node};
    use chrono::TimeZone;
    use std::sync::Arc;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn assign(unit: &str, assembly: &str, slot: &str, at: DateTime<Utc>) -> UnitAssignment {
        UnitAssignment {
            unit_id: unit.to_string(),
            component_of_assembly: ComponentOfAssembly::new(assembly, slot),
            date_time: at,
            custom: false,
        }
    }

    fn project() -> Project {
        let mut project = Project::new("test");
        project.component_types = vec![
            ComponentType::new("CT-BRG", "Bearing"),
            ComponentType::new("CT-SEAL", "Seal"),
        ];
        let mut pump = AssemblyType::new("AT-PUMP", "Pump");
        pump.add_slot("S", "CT-BRG", "Drive bearing");
        pump.add_slot("T", "CT-SEAL", "Shaft seal");
        project.assembly_types = vec![pump];

        let mut bearings = PartModel::new("PM-BRG", "Bearing 6204", "6204", "CT-BRG");
        bearings.add_unit("U1", "Bearing #1");
        bearings.add_unit("U2", "Bearing #2");
        let seals = PartModel::new("PM-SEAL", "Seal", "S-1", "CT-SEAL");
        project.part_models = vec![seals, bearings];

        let site = Node::new("N", "Site").with_child(Assembly::new("X", "Pump X", "AT-PUMP"));
        project.tree = vec![Arc::new(site.into())];
        project
    }

    #[test]
    fn test_empty_ledger_is_not_assigned() {
        let p = project();
        assert!(matches!(
            resolve_unit_for_slot(&p, "X", "S", day(5)),
            Err(ResolveError::NoUnitAssigned { .. })
        ));
    }

    #[test]
    fn test_single_entry_resolves_for_any_later_instant() {
        let mut p = project();
        p.assignments = vec![assign("U1", "X", "S", day(1))];
        assert_eq!(resolve_unit_for_slot(&p, "X", "S", day(1)), Ok("U1"));
        assert_eq!(resolve_unit_for_slot(&p, "X", "S", day(28)), Ok("U1"));
    }

    #[test]
    fn test_history_scenario() {
        let mut p = project();
        p.assignments = vec![assign("U1", "X", "S", day(1)), assign("U2", "X", "S", day(10))];

        assert_eq!(resolve_unit_for_slot(&p, "X", "S", day(5)), Ok("U1"));
        assert_eq!(resolve_unit_for_slot(&p, "X", "S", day(15)), Ok("U2"));
        assert!(resolve_unit_for_slot(&p, "X", "T", day(15)).is_err());
    }

    #[test]
    fn test_out_of_order_ledger_and_equal_timestamps() {
        let mut p = project();
        p.assignments = vec![
            assign("U2", "X", "S", day(10)),
            assign("U1", "X", "S", day(1)),
            assign("U1", "X", "S", day(12)),
            assign("U2", "X", "S", day(12)),
        ];
        // Same instant: last appended wins
        assert_eq!(resolve_unit_for_slot(&p, "X", "S", day(12)), Ok("U2"));
        assert_eq!(resolve_unit_for_slot(&p, "X", "S", day(11)), Ok("U2"));
        assert_eq!(resolve_unit_for_slot(&p, "X", "S", day(9)), Ok("U1"));

        let history: Vec<(&str, DateTime<Utc>)> = assignment_history(&p.assignments, "X", "S")
            .iter()
            .map(|e| (e.unit_id.as_str(), e.date_time))
            .collect();
        assert_eq!(
            history,
            vec![("U2", day(12)), ("U1", day(12)), ("U2", day(10)), ("U1", day(1))]
        );
    }

    #[test]
    fn test_unknown_assembly_and_slot() {
        let p = project();
        assert_eq!(
            resolve_unit_for_slot(&p, "Q", "S", day(1)),
            Err(ResolveError::AssemblyNotFound("Q".to_string()))
        );
        assert!(matches!(
            resolve_unit_for_slot(&p, "X", "Z", day(1)),
            Err(ResolveError::SlotNotFound { .. })
        ));
        assert!(matches!(
            resolve_unit_for_slot(&p, "N", "S", day(1)),
            Err(ResolveError::AssemblyNotFound(_))
        ));
    }

    #[test]
    fn test_default_unit_is_separate_from_strict() {
        let p = project();
        assert_eq!(
            default_unit_for_slot(&p, "X", "S").unwrap().map(|u| u.id.as_str()),
            Some("U1")
        );
        // Seals have no units in the pool
        assert_eq!(default_unit_for_slot(&p, "X", "T").unwrap(), None);
        assert!(resolve_unit_for_slot(&p, "X", "S", day(1)).is_err());
    }

    #[test]
    fn test_unit_for_new_event_tags_source() {
        let mut p = project();
        assert_eq!(
            unit_for_new_event(&p, "X", "S", day(3), true),
            Ok(EventUnit::Default("U1"))
        );
        assert!(matches!(
            unit_for_new_event(&p, "X", "S", day(3), false),
            Err(ResolveError::NoUnitAssigned { .. })
        ));
        assert!(unit_for_new_event(&p, "X", "T", day(3), true).is_err());

        p.assignments.push(assign("U2", "X", "S", day(2)));
        let found = unit_for_new_event(&p, "X", "S", day(3), true).unwrap();
        assert_eq!(found, EventUnit::Assigned("U2"));
        assert!(!found.is_default());
    }

    #[test]
    fn test_slot_occupancy_lists_every_slot() {
        let mut p = project();
        p.assignments.push(assign("U1", "X", "S", day(1)));
        let rows = slot_occupancy(&p, "X", day(2)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].slot.id, "S");
        assert_eq!(rows[0].unit_id, Some("U1"));
        assert_eq!(rows[1].unit_id, None);
    }

    #[test]
    fn test_locate_unit_follows_replacements() {
        let ledger = vec![
            assign("U1", "X", "S", day(1)),
            assign("U2", "X", "S", day(10)),
        ];
        assert_eq!(
            locate_unit(&ledger, "U1", day(5)),
            Some(&ComponentOfAssembly::new("X", "S"))
        );
        assert_eq!(locate_unit(&ledger, "U1", day(11)), None);
        assert_eq!(locate_unit(&ledger, "U2", day(5)), None);
        assert!(locate_unit(&ledger, "U2", day(11)).is_some());
    }
}
