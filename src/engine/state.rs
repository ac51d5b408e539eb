//! "Is this assembly under maintenance at T" predicates

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::engine::catalog::maintenance_types_for_unit;
use crate::engine::hierarchy::find_maintenance_type;
use crate::entities::project::Project;

/// Operational state source consumed by the constraint engine
pub trait MaintenanceState {
    fn is_under_maintenance(&self, assembly_id: &str, at: DateTime<Utc>) -> bool;
}

impl<F> MaintenanceState for F
where
    F: Fn(&str, DateTime<Utc>) -> bool,
{
    fn is_under_maintenance(&self, assembly_id: &str, at: DateTime<Utc>) -> bool {
        self(assembly_id, at)
    }
}

/// Maintenance windows derived from a project's event log
///
/// An event keeps its assembly under maintenance on
/// `[date_time, date_time + duration days)`, the duration coming from the
/// event's maintenance type. Windows too long to represent end at the last
/// representable instant.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    windows: HashMap<String, Vec<(DateTime<Utc>, DateTime<Utc>)>>,
}

impl EventLog {
    pub fn from_project(project: &Project) -> Self {
        let mut windows: HashMap<String, Vec<(DateTime<Utc>, DateTime<Utc>)>> = HashMap::new();

        for event in &project.maintenance_events {
            let mtype = maintenance_types_for_unit(project, &event.unit_id)
                .and_then(|forest| find_maintenance_type(forest, &event.maintenance_type_id));
            let Some(mtype) = mtype else {
                tracing::debug!(
                    unit = %event.unit_id,
                    maintenance_type = %event.maintenance_type_id,
                    "skipping event with unknown maintenance type"
                );
                continue;
            };

            let end = mtype
                .work_span()
                .and_then(|span| event.date_time.checked_add_signed(span))
                .unwrap_or_else(|| {
                    tracing::warn!(
                        maintenance_type = %mtype.id,
                        duration = mtype.duration,
                        "maintenance window runs past the last representable date"
                    );
                    DateTime::<Utc>::MAX_UTC
                });

            windows
                .entry(event.component_of_assembly.assembly_id.clone())
                .or_default()
                .push((event.date_time, end));
        }

        Self { windows }
    }

    /// Number of assemblies with at least one maintenance window
    pub fn assembly_count(&self) -> usize {
        self.windows.len()
    }
}

impl MaintenanceState for EventLog {
    fn is_under_maintenance(&self, assembly_id: &str, at: DateTime<Utc>) -> bool {
        self.windows
            .get(assembly_id)
            .is_some_and(|spans| spans.iter().any(|(start, end)| *start <= at && at < *end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::assignment::{ComponentOfAssembly, MaintenanceEvent};
    use crate::entities::maintenance_type::{MaintenanceType, MaintenanceTypePatch};
    use crate::entities::part_model::PartModel;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_event_window_is_half_open() {
        let mut p = Project::new("state");
        let mut pm = PartModel::new("PM1", "Gearbox", "G-1", "CT1");
        pm.add_unit("U1", "G#1");
        pm.maintenance_types.push(MaintenanceType::new(
            "M1",
            MaintenanceTypePatch {
                name: "Oil change".to_string(),
                duration: 2,
                ..Default::default()
            },
        ));
        p.part_models = vec![pm];
        p.maintenance_events = vec![
            MaintenanceEvent {
                id: String::new(),
                maintenance_type_id: "M1".to_string(),
                unit_id: "U1".to_string(),
                component_of_assembly: ComponentOfAssembly::new("A1", "S1"),
                date_time: day(10),
                custom: false,
            },
            MaintenanceEvent {
                id: String::new(),
                maintenance_type_id: "M-unknown".to_string(),
                unit_id: "U1".to_string(),
                component_of_assembly: ComponentOfAssembly::new("A2", "S1"),
                date_time: day(10),
                custom: true,
            },
        ];

        let log = EventLog::from_project(&p);
        assert_eq!(log.assembly_count(), 1);
        assert!(!log.is_under_maintenance("A1", day(9)));
        assert!(log.is_under_maintenance("A1", day(10)));
        assert!(log.is_under_maintenance("A1", day(11)));
        assert!(!log.is_under_maintenance("A1", day(12)));
        assert!(!log.is_under_maintenance("A2", day(10)));
    }

    #[test]
    fn test_oversized_duration_is_clamped() {
        let mut p = Project::new("state");
        let mut pm = PartModel::new("PM1", "Gearbox", "G-1", "CT1");
        pm.add_unit("U1", "G#1");
        pm.maintenance_types.push(MaintenanceType::new(
            "M1",
            MaintenanceTypePatch {
                name: "Rebuild".to_string(),
                duration: 200_000_000,
                ..Default::default()
            },
        ));
        p.part_models = vec![pm];
        p.maintenance_events = vec![MaintenanceEvent {
            id: String::new(),
            maintenance_type_id: "M1".to_string(),
            unit_id: "U1".to_string(),
            component_of_assembly: ComponentOfAssembly::new("A1", "S1"),
            date_time: day(10),
            custom: false,
        }];

        let log = EventLog::from_project(&p);
        assert!(!log.is_under_maintenance("A1", day(9)));
        assert!(log.is_under_maintenance("A1", day(10)));
        assert!(log.is_under_maintenance("A1", Utc.with_ymd_and_hms(9999, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_closure_is_a_state() {
        let state = |id: &str, _at: DateTime<Utc>| id == "A1";
        assert!(state.is_under_maintenance("A1", day(1)));
        assert!(!state.is_under_maintenance("A2", day(1)));
    }
}
