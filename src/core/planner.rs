//! Command façade over project snapshots
//!
//! A [`Planner`] holds the current snapshot plus the collaborators commands
//! need: a clock, an id generator and an optional save hook. Every command
//! builds the next snapshot from the current one; on success it becomes
//! current and is handed to the hook, on failure nothing changes.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::core::clock::{Clock, SystemClock};
use crate::core::error::CoreError;
use crate::core::identity::{EntityPrefix, IdGenerator, UlidGenerator};
use crate::core::workspace::Workspace;
use crate::engine::{constraints, hierarchy, ledger, resolver, tree};
use crate::entities::assignment::{ComponentOfAssembly, MaintenanceEvent};
use crate::entities::condition::Condition;
use crate::entities::maintenance_type::{MaintenanceType, MaintenanceTypePatch};
use crate::entities::project::Project;
use crate::entities::tree::TreeNode;

pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Receives every committed snapshot
///
/// Fire-and-forget: a failing hook is logged, the command still succeeds.
pub trait SaveHook {
    fn snapshot_committed(&self, snapshot: Arc<Project>) -> Result<(), HookError>;
}

/// Writes each committed snapshot to the workspace project file
#[derive(Debug, Clone)]
pub struct YamlFileHook {
    workspace: Workspace,
}

impl YamlFileHook {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

impl SaveHook for YamlFileHook {
    fn snapshot_committed(&self, snapshot: Arc<Project>) -> Result<(), HookError> {
        self.workspace.save_project(&snapshot)?;
        Ok(())
    }
}

/// Result of [`Planner::new_event_for_slot`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub event_id: String,
    pub unit_id: String,
    /// The unit came from the best-effort default, not the ledger
    pub default_unit: bool,
}

pub struct Planner {
    snapshot: Arc<Project>,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    hook: Option<Box<dyn SaveHook>>,
    default_unit_fallback: bool,
}

impl Planner {
    pub fn new(project: Project) -> Self {
        Self {
            snapshot: Arc::new(project),
            clock: Box::new(SystemClock),
            ids: Box::new(UlidGenerator),
            hook: None,
            default_unit_fallback: true,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn with_hook(mut self, hook: impl SaveHook + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn with_default_unit_fallback(mut self, allow: bool) -> Self {
        self.default_unit_fallback = allow;
        self
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<Project> {
        Arc::clone(&self.snapshot)
    }

    pub fn project(&self) -> &Project {
        &self.snapshot
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ------------------------------------------------------------------
    // Maintenance types
    // ------------------------------------------------------------------

    /// Add a maintenance type to a part model's forest under a fresh id
    pub fn add_maintenance_type(
        &mut self,
        part_model_id: &str,
        fields: MaintenanceTypePatch,
    ) -> Result<(String, Arc<Project>), CoreError> {
        let id = self.ids.next_id(EntityPrefix::Mtype);
        let new_type = MaintenanceType::new(id.clone(), fields);
        let next = self.edit_maintenance_types(part_model_id, |forest| {
            hierarchy::add_maintenance_type(forest, new_type)
        });
        let snapshot = self.finish("add_maintenance_type", &id, next)?;
        Ok((id, snapshot))
    }

    pub fn remove_maintenance_type(
        &mut self,
        part_model_id: &str,
        id: &str,
    ) -> Result<Arc<Project>, CoreError> {
        let next = self.edit_maintenance_types(part_model_id, |forest| {
            hierarchy::remove_maintenance_type(forest, id)
        });
        self.finish("remove_maintenance_type", id, next)
    }

    pub fn update_maintenance_type(
        &mut self,
        part_model_id: &str,
        id: &str,
        patch: MaintenanceTypePatch,
    ) -> Result<Arc<Project>, CoreError> {
        let next = self.edit_maintenance_types(part_model_id, |forest| {
            hierarchy::update_maintenance_type(forest, id, patch)
        });
        self.finish("update_maintenance_type", id, next)
    }

    // ------------------------------------------------------------------
    // Equipment tree
    // ------------------------------------------------------------------

    pub fn add_constraint(
        &mut self,
        node_id: &str,
        condition: Condition,
    ) -> Result<Arc<Project>, CoreError> {
        let next = constraints::add_constraint(&self.snapshot.tree, node_id, condition)
            .map(|t| self.with_tree(t));
        self.finish("add_constraint", node_id, next)
    }

    pub fn update_constraint(
        &mut self,
        node_id: &str,
        index: usize,
        condition: Condition,
    ) -> Result<Arc<Project>, CoreError> {
        let next = constraints::update_constraint(&self.snapshot.tree, node_id, index, condition)
            .map(|t| self.with_tree(t));
        self.finish("update_constraint", node_id, next)
    }

    pub fn delete_constraint(&mut self, node_id: &str, index: usize) -> Result<Arc<Project>, CoreError> {
        let next = constraints::delete_constraint(&self.snapshot.tree, node_id, index)
            .map(|t| self.with_tree(t));
        self.finish("delete_constraint", node_id, next)
    }

    pub fn rename_node(
        &mut self,
        id: &str,
        name: &str,
        description: &str,
    ) -> Result<Arc<Project>, CoreError> {
        let next = tree::rename_tree_node(&self.snapshot.tree, id, name, description)
            .map(|t| self.with_tree(t));
        self.finish("rename_node", id, next)
    }

    // ------------------------------------------------------------------
    // Ledger and events
    // ------------------------------------------------------------------

    /// Append an assignment; `at` defaults to the clock
    pub fn assign_unit(
        &mut self,
        assembly_id: &str,
        slot_id: &str,
        unit_id: &str,
        at: Option<DateTime<Utc>>,
        custom: bool,
    ) -> Result<Arc<Project>, CoreError> {
        let at = at.unwrap_or_else(|| self.clock.now());
        let next = ledger::assign_unit(&self.snapshot, assembly_id, slot_id, unit_id, at, custom)
            .map(|assignments| Project {
                assignments,
                ..Project::clone(&self.snapshot)
            });
        self.finish("assign_unit", unit_id, next)
    }

    /// Append an event under a fresh id, replacing any id it carries
    pub fn record_maintenance_event(
        &mut self,
        event: MaintenanceEvent,
    ) -> Result<(String, Arc<Project>), CoreError> {
        let id = self.ids.next_id(EntityPrefix::Evt);
        let event = MaintenanceEvent { id: id.clone(), ..event };
        let next = ledger::record_maintenance_event(&self.snapshot, event).map(|events| Project {
            maintenance_events: events,
            ..Project::clone(&self.snapshot)
        });
        let snapshot = self.finish("record_maintenance_event", &id, next)?;
        Ok((id, snapshot))
    }

    /// Record an event on a slot, picking the unit from the ledger
    ///
    /// When the slot has no assignment yet the first compatible unit is used,
    /// unless the default-unit fallback is switched off.
    pub fn new_event_for_slot(
        &mut self,
        assembly_id: &str,
        slot_id: &str,
        maintenance_type_id: &str,
        at: Option<DateTime<Utc>>,
        custom: bool,
    ) -> Result<(NewEvent, Arc<Project>), CoreError> {
        let at = at.unwrap_or_else(|| self.clock.now());
        let picked = resolver::unit_for_new_event(
            &self.snapshot,
            assembly_id,
            slot_id,
            at,
            self.default_unit_fallback,
        )
        .map(|unit| (unit.unit_id().to_string(), unit.is_default()));
        let (unit_id, default_unit) = match picked {
            Ok(picked) => picked,
            Err(e) => {
                tracing::debug!(command = "new_event_for_slot", subject = assembly_id, error = %e, "rejected");
                return Err(e.into());
            }
        };
        if default_unit {
            tracing::info!(unit = %unit_id, slot = slot_id, "slot has no assignment, using default unit");
        }

        let (event_id, snapshot) = self.record_maintenance_event(MaintenanceEvent {
            id: String::new(),
            maintenance_type_id: maintenance_type_id.to_string(),
            unit_id: unit_id.clone(),
            component_of_assembly: ComponentOfAssembly::new(assembly_id, slot_id),
            date_time: at,
            custom,
        })?;
        Ok((
            NewEvent {
                event_id,
                unit_id,
                default_unit,
            },
            snapshot,
        ))
    }

    // ------------------------------------------------------------------

    fn edit_maintenance_types<F>(&self, part_model_id: &str, edit: F) -> Result<Project, CoreError>
    where
        F: FnOnce(&[MaintenanceType]) -> Result<Vec<MaintenanceType>, CoreError>,
    {
        let index = self
            .snapshot
            .part_models
            .iter()
            .position(|pm| pm.id == part_model_id)
            .ok_or_else(|| CoreError::not_found(EntityPrefix::Pmod, part_model_id))?;
        let forest = edit(&self.snapshot.part_models[index].maintenance_types)?;

        let mut next = Project::clone(&self.snapshot);
        next.part_models[index].maintenance_types = forest;
        Ok(next)
    }

    fn with_tree(&self, tree: Vec<Arc<TreeNode>>) -> Project {
        Project {
            tree,
            ..Project::clone(&self.snapshot)
        }
    }

    fn finish(
        &mut self,
        command: &'static str,
        subject: &str,
        next: Result<Project, CoreError>,
    ) -> Result<Arc<Project>, CoreError> {
        let next = match next {
            Ok(next) => Arc::new(next),
            Err(e) => {
                tracing::debug!(command, subject, error = %e, "rejected");
                return Err(e);
            }
        };

        self.snapshot = Arc::clone(&next);
        tracing::info!(command, subject, "committed");

        if let Some(hook) = &self.hook {
            if let Err(e) = hook.snapshot_committed(Arc::clone(&next)) {
                tracing::warn!(command, error = %e, "save hook failed");
            }
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::core::identity::SequentialIds;
    use crate::engine::hierarchy::flatten_maintenance_types;
    use crate::engine::resolver::resolve_unit_for_slot;
    use crate::entities::assembly_type::AssemblyType;
    use crate::entities::component_type::ComponentType;
    use crate::entities::part_model::PartModel;
    use crate::entities::tree::{Assembly, Node};
    use chrono::TimeZone;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn jan(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn project() -> Project {
        let mut p = Project::new("planner");
        p.component_types = vec![ComponentType::new("CT1", "Roller")];
        let mut at = AssemblyType::new("AT1", "Stand");
        at.add_slot("S", "CT1", "Work roll");
        p.assembly_types = vec![at];
        let mut pm = PartModel::new("PM1", "Roll 600", "R-600", "CT1");
        pm.add_unit("U1", "Roll #1");
        pm.add_unit("U2", "Roll #2");
        p.part_models = vec![pm];
        let mill = Node::new("N1", "Mill").with_child(Assembly::new("X", "Stand 1", "AT1"));
        p.tree = vec![Arc::new(mill.into())];
        p
    }

    fn planner() -> Planner {
        Planner::new(project())
            .with_clock(FixedClock(jan(20)))
            .with_ids(SequentialIds::new())
    }

    fn fields(name: &str, duration: i64, parent: Option<&str>) -> MaintenanceTypePatch {
        MaintenanceTypePatch {
            name: name.to_string(),
            duration,
            parent_id: parent.map(str::to_string),
            ..Default::default()
        }
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Arc<Project>>>>);

    impl SaveHook for Recorder {
        fn snapshot_committed(&self, snapshot: Arc<Project>) -> Result<(), HookError> {
            self.0.borrow_mut().push(snapshot);
            Ok(())
        }
    }

    struct Failing;

    impl SaveHook for Failing {
        fn snapshot_committed(&self, _: Arc<Project>) -> Result<(), HookError> {
            Err("disk full".into())
        }
    }

    #[test]
    fn test_maintenance_type_commands() {
        let mut planner = planner();
        let (a, _) = planner.add_maintenance_type("PM1", fields("Regrind", 2, None)).unwrap();
        let (b, _) = planner
            .add_maintenance_type("PM1", fields("Inspect", 1, Some(&a)))
            .unwrap();
        assert_eq!(a, "MTYPE-1");

        let forest = &planner.project().part_models[0].maintenance_types;
        let flat: Vec<(&str, usize)> = flatten_maintenance_types(forest)
            .iter()
            .map(|e| (e.item.id.as_str(), e.level))
            .collect();
        assert_eq!(flat, vec![(a.as_str(), 0), (b.as_str(), 1)]);

        planner
            .update_maintenance_type("PM1", &b, fields("Inspect rolls", 1, Some(&a)))
            .unwrap();
        planner.remove_maintenance_type("PM1", &a).unwrap();
        assert!(planner.project().part_models[0].maintenance_types.is_empty());
    }

    #[test]
    fn test_rejected_command_keeps_snapshot() {
        let mut planner = planner();
        let before = planner.snapshot();

        assert!(matches!(
            planner.add_maintenance_type("PM1", fields("", 0, None)),
            Err(CoreError::Validation { .. })
        ));
        assert!(matches!(
            planner.add_maintenance_type("PM9", fields("Ok", 1, None)),
            Err(CoreError::NotFound { .. })
        ));
        assert!(planner.add_constraint("ghost", Condition::required_working(1)).is_err());
        assert!(Arc::ptr_eq(&before, &planner.snapshot()));
    }

    #[test]
    fn test_hook_sees_every_commit() {
        let recorder = Recorder::default();
        let mut planner = planner().with_hook(recorder.clone());

        let first = planner.add_constraint("N1", Condition::required_working(1)).unwrap();
        let second = planner.rename_node("N1", "Mill A", "").unwrap();
        assert!(planner.rename_node("N1", "  ", "").is_err());

        let seen = recorder.0.borrow();
        assert_eq!(seen.len(), 2);
        assert!(Arc::ptr_eq(&seen[0], &first));
        assert!(Arc::ptr_eq(&seen[1], &second));
        // Earlier snapshots stay untouched
        assert_eq!(first.tree[0].name(), "Mill");
        assert_eq!(second.tree[0].name(), "Mill A");
    }

    #[test]
    fn test_failing_hook_does_not_fail_command() {
        crate::core::logging::init_test();
        let mut planner = planner().with_hook(Failing);
        assert!(planner.add_constraint("N1", Condition::required_working(1)).is_ok());
        assert_eq!(planner.project().tree[0].conditions().len(), 1);
    }

    #[test]
    fn test_assign_and_resolve() {
        let mut planner = planner();
        planner.assign_unit("X", "S", "U1", Some(jan(1)), false).unwrap();
        planner.assign_unit("X", "S", "U2", Some(jan(10)), false).unwrap();
        let p = planner.project();
        assert_eq!(resolve_unit_for_slot(p, "X", "S", jan(5)).unwrap(), "U1");
        assert_eq!(resolve_unit_for_slot(p, "X", "S", jan(15)).unwrap(), "U2");

        // Default timestamp comes from the clock
        planner.assign_unit("X", "S", "U1", None, true).unwrap();
        assert_eq!(planner.project().assignments[2].date_time, jan(20));
    }

    #[test]
    fn test_new_event_uses_ledger_then_default() {
        let mut planner = planner();
        let (mt, _) = planner.add_maintenance_type("PM1", fields("Regrind", 2, None)).unwrap();

        let (event, _) = planner.new_event_for_slot("X", "S", &mt, None, true).unwrap();
        assert!(event.default_unit);
        assert_eq!(event.unit_id, "U1");

        planner.assign_unit("X", "S", "U2", Some(jan(2)), false).unwrap();
        let (event, snapshot) = planner.new_event_for_slot("X", "S", &mt, Some(jan(3)), false).unwrap();
        assert!(!event.default_unit);
        assert_eq!(event.unit_id, "U2");
        assert_eq!(snapshot.maintenance_events.len(), 2);
        assert_eq!(snapshot.maintenance_events[1].id, event.event_id);
    }

    #[test]
    fn test_new_event_without_fallback() {
        let mut planner = planner().with_default_unit_fallback(false);
        let (mt, _) = planner.add_maintenance_type("PM1", fields("Regrind", 2, None)).unwrap();
        assert!(matches!(
            planner.new_event_for_slot("X", "S", &mt, None, true),
            Err(CoreError::NotFound { .. })
        ));
    }
}
