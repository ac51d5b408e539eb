//! Catalog lookups, joins and whole-project consistency checks

use std::collections::HashSet;
use std::fmt;

use crate::engine::hierarchy::{flatten_maintenance_types, validate_maintenance_type};
use crate::engine::resolver::ResolveError;
use crate::engine::tree::{find_tree_node, list_assemblies};
use crate::entities::assembly_type::{AssemblyType, ComponentSlot};
use crate::entities::maintenance_type::MaintenanceType;
use crate::entities::part_model::{PartModel, Unit};
use crate::entities::project::Project;
use crate::entities::tree::Assembly;

/// A component slot resolved through its assembly and assembly type
#[derive(Debug, Clone, Copy)]
pub struct SlotRef<'a> {
    pub assembly: &'a Assembly,
    pub assembly_type: &'a AssemblyType,
    pub slot: &'a ComponentSlot,
}

/// Resolve `(assembly, slot)` against the tree and the assembly type catalog
pub fn slot_ref<'a>(
    project: &'a Project,
    assembly_id: &str,
    slot_id: &str,
) -> Result<SlotRef<'a>, ResolveError> {
    let assembly = find_tree_node(&project.tree, assembly_id)
        .and_then(|entry| entry.as_assembly())
        .ok_or_else(|| ResolveError::AssemblyNotFound(assembly_id.to_string()))?;

    let slot_missing = || ResolveError::SlotNotFound {
        assembly_id: assembly_id.to_string(),
        slot_id: slot_id.to_string(),
    };
    let assembly_type = project
        .assembly_type(&assembly.assembly_type_id)
        .map_err(|_| slot_missing())?;
    let slot = assembly_type.slot(slot_id).ok_or_else(slot_missing)?;

    Ok(SlotRef {
        assembly,
        assembly_type,
        slot,
    })
}

/// Find a unit anywhere in the part model pools
pub fn find_unit<'a>(project: &'a Project, unit_id: &str) -> Option<(&'a PartModel, &'a Unit)> {
    project
        .part_models
        .iter()
        .find_map(|pm| pm.unit(unit_id).map(|unit| (pm, unit)))
}

/// Part models fitting a component type, in catalog order
pub fn part_models_for_component_type<'a>(
    project: &'a Project,
    component_type_id: &str,
) -> Vec<&'a PartModel> {
    project
        .part_models
        .iter()
        .filter(|pm| pm.component_type_id == component_type_id)
        .collect()
}

/// Units that may be assigned to a slot
pub fn units_for_slot<'a>(project: &'a Project, slot: &ComponentSlot) -> Vec<&'a Unit> {
    part_models_for_component_type(project, &slot.component_type_id)
        .into_iter()
        .flat_map(|pm| pm.units.iter())
        .collect()
}

/// Maintenance type forest applicable to a unit (its part model's)
pub fn maintenance_types_for_unit<'a>(
    project: &'a Project,
    unit_id: &str,
) -> Option<&'a [MaintenanceType]> {
    find_unit(project, unit_id).map(|(pm, _)| pm.maintenance_types.as_slice())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One finding of [`check_project`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    /// Id of the offending record
    pub subject: String,
    pub message: String,
}

impl Issue {
    fn error(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            subject: subject.into(),
            message: message.into(),
        }
    }

    fn warning(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

/// Check the cross-record invariants of a loaded project
pub fn check_project(project: &Project) -> Vec<Issue> {
    let mut issues = Vec::new();
    check_catalog(project, &mut issues);
    check_tree(project, &mut issues);
    check_ledger(project, &mut issues);
    issues
}

fn check_catalog(project: &Project, issues: &mut Vec<Issue>) {
    let component_types: HashSet<&str> = project
        .component_types
        .iter()
        .map(|ct| ct.id.as_str())
        .collect();

    for at in &project.assembly_types {
        let mut seen = HashSet::new();
        for slot in &at.components {
            if !seen.insert(slot.id.as_str()) {
                issues.push(Issue::error(
                    &at.id,
                    format!("duplicate component slot id {}", slot.id),
                ));
            }
            if !component_types.contains(slot.component_type_id.as_str()) {
                issues.push(Issue::error(
                    &at.id,
                    format!(
                        "slot {} references unknown component type {}",
                        slot.id, slot.component_type_id
                    ),
                ));
            }
        }
    }

    let mut uids = HashSet::new();
    let mut mtype_ids = HashSet::new();
    let mut unit_ids = HashSet::new();
    for pm in &project.part_models {
        if !uids.insert(pm.uid.as_str()) {
            issues.push(Issue::error(&pm.id, format!("duplicate part model uid {}", pm.uid)));
        }
        if !component_types.contains(pm.component_type_id.as_str()) {
            issues.push(Issue::error(
                &pm.id,
                format!("unknown component type {}", pm.component_type_id),
            ));
        }
        for entry in flatten_maintenance_types(&pm.maintenance_types) {
            let mt = entry.item;
            if !mtype_ids.insert(mt.id.as_str()) {
                issues.push(Issue::error(&mt.id, "duplicate maintenance type id"));
            }
            for message in validate_maintenance_type(&mt.fields()) {
                issues.push(Issue::error(&mt.id, message));
            }
        }
        check_parent_links(&pm.maintenance_types, None, issues);
        for unit in &pm.units {
            if !unit_ids.insert(unit.id.as_str()) {
                issues.push(Issue::error(&unit.id, "duplicate unit id"));
            }
            if unit.part_model_id != pm.id {
                issues.push(Issue::warning(
                    &unit.id,
                    format!(
                        "unit lists part model {} but is pooled under {}",
                        unit.part_model_id, pm.id
                    ),
                ));
            }
        }
    }
}

/// Every stored `parent_id` must name the entry it is nested under
fn check_parent_links(forest: &[MaintenanceType], parent: Option<&str>, issues: &mut Vec<Issue>) {
    for mt in forest {
        if mt.parent_id.as_deref() != parent {
            issues.push(Issue::error(
                &mt.id,
                format!(
                    "parentId is {} but the entry is nested under {}",
                    mt.parent_id.as_deref().unwrap_or("empty"),
                    parent.unwrap_or("the root")
                ),
            ));
        }
        check_parent_links(&mt.children, Some(mt.id.as_str()), issues);
    }
}

fn check_tree(project: &Project, issues: &mut Vec<Issue>) {
    let mut seen = HashSet::new();
    let mut stack: Vec<_> = project.tree.iter().collect();
    while let Some(entry) = stack.pop() {
        if !seen.insert(entry.id()) {
            issues.push(Issue::error(entry.id(), "duplicate tree id"));
        }
        if entry.conditions().iter().any(|c| c.is_deprecated()) {
            issues.push(Issue::warning(
                entry.id(),
                "MAX_MAINTENANCE conditions are deprecated; prefer REQUIRED_WORKING",
            ));
        }
        stack.extend(entry.children().iter());
    }

    for assembly in list_assemblies(&project.tree) {
        if project.assembly_type(&assembly.assembly_type_id).is_err() {
            issues.push(Issue::error(
                &assembly.id,
                format!("unknown assembly type {}", assembly.assembly_type_id),
            ));
        }
    }
}

fn check_ledger(project: &Project, issues: &mut Vec<Issue>) {
    for entry in &project.assignments {
        let target = &entry.component_of_assembly;
        let subject = format!("{}@{}", entry.unit_id, entry.date_time.to_rfc3339());
        for slot_id in &target.component_path {
            if let Err(err) = slot_ref(project, &target.assembly_id, slot_id) {
                issues.push(Issue::error(&subject, err.to_string()));
            }
        }
        if find_unit(project, &entry.unit_id).is_none() {
            issues.push(Issue::error(&subject, format!("unknown unit {}", entry.unit_id)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::component_type::ComponentType;
    use crate::entities::condition::Condition;
    use crate::entities::maintenance_type::MaintenanceTypePatch;
    use crate::entities::tree::Node;
    use std::sync::Arc;

    fn project() -> Project {
        let mut project = Project::new("catalog");
        project.component_types = vec![ComponentType::new("CT1", "Bearing")];
        let mut at = AssemblyType::new("AT1", "Pump");
        at.add_slot("S1", "CT1", "Bearing");
        project.assembly_types = vec![at];

        let mut a = PartModel::new("PM1", "Bearing A", "UID-A", "CT1");
        a.add_unit("U1", "A#1");
        let mut b = PartModel::new("PM2", "Bearing B", "UID-B", "CT1");
        b.add_unit("U2", "B#1");
        b.add_unit("U3", "B#2");
        project.part_models = vec![a, b];

        let node = Node::new("N1", "Site").with_child(Assembly::new("A1", "Pump 1", "AT1"));
        project.tree = vec![Arc::new(node.into())];
        project
    }

    #[test]
    fn test_joins() {
        let p = project();
        let target = slot_ref(&p, "A1", "S1").unwrap();
        assert_eq!(target.assembly_type.id, "AT1");

        let units: Vec<&str> = units_for_slot(&p, target.slot).iter().map(|u| u.id.as_str()).collect();
        assert_eq!(units, vec!["U1", "U2", "U3"]);

        let (pm, unit) = find_unit(&p, "U3").unwrap();
        assert_eq!((pm.id.as_str(), unit.name.as_str()), ("PM2", "B#2"));
        assert!(maintenance_types_for_unit(&p, "U9").is_none());
    }

    #[test]
    fn test_clean_project_has_no_issues() {
        assert!(check_project(&project()).is_empty());
    }

    #[test]
    fn test_check_reports_broken_references() {
        let mut p = project();
        p.assembly_types[0].add_slot("S1", "CT-GONE", "Dup");
        p.part_models[1].uid = "UID-A".to_string();
        p.part_models[0].maintenance_types.push(MaintenanceType::new(
            "M1",
            MaintenanceTypePatch {
                name: String::new(),
                duration: 1,
                ..Default::default()
            },
        ));
        let stray = Node::new("N2", "Yard").with_child(Assembly::new("A2", "Crane", "AT-GONE"));
        p.tree.push(Arc::new(stray.into()));

        let messages: Vec<String> = check_project(&p).into_iter().map(|i| i.message).collect();
        assert!(messages.contains(&"duplicate component slot id S1".to_string()));
        assert!(messages.contains(&"slot S1 references unknown component type CT-GONE".to_string()));
        assert!(messages.contains(&"duplicate part model uid UID-A".to_string()));
        assert!(messages.contains(&"name is required".to_string()));
        assert!(messages.contains(&"unknown assembly type AT-GONE".to_string()));
    }

    #[test]
    fn test_deprecated_condition_is_warning() {
        let mut p = project();
        let node = Node {
            conditions: vec![Condition::max_maintenance(1)],
            ..Node::new("N9", "Legacy")
        };
        p.tree.push(Arc::new(node.into()));
        let issues = check_project(&p);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_parent_id_must_match_nesting() {
        let mut p = project();
        let fields = |name: &str, parent: Option<&str>| MaintenanceTypePatch {
            name: name.to_string(),
            duration: 1,
            parent_id: parent.map(str::to_string),
            ..Default::default()
        };
        let mut overhaul = MaintenanceType::new("M1", fields("Overhaul", None));
        overhaul.children.push(MaintenanceType::new("M2", fields("Seals", None)));
        overhaul.children.push(MaintenanceType::new("M3", fields("Shaft", Some("M1"))));
        p.part_models[0].maintenance_types.push(overhaul);
        p.part_models[0]
            .maintenance_types
            .push(MaintenanceType::new("M4", fields("Stray", Some("M1"))));

        let issues = check_project(&p);
        let subjects: Vec<&str> = issues.iter().map(|i| i.subject.as_str()).collect();
        assert_eq!(subjects, vec!["M2", "M4"]);
        assert_eq!(issues[0].message, "parentId is empty but the entry is nested under M1");
        assert_eq!(issues[1].message, "parentId is M1 but the entry is nested under the root");
    }
}
