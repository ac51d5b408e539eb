//! Constraint engine - conditions on nodes and their evaluation
//!
//! Mutations rebuild the path to the node (see [`crate::engine::tree`]) and
//! replace its whole `conditions` list at once, so a failed call leaves no
//! trace. Evaluation is a pure function of tree, maintenance state and time.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::core::error::CoreError;
use crate::engine::state::MaintenanceState;
use crate::engine::tree::{descendant_assemblies, update_tree_node};
use crate::entities::condition::Condition;
use crate::entities::tree::TreeNode;

/// Outcome of one condition at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintReport {
    pub node_id: String,
    /// Position of the condition in the node's list
    pub index: usize,
    pub condition: Condition,
    pub satisfied: bool,
    /// Working assemblies for `RequiredWorking`, assemblies under maintenance
    /// for `MaxMaintenance`
    pub actual: u32,
    /// Assemblies below the node
    pub total: u32,
}

/// Append a condition to a node
pub fn add_constraint(
    tree: &[Arc<TreeNode>],
    node_id: &str,
    condition: Condition,
) -> Result<Vec<Arc<TreeNode>>, CoreError> {
    update_tree_node(tree, node_id, |entry| {
        let mut conditions = entry.conditions().to_vec();
        conditions.push(condition);
        Ok(entry.with_conditions(conditions))
    })
}

/// Replace the condition at `index`
pub fn update_constraint(
    tree: &[Arc<TreeNode>],
    node_id: &str,
    index: usize,
    condition: Condition,
) -> Result<Vec<Arc<TreeNode>>, CoreError> {
    update_tree_node(tree, node_id, |entry| {
        let mut conditions = entry.conditions().to_vec();
        let slot = conditions
            .get_mut(index)
            .ok_or_else(|| missing_condition(node_id, index))?;
        *slot = condition;
        Ok(entry.with_conditions(conditions))
    })
}

/// Remove the condition at `index`
pub fn delete_constraint(
    tree: &[Arc<TreeNode>],
    node_id: &str,
    index: usize,
) -> Result<Vec<Arc<TreeNode>>, CoreError> {
    update_tree_node(tree, node_id, |entry| {
        if index >= entry.conditions().len() {
            return Err(missing_condition(node_id, index));
        }
        let mut conditions = entry.conditions().to_vec();
        conditions.remove(index);
        Ok(entry.with_conditions(conditions))
    })
}

/// Evaluate every condition in the tree, in pre-order of their nodes
pub fn evaluate_constraints<S: MaintenanceState + ?Sized>(
    tree: &[Arc<TreeNode>],
    state: &S,
    at: DateTime<Utc>,
) -> Vec<ConstraintReport> {
    let mut reports = Vec::new();
    collect_reports(tree, state, at, &mut reports);
    reports
}

/// Evaluate the conditions of a single entry
pub fn evaluate_node<S: MaintenanceState + ?Sized>(
    entry: &TreeNode,
    state: &S,
    at: DateTime<Utc>,
) -> Vec<ConstraintReport> {
    if entry.conditions().is_empty() {
        return Vec::new();
    }

    let assemblies = descendant_assemblies(entry);
    let total = assemblies.len() as u32;
    let under = assemblies
        .iter()
        .filter(|a| state.is_under_maintenance(&a.id, at))
        .count() as u32;
    let working = total - under;

    entry
        .conditions()
        .iter()
        .enumerate()
        .map(|(index, condition)| {
            let (satisfied, actual) = match *condition {
                Condition::RequiredWorking { required_working } => {
                    (working >= required_working, working)
                }
                Condition::MaxMaintenance {
                    max_under_maintenance,
                } => (under <= max_under_maintenance, under),
            };
            ConstraintReport {
                node_id: entry.id().to_string(),
                index,
                condition: *condition,
                satisfied,
                actual,
                total,
            }
        })
        .collect()
}

fn collect_reports<S: MaintenanceState + ?Sized>(
    tree: &[Arc<TreeNode>],
    state: &S,
    at: DateTime<Utc>,
    reports: &mut Vec<ConstraintReport>,
) {
    for entry in tree {
        reports.extend(evaluate_node(entry, state, at));
        collect_reports(entry.children(), state, at, reports);
    }
}

fn missing_condition(node_id: &str, index: usize) -> CoreError {
    CoreError::NotFound {
        kind: "condition",
        id: format!("{}#{}", node_id, index),
    }
}
