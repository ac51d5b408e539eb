//! Engine - the algorithms over a project snapshot
//!
//! - [`hierarchy`] - maintenance type forest operations
//! - [`tree`] - equipment tree traversal and path-rebuild mutation
//! - [`resolver`] - which unit occupies a slot at a given time
//! - [`constraints`] - node conditions and their evaluation
//! - [`catalog`] - lookups, joins and consistency checks
//! - [`ledger`] - append-only assignment and event history
//! - [`state`] - maintenance-state predicates
//! - [`selection`] - cascading slot selection

pub mod catalog;
pub mod constraints;
pub mod hierarchy;
pub mod ledger;
pub mod resolver;
pub mod selection;
pub mod state;
pub mod tree;

pub use catalog::{check_project, Issue, Severity, SlotRef};
pub use constraints::{
    add_constraint, delete_constraint, evaluate_constraints, update_constraint, ConstraintReport,
};
pub use hierarchy::{
    add_maintenance_type, find_maintenance_type, flatten_maintenance_types, path_to_type,
    remove_maintenance_type, update_maintenance_type, validate_maintenance_type,
    FlatMaintenanceType,
};
pub use resolver::{
    default_unit_for_slot, resolve_unit_for_slot, unit_for_new_event, EventUnit, ResolveError,
};
pub use selection::SlotSelection;
pub use state::{EventLog, MaintenanceState};
pub use tree::{list_assemblies, list_nodes, NodeEntry};
