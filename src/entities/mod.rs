//! Entity type definitions
//!
//! **Catalog:**
//! - [`ComponentType`] - Category of a component slot
//! - [`AssemblyType`] - Ordered component slots of an assembly kind
//! - [`PartModel`] - Replaceable part owning maintenance types and a [`Unit`] pool
//! - [`MaintenanceType`] - Nested maintenance work definitions
//!
//! **Equipment tree:**
//! - [`Node`] - Organizational grouping
//! - [`Assembly`] - Physical equipment instance
//! - [`Condition`] - Operational constraint on a node
//!
//! **History:**
//! - [`UnitAssignment`] - Ledger entry binding a unit to a slot
//! - [`MaintenanceEvent`] - Scheduled or ad-hoc maintenance occurrence
//!
//! [`Project`] aggregates all of the above.

pub mod assembly_type;
pub mod assignment;
pub mod component_type;
pub mod condition;
pub mod maintenance_type;
pub mod part_model;
pub mod project;
pub mod tree;

pub use assembly_type::{AssemblyType, ComponentSlot};
pub use assignment::{ComponentOfAssembly, MaintenanceEvent, UnitAssignment};
pub use component_type::ComponentType;
pub use condition::Condition;
pub use maintenance_type::{MaintenanceType, MaintenanceTypePatch};
pub use part_model::{PartModel, Unit};
pub use project::Project;
pub use tree::{Assembly, Node, NodeKind, TreeNode};
