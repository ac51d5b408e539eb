//! plantree: equipment hierarchy and maintenance planning model
//!
//! The library holds the domain model (catalogs, equipment tree, unit
//! assignment ledger, maintenance types and node conditions), the algorithms
//! over it, and a small CLI for editing a project kept as YAML on disk.

pub mod cli;
pub mod core;
pub mod engine;
pub mod entities;
pub mod yaml;
