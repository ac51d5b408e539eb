//! Entity identity system using type-prefixed ULIDs
//!
//! Records loaded from a project file carry plain string ids (they may have
//! been minted by another tool). Ids minted here always take the form
//! `PREFIX-ULID`, e.g. `MTYPE-01HZX3Q8W4D3T8R0Y9B6N1C2KM`.

use std::fmt;
use ulid::Ulid;

/// Entity type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityPrefix {
    /// Component type (catalog category of a slot)
    Ctype,
    /// Assembly type (catalog definition of slots)
    Atype,
    /// Component slot inside an assembly type
    Slot,
    /// Part model
    Pmod,
    /// Physical unit of a part model
    Unit,
    /// Maintenance type
    Mtype,
    /// Organizational node
    Node,
    /// Assembly instance
    Asm,
    /// Maintenance event
    Evt,
}

impl EntityPrefix {
    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Ctype => "CTYPE",
            EntityPrefix::Atype => "ATYPE",
            EntityPrefix::Slot => "SLOT",
            EntityPrefix::Pmod => "PMOD",
            EntityPrefix::Unit => "UNIT",
            EntityPrefix::Mtype => "MTYPE",
            EntityPrefix::Node => "NODE",
            EntityPrefix::Asm => "ASM",
            EntityPrefix::Evt => "EVT",
        }
    }

    /// Human readable entity kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            EntityPrefix::Ctype => "component type",
            EntityPrefix::Atype => "assembly type",
            EntityPrefix::Slot => "component slot",
            EntityPrefix::Pmod => "part model",
            EntityPrefix::Unit => "unit",
            EntityPrefix::Mtype => "maintenance type",
            EntityPrefix::Node => "node",
            EntityPrefix::Asm => "assembly",
            EntityPrefix::Evt => "maintenance event",
        }
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A unique entity identifier combining a type prefix and ULID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Create a new EntityId with the given prefix
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

/// Source of fresh ids for newly created entities
pub trait IdGenerator {
    /// Mint a new id for an entity of the given kind
    fn next_id(&mut self, prefix: EntityPrefix) -> String;
}

/// Default generator: `PREFIX-ULID`
#[derive(Debug, Default, Clone, Copy)]
pub struct UlidGenerator;

impl IdGenerator for UlidGenerator {
    fn next_id(&mut self, prefix: EntityPrefix) -> String {
        EntityId::new(prefix).to_string()
    }
}

/// Deterministic generator producing `PREFIX-1`, `PREFIX-2`, ...
///
/// The counter is shared across prefixes, so ids never repeat within one
/// generator even when kinds are mixed.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, prefix: EntityPrefix) -> String {
        self.next += 1;
        format!("{}-{}", prefix, self.next)
    }
}
