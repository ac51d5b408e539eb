//! Entity trait - common interface for catalog and tree records

use crate::core::error::CoreError;
use crate::core::identity::EntityPrefix;

/// Common trait for addressable Plantree records
pub trait Entity {
    /// The entity kind, used when minting ids and reporting missing records
    const PREFIX: EntityPrefix;

    /// Get the entity's id
    fn id(&self) -> &str;

    /// Get the entity's display name
    fn name(&self) -> &str;
}

/// Find a record by id in a flat list, reporting `NotFound` with its kind
pub fn find_by_id<'a, T: Entity>(items: &'a [T], id: &str) -> Result<&'a T, CoreError> {
    items
        .iter()
        .find(|item| item.id() == id)
        .ok_or_else(|| CoreError::not_found(T::PREFIX, id))
}
