//! Component type - catalog category of a component slot

use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityPrefix;

/// Immutable catalog entry naming a kind of component (e.g. "Main bearing")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentType {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,
}

impl ComponentType {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
        }
    }
}

impl Entity for ComponentType {
    const PREFIX: EntityPrefix = EntityPrefix::Ctype;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
