//! Maintenance type entity - nested definitions of maintenance work
//!
//! A part model owns a forest of maintenance types. Children refine their
//! parent (e.g. "Overhaul" containing "Replace seals"). The forest
//! operations live in [`crate::engine::hierarchy`].

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityPrefix;

/// A maintenance work definition with its nested refinements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceType {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Display color (CSS notation, e.g. "#1e88e5")
    #[serde(default)]
    pub color: String,

    /// Work duration in days, at least 1
    pub duration: i64,

    /// Operating hours between occurrences, 0 for ad-hoc work
    #[serde(default)]
    pub interval: i64,

    /// Allowed deviation from the interval, in hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation: Option<i64>,

    /// Scheduling priority, 1 is highest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,

    /// Parent maintenance type in the same forest
    #[serde(default)]
    pub parent_id: Option<String>,

    #[serde(default)]
    pub children: Vec<MaintenanceType>,
}

/// The scalar fields of a maintenance type, without identity or children
///
/// Used both to author a new maintenance type and to replace the fields of
/// an existing one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceTypePatch {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub color: String,

    pub duration: i64,

    #[serde(default)]
    pub interval: i64,

    #[serde(default)]
    pub deviation: Option<i64>,

    #[serde(default)]
    pub priority: Option<i64>,

    #[serde(default)]
    pub parent_id: Option<String>,
}

impl MaintenanceType {
    /// Build a childless maintenance type from its fields
    pub fn new(id: impl Into<String>, fields: MaintenanceTypePatch) -> Self {
        Self {
            id: id.into(),
            name: fields.name,
            description: fields.description,
            color: fields.color,
            duration: fields.duration,
            interval: fields.interval,
            deviation: fields.deviation,
            priority: fields.priority,
            parent_id: fields.parent_id,
            children: Vec::new(),
        }
    }

    /// Current scalar fields
    pub fn fields(&self) -> MaintenanceTypePatch {
        MaintenanceTypePatch {
            name: self.name.clone(),
            description: self.description.clone(),
            color: self.color.clone(),
            duration: self.duration,
            interval: self.interval,
            deviation: self.deviation,
            priority: self.priority,
            parent_id: self.parent_id.clone(),
        }
    }

    /// A copy with every scalar field replaced, keeping id and children
    pub fn with_fields(&self, fields: MaintenanceTypePatch) -> Self {
        Self {
            children: self.children.clone(),
            ..Self::new(self.id.clone(), fields)
        }
    }

    /// Length of the work as a time span, `None` when it does not fit one
    pub fn work_span(&self) -> Option<Duration> {
        Duration::try_days(self.duration.max(0))
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl Entity for MaintenanceType {
    const PREFIX: EntityPrefix = EntityPrefix::Mtype;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str) -> MaintenanceTypePatch {
        MaintenanceTypePatch {
            name: name.to_string(),
            duration: 2,
            interval: 500,
            ..Default::default()
        }
    }

    #[test]
    fn test_with_fields_keeps_children() {
        let mut parent = MaintenanceType::new("A", fields("Overhaul"));
        parent.children.push(MaintenanceType::new("B", fields("Seals")));

        let renamed = parent.with_fields(fields("Major overhaul"));
        assert_eq!(renamed.id, "A");
        assert_eq!(renamed.name, "Major overhaul");
        assert_eq!(renamed.children, parent.children);
    }

    #[test]
    fn test_parse_from_json_record() {
        let json = r##"{
            "id": "MTYPE-1",
            "name": "Inspection",
            "color": "#ff0000",
            "duration": 1,
            "interval": 200,
            "parentId": null,
            "children": []
        }"##;
        let mt: MaintenanceType = serde_json::from_str(json).unwrap();
        assert!(mt.is_root());
        assert_eq!(mt.deviation, None);
        assert_eq!(mt.work_span(), Some(Duration::days(1)));

        let endless = MaintenanceType::new(
            "MTYPE-2",
            MaintenanceTypePatch {
                duration: i64::MAX,
                ..fields("Rebuild")
            },
        );
        assert_eq!(endless.work_span(), None);
    }
}
