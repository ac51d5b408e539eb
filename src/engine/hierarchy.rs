//! Maintenance type hierarchy operations
//!
//! Every operation is pure: it borrows a forest and returns a new one (or a
//! [`CoreError`]), leaving the input untouched. Sibling order is insertion
//! order and is never re-sorted.

use std::collections::HashSet;

use crate::core::error::CoreError;
use crate::core::identity::EntityPrefix;
use crate::entities::maintenance_type::{MaintenanceType, MaintenanceTypePatch};

/// One entry of a flattened forest, tagged with its depth (roots are 0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatMaintenanceType<'a> {
    pub item: &'a MaintenanceType,
    pub level: usize,
}

/// Check a candidate's fields, returning one message per violation
///
/// Never fails; an empty list means the candidate is acceptable.
pub fn validate_maintenance_type(candidate: &MaintenanceTypePatch) -> Vec<String> {
    let mut errors = Vec::new();

    if candidate.name.trim().is_empty() {
        errors.push("name is required".to_string());
    }
    if candidate.duration < 1 {
        errors.push(format!(
            "duration must be at least 1 day (got {})",
            candidate.duration
        ));
    }
    if candidate.interval < 0 {
        errors.push(format!(
            "interval must not be negative (got {})",
            candidate.interval
        ));
    }
    if let Some(deviation) = candidate.deviation {
        if deviation < 0 {
            errors.push(format!("deviation must not be negative (got {})", deviation));
        }
    }
    if let Some(priority) = candidate.priority {
        if priority < 1 {
            errors.push(format!("priority must be at least 1 (got {})", priority));
        }
    }

    errors
}

/// Insert a maintenance type at the root or under its `parent_id`
///
/// The new entry is appended after its future siblings. Fails with
/// `Validation` for bad fields, `Consistency` when any id of the new subtree
/// already exists (or it names itself as parent) and `NotFound` when the
/// parent is absent.
pub fn add_maintenance_type(
    forest: &[MaintenanceType],
    new_type: MaintenanceType,
) -> Result<Vec<MaintenanceType>, CoreError> {
    let errors = validate_maintenance_type(&new_type.fields());
    if !errors.is_empty() {
        return Err(CoreError::validation(errors));
    }

    if new_type.parent_id.as_deref() == Some(new_type.id.as_str()) {
        return Err(CoreError::consistency(format!(
            "maintenance type {} cannot be its own parent",
            new_type.id
        )));
    }

    let incoming = flatten_maintenance_types(std::slice::from_ref(&new_type));
    let mut seen = HashSet::new();
    if let Some(clash) = incoming.iter().find(|entry| {
        !seen.insert(entry.item.id.as_str()) || find_maintenance_type(forest, &entry.item.id).is_some()
    }) {
        return Err(CoreError::consistency(format!(
            "maintenance type id {} already exists",
            clash.item.id
        )));
    }

    insert(forest, new_type)
}

/// Remove a maintenance type and its whole subtree
///
/// Destructive: children are discarded with their parent.
pub fn remove_maintenance_type(
    forest: &[MaintenanceType],
    id: &str,
) -> Result<Vec<MaintenanceType>, CoreError> {
    let path = index_path(forest, id).ok_or_else(|| CoreError::not_found(EntityPrefix::Mtype, id))?;
    Ok(rebuild_at(forest, &path, |_| None))
}

/// Replace the scalar fields of a maintenance type, keeping its children
///
/// When `patch.parent_id` differs from the entry's parent in the forest
/// (not its stored `parent_id`) the entry moves,
/// with its subtree, to the end of the new parent's children. Moving under
/// itself or one of its descendants is a `Consistency` error.
pub fn update_maintenance_type(
    forest: &[MaintenanceType],
    id: &str,
    patch: MaintenanceTypePatch,
) -> Result<Vec<MaintenanceType>, CoreError> {
    let errors = validate_maintenance_type(&patch);
    if !errors.is_empty() {
        return Err(CoreError::validation(errors));
    }

    let path = index_path(forest, id).ok_or_else(|| CoreError::not_found(EntityPrefix::Mtype, id))?;
    let current = node_at(forest, &path).ok_or_else(|| CoreError::not_found(EntityPrefix::Mtype, id))?;

    let actual_parent = path_to_type(forest, id)
        .iter()
        .rev()
        .nth(1)
        .map(|parent| parent.id.clone());
    if patch.parent_id == actual_parent {
        return Ok(rebuild_at(forest, &path, |node| Some(node.with_fields(patch))));
    }

    if let Some(parent_id) = patch.parent_id.as_deref() {
        if parent_id == id {
            return Err(CoreError::consistency(format!(
                "maintenance type {} cannot be its own parent",
                id
            )));
        }
        if find_maintenance_type(&current.children, parent_id).is_some() {
            return Err(CoreError::consistency(format!(
                "cannot move {} under its own descendant {}",
                id, parent_id
            )));
        }
        if find_maintenance_type(forest, parent_id).is_none() {
            return Err(CoreError::not_found(EntityPrefix::Mtype, parent_id));
        }
    }

    let moved = current.with_fields(patch);
    let without = rebuild_at(forest, &path, |_| None);
    insert(&without, moved)
}

/// Depth-first pre-order search
pub fn find_maintenance_type<'a>(
    forest: &'a [MaintenanceType],
    id: &str,
) -> Option<&'a MaintenanceType> {
    for item in forest {
        if item.id == id {
            return Some(item);
        }
        if let Some(found) = find_maintenance_type(&item.children, id) {
            return Some(found);
        }
    }
    None
}

/// Flatten to a depth-annotated pre-order list
pub fn flatten_maintenance_types(forest: &[MaintenanceType]) -> Vec<FlatMaintenanceType<'_>> {
    let mut out = Vec::new();
    flatten_into(forest, 0, None, &mut out);
    out
}

/// Candidate parents for a picker: the flattened forest minus the entry
/// being edited and its whole subtree
pub fn parent_options<'a>(
    forest: &'a [MaintenanceType],
    editing: Option<&str>,
) -> Vec<FlatMaintenanceType<'a>> {
    let mut out = Vec::new();
    flatten_into(forest, 0, editing, &mut out);
    out
}

/// Nodes from a root down to `id` (inclusive); empty when absent
pub fn path_to_type<'a>(forest: &'a [MaintenanceType], id: &str) -> Vec<&'a MaintenanceType> {
    let mut path = Vec::new();
    if collect_path(forest, id, &mut path) {
        path
    } else {
        Vec::new()
    }
}

/// Total number of maintenance types in the forest
pub fn count_maintenance_types(forest: &[MaintenanceType]) -> usize {
    forest
        .iter()
        .map(|item| 1 + count_maintenance_types(&item.children))
        .sum()
}

fn flatten_into<'a>(
    forest: &'a [MaintenanceType],
    level: usize,
    skip: Option<&str>,
    out: &mut Vec<FlatMaintenanceType<'a>>,
) {
    for item in forest {
        if skip == Some(item.id.as_str()) {
            continue;
        }
        out.push(FlatMaintenanceType { item, level });
        flatten_into(&item.children, level + 1, skip, out);
    }
}

fn collect_path<'a>(
    forest: &'a [MaintenanceType],
    id: &str,
    path: &mut Vec<&'a MaintenanceType>,
) -> bool {
    for item in forest {
        path.push(item);
        if item.id == id || collect_path(&item.children, id, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn insert(
    forest: &[MaintenanceType],
    new_type: MaintenanceType,
) -> Result<Vec<MaintenanceType>, CoreError> {
    let Some(parent_id) = new_type.parent_id.clone() else {
        let mut next = forest.to_vec();
        next.push(new_type);
        return Ok(next);
    };

    let path = index_path(forest, &parent_id)
        .ok_or_else(|| CoreError::not_found(EntityPrefix::Mtype, parent_id.as_str()))?;
    Ok(rebuild_at(forest, &path, |parent| {
        let mut parent = parent.clone();
        parent.children.push(new_type);
        Some(parent)
    }))
}

/// Sibling indices leading to the first pre-order match of `id`
fn index_path(forest: &[MaintenanceType], id: &str) -> Option<Vec<usize>> {
    for (i, item) in forest.iter().enumerate() {
        if item.id == id {
            return Some(vec![i]);
        }
        if let Some(mut rest) = index_path(&item.children, id) {
            rest.insert(0, i);
            return Some(rest);
        }
    }
    None
}

fn node_at<'a>(forest: &'a [MaintenanceType], path: &[usize]) -> Option<&'a MaintenanceType> {
    let (&first, rest) = path.split_first()?;
    let node = forest.get(first)?;
    if rest.is_empty() {
        Some(node)
    } else {
        node_at(&node.children, rest)
    }
}

/// Rebuild the ancestors along `path`, letting `edit` replace (`Some`) or
/// drop (`None`) the entry at its end
fn rebuild_at<F>(forest: &[MaintenanceType], path: &[usize], edit: F) -> Vec<MaintenanceType>
where
    F: FnOnce(&MaintenanceType) -> Option<MaintenanceType>,
{
    let Some((&index, rest)) = path.split_first() else {
        return forest.to_vec();
    };
    let Some(target) = forest.get(index) else {
        return forest.to_vec();
    };

    let mut next = Vec::with_capacity(forest.len());
    next.extend_from_slice(&forest[..index]);
    if rest.is_empty() {
        next.extend(edit(target));
    } else {
        let mut ancestor = MaintenanceType::new(target.id.clone(), target.fields());
        ancestor.children = rebuild_at(&target.children, rest, edit);
        next.push(ancestor);
    }
    next.extend_from_slice(&forest[index + 1..]);
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mt(id: &str, parent: Option<&str>, duration: i64, interval: i64) -> MaintenanceType {
        MaintenanceType::new(
            id,
            MaintenanceTypePatch {
                name: format!("Work {}", id),
                duration,
                interval,
                parent_id: parent.map(str::to_string),
                ..Default::default()
            },
        )
    }

    /// A
    /// ├── B
    /// │   └── C
    /// └── D
    /// E
    fn sample() -> Vec<MaintenanceType> {
        let forest = add_maintenance_type(&[], mt("A", None, 2, 500)).unwrap();
        let forest = add_maintenance_type(&forest, mt("B", Some("A"), 1, 200)).unwrap();
        let forest = add_maintenance_type(&forest, mt("C", Some("B"), 1, 100)).unwrap();
        let forest = add_maintenance_type(&forest, mt("D", Some("A"), 1, 0)).unwrap();
        add_maintenance_type(&forest, mt("E", None, 3, 1000)).unwrap()
    }

    fn levels(forest: &[MaintenanceType]) -> Vec<(String, usize)> {
        flatten_maintenance_types(forest)
            .into_iter()
            .map(|e| (e.item.id.clone(), e.level))
            .collect()
    }

    #[test]
    fn test_add_then_flatten_then_remove_root() {
        let forest = add_maintenance_type(&[], mt("A", None, 2, 500)).unwrap();
        let forest = add_maintenance_type(&forest, mt("B", Some("A"), 1, 200)).unwrap();

        assert_eq!(
            levels(&forest),
            vec![("A".to_string(), 0), ("B".to_string(), 1)]
        );

        let forest = remove_maintenance_type(&forest, "A").unwrap();
        assert!(flatten_maintenance_types(&forest).is_empty());
    }

    #[test]
    fn test_add_under_missing_parent_is_not_found() {
        let forest = sample();
        let err = add_maintenance_type(&forest, mt("X", Some("NOPE"), 1, 0)).unwrap_err();
        assert_eq!(err, CoreError::not_found(EntityPrefix::Mtype, "NOPE"));
    }

    #[test]
    fn test_add_rejects_duplicate_and_self_parent() {
        let forest = sample();
        assert!(matches!(
            add_maintenance_type(&forest, mt("C", None, 1, 0)),
            Err(CoreError::Consistency(_))
        ));
        assert!(matches!(
            add_maintenance_type(&forest, mt("X", Some("X"), 1, 0)),
            Err(CoreError::Consistency(_))
        ));
    }

    #[test]
    fn test_add_rejects_invalid_fields() {
        let err = add_maintenance_type(&[], mt("A", None, 0, -5)).unwrap_err();
        match err {
            CoreError::Validation { messages } => assert_eq!(messages.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_add_remove_round_trip_at_every_depth() {
        let original = sample();
        for parent in ["A", "B", "C", "D", "E"] {
            let grown = add_maintenance_type(&original, mt("NEW", Some(parent), 1, 10)).unwrap();
            assert_eq!(count_maintenance_types(&grown), 6);
            let shrunk = remove_maintenance_type(&grown, "NEW").unwrap();
            assert_eq!(shrunk, original, "round trip under {parent}");
        }
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        assert!(matches!(
            remove_maintenance_type(&sample(), "Z"),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_remove_nested_drops_subtree_only() {
        let forest = remove_maintenance_type(&sample(), "B").unwrap();
        assert_eq!(
            levels(&forest),
            vec![
                ("A".to_string(), 0),
                ("D".to_string(), 1),
                ("E".to_string(), 0)
            ]
        );
    }

    #[test]
    fn test_flatten_is_preorder_with_valid_levels() {
        let forest = sample();
        let flat = flatten_maintenance_types(&forest);
        assert_eq!(flat.len(), count_maintenance_types(&forest));
        assert_eq!(
            levels(&forest),
            vec![
                ("A".to_string(), 0),
                ("B".to_string(), 1),
                ("C".to_string(), 2),
                ("D".to_string(), 1),
                ("E".to_string(), 0),
            ]
        );
        assert_eq!(flat[0].level, 0);
        for pair in flat.windows(2) {
            assert!(pair[1].level <= pair[0].level + 1);
        }
    }

    #[test]
    fn test_find_and_path_agree() {
        let forest = sample();
        for entry in flatten_maintenance_types(&forest) {
            let id = entry.item.id.as_str();
            assert_eq!(find_maintenance_type(&forest, id).map(|m| m.id.as_str()), Some(id));
            let path = path_to_type(&forest, id);
            assert_eq!(path.last().map(|m| m.id.as_str()), Some(id));
            assert_eq!(path.len(), entry.level + 1);
        }

        let ids: Vec<&str> = path_to_type(&forest, "C").iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert!(path_to_type(&forest, "missing").is_empty());
        assert!(find_maintenance_type(&forest, "missing").is_none());
    }

    #[test]
    fn test_update_in_place_keeps_children_and_order() {
        let forest = sample();
        let mut patch = find_maintenance_type(&forest, "B").unwrap().fields();
        patch.name = "Bearing service".to_string();
        patch.deviation = Some(24);

        let updated = update_maintenance_type(&forest, "B", patch).unwrap();
        let b = find_maintenance_type(&updated, "B").unwrap();
        assert_eq!(b.name, "Bearing service");
        assert_eq!(b.deviation, Some(24));
        assert_eq!(b.children.len(), 1);
        assert_eq!(levels(&updated), levels(&forest));
    }

    #[test]
    fn test_update_moves_subtree_to_new_parent() {
        let forest = sample();
        let mut patch = find_maintenance_type(&forest, "B").unwrap().fields();
        patch.parent_id = Some("E".to_string());

        let moved = update_maintenance_type(&forest, "B", patch).unwrap();
        assert_eq!(
            levels(&moved),
            vec![
                ("A".to_string(), 0),
                ("D".to_string(), 1),
                ("E".to_string(), 0),
                ("B".to_string(), 1),
                ("C".to_string(), 2),
            ]
        );

        let mut to_root = find_maintenance_type(&moved, "C").unwrap().fields();
        to_root.parent_id = None;
        let rooted = update_maintenance_type(&moved, "C", to_root).unwrap();
        assert_eq!(rooted.last().map(|m| m.id.as_str()), Some("C"));
    }

    #[test]
    fn test_update_rejects_cycles() {
        let forest = sample();
        let mut patch = find_maintenance_type(&forest, "A").unwrap().fields();

        patch.parent_id = Some("A".to_string());
        assert!(matches!(
            update_maintenance_type(&forest, "A", patch.clone()),
            Err(CoreError::Consistency(_))
        ));

        patch.parent_id = Some("C".to_string());
        assert!(matches!(
            update_maintenance_type(&forest, "A", patch),
            Err(CoreError::Consistency(_))
        ));
    }

    #[test]
    fn test_update_missing_targets() {
        let forest = sample();
        let patch = find_maintenance_type(&forest, "B").unwrap().fields();
        assert!(matches!(
            update_maintenance_type(&forest, "Q", patch.clone()),
            Err(CoreError::NotFound { .. })
        ));

        let mut orphan = patch;
        orphan.parent_id = Some("Q".to_string());
        assert_eq!(
            update_maintenance_type(&forest, "B", orphan).unwrap_err(),
            CoreError::not_found(EntityPrefix::Mtype, "Q")
        );
    }

    #[test]
    fn test_validate_messages() {
        let bad = MaintenanceTypePatch {
            name: "  ".to_string(),
            duration: 0,
            interval: -1,
            deviation: Some(-2),
            priority: Some(0),
            ..Default::default()
        };
        let errors = validate_maintenance_type(&bad);
        assert_eq!(errors.len(), 5);
        assert_eq!(errors[0], "name is required");

        let ok = MaintenanceTypePatch {
            name: "Lube".to_string(),
            duration: 1,
            ..Default::default()
        };
        assert!(validate_maintenance_type(&ok).is_empty());
    }

    #[test]
    fn test_parent_options_exclude_edited_subtree() {
        let forest = sample();
        let ids: Vec<&str> = parent_options(&forest, Some("B"))
            .iter()
            .map(|e| e.item.id.as_str())
            .collect();
        assert_eq!(ids, vec!["A", "D", "E"]);
        assert_eq!(parent_options(&forest, None).len(), 5);
    }

    #[test]
    fn test_add_rejects_repeated_id_within_new_subtree() {
        let mut x = mt("X", None, 1, 0);
        x.children.push(mt("X", Some("X"), 1, 0));
        let err = add_maintenance_type(&[], x).unwrap_err();
        assert!(matches!(err, CoreError::Consistency(_)));
    }

    #[test]
    fn test_update_moves_by_position_not_stored_parent() {
        // B is nested under A but its record lacks a parent id
        let mut a = mt("A", None, 2, 500);
        a.children.push(mt("B", None, 1, 200));
        let forest = vec![a];

        let patch = mt("B", None, 1, 200).fields();
        let moved = update_maintenance_type(&forest, "B", patch).unwrap();
        let roots: Vec<&str> = moved.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(roots, vec!["A", "B"]);
        assert!(moved[0].children.is_empty());

        let back = update_maintenance_type(&moved, "B", mt("B", Some("A"), 1, 200).fields()).unwrap();
        assert_eq!(levels(&back), vec![("A".to_string(), 0), ("B".to_string(), 1)]);
    }
}
