//! Equipment tree traversal and path-rebuild mutation
//!
//! A tree is a list of `Arc<TreeNode>` roots. Mutations rebuild only the
//! chain of ancestors leading to the edited entry; every other subtree of
//! the new tree is the same `Arc` as in the old one.

use std::sync::Arc;

use crate::core::error::CoreError;
use crate::core::identity::EntityPrefix;
use crate::entities::tree::{Assembly, Node, TreeNode};

/// Separator used in node display paths
pub const PATH_SEPARATOR: &str = " / ";

/// A grouping node together with its display path
#[derive(Debug, Clone, PartialEq)]
pub struct NodeEntry<'a> {
    pub node: &'a Node,
    /// Names from the root down to this node, joined by [`PATH_SEPARATOR`]
    pub path: String,
    /// Root nodes are at depth 0
    pub depth: usize,
}

/// Every assembly in the tree, in depth-first pre-order
pub fn list_assemblies(tree: &[Arc<TreeNode>]) -> Vec<&Assembly> {
    let mut out = Vec::new();
    collect_assemblies(tree, &mut out);
    out
}

/// Every grouping node in the tree with its display path, in pre-order
pub fn list_nodes(tree: &[Arc<TreeNode>]) -> Vec<NodeEntry<'_>> {
    let mut out = Vec::new();
    collect_nodes(tree, &mut Vec::new(), &mut out);
    out
}

/// Assemblies strictly below `node`, in pre-order
pub fn descendant_assemblies(node: &TreeNode) -> Vec<&Assembly> {
    list_assemblies(node.children())
}

/// Depth-first pre-order lookup of any entry
pub fn find_tree_node<'a>(tree: &'a [Arc<TreeNode>], id: &str) -> Option<&'a Arc<TreeNode>> {
    for entry in tree {
        if entry.id() == id {
            return Some(entry);
        }
        if let Some(found) = find_tree_node(entry.children(), id) {
            return Some(found);
        }
    }
    None
}

/// Look up an assembly by id
pub fn find_assembly<'a>(tree: &'a [Arc<TreeNode>], id: &str) -> Option<&'a Assembly> {
    find_tree_node(tree, id).and_then(|entry| entry.as_assembly())
}

/// Entries from a root down to `id` (inclusive); empty when absent
pub fn path_to_tree_node<'a>(tree: &'a [Arc<TreeNode>], id: &str) -> Vec<&'a Arc<TreeNode>> {
    let mut path = Vec::new();
    if collect_path(tree, id, &mut path) {
        path
    } else {
        Vec::new()
    }
}

/// Display path of any entry, e.g. `Plant / Line 1 / Pump 3`
pub fn display_path(tree: &[Arc<TreeNode>], id: &str) -> Option<String> {
    let path = path_to_tree_node(tree, id);
    if path.is_empty() {
        return None;
    }
    Some(
        path.iter()
            .map(|entry| entry.name())
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR),
    )
}

/// Replace the entry `id` with the result of `edit`, rebuilding its ancestors
///
/// Sibling subtrees are reused, never copied. When `edit` fails the error is
/// returned and no new tree is produced.
pub fn update_tree_node<F>(
    tree: &[Arc<TreeNode>],
    id: &str,
    edit: F,
) -> Result<Vec<Arc<TreeNode>>, CoreError>
where
    F: FnOnce(&TreeNode) -> Result<TreeNode, CoreError>,
{
    let path = index_path(tree, id).ok_or_else(|| CoreError::not_found(EntityPrefix::Node, id))?;
    rebuild_at(tree, &path, edit)
}

/// Change an entry's display fields
pub fn rename_tree_node(
    tree: &[Arc<TreeNode>],
    id: &str,
    name: &str,
    description: &str,
) -> Result<Vec<Arc<TreeNode>>, CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::validation(vec!["name is required".to_string()]));
    }
    update_tree_node(tree, id, |entry| Ok(entry.renamed(name, description)))
}

fn collect_assemblies<'a>(tree: &'a [Arc<TreeNode>], out: &mut Vec<&'a Assembly>) {
    for entry in tree {
        if let Some(assembly) = entry.as_assembly() {
            out.push(assembly);
        }
        collect_assemblies(entry.children(), out);
    }
}

fn collect_nodes<'a>(
    tree: &'a [Arc<TreeNode>],
    ancestors: &mut Vec<&'a str>,
    out: &mut Vec<NodeEntry<'a>>,
) {
    for entry in tree {
        ancestors.push(entry.name());
        if let Some(node) = entry.as_node() {
            out.push(NodeEntry {
                node,
                path: ancestors.join(PATH_SEPARATOR),
                depth: ancestors.len() - 1,
            });
        }
        collect_nodes(entry.children(), ancestors, out);
        ancestors.pop();
    }
}

fn collect_path<'a>(
    tree: &'a [Arc<TreeNode>],
    id: &str,
    path: &mut Vec<&'a Arc<TreeNode>>,
) -> bool {
    for entry in tree {
        path.push(entry);
        if entry.id() == id || collect_path(entry.children(), id, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn index_path(tree: &[Arc<TreeNode>], id: &str) -> Option<Vec<usize>> {
    for (i, entry) in tree.iter().enumerate() {
        if entry.id() == id {
            return Some(vec![i]);
        }
        if let Some(mut rest) = index_path(entry.children(), id) {
            rest.insert(0, i);
            return Some(rest);
        }
    }
    None
}

fn rebuild_at<F>(
    tree: &[Arc<TreeNode>],
    path: &[usize],
    edit: F,
) -> Result<Vec<Arc<TreeNode>>, CoreError>
where
    F: FnOnce(&TreeNode) -> Result<TreeNode, CoreError>,
{
    let Some((&index, rest)) = path.split_first() else {
        return Ok(tree.to_vec());
    };
    let Some(target) = tree.get(index) else {
        return Ok(tree.to_vec());
    };

    let replacement = if rest.is_empty() {
        edit(target)?
    } else {
        target.with_children(rebuild_at(target.children(), rest, edit)?)
    };

    // Cloning the list clones Arcs, not subtrees
    let mut next = tree.to_vec();
    next[index] = Arc::new(replacement);
    Ok(next)
}
