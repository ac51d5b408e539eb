//! Equipment tree entities - organizational nodes and assembly instances
//!
//! Children are held behind [`Arc`] so that a rebuilt tree can reuse every
//! subtree it did not touch. See [`crate::engine::tree`] for the traversal
//! and path-rebuild operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::core::entity::Entity;
use crate::core::identity::EntityPrefix;
use crate::entities::condition::Condition;

/// Pure grouping container (site, line, area...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub children: Vec<Arc<TreeNode>>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            children: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: impl Into<TreeNode>) -> Self {
        self.children.push(Arc::new(child.into()));
        self
    }
}

/// A physical equipment instance of an assembly type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assembly {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Assembly type this instance realizes (ATYPE-...)
    pub assembly_type_id: String,

    /// Normally empty; assemblies are the leaves of the tree
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Arc<TreeNode>>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Assembly {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        assembly_type_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            assembly_type_id: assembly_type_id.into(),
            children: Vec::new(),
            conditions: Vec::new(),
        }
    }
}

/// Discriminant of a tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeKind {
    Node,
    Assembly,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Node => write!(f, "NODE"),
            NodeKind::Assembly => write!(f, "ASSEMBLY"),
        }
    }
}

/// An entry of the equipment tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum TreeNode {
    Node(Node),
    Assembly(Assembly),
}

impl TreeNode {
    pub fn id(&self) -> &str {
        match self {
            TreeNode::Node(n) => &n.id,
            TreeNode::Assembly(a) => &a.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TreeNode::Node(n) => &n.name,
            TreeNode::Assembly(a) => &a.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            TreeNode::Node(n) => &n.description,
            TreeNode::Assembly(a) => &a.description,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            TreeNode::Node(_) => NodeKind::Node,
            TreeNode::Assembly(_) => NodeKind::Assembly,
        }
    }

    pub fn children(&self) -> &[Arc<TreeNode>] {
        match self {
            TreeNode::Node(n) => &n.children,
            TreeNode::Assembly(a) => &a.children,
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        match self {
            TreeNode::Node(n) => &n.conditions,
            TreeNode::Assembly(a) => &a.conditions,
        }
    }

    pub fn as_assembly(&self) -> Option<&Assembly> {
        match self {
            TreeNode::Assembly(a) => Some(a),
            TreeNode::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            TreeNode::Node(n) => Some(n),
            TreeNode::Assembly(_) => None,
        }
    }

    /// Same entry with a new children list; scalar fields are copied
    pub fn with_children(&self, children: Vec<Arc<TreeNode>>) -> TreeNode {
        match self {
            TreeNode::Node(n) => TreeNode::Node(Node {
                id: n.id.clone(),
                name: n.name.clone(),
                description: n.description.clone(),
                children,
                conditions: n.conditions.clone(),
            }),
            TreeNode::Assembly(a) => TreeNode::Assembly(Assembly {
                id: a.id.clone(),
                name: a.name.clone(),
                description: a.description.clone(),
                assembly_type_id: a.assembly_type_id.clone(),
                children,
                conditions: a.conditions.clone(),
            }),
        }
    }

    /// Same entry with a new conditions list; children are shared
    pub fn with_conditions(&self, conditions: Vec<Condition>) -> TreeNode {
        let mut next = self.clone();
        match &mut next {
            TreeNode::Node(n) => n.conditions = conditions,
            TreeNode::Assembly(a) => a.conditions = conditions,
        }
        next
    }

    /// Same entry with new display fields; children are shared
    pub fn renamed(&self, name: impl Into<String>, description: impl Into<String>) -> TreeNode {
        let mut next = self.clone();
        match &mut next {
            TreeNode::Node(n) => {
                n.name = name.into();
                n.description = description.into();
            }
            TreeNode::Assembly(a) => {
                a.name = name.into();
                a.description = description.into();
            }
        }
        next
    }
}

impl From<Node> for TreeNode {
    fn from(node: Node) -> Self {
        TreeNode::Node(node)
    }
}

impl From<Assembly> for TreeNode {
    fn from(assembly: Assembly) -> Self {
        TreeNode::Assembly(assembly)
    }
}

impl Entity for Node {
    const PREFIX: EntityPrefix = EntityPrefix::Node;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Entity for Assembly {
    const PREFIX: EntityPrefix = EntityPrefix::Asm;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
