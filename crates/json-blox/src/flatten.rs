//! Tree flattening.
//!
//! Turns a document plus its collapse-state into the ordered list of visible
//! rows. Each row maps to one fixed-height item of a virtualized list, so the
//! row count is exactly the number of visible nodes plus the synthetic root.

use serde_json::Value;

use crate::collapse::CollapseState;
use crate::path::{NodePath, PathStep, ROOT_LABEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Primitive,
    Object,
    Array,
}

impl NodeKind {
    /// `null` is a primitive.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => NodeKind::Object,
            Value::Array(_) => NodeKind::Array,
            _ => NodeKind::Primitive,
        }
    }

    pub fn is_container(self) -> bool {
        !matches!(self, NodeKind::Primitive)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Primitive => "primitive",
            NodeKind::Object => "object",
            NodeKind::Array => "array",
        }
    }
}

/// The synthetic row wrapping the whole document.
#[derive(Debug, Clone, PartialEq)]
pub struct RootRow<'a> {
    pub value: &'a Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRow<'a> {
    pub path: NodePath,
    pub key: PathStep,
    pub value: &'a Value,
    pub level: usize,
    pub kind: NodeKind,
    pub is_expanded: bool,
    pub parent_is_array: bool,
}

impl NodeRow<'_> {
    pub fn parent_path(&self) -> NodePath {
        self.path.parent().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Row<'a> {
    Root(RootRow<'a>),
    Node(NodeRow<'a>),
}

impl<'a> Row<'a> {
    pub fn path(&self) -> &NodePath {
        match self {
            Row::Root(_) => NodePath::root_ref(),
            Row::Node(node) => &node.path,
        }
    }

    pub fn value(&self) -> &'a Value {
        match self {
            Row::Root(root) => root.value,
            Row::Node(node) => node.value,
        }
    }

    pub fn level(&self) -> usize {
        match self {
            Row::Root(_) => 0,
            Row::Node(node) => node.level,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Row::Root(root) => NodeKind::of(root.value),
            Row::Node(node) => node.kind,
        }
    }

    pub fn is_expanded(&self) -> bool {
        match self {
            Row::Root(_) => true,
            Row::Node(node) => node.is_expanded,
        }
    }

    pub fn parent_is_array(&self) -> bool {
        match self {
            Row::Root(_) => false,
            Row::Node(node) => node.parent_is_array,
        }
    }

    /// The key shown for the row: `root`, a member name, or an index.
    pub fn label(&self) -> String {
        match self {
            Row::Root(_) => ROOT_LABEL.to_string(),
            Row::Node(node) => node.key.to_string(),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Row::Root(_))
    }
}

/// Flattens `doc` in depth-first pre-order, skipping the children of
/// collapsed containers.
pub fn flatten<'a>(doc: &'a Value, collapsed: &CollapseState) -> Vec<Row<'a>> {
    let mut rows = vec![Row::Root(RootRow { value: doc })];
    let mut path = NodePath::root();
    push_children(doc, &mut path, 1, collapsed, &mut rows);
    rows
}

fn push_children<'a>(
    parent: &'a Value,
    path: &mut NodePath,
    level: usize,
    collapsed: &CollapseState,
    rows: &mut Vec<Row<'a>>,
) {
    match parent {
        Value::Object(map) => {
            for (key, child) in map {
                push_node(PathStep::key(key.as_str()), child, false, path, level, collapsed, rows);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                push_node(PathStep::Index(idx), child, true, path, level, collapsed, rows);
            }
        }
        _ => {}
    }
}

fn push_node<'a>(
    key: PathStep,
    value: &'a Value,
    parent_is_array: bool,
    path: &mut NodePath,
    level: usize,
    collapsed: &CollapseState,
    rows: &mut Vec<Row<'a>>,
) {
    path.push(key.clone());
    let kind = NodeKind::of(value);
    let is_expanded = collapsed.is_expanded(path);
    rows.push(Row::Node(NodeRow {
        path: path.clone(),
        key,
        value,
        level,
        kind,
        is_expanded,
        parent_is_array,
    }));
    if is_expanded && kind.is_container() {
        push_children(value, path, level + 1, collapsed, rows);
    }
    path.pop();
}

/// Position of the row for `path`, if it is visible.
pub fn row_index_of(rows: &[Row<'_>], path: &NodePath) -> Option<usize> {
    rows.iter().position(|row| row.path() == path)
}
