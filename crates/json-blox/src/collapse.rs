//! Collapse-state: the set of collapsed node paths.
//!
//! A node's descendants are left out of the flattening iff its path is in the
//! set. The root is never collapsed.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::path::{NodePath, PathStep};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseState {
    collapsed: BTreeSet<NodePath>,
}

impl CollapseState {
    /// Nothing collapsed: the "expand all" state.
    pub fn expanded() -> Self {
        Self::default()
    }

    /// Every non-root container of `doc` collapsed.
    pub fn collapsed_all(doc: &Value) -> Self {
        let mut state = Self::default();
        state.collapse_all(doc);
        state
    }

    pub fn is_collapsed(&self, path: &NodePath) -> bool {
        self.collapsed.contains(path)
    }

    pub fn is_expanded(&self, path: &NodePath) -> bool {
        !self.is_collapsed(path)
    }

    pub fn len(&self) -> usize {
        self.collapsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collapsed.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodePath> {
        self.collapsed.iter()
    }

    pub fn collapse(&mut self, path: NodePath) {
        if !path.is_root() {
            self.collapsed.insert(path);
        }
    }

    pub fn expand(&mut self, path: &NodePath) {
        self.collapsed.remove(path);
    }

    /// Flips one path; returns whether it is now expanded.
    pub fn toggle(&mut self, path: &NodePath) -> bool {
        if path.is_root() {
            return true;
        }
        if self.collapsed.remove(path) {
            true
        } else {
            self.collapsed.insert(path.clone());
            false
        }
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    pub fn collapse_all(&mut self, doc: &Value) {
        self.collapsed = container_paths(doc).into_iter().collect();
    }

    /// Forgets paths that no longer name a container in `doc`.
    pub fn prune(&mut self, doc: &Value) {
        self.collapsed
            .retain(|path| matches!(path.get(doc), Some(Value::Object(_) | Value::Array(_))));
    }

    /// Expands `path` and every ancestor so the node's row is visible.
    pub fn reveal(&mut self, path: &NodePath) {
        for prefix in path.prefixes() {
            self.collapsed.remove(&prefix);
        }
    }

    /// Re-keys every collapsed path equal to or under `from` to live under `to`.
    pub fn rename(&mut self, from: &NodePath, to: &NodePath) {
        if from == to {
            return;
        }
        self.collapsed = std::mem::take(&mut self.collapsed)
            .into_iter()
            .map(|path| path.rebase(from, to).unwrap_or(path))
            .collect();
    }

    /// Exchanges the collapse-state of two subtrees (adjacent array elements
    /// after a move).
    pub fn swap(&mut self, a: &NodePath, b: &NodePath) {
        self.collapsed = std::mem::take(&mut self.collapsed)
            .into_iter()
            .map(|path| {
                path.rebase(a, b)
                    .or_else(|| path.rebase(b, a))
                    .unwrap_or(path)
            })
            .collect();
    }

    /// Drops state for a deleted node. When the node was an array element the
    /// later siblings shift down one index with it.
    pub fn remove(&mut self, deleted: &NodePath, parent_is_array: bool) {
        let shift = match (parent_is_array, deleted.split_last()) {
            (true, Some((parent, PathStep::Index(idx)))) => Some((parent, *idx)),
            _ => None,
        };
        self.collapsed = std::mem::take(&mut self.collapsed)
            .into_iter()
            .filter(|path| !path.starts_with(deleted))
            .map(|path| match &shift {
                Some((parent, removed)) => shift_down(path, parent, *removed),
                None => path,
            })
            .collect();
    }
}

fn shift_down(path: NodePath, parent: &NodePath, removed: usize) -> NodePath {
    let depth = parent.level();
    if !path.starts_with(parent) || path.level() <= depth {
        return path;
    }
    match path.steps()[depth].as_index() {
        Some(idx) if idx > removed => {
            let mut steps = path.steps().to_vec();
            steps[depth] = PathStep::Index(idx - 1);
            NodePath::from_steps(steps)
        }
        _ => path,
    }
}

/// Every non-root object/array path in document order.
pub fn container_paths(doc: &Value) -> Vec<NodePath> {
    fn walk(value: &Value, path: &mut NodePath, out: &mut Vec<NodePath>) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    visit(PathStep::key(key.as_str()), child, path, out);
                }
            }
            Value::Array(arr) => {
                for (idx, child) in arr.iter().enumerate() {
                    visit(PathStep::Index(idx), child, path, out);
                }
            }
            _ => {}
        }
    }

    fn visit(step: PathStep, child: &Value, path: &mut NodePath, out: &mut Vec<NodePath>) {
        path.push(step);
        if child.is_object() || child.is_array() {
            out.push(path.clone());
            walk(child, path, out);
        }
        path.pop();
    }

    let mut out = Vec::new();
    walk(doc, &mut NodePath::root(), &mut out);
    out
}
