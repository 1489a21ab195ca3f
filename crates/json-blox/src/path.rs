//! Node addressing.
//!
//! A [`NodePath`] is a sequence of raw key/index steps below the synthetic
//! root. The dotted `root.a.0` string is only a rendering: keys that contain
//! `.` stay unambiguous in the step form.

use std::fmt;

use serde_json::Value;

pub const ROOT_LABEL: &str = "root";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

impl PathStep {
    pub fn key(key: impl Into<String>) -> Self {
        PathStep::Key(key.into())
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathStep::Key(key) => Some(key),
            PathStep::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathStep::Key(_) => None,
            PathStep::Index(idx) => Some(*idx),
        }
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(key) => f.write_str(key),
            PathStep::Index(idx) => write!(f, "{idx}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<PathStep>);

static ROOT_PATH: NodePath = NodePath(Vec::new());

impl NodePath {
    pub fn root() -> Self {
        NodePath(Vec::new())
    }

    /// A `'static` reference to the root path.
    pub fn root_ref() -> &'static NodePath {
        &ROOT_PATH
    }

    pub fn from_steps(steps: Vec<PathStep>) -> Self {
        NodePath(steps)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    /// Depth below the synthetic root; the root itself is level 0.
    pub fn level(&self) -> usize {
        self.0.len()
    }

    pub fn last(&self) -> Option<&PathStep> {
        self.0.last()
    }

    pub fn child(&self, step: PathStep) -> NodePath {
        let mut steps = Vec::with_capacity(self.0.len() + 1);
        steps.extend_from_slice(&self.0);
        steps.push(step);
        NodePath(steps)
    }

    pub fn key(&self, key: impl Into<String>) -> NodePath {
        self.child(PathStep::Key(key.into()))
    }

    pub fn index(&self, idx: usize) -> NodePath {
        self.child(PathStep::Index(idx))
    }

    pub fn push(&mut self, step: PathStep) {
        self.0.push(step);
    }

    pub fn pop(&mut self) -> Option<PathStep> {
        self.0.pop()
    }

    pub fn parent(&self) -> Option<NodePath> {
        if self.0.is_empty() {
            return None;
        }
        Some(NodePath(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Splits into `(parent, last step)`. `None` for the root.
    pub fn split_last(&self) -> Option<(NodePath, &PathStep)> {
        let (last, parent) = self.0.split_last()?;
        Some((NodePath(parent.to_vec()), last))
    }

    /// True when `prefix` is this path or one of its ancestors.
    pub fn starts_with(&self, prefix: &NodePath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Moves this path from under `from` to under `to`.
    ///
    /// Returns `None` when `from` is not a prefix of this path.
    pub fn rebase(&self, from: &NodePath, to: &NodePath) -> Option<NodePath> {
        if !self.starts_with(from) {
            return None;
        }
        let mut steps = to.0.clone();
        steps.extend_from_slice(&self.0[from.0.len()..]);
        Some(NodePath(steps))
    }

    /// All ancestors from the root down to and including this path.
    pub fn prefixes(&self) -> impl Iterator<Item = NodePath> + '_ {
        (0..=self.0.len()).map(move |len| NodePath(self.0[..len].to_vec()))
    }

    pub fn get<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        let mut cur = doc;
        for step in &self.0 {
            cur = match (step, cur) {
                (PathStep::Key(key), Value::Object(map)) => map.get(key)?,
                (PathStep::Index(idx), Value::Array(arr)) => arr.get(*idx)?,
                _ => return None,
            };
        }
        Some(cur)
    }

    pub fn get_mut<'a>(&self, doc: &'a mut Value) -> Option<&'a mut Value> {
        let mut cur = doc;
        for step in &self.0 {
            cur = match (step, cur) {
                (PathStep::Key(key), Value::Object(map)) => map.get_mut(key)?,
                (PathStep::Index(idx), Value::Array(arr)) => arr.get_mut(*idx)?,
                _ => return None,
            };
        }
        Some(cur)
    }

    /// Resolves a dotted display string against a document.
    ///
    /// The leading `root` segment is optional. Segments address array
    /// elements by index and object members by key; a key that itself
    /// contains `.` cannot be reached this way.
    pub fn resolve(doc: &Value, display: &str) -> Option<NodePath> {
        if display.is_empty() {
            return Some(NodePath::root());
        }
        let mut segments = display.split('.').peekable();
        if segments.peek() == Some(&ROOT_LABEL) {
            segments.next();
        }
        let mut path = NodePath::root();
        let mut cur = doc;
        for segment in segments {
            let (step, next) = match cur {
                Value::Object(map) => (PathStep::key(segment), map.get(segment)?),
                Value::Array(arr) => {
                    let idx: usize = segment.parse().ok()?;
                    (PathStep::Index(idx), arr.get(idx)?)
                }
                _ => return None,
            };
            path.push(step);
            cur = next;
        }
        Some(path)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ROOT_LABEL)?;
        for step in &self.0 {
            write!(f, ".{step}")?;
        }
        Ok(())
    }
}

impl From<Vec<PathStep>> for NodePath {
    fn from(steps: Vec<PathStep>) -> Self {
        NodePath(steps)
    }
}
