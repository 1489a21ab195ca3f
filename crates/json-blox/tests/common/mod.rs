#![allow(dead_code)]

use json_blox::{CollapseState, NodePath, PathStep, Row};
use serde_json::{json, Value};

/// Builds a path from its display form, e.g. `root.list.0.name`. Numeric
/// segments are indices.
pub fn path(display: &str) -> NodePath {
    NodePath::from_steps(
        display
            .split('.')
            .skip(1)
            .map(|segment| match segment.parse::<usize>() {
                Ok(idx) => PathStep::Index(idx),
                Err(_) => PathStep::key(segment),
            })
            .collect(),
    )
}

pub fn row_paths(rows: &[Row<'_>]) -> Vec<String> {
    rows.iter().map(|row| row.path().to_string()).collect()
}

/// Rows the flattening should produce: the root plus every node whose
/// non-root ancestors are all expanded.
pub fn expected_row_count(doc: &Value, collapsed: &CollapseState) -> usize {
    fn count(value: &Value, at: &NodePath, collapsed: &CollapseState) -> usize {
        let children: Vec<(NodePath, &Value)> = match value {
            Value::Object(map) => map.iter().map(|(k, v)| (at.key(k.as_str()), v)).collect(),
            Value::Array(items) => {
                items.iter().enumerate().map(|(i, v)| (at.index(i), v)).collect()
            }
            _ => Vec::new(),
        };
        children
            .into_iter()
            .map(|(child, v)| {
                let below = if collapsed.is_expanded(&child) {
                    count(v, &child, collapsed)
                } else {
                    0
                };
                1 + below
            })
            .sum()
    }
    1 + count(doc, &NodePath::root(), collapsed)
}

pub fn sample_document() -> Value {
    json!({
        "name": "blox",
        "tags": ["a", "b", "c"],
        "owner": {"login": "octo", "profile": {"bio": "hi", "links": [1, 2]}},
        "count": 3
    })
}
