//! Structural edits.
//!
//! Every operation reads the current document and returns a new one; the
//! input is never touched. `None` means the request was a no-op (root path,
//! unknown path, boundary move). Path changes that the collapse-state has to
//! follow are reported as a [`PathEffect`].

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Map, Number, Value};
use tracing::debug;

use crate::collapse::CollapseState;
use crate::error::ValidationError;
use crate::path::{NodePath, PathStep};

const NEW_FIELD: &str = "newField";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// How node paths moved as a side effect of a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathEffect {
    None,
    Renamed { from: NodePath, to: NodePath },
    Swapped(NodePath, NodePath),
    Removed { path: NodePath, parent_is_array: bool },
}

impl PathEffect {
    pub fn apply(&self, collapsed: &mut CollapseState) {
        match self {
            PathEffect::None => {}
            PathEffect::Renamed { from, to } => collapsed.rename(from, to),
            PathEffect::Swapped(a, b) => collapsed.swap(a, b),
            PathEffect::Removed {
                path,
                parent_is_array,
            } => collapsed.remove(path, *parent_is_array),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub document: Value,
    pub effect: PathEffect,
}

impl Mutation {
    fn plain(document: Value) -> Self {
        Mutation { document, effect: PathEffect::None }
    }
}

fn neighbour(idx: usize, direction: Direction, len: usize) -> Option<usize> {
    match direction {
        Direction::Up => idx.checked_sub(1),
        Direction::Down => (idx + 1 < len).then_some(idx + 1),
    }
}

/// Swaps a node with its previous or next sibling.
pub fn move_node(doc: &Value, path: &NodePath, direction: Direction) -> Option<Mutation> {
    let Some((parent_path, step)) = path.split_last() else {
        debug!("move ignored for the root row");
        return None;
    };
    let mut next = doc.clone();
    let parent = parent_path.get_mut(&mut next)?;
    let effect = match (parent, step) {
        (Value::Object(map), PathStep::Key(key)) => {
            let idx = map.keys().position(|k| k == key)?;
            let target = neighbour(idx, direction, map.len())?;
            let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            entries.swap(idx, target);
            *map = entries.into_iter().collect();
            PathEffect::None
        }
        (Value::Array(items), PathStep::Index(idx)) => {
            let idx = *idx;
            if idx >= items.len() {
                return None;
            }
            let target = neighbour(idx, direction, items.len())?;
            items.swap(idx, target);
            PathEffect::Swapped(path.clone(), parent_path.index(target))
        }
        _ => return None,
    };
    Some(Mutation { document: next, effect })
}

/// Removes a member from its object or an element from its array.
pub fn delete_node(doc: &Value, path: &NodePath) -> Option<Mutation> {
    let Some((parent_path, step)) = path.split_last() else {
        debug!("delete ignored for the root row");
        return None;
    };
    let mut next = doc.clone();
    let parent = parent_path.get_mut(&mut next)?;
    let parent_is_array = match (parent, step) {
        (Value::Object(map), PathStep::Key(key)) => {
            if !map.contains_key(key) {
                return None;
            }
            *map = std::mem::take(map).into_iter().filter(|(k, _)| k != key).collect();
            false
        }
        (Value::Array(items), PathStep::Index(idx)) => {
            if *idx >= items.len() {
                return None;
            }
            items.remove(*idx);
            true
        }
        _ => return None,
    };
    Some(Mutation {
        document: next,
        effect: PathEffect::Removed { path: path.clone(), parent_is_array },
    })
}

/// Replaces a node's value and, for object members, optionally its key.
///
/// A renamed member keeps its position among its siblings.
pub fn edit_node(
    doc: &Value,
    path: &NodePath,
    new_key: &str,
    raw_value: &str,
) -> Result<Option<Mutation>, ValidationError> {
    let Some((parent_path, step)) = path.split_last() else {
        debug!("edit ignored for the root row");
        return Ok(None);
    };
    if new_key.trim().is_empty() {
        return Err(ValidationError::EmptyKey);
    }
    let value = parse_edit_value(raw_value)?;

    let mut next = doc.clone();
    let Some(parent) = parent_path.get_mut(&mut next) else {
        return Ok(None);
    };
    let effect = match (parent, step) {
        (Value::Object(map), PathStep::Key(old_key)) => {
            if !map.contains_key(old_key) {
                return Ok(None);
            }
            if old_key == new_key {
                map.insert(old_key.clone(), value);
                PathEffect::None
            } else {
                if map.contains_key(new_key) {
                    return Err(ValidationError::DuplicateKey(new_key.to_string()));
                }
                let mut replacement = Some(value);
                *map = std::mem::take(map)
                    .into_iter()
                    .map(|(k, v)| {
                        if &k == old_key {
                            (new_key.to_string(), replacement.take().unwrap_or(v))
                        } else {
                            (k, v)
                        }
                    })
                    .collect();
                PathEffect::Renamed { from: path.clone(), to: parent_path.key(new_key) }
            }
        }
        (Value::Array(items), PathStep::Index(idx)) => {
            if new_key != idx.to_string() {
                return Err(ValidationError::ArrayIndexKey(*idx));
            }
            let Some(slot) = items.get_mut(*idx) else {
                return Ok(None);
            };
            *slot = value;
            PathEffect::None
        }
        _ => return Ok(None),
    };
    Ok(Some(Mutation { document: next, effect }))
}

/// Appends an empty string to an array, or a fresh `newField…` member to an
/// object. The root is a valid target.
pub fn add_field(doc: &Value, target: &NodePath) -> Option<Mutation> {
    let mut next = doc.clone();
    match target.get_mut(&mut next)? {
        Value::Array(items) => items.push(Value::String(String::new())),
        Value::Object(map) => {
            let name = unique_field_name(map);
            map.insert(name, Value::String(String::new()));
        }
        _ => {
            debug!(path = %target, "add field ignored for a primitive");
            return None;
        }
    }
    Some(Mutation::plain(next))
}

fn unique_field_name(map: &Map<String, Value>) -> String {
    if !map.contains_key(NEW_FIELD) {
        return NEW_FIELD.to_string();
    }
    (1..)
        .map(|n| format!("{NEW_FIELD}{n}"))
        .find(|name| !map.contains_key(name))
        .unwrap_or_default()
}

fn numeric_literal() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("numeric literal pattern"))
}

/// Parses the raw text of a value field.
///
/// Precedence: empty or `null` → null; `true`/`false` (any case) → bool;
/// `[`… → JSON array; `{`… → JSON object; integer or decimal → number;
/// `"`…`"` → the inner text verbatim.
pub fn parse_edit_value(raw: &str) -> Result<Value, ValidationError> {
    if raw.is_empty() || raw == "null" {
        return Ok(Value::Null);
    }
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        return Ok(Value::Bool(true));
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Ok(Value::Bool(false));
    }
    if trimmed.starts_with('[') {
        return match serde_json::from_str::<Value>(trimmed) {
            Ok(value @ Value::Array(_)) => Ok(value),
            _ => Err(ValidationError::InvalidArray),
        };
    }
    if trimmed.starts_with('{') {
        return match serde_json::from_str::<Value>(trimmed) {
            Ok(value @ Value::Object(_)) => Ok(value),
            _ => Err(ValidationError::InvalidObject),
        };
    }
    if numeric_literal().is_match(trimmed) {
        return parse_number(trimmed).ok_or(ValidationError::UnrecognizedValue);
    }
    if trimmed.starts_with('"') && trimmed.ends_with('"') {
        let inner = if trimmed.len() >= 2 { &trimmed[1..trimmed.len() - 1] } else { "" };
        return Ok(Value::String(inner.to_string()));
    }
    Err(ValidationError::UnrecognizedValue)
}

fn parse_number(literal: &str) -> Option<Value> {
    if !literal.contains('.') {
        if let Ok(int) = literal.parse::<i64>() {
            return Some(Value::from(int));
        }
    }
    let float: f64 = literal.parse().ok()?;
    if float.fract() == 0.0 && float.abs() < 9_007_199_254_740_992.0 {
        return Some(Value::from(float as i64));
    }
    Number::from_f64(float).map(Value::Number)
}

/// The document shown on first load and restored by reset.
pub fn default_document() -> Value {
    json!({
        "name": "JSON Blox",
        "version": "1.0.0",
        "description": "Highly Performant and User-Friendly JSON Visualization Toolkit",
        "features": {
            "editor": {
                "enabled": true,
                "type": "monaco",
                "settings": {
                    "theme": "light",
                    "minimap": false
                }
            },
            "blocks": {
                "enabled": true,
                "settings": {
                    "defaultCollapsed": true,
                    "colorByLevel": true,
                    "indentSize": 24
                }
            },
            "search": {
                "enabled": true,
                "caseSensitive": false
            }
        },
        "examples": [
            {"type": "string", "value": "Hello World"},
            {"type": "number", "value": 42},
            {"type": "boolean", "value": true},
            {"type": "null", "value": null}
        ],
        "contributors": [
            {"name": "David Zhang", "role": "Developer"}
        ],
        "meta": {
            "created": "2024-11-27",
            "updated": "2024-11-27",
            "license": "MIT"
        }
    })
}

/// The document left by clear.
pub fn empty_document() -> Value {
    Value::Object(Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(path: &[&str]) -> NodePath {
        NodePath::from_steps(path.iter().map(|s| PathStep::key(*s)).collect())
    }

    fn keys_of(value: &Value) -> Vec<String> {
        value.as_object().unwrap().keys().cloned().collect()
    }

    #[test]
    fn move_object_key_up_and_down() {
        let doc = json!({"a": 1, "b": 2, "c": 3});
        let up = move_node(&doc, &key(&["b"]), Direction::Up).unwrap();
        assert_eq!(keys_of(&up.document), vec!["b", "a", "c"]);
        let down = move_node(&doc, &key(&["b"]), Direction::Down).unwrap();
        assert_eq!(keys_of(&down.document), vec!["a", "c", "b"]);
        assert_eq!(keys_of(&doc), vec!["a", "b", "c"]);
    }

    #[test]
    fn move_at_boundaries_is_noop() {
        let doc = json!({"a": 1, "b": 2});
        assert_eq!(move_node(&doc, &key(&["a"]), Direction::Up), None);
        assert_eq!(move_node(&doc, &key(&["b"]), Direction::Down), None);
        let arr = json!({"l": [1, 2]});
        assert_eq!(move_node(&arr, &key(&["l"]).index(0), Direction::Up), None);
        assert_eq!(move_node(&arr, &key(&["l"]).index(1), Direction::Down), None);
    }

    #[test]
    fn move_nested_array_element_reports_swap() {
        let doc = json!({"x": {"l": [1, 2, 3]}});
        let path = key(&["x", "l"]).index(2);
        let moved = move_node(&doc, &path, Direction::Up).unwrap();
        assert_eq!(moved.document, json!({"x": {"l": [1, 3, 2]}}));
        assert_eq!(moved.effect, PathEffect::Swapped(path, key(&["x", "l"]).index(1)));
    }

    #[test]
    fn root_is_rejected_everywhere_but_add_field() {
        let doc = json!({"a": 1});
        let root = NodePath::root();
        assert_eq!(move_node(&doc, &root, Direction::Up), None);
        assert_eq!(delete_node(&doc, &root), None);
        assert_eq!(edit_node(&doc, &root, "a", "1"), Ok(None));
        assert!(add_field(&doc, &root).is_some());
    }

    #[test]
    fn delete_keeps_sibling_order() {
        let doc = json!({"a": 1, "b": 2, "c": 3, "d": 4});
        let deleted = delete_node(&doc, &key(&["b"])).unwrap();
        assert_eq!(keys_of(&deleted.document), vec!["a", "c", "d"]);
        assert_eq!(
            deleted.effect,
            PathEffect::Removed { path: key(&["b"]), parent_is_array: false }
        );
    }

    #[test]
    fn delete_compacts_arrays() {
        let doc = json!([10, 20, 30]);
        let deleted = delete_node(&doc, &NodePath::root().index(1)).unwrap();
        assert_eq!(deleted.document, json!([10, 30]));
        assert_eq!(delete_node(&doc, &NodePath::root().index(9)), None);
    }

    #[test]
    fn edit_parser_table() {
        assert_eq!(parse_edit_value("42"), Ok(json!(42)));
        assert_eq!(parse_edit_value("-3.5"), Ok(json!(-3.5)));
        assert_eq!(parse_edit_value("\"hi\""), Ok(json!("hi")));
        assert_eq!(parse_edit_value("\"a\\nb\""), Ok(json!("a\\nb")));
        assert_eq!(parse_edit_value("true"), Ok(json!(true)));
        assert_eq!(parse_edit_value("FALSE"), Ok(json!(false)));
        assert_eq!(parse_edit_value(""), Ok(Value::Null));
        assert_eq!(parse_edit_value("null"), Ok(Value::Null));
        assert_eq!(parse_edit_value("[1,2]"), Ok(json!([1, 2])));
        assert_eq!(parse_edit_value("{\"k\": [1]}"), Ok(json!({"k": [1]})));
        assert_eq!(parse_edit_value("{bad"), Err(ValidationError::InvalidObject));
        assert_eq!(parse_edit_value("[1,"), Err(ValidationError::InvalidArray));
        assert_eq!(parse_edit_value("hello"), Err(ValidationError::UnrecognizedValue));
        assert_eq!(parse_edit_value("1e5"), Err(ValidationError::UnrecognizedValue));
    }

    #[test]
    fn edit_replaces_value_in_place() {
        let doc = json!({"a": 1, "b": 2});
        let edited = edit_node(&doc, &key(&["a"]), "a", "\"x\"").unwrap().unwrap();
        assert_eq!(edited.document.to_string(), r#"{"a":"x","b":2}"#);
        assert_eq!(edited.effect, PathEffect::None);
    }

    #[test]
    fn rename_keeps_position() {
        let doc = json!({"a": 1, "b": {"c": 2}, "d": 3});
        let edited = edit_node(&doc, &key(&["b"]), "x", "{\"c\": 2}").unwrap().unwrap();
        assert_eq!(keys_of(&edited.document), vec!["a", "x", "d"]);
        assert_eq!(
            edited.effect,
            PathEffect::Renamed { from: key(&["b"]), to: key(&["x"]) }
        );
    }

    #[test]
    fn edit_validation_leaves_document_alone() {
        let doc = json!({"a": 1, "b": 2});
        assert_eq!(edit_node(&doc, &key(&["a"]), "  ", "1"), Err(ValidationError::EmptyKey));
        assert_eq!(edit_node(&doc, &key(&["a"]), "a", "{bad"), Err(ValidationError::InvalidObject));
        assert_eq!(
            edit_node(&doc, &key(&["a"]), "b", "1"),
            Err(ValidationError::DuplicateKey("b".into()))
        );
        assert_eq!(doc, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn edit_array_element() {
        let doc = json!({"l": [1, 2]});
        let path = key(&["l"]).index(1);
        let edited = edit_node(&doc, &path, "1", "true").unwrap().unwrap();
        assert_eq!(edited.document, json!({"l": [1, true]}));
        assert_eq!(edit_node(&doc, &path, "7", "true"), Err(ValidationError::ArrayIndexKey(1)));
    }

    #[test]
    fn add_field_synthesizes_unique_names() {
        let doc = json!({"newField": 1, "newField1": 2});
        let added = add_field(&doc, &NodePath::root()).unwrap();
        assert_eq!(keys_of(&added.document), vec!["newField", "newField1", "newField2"]);
        assert_eq!(added.document["newField2"], json!(""));

        let fresh = add_field(&json!({}), &NodePath::root()).unwrap();
        assert_eq!(fresh.document, json!({"newField": ""}));
    }

    #[test]
    fn add_field_appends_to_arrays() {
        let doc = json!({"l": [1]});
        let added = add_field(&doc, &key(&["l"])).unwrap();
        assert_eq!(added.document, json!({"l": [1, ""]}));
        assert_eq!(add_field(&doc, &key(&["l"]).index(0)), None);
    }

    #[test]
    fn default_document_key_order() {
        assert_eq!(
            keys_of(&default_document()),
            vec!["name", "version", "description", "features", "examples", "contributors", "meta"]
        );
        assert_eq!(empty_document(), json!({}));
    }
}
