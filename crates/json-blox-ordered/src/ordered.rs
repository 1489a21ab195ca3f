//! In-memory ordered representation.

use serde_json::{Map, Value};

use crate::storage::{StorageBlob, StorageEntry};

/// A JSON value whose objects are explicit entry sequences.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderedJson {
    /// Scalars, including `null`.
    Primitive(Value),
    Array(Vec<OrderedJson>),
    Object(Vec<(String, OrderedJson)>),
}

impl OrderedJson {
    pub fn encode(value: &Value) -> Self {
        match value {
            Value::Array(items) => {
                OrderedJson::Array(items.iter().map(OrderedJson::encode).collect())
            }
            Value::Object(map) => OrderedJson::Object(
                map.iter()
                    .map(|(key, val)| (key.clone(), OrderedJson::encode(val)))
                    .collect(),
            ),
            scalar => OrderedJson::Primitive(scalar.clone()),
        }
    }

    pub fn decode(&self) -> Value {
        match self {
            OrderedJson::Primitive(value) => value.clone(),
            OrderedJson::Array(items) => {
                Value::Array(items.iter().map(OrderedJson::decode).collect())
            }
            OrderedJson::Object(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, val) in entries {
                    map.insert(key.clone(), val.decode());
                }
                Value::Object(map)
            }
        }
    }

    /// The wire tag used by the storage form.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderedJson::Primitive(_) => "primitive",
            OrderedJson::Array(_) => "array",
            OrderedJson::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, OrderedJson::Primitive(Value::Null))
    }

    /// Compact JSON text of the decoded value, keys in recorded order.
    ///
    /// Two ordered values have equal canonical text iff they decode to the
    /// same document with the same key order.
    pub fn canonical_text(&self) -> String {
        self.decode().to_string()
    }

    /// Compact JSON text of the tagged form, object entries as `[key, node]`
    /// pairs:
    ///
    /// ```text
    /// {"type":"object","value":[["a",{"type":"primitive","value":1}]]}
    /// ```
    ///
    /// Every node is a self-delimiting object, so concatenating the tagged
    /// texts of several values never makes two different sequences collide.
    pub fn tagged_text(&self) -> String {
        self.tagged_value().to_string()
    }

    fn tagged_value(&self) -> Value {
        let value = match self {
            OrderedJson::Primitive(value) => value.clone(),
            OrderedJson::Array(items) => {
                Value::Array(items.iter().map(OrderedJson::tagged_value).collect())
            }
            OrderedJson::Object(entries) => Value::Array(
                entries
                    .iter()
                    .map(|(key, val)| {
                        Value::Array(vec![Value::String(key.clone()), val.tagged_value()])
                    })
                    .collect(),
            ),
        };
        let mut node = Map::with_capacity(2);
        node.insert("type".to_string(), Value::String(self.kind().to_string()));
        node.insert("value".to_string(), value);
        Value::Object(node)
    }

    pub fn to_storage(&self) -> StorageBlob {
        match self {
            OrderedJson::Primitive(value) => StorageBlob::Primitive(value.clone()),
            OrderedJson::Array(items) => {
                StorageBlob::Array(items.iter().map(OrderedJson::to_storage).collect())
            }
            OrderedJson::Object(entries) => StorageBlob::Object(
                entries
                    .iter()
                    .map(|(key, val)| StorageEntry {
                        key: key.clone(),
                        value: val.to_storage(),
                    })
                    .collect(),
            ),
        }
    }

    pub fn from_storage(blob: StorageBlob) -> Self {
        match blob {
            StorageBlob::Primitive(value) => OrderedJson::Primitive(value),
            StorageBlob::Array(items) => {
                OrderedJson::Array(items.into_iter().map(OrderedJson::from_storage).collect())
            }
            StorageBlob::Object(entries) => OrderedJson::Object(
                entries
                    .into_iter()
                    .map(|entry| (entry.key, OrderedJson::from_storage(entry.value)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for OrderedJson {
    fn from(value: &Value) -> Self {
        OrderedJson::encode(value)
    }
}

impl From<&OrderedJson> for Value {
    fn from(ordered: &OrderedJson) -> Self {
        ordered.decode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_is_primitive() {
        assert_eq!(OrderedJson::encode(&Value::Null), OrderedJson::Primitive(Value::Null));
        assert!(OrderedJson::encode(&Value::Null).is_null());
    }

    #[test]
    fn object_entries_keep_insertion_order() {
        let doc = json!({"zeta": 1, "alpha": 2, "mid": 3});
        match OrderedJson::encode(&doc) {
            OrderedJson::Object(entries) => {
                let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn canonical_text_is_compact_and_ordered() {
        let doc = json!({"b": [1, {"y": null, "x": "s"}], "a": false});
        assert_eq!(
            OrderedJson::encode(&doc).canonical_text(),
            r#"{"b":[1,{"y":null,"x":"s"}],"a":false}"#
        );
    }

    #[test]
    fn tagged_text_spells_out_every_node() {
        let doc = json!({"a": [1, "x"]});
        assert_eq!(
            OrderedJson::encode(&doc).tagged_text(),
            concat!(
                r#"{"type":"object","value":[["a","#,
                r#"{"type":"array","value":[{"type":"primitive","value":1},"#,
                r#"{"type":"primitive","value":"x"}]}]]}"#,
            )
        );
    }

    #[test]
    fn tagged_text_separates_adjacent_numbers() {
        let joined = |a: Value, b: Value| {
            OrderedJson::encode(&a).tagged_text() + &OrderedJson::encode(&b).tagged_text()
        };
        assert_ne!(joined(json!(1), json!(23)), joined(json!(12), json!(3)));
        assert_ne!(joined(json!("a"), json!("bc")), joined(json!("ab"), json!("c")));
    }

    #[test]
    fn kind_tags() {
        assert_eq!(OrderedJson::encode(&json!(1)).kind(), "primitive");
        assert_eq!(OrderedJson::encode(&json!([])).kind(), "array");
        assert_eq!(OrderedJson::encode(&json!({})).kind(), "object");
    }

    #[test]
    fn storage_conversion_is_lossless() {
        let doc = json!({"k": [1, 2, {"n": null}], "s": "str"});
        let ordered = OrderedJson::encode(&doc);
        let back = OrderedJson::from_storage(ordered.to_storage());
        assert_eq!(back, ordered);
    }
}
