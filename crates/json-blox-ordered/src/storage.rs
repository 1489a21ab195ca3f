//! Storage wire form.
//!
//! The shape is part of the share-link contract: records written by earlier
//! releases must keep decoding, so reading is tolerant while writing always
//! produces the tagged form.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::OrderedError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum StorageBlob {
    Primitive(Value),
    Array(Vec<StorageBlob>),
    Object(Vec<StorageEntry>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageEntry {
    pub key: String,
    pub value: StorageBlob,
}

impl StorageBlob {
    /// Reads a blob from an untyped store value.
    ///
    /// A value without a string `type` tag is taken as a primitive of itself
    /// and an unknown tag reads as `null`.
    pub fn from_value(value: &Value) -> Result<Self, OrderedError> {
        let Some(tag) = value.get("type").and_then(Value::as_str) else {
            return Ok(StorageBlob::Primitive(value.clone()));
        };
        let inner = value.get("value").unwrap_or(&Value::Null);
        match tag {
            "primitive" => Ok(StorageBlob::Primitive(inner.clone())),
            "array" => {
                let items = inner.as_array().ok_or(OrderedError::NotASequence { tag: "array" })?;
                items
                    .iter()
                    .map(StorageBlob::from_value)
                    .collect::<Result<Vec<_>, _>>()
                    .map(StorageBlob::Array)
            }
            "object" => {
                let entries = inner.as_array().ok_or(OrderedError::NotASequence { tag: "object" })?;
                let mut out = Vec::with_capacity(entries.len());
                for (pos, entry) in entries.iter().enumerate() {
                    let key = entry
                        .get("key")
                        .and_then(Value::as_str)
                        .ok_or(OrderedError::MissingKey(pos))?;
                    let raw = entry.get("value").unwrap_or(&Value::Null);
                    let value = StorageBlob::from_value(raw)?;
                    out.push(StorageEntry { key: key.to_owned(), value });
                }
                Ok(StorageBlob::Object(out))
            }
            _ => Ok(StorageBlob::Primitive(Value::Null)),
        }
    }

    /// Writes the tagged form as an untyped value.
    pub fn to_value(&self) -> Value {
        match self {
            StorageBlob::Primitive(value) => json!({"type": "primitive", "value": value}),
            StorageBlob::Array(items) => json!({
                "type": "array",
                "value": items.iter().map(StorageBlob::to_value).collect::<Vec<_>>(),
            }),
            StorageBlob::Object(entries) => json!({
                "type": "object",
                "value": entries
                    .iter()
                    .map(|entry| json!({"key": entry.key, "value": entry.value.to_value()}))
                    .collect::<Vec<_>>(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for StorageBlob {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        StorageBlob::from_value(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OrderedJson;

    #[test]
    fn primitive_wire_form() {
        let blob = StorageBlob::Primitive(json!(42));
        assert_eq!(blob.to_value(), json!({"type": "primitive", "value": 42}));
        assert_eq!(serde_json::to_value(&blob).unwrap(), blob.to_value());
    }

    #[test]
    fn object_wire_form_lists_entries() {
        let blob = OrderedJson::encode(&json!({"b": 1, "a": null})).to_storage();
        let expected = json!({
            "type": "object",
            "value": [
                {"key": "b", "value": {"type": "primitive", "value": 1}},
                {"key": "a", "value": {"type": "primitive", "value": null}},
            ],
        });
        assert_eq!(blob.to_value(), expected);
        assert_eq!(serde_json::to_value(&blob).unwrap(), expected);
    }

    #[test]
    fn untagged_value_reads_as_primitive() {
        assert_eq!(StorageBlob::from_value(&json!(7)).unwrap(), StorageBlob::Primitive(json!(7)));
        assert_eq!(
            StorageBlob::from_value(&Value::Null).unwrap(),
            StorageBlob::Primitive(Value::Null)
        );
    }

    #[test]
    fn unknown_tag_reads_as_null() {
        let blob = StorageBlob::from_value(&json!({"type": "set", "value": [1]})).unwrap();
        assert_eq!(blob, StorageBlob::Primitive(Value::Null));
    }

    #[test]
    fn malformed_array_is_rejected() {
        let err = StorageBlob::from_value(&json!({"type": "array", "value": 3})).unwrap_err();
        assert_eq!(err, OrderedError::NotASequence { tag: "array" });
    }

    #[test]
    fn entry_without_key_is_rejected() {
        let raw = json!({
            "type": "object",
            "value": [{"value": {"type": "primitive", "value": 1}}],
        });
        assert_eq!(StorageBlob::from_value(&raw).unwrap_err(), OrderedError::MissingKey(0));
    }

    #[test]
    fn deserialize_goes_through_tolerant_reader() {
        let text = r#"{"type":"array","value":[{"type":"primitive","value":"x"}]}"#;
        let blob: StorageBlob = serde_json::from_str(text).unwrap();
        assert_eq!(blob, StorageBlob::Array(vec![StorageBlob::Primitive(json!("x"))]));
    }
}
