//! Order-preserving JSON.
//!
//! Objects are kept as explicit `(key, value)` sequences instead of maps so
//! that key order survives any layer that stores maps without an ordering
//! guarantee. The storage wire form repeats that shape:
//!
//! ```text
//! {"type":"primitive","value":42}
//! {"type":"array","value":[<blob>, ...]}
//! {"type":"object","value":[{"key":"a","value":<blob>}, ...]}
//! ```
//!
//! # Example
//!
//! ```
//! use json_blox_ordered::{decode, encode, from_storage, to_storage};
//! use serde_json::json;
//!
//! let doc = json!({"b": 1, "a": [true, null]});
//! let blob = to_storage(&encode(&doc));
//! let back = decode(&from_storage(blob));
//! assert_eq!(back.to_string(), r#"{"b":1,"a":[true,null]}"#);
//! ```

use serde_json::Value;
use thiserror::Error;

pub mod ordered;
pub mod storage;

pub use ordered::OrderedJson;
pub use storage::{StorageBlob, StorageEntry};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderedError {
    #[error("`{tag}` blob must carry an array value")]
    NotASequence { tag: &'static str },
    #[error("object entry at position {0} has no string key")]
    MissingKey(usize),
}

/// Encodes a document into its ordered form.
pub fn encode(value: &Value) -> OrderedJson {
    OrderedJson::encode(value)
}

/// Rebuilds a document from its ordered form, keys in recorded order.
pub fn decode(ordered: &OrderedJson) -> Value {
    ordered.decode()
}

/// Converts the ordered form into the blob written to a store.
pub fn to_storage(ordered: &OrderedJson) -> StorageBlob {
    ordered.to_storage()
}

/// Converts a blob read from a store back into the ordered form.
pub fn from_storage(blob: StorageBlob) -> OrderedJson {
    OrderedJson::from_storage(blob)
}
