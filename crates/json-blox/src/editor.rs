//! Text editor and diff editor boundary.
//!
//! Both widgets exchange plain text. Documents go out pretty-printed with a
//! two-space indent; text coming back is parsed and a failure is reported
//! without touching the last valid document.

use serde_json::Value;

use crate::error::ParseError;

pub fn to_editor_text(doc: &Value) -> String {
    serde_json::to_string_pretty(doc).unwrap_or_else(|_| doc.to_string())
}

pub fn parse_editor_text(text: &str) -> Result<Value, ParseError> {
    serde_json::from_str(text).map_err(ParseError::from)
}

/// The two panes of the diff view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffPair {
    pub original: String,
    pub modified: String,
}

impl DiffPair {
    /// `frozen` is the original side; without one the live document is
    /// compared against itself.
    pub fn new(frozen: Option<&Value>, live: &Value) -> Self {
        DiffPair {
            original: to_editor_text(frozen.unwrap_or(live)),
            modified: to_editor_text(live),
        }
    }

    pub fn is_identical(&self) -> bool {
        self.original == self.modified
    }
}
