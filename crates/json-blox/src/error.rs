//! Error taxonomy.
//!
//! Every variant leaves the session in a consistent state: validation and
//! parse failures keep the last valid document, share failures are reported
//! and left for the user to retry.

use thiserror::Error;

pub const VALUE_FORMAT_GUIDANCE: &str = "Value must be either:\n\
• A number\n\
• A quoted string (e.g. \"hello\")\n\
• A valid JSON object (e.g. {\"key\": \"value\"})\n\
• A valid array (e.g. [1, 2, 3])\n\
• true or false\n\
• null";

/// Bad input to an in-place edit. The document is left unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Key cannot be empty")]
    EmptyKey,
    #[error("Invalid array format")]
    InvalidArray,
    #[error("Invalid object format")]
    InvalidObject,
    #[error("{}", VALUE_FORMAT_GUIDANCE)]
    UnrecognizedValue,
    #[error("Key `{0}` already exists")]
    DuplicateKey(String),
    #[error("Array elements keep their index `{0}`")]
    ArrayIndexKey(usize),
}

/// Editor text that is not valid JSON.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("JSON Error: {message} at line {line} column {column}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        // serde_json appends " at line L column C" to Display; keep the bare reason.
        let full = err.to_string();
        let message = match full.rfind(" at line ") {
            Some(pos) => full[..pos].to_string(),
            None => full,
        };
        ParseError { message, line: err.line(), column: err.column() }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid share id `{0}`")]
    InvalidId(String),
}

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("Failed to load the shared JSON or it has expired ({id})")]
    NotFoundOrExpired { id: String },
    #[error("share store unavailable: {0}")]
    Persistence(#[from] StoreError),
    #[error("shared record {id} is unreadable: {reason}")]
    Corrupt { id: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config {path}: {reason}")]
    Invalid { path: String, reason: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Share(#[from] ShareError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no node at `{0}`")]
    UnknownPath(String),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_keeps_position() {
        let err = serde_json::from_str::<serde_json::Value>("{\n  \"a\": }").unwrap_err();
        let parsed = ParseError::from(err);
        assert_eq!(parsed.line, 2);
        assert!(parsed.column > 0);
        assert!(!parsed.message.contains("at line"));
    }

    #[test]
    fn validation_messages() {
        assert_eq!(ValidationError::EmptyKey.to_string(), "Key cannot be empty");
        assert_eq!(ValidationError::InvalidArray.to_string(), "Invalid array format");
        let unrecognized = ValidationError::UnrecognizedValue.to_string();
        assert!(unrecognized.starts_with("Value must be either:"));
    }

    #[test]
    fn not_found_is_distinct_from_persistence() {
        let missing = ShareError::NotFoundOrExpired { id: "ab".into() };
        assert!(missing.to_string().contains("expired"));
        let io = ShareError::from(StoreError::InvalidId("x".into()));
        assert!(io.to_string().starts_with("share store unavailable"));
    }
}
