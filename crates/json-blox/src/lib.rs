//! json-blox: a flattened, collapsible view over a JSON document.
//!
//! The document is flattened into rows (one per visible node) that a
//! virtualized list can render. Rows carry stable segment paths, so the
//! collapse-state, search matches and breadcrumbs all refer to nodes by
//! path. Structural edits return a new document and report how paths moved.
//! Frozen and live snapshots can be shared through a content-addressed store.
//!
//! # Example
//!
//! ```
//! use json_blox::{flatten, CollapseState, NodePath};
//! use serde_json::json;
//!
//! let doc = json!({"a": 1, "b": {"c": 2}});
//! let mut collapsed = CollapseState::collapsed_all(&doc);
//! assert_eq!(flatten(&doc, &collapsed).len(), 3);
//!
//! collapsed.toggle(&NodePath::root().key("b"));
//! let rows = flatten(&doc, &collapsed);
//! let paths: Vec<String> = rows.iter().map(|r| r.path().to_string()).collect();
//! assert_eq!(paths, ["root", "root.a", "root.b", "root.b.c"]);
//! ```

pub mod collapse;
pub mod config;
pub mod confirm;
pub mod editor;
pub mod error;
pub mod flatten;
pub mod launch;
pub mod mutate;
pub mod path;
pub mod search;
pub mod session;
pub mod share;
pub mod store;
pub mod viewport;

pub use collapse::CollapseState;
pub use config::Config;
pub use confirm::{ConfirmGate, Press};
pub use editor::{parse_editor_text, to_editor_text, DiffPair};
pub use error::{ConfigError, Error, ParseError, Result, ShareError, StoreError, ValidationError};
pub use flatten::{flatten, NodeKind, Row};
pub use launch::{share_url, LaunchParams, ViewTab};
pub use mutate::{add_field, delete_node, edit_node, move_node, Direction, Mutation, PathEffect};
pub use path::{NodePath, PathStep};
pub use search::{compute_matches, SearchState};
pub use session::Session;
pub use share::{ShareCodec, ShareRecord, SharedDocuments};
pub use store::{BlobStore, DirStore, MemoryStore};
pub use viewport::{breadcrumbs, Crumb};
