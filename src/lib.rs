//! Rich Document Editing Core
//!
//! This is the schema-constrained editing core: a typed node/mark tree,
//! markup round-tripping, transactional document replacement, and a
//! snapshot-based undo/redo history with debounced capture.
//!
//! Rendering, input capture, and command construction live in the host;
//! the host feeds markup in through a `MarkupParser` adapter and pulls
//! markup/JSON back out after every dispatch.

pub mod models;
pub mod schema;
pub mod parse;
pub mod renderers;
pub mod document;
pub mod history;
pub mod editor;

// Re-export commonly used types
pub use models::node::{AttrValue, Attrs, Mark, Node, TreeError};
pub use models::selection::Selection;
pub use schema::{MarkSpec, NodeSpec, Schema, SchemaError};
pub use parse::xml::XmlParser;
pub use parse::{MarkupParser, ParseError, ParsedElement, ParsedNode};
pub use document::Document;
pub use history::{History, Snapshot};
pub use editor::{Editor, EditorError, Transaction};
