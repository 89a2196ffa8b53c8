//! Data models for the editing core
//!
//! This module contains the document tree (nodes and marks) and the
//! selection value type. Everything here is plain data: construction is
//! mediated by the `Schema`, mutation happens by wholesale replacement.

pub mod node;
pub mod selection;

// Re-export commonly used types
pub use node::{AttrValue, Attrs, Mark, Node, TreeError};
pub use selection::Selection;
