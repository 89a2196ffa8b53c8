//! Renderers for the editing core
//!
//! This module contains serialization logic for converting the document
//! tree into output formats: the markup wire format and a lossy
//! plain-text projection.

pub mod html;
pub mod text;

// Re-export commonly used functions
pub use html::{escape_attr, escape_text, render_html};
pub use text::render_text;
