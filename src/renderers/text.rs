//! Plain-text projection
//!
//! Lossy projection used for informational purposes (word counts,
//! previews). Blocks holding inline content terminate with a newline,
//! media leaves become a bracketed placeholder, opaque captures become
//! their type name in brackets. Not expected to round-trip.

use crate::models::node::{AttrValue, Node};
use crate::schema::{NodeContent, RenderRule, Schema};

/// Project a node subtree to plain text
pub fn render_text(schema: &Schema, node: &Node) -> String {
    let mut out = String::new();
    project(schema, node, &mut out);
    out
}

fn project(schema: &Schema, node: &Node, out: &mut String) {
    match node {
        Node::Text { text, .. } => out.push_str(text),
        Node::Opaque { name, .. } => {
            out.push('[');
            out.push_str(name);
            out.push_str("]\n");
        }
        Node::Element {
            name,
            attrs,
            children,
        } => {
            let spec = match schema.node_spec(name) {
                Some(spec) => spec,
                None => {
                    for child in children {
                        project(schema, child, out);
                    }
                    return;
                }
            };
            if let RenderRule::Media(_) = spec.render {
                let label = attrs
                    .get("alt")
                    .or_else(|| attrs.get("src"))
                    .and_then(AttrValue::as_str)
                    .unwrap_or(name);
                out.push('[');
                out.push_str(label);
                out.push(']');
                return;
            }
            for child in children {
                project(schema, child, out);
            }
            // Inline-content blocks and plain leaves end their line;
            // block containers just concatenate already-terminated lines
            match spec.content {
                NodeContent::Inline | NodeContent::Leaf => out.push('\n'),
                NodeContent::Blocks => {}
            }
        }
    }
}
