//! roxmltree-backed markup parser adapter
//!
//! Default `MarkupParser` implementation for hosts without their own
//! element tree. Input must be well-formed XML (void elements
//! self-closed), which is exactly the dialect the serializer emits.

use super::{MarkupParser, ParseError, ParsedElement, ParsedNode};

/// Markup parser over roxmltree
#[derive(Default)]
pub struct XmlParser;

impl XmlParser {
    pub fn new() -> Self {
        Self
    }
}

impl MarkupParser for XmlParser {
    fn parse(&self, input: &str) -> Result<Vec<ParsedNode>, ParseError> {
        // Wrap in a synthetic root so fragments with multiple top-level
        // elements parse as one document
        let wrapped = format!("<root>{}</root>", input);
        let doc = roxmltree::Document::parse(&wrapped)
            .map_err(|e| ParseError::Malformed(e.to_string()))?;
        Ok(doc
            .root_element()
            .children()
            .filter_map(|child| convert(child, &wrapped))
            .collect())
    }
}

fn convert(node: roxmltree::Node, source: &str) -> Option<ParsedNode> {
    if node.is_text() {
        return node.text().map(|t| ParsedNode::Text(t.to_string()));
    }
    if !node.is_element() {
        return None;
    }
    let tag = node.tag_name().name().to_ascii_lowercase();
    let attrs = node
        .attributes()
        .map(|a| (a.name().to_ascii_lowercase(), a.value().to_string()))
        .collect();
    let children = node
        .children()
        .filter_map(|child| convert(child, source))
        .collect();
    // Verbatim source slice, used for opaque capture
    let raw = source[node.range()].to_string();
    Some(ParsedNode::Element(ParsedElement {
        tag,
        attrs,
        children,
        raw,
    }))
}
