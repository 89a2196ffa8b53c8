//! Markup parsing for the editing core
//!
//! The parse algorithm is written against a minimal read-only element
//! view (`ParsedNode`/`ParsedElement`) supplied by a host adapter, never
//! against a concrete platform parser. Block tags map to node types per
//! the schema's tag registry; unrecognized tags degrade to a paragraph
//! wrapping their inline content, and table-internal tags are dropped
//! because the table itself is captured whole as opaque markup.

pub mod xml;

use crate::models::node::{AttrValue, Attrs, Mark, Node};
use crate::schema::{MediaKind, NodeContent, NodeSpec, RenderRule, Schema};

/// Tags that live inside a `<table>`; the table's own rule captures the
/// whole subtree verbatim, so these parse to no node at all.
const TABLE_INTERNAL_TAGS: [&str; 9] = [
    "thead", "tbody", "tfoot", "tr", "td", "th", "caption", "colgroup", "col",
];

/// Error raised by a markup parser adapter
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("malformed markup: {0}")]
    Malformed(String),
}

/// One node in the host-parsed element tree
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedNode {
    Element(ParsedElement),
    Text(String),
}

/// Read-only generic view of one parsed markup element
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedElement {
    /// Lowercased tag name
    pub tag: String,
    /// Attribute name/value pairs in source order
    pub attrs: Vec<(String, String)>,
    /// Ordered child nodes
    pub children: Vec<ParsedNode>,
    /// Verbatim source slice of this element (for opaque capture)
    pub raw: String,
}

impl ParsedElement {
    /// Attribute lookup by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated text content of this element's subtree
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// First child element with the given tag
    pub fn child(&self, tag: &str) -> Option<&ParsedElement> {
        self.children.iter().find_map(|c| match c {
            ParsedNode::Element(el) if el.tag == tag => Some(el),
            _ => None,
        })
    }
}

fn collect_text(nodes: &[ParsedNode], out: &mut String) {
    for node in nodes {
        match node {
            ParsedNode::Text(t) => out.push_str(t),
            ParsedNode::Element(el) => collect_text(&el.children, out),
        }
    }
}

/// Host-supplied markup parsing capability
pub trait MarkupParser {
    /// Parse markup text into the generic element view
    fn parse(&self, input: &str) -> Result<Vec<ParsedNode>, ParseError>;
}

/// Parse a sequence of top-level nodes into block-level document nodes
///
/// Stray non-whitespace text becomes a paragraph; whitespace between
/// blocks is dropped.
pub fn parse_blocks(schema: &Schema, nodes: &[ParsedNode]) -> Vec<Node> {
    let mut out = Vec::new();
    for node in nodes {
        match node {
            ParsedNode::Text(t) => {
                let trimmed = t.trim();
                if !trimmed.is_empty() {
                    out.push(paragraph(schema, vec![Node::text(trimmed, vec![])]));
                }
            }
            ParsedNode::Element(el) => {
                if let Some(block) = parse_block(schema, el) {
                    out.push(block);
                }
            }
        }
    }
    out
}

/// Parse one element in block position
///
/// Returns `None` for tags that are intentionally dropped.
fn parse_block(schema: &Schema, el: &ParsedElement) -> Option<Node> {
    if let Some(spec) = schema.node_for_tag(&el.tag) {
        return build_node(schema, spec, el);
    }
    if TABLE_INTERNAL_TAGS.contains(&el.tag.as_str()) {
        log::debug!("dropping table-internal tag <{}>", el.tag);
        return None;
    }
    // Unrecognized block tag: degrade to a paragraph around whatever
    // inline content we can salvage. Never fatal.
    let mut inline = Vec::new();
    if schema.mark_for_tag(&el.tag).is_some() {
        // The tag itself is a known inline mark (e.g. a stray <code>)
        parse_inline_element(schema, el, &[], &mut inline);
    } else {
        parse_inline(schema, &el.children, &[], &mut inline);
    }
    Some(paragraph(schema, inline))
}

fn build_node(schema: &Schema, spec: &NodeSpec, el: &ParsedElement) -> Option<Node> {
    let node = match &spec.render {
        RenderRule::Opaque => Node::Opaque {
            name: spec.name.clone(),
            markup: el.raw.clone(),
        },
        RenderRule::Heading => {
            let level = el
                .tag
                .strip_prefix('h')
                .and_then(|d| d.parse::<i64>().ok())
                .unwrap_or(1)
                .clamp(1, 6);
            let mut attrs = Attrs::new();
            attrs.insert("level".into(), AttrValue::Int(level));
            let mut inline = Vec::new();
            parse_inline(schema, &el.children, &[], &mut inline);
            Node::Element {
                name: spec.name.clone(),
                attrs,
                children: inline,
            }
        }
        RenderRule::CodeBlock => {
            // <pre><code>...</code></pre>; a bare <pre> keeps its own text
            let text = match el.child("code") {
                Some(code) => code.text(),
                None => el.text(),
            };
            let children = if text.is_empty() {
                vec![]
            } else {
                vec![Node::text(text, vec![])]
            };
            Node::Element {
                name: spec.name.clone(),
                attrs: Attrs::new(),
                children,
            }
        }
        RenderRule::Void(_) => Node::Element {
            name: spec.name.clone(),
            attrs: Attrs::new(),
            children: vec![],
        },
        RenderRule::Media(kind) => build_media(spec, *kind, el),
        RenderRule::List(_) => {
            let mut attrs = Attrs::new();
            if spec.name == "ordered_list" {
                if let Some(start) = el.attr("start").and_then(|s| s.parse::<i64>().ok()) {
                    attrs.insert("start".into(), AttrValue::Int(start));
                }
            }
            let mut items = Vec::new();
            for child in &el.children {
                match child {
                    ParsedNode::Element(li) if li.tag == "li" => {
                        items.push(parse_list_item(schema, li));
                    }
                    ParsedNode::Text(t) if t.trim().is_empty() => {}
                    other => {
                        log::debug!("dropping non-item list child: {:?}", other);
                    }
                }
            }
            Node::Element {
                name: spec.name.clone(),
                attrs,
                children: items,
            }
        }
        RenderRule::ListItem => parse_list_item(schema, el),
        RenderRule::Children | RenderRule::Wrap(_) => {
            let children = match spec.content {
                NodeContent::Blocks => parse_blocks(schema, &el.children),
                NodeContent::Inline => {
                    let mut inline = Vec::new();
                    parse_inline(schema, &el.children, &[], &mut inline);
                    inline
                }
                NodeContent::Leaf => vec![],
            };
            Node::Element {
                name: spec.name.clone(),
                attrs: Attrs::new(),
                children,
            }
        }
    };
    Some(node)
}

/// Parse an `<li>`: element children that map to block tags parse as
/// blocks; bare inline content is wrapped in a single paragraph.
fn parse_list_item(schema: &Schema, el: &ParsedElement) -> Node {
    let has_block_child = el.children.iter().any(|c| match c {
        ParsedNode::Element(child) => schema.node_for_tag(&child.tag).is_some(),
        ParsedNode::Text(_) => false,
    });
    let children = if has_block_child {
        parse_blocks(schema, &el.children)
    } else {
        let mut inline = Vec::new();
        parse_inline(schema, &el.children, &[], &mut inline);
        vec![paragraph(schema, inline)]
    };
    Node::Element {
        name: "list_item".into(),
        attrs: Attrs::new(),
        children,
    }
}

fn build_media(spec: &NodeSpec, kind: MediaKind, el: &ParsedElement) -> Node {
    let mut attrs = Attrs::new();
    // src/type may come from the element or from a nested <source>
    let source = el.child("source");
    let src = el.attr("src").or_else(|| source.and_then(|s| s.attr("src")));
    if let Some(src) = src {
        attrs.insert("src".into(), src.into());
    }
    match kind {
        MediaKind::Image => {
            if let Some(alt) = el.attr("alt") {
                attrs.insert("alt".into(), alt.into());
            }
            if let Some(title) = el.attr("title") {
                attrs.insert("title".into(), title.into());
            }
        }
        MediaKind::Video | MediaKind::Audio => {
            let kind_attr = el
                .attr("type")
                .or_else(|| source.and_then(|s| s.attr("type")));
            if let Some(t) = kind_attr {
                attrs.insert("type".into(), t.into());
            }
            if el.attr("controls").is_some() {
                attrs.insert("controls".into(), AttrValue::Bool(true));
            }
        }
    }
    Node::Element {
        name: spec.name.clone(),
        attrs,
        children: vec![],
    }
}

/// Walk inline content accumulating the ordered mark list
///
/// Marks accumulate outermost-first; every text run inherits the full
/// list in accumulation order. An inline image terminates the current
/// run and emits a standalone image node.
pub fn parse_inline(schema: &Schema, nodes: &[ParsedNode], marks: &[Mark], out: &mut Vec<Node>) {
    for node in nodes {
        match node {
            ParsedNode::Text(t) => {
                if !t.is_empty() {
                    out.push(Node::text(t.clone(), marks.to_vec()));
                }
            }
            ParsedNode::Element(el) => parse_inline_element(schema, el, marks, out),
        }
    }
}

fn parse_inline_element(
    schema: &Schema,
    el: &ParsedElement,
    marks: &[Mark],
    out: &mut Vec<Node>,
) {
    if let Some(spec) = schema.mark_for_tag(&el.tag) {
        let mut attrs = Attrs::new();
        if spec.name == "link" {
            if let Some(href) = el.attr("href") {
                attrs.insert("href".into(), href.into());
            }
            if let Some(title) = el.attr("title") {
                attrs.insert("title".into(), title.into());
            }
        }
        let mut accumulated = marks.to_vec();
        accumulated.push(Mark {
            name: spec.name.clone(),
            attrs,
        });
        parse_inline(schema, &el.children, &accumulated, out);
        return;
    }
    if el.tag == "br" {
        out.push(Node::text("\n", marks.to_vec()));
        return;
    }
    if let Some(spec) = schema.node_for_tag(&el.tag) {
        if let RenderRule::Media(kind) = &spec.render {
            // A media leaf in inline position stands alone, no marks
            out.push(build_media(spec, *kind, el));
            return;
        }
    }
    // Unknown inline wrapper (span etc): transparent
    parse_inline(schema, &el.children, marks, out);
}

fn paragraph(schema: &Schema, children: Vec<Node>) -> Node {
    // paragraph is always registered in schemas this parser runs against;
    // fall back to a bare element if a host schema removed it
    schema
        .node("paragraph", Attrs::new(), children.clone())
        .unwrap_or(Node::Element {
            name: "paragraph".into(),
            attrs: Attrs::new(),
            children,
        })
}
