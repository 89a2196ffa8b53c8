//! Document: an owned tree plus its schema handle
//!
//! A document owns a single root node of type "doc" and a shared
//! reference to the schema it was built against. Documents are never
//! edited in place: every mutation arrives as a wholesale replacement
//! through dispatch.

use std::sync::Arc;

use serde_json::Value;

use crate::models::node::{Attrs, Node, TreeError};
use crate::parse::{parse_blocks, MarkupParser, ParseError};
use crate::renderers::{render_html, render_text};
use crate::schema::Schema;

/// Error raised when resolving a linear offset against the tree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OffsetError {
    #[error("offset {offset} out of range for document of size {size}")]
    OutOfRange { offset: usize, size: usize },
}

/// A linear offset resolved to a tree location
///
/// `path` is the chain of child indexes from the root down to the node
/// containing the position; `offset` is local to that node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPos {
    pub path: Vec<usize>,
    pub offset: usize,
}

/// The document tree
#[derive(Clone)]
pub struct Document {
    root: Node,
    schema: Arc<Schema>,
}

impl Document {
    /// Default document: a doc holding one empty paragraph (size 4)
    pub fn new(schema: Arc<Schema>) -> Self {
        let paragraph = Node::Element {
            name: "paragraph".into(),
            attrs: Attrs::new(),
            children: vec![],
        };
        Self {
            root: doc_root(vec![paragraph]),
            schema,
        }
    }

    /// Build from markup text via the host's parser adapter
    pub fn from_markup(
        schema: Arc<Schema>,
        parser: &dyn MarkupParser,
        input: &str,
    ) -> Result<Self, ParseError> {
        let parsed = parser.parse(input)?;
        let mut blocks = parse_blocks(&schema, &parsed);
        if blocks.is_empty() {
            blocks.push(Node::Element {
                name: "paragraph".into(),
                attrs: Attrs::new(),
                children: vec![],
            });
        }
        Ok(Self {
            root: doc_root(blocks),
            schema,
        })
    }

    /// Build from an explicit tree; a non-"doc" root is wrapped
    pub fn from_root(schema: Arc<Schema>, root: Node) -> Self {
        let root = if root.name() == "doc" {
            root
        } else {
            doc_root(vec![root])
        };
        Self { root, schema }
    }

    /// Decode a portable tree value, validating against the schema
    pub fn from_value(schema: Arc<Schema>, value: &Value) -> Result<Self, TreeError> {
        let root = Node::from_value(&schema, value)?;
        Ok(Self::from_root(schema, root))
    }

    /// Encode the tree as a portable value
    pub fn to_value(&self) -> Value {
        self.root.to_value()
    }

    /// Serialize to markup
    pub fn to_html(&self) -> String {
        render_html(&self.schema, &self.root)
    }

    /// Lossy plain-text projection
    pub fn to_text(&self) -> String {
        render_text(&self.schema, &self.root)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Document size in the canonical linear addressing scheme
    pub fn size(&self) -> usize {
        self.root.size()
    }

    /// Clamp an offset into the valid range `0..=size()`
    pub fn clamp_offset(&self, offset: usize) -> usize {
        offset.min(self.size())
    }

    /// Resolve a linear offset to a tree location
    ///
    /// Walks the size metric: a container spends one position on its
    /// open token, its children's sizes in order, and one position on
    /// its close token.
    pub fn resolve_offset(&self, offset: usize) -> Result<ResolvedPos, OffsetError> {
        let size = self.size();
        if offset > size {
            return Err(OffsetError::OutOfRange { offset, size });
        }
        let mut path = Vec::new();
        let mut node = &self.root;
        let mut local = offset;
        loop {
            match node {
                Node::Text { .. } | Node::Opaque { .. } => {
                    return Ok(ResolvedPos {
                        path,
                        offset: local,
                    })
                }
                Node::Element { children, .. } => {
                    if local == 0 || local >= node.size() {
                        // At the open or close token of this container
                        return Ok(ResolvedPos {
                            path,
                            offset: local,
                        });
                    }
                    let mut rem = local - 1;
                    let mut descended = false;
                    for (i, child) in children.iter().enumerate() {
                        if rem < child.size() {
                            path.push(i);
                            node = child;
                            local = rem;
                            descended = true;
                            break;
                        }
                        rem -= child.size();
                    }
                    if !descended {
                        // Between the last child and the close token
                        return Ok(ResolvedPos {
                            path,
                            offset: local,
                        });
                    }
                }
            }
        }
    }
}

fn doc_root(children: Vec<Node>) -> Node {
    Node::Element {
        name: "doc".into(),
        attrs: Attrs::new(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::xml::XmlParser;

    fn schema() -> Arc<Schema> {
        Arc::new(Schema::default())
    }

    #[test]
    fn test_default_document_is_empty_paragraph() {
        let doc = Document::new(schema());
        assert_eq!(doc.root().name(), "doc");
        assert_eq!(doc.size(), 4);
        assert_eq!(doc.to_html(), "<p></p>");
    }

    #[test]
    fn test_from_markup_builds_doc_root() {
        let doc = Document::from_markup(schema(), &XmlParser::new(), "<p>Hello</p>").unwrap();
        assert_eq!(doc.root().name(), "doc");
        assert_eq!(doc.size(), 2 + 2 + 5);
        assert_eq!(doc.to_html(), "<p>Hello</p>");
    }

    #[test]
    fn test_empty_markup_yields_default_paragraph() {
        let doc = Document::from_markup(schema(), &XmlParser::new(), "").unwrap();
        assert_eq!(doc.to_html(), "<p></p>");
    }

    #[test]
    fn test_from_root_wraps_non_doc_root() {
        let s = schema();
        let para = s
            .node("paragraph", Attrs::new(), vec![Node::text("x", vec![])])
            .unwrap();
        let doc = Document::from_root(s, para);
        assert_eq!(doc.root().name(), "doc");
        assert_eq!(doc.to_html(), "<p>x</p>");
    }

    #[test]
    fn test_value_round_trip_is_lossless() {
        let doc = Document::from_markup(
            schema(),
            &XmlParser::new(),
            "<h2>Title</h2><p><strong>bold</strong> plain</p>",
        )
        .unwrap();
        let value = doc.to_value();
        let rebuilt = Document::from_value(schema(), &value).unwrap();
        assert_eq!(rebuilt.to_value(), value);
        assert_eq!(rebuilt.to_html(), doc.to_html());
    }

    #[test]
    fn test_to_text_projection() {
        let doc = Document::from_markup(
            schema(),
            &XmlParser::new(),
            r#"<h1>Title</h1><p>Body <img src="a.png" alt="pic"/></p>"#,
        )
        .unwrap();
        assert_eq!(doc.to_text(), "Title\nBody [pic]\n");
    }

    #[test]
    fn test_clamp_offset() {
        let doc = Document::new(schema());
        assert_eq!(doc.clamp_offset(0), 0);
        assert_eq!(doc.clamp_offset(4), 4);
        assert_eq!(doc.clamp_offset(99), 4);
    }

    #[test]
    fn test_resolve_offset_descends_to_text() {
        let doc = Document::from_markup(schema(), &XmlParser::new(), "<p>Hello</p>").unwrap();
        // doc open (1) + p open (1) + 2 chars in = offset 4
        let pos = doc.resolve_offset(4).unwrap();
        assert_eq!(pos.path, vec![0, 0]);
        assert_eq!(pos.offset, 2);
    }

    #[test]
    fn test_resolve_offset_out_of_range() {
        let doc = Document::new(schema());
        assert_eq!(
            doc.resolve_offset(5),
            Err(OffsetError::OutOfRange { offset: 5, size: 4 })
        );
    }

    #[test]
    fn test_resolve_offset_boundaries() {
        let doc = Document::from_markup(schema(), &XmlParser::new(), "<p>Hi</p>").unwrap();
        assert_eq!(doc.resolve_offset(0).unwrap().path, Vec::<usize>::new());
        let end = doc.size();
        assert_eq!(doc.resolve_offset(end).unwrap().path, Vec::<usize>::new());
    }
}
