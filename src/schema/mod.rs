//! Schema registry for the editing core
//!
//! The schema is the sole authority on which node and mark types are
//! constructible, which markup tags they parse from, and how each one
//! serializes back to markup. One schema instance is built per editing
//! session and shared by reference with its collaborators.

use std::collections::BTreeMap;

use crate::models::node::{Attrs, Mark, Node};

/// Errors raised by schema construction calls
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("unknown mark type: {0}")]
    UnknownMarkType(String),
}

/// What a node type may contain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeContent {
    /// Text runs and inline leaves (paragraph, heading, code_block)
    Inline,
    /// Block-level children (doc, blockquote, lists)
    Blocks,
    /// Nothing (horizontal_rule, media, opaque captures)
    Leaf,
}

/// Media element kinds sharing one serialize shape
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

/// How a node type renders to markup
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderRule {
    /// Bare concatenation of children (the doc root)
    Children,
    /// `<tag>children</tag>`
    Wrap(String),
    /// `<h{level}>children</h{level}>`, level attr clamped to 1..=6
    Heading,
    /// `<pre><code>text</code></pre>`; text renders raw unless the spec
    /// allows marks
    CodeBlock,
    /// Self-closed void element, e.g. `<hr/>`
    Void(String),
    /// `<img/>` / `<video/>` / `<audio/>` with src/type/controls/alt/title
    Media(MediaKind),
    /// `<ul>`/`<ol>` with an optional start attribute
    List(String),
    /// `<li>`; a sole paragraph child renders tight (no `<p>` wrapper)
    ListItem,
    /// Captured raw markup replayed verbatim
    Opaque,
}

/// How a mark type renders to markup
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkRule {
    /// `<tag>inner</tag>`
    Wrap(String),
    /// `<a href="..." title="...">inner</a>`
    Link,
}

/// Specification of one node type
#[derive(Clone, Debug)]
pub struct NodeSpec {
    pub name: String,
    /// Markup tags that parse to this type
    pub tags: Vec<String>,
    pub render: RenderRule,
    /// Content constraint; drives parsing and is exercised by round-trip
    /// tests, but not enforced as validation
    pub content: NodeContent,
    /// Whether marks render on contained text (false for code_block)
    pub marks_allowed: bool,
}

/// Specification of one mark type
#[derive(Clone, Debug)]
pub struct MarkSpec {
    pub name: String,
    /// Markup tags that parse to this mark
    pub tags: Vec<String>,
    pub render: MarkRule,
}

/// Registry of node and mark types
pub struct Schema {
    nodes: BTreeMap<String, NodeSpec>,
    marks: BTreeMap<String, MarkSpec>,
    // Parse-side lookups, derived at registration time
    tag_to_node: BTreeMap<String, String>,
    tag_to_mark: BTreeMap<String, String>,
}

impl Schema {
    /// Empty schema with no registered types
    pub fn empty() -> Self {
        Self {
            nodes: BTreeMap::new(),
            marks: BTreeMap::new(),
            tag_to_node: BTreeMap::new(),
            tag_to_mark: BTreeMap::new(),
        }
    }

    /// Register a node type, indexing its parse tags
    pub fn register_node(&mut self, spec: NodeSpec) {
        for tag in &spec.tags {
            self.tag_to_node.insert(tag.clone(), spec.name.clone());
        }
        self.nodes.insert(spec.name.clone(), spec);
    }

    /// Register a mark type, indexing its parse tags
    pub fn register_mark(&mut self, spec: MarkSpec) {
        for tag in &spec.tags {
            self.tag_to_mark.insert(tag.clone(), spec.name.clone());
        }
        self.marks.insert(spec.name.clone(), spec);
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn has_mark(&self, name: &str) -> bool {
        self.marks.contains_key(name)
    }

    pub fn node_spec(&self, name: &str) -> Option<&NodeSpec> {
        self.nodes.get(name)
    }

    pub fn mark_spec(&self, name: &str) -> Option<&MarkSpec> {
        self.marks.get(name)
    }

    /// Node type registered for a markup tag, if any
    pub fn node_for_tag(&self, tag: &str) -> Option<&NodeSpec> {
        self.tag_to_node.get(tag).and_then(|name| self.nodes.get(name))
    }

    /// Mark type registered for a markup tag, if any
    pub fn mark_for_tag(&self, tag: &str) -> Option<&MarkSpec> {
        self.tag_to_mark.get(tag).and_then(|name| self.marks.get(name))
    }

    /// Construct a node of a registered type
    ///
    /// Opaque types draw their captured markup from the `markup` attr;
    /// everything else becomes an element with the given children.
    pub fn node(
        &self,
        name: &str,
        attrs: Attrs,
        children: Vec<Node>,
    ) -> Result<Node, SchemaError> {
        let spec = self
            .nodes
            .get(name)
            .ok_or_else(|| SchemaError::UnknownNodeType(name.to_string()))?;
        if spec.render == RenderRule::Opaque {
            let markup = attrs
                .get("markup")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            return Ok(Node::Opaque {
                name: spec.name.clone(),
                markup,
            });
        }
        Ok(Node::Element {
            name: spec.name.clone(),
            attrs,
            children,
        })
    }

    /// Construct a text node; always succeeds
    pub fn text(&self, text: impl Into<String>, marks: Vec<Mark>) -> Node {
        Node::text(text, marks)
    }

    /// Construct a mark of a registered type
    pub fn mark(&self, name: &str, attrs: Attrs) -> Result<Mark, SchemaError> {
        if !self.marks.contains_key(name) {
            return Err(SchemaError::UnknownMarkType(name.to_string()));
        }
        Ok(Mark {
            name: name.to_string(),
            attrs,
        })
    }
}

impl Default for Schema {
    /// The standard document vocabulary
    fn default() -> Self {
        let mut schema = Schema::empty();

        schema.register_node(NodeSpec {
            name: "doc".into(),
            tags: vec![],
            render: RenderRule::Children,
            content: NodeContent::Blocks,
            marks_allowed: false,
        });
        schema.register_node(NodeSpec {
            name: "paragraph".into(),
            tags: vec!["p".into()],
            render: RenderRule::Wrap("p".into()),
            content: NodeContent::Inline,
            marks_allowed: true,
        });
        schema.register_node(NodeSpec {
            name: "heading".into(),
            tags: vec![
                "h1".into(),
                "h2".into(),
                "h3".into(),
                "h4".into(),
                "h5".into(),
                "h6".into(),
            ],
            render: RenderRule::Heading,
            content: NodeContent::Inline,
            marks_allowed: true,
        });
        schema.register_node(NodeSpec {
            name: "blockquote".into(),
            tags: vec!["blockquote".into()],
            render: RenderRule::Wrap("blockquote".into()),
            content: NodeContent::Blocks,
            marks_allowed: true,
        });
        schema.register_node(NodeSpec {
            name: "code_block".into(),
            tags: vec!["pre".into()],
            render: RenderRule::CodeBlock,
            content: NodeContent::Inline,
            marks_allowed: false,
        });
        schema.register_node(NodeSpec {
            name: "horizontal_rule".into(),
            tags: vec!["hr".into()],
            render: RenderRule::Void("hr".into()),
            content: NodeContent::Leaf,
            marks_allowed: false,
        });
        schema.register_node(NodeSpec {
            name: "bullet_list".into(),
            tags: vec!["ul".into()],
            render: RenderRule::List("ul".into()),
            content: NodeContent::Blocks,
            marks_allowed: false,
        });
        schema.register_node(NodeSpec {
            name: "ordered_list".into(),
            tags: vec!["ol".into()],
            render: RenderRule::List("ol".into()),
            content: NodeContent::Blocks,
            marks_allowed: false,
        });
        schema.register_node(NodeSpec {
            name: "list_item".into(),
            tags: vec!["li".into()],
            render: RenderRule::ListItem,
            content: NodeContent::Blocks,
            marks_allowed: false,
        });
        schema.register_node(NodeSpec {
            name: "image".into(),
            tags: vec!["img".into()],
            render: RenderRule::Media(MediaKind::Image),
            content: NodeContent::Leaf,
            marks_allowed: false,
        });
        schema.register_node(NodeSpec {
            name: "video".into(),
            tags: vec!["video".into()],
            render: RenderRule::Media(MediaKind::Video),
            content: NodeContent::Leaf,
            marks_allowed: false,
        });
        schema.register_node(NodeSpec {
            name: "audio".into(),
            tags: vec!["audio".into()],
            render: RenderRule::Media(MediaKind::Audio),
            content: NodeContent::Leaf,
            marks_allowed: false,
        });
        // Tables are captured whole as raw markup, not decomposed
        schema.register_node(NodeSpec {
            name: "table".into(),
            tags: vec!["table".into()],
            render: RenderRule::Opaque,
            content: NodeContent::Leaf,
            marks_allowed: false,
        });

        schema.register_mark(MarkSpec {
            name: "bold".into(),
            tags: vec!["strong".into(), "b".into()],
            render: MarkRule::Wrap("strong".into()),
        });
        schema.register_mark(MarkSpec {
            name: "italic".into(),
            tags: vec!["em".into(), "i".into()],
            render: MarkRule::Wrap("em".into()),
        });
        schema.register_mark(MarkSpec {
            name: "underline".into(),
            tags: vec!["u".into()],
            render: MarkRule::Wrap("u".into()),
        });
        schema.register_mark(MarkSpec {
            name: "strike".into(),
            tags: vec!["s".into(), "strike".into()],
            render: MarkRule::Wrap("s".into()),
        });
        schema.register_mark(MarkSpec {
            name: "code".into(),
            tags: vec!["code".into()],
            render: MarkRule::Wrap("code".into()),
        });
        schema.register_mark(MarkSpec {
            name: "link".into(),
            tags: vec!["a".into()],
            render: MarkRule::Link,
        });

        schema
    }
}
