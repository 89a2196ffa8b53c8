//! Document tree nodes and inline marks
//!
//! A document is a tree of `Node` values. Containers hold ordered
//! children, text leaves hold a string plus an ordered mark list, and
//! opaque nodes carry captured raw markup that round-trips verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::schema::{Schema, SchemaError};

/// Attribute map carried by element nodes and marks
pub type Attrs = BTreeMap<String, AttrValue>;

/// Scalar attribute value
///
/// Untagged so the portable tree reads naturally
/// (`{"level": 2, "href": "..."}`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Int(n)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

/// An inline formatting annotation attached to a text node
///
/// Mark order on a text node is semantically meaningful: it is the
/// nesting order of the serialized markup, outermost first.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Mark {
    /// Mark type name as registered in the schema (e.g. "bold", "link")
    #[serde(rename = "type")]
    pub name: String,

    /// Optional attributes (e.g. href/title on a link)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: Attrs,
}

impl Mark {
    /// Create a mark without attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attrs::new(),
        }
    }
}

/// A typed tree element
///
/// Closed union: every node is a container element, a text leaf, or an
/// opaque raw-markup capture. There is no open-ended dynamic shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Container (or childless leaf element like horizontal_rule/image)
    Element {
        /// Node type name as registered in the schema
        name: String,
        attrs: Attrs,
        children: Vec<Node>,
    },
    /// Text leaf with its ordered mark list
    Text { text: String, marks: Vec<Mark> },
    /// Escape hatch: captured raw markup, replayed byte-for-byte
    Opaque { name: String, markup: String },
}

/// Error raised while decoding a portable tree value
#[derive(Debug, Clone, thiserror::Error)]
pub enum TreeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The value does not have the expected node/mark shape
    #[error("malformed tree value: {0}")]
    Malformed(String),
}

impl Node {
    /// Create a text node
    pub fn text(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Node::Text {
            text: text.into(),
            marks,
        }
    }

    /// Node type name ("text" for text leaves)
    pub fn name(&self) -> &str {
        match self {
            Node::Element { name, .. } | Node::Opaque { name, .. } => name,
            Node::Text { .. } => "text",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text { .. })
    }

    /// Ordered children (empty for text and opaque nodes)
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element { children, .. } => children,
            _ => &[],
        }
    }

    /// Attribute lookup (element nodes only)
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        match self {
            Node::Element { attrs, .. } => attrs.get(name),
            _ => None,
        }
    }

    /// Size of this node in the canonical linear addressing scheme
    ///
    /// A text node counts its characters; any other node counts 2
    /// (open + close) plus the sum of its children. This metric is the
    /// single source of truth for offset math across the core.
    pub fn size(&self) -> usize {
        match self {
            Node::Text { text, .. } => text.chars().count(),
            Node::Element { children, .. } => {
                2 + children.iter().map(Node::size).sum::<usize>()
            }
            Node::Opaque { .. } => 2,
        }
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        match self {
            Node::Text { text, .. } => text.clone(),
            Node::Element { children, .. } => {
                children.iter().map(Node::text_content).collect()
            }
            Node::Opaque { .. } => String::new(),
        }
    }

    /// Encode as a portable tree value
    pub fn to_value(&self) -> Value {
        match self {
            Node::Text { text, marks } => {
                let mut obj = Map::new();
                obj.insert("type".into(), json!("text"));
                obj.insert("text".into(), json!(text));
                if !marks.is_empty() {
                    let marks: Vec<Value> = marks.iter().map(mark_to_value).collect();
                    obj.insert("marks".into(), Value::Array(marks));
                }
                Value::Object(obj)
            }
            Node::Element {
                name,
                attrs,
                children,
            } => {
                let mut obj = Map::new();
                obj.insert("type".into(), json!(name));
                if !attrs.is_empty() {
                    obj.insert("attrs".into(), attrs_to_value(attrs));
                }
                if !children.is_empty() {
                    let content: Vec<Value> = children.iter().map(Node::to_value).collect();
                    obj.insert("content".into(), Value::Array(content));
                }
                Value::Object(obj)
            }
            Node::Opaque { name, markup } => {
                let mut obj = Map::new();
                obj.insert("type".into(), json!(name));
                obj.insert("attrs".into(), json!({ "markup": markup }));
                Value::Object(obj)
            }
        }
    }

    /// Decode a portable tree value, validating every node and mark type
    /// against the schema
    pub fn from_value(schema: &Schema, value: &Value) -> Result<Node, TreeError> {
        let obj = value
            .as_object()
            .ok_or_else(|| TreeError::Malformed("node must be an object".into()))?;
        let name = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| TreeError::Malformed("node is missing \"type\"".into()))?;

        if name == "text" {
            let text = obj.get("text").and_then(Value::as_str).unwrap_or_default();
            let marks = match obj.get("marks") {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|m| mark_from_value(schema, m))
                    .collect::<Result<Vec<_>, _>>()?,
                Some(_) => {
                    return Err(TreeError::Malformed("\"marks\" must be an array".into()))
                }
                None => Vec::new(),
            };
            return Ok(Node::Text {
                text: text.to_string(),
                marks,
            });
        }

        let attrs = match obj.get("attrs") {
            Some(v) => attrs_from_value(v)?,
            None => Attrs::new(),
        };
        let children = match obj.get("content") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|c| Node::from_value(schema, c))
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(TreeError::Malformed("\"content\" must be an array".into())),
            None => Vec::new(),
        };

        // Schema::node rejects unknown types and routes opaque types to
        // their raw-markup representation.
        Ok(schema.node(name, attrs, children)?)
    }
}

fn mark_to_value(mark: &Mark) -> Value {
    let mut obj = Map::new();
    obj.insert("type".into(), json!(mark.name));
    if !mark.attrs.is_empty() {
        obj.insert("attrs".into(), attrs_to_value(&mark.attrs));
    }
    Value::Object(obj)
}

fn mark_from_value(schema: &Schema, value: &Value) -> Result<Mark, TreeError> {
    let obj = value
        .as_object()
        .ok_or_else(|| TreeError::Malformed("mark must be an object".into()))?;
    let name = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| TreeError::Malformed("mark is missing \"type\"".into()))?;
    let attrs = match obj.get("attrs") {
        Some(v) => attrs_from_value(v)?,
        None => Attrs::new(),
    };
    Ok(schema.mark(name, attrs)?)
}

fn attrs_to_value(attrs: &Attrs) -> Value {
    let mut obj = Map::new();
    for (key, value) in attrs {
        let v = match value {
            AttrValue::Str(s) => json!(s),
            AttrValue::Int(n) => json!(n),
            AttrValue::Bool(b) => json!(b),
        };
        obj.insert(key.clone(), v);
    }
    Value::Object(obj)
}

fn attrs_from_value(value: &Value) -> Result<Attrs, TreeError> {
    let obj = value
        .as_object()
        .ok_or_else(|| TreeError::Malformed("\"attrs\" must be an object".into()))?;
    let mut attrs = Attrs::new();
    for (key, v) in obj {
        let parsed = match v {
            Value::Bool(b) => AttrValue::Bool(*b),
            Value::Number(n) => AttrValue::Int(n.as_i64().ok_or_else(|| {
                TreeError::Malformed(format!("attr \"{}\" is not an integer", key))
            })?),
            Value::String(s) => AttrValue::Str(s.clone()),
            _ => {
                return Err(TreeError::Malformed(format!(
                    "attr \"{}\" must be a scalar",
                    key
                )))
            }
        };
        attrs.insert(key.clone(), parsed);
    }
    Ok(attrs)
}
