//! Cursor and range selection value type
//!
//! Pure value type over the canonical linear offset scheme defined by
//! `Node::size`. A selection never mutates; every change produces a new
//! value. Pairing a selection with a document (and keeping it within
//! `0..=document.size()`) is the owning session's responsibility.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// An anchor/head offset pair denoting a cursor or range
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    /// The fixed end of the selection
    pub anchor: usize,
    /// The moving end (equals anchor for a plain cursor)
    pub head: usize,
}

// Hand-written so an absent head collapses to a cursor at the anchor,
// matching `Selection::from_value`
impl<'de> Deserialize<'de> for Selection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Fields {
            anchor: usize,
            #[serde(default)]
            head: Option<usize>,
        }
        let fields = Fields::deserialize(deserializer)?;
        Ok(Self {
            anchor: fields.anchor,
            head: fields.head.unwrap_or(fields.anchor),
        })
    }
}

impl Selection {
    /// Collapsed cursor at a single position
    pub fn cursor(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// Range from `from` to `to` (anchor at `from`)
    pub fn range(from: usize, to: usize) -> Self {
        Self {
            anchor: from,
            head: to,
        }
    }

    /// True when the selection is a collapsed cursor
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Lower bound of the selection
    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Upper bound of the selection
    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// JSON encoding (`{"anchor": n, "head": n}`)
    pub fn to_value(&self) -> Value {
        json!({ "anchor": self.anchor, "head": self.head })
    }

    /// Decode from JSON; `head` defaults to `anchor` when absent
    pub fn from_value(value: &Value) -> Option<Self> {
        let anchor = value.get("anchor")?.as_u64()? as usize;
        let head = match value.get("head") {
            Some(h) => h.as_u64()? as usize,
            None => anchor,
        };
        Some(Self { anchor, head })
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::cursor(0)
    }
}
