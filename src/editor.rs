//! Editing session: transaction dispatch and scheduling
//!
//! One `Editor` per session owns the schema, the parser adapter, the
//! current document and selection, and the history engine. External
//! command layers propose whole-document replacements as transactions;
//! dispatch adopts them atomically and fans out an "updated" signal.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;
use crate::history::History;
use crate::models::node::TreeError;
use crate::models::selection::Selection;
use crate::parse::{MarkupParser, ParseError};
use crate::schema::Schema;

/// Errors surfaced by the editing session
#[derive(Debug, Clone, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A proposed whole-document replacement plus optional new selection
///
/// Produced by an external command layer, typically via
/// `Schema::node`/`text`/`mark` and `Node::to_value`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Transaction {
    /// Portable tree for the replacement document
    pub doc: Value,
    /// New selection to adopt, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
}

/// Subscriber invoked after every adopted update
pub type UpdateListener = Box<dyn FnMut(&Document, &Selection)>;

/// Selection offsets waiting to be applied on the next scheduling turn
struct DeferredRestore {
    selection: Option<(usize, usize)>,
}

/// An editing session
pub struct Editor {
    schema: Arc<Schema>,
    parser: Box<dyn MarkupParser>,
    document: Document,
    selection: Selection,
    history: History,
    listeners: Vec<UpdateListener>,
    deferred_restore: Option<DeferredRestore>,
}

impl Editor {
    /// Session over a default (empty-paragraph) document
    ///
    /// The initial state is captured immediately so the first edit has
    /// something to undo back to.
    pub fn new(schema: Arc<Schema>, parser: Box<dyn MarkupParser>, now_ms: u64) -> Self {
        let document = Document::new(schema.clone());
        Self::from_document(schema, parser, document, now_ms)
    }

    /// Session over a document parsed from markup
    pub fn with_markup(
        schema: Arc<Schema>,
        parser: Box<dyn MarkupParser>,
        input: &str,
        now_ms: u64,
    ) -> Result<Self, EditorError> {
        let document = Document::from_markup(schema.clone(), parser.as_ref(), input)?;
        Ok(Self::from_document(schema, parser, document, now_ms))
    }

    fn from_document(
        schema: Arc<Schema>,
        parser: Box<dyn MarkupParser>,
        document: Document,
        now_ms: u64,
    ) -> Self {
        let mut editor = Self {
            schema,
            parser,
            document,
            selection: Selection::cursor(0),
            history: History::default(),
            listeners: Vec::new(),
            deferred_restore: None,
        };
        editor
            .history
            .save_state(&editor.document, &editor.selection, now_ms);
        editor
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Subscribe to "updated" signals
    pub fn on_update(&mut self, listener: UpdateListener) {
        self.listeners.push(listener);
    }

    /// Adopt a transaction atomically
    ///
    /// The replacement document is rebuilt and validated first; on any
    /// failure the prior document and selection are retained and the
    /// error propagates to the caller. A dispatch landing before an
    /// undo/redo's deferred restore has run supersedes that restore.
    pub fn dispatch(&mut self, tr: &Transaction, now_ms: u64) -> Result<(), EditorError> {
        // Settle any in-flight restore so this edit is observed by the
        // history engine (and the stale deferred selection is dropped)
        if self.deferred_restore.take().is_some() {
            self.history.finish_restore();
        }
        let document = Document::from_value(self.schema.clone(), &tr.doc)?;
        self.document = document;
        let adopted = tr.selection.unwrap_or(self.selection);
        self.selection = Selection {
            anchor: self.document.clamp_offset(adopted.anchor),
            head: self.document.clamp_offset(adopted.head),
        };
        self.emit_updated(now_ms);
        Ok(())
    }

    /// Drive scheduled work: due debounced captures and the deferred
    /// selection restore after an undo/redo
    pub fn tick(&mut self, now_ms: u64) {
        if let Some(restore) = self.deferred_restore.take() {
            self.apply_deferred_selection(restore);
            self.history.finish_restore();
        }
        if self.history.capture_due(now_ms) {
            self.history
                .save_state(&self.document, &self.selection, now_ms);
        }
    }

    /// Step back one history snapshot; returns whether anything changed
    pub fn undo(&mut self, now_ms: u64) -> Result<bool, EditorError> {
        self.flush_pending_capture(now_ms);
        let restored = self.history.undo(&self.schema, &*self.parser)?;
        Ok(self.adopt_restored(restored, now_ms))
    }

    /// Step forward one history snapshot; returns whether anything changed
    pub fn redo(&mut self, now_ms: u64) -> Result<bool, EditorError> {
        self.flush_pending_capture(now_ms);
        let restored = self.history.redo(&self.schema, &*self.parser)?;
        Ok(self.adopt_restored(restored, now_ms))
    }

    /// Capture immediately if a debounced capture is still pending, so
    /// undo steps from the state the user actually sees
    fn flush_pending_capture(&mut self, now_ms: u64) {
        if self.history.pending().is_some() {
            self.history
                .save_state(&self.document, &self.selection, now_ms);
        }
    }

    fn adopt_restored(
        &mut self,
        restored: Option<crate::history::Restored>,
        now_ms: u64,
    ) -> bool {
        match restored {
            None => false,
            Some(restored) => {
                self.document = restored.document;
                // Keep the selection inside the restored document until
                // the deferred restore refines it
                self.selection = Selection {
                    anchor: self.document.clamp_offset(self.selection.anchor),
                    head: self.document.clamp_offset(self.selection.head),
                };
                self.deferred_restore = Some(DeferredRestore {
                    selection: restored.selection,
                });
                // History is guarded as Restoring here, so this signal
                // cannot schedule a capture
                self.emit_updated(now_ms);
                true
            }
        }
    }

    fn apply_deferred_selection(&mut self, restore: DeferredRestore) {
        let Some((from, to)) = restore.selection else {
            return;
        };
        let from = self.document.clamp_offset(from);
        let to = self.document.clamp_offset(to);
        match (
            self.document.resolve_offset(from),
            self.document.resolve_offset(to),
        ) {
            (Ok(_), Ok(_)) => {
                self.selection = Selection::range(from, to);
            }
            (Err(e), _) | (_, Err(e)) => {
                // Content restoration already succeeded; a stale
                // selection is non-fatal
                log::warn!("failed to restore selection: {}", e);
            }
        }
    }

    fn emit_updated(&mut self, now_ms: u64) {
        for listener in &mut self.listeners {
            listener(&self.document, &self.selection);
        }
        self.history.note_content_changed(now_ms);
    }
}
