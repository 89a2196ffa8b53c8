//! Undo/redo history for the editing core
//!
//! The history engine observes "content changed" notifications from
//! dispatch, captures debounced whole-document snapshots (serialized
//! markup plus selection offsets), and replays them on undo/redo.
//!
//! State machine: Idle -> Capturing -> Idle on a debounced capture, and
//! Idle -> Restoring -> Idle on undo/redo. While Capturing or Restoring,
//! change notifications are ignored so a restore never captures itself.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::editor::EditorError;
use crate::models::selection::Selection;
use crate::parse::MarkupParser;
use crate::schema::Schema;

/// Default maximum number of snapshots kept on the undo stack
pub const DEFAULT_CAPACITY: usize = 100;

/// Default idle gap before a pending capture fires, in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// One captured document state
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// Serialized document markup
    pub markup: String,
    /// Selection bounds (from, to) at capture time
    pub selection: Option<(usize, usize)>,
    /// Capture timestamp (host clock, milliseconds)
    pub at_ms: u64,
}

/// Guard states; notifications are only honored while Idle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HistoryState {
    Idle,
    Capturing,
    Restoring,
}

/// Cancelable token for a scheduled debounced capture
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingCapture {
    pub due_ms: u64,
}

/// A state restored by undo/redo
///
/// Content restoration is synchronous; the selection offsets are handed
/// back for the session to apply on a later scheduling turn.
pub struct Restored {
    pub document: Document,
    pub selection: Option<(usize, usize)>,
}

/// Bounded dual-stack snapshot history
pub struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    capacity: usize,
    debounce_ms: u64,
    pending: Option<PendingCapture>,
    state: HistoryState,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_DEBOUNCE_MS)
    }
}

impl History {
    pub fn new(capacity: usize, debounce_ms: u64) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            capacity,
            debounce_ms,
            pending: None,
            state: HistoryState::Idle,
        }
    }

    /// Handle a content-change notification
    ///
    /// Schedules (or reschedules, cancelling the previous deadline) the
    /// pending capture token. Ignored while a capture or restore is in
    /// flight, which is what keeps a restore from capturing itself.
    pub fn note_content_changed(&mut self, now_ms: u64) {
        if self.state != HistoryState::Idle {
            return;
        }
        self.pending = Some(PendingCapture {
            due_ms: now_ms + self.debounce_ms,
        });
    }

    /// Currently scheduled capture token, if any
    pub fn pending(&self) -> Option<PendingCapture> {
        self.pending
    }

    /// Cancel any scheduled capture
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    /// Whether the pending capture's idle gap has elapsed
    pub fn capture_due(&self, now_ms: u64) -> bool {
        matches!(self.pending, Some(p) if now_ms >= p.due_ms)
    }

    /// Capture the current state now
    ///
    /// No-ops when the markup is identical to the last captured snapshot
    /// (content-based dedup). A real capture clears the redo stack and
    /// evicts the oldest snapshot once over capacity. Returns whether a
    /// snapshot was pushed.
    pub fn save_state(&mut self, document: &Document, selection: &Selection, now_ms: u64) -> bool {
        self.state = HistoryState::Capturing;
        self.pending = None;

        let markup = document.to_html();
        if self.undo_stack.back().map(|s| s.markup.as_str()) == Some(markup.as_str()) {
            self.state = HistoryState::Idle;
            return false;
        }

        self.undo_stack.push_back(Snapshot {
            markup,
            selection: Some((selection.from(), selection.to())),
            at_ms: now_ms,
        });
        if self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
        // Divergent edit: forward history is no longer reachable
        self.redo_stack.clear();

        self.state = HistoryState::Idle;
        true
    }

    /// Step back one snapshot
    ///
    /// Returns `None` when there is nothing to undo (the stack holds at
    /// most the current state). On success the engine stays in the
    /// Restoring state until `finish_restore` is called after the
    /// deferred selection restore has settled.
    pub fn undo(
        &mut self,
        schema: &Arc<Schema>,
        parser: &dyn MarkupParser,
    ) -> Result<Option<Restored>, EditorError> {
        if self.undo_stack.len() <= 1 {
            return Ok(None);
        }
        self.state = HistoryState::Restoring;
        self.pending = None;

        // Parse the target before touching the stacks so a failure
        // leaves history intact
        let target = self.undo_stack[self.undo_stack.len() - 2].clone();
        let document = match Document::from_markup(schema.clone(), parser, &target.markup) {
            Ok(doc) => doc,
            Err(e) => {
                self.state = HistoryState::Idle;
                return Err(e.into());
            }
        };

        if let Some(current) = self.undo_stack.pop_back() {
            self.redo_stack.push(current);
        }
        Ok(Some(Restored {
            document,
            selection: target.selection,
        }))
    }

    /// Step forward one snapshot; symmetric with `undo`
    pub fn redo(
        &mut self,
        schema: &Arc<Schema>,
        parser: &dyn MarkupParser,
    ) -> Result<Option<Restored>, EditorError> {
        let target = match self.redo_stack.last() {
            Some(snapshot) => snapshot.clone(),
            None => return Ok(None),
        };
        self.state = HistoryState::Restoring;
        self.pending = None;

        let document = match Document::from_markup(schema.clone(), parser, &target.markup) {
            Ok(doc) => doc,
            Err(e) => {
                self.state = HistoryState::Idle;
                return Err(e.into());
            }
        };

        if let Some(snapshot) = self.redo_stack.pop() {
            self.undo_stack.push_back(snapshot);
        }
        Ok(Some(Restored {
            document,
            selection: target.selection,
        }))
    }

    /// Leave the Restoring state once the deferred restore has settled
    pub fn finish_restore(&mut self) {
        self.state = HistoryState::Idle;
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of snapshots on the undo stack
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Markup of the most recent snapshot (the current state)
    pub fn top_markup(&self) -> Option<&str> {
        self.undo_stack.back().map(|s| s.markup.as_str())
    }

    /// Oldest retained snapshot markup (for capacity checks)
    pub fn oldest_markup(&self) -> Option<&str> {
        self.undo_stack.front().map(|s| s.markup.as_str())
    }

    /// Drop all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.pending = None;
        self.state = HistoryState::Idle;
    }
}
