//! Editing session: buffer, history, and caret restore point.

use super::history::EditHistory;
use super::ops::{self, EditOp, EditOutcome};

/// A live editing session over one document.
///
/// Owns the text buffer, its undo history, and the caret/scroll restore
/// point a text surface needs to keep the viewport stable across updates.
/// All mutations route through [`EditorSession::apply`] or
/// [`EditorSession::replace_content`], which record a history snapshot;
/// undo and redo replay snapshots without recording new ones.
#[derive(Debug, Clone)]
pub struct EditorSession {
    content: String,
    history: EditHistory,
    cursor: usize,
    scroll_offset: f64,
}

impl EditorSession {
    /// Open a session on existing content. The history is seeded with it.
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let history = EditHistory::new(content.clone());
        Self {
            content,
            history,
            cursor: 0,
            scroll_offset: 0.0,
        }
    }

    /// Current buffer content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Caret position and scroll offset to re-apply after the surface
    /// re-renders. Never resets to the top of the document on its own.
    pub fn restore_point(&self) -> (usize, f64) {
        (self.cursor, self.scroll_offset)
    }

    /// Record the scroll offset reported by the surface. Does not touch
    /// the buffer or the history.
    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = offset;
    }

    /// Apply a toolbar or keyboard operation over the given selection.
    pub fn apply(&mut self, sel_start: usize, sel_end: usize, op: &EditOp) -> &str {
        let EditOutcome { content, cursor } = ops::apply_op(&self.content, sel_start, sel_end, op);
        self.commit(content, cursor)
    }

    /// Replace the whole buffer, as free-form typing does.
    pub fn replace_content(&mut self, content: impl Into<String>, cursor: usize) -> &str {
        let content = content.into();
        let cursor = ops::clamp_position(&content, cursor);
        self.commit(content, cursor)
    }

    fn commit(&mut self, content: String, cursor: usize) -> &str {
        self.history.push(content.clone());
        self.content = content;
        self.cursor = cursor;
        &self.content
    }

    /// Step back to the previous snapshot. The caret keeps its position,
    /// clamped into the restored content. No-op at the oldest snapshot.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.content = snapshot.to_string();
        self.cursor = ops::clamp_position(&self.content, self.cursor);
        true
    }

    /// Step forward to the next snapshot. No-op without a preceding undo.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.content = snapshot.to_string();
        self.cursor = ops::clamp_position(&self.content, self.cursor);
        true
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}
