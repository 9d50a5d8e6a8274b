//! Toolbar-driven text editing engine.
//!
//! Pure string operations over a text buffer plus a bounded snapshot
//! history. Operations take byte-offset selections and return the new
//! content together with the cursor position the text surface should
//! restore, so the engine stays unit-testable without any rendering
//! environment.

pub mod history;
pub mod ops;
pub mod session;

pub use history::{EditHistory, HISTORY_CAPACITY};
pub use ops::{BlockKind, ColorTarget, EditOp, EditOutcome, InlineStyle};
pub use session::EditorSession;
