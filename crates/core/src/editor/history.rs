//! Bounded snapshot history for undo/redo.

/// Maximum number of snapshots retained; pushing beyond evicts the oldest.
pub const HISTORY_CAPACITY: usize = 50;

/// Linear undo/redo history over whole-buffer snapshots.
///
/// The history always holds at least one snapshot (the content it was
/// seeded with) and `index` always points at the snapshot currently live
/// in the buffer. Pushing after an undo discards the snapshots ahead of
/// the index, so redo is only available until the next mutation.
#[derive(Debug, Clone)]
pub struct EditHistory {
    snapshots: Vec<String>,
    index: usize,
}

impl EditHistory {
    /// Seed the history with the initial buffer content.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            snapshots: vec![initial.into()],
            index: 0,
        }
    }

    /// Record a new snapshot after a mutation.
    ///
    /// Anything ahead of the current index is discarded first; when the
    /// capacity is exceeded the oldest snapshot is evicted from the front.
    pub fn push(&mut self, content: impl Into<String>) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(content.into());
        if self.snapshots.len() > HISTORY_CAPACITY {
            self.snapshots.remove(0);
        }
        self.index = self.snapshots.len() - 1;
    }

    /// Step back one snapshot. At the oldest snapshot this is a no-op.
    pub fn undo(&mut self) -> Option<&str> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.snapshots[self.index])
    }

    /// Step forward one snapshot. Without a preceding undo this is a no-op.
    pub fn redo(&mut self) -> Option<&str> {
        if self.index + 1 >= self.snapshots.len() {
            return None;
        }
        self.index += 1;
        Some(&self.snapshots[self.index])
    }

    /// Snapshot currently live in the buffer.
    pub fn current(&self) -> &str {
        &self.snapshots[self.index]
    }

    /// Number of retained snapshots.
    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- push / undo / redo --

    #[test]
    fn undo_returns_previous_snapshot() {
        let mut history = EditHistory::new("a");
        history.push("ab");
        assert_eq!(history.undo(), Some("a"));
        assert_eq!(history.current(), "a");
    }

    #[test]
    fn undo_at_oldest_snapshot_is_noop() {
        let mut history = EditHistory::new("a");
        assert_eq!(history.undo(), None);
        assert_eq!(history.current(), "a");
    }

    #[test]
    fn redo_without_undo_is_noop() {
        let mut history = EditHistory::new("a");
        history.push("ab");
        assert_eq!(history.redo(), None);
        assert_eq!(history.current(), "ab");
    }

    #[test]
    fn undo_then_redo_round_trip() {
        let mut history = EditHistory::new("a");
        history.push("ab");
        history.push("abc");
        assert_eq!(history.undo(), Some("ab"));
        assert_eq!(history.undo(), Some("a"));
        assert_eq!(history.redo(), Some("ab"));
        assert_eq!(history.redo(), Some("abc"));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn full_undo_redo_cycle_restores_final_state() {
        let mut history = EditHistory::new("0");
        for i in 1..=HISTORY_CAPACITY {
            history.push(i.to_string());
        }
        // The no-op steps at both ends keep the cycle balanced even when
        // eviction has trimmed the oldest snapshot.
        for _ in 0..HISTORY_CAPACITY {
            history.undo();
        }
        for _ in 0..HISTORY_CAPACITY {
            history.redo();
        }
        assert_eq!(history.current(), HISTORY_CAPACITY.to_string());
    }

    // -- capacity --

    #[test]
    fn depth_never_exceeds_capacity() {
        let mut history = EditHistory::new("seed");
        for i in 0..200 {
            history.push(format!("snapshot {i}"));
            assert!(history.depth() <= HISTORY_CAPACITY);
        }
        assert_eq!(history.depth(), HISTORY_CAPACITY);
    }

    #[test]
    fn eviction_drops_oldest_first() {
        let mut history = EditHistory::new("0");
        for i in 1..=HISTORY_CAPACITY {
            history.push(i.to_string());
        }
        // 51 snapshots were recorded; "0" fell off the front.
        while history.undo().is_some() {}
        assert_eq!(history.current(), "1");
    }

    // -- redo invalidation --

    #[test]
    fn push_after_undo_discards_redo_branch() {
        let mut history = EditHistory::new("a");
        history.push("ab");
        history.push("abc");
        history.undo();
        history.push("abX");
        assert!(!history.can_redo());
        assert_eq!(history.redo(), None);
        assert_eq!(history.current(), "abX");
        assert_eq!(history.undo(), Some("ab"));
    }

    #[test]
    fn undo_and_redo_do_not_record_snapshots() {
        let mut history = EditHistory::new("a");
        history.push("ab");
        let depth = history.depth();
        history.undo();
        history.redo();
        assert_eq!(history.depth(), depth);
    }

    #[test]
    fn identical_content_still_recorded() {
        let mut history = EditHistory::new("a");
        history.push("a");
        assert_eq!(history.depth(), 2);
    }
}
