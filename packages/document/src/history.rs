//! # Undo/Redo History
//!
//! Linear list of document snapshots with a cursor.
//!
//! ## Design
//!
//! - The snapshot at `index` is the current document
//! - Undo/redo only move the cursor
//! - Pushing while the cursor is behind the end prunes the redo branch
//! - Depth is bounded; the oldest snapshots fall off first
//!
//! Invariants: `0 <= index < len` and `len >= 1`.

use crate::section::Document;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of snapshots kept
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    #[error("History must hold at least one snapshot")]
    Empty,

    #[error("History cursor {index} out of range for {len} snapshots")]
    CursorOutOfRange { index: usize, len: usize },
}

/// Undo/redo history for a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHistory")]
pub struct History {
    snapshots: Vec<Document>,
    index: usize,
    limit: usize,
}

/// Unvalidated wire form
#[derive(Deserialize)]
struct RawHistory {
    snapshots: Vec<Document>,
    index: usize,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl TryFrom<RawHistory> for History {
    type Error = HistoryError;

    fn try_from(raw: RawHistory) -> Result<Self, Self::Error> {
        if raw.snapshots.is_empty() {
            return Err(HistoryError::Empty);
        }
        if raw.index >= raw.snapshots.len() {
            return Err(HistoryError::CursorOutOfRange {
                index: raw.index,
                len: raw.snapshots.len(),
            });
        }

        Ok(Self {
            snapshots: raw.snapshots,
            index: raw.index,
            limit: raw.limit.max(1),
        })
    }
}

impl History {
    /// Start a history whose only snapshot is `initial`
    pub fn new(initial: Document) -> Self {
        Self::with_limit(initial, DEFAULT_HISTORY_LIMIT)
    }

    /// Start a history keeping at most `limit` snapshots
    pub fn with_limit(initial: Document, limit: usize) -> Self {
        Self {
            snapshots: vec![initial],
            index: 0,
            limit: limit.max(1),
        }
    }

    pub fn current(&self) -> &Document {
        &self.snapshots[self.index]
    }

    /// Record a new current document
    pub fn push(&mut self, document: Document) {
        // New edits invalidate the future
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(document);

        if self.snapshots.len() > self.limit {
            let overflow = self.snapshots.len() - self.limit;
            self.snapshots.drain(..overflow);
        }

        self.index = self.snapshots.len() - 1;
    }

    /// Step back one snapshot. Returns false when already at the oldest.
    pub fn undo(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Step forward one snapshot. Returns false when already at the newest.
    pub fn redo(&mut self) -> bool {
        if self.index + 1 < self.snapshots.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn undo_levels(&self) -> usize {
        self.index
    }

    pub fn redo_levels(&self) -> usize {
        self.snapshots.len() - self.index - 1
    }

    pub fn snapshots(&self) -> &[Document] {
        &self.snapshots
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Document::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::Section;

    fn doc(ids: &[&str]) -> Document {
        ids.iter().map(|id| Section::new(*id, "text")).collect()
    }

    #[test]
    fn test_history_creation() {
        let history = History::default();
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_undo_redo() {
        let mut history = History::default();
        history.push(doc(&["a"]));

        assert_eq!(history.len(), 2);
        assert_eq!(history.index(), 1);

        assert!(history.undo());
        assert_eq!(history.current(), &Document::default());
        assert!(!history.undo());

        assert!(history.redo());
        assert_eq!(history.current(), &doc(&["a"]));
        assert!(!history.redo());
    }

    #[test]
    fn test_push_prunes_redo_branch() {
        let mut history = History::default();
        history.push(doc(&["a"]));
        history.push(doc(&["a", "b"]));
        history.undo();
        history.undo();
        assert_eq!(history.redo_levels(), 2);

        history.push(doc(&["c"]));

        assert_eq!(history.redo_levels(), 0);
        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), &doc(&["c"]));
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::with_limit(Document::default(), 2);

        for i in 0..3 {
            history.push(doc(&[&format!("s{}", i)]));
        }

        assert_eq!(history.len(), 2);
        assert_eq!(history.index(), 1);
        assert_eq!(history.snapshots()[0], doc(&["s1"]));
    }

    #[test]
    fn test_deserialize_rejects_broken_invariants() {
        let empty = serde_json::json!({ "snapshots": [], "index": 0 });
        assert!(serde_json::from_value::<History>(empty).is_err());

        let out_of_range = serde_json::json!({ "snapshots": [[]], "index": 1 });
        assert!(serde_json::from_value::<History>(out_of_range).is_err());

        let ok = serde_json::json!({ "snapshots": [[], [{ "id": "a", "type": "text" }]], "index": 1 });
        let history: History = serde_json::from_value(ok).unwrap();
        assert_eq!(history.limit(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(history.current().len(), 1);
    }
}
