//! # Reducer
//!
//! `(state, command) -> state'` over an [`EditorState`]. This is the only
//! place document semantics live; the editor and the preview both call it.

use crate::history::History;
use crate::mutations::{Command, NoOp};
use crate::section::Document;
use serde::{Deserialize, Serialize};

/// Document history plus a revision counter
///
/// `revision` increases by one every time the current document changes, so
/// two reducers fed the same command stream agree on it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    history: History,
    revision: u64,
}

impl EditorState {
    pub fn new(document: Document) -> Self {
        Self {
            history: History::new(document),
            revision: 0,
        }
    }

    pub fn with_history_limit(document: Document, limit: usize) -> Self {
        Self {
            history: History::with_limit(document, limit),
            revision: 0,
        }
    }

    pub fn document(&self) -> &Document {
        self.history.current()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply a command in place. Returns whether the current document changed.
    ///
    /// Never fails: unknown ids, bad indices and empty undo/redo are absorbed.
    pub fn apply(&mut self, command: &Command) -> bool {
        let changed = match command {
            Command::Undo => self.history.undo(),
            Command::Redo => self.history.redo(),
            _ => self.apply_mutation(command),
        };

        if changed {
            self.revision += 1;
        } else {
            tracing::debug!(command = command.name(), "command left the document unchanged");
        }

        changed
    }

    fn apply_mutation(&mut self, command: &Command) -> bool {
        let mut next = self.history.current().clone();

        match command.apply(&mut next) {
            Ok(()) if &next != self.history.current() => {
                self.history.push(next);
                true
            }
            Ok(()) => false,
            Err(reason) => {
                log_noop(command, &reason);
                false
            }
        }
    }
}

fn log_noop(command: &Command, reason: &NoOp) {
    tracing::debug!(command = command.name(), %reason, "command absorbed");
}

/// Pure form of [`EditorState::apply`]
pub fn reduce(state: &EditorState, command: &Command) -> EditorState {
    let mut next = state.clone();
    next.apply(command);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::{Section, SectionId};
    use crate::Direction;

    #[test]
    fn test_add_undo_redo_scenario() {
        let state = EditorState::default();

        let state = reduce(
            &state,
            &Command::AddSection { section: Section::new("s1", "hero"), index: None },
        );
        assert_eq!(state.document().len(), 1);
        assert_eq!(state.history().len(), 2);
        assert_eq!(state.history().index(), 1);

        let state = reduce(&state, &Command::Undo);
        assert!(state.document().is_empty());
        assert_eq!(state.history().index(), 0);

        let state = reduce(&state, &Command::Redo);
        assert_eq!(state.document().ids(), vec![&SectionId::from("s1")]);
        assert_eq!(state.history().index(), 1);
        assert_eq!(state.revision(), 3);
    }

    #[test]
    fn test_noop_does_not_touch_history_or_revision() {
        let mut state = EditorState::new(vec![Section::new("a", "text")].into_iter().collect());

        assert!(!state.apply(&Command::MoveSection { section_id: "a".into(), direction: Direction::Up }));
        assert!(!state.apply(&Command::DeleteSection { section_id: "zzz".into() }));
        assert!(!state.apply(&Command::Undo));

        assert_eq!(state.history().len(), 1);
        assert_eq!(state.revision(), 0);
    }

    #[test]
    fn test_identical_set_document_is_noop() {
        let sections = vec![Section::new("a", "text"), Section::new("b", "hero")];
        let mut state = EditorState::default();

        assert!(state.apply(&Command::SetDocument { sections: sections.clone() }));
        assert!(!state.apply(&Command::SetDocument { sections }));
        assert_eq!(state.history().len(), 2);
        assert_eq!(state.revision(), 1);
    }

    #[test]
    fn test_reduce_leaves_input_untouched() {
        let state = EditorState::default();
        let next = reduce(&state, &Command::AddSection { section: Section::new("a", "text"), index: None });

        assert!(state.document().is_empty());
        assert_eq!(next.document().len(), 1);
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let mut state = EditorState::default();
        state.apply(&Command::AddSection { section: Section::new("a", "text"), index: None });
        state.apply(&Command::Undo);

        let json = serde_json::to_string(&state).unwrap();
        let back: EditorState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
