//! # Pagewright Document
//!
//! Section data model, reducer and undo/redo history shared by the editor and
//! the preview.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ editor context: authoritative EditorState   │
//! │  - Command → reduce → History push          │
//! └─────────────────────────────────────────────┘
//!                     ↓ same Command over the bridge
//! ┌─────────────────────────────────────────────┐
//! │ preview context: mirror EditorState         │
//! │  - Command → reduce (this crate, unchanged) │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Both contexts import this crate as-is. Context-specific wrappers add
//! re-rendering or outbound messages, never their own mutation semantics.
//!
//! ## Usage
//!
//! ```rust
//! use pagewright_document::{Command, EditorState, Section};
//!
//! let mut state = EditorState::default();
//! state.apply(&Command::AddSection {
//!     section: Section::new("s1", "hero"),
//!     index: None,
//! });
//! assert_eq!(state.document().len(), 1);
//!
//! state.apply(&Command::Undo);
//! assert!(state.document().is_empty());
//! ```

mod history;
mod mutations;
mod reducer;
mod section;
mod styles;

pub use history::{History, HistoryError, DEFAULT_HISTORY_LIMIT};
pub use mutations::{Command, Direction, NoOp};
pub use reducer::{reduce, EditorState};
pub use section::{Document, Section, SectionId, SectionType, Settings};
pub use styles::{GlobalStyles, StyleScope, COLOR_SCHEME_KEY};

/// Settings key mirrored onto [`Section::is_visible`].
pub const VISIBILITY_KEY: &str = "isVisible";

/// Settings key holding a section's ordered content blocks.
pub const BLOCKS_KEY: &str = "blocks";
