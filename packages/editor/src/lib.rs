//! # Pagewright Editor
//!
//! The editor context: owner of the authoritative document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ EditorHandle (UI)                           │
//! │  - dispatch / select / viewport / styles    │
//! │  - save → SaveReport                        │
//! └─────────────────────────────────────────────┘
//!                     ↓ requests
//! ┌─────────────────────────────────────────────┐
//! │ EditorActor                                 │
//! │  - EditorSession: reducer + selection       │
//! │  - port to the preview                      │
//! │  - save: flush barrier → store              │
//! └─────────────────────────────────────────────┘
//!                     ↓ envelopes
//!                  preview
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pagewright_bridge::pair;
//! use pagewright_document::{Command, Section};
//! use pagewright_editor::{EditorActor, EditorSession, MemoryStore};
//! use pagewright_registry::catalog;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), pagewright_editor::EditorError> {
//! let (editor_port, _preview_port) = pair();
//! let session = EditorSession::new("editor-1", "preview-1", Arc::new(catalog::standard()));
//! let (handle, _task) = EditorActor::spawn(session, editor_port, Arc::new(MemoryStore::new()));
//!
//! handle.dispatch(Command::AddSection {
//!     section: Section::new("s1", "hero"),
//!     index: None,
//! })?;
//! let report = handle.save().await?;
//! println!("saved {} sections", report.sections);
//! # Ok(())
//! # }
//! ```

mod actor;
mod errors;
mod session;
mod store;

pub use actor::{EditorActor, EditorHandle, EditorRequest, EditorSnapshot};
pub use errors::EditorError;
pub use session::EditorSession;
pub use store::{MemoryStore, SaveReport, SavedSettings, SettingsStore, StoreError};
