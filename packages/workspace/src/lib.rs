//! # Pagewright Workspace
//!
//! Persistence collaborators for the editor and the HTTP surface exposing
//! them:
//!
//! - [`FileSettingsStore`]: saved sections and styles in one JSON file,
//!   plus the regenerated page stylesheet
//! - [`MediaLibrary`]: validated uploads served from `/media`
//! - [`router`] / [`serve`]: the axum routes

pub mod error;
pub mod media;
pub mod server;
pub mod store;
pub mod stylesheet;

pub use error::{WorkspaceError, WorkspaceResult};
pub use media::{sanitize_file_name, MediaLibrary, StoredMedia, DEFAULT_ALLOWED_MIME_TYPES};
pub use server::{router, serve, AppState, MAX_UPLOAD_BYTES};
pub use store::{FileSettingsStore, SETTINGS_FILE};
