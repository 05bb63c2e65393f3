//! # Pagewright Preview
//!
//! The preview context: a read-only mirror of the editor's document,
//! rendered and laid out on a canvas, with hover and selection highlights.
//!
//! ```text
//! editor ──commands──▶ Mirror ──▶ render ──▶ LayoutTree ──▶ Overlay
//!    ▲                                                        │
//!    └──── DOCUMENT_CHANGED / SECTION_SELECTED / intents ─────┘
//! ```
//!
//! The mirror only changes by replaying editor commands in revision order.
//! Anything the user does on the canvas becomes an intent the editor decides
//! on.

mod actor;
mod error;
mod layout;
mod mirror;
mod overlay;
mod render;
mod session;

pub use actor::{PointerEvent, PreviewActor, PreviewHandle, PreviewRequest, PreviewSnapshot};
pub use error::PreviewError;
pub use layout::{LayoutTree, NodeId, Point, Rect, SectionMarker, Surface};
pub use mirror::{Mirror, MirrorOutcome};
pub use overlay::{Highlight, Overlay, SAFETY_DEADLINE, SETTLE_WINDOW};
pub use render::{render_document, render_section, HEIGHT_ATTR, HEIGHT_KEY};
pub use session::{PreviewSession, RESYNC_RETRY};
