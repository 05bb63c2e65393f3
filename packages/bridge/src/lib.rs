//! # Pagewright Bridge
//!
//! Message plumbing between the editor context and the preview context.
//!
//! The two contexts share no memory. Everything they agree on travels as
//! JSON [`Envelope`]s over a [`Port`]:
//!
//! ```text
//!  editor                                   preview
//!  ┌──────────┐  SET_SECTIONS, UNDO, ...   ┌──────────┐
//!  │ Outbound │ ─────────────────────────▶ │  Inbox   │
//!  │          │                            │ (verify  │
//!  │  Inbox   │ ◀───────────────────────── │  origin) │
//!  └──────────┘  DOCUMENT_CHANGED, ...     └──────────┘
//! ```
//!
//! [`Barrier`] layers a request/completion handshake with a timeout on top,
//! used to make sure the preview has flushed inline edits before a save.

mod barrier;
mod error;
mod inbox;
mod port;
mod protocol;

pub use barrier::{Barrier, BarrierOutcome, Completion, DEFAULT_BARRIER_TIMEOUT};
pub use error::BridgeError;
pub use inbox::Inbox;
pub use port::{pair, Port, PortReceiver, PortSender};
pub use protocol::{Action, ContextKind, Envelope, Message, Origin, RequestId, Viewport};
