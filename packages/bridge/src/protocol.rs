//! # Wire Protocol
//!
//! Every message crossing the context boundary is an [`Envelope`]:
//!
//! ```text
//! {
//!   "origin":   { "context": "editor", "session": "ed-1" },
//!   "revision": 4,
//!   "type":     "UPDATE_SECTION",
//!   "payload":  { "sectionId": "s1", "updates": { "title": "Hi" } }
//! }
//! ```
//!
//! `revision` is the sender's document revision. For editor commands it is
//! the revision the editor reached *after* applying the command, which is
//! what lets the preview mirror detect duplicates and gaps.

use crate::error::BridgeError;
use pagewright_document::{
    Command, Direction, EditorState, Section, SectionId, SectionType, Settings, StyleScope,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Which side of the boundary a message came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    Editor,
    Preview,
}

impl ContextKind {
    pub fn counterpart(self) -> Self {
        match self {
            ContextKind::Editor => ContextKind::Preview,
            ContextKind::Preview => ContextKind::Editor,
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextKind::Editor => write!(f, "editor"),
            ContextKind::Preview => write!(f, "preview"),
        }
    }
}

/// Sender identity attached to every envelope
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Origin {
    pub context: ContextKind,
    pub session: String,
}

impl Origin {
    pub fn new(context: ContextKind, session: impl Into<String>) -> Self {
        Self {
            context,
            session: session.into(),
        }
    }

    pub fn editor(session: impl Into<String>) -> Self {
        Self::new(ContextKind::Editor, session)
    }

    pub fn preview(session: impl Into<String>) -> Self {
        Self::new(ContextKind::Preview, session)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.context, self.session)
    }
}

/// Preview canvas size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    Mobile,
    Tablet,
    #[default]
    Desktop,
    Fullscreen,
}

impl Viewport {
    /// Canvas width in CSS pixels
    pub fn width(self) -> f64 {
        match self {
            Viewport::Mobile => 375.0,
            Viewport::Tablet => 768.0,
            Viewport::Desktop => 1280.0,
            Viewport::Fullscreen => 1920.0,
        }
    }

    /// Visible canvas height in CSS pixels
    pub fn height(self) -> f64 {
        match self {
            Viewport::Mobile => 667.0,
            Viewport::Tablet => 1024.0,
            Viewport::Desktop => 800.0,
            Viewport::Fullscreen => 1080.0,
        }
    }

    /// Height given to a section that does not set its own
    pub fn section_height(self) -> f64 {
        match self {
            Viewport::Mobile => 560.0,
            Viewport::Tablet => 480.0,
            Viewport::Desktop | Viewport::Fullscreen => 400.0,
        }
    }
}

/// Work the barrier asks the counterpart to finish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Push any pending inline edits before a save snapshot is taken
    FlushEditable,
    #[serde(other)]
    Unknown,
}

/// Barrier request id: a millisecond timestamp, bumped to stay unique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub i64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tagged payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Message {
    SetSections {
        sections: Vec<Section>,
    },

    UpdateSection {
        section_id: SectionId,
        updates: Settings,
    },

    AddSection {
        section: Section,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        #[serde(default)]
        scroll_to_section: bool,
    },

    DeleteSection {
        section_id: SectionId,
    },

    MoveSection {
        section_id: SectionId,
        direction: Direction,
    },

    ToggleSectionVisibility {
        section_id: SectionId,
        is_visible: bool,
    },

    ReorderSections {
        section_id: SectionId,
        blocks: Vec<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scroll_to_section_id: Option<SectionId>,
    },

    DuplicateSection {
        section_id: SectionId,
        new_section_id: SectionId,
    },

    SectionSelected {
        section_id: SectionId,
        section_type: SectionType,
    },

    /// `null` clears the selection
    SelectSection {
        section_id: Option<SectionId>,
    },

    ScrollToSection {
        section_id: SectionId,
    },

    /// `null` clears the hover
    HoverSection {
        section_id: Option<SectionId>,
    },

    Undo {},
    Redo {},

    ViewportChange {
        viewport: Viewport,
    },

    UpdateTypography {
        settings: Settings,
    },

    UpdateCustomStyle {
        settings: Settings,
    },

    UpdateBranding {
        settings: Settings,
    },

    /// Full mirror snapshot, sent by the preview after every applied command
    DocumentChanged {
        sections: Vec<Section>,
    },

    ResyncRequest {},

    /// Replaces the preview mirror wholesale
    RestoreHistory {
        state: EditorState,
    },

    ActionRequest {
        action: Action,
        request_id: RequestId,
    },

    ActionComplete {
        action: Action,
        request_id: RequestId,
    },
}

impl Message {
    /// Wire tag, for logs
    pub fn tag(&self) -> &'static str {
        match self {
            Message::SetSections { .. } => "SET_SECTIONS",
            Message::UpdateSection { .. } => "UPDATE_SECTION",
            Message::AddSection { .. } => "ADD_SECTION",
            Message::DeleteSection { .. } => "DELETE_SECTION",
            Message::MoveSection { .. } => "MOVE_SECTION",
            Message::ToggleSectionVisibility { .. } => "TOGGLE_SECTION_VISIBILITY",
            Message::ReorderSections { .. } => "REORDER_SECTIONS",
            Message::DuplicateSection { .. } => "DUPLICATE_SECTION",
            Message::SectionSelected { .. } => "SECTION_SELECTED",
            Message::SelectSection { .. } => "SELECT_SECTION",
            Message::ScrollToSection { .. } => "SCROLL_TO_SECTION",
            Message::HoverSection { .. } => "HOVER_SECTION",
            Message::Undo {} => "UNDO",
            Message::Redo {} => "REDO",
            Message::ViewportChange { .. } => "VIEWPORT_CHANGE",
            Message::UpdateTypography { .. } => "UPDATE_TYPOGRAPHY",
            Message::UpdateCustomStyle { .. } => "UPDATE_CUSTOM_STYLE",
            Message::UpdateBranding { .. } => "UPDATE_BRANDING",
            Message::DocumentChanged { .. } => "DOCUMENT_CHANGED",
            Message::ResyncRequest {} => "RESYNC_REQUEST",
            Message::RestoreHistory { .. } => "RESTORE_HISTORY",
            Message::ActionRequest { .. } => "ACTION_REQUEST",
            Message::ActionComplete { .. } => "ACTION_COMPLETE",
        }
    }

    /// Wire form of a reducer command
    pub fn from_command(command: &Command) -> Self {
        match command.clone() {
            Command::SetDocument { sections } => Message::SetSections { sections },
            Command::UpdateSection {
                section_id,
                updates,
            } => Message::UpdateSection {
                section_id,
                updates,
            },
            Command::AddSection { section, index } => Message::AddSection {
                section,
                index,
                scroll_to_section: false,
            },
            Command::DeleteSection { section_id } => Message::DeleteSection { section_id },
            Command::MoveSection {
                section_id,
                direction,
            } => Message::MoveSection {
                section_id,
                direction,
            },
            Command::ToggleVisibility {
                section_id,
                is_visible,
            } => Message::ToggleSectionVisibility {
                section_id,
                is_visible,
            },
            Command::ReorderContent { section_id, blocks } => Message::ReorderSections {
                section_id,
                blocks,
                scroll_to_section_id: None,
            },
            Command::DuplicateSection {
                section_id,
                new_section_id,
            } => Message::DuplicateSection {
                section_id,
                new_section_id,
            },
            Command::Undo => Message::Undo {},
            Command::Redo => Message::Redo {},
        }
    }

    /// Reducer command carried by this message, if it carries one
    pub fn to_command(&self) -> Option<Command> {
        let command = match self.clone() {
            Message::SetSections { sections } => Command::SetDocument { sections },
            Message::UpdateSection {
                section_id,
                updates,
            } => Command::UpdateSection {
                section_id,
                updates,
            },
            Message::AddSection { section, index, .. } => Command::AddSection { section, index },
            Message::DeleteSection { section_id } => Command::DeleteSection { section_id },
            Message::MoveSection {
                section_id,
                direction,
            } => Command::MoveSection {
                section_id,
                direction,
            },
            Message::ToggleSectionVisibility {
                section_id,
                is_visible,
            } => Command::ToggleVisibility {
                section_id,
                is_visible,
            },
            Message::ReorderSections {
                section_id, blocks, ..
            } => Command::ReorderContent { section_id, blocks },
            Message::DuplicateSection {
                section_id,
                new_section_id,
            } => Command::DuplicateSection {
                section_id,
                new_section_id,
            },
            Message::Undo {} => Command::Undo,
            Message::Redo {} => Command::Redo,
            _ => return None,
        };
        Some(command)
    }

    /// Global style update for a scope
    pub fn style_update(scope: StyleScope, settings: Settings) -> Self {
        match scope {
            StyleScope::Typography => Message::UpdateTypography { settings },
            StyleScope::Branding => Message::UpdateBranding { settings },
            StyleScope::CustomStyle => Message::UpdateCustomStyle { settings },
        }
    }

    /// Scope and settings of a global style update
    pub fn as_style_update(&self) -> Option<(StyleScope, &Settings)> {
        match self {
            Message::UpdateTypography { settings } => Some((StyleScope::Typography, settings)),
            Message::UpdateBranding { settings } => Some((StyleScope::Branding, settings)),
            Message::UpdateCustomStyle { settings } => Some((StyleScope::CustomStyle, settings)),
            _ => None,
        }
    }
}

/// One message on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub origin: Origin,

    #[serde(default)]
    pub revision: u64,

    #[serde(flatten)]
    pub message: Message,
}

impl Envelope {
    pub fn new(origin: Origin, revision: u64, message: Message) -> Self {
        Self {
            origin,
            revision,
            message,
        }
    }

    pub fn encode(&self) -> Result<String, BridgeError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(raw: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_wire_shape() {
        let mut updates = Settings::new();
        updates.insert("title".into(), json!("Hi"));

        let envelope = Envelope::new(
            Origin::editor("ed-1"),
            4,
            Message::UpdateSection {
                section_id: "s1".into(),
                updates,
            },
        );

        let value: Value = serde_json::from_str(&envelope.encode().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "origin": { "context": "editor", "session": "ed-1" },
                "revision": 4,
                "type": "UPDATE_SECTION",
                "payload": { "sectionId": "s1", "updates": { "title": "Hi" } }
            })
        );
    }

    #[test]
    fn test_decode_empty_payload_variants() {
        let raw = r#"{"origin":{"context":"editor","session":"a"},"revision":2,"type":"UNDO","payload":{}}"#;
        let envelope = Envelope::decode(raw).unwrap();
        assert_eq!(envelope.message, Message::Undo {});
        assert_eq!(envelope.message.to_command(), Some(Command::Undo));
    }

    #[test]
    fn test_select_section_accepts_null() {
        let raw = r#"{"origin":{"context":"editor","session":"a"},"type":"SELECT_SECTION","payload":{"sectionId":null}}"#;
        let envelope = Envelope::decode(raw).unwrap();
        assert_eq!(envelope.revision, 0);
        assert_eq!(envelope.message, Message::SelectSection { section_id: None });
    }

    #[test]
    fn test_unknown_tag_is_an_error() {
        let raw = r#"{"origin":{"context":"editor","session":"a"},"type":"LAUNCH_ROCKETS","payload":{}}"#;
        assert!(Envelope::decode(raw).is_err());
    }

    #[test]
    fn test_commands_map_to_tags() {
        let command = Command::ToggleVisibility {
            section_id: "s1".into(),
            is_visible: false,
        };
        let message = Message::from_command(&command);

        assert_eq!(message.tag(), "TOGGLE_SECTION_VISIBILITY");
        assert_eq!(message.to_command(), Some(command));
        assert_eq!(Message::ResyncRequest {}.to_command(), None);
    }

    #[test]
    fn test_style_updates_by_scope() {
        let message = Message::style_update(StyleScope::Branding, Settings::new());
        assert_eq!(message.tag(), "UPDATE_BRANDING");
        assert_eq!(
            message.as_style_update().map(|(scope, _)| scope),
            Some(StyleScope::Branding)
        );
    }

    #[test]
    fn test_unknown_action_tolerated() {
        let action: Action = serde_json::from_value(json!("REPAINT")).unwrap();
        assert_eq!(action, Action::Unknown);
    }
}
