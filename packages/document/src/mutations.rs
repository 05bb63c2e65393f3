//! # Commands
//!
//! Operations on a [`Document`], applied identically by the editor and the
//! preview mirror.
//!
//! ## Command Semantics
//!
//! ### UpdateSection
//! - Shallow merge per top-level settings key; other keys are kept
//! - A boolean `isVisible` in the update also sets the visibility flag
//!
//! ### AddSection / DuplicateSection
//! - Index is clamped to the document length
//! - An id that already exists is rejected, so ids stay unique
//!
//! ### MoveSection
//! - Swaps with the neighbour; moving past either end is a no-op
//!
//! Every failure mode is a [`NoOp`]: the reducer absorbs it and leaves the
//! state untouched.

use crate::section::{Document, Section, SectionId, Settings};
use crate::{BLOCKS_KEY, VISIBILITY_KEY};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Reducer input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    /// Replace the whole document
    SetDocument { sections: Vec<Section> },

    /// Merge settings into a section
    UpdateSection {
        section_id: SectionId,
        updates: Settings,
    },

    /// Insert a section at `index`, or append
    AddSection {
        section: Section,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    DeleteSection { section_id: SectionId },

    /// Swap a section with its neighbour
    MoveSection {
        section_id: SectionId,
        direction: Direction,
    },

    ToggleVisibility {
        section_id: SectionId,
        is_visible: bool,
    },

    /// Replace a section's ordered content blocks
    ReorderContent {
        section_id: SectionId,
        blocks: Vec<Value>,
    },

    /// Copy a section directly after itself under a caller-chosen id
    DuplicateSection {
        section_id: SectionId,
        new_section_id: SectionId,
    },

    Undo,
    Redo,
}

/// Why a command left the document unchanged
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NoOp {
    #[error("Section not found: {0}")]
    SectionNotFound(SectionId),

    #[error("Section id already in use: {0}")]
    DuplicateId(SectionId),

    #[error("Cannot move {0} past the end of the document")]
    OutOfBounds(SectionId),

    #[error("History commands do not edit the document directly")]
    HistoryCommand,
}

impl Command {
    /// Whether this command creates a new history entry when it changes the document
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Command::Undo | Command::Redo)
    }

    /// Section this command targets, if any
    pub fn section_id(&self) -> Option<&SectionId> {
        match self {
            Command::UpdateSection { section_id, .. }
            | Command::DeleteSection { section_id }
            | Command::MoveSection { section_id, .. }
            | Command::ToggleVisibility { section_id, .. }
            | Command::ReorderContent { section_id, .. }
            | Command::DuplicateSection { section_id, .. } => Some(section_id),
            Command::AddSection { section, .. } => Some(&section.id),
            Command::SetDocument { .. } | Command::Undo | Command::Redo => None,
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetDocument { .. } => "set_document",
            Command::UpdateSection { .. } => "update_section",
            Command::AddSection { .. } => "add_section",
            Command::DeleteSection { .. } => "delete_section",
            Command::MoveSection { .. } => "move_section",
            Command::ToggleVisibility { .. } => "toggle_visibility",
            Command::ReorderContent { .. } => "reorder_content",
            Command::DuplicateSection { .. } => "duplicate_section",
            Command::Undo => "undo",
            Command::Redo => "redo",
        }
    }

    /// Apply a document-level command in place
    ///
    /// On `Err` the document is left exactly as it was.
    pub fn apply(&self, doc: &mut Document) -> Result<(), NoOp> {
        match self {
            Command::SetDocument { sections } => {
                Self::apply_set(doc, sections);
                Ok(())
            }

            Command::UpdateSection { section_id, updates } => {
                Self::apply_update(doc, section_id, updates)
            }

            Command::AddSection { section, index } => Self::apply_add(doc, section, *index),

            Command::DeleteSection { section_id } => {
                let pos = Self::find(doc, section_id)?;
                doc.sections_mut().remove(pos);
                Ok(())
            }

            Command::MoveSection { section_id, direction } => {
                Self::apply_move(doc, section_id, *direction)
            }

            Command::ToggleVisibility { section_id, is_visible } => {
                let section = doc
                    .get_mut(section_id)
                    .ok_or_else(|| NoOp::SectionNotFound(section_id.clone()))?;
                section.is_visible = *is_visible;
                section
                    .settings_mut()
                    .insert(VISIBILITY_KEY.to_string(), Value::Bool(*is_visible));
                Ok(())
            }

            Command::ReorderContent { section_id, blocks } => {
                let section = doc
                    .get_mut(section_id)
                    .ok_or_else(|| NoOp::SectionNotFound(section_id.clone()))?;
                section
                    .settings_mut()
                    .insert(BLOCKS_KEY.to_string(), Value::Array(blocks.clone()));
                Ok(())
            }

            Command::DuplicateSection { section_id, new_section_id } => {
                Self::apply_duplicate(doc, section_id, new_section_id)
            }

            Command::Undo | Command::Redo => Err(NoOp::HistoryCommand),
        }
    }

    fn find(doc: &Document, section_id: &SectionId) -> Result<usize, NoOp> {
        doc.position(section_id)
            .ok_or_else(|| NoOp::SectionNotFound(section_id.clone()))
    }

    fn apply_set(doc: &mut Document, sections: &[Section]) {
        *doc = Document::deduplicated(sections.iter().cloned());
    }

    fn apply_update(doc: &mut Document, section_id: &SectionId, updates: &Settings) -> Result<(), NoOp> {
        let section = doc
            .get_mut(section_id)
            .ok_or_else(|| NoOp::SectionNotFound(section_id.clone()))?;

        if let Some(Value::Bool(visible)) = updates.get(VISIBILITY_KEY) {
            section.is_visible = *visible;
        }

        let settings = section.settings_mut();
        for (key, value) in updates {
            settings.insert(key.clone(), value.clone());
        }

        Ok(())
    }

    fn apply_add(doc: &mut Document, section: &Section, index: Option<usize>) -> Result<(), NoOp> {
        if doc.contains(&section.id) {
            return Err(NoOp::DuplicateId(section.id.clone()));
        }

        let sections = doc.sections_mut();
        let insert_index = index.unwrap_or(sections.len()).min(sections.len());
        sections.insert(insert_index, section.clone());
        Ok(())
    }

    fn apply_move(doc: &mut Document, section_id: &SectionId, direction: Direction) -> Result<(), NoOp> {
        let pos = Self::find(doc, section_id)?;
        let sections = doc.sections_mut();

        let target = match direction {
            Direction::Up if pos > 0 => pos - 1,
            Direction::Down if pos + 1 < sections.len() => pos + 1,
            _ => return Err(NoOp::OutOfBounds(section_id.clone())),
        };

        sections.swap(pos, target);
        Ok(())
    }

    fn apply_duplicate(
        doc: &mut Document,
        section_id: &SectionId,
        new_section_id: &SectionId,
    ) -> Result<(), NoOp> {
        if doc.contains(new_section_id) {
            return Err(NoOp::DuplicateId(new_section_id.clone()));
        }

        let pos = Self::find(doc, section_id)?;
        let mut copy = doc.sections()[pos].clone();
        copy.id = new_section_id.clone();
        doc.sections_mut().insert(pos + 1, copy);
        Ok(())
    }
}
