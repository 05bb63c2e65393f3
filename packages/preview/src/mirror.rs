use pagewright_document::{Command, Document, EditorState};

/// What happened to one editor command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOutcome {
    Applied,
    /// Already applied, or older than the mirror
    Duplicate,
    /// At least one command was lost before this one
    Gap { expected: u64, got: u64 },
    /// Applied, but the local reducer ended on a different revision
    Diverged { local: u64, remote: u64 },
}

/// Preview-side copy of the editor's state
///
/// Changes only by replaying editor commands in revision order, or by a
/// wholesale [`restore`](Mirror::restore).
#[derive(Debug, Clone, Default)]
pub struct Mirror {
    state: EditorState,
}

impl Mirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn document(&self) -> &Document {
        self.state.document()
    }

    pub fn revision(&self) -> u64 {
        self.state.revision()
    }

    /// Apply a command the editor announced at `revision`
    pub fn apply(&mut self, revision: u64, command: &Command) -> MirrorOutcome {
        let current = self.state.revision();

        if revision <= current {
            return MirrorOutcome::Duplicate;
        }
        if revision > current + 1 {
            return MirrorOutcome::Gap {
                expected: current + 1,
                got: revision,
            };
        }

        self.state.apply(command);

        if self.state.revision() == revision {
            MirrorOutcome::Applied
        } else {
            MirrorOutcome::Diverged {
                local: self.state.revision(),
                remote: revision,
            }
        }
    }

    /// Replace the mirror wholesale
    ///
    /// A state older than the mirror is a stale or duplicated restore and is
    /// refused; the editor's revision never goes backwards. Returns whether
    /// the state was taken.
    pub fn restore(&mut self, state: EditorState) -> bool {
        if state.revision() < self.state.revision() {
            return false;
        }
        self.state = state;
        true
    }
}
