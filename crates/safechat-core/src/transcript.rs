//! Append-only conversation log

use crate::state::{Speaker, Turn};

/// Ordered, append-only log of turns for one chat session.
///
/// Turns are numbered from zero with no gaps. There is no way to edit or
/// remove a turn once it has been appended.
#[derive(Debug, Default)]
pub struct TranscriptStore {
    turns: Vec<Turn>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new turn at the end of the log and return it.
    pub fn append(&mut self, speaker: Speaker, text: impl Into<String>) -> Turn {
        let sequence_index = self.turns.len() as u64;
        if let Some(last) = self.turns.last() {
            // A non-increasing index means the log was corrupted by the core itself.
            assert!(
                sequence_index > last.sequence_index(),
                "transcript index went backwards: {} after {}",
                sequence_index,
                last.sequence_index()
            );
        }

        let turn = Turn::new(speaker, text.into(), sequence_index);
        self.turns.push(turn.clone());
        turn
    }

    /// All turns in insertion order
    pub fn all(&self) -> &[Turn] {
        &self.turns
    }
}
