//! UI-agnostic conversation state types
//!
//! This module contains data structures that are shared between the chat core
//! and whichever surface renders it, and don't depend on any UI framework.

use serde::{Deserialize, Serialize};

/// One recorded message in the conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    speaker: Speaker,
    text: String,
    sequence_index: u64,
}

impl Turn {
    pub(crate) fn new(speaker: Speaker, text: String, sequence_index: u64) -> Self {
        Self {
            speaker,
            text,
            sequence_index,
        }
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sequence_index(&self) -> u64 {
        self.sequence_index
    }

    /// Render as a single transcript line, e.g. `"User: hi\n"`.
    pub fn to_prompt_line(&self) -> String {
        format!("{}: {}\n", self.speaker.label(), self.text)
    }
}

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    User,
    Bot,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "User",
            Speaker::Bot => "Bot",
        }
    }
}

/// Request lifecycle of the turn controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingState {
    #[default]
    Idle,
    AwaitingResponse,
}

impl PendingState {
    pub fn is_awaiting(&self) -> bool {
        matches!(self, PendingState::AwaitingResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_line_labels() {
        let user = Turn::new(Speaker::User, "hi".to_string(), 0);
        let bot = Turn::new(Speaker::Bot, "hello there".to_string(), 1);
        assert_eq!(user.to_prompt_line(), "User: hi\n");
        assert_eq!(bot.to_prompt_line(), "Bot: hello there\n");
    }

    #[test]
    fn test_pending_state_defaults_to_idle() {
        assert_eq!(PendingState::default(), PendingState::Idle);
        assert!(!PendingState::Idle.is_awaiting());
        assert!(PendingState::AwaitingResponse.is_awaiting());
    }
}
