//! Bounded prompt construction
//!
//! Every request to the provider carries the system instruction followed by as
//! much recent conversation as fits in the [`ContextBudget`]. Turns are picked
//! newest first and emitted oldest first, and are never cut mid-line.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::persona::SYSTEM_INSTRUCTION;
use crate::state::Turn;

/// Default maximum estimated size of the conversation history in a prompt.
pub const DEFAULT_TOKEN_BUDGET: usize = 2000;

/// Cue appended after the history so the model continues as the assistant.
const BOT_CUE: &str = "\nBot:";

/// Maps a line of text to an estimated size in budget units.
///
/// The default is a length heuristic, not a tokenizer. Anything implementing
/// this trait (including a plain closure) can be swapped in.
pub trait SizeEstimator: Send + Sync {
    fn estimate(&self, line: &str) -> usize;
}

impl<F> SizeEstimator for F
where
    F: Fn(&str) -> usize + Send + Sync,
{
    fn estimate(&self, line: &str) -> usize {
        self(line)
    }
}

/// `ceil(chars / 4)`
#[derive(Debug, Clone, Copy, Default)]
pub struct QuarterCharEstimator;

impl SizeEstimator for QuarterCharEstimator {
    fn estimate(&self, line: &str) -> usize {
        line.chars().count().div_ceil(4)
    }
}

#[derive(Clone)]
pub struct ContextBudget {
    pub max_units: usize,
    pub estimator: Arc<dyn SizeEstimator>,
}

impl ContextBudget {
    pub fn new(max_units: usize) -> Self {
        Self {
            max_units,
            estimator: Arc::new(QuarterCharEstimator),
        }
    }

    pub fn with_estimator(mut self, estimator: impl SizeEstimator + 'static) -> Self {
        self.estimator = Arc::new(estimator);
        self
    }
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_BUDGET)
    }
}

impl fmt::Debug for ContextBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextBudget")
            .field("max_units", &self.max_units)
            .finish_non_exhaustive()
    }
}

/// The prompt for one request plus how it was assembled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    pub prompt: String,
    pub included_turns: usize,
    pub dropped_turns: usize,
    pub estimated_units: usize,
}

#[derive(Debug, Clone)]
pub struct ContextWindowBuilder {
    system_instruction: String,
    budget: ContextBudget,
}

impl ContextWindowBuilder {
    pub fn new(system_instruction: impl Into<String>, budget: ContextBudget) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            budget,
        }
    }

    pub fn budget(&self) -> &ContextBudget {
        &self.budget
    }

    /// Build the prompt for the next bot turn from a transcript snapshot.
    pub fn build(&self, turns: &[Turn]) -> ContextWindow {
        let mut lines_newest_first: Vec<String> = Vec::new();
        let mut total: usize = 0;

        for turn in turns.iter().rev() {
            let line = turn.to_prompt_line();
            let size = self.budget.estimator.estimate(&line);
            if total.saturating_add(size) > self.budget.max_units {
                break;
            }
            total += size;
            lines_newest_first.push(line);
        }

        let included_turns = lines_newest_first.len();
        let history: String = lines_newest_first.into_iter().rev().collect();

        let mut prompt = String::with_capacity(
            self.system_instruction.len() + 2 + history.len() + BOT_CUE.len(),
        );
        prompt.push_str(&self.system_instruction);
        prompt.push_str("\n\n");
        prompt.push_str(&history);
        prompt.push_str(BOT_CUE);

        let window = ContextWindow {
            prompt,
            included_turns,
            dropped_turns: turns.len() - included_turns,
            estimated_units: total,
        };

        debug!(
            included = window.included_turns,
            dropped = window.dropped_turns,
            units = window.estimated_units,
            max_units = self.budget.max_units,
            "built context window"
        );

        window
    }
}

impl Default for ContextWindowBuilder {
    fn default() -> Self {
        Self::new(SYSTEM_INSTRUCTION, ContextBudget::default())
    }
}
