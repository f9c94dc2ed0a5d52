//! Session-scoped token accounting.
//!
//! Counts come from the backend's `usage` field. A response without usage
//! leaves the totals unchanged.

use crate::types::Usage;
use std::fmt;

/// Running input/output token totals for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageTotals {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl UsageTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one model call's reported usage, if any.
    pub fn record(&mut self, usage: Option<&Usage>) {
        let Some(usage) = usage else {
            tracing::debug!("backend reported no token usage");
            return;
        };
        self.input_tokens = self.input_tokens.saturating_add(usage.prompt_tokens);
        self.output_tokens = self.output_tokens.saturating_add(usage.completion_tokens);
    }

    /// Fold another accumulator (for example the answer-synthesis call) in.
    pub fn absorb(&mut self, other: UsageTotals) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
    }

    pub fn total(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for UsageTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} input / {} output tokens",
            self.input_tokens, self.output_tokens
        )
    }
}
