//! Per-request conversation state.

use crate::tokens::UsageTotals;
use crate::types::{Message, Role, Usage};

/// Message history, turn budget and token totals for one session.
///
/// Messages are append-only. Capability results are only accepted when they
/// answer a call from the assistant message directly before them.
#[derive(Debug)]
pub struct Session {
    messages: Vec<Message>,
    turns_used: usize,
    turn_limit: usize,
    usage: UsageTotals,
    capability_calls: usize,
}

impl Session {
    pub fn new(system_prompt: String, user_request: String, turn_limit: usize) -> Self {
        Self {
            messages: vec![Message::system(system_prompt), Message::user(user_request)],
            turns_used: 0,
            turn_limit,
            usage: UsageTotals::new(),
            capability_calls: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn turns_used(&self) -> usize {
        self.turns_used
    }

    pub fn turn_limit(&self) -> usize {
        self.turn_limit
    }

    pub fn usage(&self) -> UsageTotals {
        self.usage
    }

    /// Number of capability results accepted into the history.
    pub fn capability_calls(&self) -> usize {
        self.capability_calls
    }

    /// Claim the next turn. Returns false once the budget is spent.
    pub fn begin_turn(&mut self) -> bool {
        if self.turns_used >= self.turn_limit {
            return false;
        }
        self.turns_used += 1;
        true
    }

    pub fn record_usage(&mut self, usage: Option<&Usage>) {
        self.usage.record(usage);
    }

    pub fn push_assistant(&mut self, message: Message) {
        debug_assert_eq!(message.role, Role::Assistant);
        self.messages.push(message);
    }

    pub fn push_user(&mut self, content: String) {
        self.messages.push(Message::user(content));
    }

    /// Append a tool-role result for `call_id`.
    ///
    /// Dropped (returning false) unless the nearest non-tool message is an
    /// assistant message that issued `call_id` and it has not been answered.
    pub fn push_capability_result(&mut self, call_id: &str, content: String) -> bool {
        let trailing_results = self
            .messages
            .iter()
            .rev()
            .take_while(|m| m.role == Role::Tool)
            .count();
        let anchor = self.messages.len() - trailing_results;
        let issued = anchor
            .checked_sub(1)
            .map(|i| &self.messages[i])
            .filter(|m| m.role == Role::Assistant)
            .is_some_and(|m| m.call_ids().any(|id| id == call_id));
        let answered = self.messages[anchor..]
            .iter()
            .any(|m| m.responding_to.as_deref() == Some(call_id));

        if !issued || answered {
            tracing::warn!(call_id, "dropping uncorrelated capability result");
            return false;
        }
        self.messages
            .push(Message::capability_result(call_id, content));
        self.capability_calls += 1;
        true
    }
}
