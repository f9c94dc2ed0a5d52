//! What a session hands back to its caller.

use crate::bounding::BoundedOutput;
use crate::error::{AgentError, GatewayError};
use crate::gateway::ExecutionOutcome;
use crate::tokens::UsageTotals;
use std::fmt;

/// Why a session ended without a usable result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The tool executable is missing. `detail` is the fixed not-found text.
    ToolNotInstalled { detail: String },
    /// `<tool> -h` could not be read.
    HelpUnavailable { stderr: String },
    /// The model backend failed after retries (or fatally).
    BackendUnavailable { detail: String },
    /// The turn budget ran out before a final command.
    InteractionExhausted { turns: usize },
    /// The model replied with an explicit error instead of a command.
    ModelDeclined { reason: String },
    /// The final command did not exit cleanly.
    CommandFailed {
        exit_code: Option<i32>,
        stderr: String,
    },
}

impl FailureReason {
    /// Last tool stderr carried by this failure, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::HelpUnavailable { stderr } | Self::CommandFailed { stderr, .. } => {
                Some(stderr.as_str())
            }
            _ => None,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToolNotInstalled { detail } => write!(f, "tool not installed: {detail}"),
            Self::HelpUnavailable { stderr } => {
                write!(f, "could not read the tool's help output: {stderr}")
            }
            Self::BackendUnavailable { detail } => write!(f, "model backend unavailable: {detail}"),
            Self::InteractionExhausted { turns } => write!(
                f,
                "interaction exhausted: no final command after {turns} turn(s)"
            ),
            Self::ModelDeclined { reason } => write!(f, "model could not build a command: {reason}"),
            Self::CommandFailed {
                exit_code: Some(code),
                stderr,
            } => write!(f, "command failed with exit code {code}: {stderr}"),
            Self::CommandFailed {
                exit_code: None,
                stderr,
            } => write!(f, "command failed: {stderr}"),
        }
    }
}

impl From<AgentError> for FailureReason {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Api(e) => Self::BackendUnavailable {
                detail: e.to_string(),
            },
            AgentError::Gateway(e @ GatewayError::NotInstalled(_)) => Self::ToolNotInstalled {
                detail: e.to_string(),
            },
            AgentError::Gateway(e) => Self::HelpUnavailable {
                stderr: e.to_string(),
            },
            AgentError::HelpUnavailable(stderr) => Self::HelpUnavailable { stderr },
        }
    }
}

/// Result of one session, including partial progress on failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub final_command: Option<String>,
    pub execution: Option<ExecutionOutcome>,
    pub bounded_output: Option<BoundedOutput>,
    /// Output budget applied to the final command.
    pub truncation_limit: Option<usize>,
    pub synthesized_answer: Option<String>,
    /// Totals across command synthesis and answer synthesis.
    pub tokens_used: UsageTotals,
    pub turns_used: usize,
    pub capability_calls: usize,
    pub failure: Option<FailureReason>,
}

impl SessionReport {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    pub(super) fn fail(mut self, reason: impl Into<FailureReason>) -> Self {
        let reason = reason.into();
        tracing::warn!(reason = %reason, "session failed");
        self.failure = Some(reason);
        self
    }

    /// The text a user should see: the answer, else the bounded raw output.
    pub fn presented_text(&self) -> Option<&str> {
        self.synthesized_answer
            .as_deref()
            .or_else(|| self.bounded_output.as_ref().map(|b| b.text.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn agent_errors_map_to_failure_reasons() {
        let backend = FailureReason::from(AgentError::Api(ApiError::Status {
            code: 503,
            body: "overloaded".into(),
        }));
        assert!(matches!(backend, FailureReason::BackendUnavailable { .. }));

        let missing = FailureReason::from(AgentError::Gateway(GatewayError::NotInstalled(
            "xsv".into(),
        )));
        assert!(missing.to_string().contains("'xsv' command not found"));

        let timeout = FailureReason::from(AgentError::Gateway(GatewayError::TimedOut(
            "xsv -h after 5s".into(),
        )));
        assert_eq!(timeout.stderr(), Some("tool timed out: xsv -h after 5s"));
    }

    #[test]
    fn failures_render_human_readable_reasons() {
        let exhausted = FailureReason::InteractionExhausted { turns: 3 };
        assert!(exhausted.to_string().contains("after 3 turn(s)"));
        let failed = FailureReason::CommandFailed {
            exit_code: Some(1),
            stderr: "no such column".into(),
        };
        assert_eq!(
            failed.to_string(),
            "command failed with exit code 1: no such column"
        );
    }

    #[test]
    fn presented_text_falls_back_to_raw_output() {
        let mut report = SessionReport {
            bounded_output: Some(BoundedOutput {
                text: "42".into(),
                limit: 4000,
                truncated: false,
            }),
            ..SessionReport::default()
        };
        assert_eq!(report.presented_text(), Some("42"));
        report.synthesized_answer = Some("There are 42 rows.".into());
        assert_eq!(report.presented_text(), Some("There are 42 rows."));
    }
}
