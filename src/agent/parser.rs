//! Pure interpretation of one model reply.
//!
//! No I/O happens here. The orchestrator hands over the assistant message and
//! gets back exactly one [`ParsedReply`].

use crate::capability::Capability;
use crate::types::{CapabilityCall, Message};
use serde_json::Value;

/// What a single model reply asks the session to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedReply {
    /// One or more registered capability calls, passed through verbatim.
    CapabilityCalls(Vec<CapabilityCall>),
    /// A final tool command.
    FinalCommand {
        command: String,
        /// Output budget the model asked for, unclamped.
        preferred_limit: Option<i64>,
    },
    /// The model explicitly declined to produce a command.
    Declined(String),
    /// Nothing usable; `reason` feeds the corrective prompt and logs.
    Malformed(String),
}

/// Interpret an assistant message.
///
/// Capability calls take precedence over any text in the same message.
pub fn parse_reply(message: &Message) -> ParsedReply {
    if let Some(calls) = message.capability_calls.as_ref().filter(|c| !c.is_empty()) {
        if let Some(bad) = calls.iter().find(|c| !Capability::is_registered(c.name())) {
            return ParsedReply::Malformed(format!("unknown capability `{}`", bad.name()));
        }
        return ParsedReply::CapabilityCalls(calls.clone());
    }
    parse_text(message.content.as_deref().unwrap_or(""))
}

/// Interpret textual content as a final answer.
pub fn parse_text(raw: &str) -> ParsedReply {
    let text = strip_code_fence(raw).trim();
    if text.is_empty() {
        return ParsedReply::Malformed("empty reply".to_string());
    }
    if !text.starts_with('{') {
        return ParsedReply::FinalCommand {
            command: text.to_string(),
            preferred_limit: None,
        };
    }

    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => return ParsedReply::Malformed(format!("invalid JSON: {e}")),
    };
    let Some(object) = value.as_object() else {
        return ParsedReply::Malformed("expected a JSON object".to_string());
    };

    let command = object
        .get("command")
        .or_else(|| object.get("xsv_command"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|c| !c.is_empty());
    if let Some(command) = command {
        return ParsedReply::FinalCommand {
            command: command.to_string(),
            preferred_limit: object
                .get("preferred_output_truncation_length")
                .and_then(Value::as_i64),
        };
    }

    if let Some(reason) = object.get("error") {
        let reason = match reason {
            Value::String(s) => s.trim().to_string(),
            other => other.to_string(),
        };
        return ParsedReply::Declined(reason);
    }

    ParsedReply::Malformed("JSON object has neither `command` nor `error`".to_string())
}

/// Remove one surrounding fenced-code wrapper, if present.
///
/// The opening fence line may carry a language tag (```` ```json ````). Text
/// that is not fully wrapped is returned unchanged.
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some(after_open) = text.strip_prefix("```") else {
        return raw;
    };
    let Some(newline) = after_open.find('\n') else {
        return raw;
    };
    let tag = &after_open[..newline];
    if tag.contains('`') || tag.trim().contains(char::is_whitespace) {
        return raw;
    }
    let body = &after_open[newline + 1..];
    let Some(inner) = body.trim_end().strip_suffix("```") else {
        return raw;
    };
    if !(inner.is_empty() || inner.ends_with('\n')) {
        return raw;
    }
    inner.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::FETCH_SUBCOMMAND_HELP;

    fn text(content: &str) -> Message {
        Message::assistant(Some(content.to_string()), Vec::new())
    }

    fn command(cmd: &str) -> ParsedReply {
        ParsedReply::FinalCommand {
            command: cmd.to_string(),
            preferred_limit: None,
        }
    }

    #[test]
    fn plain_text_is_a_final_command() {
        assert_eq!(parse_reply(&text("count a.csv\n")), command("count a.csv"));
    }

    #[test]
    fn fenced_text_is_unwrapped() {
        assert_eq!(
            parse_reply(&text("```bash\nxsv count a.csv\n```")),
            command("xsv count a.csv")
        );
        assert_eq!(
            parse_reply(&text("```\ncount a.csv\n```\n")),
            command("count a.csv")
        );
    }

    #[test]
    fn fenced_json_command_carries_limit() {
        let reply = "```json\n{\"xsv_command\": \"xsv stats a.csv\", \"preferred_output_truncation_length\": 2000}\n```";
        assert_eq!(
            parse_reply(&text(reply)),
            ParsedReply::FinalCommand {
                command: "xsv stats a.csv".into(),
                preferred_limit: Some(2000),
            }
        );
    }

    #[test]
    fn non_integer_limit_is_ignored() {
        let reply = r#"{"command": "count a.csv", "preferred_output_truncation_length": "lots"}"#;
        assert_eq!(parse_text(reply), command("count a.csv"));
    }

    #[test]
    fn error_object_is_a_decline() {
        assert_eq!(
            parse_text(r#"{"error": "no such column"}"#),
            ParsedReply::Declined("no such column".into())
        );
    }

    #[test]
    fn broken_or_keyless_json_is_malformed() {
        assert!(matches!(
            parse_text("{\"command\": \"count a.csv\""),
            ParsedReply::Malformed(_)
        ));
        assert!(matches!(
            parse_text(r#"{"answer": 42}"#),
            ParsedReply::Malformed(_)
        ));
        assert!(matches!(
            parse_text(r#"{"command": "   "}"#),
            ParsedReply::Malformed(_)
        ));
    }

    #[test]
    fn empty_replies_are_malformed() {
        assert!(matches!(parse_text("   \n"), ParsedReply::Malformed(_)));
        assert!(matches!(parse_text("```\n```"), ParsedReply::Malformed(_)));
        let silent = Message::assistant(None, Vec::new());
        assert!(matches!(parse_reply(&silent), ParsedReply::Malformed(_)));
    }

    #[test]
    fn capability_calls_take_precedence_over_text() {
        let call = CapabilityCall::new("c1", FETCH_SUBCOMMAND_HELP, r#"{"subcommand_name":"stats"}"#);
        let msg = Message::assistant(Some("count a.csv".into()), vec![call.clone()]);
        assert_eq!(parse_reply(&msg), ParsedReply::CapabilityCalls(vec![call]));
    }

    #[test]
    fn unknown_capability_is_malformed() {
        let good = CapabilityCall::new("c1", FETCH_SUBCOMMAND_HELP, "{}");
        let bad = CapabilityCall::new("c2", "delete_file", "{}");
        let msg = Message::assistant(None, vec![good, bad]);
        match parse_reply(&msg) {
            ParsedReply::Malformed(reason) => assert!(reason.contains("delete_file")),
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn partial_fences_are_left_alone() {
        assert_eq!(strip_code_fence("```count a.csv```"), "```count a.csv```");
        assert_eq!(strip_code_fence("```bash\ncount a.csv"), "```bash\ncount a.csv");
        assert_eq!(strip_code_fence("count a.csv"), "count a.csv");
    }
}
