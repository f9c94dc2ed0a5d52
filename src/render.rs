//! Terminal presentation of a finished session.
//!
//! Status lines (sections, fields, warnings, token totals) go to stderr.
//! The answer, or the raw output fallback, goes to stdout so it can be piped.

use crate::agent::SessionReport;
use crossterm::style::{Color, Stylize};

const INDENT: &str = "  ";
const LABEL_WARNING: &str = "warning:";
const LABEL_ERROR: &str = "error:";
const GLYPH_SECTION: &str = "•";

/// Colored or plain terminal renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn section(&self, title: &str) {
        eprintln!("{}", self.format_section(title));
    }

    pub fn field(&self, key: &str, value: &str) {
        eprintln!("{}", self.format_field(key, value));
    }

    pub fn warn(&self, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", LABEL_WARNING.with(Color::Yellow).bold());
        } else {
            eprintln!("{LABEL_WARNING} {msg}");
        }
    }

    pub fn error(&self, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", LABEL_ERROR.with(Color::Red).bold());
        } else {
            eprintln!("{LABEL_ERROR} {msg}");
        }
    }

    /// Indented block on stderr (tool output shown alongside an answer).
    pub fn block(&self, text: &str) {
        for line in text.lines() {
            if self.color {
                eprintln!("{INDENT}{}", line.with(Color::DarkGrey));
            } else {
                eprintln!("{INDENT}{line}");
            }
        }
    }

    /// Primary result text on stdout.
    pub fn result(&self, text: &str) {
        println!("{text}");
    }

    fn format_section(&self, title: &str) -> String {
        if self.color {
            format!(
                "{} {}",
                GLYPH_SECTION.with(Color::DarkCyan),
                title.with(Color::Cyan).bold()
            )
        } else {
            format!("{title}:")
        }
    }

    fn format_field(&self, key: &str, value: &str) -> String {
        if self.color {
            format!(
                "{INDENT}{} {}",
                format!("{key}:").with(Color::DarkGrey),
                value.with(Color::White)
            )
        } else {
            format!("{INDENT}{key}: {value}")
        }
    }
}

/// Print everything a user should see about `report`.
///
/// `answer_enabled` is false when answer synthesis was switched off, in which
/// case raw output is the expected result and no fallback warning is shown.
pub fn present_report(
    renderer: &Renderer,
    report: &SessionReport,
    answer_enabled: bool,
    show_tokens: bool,
) {
    if let Some(command) = &report.final_command {
        renderer.section("Command");
        renderer.field("run", command);
        if let Some(limit) = report.truncation_limit {
            renderer.field("output limit", &format!("{limit} characters"));
        }
    }

    if let Some(execution) = &report.execution {
        if let Some(bounded) = &report.bounded_output {
            if !bounded.text.is_empty() && report.synthesized_answer.is_some() {
                renderer.section("Tool output");
                renderer.block(&bounded.text);
            }
            if bounded.truncated {
                renderer.warn(&format!(
                    "output was truncated at {} characters",
                    bounded.limit
                ));
            }
        }
        if !execution.stderr.is_empty() {
            renderer.section("Tool stderr");
            renderer.block(&execution.stderr);
        }
    }

    match &report.failure {
        Some(reason) => renderer.error(&reason.to_string()),
        None => {
            if answer_enabled && report.synthesized_answer.is_none() {
                renderer.warn("no answer was synthesized; showing raw tool output");
            }
            if let Some(text) = report.presented_text() {
                renderer.result(text);
            }
        }
    }

    if show_tokens && !report.tokens_used.is_empty() {
        renderer.section("Usage");
        renderer.field("tokens", &report.tokens_used.to_string());
    }
}
