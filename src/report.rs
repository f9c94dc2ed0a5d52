//! Plain-text session report written by `--output`.

use crate::agent::SessionReport;
use std::fmt::Write as _;
use std::path::Path;

/// Render the report body for `query`.
pub fn render_report(query: &str, report: &SessionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Query: {}", query.trim());
    match &report.final_command {
        Some(command) => {
            let _ = writeln!(out, "Command: {command}");
        }
        None => {
            let _ = writeln!(out, "Command: none");
        }
    }
    if let Some(bounded) = &report.bounded_output {
        let state = if bounded.truncated {
            "truncated"
        } else {
            "not truncated"
        };
        let _ = writeln!(out, "Output limit: {} characters ({state})", bounded.limit);
    }

    if let Some(execution) = &report.execution {
        if execution.stdout.is_empty() {
            let _ = writeln!(out, "\nOutput: none");
        } else if let Some(bounded) = &report.bounded_output {
            let _ = writeln!(out, "\nOutput:\n{}", bounded.text);
        }
        if !execution.stderr.is_empty() {
            let _ = writeln!(out, "\nStderr:\n{}", execution.stderr);
        }
    }

    match (&report.synthesized_answer, &report.failure) {
        (Some(answer), _) => {
            let _ = writeln!(out, "\nAnswer:\n{answer}");
        }
        (None, Some(reason)) => {
            let _ = writeln!(out, "\nFailed: {reason}");
        }
        (None, None) => {
            let _ = writeln!(out, "\nAnswer: not generated");
        }
    }
    let _ = writeln!(out, "\nTokens: {}", report.tokens_used);
    out
}

/// Write the report to `path`.
pub fn write_report(path: &Path, query: &str, report: &SessionReport) -> std::io::Result<()> {
    std::fs::write(path, render_report(query, report))?;
    tracing::info!(path = %path.display(), "session report written");
    Ok(())
}
