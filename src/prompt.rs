//! Prompt templating for command synthesis and answer synthesis.
//!
//! The built-in prompt text lives in template files; runtime values are
//! substituted in a single pass so user text can never expand a placeholder.

use crate::bounding::{MIN_OUTPUT_CHARS, TRUNCATION_MARKER};
use crate::capability::FETCH_SUBCOMMAND_HELP;
use std::collections::BTreeMap;
use std::path::Path;

const COMMAND_PROMPT_TEMPLATE: &str = include_str!("templates/command_prompt.template");
const ANSWER_PROMPT_TEMPLATE: &str = include_str!("templates/answer_prompt.template");

/// Inputs for the command-synthesis system prompt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandPromptParams<'a> {
    pub tool: &'a str,
    pub file_path: &'a str,
    pub delimiter: char,
    pub main_help: &'a str,
    pub default_limit: usize,
    pub max_limit: usize,
}

/// Render the command-synthesis system prompt.
pub fn render_command_prompt(params: &CommandPromptParams<'_>) -> String {
    let mut vars = BTreeMap::<&str, String>::new();
    vars.insert("TOOL", params.tool.to_string());
    vars.insert("FILE_NAME", file_name(params.file_path).to_string());
    vars.insert("FILE_PATH", params.file_path.to_string());
    vars.insert("DELIMITER", describe_delimiter(params.delimiter));
    vars.insert(
        "DELIMITER_NOTE",
        render_delimiter_note(params.tool, params.delimiter),
    );
    vars.insert("CAPABILITY", FETCH_SUBCOMMAND_HELP.to_string());
    vars.insert("DEFAULT_LIMIT", params.default_limit.to_string());
    vars.insert("MAX_LIMIT", params.max_limit.to_string());
    vars.insert("MIN_LIMIT", MIN_OUTPUT_CHARS.min(params.max_limit).to_string());
    vars.insert("MARKER", TRUNCATION_MARKER.to_string());
    vars.insert("MAIN_HELP", params.main_help.trim().to_string());
    render_template(COMMAND_PROMPT_TEMPLATE, &vars)
}

/// First user message of a session.
pub fn render_initial_request(query: &str, file_path: &str, delimiter: char) -> String {
    format!(
        "User query: \"{}\"\nFile to analyze: '{file_path}'\nEffective delimiter to use: '{}'",
        query.trim(),
        describe_delimiter(delimiter)
    )
}

/// Corrective user message after a reply that could not be interpreted.
pub fn render_correction(reason: &str) -> String {
    format!(
        "Your previous reply could not be used ({reason}). Reply with ONLY a JSON object of the form \
         {{\"command\": \"<full command>\", \"preferred_output_truncation_length\": <optional integer>}}, \
         or {{\"error\": \"<why no command is possible>\"}}, or call `{FETCH_SUBCOMMAND_HELP}` \
         if you need subcommand help. Do not wrap the JSON in code fences."
    )
}

/// Inputs for the answer-synthesis system prompt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AnswerPromptParams<'a> {
    pub tool: &'a str,
    pub query: &'a str,
    pub file_path: &'a str,
    /// Budget the output was truncated at, if it was.
    pub truncated_at: Option<usize>,
}

/// Render the answer-synthesis system prompt.
pub fn render_answer_prompt(params: &AnswerPromptParams<'_>) -> String {
    let mut vars = BTreeMap::<&str, String>::new();
    vars.insert("TOOL", params.tool.to_string());
    vars.insert("QUERY", params.query.trim().to_string());
    vars.insert("FILE_NAME", file_name(params.file_path).to_string());
    vars.insert("MARKER", TRUNCATION_MARKER.to_string());
    vars.insert(
        "TRUNCATION_NOTE",
        params
            .truncated_at
            .map(|limit| format!("Note: the command output was truncated at {limit} characters."))
            .unwrap_or_default(),
    );
    render_template(ANSWER_PROMPT_TEMPLATE, &vars)
}

/// User message carrying the bounded command output.
pub fn render_answer_input(tool: &str, output: &str) -> String {
    format!("{tool} command output:\n\n{output}")
}

/// Printable form of a delimiter (`\t` for tab).
pub fn describe_delimiter(delimiter: char) -> String {
    match delimiter {
        '\t' => "\\t".to_string(),
        other => other.to_string(),
    }
}

fn render_delimiter_note(tool: &str, delimiter: char) -> String {
    if delimiter == ',' {
        format!("  This is a comma, which `{tool}` uses by default, so do not pass `-d`.")
    } else {
        format!(
            "  You MUST pass `-d '{}'` to every `{tool}` subcommand that reads the file.",
            describe_delimiter(delimiter)
        )
    }
}

fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

/// Substitute `{{NAME}}` placeholders in one left-to-right pass.
fn render_template(template: &str, vars: &BTreeMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) if vars.contains_key(&after[..end]) => {
                out.push_str(&vars[&after[..end]]);
                rest = &after[end + 2..];
            }
            _ => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command_params(delimiter: char) -> CommandPromptParams<'static> {
        CommandPromptParams {
            tool: "xsv",
            file_path: "/data/sales.csv",
            delimiter,
            main_help: "Usage: xsv <command> [<args>...]\n",
            default_limit: 4000,
            max_limit: 10000,
        }
    }

    #[test]
    fn command_prompt_embeds_help_and_limits() {
        let prompt = render_command_prompt(&command_params(','));
        assert!(prompt.contains("Usage: xsv <command> [<args>...]"));
        assert!(prompt.contains("'sales.csv'"));
        assert!(prompt.contains("'/data/sales.csv'"));
        assert!(prompt.contains("Default budget: 4000 characters"));
        assert!(prompt.contains("between 100 and 10000"));
        assert!(prompt.contains(TRUNCATION_MARKER));
        assert!(prompt.contains(FETCH_SUBCOMMAND_HELP));
        assert!(prompt.contains("do not pass `-d`"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn command_prompt_requires_explicit_non_comma_delimiter() {
        let prompt = render_command_prompt(&command_params('\t'));
        assert!(prompt.contains("Detected delimiter: '\\t'"));
        assert!(prompt.contains("You MUST pass `-d '\\t'`"));
    }

    #[test]
    fn placeholders_inside_values_are_not_expanded() {
        let mut params = command_params(',');
        params.main_help = "literal {{TOOL}} stays";
        let prompt = render_command_prompt(&params);
        assert!(prompt.contains("literal {{TOOL}} stays"));
    }

    #[test]
    fn answer_prompt_mentions_truncation_only_when_cut() {
        let mut params = AnswerPromptParams {
            tool: "xsv",
            query: "how many rows?",
            file_path: "a.csv",
            truncated_at: None,
        };
        let plain = render_answer_prompt(&params);
        assert!(plain.contains("\"how many rows?\""));
        assert!(!plain.contains("was truncated at"));

        params.truncated_at = Some(4000);
        assert!(render_answer_prompt(&params).contains("truncated at 4000 characters"));
    }

    #[test]
    fn initial_request_and_correction_name_the_shape() {
        let request = render_initial_request(" count rows ", "a.csv", '|');
        assert_eq!(
            request,
            "User query: \"count rows\"\nFile to analyze: 'a.csv'\nEffective delimiter to use: '|'"
        );
        let correction = render_correction("invalid JSON");
        assert!(correction.contains("(invalid JSON)"));
        assert!(correction.contains("\"command\""));
        assert!(correction.contains("\"error\""));
    }
}
