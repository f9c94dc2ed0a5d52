//! Command-synthesis loop and session driver.
//!
//! [`run_session`] takes one natural-language query through the whole
//! pipeline: read the tool's top-level help, let the model iterate (calling
//! the help capability as needed) until it commits to a command, run that
//! command, bound its output and optionally turn it into an answer. Every
//! model call and subprocess is awaited in order; nothing runs concurrently.

use crate::api::ModelClient;
use crate::bounding::{bound_output, effective_limit};
use crate::capability::{self, Capability};
use crate::config::Config;
use crate::error::{AgentError, GatewayError};
use crate::gateway::ToolGateway;
use crate::prompt::{
    render_command_prompt, render_correction, render_initial_request, CommandPromptParams,
};
use crate::types::{CapabilityCall, ChatRequest, Message};
use std::path::Path;

mod outcome;
pub mod parser;
mod session;
mod synthesis;

pub use outcome::{FailureReason, SessionReport};
pub use parser::ParsedReply;
pub use session::Session;
pub use synthesis::{synthesize_answer, Synthesis, NO_DATA_ANSWER};

/// Model and budget settings shared by every session of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub model: String,
    /// Tool name as the model should write it (file name of the program).
    pub tool_name: String,
    pub temperature: Option<f64>,
    pub command_max_tokens: Option<u32>,
    pub answer_max_tokens: Option<u32>,
    pub synthesize_answer: bool,
    /// Ceiling for model-requested output budgets.
    pub max_output_chars: usize,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        let tool_name = Path::new(&config.tool.program)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&config.tool.program)
            .to_string();
        Self {
            model: config.api.model.clone(),
            tool_name,
            temperature: config.agent.temperature,
            command_max_tokens: config.agent.command_max_tokens,
            answer_max_tokens: config.agent.answer_max_tokens,
            synthesize_answer: config.agent.synthesize_answer,
            max_output_chars: config.output.max_char_limit,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// One user query against one prepared file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    pub query: String,
    /// Passed through to the tool; never opened here.
    pub file_path: String,
    pub delimiter: char,
    pub turn_limit: usize,
    /// Default output budget, unless the model asks for another.
    pub output_char_limit: usize,
}

/// How the command-synthesis loop ended without an error.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LoopOutcome {
    Command {
        command: String,
        preferred_limit: Option<i64>,
    },
    Declined(String),
    Exhausted,
}

/// Run one query end to end.
///
/// Never returns an error: failures land in [`SessionReport::failure`] along
/// with whatever progress (tokens, command, tool output) was made.
pub async fn run_session(
    client: &dyn ModelClient,
    gateway: &ToolGateway,
    settings: &SessionSettings,
    request: &SessionRequest,
) -> SessionReport {
    let report = SessionReport::default();

    let main_help = match fetch_main_help(gateway).await {
        Ok(help) => help,
        Err(e) => return report.fail(e),
    };

    let system_prompt = render_command_prompt(&CommandPromptParams {
        tool: &settings.tool_name,
        file_path: &request.file_path,
        delimiter: request.delimiter,
        main_help: &main_help,
        default_limit: request.output_char_limit,
        max_limit: settings.max_output_chars,
    });
    let mut session = Session::new(
        system_prompt,
        render_initial_request(&request.query, &request.file_path, request.delimiter),
        request.turn_limit,
    );

    let looped = command_loop(client, gateway, settings, &mut session).await;
    let mut report = SessionReport {
        tokens_used: session.usage(),
        turns_used: session.turns_used(),
        capability_calls: session.capability_calls(),
        ..report
    };

    let (command, preferred_limit) = match looped {
        Ok(LoopOutcome::Command {
            command,
            preferred_limit,
        }) => (command, preferred_limit),
        Ok(LoopOutcome::Declined(reason)) => {
            return report.fail(FailureReason::ModelDeclined { reason })
        }
        Ok(LoopOutcome::Exhausted) => {
            return report.fail(FailureReason::InteractionExhausted {
                turns: session.turns_used(),
            })
        }
        Err(e) => return report.fail(e),
    };

    let limit = effective_limit(
        request.output_char_limit,
        preferred_limit,
        settings.max_output_chars,
    );
    report.final_command = Some(command.clone());
    report.truncation_limit = Some(limit);

    let execution = match gateway.run_command(&command).await {
        Ok(execution) => execution,
        Err(e) => {
            return report.fail(FailureReason::CommandFailed {
                exit_code: None,
                stderr: e.to_string(),
            })
        }
    };
    let bounded = bound_output(&execution.stdout, limit);
    let succeeded = execution.succeeded;
    let failure = (!succeeded).then(|| FailureReason::CommandFailed {
        exit_code: execution.exit_code,
        stderr: execution.failure_detail(),
    });
    report.execution = Some(execution);
    report.bounded_output = Some(bounded);
    if let Some(failure) = failure {
        return report.fail(failure);
    }

    if settings.synthesize_answer {
        if let Some(bounded) = report.bounded_output.as_ref() {
            let synthesis =
                synthesize_answer(client, settings, &request.query, &request.file_path, bounded)
                    .await;
            report.tokens_used.absorb(synthesis.usage);
            report.synthesized_answer = synthesis.answer;
        }
    }

    tracing::info!(tokens = %report.tokens_used, turns = report.turns_used, "session complete");
    report
}

async fn fetch_main_help(gateway: &ToolGateway) -> Result<String, AgentError> {
    let outcome = gateway.main_help().await?;
    if outcome.is_not_installed() {
        return Err(GatewayError::NotInstalled(gateway.program().to_string()).into());
    }
    if !outcome.succeeded {
        return Err(AgentError::HelpUnavailable(outcome.failure_detail()));
    }
    Ok(if outcome.stdout.is_empty() {
        outcome.stderr
    } else {
        outcome.stdout
    })
}

/// Drive model turns until a final command, a decline, or the turn budget.
async fn command_loop(
    client: &dyn ModelClient,
    gateway: &ToolGateway,
    settings: &SessionSettings,
    session: &mut Session,
) -> Result<LoopOutcome, AgentError> {
    let tools = capability::definitions(&settings.tool_name);

    while session.begin_turn() {
        tracing::debug!(
            turn = session.turns_used(),
            limit = session.turn_limit(),
            "requesting command"
        );
        let request = ChatRequest {
            model: settings.model.clone(),
            messages: session.messages().to_vec(),
            tools: Some(tools.clone()),
            tool_choice: Some("auto".to_string()),
            temperature: settings.temperature,
            max_tokens: settings.command_max_tokens,
        };
        let response = client.chat(&request).await?;
        session.record_usage(response.usage.as_ref());

        let Some(choice) = response.choices.into_iter().next() else {
            tracing::warn!("model response had no choices");
            session.push_user(render_correction("the response was empty"));
            continue;
        };
        let message = choice.message;

        match parser::parse_reply(&message) {
            ParsedReply::CapabilityCalls(calls) => {
                session.push_assistant(Message::assistant(message.content, calls.clone()));
                for call in &calls {
                    let result = run_capability(gateway, call).await?;
                    session.push_capability_result(&call.id, result);
                }
            }
            ParsedReply::FinalCommand {
                command,
                preferred_limit,
            } => {
                tracing::info!(%command, ?preferred_limit, "model produced final command");
                return Ok(LoopOutcome::Command {
                    command,
                    preferred_limit,
                });
            }
            ParsedReply::Declined(reason) => {
                tracing::info!(%reason, "model declined");
                return Ok(LoopOutcome::Declined(reason));
            }
            ParsedReply::Malformed(reason) => {
                tracing::warn!(%reason, turn = session.turns_used(), "malformed model reply");
                // Backends reject replayed assistant turns that carry calls
                // without results, or neither calls nor text.
                let has_text = message
                    .content
                    .as_deref()
                    .is_some_and(|text| !text.trim().is_empty());
                if has_text && message.call_ids().next().is_none() {
                    session.push_assistant(Message::assistant(message.content, Vec::new()));
                }
                session.push_user(render_correction(&reason));
            }
        }
    }

    tracing::warn!(turns = session.turns_used(), "turn budget exhausted");
    Ok(LoopOutcome::Exhausted)
}

/// Execute one capability call; the returned text goes back to the model.
///
/// Only a missing tool is fatal. Bad arguments and failed help are reported
/// to the model so it can correct itself.
async fn run_capability(gateway: &ToolGateway, call: &CapabilityCall) -> Result<String, AgentError> {
    let subcommand = match Capability::from_call(call) {
        Ok(Capability::FetchSubcommandHelp { subcommand_name }) => subcommand_name,
        Ok(Capability::Unknown { name }) => return Ok(format!("Error: unknown capability `{name}`.")),
        Err(message) => return Ok(format!("Error: {message}")),
    };
    tracing::debug!(call_id = %call.id, %subcommand, "fetching subcommand help");

    match gateway.subcommand_help(&subcommand).await {
        Ok(outcome) if outcome.is_not_installed() => {
            Err(GatewayError::NotInstalled(gateway.program().to_string()).into())
        }
        Ok(outcome) if outcome.succeeded => Ok(if outcome.stdout.is_empty() {
            outcome.stderr
        } else {
            outcome.stdout
        }),
        Ok(outcome) => Ok(format!(
            "Error getting help for '{subcommand}': {}",
            outcome.failure_detail()
        )),
        Err(e) => Ok(format!("Error getting help for '{subcommand}': {e}")),
    }
}
