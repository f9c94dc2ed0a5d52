//! One tool-free model call that turns command output into an answer.
//!
//! Runs with a fresh two-message context; nothing from the command-synthesis
//! history is sent.

use super::SessionSettings;
use crate::api::ModelClient;
use crate::bounding::BoundedOutput;
use crate::prompt::{render_answer_input, render_answer_prompt, AnswerPromptParams};
use crate::tokens::UsageTotals;
use crate::types::{ChatRequest, Message};

/// Answer used when the command printed nothing; no model call is made.
pub const NO_DATA_ANSWER: &str =
    "No data was returned by the command. This likely means no matching data was found.";

/// Answer text (if any) and the tokens spent producing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Synthesis {
    pub answer: Option<String>,
    pub usage: UsageTotals,
}

/// Turn `output` into a direct answer to `query`.
///
/// Backend failures and empty replies give `answer: None`; callers fall back
/// to the bounded output.
pub async fn synthesize_answer(
    client: &dyn ModelClient,
    settings: &SessionSettings,
    query: &str,
    file_path: &str,
    output: &BoundedOutput,
) -> Synthesis {
    if output.text.trim().is_empty() {
        tracing::debug!("command output empty, skipping answer synthesis");
        return Synthesis {
            answer: Some(NO_DATA_ANSWER.to_string()),
            usage: UsageTotals::new(),
        };
    }

    let truncated_at = output.truncated.then_some(output.limit);
    let system = render_answer_prompt(&AnswerPromptParams {
        tool: &settings.tool_name,
        query,
        file_path,
        truncated_at,
    });
    let request = ChatRequest {
        model: settings.model.clone(),
        messages: vec![
            Message::system(system),
            Message::user(render_answer_input(&settings.tool_name, &output.text)),
        ],
        tools: None,
        tool_choice: None,
        temperature: settings.temperature,
        max_tokens: settings.answer_max_tokens,
    };

    let mut usage = UsageTotals::new();
    let response = match client.chat(&request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "answer synthesis failed");
            return Synthesis {
                answer: None,
                usage,
            };
        }
    };
    usage.record(response.usage.as_ref());

    let answer = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());
    let Some(mut answer) = answer else {
        tracing::warn!("answer synthesis returned no text");
        return Synthesis {
            answer: None,
            usage,
        };
    };

    if let Some(limit) = truncated_at {
        if !answer.to_lowercase().contains("truncat") {
            answer.push_str(&format!(
                "\n\n(Note: the command output was truncated at {limit} characters, so this answer may be based on partial data.)"
            ));
        }
    }
    tracing::debug!(%usage, "answer synthesized");
    Synthesis {
        answer: Some(answer),
        usage,
    }
}
