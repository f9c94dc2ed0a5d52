//! Wire model for OpenAI-compatible chat completions.
//!
//! Rust field names follow the session vocabulary (capability calls,
//! `responding_to`) while serde renames keep the JSON payloads identical to
//! what `/chat/completions` endpoints expect.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Conversation participant role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single message in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,

    /// Text content. Null when an assistant turn only carries capability calls.
    pub content: Option<String>,

    /// Capability calls requested by the assistant, in model order.
    #[serde(
        rename = "tool_calls",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub capability_calls: Option<Vec<CapabilityCall>>,

    /// For tool-role messages: the id of the capability call being answered.
    #[serde(
        rename = "tool_call_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub responding_to: Option<String>,
}

impl Message {
    fn with_role(role: Role, content: Option<String>) -> Self {
        Self {
            role,
            content,
            capability_calls: None,
            responding_to: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, Some(content.into()))
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, Some(content.into()))
    }

    /// Assistant turn as it is replayed to the model.
    pub fn assistant(content: Option<String>, calls: Vec<CapabilityCall>) -> Self {
        let mut message = Self::with_role(Role::Assistant, content);
        if !calls.is_empty() {
            message.capability_calls = Some(calls);
        }
        message
    }

    /// Tool-role result correlated to the capability call `call_id`.
    pub fn capability_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut message = Self::with_role(Role::Tool, Some(content.into()));
        message.responding_to = Some(call_id.into());
        message
    }

    /// Ids of the capability calls carried by this message, if any.
    pub fn call_ids(&self) -> impl Iterator<Item = &str> {
        self.capability_calls
            .iter()
            .flatten()
            .map(|call| call.id.as_str())
    }
}

// ---------------------------------------------------------------------------
// Capability calls
// ---------------------------------------------------------------------------

/// A capability invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CapabilityCall {
    /// Opaque id used to correlate the call with its result.
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: CallTarget,
}

impl CapabilityCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: function_kind(),
            function: CallTarget {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// JSON-encoded argument object, verbatim from the model.
    pub fn arguments(&self) -> &str {
        &self.function.arguments
    }
}

/// Function name and JSON-encoded arguments within a capability call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallTarget {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

// ---------------------------------------------------------------------------
// Capability schema (sent in requests)
// ---------------------------------------------------------------------------

/// Capability definition advertised to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

/// Schema of a callable function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema object describing the parameters.
    pub parameters: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Chat completion request / response
// ---------------------------------------------------------------------------

/// Request body for POST /chat/completions.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,

    /// `"auto"` whenever tools are advertised.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Response body from POST /chat/completions.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// A single choice in the API response.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: Message,
    pub finish_reason: Option<String>,
}

/// Token usage reported by the API. Missing counters deserialize as zero.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_request_omits_absent_options() {
        let req = ChatRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![Message::system("sys"), Message::user("count rows")],
            tools: None,
            tool_choice: None,
            temperature: Some(0.1),
            max_tokens: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);
        assert_eq!(json["temperature"], 0.1);
        assert!(json.get("tools").is_none());
        assert!(json.get("tool_choice").is_none());
        assert!(json.get("max_tokens").is_none());
        assert!(json["messages"][0].get("tool_calls").is_none());
    }

    #[test]
    fn capability_messages_use_wire_field_names() {
        let call = CapabilityCall::new("call_1", "fetch_subcommand_help", r#"{"subcommand_name":"stats"}"#);
        let assistant = serde_json::to_value(Message::assistant(None, vec![call])).unwrap();
        assert!(assistant["content"].is_null());
        assert_eq!(assistant["tool_calls"][0]["id"], "call_1");
        assert_eq!(assistant["tool_calls"][0]["type"], "function");

        let result = serde_json::to_value(Message::capability_result("call_1", "help")).unwrap();
        assert_eq!(result["role"], "tool");
        assert_eq!(result["tool_call_id"], "call_1");
    }

    #[test]
    fn deserialize_capability_call_response() {
        let json = r#"{
            "id": "chatcmpl-456",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {
                            "name": "fetch_subcommand_help",
                            "arguments": "{\"subcommand_name\":\"stats\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }"#;
        let resp: ChatResponse = serde_json::from_str(json).unwrap();
        let msg = &resp.choices[0].message;
        assert!(msg.content.is_none());
        let calls = msg.capability_calls.as_ref().unwrap();
        assert_eq!(calls[0].name(), "fetch_subcommand_help");
        assert_eq!(msg.call_ids().collect::<Vec<_>>(), vec!["call_abc"]);
        assert!(resp.usage.is_none());
    }

    #[test]
    fn usage_tolerates_missing_counters() {
        let json = r#"{
            "choices": [{"message": {"role": "assistant", "content": "ok"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 12}
        }"#;
        let resp: ChatResponse = serde_json::from_str(json).unwrap();
        let usage = resp.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 12);
        assert_eq!(usage.completion_tokens, 0);
    }

    #[test]
    fn assistant_without_calls_has_no_call_field() {
        let msg = Message::assistant(Some("count a.csv".into()), Vec::new());
        assert!(msg.capability_calls.is_none());
        assert_eq!(msg.call_ids().count(), 0);
    }
}
