//! The single model-callable capability: fetching help for a tool subcommand.
//!
//! Capability calls arrive as name + JSON argument strings. They are
//! classified into the closed [`Capability`] enum before anything runs, so
//! dispatch never matches on raw strings past this module.

use crate::types::{CapabilityCall, FunctionDefinition, ToolDefinition};
use serde::Deserialize;

/// Wire name of the help capability.
pub const FETCH_SUBCOMMAND_HELP: &str = "fetch_subcommand_help";

/// A classified capability call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    FetchSubcommandHelp { subcommand_name: String },
    Unknown { name: String },
}

#[derive(Debug, Deserialize)]
struct FetchHelpArgs {
    subcommand_name: String,
}

impl Capability {
    /// True when `name` is a registered capability.
    pub fn is_registered(name: &str) -> bool {
        name == FETCH_SUBCOMMAND_HELP
    }

    /// Classify a model-issued call.
    ///
    /// `Err` carries a description of bad arguments, meant to be returned to
    /// the model as the call's result so it can correct itself.
    pub fn from_call(call: &CapabilityCall) -> Result<Self, String> {
        if !Self::is_registered(call.name()) {
            return Ok(Self::Unknown {
                name: call.name().to_string(),
            });
        }

        let raw = call.arguments().trim();
        let args: FetchHelpArgs = serde_json::from_str(if raw.is_empty() { "{}" } else { raw })
            .map_err(|e| format!("invalid arguments for {FETCH_SUBCOMMAND_HELP}: {e}"))?;
        let subcommand_name = validate_subcommand_name(&args.subcommand_name)?;
        Ok(Self::FetchSubcommandHelp { subcommand_name })
    }
}

/// Accept a single bare word that can be passed as `<tool> <word> -h`.
pub fn validate_subcommand_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err("subcommand_name must not be empty".to_string());
    }
    if name.starts_with('-') {
        return Err(format!("`{name}` is a flag, not a subcommand name"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(format!("`{name}` must be a single subcommand name"));
    }
    Ok(name.to_string())
}

/// Capability schema advertised with every command-synthesis request.
pub fn definitions(program: &str) -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        tool_type: "function".into(),
        function: FunctionDefinition {
            name: FETCH_SUBCOMMAND_HELP.into(),
            description: format!(
                "Get the help text for one `{program}` subcommand (for example 'stats', \
                 'slice' or 'search') to learn its options before writing the final command."
            ),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "subcommand_name": {
                        "type": "string",
                        "description": format!("Name of the {program} subcommand, e.g. 'stats'.")
                    }
                },
                "required": ["subcommand_name"]
            }),
        },
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_requires_subcommand_name() {
        let defs = definitions("xsv");
        assert_eq!(defs.len(), 1);
        let def = &defs[0];
        assert_eq!(def.tool_type, "function");
        assert_eq!(def.function.name, FETCH_SUBCOMMAND_HELP);
        assert_eq!(def.function.parameters["required"][0], "subcommand_name");
        assert_eq!(
            def.function.parameters["properties"]["subcommand_name"]["type"],
            "string"
        );
    }

    #[test]
    fn classifies_registered_call() {
        let call = CapabilityCall::new("c1", FETCH_SUBCOMMAND_HELP, r#"{"subcommand_name":" stats "}"#);
        assert_eq!(
            Capability::from_call(&call),
            Ok(Capability::FetchSubcommandHelp {
                subcommand_name: "stats".into()
            })
        );
    }

    #[test]
    fn unknown_name_is_its_own_variant() {
        let call = CapabilityCall::new("c1", "run_shell", "{}");
        assert_eq!(
            Capability::from_call(&call),
            Ok(Capability::Unknown {
                name: "run_shell".into()
            })
        );
        assert!(!Capability::is_registered("run_shell"));
    }

    #[test]
    fn bad_arguments_become_model_visible_errors() {
        let missing = CapabilityCall::new("c1", FETCH_SUBCOMMAND_HELP, "{}");
        assert!(Capability::from_call(&missing)
            .unwrap_err()
            .contains("invalid arguments"));

        let garbage = CapabilityCall::new("c2", FETCH_SUBCOMMAND_HELP, "stats");
        assert!(Capability::from_call(&garbage).is_err());
    }

    #[test]
    fn subcommand_names_must_be_single_bare_words() {
        assert_eq!(validate_subcommand_name("frequency"), Ok("frequency".into()));
        assert!(validate_subcommand_name("   ").is_err());
        assert!(validate_subcommand_name("--help").is_err());
        assert!(validate_subcommand_name("stats; rm -rf /").is_err());
    }
}
