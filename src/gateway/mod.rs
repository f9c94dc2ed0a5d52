//! External tool gateway.
//!
//! Every interaction with the delimited-text tool goes through here:
//! top-level help, per-subcommand help, and the final data command. Help
//! output is memoized in a [`HelpCache`] that can be shared across sessions.

mod cache;
mod process;

pub use cache::HelpCache;

use crate::config::ToolConfig;
use crate::error::GatewayError;
use process::{format_duration, run_process, run_sh_process, shell_quote, ProcessFailure};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Classified result of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub succeeded: bool,
    pub stdout: String,
    pub stderr: String,
    /// `None` means the executable was not found.
    pub exit_code: Option<i32>,
}

impl ExecutionOutcome {
    fn not_installed(program: &str) -> Self {
        Self {
            succeeded: false,
            stdout: String::new(),
            stderr: GatewayError::NotInstalled(program.to_string()).to_string(),
            exit_code: None,
        }
    }

    fn finished(exit_code: i32, stdout: String, stderr: String) -> Self {
        Self {
            succeeded: exit_code == 0,
            stdout,
            stderr,
            exit_code: Some(exit_code),
        }
    }

    pub fn is_not_installed(&self) -> bool {
        self.exit_code.is_none()
    }

    /// Best available error detail: stderr, else stdout, else the exit code.
    pub fn failure_detail(&self) -> String {
        if !self.stderr.is_empty() {
            return self.stderr.clone();
        }
        if !self.stdout.is_empty() {
            return self.stdout.clone();
        }
        match self.exit_code {
            Some(code) => format!("command exited with {code}"),
            None => "command did not run".to_string(),
        }
    }
}

/// Runs the configured tool program as a child process.
#[derive(Debug, Clone)]
pub struct ToolGateway {
    program: String,
    timeout: Duration,
    help_cache: Arc<HelpCache>,
}

impl ToolGateway {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
            help_cache: Arc::new(HelpCache::new()),
        }
    }

    pub fn from_config(config: &ToolConfig) -> Self {
        Self::new(
            config.program.clone(),
            Duration::from_secs(config.timeout_secs.max(1)),
        )
    }

    /// Share a help cache with other gateways (for example across sessions).
    pub fn with_help_cache(mut self, cache: Arc<HelpCache>) -> Self {
        self.help_cache = cache;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// File name of the program, as the model is expected to spell it.
    pub fn tool_name(&self) -> &str {
        Path::new(&self.program)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.program)
    }

    pub fn help_cache(&self) -> &Arc<HelpCache> {
        &self.help_cache
    }

    /// Run the program with an explicit argument vector.
    pub async fn run(&self, args: &[String]) -> Result<ExecutionOutcome, GatewayError> {
        tracing::debug!(program = %self.program, ?args, "spawning tool");
        let context = format!("{} {}", self.program, args.join(" "));
        let outcome = self
            .classify(run_process(&self.program, args, self.timeout).await, &context)?;
        tracing::debug!(exit_code = ?outcome.exit_code, "tool exited");
        Ok(outcome)
    }

    /// `<tool> -h`, memoized.
    pub async fn main_help(&self) -> Result<ExecutionOutcome, GatewayError> {
        self.cached_help(vec!["-h".to_string()]).await
    }

    /// `<tool> <subcommand> -h`, memoized.
    pub async fn subcommand_help(&self, subcommand: &str) -> Result<ExecutionOutcome, GatewayError> {
        self.cached_help(vec![subcommand.to_string(), "-h".to_string()])
            .await
    }

    async fn cached_help(&self, args: Vec<String>) -> Result<ExecutionOutcome, GatewayError> {
        let key = format!("{}\u{0}{}", self.program, args.join("\u{0}"));
        if let Some(hit) = self.help_cache.get(&key) {
            tracing::debug!(?args, "help cache hit");
            return Ok(hit);
        }
        tracing::debug!(?args, "help cache miss");
        let outcome = self.run(&args).await?;
        self.help_cache.insert(key, &outcome);
        Ok(outcome)
    }

    /// Run a model-written command line through the shell.
    pub async fn run_command(&self, command: &str) -> Result<ExecutionOutcome, GatewayError> {
        let line = self.normalize_command(command);
        tracing::info!(command = %line, "running final command");
        let outcome = self.classify_command(run_sh_process(&line, self.timeout).await, &line)?;
        tracing::debug!(exit_code = ?outcome.exit_code, "final command exited");
        Ok(outcome)
    }

    /// The tool itself was found by the help probe; a spawn miss here is the shell.
    fn classify_command(
        &self,
        result: Result<process::ProcessOutput, ProcessFailure>,
        line: &str,
    ) -> Result<ExecutionOutcome, GatewayError> {
        match result {
            Err(ProcessFailure::NotFound) => {
                tracing::warn!(command = %line, "shell `sh` not found");
                Err(GatewayError::Spawn(format!("shell `sh` not found while running {line}")))
            }
            other => self.classify(other, line),
        }
    }

    /// Drop a leading tool-name token and prefix the configured program.
    ///
    /// `xsv count a.csv`, `count a.csv` and `/opt/bin/xsv count a.csv`
    /// (with that program configured) all become `'<program>' count a.csv`.
    pub fn normalize_command(&self, command: &str) -> String {
        let trimmed = command.trim();
        let (first, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((first, rest)) => (first, rest.trim_start()),
            None => (trimmed, ""),
        };
        let body = if first == self.tool_name() || first == self.program {
            rest
        } else {
            trimmed
        };
        let program = shell_quote(&self.program);
        if body.is_empty() {
            program
        } else {
            format!("{program} {body}")
        }
    }

    fn classify(
        &self,
        result: Result<process::ProcessOutput, ProcessFailure>,
        context: &str,
    ) -> Result<ExecutionOutcome, GatewayError> {
        match result {
            Ok(out) => Ok(ExecutionOutcome::finished(out.exit_code, out.stdout, out.stderr)),
            Err(ProcessFailure::NotFound) => {
                tracing::warn!(program = %self.program, "tool executable not found");
                Ok(ExecutionOutcome::not_installed(&self.program))
            }
            Err(ProcessFailure::Spawn(e)) => Err(GatewayError::Spawn(format!("{context}: {e}"))),
            Err(ProcessFailure::TimedOut(limit)) => Err(GatewayError::TimedOut(format!(
                "{context} after {}",
                format_duration(limit)
            ))),
        }
    }
}
