//! CLI entry point for tally.

mod cli;

use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tally::agent::{run_session, SessionRequest, SessionSettings};
use tally::api::{ApiClient, RetryPolicy};
use tally::config::{load_config, validate, Config};
use tally::gateway::{HelpCache, ToolGateway};
use tally::prepare::{detect_delimiter, ensure_utf8, parse_delimiter_arg};
use tally::prompt::describe_delimiter;
use tally::render::{present_report, Renderer};
use tally::report::write_report;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    init_tracing(args.debug);

    let loaded = match load_config(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    tracing::debug!(source = %loaded.source.describe(), "using config");
    let mut config = loaded.config;
    apply_cli_overrides(&mut config, &args);
    if let Err(e) = validate(&config) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }

    let renderer = Renderer::new(config.display.color && !args.no_color);

    let prepared = match ensure_utf8(Path::new(&args.file)) {
        Ok(prepared) => prepared,
        Err(e) => {
            renderer.error(&e.to_string());
            std::process::exit(1);
        }
    };
    if prepared.converted {
        renderer.warn(&format!(
            "input was {}; using UTF-8 copy {}",
            prepared.encoding.label(),
            prepared.path.display()
        ));
    }

    let delimiter = match &args.delimiter {
        Some(raw) => parse_delimiter_arg(raw),
        None => detect_delimiter(&prepared.path),
    };
    let delimiter = match delimiter {
        Ok(delimiter) => delimiter,
        Err(e) => {
            renderer.error(&e.to_string());
            std::process::exit(1);
        }
    };

    renderer.section("Input");
    renderer.field("file", &prepared.path.display().to_string());
    renderer.field("delimiter", &describe_delimiter(delimiter));
    renderer.field("model", &config.api.model);

    let client = ApiClient::new(&config.api, RetryPolicy::from_config(&config.retry));
    let gateway = ToolGateway::from_config(&config.tool).with_help_cache(Arc::new(HelpCache::new()));
    let settings = SessionSettings::from_config(&config);
    let request = SessionRequest {
        query: args.query.clone(),
        file_path: prepared.path.display().to_string(),
        delimiter,
        turn_limit: config.agent.max_turns,
        output_char_limit: config.output.char_limit,
    };

    let report = run_session(&client, &gateway, &settings, &request).await;
    present_report(
        &renderer,
        &report,
        settings.synthesize_answer,
        config.display.show_tokens,
    );

    if let Some(path) = &args.output {
        if let Err(e) = write_report(Path::new(path), &args.query, &report) {
            tracing::error!(path = %path, error = %e, "failed to write session report");
            renderer.warn(&format!("could not write report to {path}: {e}"));
        }
    }

    if !report.succeeded() {
        std::process::exit(1);
    }
}

/// Logs go to stderr. `--debug` forces `tally=debug`; otherwise `RUST_LOG`
/// wins over the `tally=warn` default.
fn init_tracing(debug: bool) {
    let directives = log_directives(debug, std::env::var("RUST_LOG").ok());
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("tally=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn log_directives(debug: bool, rust_log: Option<String>) -> String {
    if debug {
        return "tally=debug".to_string();
    }
    rust_log
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "tally=warn".to_string())
}

fn apply_cli_overrides(config: &mut Config, args: &cli::Args) {
    if let Some(model) = &args.model {
        config.api.model = model.clone();
    }
    if let Some(base_url) = &args.base_url {
        config.api.base_url = base_url.clone();
    }
    if let Some(tool) = &args.tool {
        config.tool.program = tool.clone();
    }
    if let Some(max_turns) = args.max_turns {
        config.agent.max_turns = max_turns;
    }
    if args.raw {
        config.agent.synthesize_answer = false;
    }
}
