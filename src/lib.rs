//! Tally: natural-language questions over delimited-text files.
//!
//! A model iteratively writes a command for an external row/column tool
//! (xsv by default), asking for subcommand help through a single callable
//! capability when it needs it. The command runs, its output is bounded, and
//! a second model call turns the output into a direct answer.
//!
//! # Quick start
//!
//! ```no_run
//! use tally::agent::{run_session, SessionRequest, SessionSettings};
//! use tally::api::{ApiClient, RetryPolicy};
//! use tally::config::load_config;
//! use tally::gateway::ToolGateway;
//!
//! # async fn example() {
//! let config = load_config(None).unwrap().config;
//! let client = ApiClient::new(&config.api, RetryPolicy::from_config(&config.retry));
//! let gateway = ToolGateway::from_config(&config.tool);
//! let request = SessionRequest {
//!     query: "how many rows?".into(),
//!     file_path: "data.csv".into(),
//!     delimiter: ',',
//!     turn_limit: config.agent.max_turns,
//!     output_char_limit: config.output.char_limit,
//! };
//! let report = run_session(&client, &gateway, &SessionSettings::from_config(&config), &request).await;
//! println!("{:?}", report.presented_text());
//! # }
//! ```

pub mod agent;
pub mod api;
pub mod bounding;
pub mod build_info;
pub mod capability;
pub mod config;
pub mod error;
pub mod gateway;
pub mod prepare;
pub mod prompt;
pub mod render;
pub mod report;
#[cfg(test)]
pub mod testsupport;
pub mod tokens;
pub mod types;
