//! CLI argument parsing via clap.

use clap::Parser;

/// Ask questions about a CSV/TSV file in plain language.
///
/// A model translates the question into a command for the configured
/// row/column tool (xsv by default), runs it, and answers from its output.
#[derive(Debug, Parser)]
#[command(name = "tally", version, long_version = tally::build_info::LONG_VERSION)]
pub struct Args {
    /// Question about the file, e.g. "how many rows have status=failed?".
    pub query: String,

    /// Delimited-text file to analyze.
    #[arg(short = 'f', long = "file")]
    pub file: String,

    /// Field delimiter (one character, `\t`, or tab/comma/semicolon/pipe).
    /// Detected from the file when omitted.
    #[arg(short = 'd', long = "delimiter")]
    pub delimiter: Option<String>,

    /// Maximum model turns while building the command.
    #[arg(short = 't', long = "max-turns")]
    pub max_turns: Option<usize>,

    /// Override model name.
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,

    /// Write a plain-text session report to this path.
    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,

    /// Path to config file (default: ./tally.toml or ~/.config/tally/tally.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Override API base URL.
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    /// Override the tool program (name on PATH or full path).
    #[arg(long = "tool")]
    pub tool: Option<String>,

    /// Skip answer synthesis and print the tool output.
    #[arg(long = "raw")]
    pub raw: bool,

    /// Disable color output.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Verbose logging to stderr.
    #[arg(long = "debug")]
    pub debug: bool,
}
