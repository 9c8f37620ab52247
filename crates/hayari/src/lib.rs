//! Library interface for the `hayari` CLI.
//!
//! Exposes the argument parser and command implementations so they can be
//! tested without spawning the binary. The entry point is in `main.rs`.
//!
//! - [`Cli`] - The root argument parser (clap derive)
//! - [`Commands`] - Available subcommands
//! - [`commands`] - Command implementations

pub mod commands;

#[cfg(feature = "mcp")]
pub mod server;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output. Call once at startup.
    pub fn apply(self) {
        match self {
            Self::Auto => {}
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    RUST_LOG                 Log filter (e.g., debug, hayari_core=trace)
    HAYARI_LOG_PATH          Explicit JSONL log file path
    HAYARI_LOG_DIR           JSONL log directory
    HAYARI_TOKENIZER         Tokenizer backend (script, mecab)
    HAYARI_MECAB_COMMAND     Command line used to start MeCab
    HAYARI_TRENDS__TOP_N     Default number of phrases to report
";

/// Command-line interface definition for hayari.
#[derive(Parser)]
#[command(name = "hayari")]
#[command(about = "Find the buzz phrases of a year in your chat history", long_about = None)]
#[command(version, arg_required_else_help = true)]
#[command(after_long_help = ENV_HELP)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Print only the version number (for scripting)
    #[arg(long)]
    pub version_only: bool,

    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long, global = true)]
    pub chdir: Option<PathBuf>,

    /// Only print errors (suppresses warnings/info)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, global = true, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available subcommands for the CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Rank the buzz phrases of one year in a LINE chat export
    Trends(commands::trends::TrendsArgs),

    /// List the years present in a LINE chat export
    Years(commands::years::YearsArgs),

    /// Show package information and effective configuration
    Info(commands::info::InfoArgs),

    /// Start MCP (Model Context Protocol) server on stdio
    #[cfg(feature = "mcp")]
    Serve(commands::serve::ServeArgs),
}

/// Returns the clap command, for help rendering and introspection.
pub fn command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn trends_arguments_parse() {
        let cli = Cli::try_parse_from([
            "hayari",
            "trends",
            "talk.txt",
            "--year",
            "2023",
            "--top",
            "10",
            "--tokenizer",
            "mecab",
            "--context",
            "2",
        ])
        .unwrap();
        let Some(Commands::Trends(args)) = cli.command else {
            panic!("expected trends command");
        };
        assert_eq!(args.year, Some(2023));
        assert_eq!(args.top, Some(10));
        assert_eq!(args.context, 2);
        assert_eq!(
            args.tokenizer,
            Some(hayari_core::TokenizerBackend::Mecab)
        );
    }

    #[test]
    fn unknown_tokenizer_is_rejected() {
        assert!(
            Cli::try_parse_from(["hayari", "trends", "talk.txt", "--tokenizer", "kuromoji"])
                .is_err()
        );
    }
}
