//! Info command implementation

use clap::Args;
use hayari_core::TrendOptions;
use hayari_core::config::{Config, ConfigSources, user_config_dir};
use owo_colors::{OwoColorize, Stream, Style};
use serde::Serialize;
use tracing::{debug, instrument};

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    repository: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            repository: env!("CARGO_PKG_REPOSITORY"),
            license: env!("CARGO_PKG_LICENSE"),
        }
    }
}

#[derive(Serialize)]
struct ConfigInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_config_dir: Option<String>,
    log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<String>,
    tokenizer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mecab_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_input_bytes: Option<usize>,
    trends: TrendOptions,
}

impl ConfigInfo {
    fn from_config(config: &Config, sources: &ConfigSources) -> Self {
        Self {
            config_file: sources.primary_file().map(|p| p.to_string()),
            user_config_dir: user_config_dir().map(|p| p.to_string()),
            log_level: config.log_level.as_str().to_string(),
            log_dir: config.log_dir.as_ref().map(|p| p.to_string()),
            tokenizer: config.tokenizer.unwrap_or_default().to_string(),
            mecab_command: config.mecab_command.clone(),
            max_input_bytes: config.input_limit(),
            trends: config.trends.clone(),
        }
    }
}

#[derive(Serialize)]
struct FullInfo {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo,
}

/// Print package information and the effective configuration.
#[instrument(name = "cmd_info", skip_all, fields(json_output))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    sources: &ConfigSources,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing info command");

    let full_info = FullInfo {
        package: PackageInfo::new(),
        config: ConfigInfo::from_config(config, sources),
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&full_info)?);
        return Ok(());
    }

    let package = &full_info.package;
    println!(
        "{} {}",
        package.name.if_supports_color(Stream::Stdout, |t| t.bold()),
        package.version.if_supports_color(Stream::Stdout, |t| t.green())
    );
    if !package.description.is_empty() {
        println!("{}", package.description);
    }
    if !package.license.is_empty() {
        print_field("License", package.license);
    }
    if !package.repository.is_empty() {
        print_field(
            "Repository",
            package
                .repository
                .if_supports_color(Stream::Stdout, |t| t.cyan()),
        );
    }

    let info = &full_info.config;
    print_heading("Configuration");
    match info.config_file {
        Some(ref path) => print_field(
            "Config file",
            path.if_supports_color(Stream::Stdout, |t| t.cyan()),
        ),
        None => print_field(
            "Config file",
            "none loaded".if_supports_color(Stream::Stdout, |t| t.yellow()),
        ),
    }
    print_opt("User config dir", &info.user_config_dir);
    print_field("Log level", &info.log_level);
    print_opt("Log directory", &info.log_dir);
    print_field("Tokenizer", &info.tokenizer);
    print_opt("MeCab command", &info.mecab_command);
    match info.max_input_bytes {
        Some(max) => print_field("Input limit", format!("{max} bytes")),
        None => print_field(
            "Input limit",
            "disabled".if_supports_color(Stream::Stdout, |t| t.yellow()),
        ),
    }

    let trends = &info.trends;
    print_heading("Trend Extraction");
    print_field("Top phrases", trends.top_n);
    print_field("Candidate limit", trends.candidate_limit);
    print_field("Whole-message max", format!("{} chars", trends.short_max));
    print_field("Symbol threshold", trends.symbol_min);
    print_field(
        "No-connective max",
        format!("{} chars", trends.no_connective_max),
    );
    print_field(
        "Min phrase length",
        format!("{} chars", trends.min_phrase_len),
    );
    print_field("Max n-gram", format!("{} tokens", trends.max_ngram));

    Ok(())
}

fn print_heading(title: &str) {
    println!();
    println!(
        "{}",
        title.if_supports_color(Stream::Stdout, |t| t.style(Style::new().bold().underline()))
    );
}

fn print_field(label: &str, value: impl std::fmt::Display) {
    println!(
        "{}: {}",
        label.if_supports_color(Stream::Stdout, |t| t.dimmed()),
        value
    );
}

/// Print an optional value or "(not set)".
fn print_opt<T: std::fmt::Display>(label: &str, value: &Option<T>) {
    match value {
        Some(v) => print_field(label, v),
        None => print_field(
            label,
            "(not set)".if_supports_color(Stream::Stdout, |t| t.dimmed()),
        ),
    }
}
