//! Trends command: rank the buzz phrases of one year.

use std::time::Duration;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use hayari_core::config::Config;
use hayari_core::{
    ChatHistory, LineMessage, TokenizerBackend, TrendReport, analyze_phrase_trends,
    build_tokenizer,
};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use tracing::{debug, instrument};

use super::load_chat_history;

/// Arguments for the `trends` subcommand.
#[derive(Args, Debug)]
pub struct TrendsArgs {
    /// LINE chat history export (.txt).
    pub file: Utf8PathBuf,

    /// Year to analyze. Defaults to the latest year in the file.
    #[arg(long)]
    pub year: Option<i32>,

    /// Number of phrases to report.
    #[arg(long)]
    pub top: Option<usize>,

    /// Tokenizer backend.
    #[arg(long, value_enum)]
    pub tokenizer: Option<TokenizerBackend>,

    /// Show up to N sample messages per phrase.
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub context: usize,
}

#[derive(Serialize)]
struct PhraseSamples<'a> {
    phrase: &'a str,
    messages: Vec<&'a LineMessage>,
}

#[derive(Serialize)]
struct TrendsOutput<'a> {
    file: &'a Utf8Path,
    #[serde(skip_serializing_if = "str::is_empty")]
    partner: &'a str,
    #[serde(flatten)]
    report: &'a TrendReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    samples: Vec<PhraseSamples<'a>>,
}

/// Up to `limit` source messages for each reported phrase.
fn collect_samples<'a>(
    report: &'a TrendReport,
    history: &'a ChatHistory,
    limit: usize,
) -> Vec<PhraseSamples<'a>> {
    if limit == 0 {
        return Vec::new();
    }
    report
        .phrases
        .iter()
        .map(|row| PhraseSamples {
            phrase: &row.phrase,
            messages: row
                .message_ids
                .iter()
                .filter_map(|&id| history.messages.get(id))
                .take(limit)
                .collect(),
        })
        .collect()
}

fn spinner(enabled: bool, year: i32) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(format!("analyzing {year}..."));
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Rank the phrases that characterize one year of a chat export.
#[instrument(name = "cmd_trends", skip_all, fields(file = %args.file))]
pub fn cmd_trends(
    args: TrendsArgs,
    global_json: bool,
    show_progress: bool,
    config: &Config,
    max_input: Option<usize>,
) -> anyhow::Result<()> {
    debug!(year = ?args.year, top = ?args.top, "executing trends command");

    let history = load_chat_history(&args.file, max_input)?;
    let year = match args.year {
        Some(year) => year,
        None => history
            .latest_year()
            .with_context(|| format!("no dated messages in {}", args.file))?,
    };

    let mut options = config.trends.clone();
    if let Some(top) = args.top {
        options.top_n = top;
    }
    let backend = args.tokenizer.or(config.tokenizer).unwrap_or_default();
    let tokenizer = build_tokenizer(backend, config.mecab_command.as_deref())
        .with_context(|| format!("failed to start the {backend} tokenizer"))?;

    let messages = history.to_messages();
    let bar = spinner(show_progress, year);
    let result = analyze_phrase_trends(&messages, year, tokenizer.as_ref(), &options);
    bar.finish_and_clear();
    let report = result.with_context(|| format!("failed to analyze {}", args.file))?;

    let samples = collect_samples(&report, &history, args.context);

    if global_json {
        let output = TrendsOutput {
            file: &args.file,
            partner: &history.partner_name,
            report: &report,
            samples,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let title = if history.partner_name.is_empty() {
        args.file.to_string()
    } else {
        history.partner_name.clone()
    };
    println!(
        "{} {} ({} messages)",
        title.if_supports_color(Stream::Stdout, |t| t.bold()),
        year.if_supports_color(Stream::Stdout, |t| t.cyan()),
        report.message_count
    );

    if report.phrases.is_empty() {
        println!(
            "  {}",
            "no phrases found".if_supports_color(Stream::Stdout, |t| t.yellow())
        );
        return Ok(());
    }

    let width = report.phrases.len().to_string().len();
    for (rank, row) in report.phrases.iter().enumerate() {
        let count = format!("×{}", row.count);
        println!(
            "  {:>width$}. {}  {}",
            rank + 1,
            row.phrase,
            count.if_supports_color(Stream::Stdout, |t| t.dimmed()),
        );
        if let Some(group) = samples.get(rank) {
            for message in &group.messages {
                println!(
                    "  {:>width$}  {} {} {}: {}",
                    "",
                    message.date.if_supports_color(Stream::Stdout, |t| t.dimmed()),
                    message.time.if_supports_color(Stream::Stdout, |t| t.dimmed()),
                    message.sender,
                    message.content.replace('\n', " "),
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hayari_core::{TrendPhrase, parse_line_chat_history};

    const EXPORT: &str = "[LINE] 山田とのトーク履歴\n\
2024/01/01(月)\n\
10:00\t山田\t了解です\n\
10:01\t自分\tまじか\n\
10:02\t山田\t了解です\n";

    #[test]
    fn samples_follow_message_ids() {
        let history = parse_line_chat_history(EXPORT);
        let report = TrendReport {
            year: 2024,
            message_count: 3,
            phrases: vec![TrendPhrase {
                phrase: "了解です".to_string(),
                count: 2,
                token_count: 1,
                message_ids: vec![0, 2],
            }],
        };

        let samples = collect_samples(&report, &history, 5);
        assert_eq!(samples.len(), 1);
        let times: Vec<_> = samples[0].messages.iter().map(|m| m.time.as_str()).collect();
        assert_eq!(times, vec!["10:00", "10:02"]);

        let limited = collect_samples(&report, &history, 1);
        assert_eq!(limited[0].messages.len(), 1);

        assert!(collect_samples(&report, &history, 0).is_empty());
    }
}
