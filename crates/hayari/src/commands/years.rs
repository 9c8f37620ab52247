//! Years command: list the years a chat export covers.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use hayari_core::ChatHistory;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use tracing::{debug, instrument};

use super::load_chat_history;

/// Arguments for the `years` subcommand.
#[derive(Args, Debug)]
pub struct YearsArgs {
    /// LINE chat history export (.txt).
    pub file: Utf8PathBuf,

    /// Break each year down by month.
    #[arg(long)]
    pub months: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct MonthCount {
    month: u32,
    messages: usize,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct YearCount {
    year: i32,
    messages: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    months: Vec<MonthCount>,
}

#[derive(Serialize)]
struct YearsOutput<'a> {
    file: &'a Utf8Path,
    #[serde(skip_serializing_if = "str::is_empty")]
    partner: &'a str,
    years: Vec<YearCount>,
}

/// Years newest first, each with its months oldest first when requested.
fn year_counts(history: &ChatHistory, with_months: bool) -> Vec<YearCount> {
    let by_month = if with_months {
        history.message_counts_by_month()
    } else {
        Default::default()
    };
    history
        .message_counts_by_year()
        .into_iter()
        .rev()
        .map(|(year, messages)| YearCount {
            year,
            messages,
            months: by_month
                .range((year, 1)..=(year, 12))
                .map(|(&(_, month), &messages)| MonthCount { month, messages })
                .collect(),
        })
        .collect()
}

/// List the years present in a chat export with their message counts.
#[instrument(name = "cmd_years", skip_all, fields(file = %args.file))]
pub fn cmd_years(
    args: YearsArgs,
    global_json: bool,
    max_input: Option<usize>,
) -> anyhow::Result<()> {
    debug!(months = args.months, "executing years command");

    let history = load_chat_history(&args.file, max_input)?;
    let years = year_counts(&history, args.months);

    if global_json {
        let output = YearsOutput {
            file: &args.file,
            partner: &history.partner_name,
            years,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for entry in &years {
        println!(
            "{}  {} messages",
            entry.year.if_supports_color(Stream::Stdout, |t| t.bold()),
            entry.messages
        );
        for month in &entry.months {
            let month_label = format!("{:02}", month.month);
            println!(
                "  {}  {}",
                month_label.if_supports_color(Stream::Stdout, |t| t.dimmed()),
                month.messages
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hayari_core::parse_line_chat_history;

    const EXPORT: &str = "2022/03/01(火)\n\
09:00\tA\tおはよう\n\
2024/01/05(金)\n\
09:00\tA\tあけおめ\n\
2024/02/10(土)\n\
09:00\tB\tこんにちは\n\
09:01\tA\tやあ\n";

    #[test]
    fn years_are_listed_newest_first() {
        let history = parse_line_chat_history(EXPORT);
        let years = year_counts(&history, false);
        let listed: Vec<_> = years.iter().map(|y| (y.year, y.messages)).collect();
        assert_eq!(listed, vec![(2024, 3), (2022, 1)]);
        assert!(years.iter().all(|y| y.months.is_empty()));
    }

    #[test]
    fn months_break_down_each_year() {
        let history = parse_line_chat_history(EXPORT);
        let years = year_counts(&history, true);
        assert_eq!(
            years[0].months,
            vec![
                MonthCount {
                    month: 1,
                    messages: 1
                },
                MonthCount {
                    month: 2,
                    messages: 2
                },
            ]
        );
        assert_eq!(years[1].months.len(), 1);
    }
}
