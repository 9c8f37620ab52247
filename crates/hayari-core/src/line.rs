//! LINE chat history export parsing.
//!
//! The exporter writes a header naming the conversation partner, then date
//! lines (`2024/05/01(水)`) followed by tab-separated `time sender content`
//! message lines. A message that spans several lines continues on lines
//! with no tabs.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dates::{year_from_date, year_month_from_date};
use crate::trends::Message;

static HEADER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[LINE\]?\s*(.+?)とのトーク履歴").expect("valid regex"));

static DATE_LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}/\d{2}/\d{2}").expect("valid regex"));

/// One message from a LINE export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineMessage {
    /// `YYYY/MM/DD`.
    pub date: String,
    /// `HH:MM` as written by the exporter.
    pub time: String,
    /// Display name of the sender.
    pub sender: String,
    /// Message body; continuation lines are joined with `\n`.
    pub content: String,
}

/// A parsed LINE export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistory {
    /// Conversation partner (or group) name from the header, if present.
    pub partner_name: String,
    /// Messages in file order.
    pub messages: Vec<LineMessage>,
}

impl ChatHistory {
    /// Distinct years present, newest first.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .message_counts_by_year()
            .into_iter()
            .map(|(year, _)| year)
            .collect();
        years.reverse();
        years
    }

    /// The most recent year with messages.
    pub fn latest_year(&self) -> Option<i32> {
        self.years().first().copied()
    }

    /// Number of messages dated in `year`.
    pub fn messages_in_year(&self, year: i32) -> usize {
        self.messages
            .iter()
            .filter(|m| year_from_date(&m.date) == Some(year))
            .count()
    }

    /// Message counts per year, oldest first.
    pub fn message_counts_by_year(&self) -> BTreeMap<i32, usize> {
        let mut counts = BTreeMap::new();
        for message in &self.messages {
            if let Some(year) = year_from_date(&message.date) {
                *counts.entry(year).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Message counts per (year, month), oldest first.
    pub fn message_counts_by_month(&self) -> BTreeMap<(i32, u32), usize> {
        let mut counts = BTreeMap::new();
        for message in &self.messages {
            if let Some(ym) = year_month_from_date(&message.date) {
                *counts.entry(ym).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Flatten into the `(date, content)` records trend analysis consumes.
    pub fn to_messages(&self) -> Vec<Message> {
        self.messages
            .iter()
            .map(|m| Message {
                date: Some(m.date.clone()),
                content: m.content.clone(),
            })
            .collect()
    }
}

/// Parse the text of a LINE chat history export.
///
/// Lines that are neither dates, messages, nor continuations of a previous
/// message (the header, the "saved at" line) are ignored.
#[tracing::instrument(skip_all, fields(text_len = text.len()))]
pub fn parse_line_chat_history(text: &str) -> ChatHistory {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    let partner_name = normalized
        .lines()
        .find(|l| l.contains("とのトーク履歴"))
        .and_then(|header| HEADER_PATTERN.captures(header))
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_default();

    let mut messages: Vec<LineMessage> = Vec::new();
    let mut current_date: Option<String> = None;
    let mut continuing = false;

    for raw in normalized.lines() {
        let line = raw.trim_end();
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if DATE_LINE_PATTERN.is_match(trimmed) {
            current_date = Some(trimmed.chars().take(10).collect());
            continuing = false;
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        if let (Some(date), true) = (&current_date, parts.len() >= 3) {
            messages.push(LineMessage {
                date: date.clone(),
                time: parts[0].to_string(),
                sender: parts[1].to_string(),
                content: parts[2..].join("\t"),
            });
            continuing = true;
            continue;
        }

        if continuing && let Some(last) = messages.last_mut() {
            last.content.push('\n');
            last.content.push_str(trimmed);
        }
    }

    tracing::debug!(
        partner = %partner_name,
        messages = messages.len(),
        "parsed chat history"
    );
    ChatHistory {
        partner_name,
        messages,
    }
}
