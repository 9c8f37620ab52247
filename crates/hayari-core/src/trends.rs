//! Yearly buzz-phrase analysis.
//!
//! [`analyze_phrase_trends`] ties the pipeline together: pick the messages
//! dated in the target year, extract each one's phrases, tally them, and
//! keep the strongest through a bounded selector.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::{AggregateEntry, Aggregator, MessageId};
use crate::dates::year_from_date;
use crate::error::AnalysisResult;
use crate::extract::extract_phrases;
use crate::tokenizer::Tokenizer;
use crate::topk::TopK;

/// A chat message as trend analysis sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Message {
    /// `YYYY/MM/DD`; messages without a parseable date are never counted.
    pub date: Option<String>,
    /// Raw message text.
    pub content: String,
}

impl Message {
    /// Convenience constructor for a dated message.
    pub fn new(date: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            content: content.into(),
        }
    }
}

/// Tuning knobs for phrase extraction and ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TrendOptions {
    /// Messages at most this many characters long count as one phrase.
    pub short_max: usize,
    /// Messages with at least this many symbols count as one phrase.
    pub symbol_min: usize,
    /// Messages up to this length with no connective count as one phrase.
    pub no_connective_max: usize,
    /// Shortest n-gram candidate, in characters.
    pub min_phrase_len: usize,
    /// Longest n-gram candidate, in tokens.
    pub max_ngram: usize,
    /// Rows in the final report.
    pub top_n: usize,
    /// Entries the selector keeps while scanning.
    pub candidate_limit: usize,
}

impl Default for TrendOptions {
    fn default() -> Self {
        Self {
            short_max: 10,
            symbol_min: 3,
            no_connective_max: 30,
            min_phrase_len: 5,
            max_ngram: 8,
            top_n: 30,
            candidate_limit: 600,
        }
    }
}

/// One ranked phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TrendPhrase {
    /// Display form (longest variant seen, repeats capped).
    pub phrase: String,
    /// Number of messages the phrase appeared in.
    pub count: usize,
    /// Tokens the phrase spans (1 for whole messages).
    pub token_count: usize,
    /// Indices into the analyzed message list.
    pub message_ids: Vec<MessageId>,
}

impl From<AggregateEntry> for TrendPhrase {
    fn from(entry: AggregateEntry) -> Self {
        Self {
            phrase: entry.display,
            count: entry.count,
            token_count: entry.token_count,
            message_ids: entry.message_ids,
        }
    }
}

/// Result of analyzing one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TrendReport {
    /// The analyzed year.
    pub year: i32,
    /// Messages dated in `year`, including ones later excluded.
    pub message_count: usize,
    /// Ranked phrases, most frequent first.
    pub phrases: Vec<TrendPhrase>,
}

/// Rank the phrases that characterize `target_year`.
///
/// Message ids in the result index into `messages`. A tokenizer failure
/// aborts the run; an empty year yields an empty report.
#[tracing::instrument(skip(messages, tokenizer, options), fields(messages = messages.len()))]
pub fn analyze_phrase_trends(
    messages: &[Message],
    target_year: i32,
    tokenizer: &dyn Tokenizer,
    options: &TrendOptions,
) -> AnalysisResult<TrendReport> {
    let mut aggregator = Aggregator::new();
    let mut message_count = 0;

    for (id, message) in messages.iter().enumerate() {
        if message.date.as_deref().and_then(year_from_date) != Some(target_year) {
            continue;
        }
        message_count += 1;
        for phrase in extract_phrases(&message.content, tokenizer, options)? {
            aggregator.add_occurrence(&phrase.key, &phrase.display, phrase.token_count, id);
        }
    }

    let distinct = aggregator.len();
    let mut selector = TopK::with_capacity(options.candidate_limit);
    for entry in aggregator.into_entries() {
        selector.offer(entry);
    }
    debug!(
        message_count,
        distinct,
        kept = selector.len(),
        "selected phrase candidates"
    );

    let phrases = selector
        .into_sorted(options.top_n)
        .into_iter()
        .map(TrendPhrase::from)
        .collect();

    Ok(TrendReport {
        year: target_year,
        message_count,
        phrases,
    })
}
