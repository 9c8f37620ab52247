//! Phrase candidate extraction for a single message.
//!
//! A message becomes either one whole-message phrase (short messages,
//! symbol-heavy messages, short messages with no connective tokens) or a set
//! of non-overlapping n-gram phrases drawn from runs of content words.
//!
//! Keys are prefixed so the two spaces never collide: `m:` for whole
//! messages, `t:` for token sequences. Token sequences are keyed by their
//! tokens rather than their rendered text, so two tokenizations that happen
//! to render identically stay separate trends.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::TokenizerResult;
use crate::filter;
use crate::normalize::{normalize_key, truncate_for_display};
use crate::tokenizer::{PartOfSpeech, Token, Tokenizer};
use crate::trends::TrendOptions;

/// Key prefix for whole-message phrases.
pub const WHOLE_MESSAGE_PREFIX: &str = "m:";

/// Key prefix for token-sequence phrases.
pub const TOKEN_SEQUENCE_PREFIX: &str = "t:";

/// Separator between normalized token surfaces in a `t:` key.
const KEY_SEPARATOR: &str = "\u{1}";

/// Punctuation that only adds emphasis and never breaks a phrase.
pub const EMPHASIS_MARKS: &[char] = &['!', '?', '！', '？', 'ー', 'ｰ', '～', '〜', '~'];

/// Fixed phrases too common in chat to be a trend.
const STOP_PHRASES: &[&str] = &[
    "よろしくお願い",
    "よろしくお願いします",
    "お願いします",
    "お疲れ様です",
    "お疲れさまです",
    "お疲れ様でした",
    "ありがとうございます",
    "おはようございます",
    "おやすみなさい",
    "了解しました",
    "ちょっと待って",
];

static STOP_PHRASE_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_PHRASES.iter().copied().collect());

static SYMBOL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{S}\p{P}]").expect("valid regex"));

static CJK_SIGNAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{Han}\p{Katakana}]").expect("valid regex"));

static KANA_ONLY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{Hiragana}\p{Katakana}ーｰ]+$").expect("valid regex"));

static LAUGHTER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[wWｗＷ草笑]+|[アあ]?[ハヒフヘホ]+[ッー]*|ワロタ|ワロス)$")
        .expect("valid regex")
});

/// A phrase produced for one message, ready for aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPhrase {
    /// Aggregation identity (`m:` or `t:` prefixed).
    pub key: String,
    /// Human-facing form.
    pub display: String,
    /// Number of tokens the phrase spans (1 for whole messages).
    pub token_count: usize,
}

/// An n-gram span over one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseCandidate {
    /// First token index (inclusive).
    pub start: usize,
    /// Last token index (exclusive).
    pub end: usize,
    /// Concatenated surfaces.
    pub text: String,
    /// Token surfaces in order.
    pub surfaces: Vec<String>,
    /// True when no emphasis-punctuation token is part of the span.
    pub content_word_only: bool,
}

impl PhraseCandidate {
    /// Number of tokens in the span.
    pub const fn token_count(&self) -> usize {
        self.end - self.start
    }

    fn key(&self) -> String {
        let parts: Vec<String> = self.surfaces.iter().map(|s| normalize_key(s)).collect();
        format!("{TOKEN_SEQUENCE_PREFIX}{}", parts.join(KEY_SEPARATOR))
    }
}

/// Whether a surface consists only of emphasis marks.
pub fn is_emphasis(surface: &str) -> bool {
    !surface.is_empty() && surface.chars().all(|c| EMPHASIS_MARKS.contains(&c))
}

/// Whether a token signals sentence structure rather than a bare phrase.
pub fn is_connective(token: &Token) -> bool {
    match token.part_of_speech() {
        PartOfSpeech::Conjunction | PartOfSpeech::Particle | PartOfSpeech::Auxiliary => true,
        PartOfSpeech::Symbol => !is_emphasis(&token.surface),
        _ => false,
    }
}

/// Whether a token may sit inside a phrase segment.
fn builds_phrase(token: &Token) -> bool {
    token.part_of_speech().is_content_word() || is_emphasis(&token.surface)
}

/// Count symbol and punctuation characters.
pub fn count_symbols(text: &str) -> usize {
    SYMBOL_PATTERN.find_iter(text).count()
}

/// Split tokens into maximal runs of content words and emphasis marks.
pub fn segments(tokens: &[Token]) -> Vec<&[Token]> {
    tokens
        .split(|t| !builds_phrase(t))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Enumerate every 2..=`max_ngram` token span of a segment that reads as a
/// meaningful phrase.
pub fn enumerate_candidates(segment: &[Token], options: &TrendOptions) -> Vec<PhraseCandidate> {
    let max_n = options.max_ngram.min(segment.len());
    let mut candidates = Vec::new();

    for start in 0..segment.len() {
        for n in 2..=max_n {
            let end = start + n;
            if end > segment.len() {
                break;
            }
            let span = &segment[start..end];
            let text: String = span.iter().map(|t| t.surface.as_str()).collect();
            if !is_meaningful(&text, options) {
                continue;
            }
            candidates.push(PhraseCandidate {
                start,
                end,
                text,
                surfaces: span.iter().map(|t| t.surface.clone()).collect(),
                content_word_only: span.iter().all(|t| t.part_of_speech().is_content_word()),
            });
        }
    }

    candidates
}

/// Order candidates most-informative first and keep those whose spans do
/// not overlap an already kept one.
pub fn select_non_overlapping(
    mut candidates: Vec<PhraseCandidate>,
    segment_len: usize,
) -> Vec<PhraseCandidate> {
    candidates.sort_by(|a, b| {
        b.token_count()
            .cmp(&a.token_count())
            .then_with(|| b.text.chars().count().cmp(&a.text.chars().count()))
            .then_with(|| b.content_word_only.cmp(&a.content_word_only))
    });

    let mut claimed = vec![false; segment_len];
    let mut selected = Vec::new();
    for candidate in candidates {
        if claimed[candidate.start..candidate.end].iter().any(|&c| c) {
            continue;
        }
        claimed[candidate.start..candidate.end].fill(true);
        selected.push(candidate);
    }
    selected
}

fn is_meaningful(text: &str, options: &TrendOptions) -> bool {
    if text.chars().count() < options.min_phrase_len {
        return false;
    }
    let normalized = normalize_key(text);
    // Kana that only reached the length floor through repeats, e.g. `ワワワワワ`.
    let short_kana = KANA_ONLY_PATTERN.is_match(&normalized)
        && normalized.chars().count() < options.min_phrase_len;
    if STOP_PHRASE_SET.contains(normalized.as_str())
        || short_kana
        || LAUGHTER_PATTERN.is_match(&normalized)
    {
        return false;
    }
    CJK_SIGNAL_PATTERN.is_match(text)
}

/// Extract the phrases one message contributes.
///
/// Returns an empty list for excluded or empty messages. Keys are unique
/// within the returned list.
pub fn extract_phrases(
    content: &str,
    tokenizer: &dyn Tokenizer,
    options: &TrendOptions,
) -> TokenizerResult<Vec<ExtractedPhrase>> {
    if filter::should_exclude(content) {
        return Ok(Vec::new());
    }
    let cleaned = filter::clean(content);
    if cleaned.is_empty() {
        return Ok(Vec::new());
    }

    let normalized_whole = normalize_key(&cleaned);
    let whole_message = || {
        vec![ExtractedPhrase {
            key: format!("{WHOLE_MESSAGE_PREFIX}{normalized_whole}"),
            display: truncate_for_display(&cleaned),
            token_count: 1,
        }]
    };

    let length = cleaned.chars().count();
    if length <= options.short_max || count_symbols(&normalized_whole) >= options.symbol_min {
        return Ok(whole_message());
    }

    let tokens = tokenizer.tokenize(&cleaned)?;
    if length <= options.no_connective_max && !tokens.iter().any(is_connective) {
        return Ok(whole_message());
    }

    let mut seen = HashSet::new();
    let mut phrases = Vec::new();
    for segment in segments(&tokens) {
        let candidates = enumerate_candidates(segment, options);
        for candidate in select_non_overlapping(candidates, segment.len()) {
            let key = candidate.key();
            if !seen.insert(key.clone()) {
                continue;
            }
            phrases.push(ExtractedPhrase {
                key,
                display: truncate_for_display(&candidate.text),
                token_count: candidate.token_count(),
            });
        }
    }
    Ok(phrases)
}
