//! Message exclusion and cleanup.
//!
//! Chat exports interleave real messages with system notices ("message
//! unsent", "announced a message") and placeholders standing in for media.
//! Those either drop the whole message or get scrubbed before phrase
//! extraction.

use aho_corasick::AhoCorasick;
use regex::Regex;
use std::sync::LazyLock;

/// Substrings that mark a message as a system notice or media-only post.
pub const EXCLUSION_MARKERS: &[&str] = &[
    "メッセージの送信を取り消しました",
    "アナウンスしました",
    "[スタンプ]",
    "[写真]",
    "[アルバム]",
    "[ボイスメッセージ]",
    "[ノート]",
];

static EXCLUSION_MATCHER: LazyLock<AhoCorasick> =
    LazyLock::new(|| AhoCorasick::new(EXCLUSION_MARKERS).expect("valid patterns"));

/// Placeholder tags emitted by the LINE exporter.
static PLACEHOLDER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?:スタンプ|写真|動画|アルバム|ボイスメッセージ|ノート|ファイル)\]")
        .expect("valid regex")
});

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid regex"));

static MENTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[\w\-.]+").expect("valid regex"));

static WHITESPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Whether a message should be dropped before analysis.
pub fn should_exclude(content: &str) -> bool {
    EXCLUSION_MATCHER.is_match(content)
}

/// Strip placeholders, URLs, and mentions, then collapse whitespace.
///
/// Returns an empty string when nothing meaningful remains.
pub fn clean(content: &str) -> String {
    let text = PLACEHOLDER_PATTERN.replace_all(content, " ");
    let text = URL_PATTERN.replace_all(&text, " ");
    let text = MENTION_PATTERN.replace_all(&text, " ");
    WHITESPACE_PATTERN
        .replace_all(&text, " ")
        .trim()
        .to_string()
}
