//! Key normalization and display truncation.
//!
//! Chat messages spell the same phrase many ways: `やばい！！！` and
//! `やばい！！！！！！`, or an emoji with and without a trailing variation
//! selector. [`normalize_key`] folds those variants into one aggregation
//! identity, while [`truncate_for_display`] keeps a looser cap so the
//! human-facing string still carries some of the original emphasis.

use regex::Regex;
use std::sync::LazyLock;

/// Longest run of one character (or one two-character unit) kept in a key.
pub const KEY_REPEAT_CAP: usize = 2;

/// Longest run kept in display strings.
pub const DISPLAY_REPEAT_CAP: usize = 5;

// Two messages with one key must never disagree on display length.
const _: () = assert!(DISPLAY_REPEAT_CAP >= KEY_REPEAT_CAP);

/// Format characters (ZWJ, ZWNJ, BOM, ...) plus the variation selectors,
/// which Unicode files under `Mn` but which render with no width of their own.
static INVISIBLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Cf}\x{FE00}-\x{FE0F}\x{E0100}-\x{E01EF}]").expect("valid regex")
});

/// Remove invisible formatting code points.
pub fn strip_format(text: &str) -> String {
    INVISIBLE_PATTERN.replace_all(text, "").into_owned()
}

/// Normalize text into a phrase key.
///
/// Strips invisible format characters, then collapses any run of three or
/// more identical characters to two and any run of three or more repetitions
/// of the same two-character unit to two repetitions. The result is a fixed
/// point, so `normalize_key(&normalize_key(s)) == normalize_key(s)`.
pub fn normalize_key(text: &str) -> String {
    let mut chars: Vec<char> = strip_format(text).chars().collect();
    loop {
        let collapsed = collapse_pairs(&collapse_singles(&chars, KEY_REPEAT_CAP), KEY_REPEAT_CAP);
        if collapsed.len() == chars.len() {
            break;
        }
        chars = collapsed;
    }
    chars.into_iter().collect()
}

/// Cap repeats for display, keeping more emphasis than [`normalize_key`].
pub fn truncate_for_display(text: &str) -> String {
    let chars: Vec<char> = strip_format(text).chars().collect();
    collapse_pairs(&collapse_singles(&chars, DISPLAY_REPEAT_CAP), DISPLAY_REPEAT_CAP)
        .into_iter()
        .collect()
}

/// Keep at most `cap` consecutive copies of any character.
fn collapse_singles(chars: &[char], cap: usize) -> Vec<char> {
    let mut out = Vec::with_capacity(chars.len());
    let mut run = 0;
    for (i, &ch) in chars.iter().enumerate() {
        run = if i > 0 && chars[i - 1] == ch { run + 1 } else { 1 };
        if run <= cap {
            out.push(ch);
        }
    }
    out
}

/// Keep at most `cap` consecutive repetitions of any two-character unit
/// made of distinct characters (`ハハハハ` → `ハハ` is handled by
/// [`collapse_singles`]; this handles `ぴえぴえぴえ`).
fn collapse_pairs(chars: &[char], cap: usize) -> Vec<char> {
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if i + 1 < chars.len() && chars[i] != chars[i + 1] {
            let (a, b) = (chars[i], chars[i + 1]);
            let mut reps = 1;
            while i + 2 * reps + 1 < chars.len()
                && chars[i + 2 * reps] == a
                && chars[i + 2 * reps + 1] == b
            {
                reps += 1;
            }
            if reps > 1 {
                for _ in 0..reps.min(cap) {
                    out.push(a);
                    out.push(b);
                }
                i += 2 * reps;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}
