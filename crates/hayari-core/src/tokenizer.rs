//! Tokenizer adapters.
//!
//! Phrase extraction needs part-of-speech tagged tokens. The morphological
//! analyzer itself is an outside capability, so this module only defines the
//! seam ([`Tokenizer`]) and two backends:
//!
//! - [`ScriptTokenizer`]: built in. Splits on Unicode script boundaries and
//!   tags runs with a small table of Japanese function words. Good enough to
//!   run without a dictionary; not morphologically correct.
//! - [`MecabTokenizer`]: drives an external MeCab-compatible process over
//!   stdin/stdout and passes its IPADIC feature strings through.
//!
//! Any `Fn(&str) -> Vec<Token>` is also a [`Tokenizer`], which is how tests
//! and embedding applications inject their own analyzer.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{LazyLock, Mutex};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult, TokenizerError, TokenizerResult};
use crate::extract::is_emphasis;

/// A surface form with its part-of-speech tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Text exactly as it appears in the input.
    pub surface: String,
    /// Part-of-speech feature string, e.g. `名詞,一般` or `noun`.
    pub pos: String,
}

impl Token {
    /// Create a token from a surface form and tag.
    pub fn new(surface: impl Into<String>, pos: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            pos: pos.into(),
        }
    }

    /// The coarse category of this token's tag.
    pub fn part_of_speech(&self) -> PartOfSpeech {
        PartOfSpeech::from_tag(&self.pos)
    }
}

/// Coarse part-of-speech categories used by phrase extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfSpeech {
    /// 名詞
    Noun,
    /// 動詞
    Verb,
    /// 形容詞
    Adjective,
    /// 副詞
    Adverb,
    /// 接続詞
    Conjunction,
    /// 助詞
    Particle,
    /// 助動詞
    Auxiliary,
    /// 記号 (punctuation, symbols, whitespace)
    Symbol,
    /// Anything else (interjections, prefixes, fillers, unknown tags).
    Other,
}

impl PartOfSpeech {
    /// Classify a tag by its leading category.
    ///
    /// Accepts IPADIC feature strings (`名詞,固有名詞,...`) and plain
    /// English category names (`noun`, `Verb`, ...).
    pub fn from_tag(tag: &str) -> Self {
        const PREFIXES: &[(&str, PartOfSpeech)] = &[
            ("名詞", PartOfSpeech::Noun),
            ("動詞", PartOfSpeech::Verb),
            ("形容詞", PartOfSpeech::Adjective),
            ("副詞", PartOfSpeech::Adverb),
            ("接続詞", PartOfSpeech::Conjunction),
            ("助動詞", PartOfSpeech::Auxiliary),
            ("助詞", PartOfSpeech::Particle),
            ("記号", PartOfSpeech::Symbol),
        ];
        if let Some((_, pos)) = PREFIXES.iter().find(|(p, _)| tag.starts_with(p)) {
            return *pos;
        }

        let head = tag.split(',').next().unwrap_or_default().trim();
        match head.to_ascii_lowercase().as_str() {
            "noun" => Self::Noun,
            "verb" => Self::Verb,
            "adjective" => Self::Adjective,
            "adverb" => Self::Adverb,
            "conjunction" => Self::Conjunction,
            "particle" => Self::Particle,
            "auxiliary" => Self::Auxiliary,
            "symbol" => Self::Symbol,
            _ => Self::Other,
        }
    }

    /// Nouns, verbs, adjectives, and adverbs carry phrase meaning.
    pub const fn is_content_word(self) -> bool {
        matches!(
            self,
            Self::Noun | Self::Verb | Self::Adjective | Self::Adverb
        )
    }
}

/// Morphological analysis capability.
pub trait Tokenizer {
    /// Split `text` into tagged tokens whose surfaces concatenate back to
    /// `text`, in order.
    fn tokenize(&self, text: &str) -> TokenizerResult<Vec<Token>>;
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> Vec<Token>,
{
    fn tokenize(&self, text: &str) -> TokenizerResult<Vec<Token>> {
        Ok(self(text))
    }
}

/// Available tokenizer backends.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum TokenizerBackend {
    /// Built-in script-boundary heuristic (no dictionary needed).
    #[default]
    Script,
    /// External MeCab-compatible process.
    Mecab,
}

impl TokenizerBackend {
    /// Returns the backend name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Mecab => "mecab",
        }
    }
}

impl std::fmt::Display for TokenizerBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default command line for the MeCab backend.
pub const DEFAULT_MECAB_COMMAND: &str = "mecab";

/// Construct the selected backend.
///
/// Initialization failures are reported here, before any analysis runs.
#[tracing::instrument]
pub fn build_tokenizer(
    backend: TokenizerBackend,
    mecab_command: Option<&str>,
) -> AnalysisResult<Box<dyn Tokenizer + Send + Sync>> {
    match backend {
        TokenizerBackend::Script => Ok(Box::new(ScriptTokenizer::new())),
        TokenizerBackend::Mecab => {
            let command = mecab_command.unwrap_or(DEFAULT_MECAB_COMMAND);
            let tokenizer = MecabTokenizer::spawn(command)
                .map_err(|e| AnalysisError::TokenizerInit(e.to_string()))?;
            Ok(Box::new(tokenizer))
        }
    }
}

// ---------------------------------------------------------------------------
// Script heuristic
// ---------------------------------------------------------------------------

static RUN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<han>[\p{Han}々〆]+)|(?P<kata>[\p{Katakana}ーｰ]+)|(?P<hira>\p{Hiragana}+)|(?P<word>[\p{L}\p{N}_]+)|(?P<space>\s+)|(?P<sym>.)",
    )
    .expect("valid regex")
});

/// Function words peeled off the front of a hiragana run.
const LEADING_FUNCTION_WORDS: &[(&str, &str)] = &[
    ("そして", "接続詞"),
    ("だから", "接続詞"),
    ("しかし", "接続詞"),
    ("それで", "接続詞"),
    ("なので", "接続詞"),
    ("じゃあ", "接続詞"),
    ("でも", "接続詞"),
    ("から", "助詞,格助詞"),
    ("まで", "助詞,副助詞"),
    ("より", "助詞,格助詞"),
    ("って", "助詞,格助詞"),
    ("は", "助詞,係助詞"),
    ("が", "助詞,格助詞"),
    ("を", "助詞,格助詞"),
    ("に", "助詞,格助詞"),
    ("で", "助詞,格助詞"),
    ("と", "助詞,格助詞"),
    ("も", "助詞,係助詞"),
    ("の", "助詞,連体化"),
    ("へ", "助詞,格助詞"),
    ("や", "助詞,並立助詞"),
];

/// Function words peeled off the back of a hiragana run.
const TRAILING_FUNCTION_WORDS: &[(&str, &str)] = &[
    ("でした", "助動詞"),
    ("ました", "助動詞"),
    ("ません", "助動詞"),
    ("でしょう", "助動詞"),
    ("だった", "助動詞"),
    ("けれど", "助詞,接続助詞"),
    ("です", "助動詞"),
    ("ます", "助動詞"),
    ("たい", "助動詞"),
    ("ない", "助動詞"),
    ("けど", "助詞,接続助詞"),
    ("から", "助詞,接続助詞"),
    ("だ", "助動詞"),
    ("た", "助動詞"),
    ("ね", "助詞,終助詞"),
    ("よ", "助詞,終助詞"),
    ("な", "助詞,終助詞"),
    ("か", "助詞,副助詞／並立助詞／終助詞"),
    ("わ", "助詞,終助詞"),
    ("ぞ", "助詞,終助詞"),
];

/// Tokenizer that tags runs of one Unicode script.
///
/// Han runs become nouns, or verbs/adjectives when okurigana follows.
/// Katakana, Latin, and digit runs become nouns. Hiragana runs are split
/// against a fixed table of particles, auxiliaries, and conjunctions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptTokenizer;

impl ScriptTokenizer {
    /// Create the tokenizer.
    pub const fn new() -> Self {
        Self
    }

    fn tag_run(tokens: &mut Vec<Token>, kind: &str, run: &str) {
        match kind {
            "han" | "kata" | "word" => {
                if is_emphasis(run) {
                    tokens.push(Token::new(run, "記号,一般"));
                } else {
                    tokens.push(Token::new(run, "名詞,一般"));
                }
            }
            "hira" => Self::split_hiragana(tokens, run),
            "space" => tokens.push(Token::new(run, "記号,空白")),
            _ => tokens.push(Token::new(run, "記号,一般")),
        }
    }

    fn split_hiragana(tokens: &mut Vec<Token>, run: &str) {
        if let Some((word, tag)) = TRAILING_FUNCTION_WORDS.iter().find(|(w, _)| *w == run) {
            tokens.push(Token::new(*word, *tag));
            return;
        }

        let mut rest = run;
        let mut leading = Vec::new();
        while let Some((word, tag)) = longest_prefix(rest, LEADING_FUNCTION_WORDS) {
            leading.push(Token::new(word, tag));
            rest = &rest[word.len()..];
        }

        let mut trailing = Vec::new();
        while let Some((word, tag)) = longest_suffix(rest, TRAILING_FUNCTION_WORDS) {
            trailing.push(Token::new(word, tag));
            rest = &rest[..rest.len() - word.len()];
        }
        trailing.reverse();

        if !rest.is_empty() {
            let attaches_to_han = leading.is_empty()
                && tokens
                    .last()
                    .is_some_and(|t| t.pos.starts_with("名詞") && is_han_run(&t.surface));
            if attaches_to_han {
                // Okurigana: fold into the preceding kanji stem.
                if let Some(stem) = tokens.last_mut() {
                    stem.surface.push_str(rest);
                    stem.pos = inflected_tag(rest).to_string();
                }
            } else {
                leading.push(Token::new(rest, standalone_hiragana_tag(rest)));
            }
        }

        tokens.extend(leading);
        tokens.extend(trailing);
    }
}

impl Tokenizer for ScriptTokenizer {
    fn tokenize(&self, text: &str) -> TokenizerResult<Vec<Token>> {
        let mut tokens = Vec::new();
        for caps in RUN_PATTERN.captures_iter(text) {
            for kind in ["han", "kata", "hira", "word", "space", "sym"] {
                if let Some(m) = caps.name(kind) {
                    Self::tag_run(&mut tokens, kind, m.as_str());
                    break;
                }
            }
        }
        Ok(tokens)
    }
}

fn longest_prefix<'a>(
    text: &str,
    table: &'a [(&'a str, &'a str)],
) -> Option<(&'a str, &'a str)> {
    table
        .iter()
        .filter(|(word, _)| text.starts_with(word))
        .max_by_key(|(word, _)| word.len())
        .copied()
}

fn longest_suffix<'a>(
    text: &str,
    table: &'a [(&'a str, &'a str)],
) -> Option<(&'a str, &'a str)> {
    table
        .iter()
        .filter(|(word, _)| text.len() > word.len() && text.ends_with(word))
        .max_by_key(|(word, _)| word.len())
        .copied()
}

fn is_han_run(text: &str) -> bool {
    static HAN: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[\p{Han}々〆]+$").expect("valid regex"));
    HAN.is_match(text)
}

fn inflected_tag(okurigana: &str) -> &'static str {
    if okurigana.ends_with('い') {
        "形容詞,自立"
    } else {
        "動詞,自立"
    }
}

fn standalone_hiragana_tag(text: &str) -> &'static str {
    if text.ends_with('い') {
        "形容詞,自立"
    } else {
        "副詞,一般"
    }
}

// ---------------------------------------------------------------------------
// MeCab process
// ---------------------------------------------------------------------------

struct MecabProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Tokenizer backed by a long-running MeCab-compatible process.
///
/// One line of input is written per call; output lines of the form
/// `surface\tfeature,feature,...` are read until `EOS`.
pub struct MecabTokenizer {
    command: String,
    process: Mutex<MecabProcess>,
}

impl std::fmt::Debug for MecabTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MecabTokenizer")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

impl MecabTokenizer {
    /// Spawn from a whitespace-separated command line such as
    /// `mecab -d /usr/lib/mecab/dic/ipadic`.
    pub fn spawn(command_line: &str) -> TokenizerResult<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next().unwrap_or(DEFAULT_MECAB_COMMAND);
        let args: Vec<&str> = parts.collect();
        Self::spawn_with(program, &args)
    }

    /// Spawn `program` with explicit arguments.
    #[tracing::instrument]
    pub fn spawn_with(program: &str, args: &[&str]) -> TokenizerResult<Self> {
        let command = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| TokenizerError::Init {
                command: command.clone(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TokenizerError::Protocol("child stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| TokenizerError::Protocol("child stdout unavailable".to_string()))?;

        tracing::debug!(%command, pid = child.id(), "tokenizer process started");
        Ok(Self {
            command,
            process: Mutex::new(MecabProcess {
                child,
                stdin,
                stdout,
            }),
        })
    }
}

impl Tokenizer for MecabTokenizer {
    fn tokenize(&self, text: &str) -> TokenizerResult<Vec<Token>> {
        let mut process = self
            .process
            .lock()
            .map_err(|_| TokenizerError::Protocol("tokenizer lock poisoned".to_string()))?;

        // The protocol is line based; a newline would end the request early.
        let line = text.replace(['\r', '\n'], " ");
        writeln!(process.stdin, "{line}")?;
        process.stdin.flush()?;

        let mut tokens = Vec::new();
        let mut buf = String::new();
        loop {
            buf.clear();
            if process.stdout.read_line(&mut buf)? == 0 {
                return Err(TokenizerError::Protocol(
                    "output ended before EOS".to_string(),
                ));
            }
            let row = buf.trim_end_matches(['\r', '\n']);
            if row == "EOS" {
                break;
            }
            let (surface, features) = row
                .split_once('\t')
                .ok_or_else(|| TokenizerError::Protocol(format!("malformed line: {row:?}")))?;
            tokens.push(Token::new(surface, features));
        }
        Ok(tokens)
    }
}

impl Drop for MecabTokenizer {
    fn drop(&mut self) {
        if let Ok(process) = self.process.get_mut() {
            let _ = process.child.kill();
            let _ = process.child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surfaces(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.surface.as_str()).collect()
    }

    #[test]
    fn classifies_ipadic_tags() {
        assert_eq!(PartOfSpeech::from_tag("名詞,一般,*,*"), PartOfSpeech::Noun);
        assert_eq!(PartOfSpeech::from_tag("動詞,自立"), PartOfSpeech::Verb);
        assert_eq!(PartOfSpeech::from_tag("助動詞"), PartOfSpeech::Auxiliary);
        assert_eq!(PartOfSpeech::from_tag("助詞,係助詞"), PartOfSpeech::Particle);
        assert_eq!(PartOfSpeech::from_tag("記号,句点"), PartOfSpeech::Symbol);
        assert_eq!(PartOfSpeech::from_tag("感動詞"), PartOfSpeech::Other);
    }

    #[test]
    fn classifies_english_tags() {
        assert_eq!(PartOfSpeech::from_tag("noun"), PartOfSpeech::Noun);
        assert_eq!(PartOfSpeech::from_tag("Adverb"), PartOfSpeech::Adverb);
        assert_eq!(PartOfSpeech::from_tag("conjunction,x"), PartOfSpeech::Conjunction);
        assert_eq!(PartOfSpeech::from_tag(""), PartOfSpeech::Other);
    }

    #[test]
    fn closures_are_tokenizers() {
        let tok = |text: &str| vec![Token::new(text, "noun")];
        let tokens = tok.tokenize("ラーメン").unwrap();
        assert_eq!(tokens, vec![Token::new("ラーメン", "noun")]);
    }

    #[test]
    fn script_tokenizer_reconstructs_input() {
        let text = "今日はラーメン食べた！ 最高 www";
        let tokens = ScriptTokenizer::new().tokenize(text).unwrap();
        let joined: String = tokens.iter().map(|t| t.surface.as_str()).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn script_tokenizer_splits_particles() {
        let tokens = ScriptTokenizer::new().tokenize("今日はラーメン").unwrap();
        assert_eq!(surfaces(&tokens), vec!["今日", "は", "ラーメン"]);
        assert_eq!(tokens[1].part_of_speech(), PartOfSpeech::Particle);
        assert_eq!(tokens[2].part_of_speech(), PartOfSpeech::Noun);
    }

    #[test]
    fn script_tokenizer_attaches_okurigana() {
        let tokens = ScriptTokenizer::new().tokenize("ラーメン食べた").unwrap();
        assert_eq!(surfaces(&tokens), vec!["ラーメン", "食べ", "た"]);
        assert_eq!(tokens[1].part_of_speech(), PartOfSpeech::Verb);
        assert_eq!(tokens[2].part_of_speech(), PartOfSpeech::Auxiliary);
    }

    #[test]
    fn script_tokenizer_keeps_whole_auxiliary() {
        let tokens = ScriptTokenizer::new().tokenize("最高です").unwrap();
        assert_eq!(surfaces(&tokens), vec!["最高", "です"]);
        assert_eq!(tokens[1].part_of_speech(), PartOfSpeech::Auxiliary);
    }

    #[test]
    fn script_tokenizer_tags_emphasis_as_symbol() {
        let tokens = ScriptTokenizer::new().tokenize("最高！！").unwrap();
        assert_eq!(surfaces(&tokens), vec!["最高", "！", "！"]);
        assert_eq!(tokens[1].part_of_speech(), PartOfSpeech::Symbol);
    }

    #[test]
    fn backend_names() {
        assert_eq!(TokenizerBackend::Script.as_str(), "script");
        assert_eq!(TokenizerBackend::Mecab.to_string(), "mecab");
        assert_eq!(TokenizerBackend::default(), TokenizerBackend::Script);
    }

    #[test]
    fn missing_mecab_binary_fails_initialization() {
        let result = build_tokenizer(
            TokenizerBackend::Mecab,
            Some("hayari-definitely-not-installed-mecab"),
        );
        assert!(matches!(result, Err(AnalysisError::TokenizerInit(_))));
    }

    #[cfg(unix)]
    #[test]
    fn mecab_protocol_round_trip() {
        // Stand-in for mecab: every input line becomes one noun token.
        let script = r#"while IFS= read -r line; do printf '%s\t名詞,一般\nEOS\n' "$line"; done"#;
        let tokenizer = MecabTokenizer::spawn_with("sh", &["-c", script]).unwrap();

        let first = tokenizer.tokenize("ラーメン").unwrap();
        assert_eq!(first, vec![Token::new("ラーメン", "名詞,一般")]);

        let second = tokenizer.tokenize("最高").unwrap();
        assert_eq!(second[0].surface, "最高");
    }

    #[cfg(unix)]
    #[test]
    fn mecab_malformed_output_is_protocol_error() {
        let tokenizer = MecabTokenizer::spawn_with("cat", &[]).unwrap();
        let err = tokenizer.tokenize("no tab here").unwrap_err();
        assert!(matches!(err, TokenizerError::Protocol(_)));
    }
}
