//! Core library for hayari.
//!
//! Finds the buzz phrases that characterize one year of a chat history:
//! short messages count as a unit, longer ones are broken into n-grams of
//! content words, and the most frequent phrases win.
//!
//! # Modules
//!
//! - [`line`] - LINE chat export parsing
//! - [`trends`] - Yearly phrase analysis entry point
//! - [`extract`] - Per-message phrase extraction
//! - [`tokenizer`] - Tokenizer trait and backends
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```no_run
//! use hayari_core::{TokenizerBackend, TrendOptions, analyze_phrase_trends, build_tokenizer};
//! use hayari_core::line::parse_line_chat_history;
//!
//! let text = std::fs::read_to_string("talk.txt").unwrap();
//! let history = parse_line_chat_history(&text);
//! let year = history.latest_year().unwrap();
//! let tokenizer = build_tokenizer(TokenizerBackend::Script, None).unwrap();
//! let report = analyze_phrase_trends(
//!     &history.to_messages(),
//!     year,
//!     tokenizer.as_ref(),
//!     &TrendOptions::default(),
//! )
//! .unwrap();
//! for row in report.phrases {
//!     println!("{} {}", row.count, row.phrase);
//! }
//! ```
#![deny(unsafe_code)]

pub mod aggregate;
pub mod config;
pub mod dates;
pub mod error;
pub mod extract;
pub mod filter;
pub mod line;
pub mod normalize;
pub mod tokenizer;
pub mod topk;
pub mod trends;

/// Default maximum input size: 5 MiB.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 5_242_880;

pub use config::{Config, ConfigLoader, ConfigSources, LogLevel};
pub use error::{
    AnalysisError, AnalysisResult, ConfigError, ConfigResult, TokenizerError, TokenizerResult,
};
pub use line::{ChatHistory, LineMessage, parse_line_chat_history};
pub use tokenizer::{Token, Tokenizer, TokenizerBackend, build_tokenizer};
pub use trends::{Message, TrendOptions, TrendPhrase, TrendReport, analyze_phrase_trends};
