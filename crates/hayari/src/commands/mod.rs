//! Command implementations.

use anyhow::Context;
use camino::Utf8Path;
use hayari_core::{AnalysisError, ChatHistory, parse_line_chat_history};

pub mod info;
#[cfg(feature = "mcp")]
pub mod serve;
pub mod trends;
pub mod years;

/// Read a file after checking its size against the configured limit.
pub fn read_input_file(path: &Utf8Path, max_bytes: Option<usize>) -> anyhow::Result<String> {
    // Check size via metadata before reading into memory.
    let metadata =
        std::fs::metadata(path.as_std_path()).with_context(|| format!("failed to read {path}"))?;
    if let Some(max) = max_bytes {
        let size = metadata.len();
        if size > max as u64 {
            anyhow::bail!("input too large: {path} is {size} bytes (limit: {max} bytes)");
        }
    }

    std::fs::read_to_string(path.as_std_path()).with_context(|| format!("failed to read {path}"))
}

/// Read and parse a LINE export, failing if it holds no messages.
pub fn load_chat_history(path: &Utf8Path, max_bytes: Option<usize>) -> anyhow::Result<ChatHistory> {
    let text = read_input_file(path, max_bytes)?;
    let history = parse_line_chat_history(&text);
    if history.messages.is_empty() {
        return Err(AnalysisError::NoMessages)
            .with_context(|| format!("could not parse chat history from {path}"));
    }
    Ok(history)
}
