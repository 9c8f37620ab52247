//! Error types for hayari-core.

use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised by a tokenizer backend.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// The backend could not be started.
    #[error("failed to start tokenizer `{command}`: {source}")]
    Init {
        /// The command that was spawned.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the backend failed.
    #[error("tokenizer I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backend produced output that could not be understood.
    #[error("unexpected tokenizer output: {0}")]
    Protocol(String),
}

/// Result type alias using [`TokenizerError`].
pub type TokenizerResult<T> = Result<T, TokenizerError>;

/// Errors that can occur during trend analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The tokenizer could not be initialized.
    #[error("tokenizer initialization failed: {0}")]
    TokenizerInit(String),

    /// The tokenizer failed while analysis was running.
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    /// The input contained no chat messages at all.
    #[error("no chat messages found in input")]
    NoMessages,
}

/// Result type alias using [`AnalysisError`].
pub type AnalysisResult<T> = Result<T, AnalysisError>;
