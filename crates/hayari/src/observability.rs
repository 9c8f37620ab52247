//! Logging setup.
//!
//! Human-readable events go to stderr, filtered by `-q`/`-v`, `RUST_LOG`, or
//! the configured `log_level`.
//! When a log file is configured, JSONL events are also written to it
//! through a non-blocking appender at the configured `log_level`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

const LOG_PATH_ENV: &str = "HAYARI_LOG_PATH";
const LOG_DIR_ENV: &str = "HAYARI_LOG_DIR";
const LOG_FILE_NAME: &str = "hayari.jsonl";

/// Where and how verbosely to write the JSONL log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// JSONL log file, if file logging is enabled.
    pub log_file: Option<PathBuf>,
    /// Filter directive for the file layer.
    pub file_level: String,
}

impl ObservabilityConfig {
    /// Resolve the log file from `HAYARI_LOG_PATH`, then `HAYARI_LOG_DIR`,
    /// then the configured `log_dir`.
    pub fn from_env_with_overrides(config_log_dir: Option<PathBuf>, file_level: &str) -> Self {
        let env_path = |name: &str| {
            std::env::var_os(name)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self::resolve(
            env_path(LOG_PATH_ENV),
            env_path(LOG_DIR_ENV),
            config_log_dir,
            file_level,
        )
    }

    fn resolve(
        explicit_path: Option<PathBuf>,
        env_dir: Option<PathBuf>,
        config_dir: Option<PathBuf>,
        file_level: &str,
    ) -> Self {
        let log_file =
            explicit_path.or_else(|| env_dir.or(config_dir).map(|dir| dir.join(LOG_FILE_NAME)));
        Self {
            log_file,
            file_level: file_level.to_string(),
        }
    }
}

/// Keeps the background log writer alive; drop it last.
#[must_use]
pub struct ObservabilityGuard {
    _file: Option<WorkerGuard>,
}

fn console_directive(quiet: bool, verbose: u8, configured: &str) -> &str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    }
}

/// Console filter: explicit flags win, then `RUST_LOG`, then the configured
/// `log_level`.
pub fn env_filter(quiet: bool, verbose: u8, configured: &str) -> EnvFilter {
    if !quiet
        && verbose == 0
        && let Ok(filter) = EnvFilter::try_from_default_env()
    {
        return filter;
    }
    EnvFilter::new(console_directive(quiet, verbose, configured))
}

fn file_writer(path: &Path) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    let file_name = path
        .file_name()
        .with_context(|| format!("log path has no file name: {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber.
pub fn init_observability(
    config: &ObservabilityConfig,
    console_filter: EnvFilter,
) -> anyhow::Result<ObservabilityGuard> {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let (file_layer, guard) = match config.log_file {
        Some(ref path) => {
            let (writer, guard) = file_writer(path)?;
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new(&config.file_level));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(ObservabilityGuard { _file: guard })
}
