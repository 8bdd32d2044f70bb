//! Tracing subscriber setup for applications embedding the SDK
//!
//! Library code only emits `tracing` events. Binaries pick how those events
//! are rendered, either explicitly with [`init_logging`] or through
//! `BLURAY_LOG_MODE` with [`init_logging_from_env`].
//!
//! # Environment Variables
//!
//! - `BLURAY_LOG_MODE`: `silent` (default), `development`, `debug` or `json`
//! - `BLURAY_LOG_LEVEL`: filter directives, e.g. `bluray_state=debug`
//! - `RUST_LOG`: used when `BLURAY_LOG_LEVEL` is not set

use std::str::FromStr;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// How log events are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber; events are discarded
    #[default]
    Silent,
    /// Compact stderr output at `info`
    Development,
    /// Pretty stderr output at `debug` with source locations
    Debug,
    /// One JSON object per line at `info`, for log collectors
    Json,
}

impl FromStr for LoggingMode {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "silent" | "off" => Ok(LoggingMode::Silent),
            "development" | "dev" => Ok(LoggingMode::Development),
            "debug" => Ok(LoggingMode::Debug),
            "json" => Ok(LoggingMode::Json),
            other => Err(LoggingError::InvalidEnv(format!(
                "BLURAY_LOG_MODE={other}"
            ))),
        }
    }
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid environment variable: {0}")]
    InvalidEnv(String),
}

/// Install a global subscriber for `mode`
///
/// Fails if another subscriber was installed first.
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => Registry::default()
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .with(env_filter("info")?)
            .try_init()
            .map_err(|e| LoggingError::TracingInit(e.to_string())),
        LoggingMode::Debug => Registry::default()
            .with(
                fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(env_filter("debug")?)
            .try_init()
            .map_err(|e| LoggingError::TracingInit(e.to_string())),
        LoggingMode::Json => Registry::default()
            .with(fmt::layer().json().with_current_span(false))
            .with(env_filter("info")?)
            .try_init()
            .map_err(|e| LoggingError::TracingInit(e.to_string())),
    }
}

/// Install a subscriber chosen by `BLURAY_LOG_MODE`
///
/// An unset variable means silent; an unrecognized one is an error.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var("BLURAY_LOG_MODE") {
        Ok(value) => value.parse()?,
        Err(_) => LoggingMode::Silent,
    };
    init_logging(mode)
}

fn env_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    let (source, directives) = match std::env::var("BLURAY_LOG_LEVEL") {
        Ok(level) => ("BLURAY_LOG_LEVEL", level),
        Err(_) => match std::env::var("RUST_LOG") {
            Ok(rust_log) => ("RUST_LOG", rust_log),
            Err(_) => return Ok(EnvFilter::new(default_level)),
        },
    };

    EnvFilter::try_new(&directives)
        .map_err(|e| LoggingError::InvalidEnv(format!("{source}={directives}: {e}")))
}

/// Whether a global subscriber is already installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("".parse::<LoggingMode>().unwrap(), LoggingMode::Silent);
        assert_eq!("Dev".parse::<LoggingMode>().unwrap(), LoggingMode::Development);
        assert_eq!(" debug ".parse::<LoggingMode>().unwrap(), LoggingMode::Debug);
        assert_eq!("JSON".parse::<LoggingMode>().unwrap(), LoggingMode::Json);
        assert!(matches!(
            "verbose".parse::<LoggingMode>(),
            Err(LoggingError::InvalidEnv(_))
        ));
    }

    #[test]
    fn test_silent_mode_installs_nothing() {
        assert!(init_logging(LoggingMode::Silent).is_ok());
    }
}
