//! Structured logging foundation for sb-core.
//!
//! Provides dual-mode logging:
//! - Human-readable console output for interactive use
//! - Machine-parseable JSON lines for scripted workflows
//!
//! stdout is reserved for command payloads (reports, predictions); all log
//! output goes to stderr. The level derives from `-v`/`-q` unless the
//! `SB_LOG` or `RUST_LOG` environment variables override it.

use std::io::IsTerminal;
use tracing_subscriber::{fmt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable console format.
    #[default]
    Human,
    /// JSON lines for machine consumption.
    Json,
}

/// Logging configuration resolved from CLI flags and environment.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level filter directive, e.g. "sb_core=info".
    pub level: &'static str,
    /// Output format.
    pub format: LogFormat,
    /// Whether ANSI colors are permitted.
    pub color: bool,
}

impl LogConfig {
    /// Resolve configuration from verbosity flags and environment.
    ///
    /// `-q` wins over any `-v` count; `SB_LOG_FORMAT=json` selects JSON lines.
    pub fn from_flags(verbose: u8, quiet: bool, no_color: bool) -> Self {
        let level = if quiet {
            "error"
        } else {
            match verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        };

        let format = match std::env::var("SB_LOG_FORMAT").ok().as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Human,
        };

        Self {
            level,
            format,
            color: !no_color,
        }
    }
}

/// Initialize the logging subsystem.
///
/// Must be called once at startup before any logging occurs.
/// Respects the SB_LOG and RUST_LOG environment variables.
pub fn init_logging(config: &LogConfig) {
    let filter = std::env::var("SB_LOG")
        .ok()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(format!("sb_core={}", config.level)));

    match config.format {
        LogFormat::Human => {
            let use_ansi = config.color && std::io::stderr().is_terminal();
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi)
                .without_time()
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Generate a unique run ID for this invocation.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    // Shorten to first 12 hex chars for readability
    format!("run-{}", &uuid.to_string()[..12])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(LogConfig::from_flags(0, false, false).level, "warn");
        assert_eq!(LogConfig::from_flags(1, false, false).level, "info");
        assert_eq!(LogConfig::from_flags(2, false, false).level, "debug");
        assert_eq!(LogConfig::from_flags(5, false, false).level, "trace");
    }

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(LogConfig::from_flags(3, true, false).level, "error");
    }

    #[test]
    fn run_ids_are_unique_and_prefixed() {
        let a = generate_run_id();
        let b = generate_run_id();
        assert!(a.starts_with("run-"));
        assert_eq!(a.len(), "run-".len() + 12);
        assert_ne!(a, b);
    }
}
