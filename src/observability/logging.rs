//! Logging configuration.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingSettings};

/// Level used for `--verbose`.
const VERBOSE_LEVEL: &str = "debug";

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Event filter. `RUST_LOG` wins over configured levels.
    pub filter: EnvFilter,
    /// Output format.
    pub format: LogFormat,
    /// Append-only log file; stderr when `None`.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Resolves settings, the verbose flag and `RUST_LOG` into a config.
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        let level = if verbose {
            VERBOSE_LEVEL
        } else {
            settings.level.as_str()
        };

        Self {
            filter: build_filter(level, std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref()),
            format: settings.format,
            file: settings.file.clone(),
        }
    }
}

/// Builds a filter from `RUST_LOG` when set and valid, else from `level`.
fn build_filter(level: &str, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .or_else(|| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_prefers_rust_log() {
        assert_eq!(build_filter("warn", Some("trace")).to_string(), "trace");
        assert_eq!(build_filter("info", None).to_string(), "info");
        assert_eq!(build_filter("info", Some("  ")).to_string(), "info");
    }

    #[test]
    fn test_verbose_uses_debug() {
        let settings = LoggingSettings {
            file: Some(PathBuf::from("/tmp/log")),
            ..LoggingSettings::default()
        };
        let config = LoggingConfig::from_settings(&settings, true);
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/log")));
    }
}
