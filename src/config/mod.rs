//! Configuration management.
//!
//! Settings are layered: built-in defaults, then a TOML config file, then
//! environment overrides.
//!
//! ```toml
//! context_dir = ".context"
//! site_output = ".context/journal-site"
//! site_name = "Session Journal"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! file = "/tmp/ctx-journal.log"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Overrides the context directory.
pub const ENV_CONTEXT_DIR: &str = "CTX_DIR";

/// Points at a config file.
pub const ENV_CONFIG_PATH: &str = "CTX_JOURNAL_CONFIG";

/// Default context directory, relative to the working directory.
pub const DEFAULT_CONTEXT_DIR: &str = ".context";

/// Journal directory inside the context directory.
pub const DIR_JOURNAL: &str = "journal";

/// Default site output directory inside the context directory.
pub const DIR_SITE_OUTPUT: &str = "journal-site";

/// Default vault output directory inside the context directory.
pub const DIR_VAULT_OUTPUT: &str = "journal-obsidian";

const APP_DIR: &str = "ctx-journal";
const CONFIG_FILE: &str = "config.toml";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name, falling back to [`LogFormat::Pretty`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `warn` or `ctx_journal=debug`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Append to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

/// Main configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalConfig {
    /// Context directory root.
    pub context_dir: PathBuf,
    /// Site output; `None` means `<context_dir>/journal-site`.
    pub site_output: Option<PathBuf>,
    /// Vault output; `None` means `<context_dir>/journal-obsidian`.
    pub vault_output: Option<PathBuf>,
    /// `site_name` for `zensical.toml`.
    pub site_name: String,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Context directory.
    pub context_dir: Option<String>,
    /// Site output directory.
    pub site_output: Option<String>,
    /// Vault output directory.
    pub vault_output: Option<String>,
    /// Site name.
    pub site_name: Option<String>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLogging {
    /// Filter directive.
    pub level: Option<String>,
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            context_dir: PathBuf::from(DEFAULT_CONTEXT_DIR),
            site_output: None,
            vault_output: None,
            site_name: crate::rendering::site::DEFAULT_SITE_NAME.to_string(),
            logging: LoggingSettings::default(),
        }
    }
}

impl JournalConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration and applies environment overrides.
    ///
    /// Lookup order: `explicit`, then `CTX_JOURNAL_CONFIG`, then the platform
    /// config directory (`ctx-journal/config.toml`), then defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named config file (argument or
    /// environment) cannot be read or parsed. A broken file in the default
    /// location is skipped with a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from));

        let config = match named {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::load_default(),
        };

        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::from_toml(&contents).map_err(|e| match e {
            Error::OperationFailed { operation, cause } => Error::OperationFailed {
                operation,
                cause: format!("{}: {cause}", path.display()),
            },
            other => other,
        })
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid config TOML.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| Error::operation("parse_config_file", e))?;
        Ok(Self::from_config_file(file))
    }

    /// Loads the platform config file, or defaults when absent or broken.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(dirs) = directories::ProjectDirs::from("", "", APP_DIR) else {
            return Self::default();
        };

        let path = dirs.config_dir().join(CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }

        Self::load_from_file(&path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
            Self::default()
        })
    }

    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(dir) = file.context_dir {
            config.context_dir = PathBuf::from(dir);
        }
        config.site_output = file.site_output.map(PathBuf::from);
        config.vault_output = file.vault_output.map(PathBuf::from);
        if let Some(name) = file.site_name.filter(|n| !n.trim().is_empty()) {
            config.site_name = name;
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                config.logging.level = level;
            }
            if let Some(format) = logging.format {
                config.logging.format = LogFormat::parse(&format);
            }
            config.logging.file = logging.file.map(PathBuf::from);
        }

        config
    }

    /// Applies environment overrides read through `lookup`.
    #[must_use]
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_CONTEXT_DIR).filter(|d| !d.is_empty()) {
            self.context_dir = PathBuf::from(dir);
        }
        self
    }

    /// Sets the context directory.
    #[must_use]
    pub fn with_context_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.context_dir = path.into();
        self
    }

    /// `<context_dir>/journal`.
    #[must_use]
    pub fn journal_dir(&self) -> PathBuf {
        self.context_dir.join(DIR_JOURNAL)
    }

    /// Site output directory.
    #[must_use]
    pub fn site_output(&self) -> PathBuf {
        self.site_output
            .clone()
            .unwrap_or_else(|| self.context_dir.join(DIR_SITE_OUTPUT))
    }

    /// Vault output directory.
    #[must_use]
    pub fn vault_output(&self) -> PathBuf {
        self.vault_output
            .clone()
            .unwrap_or_else(|| self.context_dir.join(DIR_VAULT_OUTPUT))
    }
}
