//! Configuration management for profilebook.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::render::{ExportFormat, PrintOptions};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "profilebook";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "profiles.db";

/// Default session file name.
const SESSION_FILE_NAME: &str = "session.json";

/// Default user list file name.
const USERS_FILE_NAME: &str = "users.json";

/// Default export directory name inside the data directory.
const EXPORT_DIR_NAME: &str = "exports";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "PROFILEBOOK_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (`PROFILEBOOK_<SECTION>__<KEY>`)
/// 2. TOML config file at `~/.config/profilebook/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Session configuration.
    pub session: SessionConfig,
    /// Print layout configuration.
    pub print: PrintOptions,
    /// Document export configuration.
    pub export: ExportConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/profilebook/profiles.db`
    pub database_path: Option<PathBuf>,
}

/// Session-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Path to the session file.
    /// Defaults to `~/.local/share/profilebook/session.json`
    pub session_path: Option<PathBuf>,
    /// Path to the user list.
    /// Defaults to `~/.local/share/profilebook/users.json`
    pub users_path: Option<PathBuf>,
}

/// Export-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory documents are written to.
    /// Defaults to `~/.local/share/profilebook/exports`
    pub output_dir: Option<PathBuf>,
    /// File stem for the all-profiles document.
    pub bulk_file_stem: String,
    /// Document format written by `export`.
    pub format: ExportFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            bulk_file_stem: "all-profiles".to_string(),
            format: ExportFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `PROFILEBOOK_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let config: Config = Self::figment(config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(config_file: PathBuf) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let stem = self.export.bulk_file_stem.trim();
        if stem.is_empty() {
            return Err(Error::ConfigValidation {
                message: "export.bulk_file_stem must not be empty".to_string(),
            });
        }
        if stem.contains(['/', '\\']) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "export.bulk_file_stem must be a file name, not a path: {stem}"
                ),
            });
        }

        if self.print.empty_placeholder.is_empty() {
            return Err(Error::ConfigValidation {
                message: "print.empty_placeholder must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the session file path, resolving defaults if not set.
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        self.session
            .session_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(SESSION_FILE_NAME))
    }

    /// Get the user list path, resolving defaults if not set.
    #[must_use]
    pub fn users_path(&self) -> PathBuf {
        self.session
            .users_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(USERS_FILE_NAME))
    }

    /// Get the export directory, resolving defaults if not set.
    #[must_use]
    pub fn export_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(EXPORT_DIR_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DEFAULT_EMPTY_PLACEHOLDER, DEFAULT_HEADER_TITLE};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert!(config.session.session_path.is_none());
        assert_eq!(config.print.header_title, DEFAULT_HEADER_TITLE);
        assert_eq!(config.print.empty_placeholder, DEFAULT_EMPTY_PLACEHOLDER);
        assert_eq!(config.export.bulk_file_stem, "all-profiles");
        assert_eq!(config.export.format, ExportFormat::Pdf);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_bulk_stem() {
        let mut config = Config::default();
        config.export.bulk_file_stem = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("bulk_file_stem"));
    }

    #[test]
    fn test_validate_bulk_stem_with_separator() {
        let mut config = Config::default();
        config.export.bulk_file_stem = "out/all".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("not a path"));
    }

    #[test]
    fn test_validate_empty_placeholder() {
        let mut config = Config::default();
        config.print.empty_placeholder = String::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("empty_placeholder"));
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("profiles.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_session_and_export_defaults() {
        let config = Config::default();
        assert!(config.session_path().to_string_lossy().contains("session.json"));
        assert!(config.users_path().ends_with("users.json"));
        assert!(config.export_dir().ends_with("exports"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("profilebook"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.export.bulk_file_stem, "all-profiles");
    }

    #[test]
    fn test_load_from_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[storage]
database_path = "/tmp/book.db"

[print]
header_title = "Registry"

[export]
bulk_file_stem = "everyone"
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/book.db"));
        assert_eq!(config.print.header_title, "Registry");
        assert_eq!(config.print.empty_placeholder, DEFAULT_EMPTY_PLACEHOLDER);
        assert_eq!(config.export.bulk_file_stem, "everyone");
    }

    #[test]
    fn test_single_file_section_overrides_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[print]\nheader_title = \"Registry\"\n").unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.print.header_title, "Registry");
        assert_eq!(config.export.bulk_file_stem, "all-profiles");
    }

    #[test]
    fn test_load_export_format_from_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[export]\nformat = \"html\"\n").unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.export.format, ExportFormat::Html);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[export]\nbulk_file_stem = \"\"\n").unwrap();

        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[storage\n").unwrap();

        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigLoad(_)));
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[print]\nheader_title = \"From file\"\n")?;
            jail.set_env("PROFILEBOOK_PRINT__HEADER_TITLE", "From env");

            let config: Config = Config::figment(PathBuf::from("config.toml")).extract()?;
            assert_eq!(config.print.header_title, "From env");
            Ok(())
        });
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("bulk_file_stem"));
        assert!(json.contains("header_title"));
    }
}
