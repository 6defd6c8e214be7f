//! Configuration loading.
//!
//! All fields are required. The file is looked up from `--config`, then
//! `FARM_CSV_CONFIG`, then the platform config directory.

use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audit::AuditLog;

pub const CONFIG_ENV: &str = "FARM_CSV_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub database: DatabaseConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite file path or `file:` URI
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Holds `<basename>/<basename>.csv` for every table
    pub csv_root: PathBuf,
    pub errors_log: PathBuf,
    pub duplicates_log: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or FARM_CSV_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl Config {
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(config_path_from_env)
            .or_else(default_config_path)
            .ok_or(ConfigError::MissingConfigPath)?;
        Self::from_path(&path)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.url",
                reason: "must not be empty".to_string(),
            });
        }
        let paths = [
            ("paths.csv_root", &self.paths.csv_root),
            ("paths.errors_log", &self.paths.errors_log),
            ("paths.duplicates_log", &self.paths.duplicates_log),
        ];
        for (field, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn audit_log(&self) -> AuditLog {
        AuditLog::new(&self.paths.errors_log, &self.paths.duplicates_log)
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var_os(CONFIG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// `config.toml` in the platform config directory, if it exists
pub fn default_config_path() -> Option<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "farm-csv-to-sqlite")?;
    let path = proj_dirs.config_dir().join("config.toml");
    path.exists().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[database]
url = "granja.db"

[paths]
csv_root = "datos"
errors_log = "logs/errores.log"
duplicates_log = "logs/duplicados.log"
"#;

    #[test]
    fn test_parse_sample() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.database.url, "granja.db");
        assert_eq!(config.paths.csv_root, PathBuf::from("datos"));
        assert_eq!(
            config.audit_log().duplicates_path(),
            Path::new("logs/duplicados.log")
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let text = SAMPLE.replace("[database]", "[database]\nuser = \"root\"");
        assert!(matches!(Config::parse(&text), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_section_rejected() {
        let text = "[database]\nurl = \"granja.db\"\n";
        assert!(matches!(Config::parse(text), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_empty_url_rejected() {
        let text = SAMPLE.replace("\"granja.db\"", "\"  \"");
        assert!(matches!(
            Config::parse(&text),
            Err(ConfigError::InvalidValue {
                field: "database.url",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_path(Path::new("/nonexistent/farm.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
