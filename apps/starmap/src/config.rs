//! # Configuration
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file (`--config starmap.toml`)
//! 3. Environment variables
//!
//! CLI flags for host, port and database path are applied last by the CLI.
//!
//! ## Environment Variables
//!
//! - `STARMAP_DATABASE`: path of the redb database file
//! - `STARMAP_DIRECTORY_URL`: base URL of the commander directory
//! - `STARMAP_CORS_ORIGINS`: comma-separated origins, or `*` for all
//! - `STARMAP_RATE_LIMIT`: requests per second (0 disables)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default commander directory.
pub const DEFAULT_DIRECTORY_URL: &str = "https://jsonplaceholder.typicode.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {var}: '{value}'")]
    Env { var: &'static str, value: String },
}

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("starmap.redb"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryKind {
    #[default]
    Http,
    Static,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub kind: DirectoryKind,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Email → name table, used when `kind = "static"`.
    pub entries: BTreeMap<String, String>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            kind: DirectoryKind::Http,
            base_url: DEFAULT_DIRECTORY_URL.to_string(),
            timeout_secs: 10,
            entries: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Empty means localhost only; `["*"]` allows every origin.
    pub cors_origins: Vec<String>,
    /// Requests per second, 0 disables rate limiting.
    pub rate_limit: u32,
    pub body_limit_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            rate_limit: 100,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub directory: DirectoryConfig,
    pub http: HttpConfig,
}

impl Config {
    /// Load defaults, then the file if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `STARMAP_*` overrides read through `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(path) = lookup("STARMAP_DATABASE") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(url) = lookup("STARMAP_DIRECTORY_URL") {
            self.directory.base_url = url;
        }
        if let Some(origins) = lookup("STARMAP_CORS_ORIGINS") {
            self.http.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(value) = lookup("STARMAP_RATE_LIMIT") {
            self.http.rate_limit = value.trim().parse().map_err(|_| ConfigError::Env {
                var: "STARMAP_RATE_LIMIT",
                value,
            })?;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.directory.kind, DirectoryKind::Http);
        assert_eq!(config.directory.base_url, DEFAULT_DIRECTORY_URL);
        assert_eq!(config.http.rate_limit, 100);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [directory]
            kind = "static"
            entries = { "Sincere@april.biz" = "Leanne Graham" }
            "#,
        )
        .expect("parse");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.directory.kind, DirectoryKind::Static);
        assert_eq!(config.directory.timeout_secs, 10);
        assert_eq!(
            config.directory.entries.get("Sincere@april.biz").map(String::as_str),
            Some("Leanne Graham")
        );
        assert_eq!(config.database, DatabaseConfig::default());
    }

    #[test]
    fn sample_config_parses() {
        let config: Config =
            toml::from_str(include_str!("../../../starmap.toml")).expect("sample parses");
        assert_eq!(config.database.path, PathBuf::from("starmap.redb"));
        assert_eq!(config.directory.entries.len(), 1);
        assert_eq!(config.http, HttpConfig::default());
    }

    #[test]
    fn from_file_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[server]\nport = \"eighty\"").expect("write");

        let err = Config::from_file(file.path()).expect_err("bad port");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn from_file_missing() {
        let err = Config::from_file(Path::new("/nonexistent/starmap.toml")).expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(|var| match var {
                "STARMAP_DATABASE" => Some("/tmp/other.redb".to_string()),
                "STARMAP_CORS_ORIGINS" => Some("http://a.test, http://b.test,".to_string()),
                "STARMAP_RATE_LIMIT" => Some("0".to_string()),
                _ => None,
            })
            .expect("overrides");

        assert_eq!(config.database.path, PathBuf::from("/tmp/other.redb"));
        assert_eq!(config.http.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.http.rate_limit, 0);
    }

    #[test]
    fn env_override_rejects_bad_rate() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|var| (var == "STARMAP_RATE_LIMIT").then(|| "fast".to_string()))
            .expect_err("bad rate");
        assert!(matches!(
            err,
            ConfigError::Env {
                var: "STARMAP_RATE_LIMIT",
                ..
            }
        ));
    }
}
