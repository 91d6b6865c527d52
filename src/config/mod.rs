//! Configuration management for sdgcount
//!
//! Settings come from an optional TOML file, then the process environment
//! (`DBNAME`, `PORT`, `USERNAME`, `PASSWORD`, `HOST`) overrides them.
//! `DEBUG` is read separately by [`debug_from_env`] so logging can be set up
//! before any configuration is loaded.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// PostgreSQL connection settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Full-text search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// PostgreSQL connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_host")]
    pub host: String,

    #[serde(default = "default_db_port")]
    pub port: u16,

    #[serde(default = "default_db_username")]
    pub username: String,

    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    #[serde(default = "default_db_name")]
    pub dbname: String,

    /// Maximum pooled connections
    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait when acquiring a connection
    #[serde(default = "default_db_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

/// Full-text search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Text search configuration name (e.g. `english`)
    #[serde(default = "default_search_language")]
    pub language: String,

    /// Name of the corpus table
    #[serde(default = "default_docs_table")]
    pub docs_table: String,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Config file the settings were read from, if any
    pub config_file: Option<PathBuf>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_db_host(),
            port: default_db_port(),
            username: default_db_username(),
            password: None,
            dbname: default_db_name(),
            max_connections: default_db_max_connections(),
            acquire_timeout_secs: default_db_acquire_timeout(),
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("dbname", &self.dbname)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            language: default_search_language(),
            docs_table: default_docs_table(),
        }
    }
}

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("valid identifier regex"))
}

/// Interpret a flag-like environment value (`DEBUG=true`, `DEBUG=1`)
pub fn env_flag(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}

/// Whether `DEBUG` asks for debug output
pub fn debug_from_env() -> bool {
    std::env::var("DEBUG").is_ok_and(|v| env_flag(&v))
}

impl Config {
    /// Get the default config file path (`<config dir>/sdgcount/config.toml`)
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sdgcount")
            .join("config.toml")
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.paths = PathsConfig {
            config_file: Some(config_path.to_path_buf()),
        };
        Ok(config)
    }

    /// Resolve the effective configuration for a run
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present and built-in defaults otherwise. Environment overrides are
    /// applied last and the result is validated.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => {
                let default_path = Self::default_config_path();
                if default_path.exists() {
                    Self::load(&default_path)?
                } else {
                    debug!("No config file found, using defaults");
                    Config::default()
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-style overrides; empty values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("HOST") {
            self.database.host = host;
        }
        if let Some(port) = get("PORT") {
            self.database.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PORT must be a port number, got '{}'", port)))?;
        }
        if let Some(username) = get("USERNAME") {
            self.database.username = username;
        }
        if let Some(password) = get("PASSWORD") {
            self.database.password = Some(password);
        }
        if let Some(dbname) = get("DBNAME") {
            self.database.dbname = dbname;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.port == 0 {
            return Err(Error::Config("database.port must be non-zero".to_string()));
        }

        if self.database.dbname.trim().is_empty() {
            return Err(Error::Config("database.dbname must not be empty".to_string()));
        }

        if self.database.max_connections == 0 {
            return Err(Error::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        if !self
            .search
            .language
            .chars()
            .all(|c| c.is_ascii_lowercase() || c == '_')
            || self.search.language.is_empty()
        {
            return Err(Error::Config(format!(
                "search.language must be a text search configuration name, got '{}'",
                self.search.language
            )));
        }

        if !identifier_regex().is_match(&self.search.docs_table) {
            return Err(Error::Config(format!(
                "search.docs_table must be a plain lowercase identifier, got '{}'",
                self.search.docs_table
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database.host, "127.0.0.1");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.dbname, "dspace");
        assert_eq!(config.search.language, "english");
        assert_eq!(config.search.docs_table, "docs");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "[database]\nhost = \"db.internal\"\nport = 6543\n\n[search]\nlanguage = \"simple\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.database.username, "dspace");
        assert_eq!(config.search.language, "simple");
        assert_eq!(config.paths.config_file.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = Config::resolve(Some(&tmp.path().join("nope.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("HOST", "10.0.0.5"),
            ("PORT", "5433"),
            ("USERNAME", "reader"),
            ("PASSWORD", "secret"),
            ("DBNAME", "repo"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.database.host, "10.0.0.5");
        assert_eq!(config.database.port, 5433);
        assert_eq!(config.database.username, "reader");
        assert_eq!(config.database.password.as_deref(), Some("secret"));
        assert_eq!(config.database.dbname, "repo");
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let vars = env(&[("HOST", ""), ("PASSWORD", "  ")]);
        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.database.host, "127.0.0.1");
        assert!(config.database.password.is_none());
    }

    #[test]
    fn test_env_flag() {
        assert!(env_flag("true"));
        assert!(env_flag("1"));
        assert!(env_flag("yes"));
        assert!(!env_flag(""));
        assert!(!env_flag("0"));
        assert!(!env_flag("FALSE"));
    }

    #[test]
    fn test_bad_port_override() {
        let vars = env(&[("PORT", "postgres")]);
        let mut config = Config::default();
        let result = config.apply_overrides(|k| vars.get(k).cloned());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.search.language = "english'); DROP TABLE item; --".to_string();
        assert!(config.validate().is_err());
        config.search.language = "english".to_string();

        config.search.docs_table = "Docs".to_string();
        assert!(config.validate().is_err());
        config.search.docs_table = "docs_2023".to_string();
        assert!(config.validate().is_ok());

        config.database.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_password_is_redacted() {
        let mut config = Config::default();
        config.database.password = Some("hunter2".to_string());
        let rendered = format!("{:?}", config.database);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("***"));
    }
}
