use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Default config file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "relations.toml";

/// Default SQLite database, next to the working directory
pub const DEFAULT_DATABASE_URL: &str = "sqlite://db.sqlite3";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Top-level configuration for the relations server and CLI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationsConfig {
    pub database: DatabaseConfig,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection URL, e.g. `sqlite://db.sqlite3` or `sqlite::memory:`
    pub url: String,
    /// Log every SQL statement the pool executes
    pub echo: bool,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            echo: false,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl DatabaseConfig {
    /// Config for a private in-memory database (tests, demos)
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            echo: false,
            max_connections: 1,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to bind to (default: 127.0.0.1:8000)
    pub bind: SocketAddr,
    /// Allow any CORS origin instead of localhost only
    pub cors_permissive: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            cors_permissive: false,
        }
    }
}

impl RelationsConfig {
    /// Load configuration, then apply environment overrides.
    ///
    /// An explicit `path` must exist. Without one, the first existing file of
    /// `./relations.toml` and [`Self::user_path`] is used, and built-in
    /// defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let found = std::iter::once(Self::default_path())
                    .chain(Self::user_path())
                    .find(|candidate| candidate.exists());
                match found {
                    Some(found) => Self::from_file(&found)?,
                    None => {
                        tracing::debug!("No config file found, using defaults");
                        Self::default()
                    }
                }
            }
        };

        config.apply_env_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::parse(path, e))?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// `./relations.toml`
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Per-user config location (`~/.config/relations/relations.toml`), if any
    pub fn user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("relations").join(DEFAULT_CONFIG_FILE))
    }

    /// Apply `DATABASE_URL`, `RELATIONS_DB_ECHO` and `RELATIONS_BIND`.
    ///
    /// `lookup` is the environment; tests pass a closure over a map.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }

        if let Some(echo) = lookup("RELATIONS_DB_ECHO") {
            self.database.echo = parse_bool(&echo).ok_or_else(|| {
                ConfigError::invalid_env("RELATIONS_DB_ECHO", &echo, "expected true or false")
            })?;
        }

        if let Some(bind) = lookup("RELATIONS_BIND") {
            self.server.bind = bind.parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::invalid_env("RELATIONS_BIND", &bind, e.to_string())
            })?;
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
