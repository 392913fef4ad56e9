//! # API Configuration
//!
//! Server, database and report settings for the Kasir API.
//!
//! ## Load Order (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults             port 8080, bind 0.0.0.0, kasir.db, UTC         │
//! │  2. TOML file            path from KASIR_CONFIG (optional)              │
//! │  3. Environment          PORT, KASIR_BIND_ADDR, DB_PATH / DB_CONN,      │
//! │                          KASIR_DB_MAX_CONNECTIONS,                      │
//! │                          KASIR_CHECKOUT_TIMEOUT_SECS,                   │
//! │                          KASIR_UTC_OFFSET_MINUTES                       │
//! │  4. validate()                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example File
//! ```toml
//! [server]
//! port = 8080
//! bind_addr = "127.0.0.1"
//!
//! [database]
//! path = "/var/lib/kasir/kasir.db"
//! max_connections = 5
//! checkout_timeout_secs = 10
//!
//! [report]
//! utc_offset_minutes = 420   # WIB
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use kasir_db::DbConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Environment variable naming the optional TOML file.
pub const CONFIG_PATH_ENV: &str = "KASIR_CONFIG";

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Settings Sections
// =============================================================================

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address (default: 0.0.0.0 for all interfaces).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_port() -> u16 {
    8080
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            port: default_port(),
            bind_addr: default_bind_addr(),
        }
    }
}

/// SQLite settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a writer waits for the SQLite write lock.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,

    /// Deadline for one checkout.
    #[serde(default = "default_checkout_timeout")]
    pub checkout_timeout_secs: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("kasir.db")
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout() -> u64 {
    5
}

fn default_checkout_timeout() -> u64 {
    10
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
            busy_timeout_secs: default_busy_timeout(),
            checkout_timeout_secs: default_checkout_timeout(),
        }
    }
}

/// Report settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Store time zone as minutes east of UTC. Decides where "today" starts.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

// =============================================================================
// ApiConfig
// =============================================================================

/// Complete API configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub report: ReportSettings,
}

impl ApiConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// `config_path` wins over `KASIR_CONFIG`. A named file that doesn't
    /// exist is an error; no file at all means defaults.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = config_path.or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => {
                debug!("No config file given, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML file. Missing sections and keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(?path, "Loading API config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup. Unparseable values are ignored
    /// with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = parsed::<u16>(&lookup, "PORT") {
            debug!(port = port, "Overriding port from environment");
            self.server.port = port;
        }

        if let Some(addr) = lookup("KASIR_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        // DB_CONN is accepted for deployments that still set the old name.
        if let Some(conn) = lookup("DB_PATH").or_else(|| lookup("DB_CONN")) {
            let path = conn
                .strip_prefix("sqlite://")
                .or_else(|| conn.strip_prefix("sqlite:"))
                .unwrap_or(&conn);
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = parsed::<u32>(&lookup, "KASIR_DB_MAX_CONNECTIONS") {
            self.database.max_connections = max;
        }

        if let Some(secs) = parsed::<u64>(&lookup, "KASIR_CHECKOUT_TIMEOUT_SECS") {
            self.database.checkout_timeout_secs = secs;
        }

        if let Some(minutes) = parsed::<i32>(&lookup, "KASIR_UTC_OFFSET_MINUTES") {
            self.report.utc_offset_minutes = minutes;
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.database.checkout_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "checkout_timeout_secs must be greater than 0".into(),
            ));
        }

        self.utc_offset()?;
        Ok(())
    }

    /// Address the HTTP listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.bind_addr, self.server.port)
    }

    /// Store time zone used for the today report.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        kasir_core::report::utc_offset(self.report.utc_offset_minutes)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Pool settings for kasir-db.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .busy_timeout(Duration::from_secs(self.database.busy_timeout_secs))
            .checkout_timeout(Duration::from_secs(self.database.checkout_timeout_secs))
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key = key, value = %raw, "Ignoring unparseable environment value");
            None
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
