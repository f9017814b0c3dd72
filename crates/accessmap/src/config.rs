//! Configuration for accessmap.
//!
//! Four sections: `storage`, `server`, `auth` and `query`. Values are
//! layered with figment and checked by [`Config::validate`] before use.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "accessmap";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "accessmap.db";

/// Longest session lifetime accepted, ten years.
pub const MAX_SESSION_TTL_HOURS: u32 = 24 * 365 * 10;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ACCESSMAP_`, sections split on `__`)
/// 2. TOML config file at `~/.config/accessmap/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Session and identity configuration.
    pub auth: AuthConfig,
    /// Query limits and defaults.
    pub query: QueryConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/accessmap/accessmap.db`
    pub database_path: Option<PathBuf>,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the API listens on.
    pub bind_address: String,
    /// Answer cross-origin requests from any origin.
    pub cors_enabled: bool,
    /// Interval between expired-session sweeps, in minutes. 0 disables.
    pub session_prune_interval_minutes: u64,
}

/// Session and identity configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Lifetime of an issued session in hours.
    pub session_ttl_hours: u32,
    /// Open id that is promoted to admin on sign-in.
    pub owner_open_id: Option<String>,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
}

/// Query defaults and caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Radius used when a nearby query omits one.
    pub default_radius_km: f64,
    /// Largest radius a nearby query may ask for.
    pub max_radius_km: f64,
    /// Route history entries returned when no limit is given.
    pub default_history_limit: usize,
    /// Largest route history page.
    pub max_history_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            cors_enabled: false,
            session_prune_interval_minutes: 60,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "app_session_id".to_string(),
            session_ttl_hours: 24 * 30,
            owner_open_id: None,
            secure_cookies: true,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_radius_km: 1.0,
            max_radius_km: 50.0,
            default_history_limit: 10,
            max_history_limit: 100,
        }
    }
}

impl Config {
    /// Load from the default file location and the environment.
    ///
    /// # Errors
    ///
    /// Fails when a source cannot be parsed or the result is invalid.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load with an explicit file, falling back to [`Config::default_config_path`].
    ///
    /// Later layers win: built-in defaults, then the TOML file when present,
    /// then `ACCESSMAP_` variables (`__` separates section and key).
    ///
    /// # Errors
    ///
    /// Fails when a source cannot be parsed or the result is invalid.
    pub fn load_from(file: Option<PathBuf>) -> Result<Self> {
        let file = file.unwrap_or_else(Self::default_config_path);

        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(&file))
            .merge(Env::prefixed("ACCESSMAP_").split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/accessmap/config.toml`.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Directory holding the database unless one is configured.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Check radius, history, session and bind settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        let query = &self.query;
        if !(query.max_radius_km.is_finite() && query.max_radius_km > 0.0) {
            return Err(invalid(format!(
                "max_radius_km must be a positive number, got {}",
                query.max_radius_km
            )));
        }
        if !(query.default_radius_km.is_finite() && query.default_radius_km > 0.0) {
            return Err(invalid(format!(
                "default_radius_km must be a positive number, got {}",
                query.default_radius_km
            )));
        }
        if query.default_radius_km > query.max_radius_km {
            return Err(invalid(format!(
                "default_radius_km ({}) cannot be greater than max_radius_km ({})",
                query.default_radius_km, query.max_radius_km
            )));
        }
        if query.default_history_limit == 0 || query.max_history_limit == 0 {
            return Err(invalid("history limits must be greater than 0"));
        }
        if query.default_history_limit > query.max_history_limit {
            return Err(invalid(format!(
                "default_history_limit ({}) cannot be greater than max_history_limit ({})",
                query.default_history_limit, query.max_history_limit
            )));
        }

        if self.auth.session_ttl_hours == 0 {
            return Err(invalid("session_ttl_hours must be greater than 0"));
        }
        if self.auth.session_ttl_hours > MAX_SESSION_TTL_HOURS {
            return Err(invalid(format!(
                "session_ttl_hours ({}) cannot be greater than {MAX_SESSION_TTL_HOURS}",
                self.auth.session_ttl_hours
            )));
        }
        if self.auth.cookie_name.trim().is_empty() {
            return Err(invalid("cookie_name cannot be empty"));
        }

        self.bind_address()?;
        Ok(())
    }

    /// Configured database file, or `accessmap.db` in the data directory.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Parse the configured bind address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not a valid socket address.
    pub fn bind_address(&self) -> Result<SocketAddr> {
        self.server
            .bind_address
            .parse()
            .map_err(|_| invalid(format!("invalid bind_address: {}", self.server.bind_address)))
    }

    /// Get the session lifetime as a Duration.
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.auth.session_ttl_hours) * 60 * 60)
    }

    /// Get the session prune interval, or `None` when pruning is disabled.
    #[must_use]
    pub fn session_prune_interval(&self) -> Option<Duration> {
        match self.server.session_prune_interval_minutes {
            0 => None,
            minutes => Some(Duration::from_secs(minutes * 60)),
        }
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::ConfigValidation {
        message: message.into(),
    }
}
