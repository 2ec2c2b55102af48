//! Application configuration
//!
//! Loaded from a TOML file, by default `~/.config/tour-desk/config.toml`.
//! Every field has a default, so a partial file (or none at all) is valid.
//! When the file does not exist the defaults are written there.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::{DatabaseConfig, RealtorConfig};
use crate::shared::errors::InfraError;

/// Env var that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "TOUR_DESK_CONFIG";

/// `database.url` value that selects the in-memory store.
pub const MEMORY_DATABASE: &str = "memory";

/// Resolve the config file path: `$TOUR_DESK_CONFIG`, else
/// `<config dir>/tour-desk/config.toml`, else `./config.toml`.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    dirs_next::config_dir()
        .map(|dir| dir.join("tour-desk").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
    pub tours: ToursConfig,
    pub realtor: RealtorSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for tasks after the shutdown signal
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SeaORM connection URL, a bare SQLite file path, or `memory`
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: DatabaseConfig::default().url,
            max_connections: 10,
        }
    }
}

impl DatabaseSection {
    pub fn is_memory(&self) -> bool {
        self.url.trim().eq_ignore_ascii_case(MEMORY_DATABASE)
    }

    /// Full connection URL. Bare paths are treated as SQLite files.
    pub fn connection_url(&self) -> String {
        let url = self.url.trim();
        if url.contains("://") || url.starts_with("sqlite:") || self.is_memory() {
            url.to_string()
        } else {
            DatabaseConfig::sqlite(url).url
        }
    }

    pub fn to_database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.connection_url(),
            max_connections: self.max_connections.max(1),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// HS256 secret shared with the auth provider
    pub jwt_secret: String,
    /// Expected `aud` claim; empty or missing disables the check
    pub jwt_audience: Option<String>,
    /// Lifetime of tokens minted with `--dev-token`
    pub dev_token_hours: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        let jwt = JwtConfig::default();
        Self {
            jwt_secret: jwt.secret,
            jwt_audience: jwt.audience,
            dev_token_hours: jwt.expiration_hours,
        }
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"***")
            .field("jwt_audience", &self.jwt_audience)
            .field("dev_token_hours", &self.dev_token_hours)
            .finish()
    }
}

impl SecurityConfig {
    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.jwt_secret.clone(),
            audience: self
                .jwt_audience
                .clone()
                .filter(|aud| !aud.trim().is_empty()),
            expiration_hours: self.dev_token_hours,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive; `RUST_LOG` takes precedence
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToursConfig {
    /// How long a request may stay pending before it expires
    pub pending_ttl_hours: i64,
    pub expiry_check_interval_secs: u64,
}

impl Default for ToursConfig {
    fn default() -> Self {
        Self {
            pending_ttl_hours: 48,
            expiry_check_interval_secs: 60,
        }
    }
}

/// Upper bound for `tours.pending_ttl_hours` (one year).
pub const MAX_PENDING_TTL_HOURS: i64 = 24 * 365;

impl ToursConfig {
    /// Pending TTL clamped to `1..=MAX_PENDING_TTL_HOURS` hours.
    pub fn pending_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.pending_ttl_hours.clamp(1, MAX_PENDING_TTL_HOURS))
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtorSection {
    /// RapidAPI key; `RAPIDAPI_KEY` is used when unset
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for RealtorSection {
    fn default() -> Self {
        let realtor = RealtorConfig::default();
        Self {
            api_key: None,
            base_url: realtor.base_url,
            timeout_secs: realtor.timeout_secs,
        }
    }
}

impl std::fmt::Debug for RealtorSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtorSection")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl RealtorSection {
    pub fn realtor_config(&self) -> RealtorConfig {
        RealtorConfig {
            api_key: self.api_key.clone().filter(|k| !k.trim().is_empty()),
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

impl AppConfig {
    /// Load config from `path`, writing the defaults there if the file is missing.
    pub fn load(path: &Path) -> Result<Self, InfraError> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|e| InfraError::Config(format!("read {}: {}", path.display(), e)))?;
        Self::from_toml(&raw)
            .map_err(|e| InfraError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn save(&self, path: &Path) -> Result<(), InfraError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| InfraError::Config(format!("create {}: {}", parent.display(), e)))?;
        }

        let raw = toml::to_string_pretty(self).map_err(|e| InfraError::Config(e.to_string()))?;
        std::fs::write(path, raw)
            .map_err(|e| InfraError::Config(format!("write {}: {}", path.display(), e)))
    }

    pub fn api_address(&self) -> String {
        format!("{}:{}", self.server.api_host, self.server.api_port)
    }
}
