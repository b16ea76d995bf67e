//! configs
//!
//! Layered settings for QuestHub. Later layers win:
//!
//! 1. built-in defaults
//! 2. `config/default.toml`
//! 3. `config/local.toml`
//! 4. environment variables prefixed `QUESTHUB__`, nested with `__`
//!    (e.g. `QUESTHUB__SERVER__PORT=9000`)
//!
//! A `.env` file, if present, is loaded into the environment first.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Postgres URL. Unset means in-memory storage.
    pub url: Option<SecretString>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestSettings {
    /// Offset from UTC, in minutes, of the midnight that resets daily quests
    pub reset_utc_offset_minutes: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressionSettings {
    pub xp_per_level: u32,
    pub xp_reward_percent: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RewardSettings {
    pub claim_timeout_ms: u64,
}

impl RewardSettings {
    pub fn claim_timeout(&self) -> Duration {
        Duration::from_millis(self.claim_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardSettings {
    pub default_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminSettings {
    /// Name of the admin account created at startup when none exists
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub format: LogFormat,
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub quests: QuestSettings,
    pub progression: ProgressionSettings,
    pub rewards: RewardSettings,
    pub leaderboard: LeaderboardSettings,
    pub admin: AdminSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Loads `.env`, then every layer from `./config`.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_sources(Path::new("config"), None)
    }

    /// Builds settings from `dir` and the environment. `env` replaces the
    /// process environment when given.
    pub fn from_sources(dir: &Path, env: Option<HashMap<String, String>>) -> Result<Self> {
        let settings: Settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 10)?
            .set_default("quests.reset_utc_offset_minutes", 0)?
            .set_default("progression.xp_per_level", 500)?
            .set_default("progression.xp_reward_percent", 50)?
            .set_default("rewards.claim_timeout_ms", 10_000)?
            .set_default("leaderboard.default_limit", 10)?
            .set_default("admin.display_name", "Quest Master")?
            .set_default("log.format", "pretty")?
            .set_default("log.filter", "info")?
            .add_source(File::from(dir.join("default")).required(false))
            .add_source(File::from(dir.join("local")).required(false))
            .add_source(
                Environment::with_prefix("QUESTHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.progression.xp_per_level == 0 {
            return Err(ConfigError::Invalid("progression.xp_per_level must be positive".into()));
        }
        if self.rewards.claim_timeout_ms == 0 {
            return Err(ConfigError::Invalid("rewards.claim_timeout_ms must be positive".into()));
        }
        if self.leaderboard.default_limit == 0 {
            return Err(ConfigError::Invalid("leaderboard.default_limit must be positive".into()));
        }
        if self.admin.display_name.trim().is_empty() {
            return Err(ConfigError::Invalid("admin.display_name must not be empty".into()));
        }
        if self.quests.reset_utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::Invalid(
                "quests.reset_utc_offset_minutes must be within a day".into(),
            ));
        }
        Ok(())
    }
}
