//! Configuration management for the guest logger

use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Upper bound for `history.max_days`, roughly a century of calendar days
pub const MAX_DAY_RANGE: u32 = 36_500;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file, created together with its parent directory
    pub path: PathBuf,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScraperConfig {
    pub target_url: String,
    pub user_agent: String,
    pub accept_language: String,
    pub request_timeout_secs: u64,
    /// Where the last unparseable page body is dumped
    pub raw_capture_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChannelConfig {
    pub ws_url: String,
    pub subscribe_message: String,
    pub timeout_secs: u64,
    /// Frames read before giving up on finding a matching record
    pub max_messages: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HistoryConfig {
    /// IANA timezone used to bucket samples into calendar days
    pub timezone: String,
    pub default_limit: i64,
    pub max_limit: i64,
    pub default_days: u32,
    pub max_days: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Nested keys, e.g. POOL_LOGGER_SERVER__PORT
            .add_source(
                Environment::with_prefix("POOL_LOGGER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            // Flat variables kept for existing deployments
            .set_override_option("scraper.target_url", env::var("POOL_LOGGER_TARGET_URL").ok())?
            .set_override_option("scraper.user_agent", env::var("POOL_LOGGER_USER_AGENT").ok())?
            .set_override_option("database.path", env::var("POOL_LOGGER_DB").ok())?
            .set_override_option("channel.ws_url", env::var("POOL_LOGGER_WS_URL").ok())?
            .set_override_option("logging.level", env::var("POOL_LOGGER_LOG_LEVEL").ok())?
            .set_override_option("history.timezone", env::var("POOL_LOGGER_TIMEZONE").ok())?
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.history.reference_timezone()?;
        if self.history.max_limit < 1 {
            return Err(ConfigError::Message(
                "history.max_limit must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_DAY_RANGE).contains(&self.history.max_days) {
            return Err(ConfigError::Message(format!(
                "history.max_days must be between 1 and {}",
                MAX_DAY_RANGE
            )));
        }
        Ok(())
    }
}

impl ScraperConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ChannelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl HistoryConfig {
    pub fn reference_timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| ConfigError::Message(format!("Invalid history.timezone '{}': {}", self.timezone, e)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/guest_logs.db"),
            max_connections: 5,
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            target_url: "https://www.stadt-zuerich.ch/de/stadtleben/sport-und-erholung/sport-und-badeanlagen/hallenbaeder/city.html"
                .to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0 Safari/537.36"
                .to_string(),
            accept_language: "de".to_string(),
            request_timeout_secs: 30,
            raw_capture_path: PathBuf::from("data/last_response.html"),
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            ws_url: "wss://badi-public.crowdmonitor.ch:9591/api".to_string(),
            subscribe_message: "all".to_string(),
            timeout_secs: 10,
            max_messages: 3,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            timezone: "Europe/Zurich".to_string(),
            default_limit: 100,
            max_limit: 1000,
            default_days: 7,
            max_days: 90,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}
