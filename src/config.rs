use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use sharp_models::Sport;
use sharp_services::{DataFeedConfig, ESPN_BASE_URL};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub schedule: ScheduleConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub max_games: usize,
    pub enable_simulation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Fixes the sampled form and momentum inputs when set.
    pub seed: Option<u64>,
    pub default_sport: String,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::load(&run_mode)
    }

    fn load(run_mode: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("database.url", "sqlite:sharp.db")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("schedule.base_url", ESPN_BASE_URL)?
            .set_default("schedule.timeout_ms", 10_000)?
            .set_default("schedule.max_games", 8)?
            .set_default("schedule.enable_simulation", false)?
            .set_default("model.default_sport", "NFL")?
            // Add in settings from configuration file
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add in settings from environment variables, e.g. SHARP__SERVER__PORT
            .add_source(Environment::with_prefix("SHARP").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn feed_config(&self) -> DataFeedConfig {
        DataFeedConfig {
            base_url: self.schedule.base_url.clone(),
            timeout_ms: self.schedule.timeout_ms,
            max_games: self.schedule.max_games,
            enable_simulation: self.schedule.enable_simulation,
        }
    }

    pub fn default_sport(&self) -> Result<Sport, ConfigError> {
        self.model
            .default_sport
            .parse()
            .map_err(|e: sharp_models::SharpError| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::load("unit-test").unwrap();

        assert_eq!(config.database_url(), "sqlite:sharp.db");
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.schedule.max_games, 8);
        assert!(config.model.seed.is_none());
        assert_eq!(config.default_sport().unwrap(), Sport::Nfl);

        let feed = config.feed_config();
        assert_eq!(feed.timeout_ms, 10_000);
        assert!(!feed.enable_simulation);
    }
}
