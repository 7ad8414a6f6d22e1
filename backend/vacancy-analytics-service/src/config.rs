/// Configuration management for Vacancy Analytics Service
///
/// Loads configuration from environment variables (and `.env` when present).
use anyhow::{anyhow, Context, Result};
use std::str::FromStr;

use crate::domain::Currency;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub analytics: AnalyticsConfig,
    /// Scheduled-task trigger; `None` when no Kafka brokers are configured
    pub trigger: Option<TriggerConfig>,
}

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    /// HTTP port for health checks and metrics
    pub http_port: u16,
}

/// Database configuration
#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .finish()
    }
}

/// Analytics build settings
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Only vacancies paid in this currency are aggregated
    pub currency: Currency,
}

/// Kafka scheduled-task consumer settings
#[derive(Debug, Clone)]
pub struct TriggerConfig {
    pub brokers: String,
    pub group_id: String,
    pub topic: String,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} has invalid value {:?}: {}", key, raw, e)),
        _ => Ok(default),
    }
}

impl TriggerConfig {
    /// Load trigger configuration; returns `None` if `KAFKA_BROKERS` is unset or empty.
    pub fn from_env() -> Option<Self> {
        let brokers = std::env::var("KAFKA_BROKERS").ok()?;

        if brokers.trim().is_empty() {
            return None;
        }

        let topic_prefix =
            std::env::var("KAFKA_TOPIC_PREFIX").unwrap_or_else(|_| "nova".to_string());

        Some(Self {
            brokers,
            group_id: std::env::var("KAFKA_ANALYTICS_GROUP_ID")
                .unwrap_or_else(|_| "nova-vacancy-analytics-builder".to_string()),
            topic: std::env::var("KAFKA_ANALYTICS_TASKS_TOPIC")
                .unwrap_or_else(|_| format!("{}.analytics-builder.scheduled-tasks", topic_prefix)),
        })
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: parse_env("PORT", 8080)?,
        };

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .context("DATABASE_URL environment variable not set")?,
            max_connections: parse_env("DB_MAX_CONNECTIONS", default_max_connections())?,
            min_connections: parse_env("DB_MIN_CONNECTIONS", default_min_connections())?,
        };

        let analytics = AnalyticsConfig {
            currency: parse_env("ANALYTICS_CURRENCY", Currency::default())?,
        };

        Ok(Config {
            app,
            database,
            analytics,
            trigger: TriggerConfig::from_env(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global; everything touching them lives in one test.
    #[test]
    fn test_from_env() {
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::remove_var("PORT");
        std::env::remove_var("DB_MAX_CONNECTIONS");
        std::env::remove_var("ANALYTICS_CURRENCY");
        std::env::remove_var("KAFKA_BROKERS");

        let config = Config::from_env().unwrap();
        assert_eq!(config.app.http_port, 8080);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.min_connections, 1);
        assert_eq!(config.analytics.currency.as_str(), "RUR");
        assert!(config.trigger.is_none());
        assert!(!format!("{:?}", config.database).contains("postgres://test"));

        std::env::set_var("ANALYTICS_CURRENCY", "usd");
        std::env::set_var("KAFKA_BROKERS", "localhost:9092");
        std::env::remove_var("KAFKA_TOPIC_PREFIX");
        std::env::remove_var("KAFKA_ANALYTICS_TASKS_TOPIC");
        let config = Config::from_env().unwrap();
        assert_eq!(config.analytics.currency.as_str(), "USD");
        let trigger = config.trigger.unwrap();
        assert_eq!(trigger.topic, "nova.analytics-builder.scheduled-tasks");
        assert_eq!(trigger.group_id, "nova-vacancy-analytics-builder");

        std::env::set_var("DB_MAX_CONNECTIONS", "lots");
        assert!(Config::from_env().is_err());

        std::env::remove_var("DB_MAX_CONNECTIONS");
        std::env::remove_var("ANALYTICS_CURRENCY");
        std::env::remove_var("KAFKA_BROKERS");
    }
}
