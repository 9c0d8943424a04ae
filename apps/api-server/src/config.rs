//! Application configuration loaded from environment variables.

use std::env;

use chrono::TimeDelta;

use contentoire_core::domain::{SCHEDULE_LEAD_TIME_HOURS, normalize_email};
use contentoire_infra::database::DatabaseConfig;
use contentoire_infra::{JwtConfig, RateLimitConfig};

#[cfg(feature = "redis")]
use contentoire_infra::RedisConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "redis")]
    pub redis: Option<RedisConfig>,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    /// Minimum distance between now and a scheduled publish time.
    pub lead_time: TimeDelta,
    /// Accounts registered with these emails get the `global_admin` role.
    pub admin_emails: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|main_url| {
            database_config(
                main_url,
                parse_var("DB_MAX_CONNECTIONS"),
                parse_var("DB_MIN_CONNECTIONS"),
            )
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            #[cfg(feature = "redis")]
            redis: RedisConfig::from_env(),
            jwt: JwtConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            lead_time: parse_var("SCHEDULE_LEAD_TIME_MINUTES")
                .map(TimeDelta::minutes)
                .unwrap_or_else(|| TimeDelta::hours(SCHEDULE_LEAD_TIME_HOURS)),
            admin_emails: parse_admin_emails(&env::var("ADMIN_EMAILS").unwrap_or_default()),
        }
    }
}

impl Default for AppConfig {
    /// Local defaults with every backend in memory.
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: None,
            #[cfg(feature = "redis")]
            redis: None,
            jwt: JwtConfig::default(),
            rate_limit: RateLimitConfig::default(),
            lead_time: TimeDelta::hours(SCHEDULE_LEAD_TIME_HOURS),
            admin_emails: Vec::new(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}

/// Single pool; every repository reads and writes through it.
fn database_config(main_url: String, max: Option<u32>, min: Option<u32>) -> DatabaseConfig {
    DatabaseConfig {
        main_url,
        main_max_connections: max.unwrap_or(100),
        main_min_connections: min.unwrap_or(10),
    }
}

/// Comma-separated list, normalized the way stored emails are.
fn parse_admin_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_email)
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_emails_are_normalized() {
        let emails = parse_admin_emails(" Admin@Example.com, ,ops@example.com");
        assert_eq!(emails, vec!["admin@example.com", "ops@example.com"]);
    }

    #[test]
    fn test_database_config_defaults_pool_sizes() {
        let config = database_config("postgres://localhost/contentoire".to_string(), None, Some(2));
        assert_eq!(config.main_url, "postgres://localhost/contentoire");
        assert_eq!(config.main_max_connections, 100);
        assert_eq!(config.main_min_connections, 2);
    }
}
