//! Key/value cache port. Backs short-lived server state such as revoked tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Cache trait - abstraction over caching backends (Redis, in-memory).
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;

    /// Set a value with an optional TTL. `None` keeps it until deleted.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Keep a value until an absolute instant. Past instants are a no-op.
    async fn set_until(
        &self,
        key: &str,
        value: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        match (expires_at - Utc::now()).to_std() {
            Ok(ttl) if !ttl.is_zero() => self.set(key, value, Some(ttl)).await,
            _ => Ok(()),
        }
    }
}

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
