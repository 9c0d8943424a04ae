//! Domain-level error types.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::PostStatus;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The requested publish time is inside the minimum lead time.
    #[error("Scheduled time should be at least {} from now", describe_lead(*.lead_minutes))]
    ScheduleTooSoon {
        requested: DateTime<Utc>,
        earliest: DateTime<Utc>,
        lead_minutes: i64,
    },

    #[error("Cannot {action} a post that is {from}")]
    InvalidTransition {
        from: PostStatus,
        action: &'static str,
    },

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

fn describe_lead(minutes: i64) -> String {
    match (minutes / 60, minutes % 60) {
        (1, 0) => "1 hour".to_string(),
        (hours, 0) => format!("{hours} hours"),
        (0, mins) => format!("{mins} minutes"),
        (hours, mins) => format!("{hours}h{mins:02}m"),
    }
}
