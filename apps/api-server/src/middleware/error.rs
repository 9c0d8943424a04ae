//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

use contentoire_core::error::{DomainError, RepoError};
use contentoire_core::ports::{AuthError, CacheError, PubSubError};
use contentoire_shared::ErrorResponse;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden,
    Conflict(String),
    Validation(String),
    /// Requested publish time is inside the lead time.
    TimeTooSoon(String),
    /// An upstream HTTP call failed.
    BadGateway(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            AppError::TimeTooSoon(msg) => write!(f, "Time too soon: {}", msg),
            AppError::BadGateway(msg) => write!(f, "Bad gateway: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) | AppError::TimeTooSoon(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::BadGateway(detail) => {
                tracing::warn!(detail = %detail, "Upstream request failed");
            }
            AppError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal error");
            }
            _ => {}
        }

        HttpResponse::build(self.status_code()).json(self.problem())
    }
}

impl AppError {
    /// Problem body for this error. Internal details never leave the server.
    pub fn problem(&self) -> ErrorResponse {
        match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized(detail) => ErrorResponse::unauthorized().with_detail(detail),
            AppError::Forbidden => ErrorResponse::forbidden(),
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::Validation(detail) => ErrorResponse::unprocessable(detail),
            AppError::TimeTooSoon(detail) => ErrorResponse::time_too_soon(detail),
            AppError::BadGateway(_) => ErrorResponse::bad_gateway("Upstream request failed"),
            AppError::Internal(_) => ErrorResponse::internal_error(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Validation(msg) => AppError::Validation(msg),
            e @ DomainError::ScheduleTooSoon { .. } => AppError::TimeTooSoon(e.to_string()),
            e @ DomainError::InvalidTransition { .. } => AppError::Conflict(e.to_string()),
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Unauthorized => AppError::Unauthorized("Unauthorized access".to_string()),
            DomainError::Repository(e) => e.into(),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!(error = %msg, "Database connection error");
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!(error = %msg, "Database query error");
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                AppError::Unauthorized("Invalid email or password".to_string())
            }
            AuthError::InsufficientPermissions => AppError::Forbidden,
            e @ (AuthError::TokenExpired
            | AuthError::TokenRevoked
            | AuthError::InvalidToken(_)
            | AuthError::MissingAuth) => AppError::Unauthorized(e.to_string()),
            e @ AuthError::HashingError(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::Internal(format!("Cache error: {err}"))
    }
}

impl From<PubSubError> for AppError {
    fn from(err: PubSubError) -> Self {
        AppError::Internal(format!("Change feed error: {err}"))
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contentoire_core::domain::PostStatus;

    #[test]
    fn test_too_soon_maps_to_422_with_title() {
        let now = Utc::now();
        let err: AppError = DomainError::ScheduleTooSoon {
            requested: now,
            earliest: now,
            lead_minutes: 180,
        }
        .into();

        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(matches!(
            &err,
            AppError::TimeTooSoon(detail)
                if detail == "Scheduled time should be at least 3 hours from now"
        ));
    }

    #[test]
    fn test_invalid_transition_is_conflict() {
        let err: AppError = DomainError::InvalidTransition {
            from: PostStatus::Posted,
            action: "schedule",
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_repository_errors_are_masked() {
        let err: AppError = DomainError::Repository(RepoError::Query("syntax".to_string())).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(&err, AppError::Internal(detail) if detail == "Database error"));
    }

    #[test]
    fn test_constraint_is_conflict() {
        let err: AppError = RepoError::Constraint("Email already registered".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
