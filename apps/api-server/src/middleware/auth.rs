//! Bearer-token extractors.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::StatusCode, http::header, web};
use chrono::{DateTime, Utc};
use futures::future::LocalBoxFuture;
use std::fmt;

use contentoire_core::domain::GLOBAL_ADMIN_ROLE;
use contentoire_core::ports::{AuthError, TokenClaims};
use contentoire_shared::ErrorResponse;

use crate::state::AppState;

/// Cache key marking a token as logged out.
pub fn revocation_key(token: &str) -> String {
    format!("revoked:{token}")
}

/// The caller behind a request, taken from its bearer token.
///
/// Every handler that needs a user asks for one of these; there is no
/// process-wide current user.
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub email: String,
    pub roles: Vec<String>,
    /// The raw bearer token, kept so logout can revoke it.
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    fn from_claims(claims: TokenClaims, token: String) -> Self {
        Self {
            expires_at: claims.expires_at(),
            user_id: claims.user_id,
            email: claims.email,
            roles: claims.roles,
            token,
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AuthError::TokenExpired
            | AuthError::TokenRevoked
            | AuthError::InvalidToken(_)
            | AuthError::MissingAuth
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::HashingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        let error = match &self.0 {
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your authentication token has expired. Please login again."),
            AuthError::TokenRevoked => ErrorResponse::new(401, "Token Revoked")
                .with_detail("This session has been logged out. Please login again."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::MissingAuth => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Please provide a valid Bearer token in the Authorization header."),
            AuthError::InvalidCredentials => ErrorResponse::unauthorized(),
            AuthError::InsufficientPermissions => ErrorResponse::forbidden()
                .with_detail("This action requires the global_admin role."),
            AuthError::HashingError(_) => ErrorResponse::internal_error(),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let Some(state) = state else {
                tracing::error!("AppState not found in app data");
                return Err(AuthenticationError(AuthError::InvalidToken(
                    "Server configuration error".to_string(),
                )));
            };
            let token = token.map_err(AuthenticationError)?;

            let claims = state
                .tokens
                .validate_token(&token)
                .map_err(AuthenticationError)?;

            // Revocation fails open: a cache outage lets logged-out tokens
            // through until they expire.
            match state.cache.exists(&revocation_key(&token)).await {
                Ok(true) => return Err(AuthenticationError(AuthError::TokenRevoked)),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        user_id = %claims.user_id,
                        error = %e,
                        "Revocation check failed, accepting token"
                    );
                }
            }

            Ok(Identity::from_claims(claims, token))
        })
    }
}

/// An [`Identity`] holding the `global_admin` role. Anyone else gets 403.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub Identity);

impl FromRequest for AdminIdentity {
    type Error = AuthenticationError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let identity = Identity::from_request(req, payload);

        Box::pin(async move {
            let identity = identity.await?;
            if !identity.has_role(GLOBAL_ADMIN_ROLE) {
                tracing::warn!(user_id = %identity.user_id, "Admin route refused");
                return Err(AuthenticationError(AuthError::InsufficientPermissions));
            }
            Ok(AdminIdentity(identity))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::{http::StatusCode, test};
    use async_trait::async_trait;
    use contentoire_core::ports::{Cache, CacheError};

    use crate::test_support::{bearer, seed_user, test_state};

    struct OfflineCache;

    #[async_trait]
    impl Cache for OfflineCache {
        async fn get(&self, _key: &str) -> Option<String> {
            None
        }
        async fn set(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Option<Duration>,
        ) -> Result<(), CacheError> {
            Err(CacheError::Connection("refused".to_string()))
        }
        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Connection("refused".to_string()))
        }
        async fn exists(&self, _key: &str) -> Result<bool, CacheError> {
            Err(CacheError::Connection("refused".to_string()))
        }
    }

    #[actix_web::test]
    async fn test_revoked_token_is_rejected() {
        let state = test_state();
        let (_, token) = seed_user(&state, "ada@example.com", &[]).await;
        state
            .cache
            .set(&super::revocation_key(&token), "1", None)
            .await
            .unwrap();
        let app = crate::test_app!(state);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/auth/me")
                .insert_header(bearer(&token))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_revocation_check_fails_open_when_cache_is_down() {
        let mut state = test_state();
        let (_, token) = seed_user(&state, "ada@example.com", &[]).await;
        state.cache = Arc::new(OfflineCache);
        let app = crate::test_app!(state);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/auth/me")
                .insert_header(bearer(&token))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
