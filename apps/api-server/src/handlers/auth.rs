//! Authentication handlers.

use actix_web::{HttpResponse, web};

use contentoire_core::domain::{GLOBAL_ADMIN_ROLE, User, mask_email, normalize_email};
use contentoire_core::ports::AuthError;
use contentoire_shared::dto::{AuthResponse, LoginRequest, RegisterRequest};

use super::views::user_response;
use crate::middleware::auth::{Identity, revocation_key};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

fn validate_registration(req: &RegisterRequest) -> AppResult<()> {
    let mut missing = Vec::new();
    if req.email.trim().is_empty() {
        missing.push("email");
    }
    if req.password.is_empty() {
        missing.push("password");
    }
    if req.display_name.trim().is_empty() {
        missing.push("displayName");
    }
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    if !req.email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    if req.password != req.confirm_password {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn issue_token(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let token = state
        .tokens
        .generate_token(user.id, &user.email, user.roles.clone())?;

    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
        user: user_response(user),
    })
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_registration(&req)?;

    let email = normalize_email(&req.email);
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = state.passwords.hash(&req.password)?;

    let mut user = User::new(email, req.display_name.trim().to_string(), password_hash);
    if state.is_admin_email(&user.email) {
        user.grant_role(GLOBAL_ADMIN_ROLE);
    }
    let user = state.users.save(user).await?;

    tracing::info!(user_id = %user.id, user_email = %mask_email(&user.email), "User registered");

    Ok(HttpResponse::Created().json(issue_token(&state, &user)?))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_email(&normalize_email(&req.email))
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::info!(user_email = %mask_email(&req.email), "Login refused");
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(HttpResponse::Ok().json(issue_token(&state, &user)?))
}

/// POST /api/auth/logout
///
/// The token stays revoked until it would have expired anyway.
pub async fn logout(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    state
        .cache
        .set_until(&revocation_key(&identity.token), "1", identity.expires_at)
        .await?;

    tracing::info!(user_id = %identity.user_id, "User logged out");
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User no longer exists".to_string()))?;

    Ok(HttpResponse::Ok().json(user_response(&user)))
}
