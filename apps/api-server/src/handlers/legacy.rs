//! Endpoints kept for the older mobile client.

use actix_web::{HttpResponse, http::header, web};
use uuid::Uuid;

use contentoire_core::domain::{User, mask_email, normalize_email};
use contentoire_core::ports::AuthError;
use contentoire_shared::dto::{LegacyLoginRequest, LegacyLoginResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const DEFAULT_PHOTO_TYPE: &str = "image/jpeg";

async fn find_login_user(state: &AppState, req: &LegacyLoginRequest) -> AppResult<Option<User>> {
    if let Some(username) = req.username.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        if let Some(user) = state.users.find_by_username(username).await? {
            return Ok(Some(user));
        }
        // Older clients send the email in the username field.
        if username.contains('@') {
            return Ok(state.users.find_by_email(&normalize_email(username)).await?);
        }
    }
    match req.email.as_deref() {
        Some(email) if !email.trim().is_empty() => {
            Ok(state.users.find_by_email(&normalize_email(email)).await?)
        }
        _ => Ok(None),
    }
}

/// POST /users/login.php
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LegacyLoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = find_login_user(&state, &req)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::info!(user_email = %mask_email(&user.email), "Legacy login refused");
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state
        .tokens
        .generate_token(user.id, &user.email, user.roles.clone())?;

    Ok(HttpResponse::Ok().json(LegacyLoginResponse {
        token,
        id: user.id,
        full_name: user.full_name(),
        username: user.username.clone().unwrap_or_default(),
        first_name: user.first_name.clone().unwrap_or_default(),
        last_name: user.last_name.clone().unwrap_or_default(),
        email: user.email,
    }))
}

/// GET /users/photo/{id}
///
/// Proxies the stored photo URL so the client never talks to the image host.
pub async fn photo(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let url = state
        .users
        .find_by_id(id)
        .await?
        .and_then(|u| u.photo_url)
        .ok_or_else(|| AppError::NotFound(format!("No photo for user {id}")))?;

    let upstream = state
        .http
        .get(&url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| {
            tracing::warn!(user_id = %id, error = %e, "Photo fetch failed");
            AppError::BadGateway("Could not fetch the user photo".to_string())
        })?;

    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_PHOTO_TYPE)
        .to_string();
    let bytes = upstream.bytes().await.map_err(|e| {
        tracing::warn!(user_id = %id, error = %e, "Photo body read failed");
        AppError::BadGateway("Could not fetch the user photo".to_string())
    })?;

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type))
        .insert_header((header::CACHE_CONTROL, "private, max-age=300"))
        .body(bytes))
}
