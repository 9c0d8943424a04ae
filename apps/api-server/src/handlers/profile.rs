//! Per-user settings screen.

use actix_web::{HttpResponse, web};

use contentoire_core::domain::{ProviderKind, User, UserProfile, normalize_email};
use contentoire_shared::dto::{ProfileDto, SocialMediaResponse};

use super::views::social_media_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn profile_dto(user: &User) -> ProfileDto {
    let profile = user.profile();
    ProfileDto {
        display_name: profile.display_name,
        email: profile.email,
        enabled_media: profile.enabled_media,
    }
}

async fn current_user(state: &AppState, identity: &Identity) -> AppResult<User> {
    state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User no longer exists".to_string()))
}

/// GET /api/users/me/profile
pub async fn get(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = current_user(&state, &identity).await?;
    Ok(HttpResponse::Ok().json(profile_dto(&user)))
}

/// PUT /api/users/me/profile
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<ProfileDto>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let mut user = current_user(&state, &identity).await?;

    let email = normalize_email(&req.email);
    if email != user.email {
        if let Some(other) = state.users.find_by_email(&email).await? {
            if other.id != user.id {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
        }
    }

    user.update_profile(UserProfile {
        display_name: req.display_name,
        email,
        enabled_media: req.enabled_media,
    })?;
    let user = state.users.save(user).await?;

    tracing::info!(user_id = %user.id, "Profile updated");
    Ok(HttpResponse::Ok().json(profile_dto(&user)))
}

/// GET /api/social-medias
///
/// Platforms a user may switch on in `enabledMedia`.
pub async fn social_medias(
    state: web::Data<AppState>,
    _identity: Identity,
) -> AppResult<HttpResponse> {
    let medias: Vec<SocialMediaResponse> = state
        .providers
        .find_by_kind(ProviderKind::Media)
        .await?
        .into_iter()
        .filter(|p| p.enabled)
        .map(social_media_response)
        .collect();

    Ok(HttpResponse::Ok().json(medias))
}
