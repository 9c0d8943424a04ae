//! Post list, modal and status transition handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use contentoire_core::domain::{NewPost, PostEdit, PostStatus, ScheduleRequest};
use contentoire_shared::dto::{
    CreatePostRequest, EditPostRequest, MoveToWaitingRequest, PostListQuery, PostResponse,
    SchedulePostRequest,
};

use super::views::post_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

pub(super) fn parse_status(raw: &str) -> AppResult<PostStatus> {
    Ok(raw.parse::<PostStatus>()?)
}

/// GET /api/posts?status=
pub async fn list(
    state: web::Data<AppState>,
    _identity: Identity,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let status = parse_status(&query.status)?;
    let posts: Vec<PostResponse> = state
        .posts
        .list(status)
        .await?
        .into_iter()
        .map(post_response)
        .collect();

    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/{id}
pub async fn get(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .posts
        .create(NewPost {
            title: req.title,
            content: req.content,
            image_url: req.image_url,
            source_url: req.source_url,
            suggested_time: req.suggested_time,
        })
        .await?;

    state.feeds.apply_local(&post).await;
    tracing::debug!(post_id = %post.id, user_id = %identity.user_id, "Draft submitted");
    Ok(HttpResponse::Created().json(post_response(post)))
}

/// PATCH /api/posts/{id}
pub async fn edit(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<EditPostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .posts
        .edit(
            path.into_inner(),
            PostEdit {
                title: req.title,
                content: req.content,
                image_url: req.image_url,
                time: req.time,
            },
        )
        .await?;

    state.feeds.apply_local(&post).await;
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// POST /api/posts/{id}/schedule
pub async fn schedule(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<SchedulePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .posts
        .schedule(
            path.into_inner(),
            ScheduleRequest {
                scheduled_time: req.scheduled_time,
                title: req.title,
                content: req.content,
                image_url: req.image_url,
            },
        )
        .await?;

    state.feeds.apply_local(&post).await;
    tracing::info!(post_id = %post.id, user_id = %identity.user_id, "Schedule confirmed");
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// POST /api/posts/{id}/move-to-waiting
///
/// The body is optional; without it the stored scheduled time is kept as the suggestion.
pub async fn move_to_waiting(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
    body: Option<web::Json<MoveToWaitingRequest>>,
) -> AppResult<HttpResponse> {
    let displayed_time = body.and_then(|b| b.into_inner().displayed_time);
    let post = state
        .posts
        .move_to_waiting(path.into_inner(), displayed_time)
        .await?;

    state.feeds.apply_local(&post).await;
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.posts.delete(id).await?;
    state.feeds.remove_local(id).await;

    tracing::info!(post_id = %id, user_id = %identity.user_id, "Post deleted");
    Ok(HttpResponse::NoContent().finish())
}
