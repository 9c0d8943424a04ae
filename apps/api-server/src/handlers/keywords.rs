//! Admin management of the search keywords the news workers query with.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use contentoire_core::domain::{NewSearchKeyword, SearchKeyword};
use contentoire_shared::dto::{SearchKeywordRequest, SearchKeywordResponse};

use super::views::keyword_response;
use crate::middleware::auth::AdminIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn new_keyword(req: SearchKeywordRequest) -> NewSearchKeyword {
    NewSearchKeyword {
        keyword: req.keyword,
        region: req.region,
        language: req.language,
        category: req.category,
        sub_category: req.sub_category,
        description: req.description,
        enabled: req.enabled,
    }
}

async fn find(state: &AppState, id: Uuid) -> AppResult<SearchKeyword> {
    state
        .keywords
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Search keyword {id} not found")))
}

/// GET /api/settings/search-keywords
pub async fn list(state: web::Data<AppState>, _admin: AdminIdentity) -> AppResult<HttpResponse> {
    let keywords: Vec<SearchKeywordResponse> = state
        .keywords
        .find_all()
        .await?
        .into_iter()
        .map(keyword_response)
        .collect();

    Ok(HttpResponse::Ok().json(keywords))
}

/// POST /api/settings/search-keywords
pub async fn create(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    body: web::Json<SearchKeywordRequest>,
) -> AppResult<HttpResponse> {
    let keyword = SearchKeyword::new(new_keyword(body.into_inner()))?;
    let keyword = state.keywords.save(keyword).await?;

    tracing::info!(
        keyword_id = %keyword.id,
        keyword = %keyword.keyword,
        admin_id = %admin.0.user_id,
        "Search keyword created"
    );
    Ok(HttpResponse::Created().json(keyword_response(keyword)))
}

/// PUT /api/settings/search-keywords/{id}
pub async fn update(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    path: web::Path<Uuid>,
    body: web::Json<SearchKeywordRequest>,
) -> AppResult<HttpResponse> {
    let mut keyword = find(&state, path.into_inner()).await?;
    keyword.replace(new_keyword(body.into_inner()))?;
    let keyword = state.keywords.save(keyword).await?;

    tracing::info!(keyword_id = %keyword.id, admin_id = %admin.0.user_id, "Search keyword updated");
    Ok(HttpResponse::Ok().json(keyword_response(keyword)))
}

/// PUT /api/settings/search-keywords/{id}/toggle
pub async fn toggle(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let mut keyword = find(&state, path.into_inner()).await?;
    keyword.toggle();
    let keyword = state.keywords.save(keyword).await?;

    tracing::info!(
        keyword_id = %keyword.id,
        enabled = keyword.enabled,
        admin_id = %admin.0.user_id,
        "Search keyword toggled"
    );
    Ok(HttpResponse::Ok().json(keyword_response(keyword)))
}

/// DELETE /api/settings/search-keywords/{id}
pub async fn delete(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.keywords.delete(id).await?;

    tracing::info!(keyword_id = %id, admin_id = %admin.0.user_id, "Search keyword deleted");
    Ok(HttpResponse::NoContent().finish())
}
