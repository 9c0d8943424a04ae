//! Admin management of news APIs, sign-in providers, social platforms and RSS feeds.
//!
//! Every provider scope shares these handlers; the scope registers its
//! [`ProviderKind`] as app data.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use contentoire_core::domain::{NewProvider, Provider, ProviderKind};
use contentoire_shared::dto::{ProviderRequest, ProviderResponse};

use super::views::provider_response;
use crate::middleware::auth::AdminIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn new_provider(req: ProviderRequest) -> NewProvider {
    NewProvider {
        code: req.code,
        title: req.title,
        logo: req.logo,
        enabled: req.enabled,
        api_key: req.api_key,
        sources: req.sources,
    }
}

async fn find_in_kind(state: &AppState, kind: ProviderKind, id: Uuid) -> AppResult<Provider> {
    match state.providers.find_by_id(id).await? {
        Some(provider) if provider.kind == kind => Ok(provider),
        _ => Err(AppError::NotFound(format!("{kind} provider {id} not found"))),
    }
}

async fn ensure_code_free(
    state: &AppState,
    kind: ProviderKind,
    code: &str,
    except: Option<Uuid>,
) -> AppResult<()> {
    let code = code.trim().to_lowercase();
    match state.providers.find_by_code(kind, &code).await? {
        Some(existing) if Some(existing.id) != except => Err(AppError::Conflict(format!(
            "A {kind} provider with code '{code}' already exists"
        ))),
        _ => Ok(()),
    }
}

/// GET /api/settings/{news-apis|auth-providers|media-providers|rss-feeds}
pub async fn list(
    state: web::Data<AppState>,
    kind: web::Data<ProviderKind>,
    _admin: AdminIdentity,
) -> AppResult<HttpResponse> {
    let providers: Vec<ProviderResponse> = state
        .providers
        .find_by_kind(**kind)
        .await?
        .into_iter()
        .map(provider_response)
        .collect();

    Ok(HttpResponse::Ok().json(providers))
}

/// POST /api/settings/{news-apis|auth-providers|media-providers|rss-feeds}
pub async fn create(
    state: web::Data<AppState>,
    kind: web::Data<ProviderKind>,
    admin: AdminIdentity,
    body: web::Json<ProviderRequest>,
) -> AppResult<HttpResponse> {
    let kind = **kind;
    let provider = Provider::new(kind, new_provider(body.into_inner()))?;
    ensure_code_free(&state, kind, &provider.code, None).await?;

    let provider = state.providers.save(provider).await?;
    tracing::info!(
        provider_id = %provider.id,
        kind = %kind,
        code = %provider.code,
        admin_id = %admin.0.user_id,
        "Provider created"
    );

    Ok(HttpResponse::Created().json(provider_response(provider)))
}

/// PUT /api/settings/{news-apis|auth-providers|media-providers|rss-feeds}/{id}
pub async fn update(
    state: web::Data<AppState>,
    kind: web::Data<ProviderKind>,
    admin: AdminIdentity,
    path: web::Path<Uuid>,
    body: web::Json<ProviderRequest>,
) -> AppResult<HttpResponse> {
    let kind = **kind;
    let id = path.into_inner();
    let req = body.into_inner();

    let mut provider = find_in_kind(&state, kind, id).await?;
    ensure_code_free(&state, kind, &req.code, Some(id)).await?;
    provider.replace(new_provider(req))?;

    let provider = state.providers.save(provider).await?;
    tracing::info!(provider_id = %id, admin_id = %admin.0.user_id, "Provider updated");

    Ok(HttpResponse::Ok().json(provider_response(provider)))
}

/// PUT /api/settings/{news-apis|auth-providers|media-providers|rss-feeds}/{id}/toggle
pub async fn toggle(
    state: web::Data<AppState>,
    kind: web::Data<ProviderKind>,
    admin: AdminIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let mut provider = find_in_kind(&state, **kind, path.into_inner()).await?;
    provider.toggle();

    let provider = state.providers.save(provider).await?;
    tracing::info!(
        provider_id = %provider.id,
        enabled = provider.enabled,
        admin_id = %admin.0.user_id,
        "Provider toggled"
    );

    Ok(HttpResponse::Ok().json(provider_response(provider)))
}

/// DELETE /api/settings/{news-apis|auth-providers|media-providers|rss-feeds}/{id}
pub async fn delete(
    state: web::Data<AppState>,
    kind: web::Data<ProviderKind>,
    admin: AdminIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let provider = find_in_kind(&state, **kind, path.into_inner()).await?;
    state.providers.delete(provider.id).await?;

    tracing::info!(provider_id = %provider.id, admin_id = %admin.0.user_id, "Provider deleted");
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use contentoire_core::domain::GLOBAL_ADMIN_ROLE;
    use contentoire_shared::dto::ProviderResponse;
    use serde_json::json;

    use crate::test_support::{ADMIN_EMAIL, bearer, seed_user, test_state};

    fn news_api(code: &str) -> serde_json::Value {
        json!({
            "code": code,
            "title": "NewsAPI",
            "logo": "https://newsapi.org/logo.png",
            "apiKey": "secret",
            "sources": ["bbc-news", "reuters"]
        })
    }

    #[actix_web::test]
    async fn test_non_admin_is_forbidden() {
        let state = test_state();
        let (_, token) = seed_user(&state, "ada@example.com", &[]).await;
        let app = crate::test_app!(state);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/settings/news-apis")
                .insert_header(bearer(&token))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_create_list_toggle_delete() {
        let state = test_state();
        let (_, token) = seed_user(&state, ADMIN_EMAIL, &[GLOBAL_ADMIN_ROLE]).await;
        let app = crate::test_app!(state);

        let created: ProviderResponse = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/settings/news-apis")
                .insert_header(bearer(&token))
                .set_json(news_api("NewsAPI"))
                .to_request(),
        )
        .await;
        assert_eq!(created.code, "newsapi");
        assert_eq!(created.kind, "news");
        assert!(created.enabled);

        let news: Vec<ProviderResponse> = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/settings/news-apis")
                .insert_header(bearer(&token))
                .to_request(),
        )
        .await;
        assert_eq!(news.len(), 1);

        let auth: Vec<ProviderResponse> = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/settings/auth-providers")
                .insert_header(bearer(&token))
                .to_request(),
        )
        .await;
        assert!(auth.is_empty());

        let toggled: ProviderResponse = test::call_and_read_body_json(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/settings/news-apis/{}/toggle", created.id))
                .insert_header(bearer(&token))
                .to_request(),
        )
        .await;
        assert!(!toggled.enabled);

        // Wrong scope for this id.
        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/settings/auth-providers/{}", created.id))
                .insert_header(bearer(&token))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/settings/news-apis/{}", created.id))
                .insert_header(bearer(&token))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn test_duplicate_code_conflicts() {
        let state = test_state();
        let (_, token) = seed_user(&state, ADMIN_EMAIL, &[GLOBAL_ADMIN_ROLE]).await;
        let app = crate::test_app!(state);

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let res = test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/api/settings/news-apis")
                    .insert_header(bearer(&token))
                    .set_json(news_api("newsapi"))
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), expected);
        }

        // The same code is free under the other kind.
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/settings/auth-providers")
                .insert_header(bearer(&token))
                .set_json(news_api("newsapi"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }
}
