//! HTTP handlers and route configuration.

mod auth;
mod calendar;
mod health;
mod keywords;
mod legacy;
mod posts;
mod profile;
mod settings;
mod stream;
mod views;

use std::sync::Arc;

use actix_web::web;

use contentoire_core::domain::ProviderKind;
use contentoire_core::ports::RateLimiter;

use crate::middleware::rate_limit::RateLimitMiddleware;

fn provider_scope(path: &str, kind: ProviderKind) -> actix_web::Scope {
    web::scope(path)
        .app_data(web::Data::new(kind))
        .route("", web::get().to(settings::list))
        .route("", web::post().to(settings::create))
        .route("/{id}", web::put().to(settings::update))
        .route("/{id}", web::delete().to(settings::delete))
        .route("/{id}/toggle", web::put().to(settings::toggle))
}

/// Configure all application routes.
///
/// Credential endpoints sit behind `limiter`.
pub fn configure_routes(cfg: &mut web::ServiceConfig, limiter: Arc<dyn RateLimiter>) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .wrap(RateLimitMiddleware::new(limiter.clone()))
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/logout", web::post().to(auth::logout))
                    .route("/me", web::get().to(auth::me)),
            )
            // Posts
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/stream", web::get().to(stream::stream))
                    .route("/refresh", web::post().to(stream::refresh))
                    .route("/{id}", web::get().to(posts::get))
                    .route("/{id}", web::patch().to(posts::edit))
                    .route("/{id}", web::delete().to(posts::delete))
                    .route("/{id}/schedule", web::post().to(posts::schedule))
                    .route(
                        "/{id}/move-to-waiting",
                        web::post().to(posts::move_to_waiting),
                    ),
            )
            .route("/calendar", web::get().to(calendar::month))
            .service(
                web::resource("/users/me/profile")
                    .route(web::get().to(profile::get))
                    .route(web::put().to(profile::update)),
            )
            .route("/social-medias", web::get().to(profile::social_medias))
            // Admin settings
            .service(
                web::scope("/settings")
                    .service(provider_scope("/news-apis", ProviderKind::News))
                    .service(provider_scope("/auth-providers", ProviderKind::Auth))
                    .service(provider_scope("/media-providers", ProviderKind::Media))
                    .service(provider_scope("/rss-feeds", ProviderKind::Rss))
                    .service(
                        web::scope("/search-keywords")
                            .route("", web::get().to(keywords::list))
                            .route("", web::post().to(keywords::create))
                            .route("/{id}", web::put().to(keywords::update))
                            .route("/{id}", web::delete().to(keywords::delete))
                            .route("/{id}/toggle", web::put().to(keywords::toggle)),
                    ),
            ),
    );

    // Older mobile client
    cfg.service(
        web::scope("/users")
            .service(
                web::resource("/login.php")
                    .wrap(RateLimitMiddleware::new(limiter))
                    .route(web::post().to(legacy::login)),
            )
            .route("/photo/{id}", web::get().to(legacy::photo)),
    );
}
