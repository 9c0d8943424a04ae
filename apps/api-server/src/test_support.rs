//! Helpers shared by the handler tests.

use chrono::{TimeDelta, Utc};

use contentoire_core::domain::{NewPost, Post, User};

use crate::config::AppConfig;
use crate::state::AppState;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const PASSWORD: &str = "correct-horse";

/// Fully in-memory state with one configured admin email.
pub fn test_state() -> AppState {
    AppState::in_memory(&AppConfig {
        admin_emails: vec![ADMIN_EMAIL.to_string()],
        ..AppConfig::default()
    })
}

/// Initialize the full route table over `state`.
#[macro_export]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state.clone()))
                .configure(|cfg| $crate::handlers::configure_routes(cfg, $state.rate_limiter.clone())),
        )
        .await
    };
}

/// Store a user with [`PASSWORD`] and return it with a fresh token.
pub async fn seed_user(state: &AppState, email: &str, roles: &[&str]) -> (User, String) {
    let hash = state.passwords.hash(PASSWORD).unwrap();
    let mut user = User::new(email.to_string(), "Ada".to_string(), hash);
    for role in roles {
        user.grant_role(role);
    }
    let user = state.users.save(user).await.unwrap();
    let token = state
        .tokens
        .generate_token(user.id, &user.email, user.roles.clone())
        .unwrap();
    (user, token)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// A waiting draft suggested `offset_hours` from now.
pub async fn seed_post(state: &AppState, title: &str, offset_hours: i64) -> Post {
    state
        .posts
        .create(NewPost {
            title: title.to_string(),
            content: format!("{title} body"),
            image_url: None,
            source_url: None,
            suggested_time: Utc::now() + TimeDelta::hours(offset_hours),
        })
        .await
        .unwrap()
}
