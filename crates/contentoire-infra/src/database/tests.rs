use chrono::{TimeDelta, Utc};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use uuid::Uuid;

use contentoire_core::domain::{
    Post, PostChanges, PostStatus, Provider, ProviderKind, SearchKeyword, User,
};
use contentoire_core::error::RepoError;
use contentoire_core::ports::{
    BaseRepository, PostRepository, ProviderRepository, SearchKeywordRepository, UserRepository,
};

use crate::database::entity::{post, provider, search_keyword, user};
use crate::database::postgres_repo::{
    PostgresPostRepository, PostgresProviderRepository, PostgresSearchKeywordRepository,
    PostgresUserRepository,
};

fn post_model(id: Uuid, status: post::Status) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        title: "Rates held".to_owned(),
        content: "The bank kept rates unchanged.".to_owned(),
        image_url: None,
        source_url: Some("https://news.example/rates".to_owned()),
        status,
        suggested_time: Some((now + TimeDelta::hours(1)).into()),
        scheduled_time: match status {
            post::Status::Waiting => None,
            _ => Some((now + TimeDelta::hours(4)).into()),
        },
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id_maps_status() {
    let post_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, post::Status::Scheduled)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post: Post = repo.find_by_id(post_id).await.unwrap().unwrap();

    assert_eq!(post.id, post_id);
    assert_eq!(post.status, PostStatus::Scheduled);
    assert!(post.scheduled_time.is_some());
    assert_eq!(post.active_time(), post.scheduled_time);
}

#[tokio::test]
async fn test_find_by_status_returns_rows_in_order() {
    let first = post_model(Uuid::new_v4(), post::Status::Waiting);
    let second = post_model(Uuid::new_v4(), post::Status::Waiting);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![first.clone(), second.clone()]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let posts = repo.find_by_status(PostStatus::Waiting).await.unwrap();

    let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[tokio::test]
async fn test_update_returns_merged_row() {
    let post_id = Uuid::new_v4();
    let mut row = post_model(post_id, post::Status::Waiting);
    row.title = "Edited".to_owned();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post = repo
        .update(
            post_id,
            &PostChanges {
                title: Some("Edited".to_owned()),
                ..PostChanges::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(post.title, "Edited");
}

#[tokio::test]
async fn test_update_missing_row_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = repo
        .update(
            Uuid::new_v4(),
            &PostChanges {
                status: Some(PostStatus::Posted),
                ..PostChanges::default()
            },
        )
        .await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_conditional_update_reports_rows_no_longer_due() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = repo
        .update_if_due(
            Uuid::new_v4(),
            Utc::now(),
            &PostChanges {
                status: Some(PostStatus::Posted),
                ..PostChanges::default()
            },
        )
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_conditional_update_returns_written_row() {
    let post_id = Uuid::new_v4();
    let row = post_model(post_id, post::Status::Posted);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .append_query_results([vec![row]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post = repo
        .update_if_due(
            post_id,
            Utc::now(),
            &PostChanges {
                status: Some(PostStatus::Posted),
                ..PostChanges::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(post.id, post_id);
    assert_eq!(post.status, PostStatus::Posted);
}

#[tokio::test]
async fn test_save_inserts_when_row_is_new() {
    let post = Post::new(contentoire_core::domain::NewPost {
        title: "Fresh".to_owned(),
        content: "Body".to_owned(),
        image_url: None,
        source_url: None,
        suggested_time: Utc::now(),
    })
    .unwrap();
    let mut row = post_model(post.id, post::Status::Waiting);
    row.title = "Fresh".to_owned();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // UPDATE ... RETURNING finds nothing, then INSERT ... RETURNING.
        .append_query_results([Vec::<post::Model>::new(), vec![row]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let saved = repo.save(post.clone()).await.unwrap();

    assert_eq!(saved.id, post.id);
    assert_eq!(saved.title, "Fresh");
}

#[tokio::test]
async fn test_delete_missing_row_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4()).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_user_lists_are_split() {
    let now = Utc::now();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user::Model {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_owned(),
            username: Some("ada".to_owned()),
            first_name: Some("Ada".to_owned()),
            last_name: Some("Lovelace".to_owned()),
            display_name: "Ada".to_owned(),
            password_hash: "hash".to_owned(),
            roles: "user,global_admin".to_owned(),
            enabled_media: "twitter,instagram".to_owned(),
            photo_url: None,
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let user: User = repo.find_by_email("Ada@Example.com").await.unwrap().unwrap();

    assert_eq!(user.roles, vec!["user", "global_admin"]);
    assert_eq!(user.enabled_media, vec!["twitter", "instagram"]);
    assert_eq!(user.full_name(), "Ada Lovelace");
}

#[tokio::test]
async fn test_providers_by_kind() {
    let now = Utc::now();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![provider::Model {
            id: Uuid::new_v4(),
            kind: provider::Kind::News,
            code: "newsapi".to_owned(),
            title: "NewsAPI".to_owned(),
            logo: "https://newsapi.org/logo.png".to_owned(),
            enabled: true,
            api_key: Some("secret".to_owned()),
            sources: "bbc-news,reuters".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresProviderRepository::new(db);
    let providers: Vec<Provider> = repo.find_by_kind(ProviderKind::News).await.unwrap();

    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].kind, ProviderKind::News);
    assert_eq!(providers[0].sources, vec!["bbc-news", "reuters"]);
}

#[tokio::test]
async fn test_media_kind_maps_both_ways() {
    let now = Utc::now();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![provider::Model {
            id: Uuid::new_v4(),
            kind: provider::Kind::Media,
            code: "twitter".to_owned(),
            title: "Twitter".to_owned(),
            logo: String::new(),
            enabled: true,
            api_key: None,
            sources: String::new(),
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresProviderRepository::new(db);
    let found = repo
        .find_by_code(ProviderKind::Media, "twitter")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found.kind, ProviderKind::Media);
    assert_eq!(provider::Kind::from(ProviderKind::Rss), provider::Kind::Rss);
}

#[tokio::test]
async fn test_keywords_map_optional_columns() {
    let now = Utc::now();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![search_keyword::Model {
            id: Uuid::new_v4(),
            keyword: "budget".to_owned(),
            region: "CA".to_owned(),
            language: "en".to_owned(),
            category: Some("politics".to_owned()),
            sub_category: None,
            description: None,
            enabled: false,
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresSearchKeywordRepository::new(db);
    let keywords: Vec<SearchKeyword> = repo.find_all().await.unwrap();

    assert_eq!(keywords.len(), 1);
    assert_eq!(keywords[0].keyword, "budget");
    assert_eq!(keywords[0].category.as_deref(), Some("politics"));
    assert!(!keywords[0].enabled);
}
