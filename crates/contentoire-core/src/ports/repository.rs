use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Post, PostChanges, PostStatus, Provider, ProviderKind, SearchKeyword, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// The `posts` collection.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// All posts with `status`, ordered by the status-appropriate time field
    /// (ties broken by creation time).
    async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>, RepoError>;

    /// Posts whose suggested or scheduled time lies in `[from, to)`.
    async fn find_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Post>, RepoError>;

    /// Scheduled posts whose publish time is at or before `now`.
    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError>;

    /// Merge `changes` into the stored post and return the result.
    async fn update(&self, id: Uuid, changes: &PostChanges) -> Result<Post, RepoError>;

    /// Like [`update`](Self::update), but only while the stored post is still
    /// due at `now`. `Ok(None)` when it no longer is, or is gone.
    async fn update_if_due(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        changes: &PostChanges,
    ) -> Result<Option<Post>, RepoError>;
}

/// Provider configuration records.
#[async_trait]
pub trait ProviderRepository: BaseRepository<Provider, Uuid> {
    /// Providers of one kind, ordered by title.
    async fn find_by_kind(&self, kind: ProviderKind) -> Result<Vec<Provider>, RepoError>;

    async fn find_by_code(
        &self,
        kind: ProviderKind,
        code: &str,
    ) -> Result<Option<Provider>, RepoError>;
}

/// Search keywords for the news workers.
#[async_trait]
pub trait SearchKeywordRepository: BaseRepository<SearchKeyword, Uuid> {
    /// Every keyword, ordered alphabetically.
    async fn find_all(&self) -> Result<Vec<SearchKeyword>, RepoError>;
}
