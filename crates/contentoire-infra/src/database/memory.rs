//! In-memory repositories, used when no database is configured.
//!
//! They enforce the same uniqueness rules as the Postgres schema.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use contentoire_core::domain::{
    Post, PostChanges, PostStatus, Provider, ProviderKind, SearchKeyword, User,
};
use contentoire_core::error::RepoError;
use contentoire_core::ports::{
    BaseRepository, PostRepository, ProviderRepository, SearchKeywordRepository, UserRepository,
};

#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn collect<F>(&self, keep: F) -> Vec<Post>
    where
        F: Fn(&Post) -> bool,
    {
        let mut posts: Vec<Post> = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| keep(p))
            .cloned()
            .collect();
        posts.sort_by_key(|p| (p.active_time(), p.created_at));
        posts
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.posts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>, RepoError> {
        Ok(self.collect(|p| p.status == status).await)
    }

    async fn find_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Post>, RepoError> {
        let in_range = |t: Option<DateTime<Utc>>| t.is_some_and(|t| t >= from && t < to);
        Ok(self
            .collect(|p| in_range(p.suggested_time) || in_range(p.scheduled_time))
            .await)
    }

    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        Ok(self.collect(|p| p.is_due(now)).await)
    }

    async fn update(&self, id: Uuid, changes: &PostChanges) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        let post = posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.apply(changes);
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    async fn update_if_due(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        changes: &PostChanges,
    ) -> Result<Option<Post>, RepoError> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.get_mut(&id).filter(|p| p.is_due(now)) else {
            return Ok(None);
        };
        post.apply(changes);
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        let clash = users.values().find(|u| {
            u.id != user.id
                && (u.email.eq_ignore_ascii_case(&user.email)
                    || (u.username.is_some() && u.username == user.username))
        });
        if clash.is_some() {
            return Err(RepoError::Constraint("User already exists".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username.as_deref() == Some(username))
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryProviderRepository {
    providers: RwLock<HashMap<Uuid, Provider>>,
}

impl InMemoryProviderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Provider, Uuid> for InMemoryProviderRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Provider>, RepoError> {
        Ok(self.providers.read().await.get(&id).cloned())
    }

    async fn save(&self, provider: Provider) -> Result<Provider, RepoError> {
        let mut providers = self.providers.write().await;
        if providers
            .values()
            .any(|p| p.id != provider.id && p.kind == provider.kind && p.code == provider.code)
        {
            return Err(RepoError::Constraint(format!(
                "Provider code '{}' already exists",
                provider.code
            )));
        }
        providers.insert(provider.id, provider.clone());
        Ok(provider)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.providers
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl ProviderRepository for InMemoryProviderRepository {
    async fn find_by_kind(&self, kind: ProviderKind) -> Result<Vec<Provider>, RepoError> {
        let mut providers: Vec<Provider> = self
            .providers
            .read()
            .await
            .values()
            .filter(|p| p.kind == kind)
            .cloned()
            .collect();
        providers.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(providers)
    }

    async fn find_by_code(
        &self,
        kind: ProviderKind,
        code: &str,
    ) -> Result<Option<Provider>, RepoError> {
        Ok(self
            .providers
            .read()
            .await
            .values()
            .find(|p| p.kind == kind && p.code == code)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemorySearchKeywordRepository {
    keywords: RwLock<HashMap<Uuid, SearchKeyword>>,
}

impl InMemorySearchKeywordRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<SearchKeyword, Uuid> for InMemorySearchKeywordRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<SearchKeyword>, RepoError> {
        Ok(self.keywords.read().await.get(&id).cloned())
    }

    async fn save(&self, keyword: SearchKeyword) -> Result<SearchKeyword, RepoError> {
        self.keywords
            .write()
            .await
            .insert(keyword.id, keyword.clone());
        Ok(keyword)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.keywords
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl SearchKeywordRepository for InMemorySearchKeywordRepository {
    async fn find_all(&self) -> Result<Vec<SearchKeyword>, RepoError> {
        let mut keywords: Vec<SearchKeyword> =
            self.keywords.read().await.values().cloned().collect();
        keywords.sort_by(|a, b| a.keyword.cmp(&b.keyword));
        Ok(keywords)
    }
}
