//! Application state - shared across all handlers.

use std::sync::Arc;

use contentoire_core::ports::{
    Cache, PasswordService, PostRepository, ProviderRepository, PubSub, SearchKeywordRepository,
    TokenService, UserRepository,
};
use contentoire_core::services::PostService;
use contentoire_infra::database::{DatabaseConfig, DatabaseConnections};
use contentoire_infra::{
    Argon2PasswordService, FeedHub, InMemoryCache, InMemoryPostRepository, InMemoryProviderRepository,
    InMemoryPubSub, InMemoryRateLimiter, InMemorySearchKeywordRepository, InMemoryUserRepository,
    JwtTokenService,
};

#[cfg(feature = "postgres")]
use contentoire_infra::database::{
    PostgresPostRepository, PostgresProviderRepository, PostgresSearchKeywordRepository,
    PostgresUserRepository,
};
#[cfg(feature = "redis")]
use contentoire_infra::{RedisCache, RedisConfig, RedisPubSub};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    /// Live per-status lists behind the post streams.
    pub feeds: Arc<FeedHub>,
    pub users: Arc<dyn UserRepository>,
    pub providers: Arc<dyn ProviderRepository>,
    pub keywords: Arc<dyn SearchKeywordRepository>,
    pub cache: Arc<dyn Cache>,
    pub pubsub: Arc<dyn PubSub>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub rate_limiter: Arc<InMemoryRateLimiter>,
    /// Outbound client for avatar downloads.
    pub http: reqwest::Client,
    pub db: Option<Arc<DatabaseConnections>>,
    pub admin_emails: Arc<Vec<String>>,
    /// Set when the cache is in-process, so the maintenance job can purge it.
    pub memory_cache: Option<Arc<InMemoryCache>>,
}

struct Storage {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    providers: Arc<dyn ProviderRepository>,
    keywords: Arc<dyn SearchKeywordRepository>,
}

impl Storage {
    fn in_memory() -> Self {
        Self {
            posts: Arc::new(InMemoryPostRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
            providers: Arc::new(InMemoryProviderRepository::new()),
            keywords: Arc::new(InMemorySearchKeywordRepository::new()),
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(connections: &DatabaseConnections) -> Self {
        Self {
            posts: Arc::new(PostgresPostRepository::new(connections.main.clone())),
            users: Arc::new(PostgresUserRepository::new(connections.main.clone())),
            providers: Arc::new(PostgresProviderRepository::new(connections.main.clone())),
            keywords: Arc::new(PostgresSearchKeywordRepository::new(connections.main.clone())),
        }
    }
}

struct Messaging {
    cache: Arc<dyn Cache>,
    pubsub: Arc<dyn PubSub>,
    memory_cache: Option<Arc<InMemoryCache>>,
}

impl Messaging {
    fn in_memory() -> Self {
        let cache = Arc::new(InMemoryCache::new());
        Self {
            cache: cache.clone(),
            pubsub: Arc::new(InMemoryPubSub::default()),
            memory_cache: Some(cache),
        }
    }
}

impl AppState {
    /// Build the application state, connecting to Postgres and Redis when configured.
    ///
    /// An unreachable database falls back to in-memory storage. An unreachable
    /// Redis does too unless `REDIS_FALLBACK_TO_MEMORY` is off.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let (db, storage) = connect_storage(config.database.as_ref()).await;

        #[cfg(feature = "redis")]
        let messaging = connect_redis(config.redis.as_ref()).await?;

        #[cfg(not(feature = "redis"))]
        let messaging = Messaging::in_memory();

        tracing::info!(
            database = db.is_some(),
            shared_cache = messaging.memory_cache.is_none(),
            "Application state initialized"
        );

        Ok(Self::assemble(config, db, storage, messaging))
    }

    /// Everything in process. Used without a database and in tests.
    pub fn in_memory(config: &AppConfig) -> Self {
        Self::assemble(config, None, Storage::in_memory(), Messaging::in_memory())
    }

    fn assemble(
        config: &AppConfig,
        db: Option<Arc<DatabaseConnections>>,
        storage: Storage,
        messaging: Messaging,
    ) -> Self {
        let feeds = Arc::new(FeedHub::new(
            storage.posts.clone(),
            messaging.pubsub.clone(),
        ));
        let posts = PostService::new(storage.posts, messaging.pubsub.clone())
            .with_lead_time(config.lead_time);

        Self {
            posts,
            feeds,
            users: storage.users,
            providers: storage.providers,
            keywords: storage.keywords,
            cache: messaging.cache,
            pubsub: messaging.pubsub,
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
            rate_limiter: Arc::new(InMemoryRateLimiter::new(config.rate_limit.clone())),
            http: reqwest::Client::new(),
            db,
            admin_emails: Arc::new(config.admin_emails.clone()),
            memory_cache: messaging.memory_cache,
        }
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|e| e == email)
    }
}

#[cfg(feature = "postgres")]
async fn connect_storage(
    config: Option<&DatabaseConfig>,
) -> (Option<Arc<DatabaseConnections>>, Storage) {
    let Some(config) = config else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return (None, Storage::in_memory());
    };

    match DatabaseConnections::init(config).await {
        Ok(connections) => {
            let storage = Storage::postgres(&connections);
            (Some(Arc::new(connections)), storage)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
            (None, Storage::in_memory())
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn connect_storage(
    _config: Option<&DatabaseConfig>,
) -> (Option<Arc<DatabaseConnections>>, Storage) {
    tracing::info!("Running without postgres feature - using in-memory repositories");
    (None, Storage::in_memory())
}

#[cfg(feature = "redis")]
async fn connect_redis(config: Option<&RedisConfig>) -> anyhow::Result<Messaging> {
    let Some(redis) = config else {
        tracing::info!("REDIS_URL not set. Using in-process cache and pub/sub.");
        return Ok(Messaging::in_memory());
    };

    match (
        RedisCache::new(redis.clone()).await,
        RedisPubSub::new(redis.clone()).await,
    ) {
        (Ok(cache), Ok(pubsub)) => Ok(Messaging {
            cache: Arc::new(cache),
            pubsub: Arc::new(pubsub),
            memory_cache: None,
        }),
        (cache, pubsub) => {
            let reason = cache
                .err()
                .map(|e| e.to_string())
                .or_else(|| pubsub.err().map(|e| e.to_string()))
                .unwrap_or_default();

            if !redis.fallback_to_memory {
                anyhow::bail!("Redis unavailable: {reason}");
            }
            tracing::error!(error = %reason, "Redis unavailable. Using in-process cache and pub/sub.");
            Ok(Messaging::in_memory())
        }
    }
}
