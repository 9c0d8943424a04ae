//! # Contentoire Infrastructure
//!
//! Concrete implementations of the ports defined in `contentoire-core`:
//! post/user/provider/keyword storage, token and password services, caches,
//! pub/sub transports, the credential rate limiter and the live post feed.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `rate-limit` - Rate limiting via governor
//! - `redis` - Redis cache and pub/sub

pub mod cache;
pub mod database;
pub mod feed;
pub mod pubsub;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use database::{
    DatabaseConnections, InMemoryPostRepository, InMemoryProviderRepository,
    InMemorySearchKeywordRepository, InMemoryUserRepository,
};
pub use feed::{FeedHub, FeedSnapshot, PostFeed};
pub use pubsub::InMemoryPubSub;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
#[cfg(feature = "redis")]
pub use pubsub::RedisPubSub;
