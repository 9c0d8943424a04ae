//! Per-client request quotas for the credential endpoints.

mod memory;

pub use memory::{InMemoryRateLimiter, RateLimitConfig};
