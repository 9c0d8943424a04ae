//! Change notification transports: in-process broadcast and Redis channels.

mod memory;

pub use memory::InMemoryPubSub;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::RedisPubSub;
