//! Application services - use cases composed from domain rules and ports.

mod posts;

pub use posts::{POSTS_CHANNEL, PostEvent, PostEventKind, PostService};
