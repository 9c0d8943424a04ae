//! Domain entities - the core business objects.

pub mod calendar;
mod keyword;
mod post;
mod provider;
mod user;

pub use calendar::{CalendarDay, CalendarMonth, DayIndicators};
pub use keyword::{DEFAULT_LANGUAGE, DEFAULT_REGION, NewSearchKeyword, SearchKeyword};
pub use post::{
    NewPost, Post, PostChanges, PostEdit, PostStatus, SCHEDULE_LEAD_TIME_HOURS, ScheduleRequest,
};
pub use provider::{NewProvider, Provider, ProviderKind};
pub use user::{GLOBAL_ADMIN_ROLE, USER_ROLE, User, UserProfile, mask_email, normalize_email};
