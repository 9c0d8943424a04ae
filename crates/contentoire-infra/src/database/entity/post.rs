//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use contentoire_core::domain::{Post, PostStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Status {
    #[sea_orm(string_value = "waiting")]
    Waiting,
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "posted")]
    Posted,
}

impl From<Status> for PostStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Waiting => Self::Waiting,
            Status::Scheduled => Self::Scheduled,
            Status::Posted => Self::Posted,
        }
    }
}

impl From<PostStatus> for Status {
    fn from(status: PostStatus) -> Self {
        match status {
            PostStatus::Waiting => Self::Waiting,
            PostStatus::Scheduled => Self::Scheduled,
            PostStatus::Posted => Self::Posted,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub status: Status,
    pub suggested_time: Option<DateTimeWithTimeZone>,
    pub scheduled_time: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            image_url: model.image_url,
            source_url: model.source_url,
            status: model.status.into(),
            suggested_time: model.suggested_time.map(Into::into),
            scheduled_time: model.scheduled_time.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            title: Set(post.title),
            content: Set(post.content),
            image_url: Set(post.image_url),
            source_url: Set(post.source_url),
            status: Set(post.status.into()),
            suggested_time: Set(post.suggested_time.map(Into::into)),
            scheduled_time: Set(post.scheduled_time.map(Into::into)),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
