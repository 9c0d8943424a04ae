//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, NotSet, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use contentoire_core::domain::{
    Post, PostChanges, PostStatus, Provider, ProviderKind, SearchKeyword, User, mask_email,
    normalize_email,
};
use contentoire_core::error::RepoError;
use contentoire_core::ports::{
    BaseRepository, PostRepository, ProviderRepository, SearchKeywordRepository, UserRepository,
};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::provider::{self, Entity as ProviderEntity};
use super::entity::search_keyword::{self, Entity as SearchKeywordEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error, write_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL provider repository.
pub type PostgresProviderRepository = PostgresBaseRepository<ProviderEntity>;

/// PostgreSQL search keyword repository.
pub type PostgresSearchKeywordRepository = PostgresBaseRepository<SearchKeywordEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(self.db.as_ref())
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

fn db_time(t: Option<DateTime<Utc>>) -> Option<DateTimeWithTimeZone> {
    t.map(Into::into)
}

/// Partial update touching only the fields present in `changes`.
fn changes_to_active_model(id: Uuid, changes: &PostChanges) -> post::ActiveModel {
    post::ActiveModel {
        id: Set(id),
        title: changes.title.clone().map_or(NotSet, Set),
        content: changes.content.clone().map_or(NotSet, Set),
        image_url: changes.image_url.clone().map_or(NotSet, Set),
        source_url: NotSet,
        status: changes.status.map_or(NotSet, |s| Set(s.into())),
        suggested_time: changes.suggested_time.map_or(NotSet, |t| Set(db_time(t))),
        scheduled_time: changes.scheduled_time.map_or(NotSet, |t| Set(db_time(t))),
        created_at: NotSet,
        updated_at: Set(Utc::now().into()),
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>, RepoError> {
        let time_column = match status {
            PostStatus::Waiting => post::Column::SuggestedTime,
            PostStatus::Scheduled | PostStatus::Posted => post::Column::ScheduledTime,
        };

        let result = PostEntity::find()
            .filter(post::Column::Status.eq(post::Status::from(status)))
            .order_by_asc(time_column)
            .order_by_asc(post::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Post>, RepoError> {
        let in_range = |column: post::Column| {
            Condition::all()
                .add(column.gte(from))
                .add(column.lt(to))
        };

        let result = PostEntity::find()
            .filter(
                Condition::any()
                    .add(in_range(post::Column::SuggestedTime))
                    .add(in_range(post::Column::ScheduledTime)),
            )
            .order_by_asc(post::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Status.eq(post::Status::Scheduled))
            .filter(post::Column::ScheduledTime.lte(now))
            .order_by_asc(post::Column::ScheduledTime)
            .all(self.db.as_ref())
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: Uuid, changes: &PostChanges) -> Result<Post, RepoError> {
        let model = changes_to_active_model(id, changes)
            .update(self.db.as_ref())
            .await
            .map_err(write_error)?;

        Ok(model.into())
    }

    async fn update_if_due(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        changes: &PostChanges,
    ) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::update_many()
            .set(changes_to_active_model(id, changes))
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::Status.eq(post::Status::Scheduled))
            .filter(post::Column::ScheduledTime.lte(now))
            .exec(self.db.as_ref())
            .await
            .map_err(write_error)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        BaseRepository::<Post, Uuid>::find_by_id(self, id).await
    }
}

#[async_trait]
impl ProviderRepository for PostgresProviderRepository {
    async fn find_by_kind(&self, kind: ProviderKind) -> Result<Vec<Provider>, RepoError> {
        let result = ProviderEntity::find()
            .filter(provider::Column::Kind.eq(provider::Kind::from(kind)))
            .order_by_asc(provider::Column::Title)
            .all(self.db.as_ref())
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_code(
        &self,
        kind: ProviderKind,
        code: &str,
    ) -> Result<Option<Provider>, RepoError> {
        let result = ProviderEntity::find()
            .filter(provider::Column::Kind.eq(provider::Kind::from(kind)))
            .filter(provider::Column::Code.eq(code))
            .one(self.db.as_ref())
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl SearchKeywordRepository for PostgresSearchKeywordRepository {
    async fn find_all(&self) -> Result<Vec<SearchKeyword>, RepoError> {
        let result = SearchKeywordEntity::find()
            .order_by_asc(search_keyword::Column::Keyword)
            .all(self.db.as_ref())
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    #[test]
    fn test_partial_update_sets_only_changed_fields() {
        let id = Uuid::new_v4();
        let am = changes_to_active_model(
            id,
            &PostChanges {
                status: Some(PostStatus::Waiting),
                scheduled_time: Some(None),
                ..PostChanges::default()
            },
        );

        assert!(matches!(am.id, ActiveValue::Set(v) if v == id));
        assert!(matches!(am.status, ActiveValue::Set(post::Status::Waiting)));
        assert!(matches!(am.scheduled_time, ActiveValue::Set(None)));
        assert!(am.title.is_not_set());
        assert!(am.suggested_time.is_not_set());
        assert!(am.created_at.is_not_set());
    }
}
