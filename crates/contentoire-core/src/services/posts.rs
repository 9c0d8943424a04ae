//! Post use cases: one write per action, followed by a change notification.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    CalendarMonth, NewPost, Post, PostChanges, PostEdit, PostStatus, SCHEDULE_LEAD_TIME_HOURS,
    ScheduleRequest,
};
use crate::error::DomainError;
use crate::ports::{PostRepository, PubSub};

/// Channel carrying [`PostEvent`] payloads.
pub const POSTS_CHANNEL: &str = "posts";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostEventKind {
    Created,
    Updated,
    Deleted,
}

/// Change notification published after every successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostEvent {
    pub post_id: Uuid,
    pub kind: PostEventKind,
    /// Status before the write. `None` for creations.
    pub previous_status: Option<PostStatus>,
    /// Status after the write. `None` for deletions.
    pub status: Option<PostStatus>,
}

impl PostEvent {
    /// Whether a list of `status` posts can have changed.
    pub fn concerns(&self, status: PostStatus) -> bool {
        self.previous_status == Some(status) || self.status == Some(status)
    }
}

#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
    events: Arc<dyn PubSub>,
    lead_time: TimeDelta,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>, events: Arc<dyn PubSub>) -> Self {
        Self {
            repo,
            events,
            lead_time: TimeDelta::hours(SCHEDULE_LEAD_TIME_HOURS),
        }
    }

    pub fn with_lead_time(mut self, lead_time: TimeDelta) -> Self {
        self.lead_time = lead_time;
        self
    }

    pub fn lead_time(&self) -> TimeDelta {
        self.lead_time
    }

    pub fn repository(&self) -> Arc<dyn PostRepository> {
        self.repo.clone()
    }

    pub fn events(&self) -> Arc<dyn PubSub> {
        self.events.clone()
    }

    pub async fn list(&self, status: PostStatus) -> Result<Vec<Post>, DomainError> {
        Ok(self.repo.find_by_status(status).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Post, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "Post",
                id,
            })
    }

    pub async fn create(&self, draft: NewPost) -> Result<Post, DomainError> {
        let post = self.repo.save(Post::new(draft)?).await?;
        tracing::info!(post_id = %post.id, "Post draft created");
        self.notify(PostEvent {
            post_id: post.id,
            kind: PostEventKind::Created,
            previous_status: None,
            status: Some(post.status),
        })
        .await;
        Ok(post)
    }

    /// Plain edit; status is unchanged.
    pub async fn edit(&self, id: Uuid, edit: PostEdit) -> Result<Post, DomainError> {
        let post = self.get(id).await?;
        let changes = post.plan_edit(edit, Utc::now(), self.lead_time)?;
        self.write(&post, changes).await
    }

    /// waiting -> scheduled.
    pub async fn schedule(&self, id: Uuid, request: ScheduleRequest) -> Result<Post, DomainError> {
        let post = self.get(id).await?;
        let changes = post.plan_schedule(request, Utc::now(), self.lead_time)?;
        let updated = self.write(&post, changes).await?;
        tracing::info!(
            post_id = %updated.id,
            scheduled_time = ?updated.scheduled_time,
            "Post scheduled"
        );
        Ok(updated)
    }

    /// scheduled -> waiting, keeping `displayed_time` as the new suggestion.
    pub async fn move_to_waiting(
        &self,
        id: Uuid,
        displayed_time: Option<DateTime<Utc>>,
    ) -> Result<Post, DomainError> {
        let post = self.get(id).await?;
        let changes = post.plan_move_to_waiting(displayed_time)?;
        let updated = self.write(&post, changes).await?;
        tracing::info!(post_id = %updated.id, "Post moved back to waiting");
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let post = self.get(id).await?;
        self.repo.delete(id).await?;
        self.notify(PostEvent {
            post_id: id,
            kind: PostEventKind::Deleted,
            previous_status: Some(post.status),
            status: None,
        })
        .await;
        Ok(())
    }

    /// Flip every due scheduled post to posted. Returns how many were flipped.
    ///
    /// Each write re-checks that the post is still due, so a post moved back
    /// to waiting or deleted after the due query is left alone. A failure on
    /// one post is logged and does not stop the sweep.
    pub async fn mark_due_as_posted(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let due = self.repo.find_due(now).await?;
        let mut published = 0;
        for post in due {
            let changes = match post.plan_publish(now) {
                Ok(changes) => changes,
                Err(e) => {
                    tracing::warn!(post_id = %post.id, error = %e, "Failed to publish post");
                    continue;
                }
            };
            match self.repo.update_if_due(post.id, now, &changes).await {
                Ok(Some(updated)) => {
                    published += 1;
                    self.notify(PostEvent {
                        post_id: post.id,
                        kind: PostEventKind::Updated,
                        previous_status: Some(post.status),
                        status: Some(updated.status),
                    })
                    .await;
                }
                Ok(None) => {
                    tracing::debug!(post_id = %post.id, "Post no longer due, skipping");
                }
                Err(e) => tracing::warn!(post_id = %post.id, error = %e, "Failed to publish post"),
            }
        }
        Ok(published)
    }

    /// Month grid with every post placed on its local date in `tz`.
    pub async fn calendar<Tz>(
        &self,
        year: i32,
        month: u32,
        tz: &Tz,
    ) -> Result<CalendarMonth, DomainError>
    where
        Tz: TimeZone + Sync,
    {
        let mut calendar = CalendarMonth::grid(year, month)?;
        let Some((from, to)) = calendar.query_window() else {
            return Ok(calendar);
        };
        let posts = self.repo.find_between(from, to).await?;
        calendar.fill(&posts, tz);
        Ok(calendar)
    }

    async fn write(&self, post: &Post, changes: PostChanges) -> Result<Post, DomainError> {
        let updated = self.repo.update(post.id, &changes).await?;
        self.notify(PostEvent {
            post_id: post.id,
            kind: PostEventKind::Updated,
            previous_status: Some(post.status),
            status: Some(updated.status),
        })
        .await;
        Ok(updated)
    }

    async fn notify(&self, event: PostEvent) {
        let payload = match serde_json::to_string(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode post event");
                return;
            }
        };
        // The write already succeeded; feeds catch up on their next refresh.
        if let Err(e) = self.events.publish(POSTS_CHANNEL, &payload).await {
            tracing::warn!(post_id = %event.post_id, error = %e, "Failed to publish post event");
        }
    }
}
