use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Minimum distance between "now" and a requested publish time.
pub const SCHEDULE_LEAD_TIME_HOURS: i64 = 3;

/// Lifecycle state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Awaiting a human-confirmed schedule time.
    Waiting,
    /// Committed to a future publish time.
    Scheduled,
    /// Already published. Read-only.
    Posted,
}

impl PostStatus {
    pub const ALL: [PostStatus; 3] = [Self::Waiting, Self::Scheduled, Self::Posted];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Scheduled => "scheduled",
            Self::Posted => "posted",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(Self::Waiting),
            "scheduled" => Ok(Self::Scheduled),
            "posted" => Ok(Self::Posted),
            other => Err(DomainError::Validation(format!(
                "Unknown post status '{other}'"
            ))),
        }
    }
}

/// Post entity - a news-derived draft moving through the publishing lifecycle.
///
/// Exactly one of `suggested_time` / `scheduled_time` is the active time,
/// selected by `status` (see [`Post::active_time`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub status: PostStatus,
    pub suggested_time: Option<DateTime<Utc>>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a waiting draft.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub suggested_time: DateTime<Utc>,
}

/// Plain edit of a post. `None` leaves a field untouched.
///
/// `time` targets the status-appropriate field. A blank `image_url` clears the image.
#[derive(Debug, Clone, Default)]
pub struct PostEdit {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub time: Option<DateTime<Utc>>,
}

/// Schedule action input: the target time plus the edits made alongside it.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    pub scheduled_time: DateTime<Utc>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
}

impl ScheduleRequest {
    pub fn at(scheduled_time: DateTime<Utc>) -> Self {
        Self {
            scheduled_time,
            title: None,
            content: None,
            image_url: None,
        }
    }
}

/// A partial-field merge applied to a stored post.
///
/// Outer `None` means "leave as is"; `Some(None)` on a nullable field writes null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<Option<String>>,
    pub status: Option<PostStatus>,
    pub suggested_time: Option<Option<DateTime<Utc>>>,
    pub scheduled_time: Option<Option<DateTime<Utc>>>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn with_text_edits(
        mut self,
        title: Option<String>,
        content: Option<String>,
        image_url: Option<String>,
    ) -> Result<Self, DomainError> {
        if let Some(title) = title {
            if title.trim().is_empty() {
                return Err(DomainError::Validation("Title cannot be empty".to_string()));
            }
            self.title = Some(title);
        }
        if let Some(content) = content {
            if content.trim().is_empty() {
                return Err(DomainError::Validation(
                    "Content cannot be empty".to_string(),
                ));
            }
            self.content = Some(content);
        }
        if let Some(url) = image_url {
            let url = url.trim().to_string();
            self.image_url = Some((!url.is_empty()).then_some(url));
        }
        Ok(self)
    }
}

impl Post {
    /// Create a new waiting draft.
    pub fn new(draft: NewPost) -> Result<Self, DomainError> {
        if draft.title.trim().is_empty() {
            return Err(DomainError::Validation("Title cannot be empty".to_string()));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title: draft.title,
            content: draft.content,
            image_url: draft.image_url.filter(|u| !u.trim().is_empty()),
            source_url: draft.source_url.filter(|u| !u.trim().is_empty()),
            status: PostStatus::Waiting,
            suggested_time: Some(draft.suggested_time),
            scheduled_time: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// The time field that matters for the current status.
    pub fn active_time(&self) -> Option<DateTime<Utc>> {
        match self.status {
            PostStatus::Waiting => self.suggested_time,
            PostStatus::Scheduled | PostStatus::Posted => self.scheduled_time,
        }
    }

    /// Scheduled with a publish time at or before `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == PostStatus::Scheduled && self.scheduled_time.is_some_and(|t| t <= now)
    }

    /// Merge a set of changes into this post.
    pub fn apply(&mut self, changes: &PostChanges) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(content) = &changes.content {
            self.content = content.clone();
        }
        if let Some(image_url) = &changes.image_url {
            self.image_url = image_url.clone();
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(suggested) = changes.suggested_time {
            self.suggested_time = suggested;
        }
        if let Some(scheduled) = changes.scheduled_time {
            self.scheduled_time = scheduled;
        }
    }

    /// Plan a plain edit that keeps the current status.
    ///
    /// Moving a scheduled post's time is held to the same lead time as scheduling.
    pub fn plan_edit(
        &self,
        edit: PostEdit,
        now: DateTime<Utc>,
        lead: TimeDelta,
    ) -> Result<PostChanges, DomainError> {
        if self.status == PostStatus::Posted {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                action: "edit",
            });
        }

        let mut changes =
            PostChanges::default().with_text_edits(edit.title, edit.content, edit.image_url)?;

        if let Some(time) = edit.time {
            if self.status == PostStatus::Waiting {
                changes.suggested_time = Some(Some(time));
            } else {
                ensure_lead_time(time, now, lead)?;
                changes.scheduled_time = Some(Some(time));
            }
        }

        if changes.is_empty() {
            return Err(DomainError::Validation("Nothing to update".to_string()));
        }
        Ok(changes)
    }

    /// Plan the waiting -> scheduled transition.
    ///
    /// `suggested_time` is left as stored.
    pub fn plan_schedule(
        &self,
        request: ScheduleRequest,
        now: DateTime<Utc>,
        lead: TimeDelta,
    ) -> Result<PostChanges, DomainError> {
        if self.status != PostStatus::Waiting {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                action: "schedule",
            });
        }
        ensure_lead_time(request.scheduled_time, now, lead)?;

        let mut changes = PostChanges::default().with_text_edits(
            request.title,
            request.content,
            request.image_url,
        )?;
        changes.status = Some(PostStatus::Scheduled);
        changes.scheduled_time = Some(Some(request.scheduled_time));
        Ok(changes)
    }

    /// Plan the scheduled -> waiting transition.
    ///
    /// `displayed_time` is the time the user was looking at; it falls back to the
    /// stored scheduled time.
    pub fn plan_move_to_waiting(
        &self,
        displayed_time: Option<DateTime<Utc>>,
    ) -> Result<PostChanges, DomainError> {
        if self.status != PostStatus::Scheduled {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                action: "move to waiting",
            });
        }
        let suggested = displayed_time
            .or(self.scheduled_time)
            .ok_or_else(|| DomainError::Validation("Post has no time to keep".to_string()))?;

        Ok(PostChanges {
            status: Some(PostStatus::Waiting),
            suggested_time: Some(Some(suggested)),
            scheduled_time: Some(None),
            ..PostChanges::default()
        })
    }

    /// Plan the scheduled -> posted transition once the publish time has passed.
    pub fn plan_publish(&self, now: DateTime<Utc>) -> Result<PostChanges, DomainError> {
        match (self.status, self.scheduled_time) {
            (PostStatus::Scheduled, Some(at)) if at <= now => Ok(PostChanges {
                status: Some(PostStatus::Posted),
                ..PostChanges::default()
            }),
            (status, _) => Err(DomainError::InvalidTransition {
                from: status,
                action: "publish",
            }),
        }
    }
}

fn ensure_lead_time(
    requested: DateTime<Utc>,
    now: DateTime<Utc>,
    lead: TimeDelta,
) -> Result<(), DomainError> {
    let earliest = now + lead;
    if requested < earliest {
        return Err(DomainError::ScheduleTooSoon {
            requested,
            earliest,
            lead_minutes: lead.num_minutes(),
        });
    }
    Ok(())
}
