//! Month grid and per-day post buckets for the calendar view.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};

use super::post::{Post, PostStatus};
use crate::error::DomainError;

/// Which statuses are present on a day. Presence only, no counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayIndicators {
    pub waiting: bool,
    pub scheduled: bool,
    pub posted: bool,
}

impl DayIndicators {
    fn mark(&mut self, status: PostStatus) {
        match status {
            PostStatus::Waiting => self.waiting = true,
            PostStatus::Scheduled => self.scheduled = true,
            PostStatus::Posted => self.posted = true,
        }
    }
}

/// One cell of the month grid.
#[derive(Debug, Clone)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_current_month: bool,
    pub posts: Vec<Post>,
    pub indicators: DayIndicators,
}

/// A Sunday-first, 7-wide grid covering a whole month.
#[derive(Debug, Clone)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

impl CalendarMonth {
    /// Build the empty grid for a month, padded with days of the adjacent months.
    pub fn grid(year: i32, month: u32) -> Result<Self, DomainError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| DomainError::Validation(format!("Invalid month {year}-{month}")))?;
        let last = last_day_of_month(first)?;

        let leading = u64::from(first.weekday().num_days_from_sunday());
        let trailing = u64::from(6 - last.weekday().num_days_from_sunday());
        let start = first
            .checked_sub_days(Days::new(leading))
            .ok_or_else(|| DomainError::Validation("Date out of range".to_string()))?;
        let total = leading + u64::from(last.day()) + trailing;

        let days = start
            .iter_days()
            .take(total as usize)
            .map(|date| CalendarDay {
                date,
                in_current_month: date.month() == month && date.year() == year,
                posts: Vec::new(),
                indicators: DayIndicators::default(),
            })
            .collect();

        Ok(Self { year, month, days })
    }

    /// Build the grid and bucket `posts` by the local date of their active time.
    pub fn build<Tz: TimeZone>(
        year: i32,
        month: u32,
        posts: &[Post],
        tz: &Tz,
    ) -> Result<Self, DomainError> {
        let mut calendar = Self::grid(year, month)?;
        calendar.fill(posts, tz);
        Ok(calendar)
    }

    /// Put each post on the grid day its active time falls on in `tz`.
    pub fn fill<Tz: TimeZone>(&mut self, posts: &[Post], tz: &Tz) {
        let Some(first) = self.days.first().map(|d| d.date) else {
            return;
        };

        let mut sorted: Vec<&Post> = posts.iter().filter(|p| p.active_time().is_some()).collect();
        sorted.sort_by_key(|p| (p.active_time(), p.created_at));

        for post in sorted {
            let Some(at) = post.active_time() else {
                continue;
            };
            let local = at.with_timezone(tz).date_naive();
            let offset = (local - first).num_days();
            if offset < 0 {
                continue;
            }
            if let Some(day) = self.days.get_mut(offset as usize) {
                day.indicators.mark(post.status);
                day.posts.push(post.clone());
            }
        }
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|d| d.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.last().map(|d| d.date)
    }

    /// UTC range wide enough to contain every post that can land on the grid
    /// in any time zone.
    pub fn query_window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.first_date()?.and_time(NaiveTime::default()).and_utc();
        let last = self.last_date()?.and_time(NaiveTime::default()).and_utc();
        Some((first - TimeDelta::days(1), last + TimeDelta::days(2)))
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days.iter().find(|d| d.date == date)
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarDay]> {
        self.days.chunks(7)
    }
}

fn last_day_of_month(first: NaiveDate) -> Result<NaiveDate, DomainError> {
    first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| DomainError::Validation("Date out of range".to_string()))
}
