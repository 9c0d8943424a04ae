//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    /// `waiting`, `scheduled` or `posted`.
    pub status: String,
    pub suggested_time: Option<DateTime<Utc>>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `?status=` on the list and stream endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListQuery {
    pub status: String,
}

/// Draft submitted by a news worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    pub suggested_time: DateTime<Utc>,
}

/// Plain edit from the post modal. Absent fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// An empty string removes the image.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Written to the time field that matches the post's status.
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePostRequest {
    pub scheduled_time: DateTime<Utc>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToWaitingRequest {
    /// The time the user was looking at. Defaults to the stored scheduled time.
    #[serde(default)]
    pub displayed_time: Option<DateTime<Utc>>,
}

/// One SSE `data:` frame of a post stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFeedFrame {
    pub status: String,
    pub posts: Vec<PostResponse>,
    pub loading: bool,
    pub refreshing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarQuery {
    pub year: i32,
    pub month: u32,
    /// IANA zone name, e.g. `Europe/Paris`. Defaults to UTC.
    #[serde(default)]
    pub tz: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub time_zone: String,
    pub days: Vec<CalendarDayResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDayResponse {
    pub date: NaiveDate,
    pub in_current_month: bool,
    pub indicators: DayIndicatorsResponse,
    pub posts: Vec<PostResponse>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayIndicatorsResponse {
    pub waiting: bool,
    pub scheduled: bool,
    pub posted: bool,
}

// ---------------------------------------------------------------------------
// Auth and profile
// ---------------------------------------------------------------------------

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub display_name: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub display_name: String,
    pub full_name: String,
    pub roles: Vec<String>,
    pub enabled_media: Vec<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

/// The settings screen. Used for both reading and replacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub enabled_media: Vec<String>,
}

// ---------------------------------------------------------------------------
// Legacy PHP backend
// ---------------------------------------------------------------------------

/// `POST /users/login.php`. Either `username` or `email` identifies the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyLoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyLoginResponse {
    pub token: String,
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
}

// ---------------------------------------------------------------------------
// Admin settings
// ---------------------------------------------------------------------------

/// Create or replace a news API or auth provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRequest {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResponse {
    pub id: Uuid,
    /// `news`, `auth`, `media` or `rss`.
    pub kind: String,
    pub code: String,
    pub title: String,
    pub logo: String,
    pub enabled: bool,
    pub api_key: Option<String>,
    pub sources: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create or replace a search keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchKeywordRequest {
    pub keyword: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchKeywordResponse {
    pub id: Uuid,
    pub keyword: String,
    pub region: String,
    pub language: String,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub description: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A social platform users can enable on their profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialMediaResponse {
    /// The provider code stored in `enabledMedia`.
    pub id: String,
    pub title: String,
    pub logo: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_request_reads_camel_case() {
        let req: SchedulePostRequest = serde_json::from_str(
            r#"{"scheduledTime":"2026-03-01T12:00:00Z","imageUrl":""}"#,
        )
        .unwrap();

        assert_eq!(req.scheduled_time.to_rfc3339(), "2026-03-01T12:00:00+00:00");
        assert_eq!(req.image_url.as_deref(), Some(""));
        assert!(req.title.is_none());
    }

    #[test]
    fn test_move_to_waiting_body_fields_are_optional() {
        let req: MoveToWaitingRequest = serde_json::from_str("{}").unwrap();
        assert!(req.displayed_time.is_none());
    }

    #[test]
    fn test_provider_request_defaults() {
        let req: ProviderRequest =
            serde_json::from_str(r#"{"code":"newsapi","title":"NewsAPI"}"#).unwrap();
        assert!(req.enabled);
        assert!(req.sources.is_empty());
        assert!(req.api_key.is_none());
    }

    #[test]
    fn test_legacy_login_response_keeps_snake_case() {
        let body = serde_json::to_value(LegacyLoginResponse {
            token: "t".to_string(),
            id: Uuid::nil(),
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            full_name: "Ada Lovelace".to_string(),
        })
        .unwrap();

        assert_eq!(body["first_name"], "Ada");
        assert_eq!(body["full_name"], "Ada Lovelace");
    }

    #[test]
    fn test_keyword_request_defaults() {
        let req: SearchKeywordRequest =
            serde_json::from_str(r#"{"keyword":"budget","subCategory":"federal"}"#).unwrap();
        assert!(req.enabled);
        assert_eq!(req.sub_category.as_deref(), Some("federal"));
        assert!(req.region.is_none());
    }
}
