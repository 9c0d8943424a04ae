//! Month view.

use actix_web::{HttpResponse, web};
use chrono_tz::Tz;

use contentoire_shared::dto::CalendarQuery;

use super::views::calendar_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/calendar?year=&month=&tz=
///
/// Posts land on the day their active time falls on in `tz` (UTC by default).
pub async fn month(
    state: web::Data<AppState>,
    _identity: Identity,
    query: web::Query<CalendarQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let tz: Tz = match query.tz.as_deref() {
        None | Some("") => Tz::UTC,
        Some(name) => name
            .parse()
            .map_err(|_| AppError::Validation(format!("Unknown time zone '{name}'")))?,
    };

    let calendar = state.posts.calendar(query.year, query.month, &tz).await?;

    Ok(HttpResponse::Ok().json(calendar_response(calendar, tz.name().to_string())))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use chrono::{Datelike, TimeZone, Utc};
    use contentoire_core::domain::{NewPost, ScheduleRequest};
    use contentoire_shared::dto::CalendarResponse;

    use crate::test_support::{bearer, seed_user, test_state};

    #[actix_web::test]
    async fn test_month_grid_and_local_day() {
        let state = test_state();
        let (_, token) = seed_user(&state, "ada@example.com", &[]).await;

        // 23:30 UTC on 2030-03-14 is already the 15th in Paris.
        let post = state
            .posts
            .create(NewPost {
                title: "Pi day".to_string(),
                content: "3.14".to_string(),
                image_url: None,
                source_url: None,
                suggested_time: Utc.with_ymd_and_hms(2030, 3, 14, 23, 30, 0).unwrap(),
            })
            .await
            .unwrap();
        state
            .posts
            .schedule(
                post.id,
                ScheduleRequest::at(Utc.with_ymd_and_hms(2030, 3, 20, 12, 0, 0).unwrap()),
            )
            .await
            .unwrap();
        let waiting = state
            .posts
            .create(NewPost {
                title: "Late".to_string(),
                content: "night".to_string(),
                image_url: None,
                source_url: None,
                suggested_time: Utc.with_ymd_and_hms(2030, 3, 14, 23, 30, 0).unwrap(),
            })
            .await
            .unwrap();
        let app = crate::test_app!(state);

        let body: CalendarResponse = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/calendar?year=2030&month=3&tz=Europe/Paris")
                .insert_header(bearer(&token))
                .to_request(),
        )
        .await;

        assert_eq!(body.days.len() % 7, 0);
        assert_eq!(body.days.iter().filter(|d| d.in_current_month).count(), 31);
        assert_eq!(body.time_zone, "Europe/Paris");

        let day = |d: u32| {
            body.days
                .iter()
                .find(|c| c.in_current_month && c.date.day() == d)
                .unwrap()
        };
        assert!(day(15).indicators.waiting);
        assert_eq!(day(15).posts[0].id, waiting.id);
        assert!(!day(14).indicators.waiting);
        assert!(day(20).indicators.scheduled);
        assert!(!day(20).indicators.posted);
    }

    #[actix_web::test]
    async fn test_unknown_zone_is_422() {
        let state = test_state();
        let (_, token) = seed_user(&state, "ada@example.com", &[]).await;
        let app = crate::test_app!(state);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/calendar?year=2030&month=3&tz=Mars/Olympus")
                .insert_header(bearer(&token))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
