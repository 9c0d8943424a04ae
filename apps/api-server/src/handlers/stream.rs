//! Live post lists as Server-Sent Events, plus pull-to-refresh.

use std::convert::Infallible;
use std::time::Duration;

use actix_web::{HttpResponse, Responder, web};
use actix_web_lab::sse::{self, Sse};
use futures::stream;

use contentoire_infra::FeedSnapshot;
use contentoire_shared::dto::PostListQuery;

use super::posts::parse_status;
use super::views::feed_frame;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

const KEEP_ALIVE: Duration = Duration::from_secs(15);

fn posts_event(snapshot: FeedSnapshot) -> sse::Event {
    match sse::Data::new_json(feed_frame(snapshot)) {
        Ok(data) => data.event("posts").into(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode feed frame");
            sse::Event::Comment("encode error".into())
        }
    }
}

/// GET /api/posts/stream?status=
///
/// Sends the whole list on connect and again after every change that touches
/// the requested status.
pub async fn stream(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PostListQuery>,
) -> AppResult<impl Responder> {
    let status = parse_status(&query.status)?;
    let rx = state.feeds.feed(status).await?.watch();

    tracing::debug!(user_id = %identity.user_id, status = %status, "Post stream opened");

    let events = stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let snapshot = rx.borrow_and_update().clone();
        Some((
            Ok::<_, Infallible>(posts_event(snapshot)),
            (rx, false),
        ))
    });

    Ok(Sse::from_stream(events).with_keep_alive(KEEP_ALIVE))
}

/// POST /api/posts/refresh?status=
///
/// Re-fetches the live list for every stream on this instance and returns
/// the result. A failed fetch keeps the previous list and reports the error.
pub async fn refresh(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let status = parse_status(&query.status)?;
    let feed = state.feeds.feed(status).await?;

    if feed.force_refresh().await.is_ok() {
        tracing::debug!(user_id = %identity.user_id, status = %status, "Post list refreshed");
    }

    Ok(HttpResponse::Ok().json(feed_frame(feed.snapshot())))
}
