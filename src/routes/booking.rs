use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::db::EventRepository;
use crate::error::{AppError, AppResult};
use crate::services::formatters::format_event_description;
use crate::AppState;

/// Public booking pages. No session required.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/:clerk_user_id/:event_id", get(booking_page))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPage {
    pub clerk_user_id: String,
    pub event_id: String,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i64,
    pub duration_description: String,
}

/// Header of the booking page for one of a user's active events.
async fn booking_page(
    State(state): State<Arc<AppState>>,
    Path((clerk_user_id, event_id)): Path<(String, String)>,
) -> AppResult<Json<BookingPage>> {
    let event = EventRepository::find_active_for_owner(&state.db, &event_id, &clerk_user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    Ok(Json(BookingPage {
        duration_description: format_event_description(event.duration_minutes),
        clerk_user_id: event.clerk_user_id,
        event_id: event.id,
        name: event.name,
        description: event.description,
        duration_minutes: event.duration_minutes,
    }))
}

#[cfg(test)]
mod tests {
    use crate::db::EventRepository;
    use crate::routes::test_support::{get, post, test_app, test_app_with, test_config};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn active_events_are_public() {
        let (app, pool) = test_app().await;
        post(
            &app,
            "/events",
            Some("host"),
            json!({ "name": "Office hours", "durationInMinutes": 90 }),
        )
        .await;
        let event = &EventRepository::list_by_owner(&pool, "host").await.unwrap()[0];

        let res = get(&app, &format!("/book/host/{}", event.id)).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["name"], "Office hours");
        assert_eq!(res.body["durationDescription"], "1 hr 30 mins");

        let res = get(&app, &format!("/book/someone-else/{}", event.id)).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn inactive_events_are_not_bookable() {
        let (app, pool) = test_app().await;
        post(
            &app,
            "/events",
            Some("host"),
            json!({ "name": "Paused", "durationInMinutes": 15, "isActive": false }),
        )
        .await;
        let event = &EventRepository::list_by_owner(&pool, "host").await.unwrap()[0];

        let res = get(&app, &format!("/book/host/{}", event.id)).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn booking_pages_are_rate_limited() {
        let mut config = test_config();
        config.rate_limit.booking_per_second = 1;
        config.rate_limit.booking_burst = 1;
        let (app, _pool) = test_app_with(config).await;

        let first = get(&app, "/book/host/missing").await;
        assert_eq!(first.status, StatusCode::NOT_FOUND);

        let second = get(&app, "/book/host/missing").await;
        assert_eq!(second.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(second.body["error"]["code"], "RATE_LIMITED");
        assert!(second.headers.contains_key(http::header::RETRY_AFTER));
    }
}
