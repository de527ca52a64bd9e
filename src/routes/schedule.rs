use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::error::{ActionError, ActionResult, AppError, AppResult};
use crate::routes::auth::{CurrentUser, SignedIn};
use crate::services::schedule::{timezone_options, ScheduleService, ScheduleView, TimezoneOption};
use crate::services::validation::ScheduleFormInput;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(schedule_page).post(save_schedule))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePage {
    #[serde(flatten)]
    pub schedule: ScheduleView,
    pub timezone_options: Vec<TimezoneOption>,
}

#[derive(Debug, Serialize)]
pub struct SaveScheduleResponse {
    pub success: bool,
    pub message: &'static str,
}

/// The schedule form: saved availabilities sorted and grouped by weekday.
async fn schedule_page(
    State(state): State<Arc<AppState>>,
    SignedIn(user_id): SignedIn,
) -> AppResult<Json<SchedulePage>> {
    let schedule = ScheduleService::view(&state.db, &user_id).await?;

    Ok(Json(SchedulePage {
        schedule,
        timezone_options: timezone_options(),
    }))
}

/// Save the whole schedule. Unlike event actions this stays on the page.
async fn save_schedule(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    body: Result<Json<ScheduleFormInput>, JsonRejection>,
) -> ActionResult<Json<SaveScheduleResponse>> {
    let user_id = user_id.ok_or(AppError::Unauthorized)?;
    let Json(input) =
        body.map_err(|rejection| ActionError(AppError::BadRequest(rejection.body_text())))?;

    ScheduleService::save(&state.db, Some(&user_id), input).await?;

    Ok(Json(SaveScheduleResponse {
        success: true,
        message: "Schedule Saved!",
    }))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{get, get_as, post, test_app};
    use axum::http::StatusCode;
    use serde_json::json;

    fn week() -> serde_json::Value {
        json!({
            "timezone": "Europe/Berlin",
            "availabilities": [
                { "dayOfWeek": "wednesday", "startTime": "13:00", "endTime": "17:00" },
                { "dayOfWeek": "monday", "startTime": "9:00", "endTime": "12:00" },
                { "dayOfWeek": "wednesday", "startTime": "8:30", "endTime": "12:00" }
            ]
        })
    }

    #[tokio::test]
    async fn unauthenticated_save_writes_nothing() {
        let (app, pool) = test_app().await;

        let res = post(&app, "/schedule", None, week()).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.body, json!({ "error": true }));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schedule_availabilities")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn saved_schedule_is_grouped_by_day_in_sorted_order() {
        let (app, _pool) = test_app().await;

        let res = post(&app, "/schedule", Some("owner"), week()).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["success"], true);

        let res = get_as(&app, "/schedule", "owner").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["timezone"], "Europe/Berlin");

        let starts: Vec<_> = res.body["availabilities"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["startTime"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(starts, vec!["8:30", "9:00", "13:00"]);

        let days = res.body["days"].as_array().unwrap();
        assert_eq!(days[0]["dayOfWeek"], "monday");
        assert_eq!(days[0]["availabilities"][0]["index"], 1);
        assert_eq!(days[2]["dayOfWeek"], "wednesday");
        let wednesday: Vec<_> = days[2]["availabilities"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| (a["index"].as_u64().unwrap(), a["startTime"].as_str().unwrap().to_string()))
            .collect();
        assert_eq!(
            wednesday,
            vec![(0, "8:30".to_string()), (2, "13:00".to_string())]
        );

        assert!(res.body["timezoneOptions"]
            .as_array()
            .unwrap()
            .iter()
            .any(|o| o["value"] == "Europe/Berlin"));
    }

    #[tokio::test]
    async fn overlapping_windows_are_rejected() {
        let (app, _pool) = test_app().await;

        let res = post(
            &app,
            "/schedule",
            Some("owner"),
            json!({
                "timezone": "UTC",
                "availabilities": [
                    { "dayOfWeek": "monday", "startTime": "9:00", "endTime": "12:00" },
                    { "dayOfWeek": "monday", "startTime": "11:00", "endTime": "13:00" }
                ]
            }),
        )
        .await;
        assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(res.body, json!({ "error": true }));

        let res = get_as(&app, "/schedule", "owner").await;
        assert_eq!(res.body["timezone"], "UTC");
        assert!(res.body["availabilities"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_an_error_flag() {
        let (app, _pool) = test_app().await;
        let res = post(&app, "/schedule", Some("owner"), json!(["not", "an", "object"])).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body, json!({ "error": true }));
    }

    #[tokio::test]
    async fn schedule_page_requires_sign_in() {
        let (app, _pool) = test_app().await;
        let res = get(&app, "/schedule").await;
        assert_eq!(res.status, StatusCode::SEE_OTHER);
        assert_eq!(res.location(), Some("/sign-in?redirect_url=%2Fschedule"));
    }
}
