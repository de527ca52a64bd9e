use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::db::{Event, EventRepository};
use crate::error::{ActionError, ActionResult, AppError, AppResult};
use crate::routes::auth::{CurrentUser, SignedIn};
use crate::services::events::EventService;
use crate::services::formatters::format_event_description;
use crate::services::validation::EventFormInput;
use crate::AppState;

/// Listing page after every successful event action.
pub const EVENTS_PATH: &str = "/events";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/new", get(new_event_form))
        // NOTE: "/new" must stay a static route so it never matches "/:id"
        .route("/:id", post(update_event))
        .route("/:id/edit", get(edit_event_form))
        .route("/:id/delete", post(delete_event))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCard {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i64,
    pub duration_description: String,
    pub is_active: bool,
    pub clerk_user_id: String,
    /// Public booking link; only active events can be shared.
    pub booking_url: Option<String>,
    pub edit_url: String,
}

#[derive(Debug, Serialize)]
pub struct EventsPage {
    pub events: Vec<EventCard>,
}

/// Values the event form starts from.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFormValues {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub duration_in_minutes: i64,
    pub is_active: bool,
}

impl From<Event> for EventFormValues {
    fn from(e: Event) -> Self {
        Self {
            id: Some(e.id),
            name: Some(e.name),
            description: e.description,
            duration_in_minutes: e.duration_minutes,
            is_active: e.is_active,
        }
    }
}

pub fn booking_url(public_url: &str, clerk_user_id: &str, event_id: &str) -> String {
    format!(
        "{}/book/{}/{}",
        public_url.trim_end_matches('/'),
        urlencoding::encode(clerk_user_id),
        urlencoding::encode(event_id)
    )
}

fn event_card(public_url: &str, e: Event) -> EventCard {
    EventCard {
        booking_url: e
            .is_active
            .then(|| booking_url(public_url, &e.clerk_user_id, &e.id)),
        edit_url: format!("{}/{}/edit", EVENTS_PATH, e.id),
        duration_description: format_event_description(e.duration_minutes),
        id: e.id,
        name: e.name,
        description: e.description,
        duration_minutes: e.duration_minutes,
        is_active: e.is_active,
        clerk_user_id: e.clerk_user_id,
    }
}

// ============================================================================
// Pages
// ============================================================================

/// The signed-in user's events, newest first.
async fn list_events(
    State(state): State<Arc<AppState>>,
    SignedIn(user_id): SignedIn,
) -> AppResult<Json<EventsPage>> {
    let events = EventRepository::list_by_owner(&state.db, &user_id).await?;
    let public_url = &state.config.server.public_url;

    Ok(Json(EventsPage {
        events: events.into_iter().map(|e| event_card(public_url, e)).collect(),
    }))
}

async fn new_event_form(SignedIn(_user_id): SignedIn) -> Json<EventFormValues> {
    Json(EventFormValues {
        id: None,
        name: None,
        description: None,
        duration_in_minutes: 30,
        is_active: true,
    })
}

async fn edit_event_form(
    State(state): State<Arc<AppState>>,
    SignedIn(user_id): SignedIn,
    Path(id): Path<String>,
) -> AppResult<Json<EventFormValues>> {
    let event = EventRepository::find_for_owner(&state.db, &id, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {}", id)))?;

    Ok(Json(event.into()))
}

// ============================================================================
// Actions
// ============================================================================

fn form_body(body: Result<Json<EventFormInput>, JsonRejection>) -> ActionResult<EventFormInput> {
    body.map(|Json(input)| input)
        .map_err(|rejection| ActionError(AppError::BadRequest(rejection.body_text())))
}

async fn create_event(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    body: Result<Json<EventFormInput>, JsonRejection>,
) -> ActionResult<Redirect> {
    let user_id = user_id.ok_or(AppError::Unauthorized)?;
    let input = form_body(body)?;

    EventService::create(&state.db, Some(&user_id), input).await?;
    Ok(Redirect::to(EVENTS_PATH))
}

async fn update_event(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<EventFormInput>, JsonRejection>,
) -> ActionResult<Redirect> {
    let user_id = user_id.ok_or(AppError::Unauthorized)?;
    let input = form_body(body)?;

    EventService::update(&state.db, Some(&user_id), &id, input).await?;
    Ok(Redirect::to(EVENTS_PATH))
}

async fn delete_event(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> ActionResult<Redirect> {
    EventService::delete(&state.db, user_id.as_deref(), &id).await?;
    Ok(Redirect::to(EVENTS_PATH))
}
