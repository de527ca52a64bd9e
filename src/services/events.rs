use sqlx::SqlitePool;

use crate::db::{Event, EventRepository};
use crate::error::{AppError, AppResult};
use crate::services::validation::{parse_event_form, EventFormInput};

pub struct EventService;

impl EventService {
    /// Validate the form and insert one event owned by the signed-in user.
    pub async fn create(
        pool: &SqlitePool,
        user_id: Option<&str>,
        input: EventFormInput,
    ) -> AppResult<Event> {
        let user_id = user_id.ok_or(AppError::Unauthorized)?;
        let form = parse_event_form(input).map_err(AppError::Validation)?;

        let event = EventRepository::create(pool, user_id, &form).await?;
        tracing::info!("Created event {} for user {}", event.id, user_id);
        Ok(event)
    }

    /// Validate the form and update the event, if the signed-in user owns it.
    pub async fn update(
        pool: &SqlitePool,
        user_id: Option<&str>,
        id: &str,
        input: EventFormInput,
    ) -> AppResult<()> {
        let user_id = user_id.ok_or(AppError::Unauthorized)?;
        let form = parse_event_form(input).map_err(AppError::Validation)?;

        let rows = EventRepository::update_for_owner(pool, id, user_id, &form).await?;
        if rows == 0 {
            tracing::debug!("Update of event {} by user {} matched no rows", id, user_id);
            return Err(AppError::NotFound(format!("Event {}", id)));
        }

        tracing::info!("Updated event {} for user {}", id, user_id);
        Ok(())
    }

    /// Delete the event, if the signed-in user owns it.
    pub async fn delete(pool: &SqlitePool, user_id: Option<&str>, id: &str) -> AppResult<()> {
        let user_id = user_id.ok_or(AppError::Unauthorized)?;

        let rows = EventRepository::delete_for_owner(pool, id, user_id).await?;
        if rows == 0 {
            tracing::debug!("Delete of event {} by user {} matched no rows", id, user_id);
            return Err(AppError::NotFound(format!("Event {}", id)));
        }

        tracing::info!("Deleted event {} for user {}", id, user_id);
        Ok(())
    }
}
