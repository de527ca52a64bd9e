use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{Event, EventForm};
use crate::error::{AppError, AppResult};

// ============================================================================
// Event Repository
// ============================================================================

const EVENT_COLUMNS: &str = r#"
    id, name, description, duration_minutes, clerk_user_id, is_active,
    created_at, updated_at
"#;

pub struct EventRepository;

impl EventRepository {
    /// Insert a new event owned by `clerk_user_id`.
    pub async fn create(
        pool: &SqlitePool,
        clerk_user_id: &str,
        form: &EventForm,
    ) -> AppResult<Event> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (
                id, name, description, duration_minutes, clerk_user_id, is_active,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&id)
        .bind(&form.name)
        .bind(&form.description)
        .bind(form.duration_minutes)
        .bind(clerk_user_id)
        .bind(form.is_active)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)
    }

    /// Find an event by id, only if it belongs to `clerk_user_id`.
    pub async fn find_for_owner(
        pool: &SqlitePool,
        id: &str,
        clerk_user_id: &str,
    ) -> AppResult<Option<Event>> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = ? AND clerk_user_id = ?"
        ))
        .bind(id)
        .bind(clerk_user_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)
    }

    /// Find an active event for the public booking page.
    pub async fn find_active_for_owner(
        pool: &SqlitePool,
        id: &str,
        clerk_user_id: &str,
    ) -> AppResult<Option<Event>> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE id = ? AND clerk_user_id = ? AND is_active = 1
            "#
        ))
        .bind(id)
        .bind(clerk_user_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)
    }

    /// List a user's events, newest first.
    pub async fn list_by_owner(pool: &SqlitePool, clerk_user_id: &str) -> AppResult<Vec<Event>> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE clerk_user_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#
        ))
        .bind(clerk_user_id)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)
    }

    /// Update an event. Returns the number of affected rows; zero means the
    /// event does not exist or belongs to someone else.
    pub async fn update_for_owner(
        pool: &SqlitePool,
        id: &str,
        clerk_user_id: &str,
        form: &EventForm,
    ) -> AppResult<u64> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE events
            SET name = ?, description = ?, duration_minutes = ?, is_active = ?, updated_at = ?
            WHERE id = ? AND clerk_user_id = ?
            "#,
        )
        .bind(&form.name)
        .bind(&form.description)
        .bind(form.duration_minutes)
        .bind(form.is_active)
        .bind(now)
        .bind(id)
        .bind(clerk_user_id)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }

    /// Delete an event. Returns the number of affected rows.
    pub async fn delete_for_owner(
        pool: &SqlitePool,
        id: &str,
        clerk_user_id: &str,
    ) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM events WHERE id = ? AND clerk_user_id = ?")
            .bind(id)
            .bind(clerk_user_id)
            .execute(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }

    #[cfg(test)]
    pub async fn count_by_owner(pool: &SqlitePool, clerk_user_id: &str) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events WHERE clerk_user_id = ?")
            .bind(clerk_user_id)
            .fetch_one(pool)
            .await
            .map_err(AppError::Database)
    }
}
