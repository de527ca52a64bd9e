use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::db::models::{Availability, DayOfWeek, Schedule, ScheduleForm, ScheduleWithAvailabilities};
use crate::error::{AppError, AppResult};

// ============================================================================
// Schedule Repository
// ============================================================================

pub struct ScheduleRepository;

impl ScheduleRepository {
    /// Load a user's schedule together with its availabilities, in stored order.
    pub async fn find_by_owner(
        pool: &SqlitePool,
        clerk_user_id: &str,
    ) -> AppResult<Option<ScheduleWithAvailabilities>> {
        let schedule = sqlx::query_as::<_, Schedule>(
            r#"
            SELECT id, timezone, clerk_user_id, created_at, updated_at
            FROM schedules
            WHERE clerk_user_id = ?
            "#,
        )
        .bind(clerk_user_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)?;

        let Some(schedule) = schedule else {
            return Ok(None);
        };

        let rows = sqlx::query(
            r#"
            SELECT day_of_week, start_time, end_time
            FROM schedule_availabilities
            WHERE schedule_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(&schedule.id)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        let mut availabilities = Vec::with_capacity(rows.len());
        for r in rows {
            let day: String = r.get("day_of_week");
            let day_of_week = DayOfWeek::try_from(day).map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Corrupt availability row: {}", e))
            })?;
            availabilities.push(Availability {
                day_of_week,
                start_time: r.get("start_time"),
                end_time: r.get("end_time"),
            });
        }

        Ok(Some(ScheduleWithAvailabilities {
            schedule,
            availabilities,
        }))
    }

    /// Insert or update the user's schedule and replace all of its
    /// availabilities, atomically.
    pub async fn save(
        pool: &SqlitePool,
        clerk_user_id: &str,
        form: &ScheduleForm,
    ) -> AppResult<Schedule> {
        let now = Utc::now().naive_utc();
        let mut tx = pool.begin().await.map_err(AppError::Database)?;

        let schedule = sqlx::query_as::<_, Schedule>(
            r#"
            INSERT INTO schedules (id, timezone, clerk_user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(clerk_user_id) DO UPDATE SET
                timezone = excluded.timezone,
                updated_at = excluded.updated_at
            RETURNING id, timezone, clerk_user_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&form.timezone)
        .bind(clerk_user_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        sqlx::query("DELETE FROM schedule_availabilities WHERE schedule_id = ?")
            .bind(&schedule.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for availability in &form.availabilities {
            sqlx::query(
                r#"
                INSERT INTO schedule_availabilities (id, schedule_id, day_of_week, start_time, end_time)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&schedule.id)
            .bind(availability.day_of_week.as_str())
            .bind(&availability.start_time)
            .bind(&availability.end_time)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;

        tracing::debug!(
            "Saved schedule {} for user {} with {} availabilities",
            schedule.id,
            clerk_user_id,
            form.availabilities.len()
        );

        Ok(schedule)
    }
}
