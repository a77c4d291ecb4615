use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use storegrid_core::activity::{ActivityDetails, ActivityEvent, ActivityId};

use super::{ActivityRepository, RepositoryError};
use crate::DbPool;

pub struct SqlActivityRepository {
    pool: DbPool,
}

impl SqlActivityRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn event_from_row(row: &SqliteRow) -> Result<ActivityEvent, RepositoryError> {
    let occurred_at: String = row.try_get("occurred_at")?;
    let occurred_at = DateTime::parse_from_rfc3339(&occurred_at)
        .map_err(|error| RepositoryError::Decode(format!("occurred_at: {error}")))?
        .with_timezone(&Utc);

    // A details column that does not decode is treated as an opaque raw
    // payload; the description mapper recovers from it downstream.
    let details: String = row.try_get("details")?;
    let details = serde_json::from_str::<ActivityDetails>(&details)
        .unwrap_or(ActivityDetails::Raw(details));

    Ok(ActivityEvent {
        id: ActivityId(row.try_get("id")?),
        action: row.try_get("action")?,
        user_name: row.try_get("user_name")?,
        details,
        occurred_at,
    })
}

#[async_trait::async_trait]
impl ActivityRepository for SqlActivityRepository {
    async fn list_recent(&self, limit: u32) -> Result<Vec<ActivityEvent>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, action, user_name, details, occurred_at
             FROM activity_log
             ORDER BY occurred_at DESC, id DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(event_from_row).collect()
    }

    async fn append(&self, event: ActivityEvent) -> Result<(), RepositoryError> {
        let details = serde_json::to_string(&event.details)
            .map_err(|error| RepositoryError::Decode(format!("details: {error}")))?;

        sqlx::query(
            "INSERT INTO activity_log (id, action, user_name, details, occurred_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&event.id.0)
        .bind(&event.action)
        .bind(&event.user_name)
        .bind(details)
        .bind(event.occurred_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
