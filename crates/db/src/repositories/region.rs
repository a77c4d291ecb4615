use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use storegrid_core::domain::manager::ManagerId;
use storegrid_core::domain::region::{Region, RegionId};

use super::{RegionRepository, RepositoryError};
use crate::DbPool;

pub struct SqlRegionRepository {
    pool: DbPool,
}

impl SqlRegionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn region_from_row(row: &SqliteRow) -> Result<Region, RepositoryError> {
    Ok(Region {
        id: RegionId(row.try_get("id")?),
        name: row.try_get("name")?,
        regional_manager_id: row
            .try_get::<Option<String>, _>("regional_manager_id")?
            .map(ManagerId),
    })
}

#[async_trait::async_trait]
impl RegionRepository for SqlRegionRepository {
    async fn list(&self) -> Result<Vec<Region>, RepositoryError> {
        let rows =
            sqlx::query("SELECT id, name, regional_manager_id FROM regions ORDER BY name, id")
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(region_from_row).collect()
    }

    async fn find_by_id(&self, id: &RegionId) -> Result<Option<Region>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, regional_manager_id FROM regions WHERE id = ?")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(region_from_row).transpose()
    }

    async fn save(&self, region: Region) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO regions (id, name, regional_manager_id) VALUES (?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                 name = excluded.name,
                 regional_manager_id = excluded.regional_manager_id",
        )
        .bind(&region.id.0)
        .bind(&region.name)
        .bind(region.regional_manager_id.as_ref().map(|id| id.0.as_str()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &RegionId) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM regions WHERE id = ?").bind(&id.0).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }
}
