use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use storegrid_core::domain::district::{District, DistrictId};
use storegrid_core::domain::region::RegionId;

use super::{DistrictRepository, RepositoryError};
use crate::DbPool;

pub struct SqlDistrictRepository {
    pool: DbPool,
}

impl SqlDistrictRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn district_from_row(row: &SqliteRow) -> Result<District, RepositoryError> {
    Ok(District {
        id: DistrictId(row.try_get("id")?),
        name: row.try_get("name")?,
        region_id: RegionId(row.try_get("region_id")?),
    })
}

#[async_trait::async_trait]
impl DistrictRepository for SqlDistrictRepository {
    async fn list(&self) -> Result<Vec<District>, RepositoryError> {
        let rows = sqlx::query("SELECT id, name, region_id FROM districts ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(district_from_row).collect()
    }

    async fn save(&self, district: District) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO districts (id, name, region_id) VALUES (?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                 name = excluded.name,
                 region_id = excluded.region_id",
        )
        .bind(&district.id.0)
        .bind(&district.name)
        .bind(&district.region_id.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &DistrictId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM districts WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
