use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use storegrid_core::domain::branch::{Branch, BranchId};
use storegrid_core::domain::district::DistrictId;
use storegrid_core::domain::manager::ManagerId;
use storegrid_core::domain::region::RegionId;

use super::{BranchRepository, RepositoryError};
use crate::DbPool;

pub struct SqlBranchRepository {
    pool: DbPool,
}

impl SqlBranchRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn branch_from_row(row: &SqliteRow) -> Result<Branch, RepositoryError> {
    Ok(Branch {
        id: BranchId(row.try_get("id")?),
        name: row.try_get("name")?,
        region_id: RegionId(row.try_get("region_id")?),
        district_id: row.try_get::<Option<String>, _>("district_id")?.map(DistrictId),
        manager_id: row.try_get::<Option<String>, _>("manager_id")?.map(ManagerId),
    })
}

#[async_trait::async_trait]
impl BranchRepository for SqlBranchRepository {
    async fn list(&self) -> Result<Vec<Branch>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, region_id, district_id, manager_id FROM branches ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(branch_from_row).collect()
    }

    async fn save(&self, branch: Branch) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO branches (id, name, region_id, district_id, manager_id)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                 name = excluded.name,
                 region_id = excluded.region_id,
                 district_id = excluded.district_id,
                 manager_id = excluded.manager_id",
        )
        .bind(&branch.id.0)
        .bind(&branch.name)
        .bind(&branch.region_id.0)
        .bind(branch.district_id.as_ref().map(|id| id.0.as_str()))
        .bind(branch.manager_id.as_ref().map(|id| id.0.as_str()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &BranchId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM branches WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
