use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use storegrid_core::domain::branch::BranchId;
use storegrid_core::domain::district::DistrictId;
use storegrid_core::domain::manager::{Manager, ManagerId, ManagerRole};
use storegrid_core::domain::region::RegionId;

use super::{ManagerRepository, RepositoryError};
use crate::DbPool;

pub struct SqlManagerRepository {
    pool: DbPool,
}

impl SqlManagerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn manager_from_row(row: &SqliteRow) -> Result<Manager, RepositoryError> {
    let role: String = row.try_get("role")?;
    let role = role
        .parse::<ManagerRole>()
        .map_err(|error| RepositoryError::Decode(error.to_string()))?;

    Ok(Manager {
        id: ManagerId(row.try_get("id")?),
        name: row.try_get("name")?,
        role,
        region_id: row.try_get::<Option<String>, _>("region_id")?.map(RegionId),
        district_id: row.try_get::<Option<String>, _>("district_id")?.map(DistrictId),
        branch_context: row.try_get::<Option<String>, _>("branch_context")?.map(BranchId),
    })
}

#[async_trait::async_trait]
impl ManagerRepository for SqlManagerRepository {
    async fn list_by_roles(&self, roles: &[ManagerRole]) -> Result<Vec<Manager>, RepositoryError> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, name, role, region_id, district_id, branch_context FROM managers",
        );

        if !roles.is_empty() {
            builder.push(" WHERE role IN (");
            let mut separated = builder.separated(", ");
            for role in roles {
                separated.push_bind(role.as_str());
            }
            builder.push(")");
        }
        builder.push(" ORDER BY name, id");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(manager_from_row).collect()
    }

    async fn find_by_id(&self, id: &ManagerId) -> Result<Option<Manager>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, role, region_id, district_id, branch_context
             FROM managers WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(manager_from_row).transpose()
    }

    async fn save(&self, manager: Manager) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO managers (id, name, role, region_id, district_id, branch_context)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                 name = excluded.name,
                 role = excluded.role,
                 region_id = excluded.region_id,
                 district_id = excluded.district_id,
                 branch_context = excluded.branch_context",
        )
        .bind(&manager.id.0)
        .bind(&manager.name)
        .bind(manager.role.as_str())
        .bind(manager.region_id.as_ref().map(|id| id.0.as_str()))
        .bind(manager.district_id.as_ref().map(|id| id.0.as_str()))
        .bind(manager.branch_context.as_ref().map(|id| id.0.as_str()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
