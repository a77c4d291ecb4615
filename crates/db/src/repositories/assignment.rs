use storegrid_core::assignment::AssignmentPlan;
use storegrid_core::domain::manager::ManagerId;

use super::{AssignmentRepository, RepositoryError};
use crate::DbPool;

pub struct SqlAssignmentRepository {
    pool: DbPool,
}

impl SqlAssignmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AssignmentRepository for SqlAssignmentRepository {
    async fn apply(
        &self,
        manager_id: &ManagerId,
        plan: &AssignmentPlan,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for change in &plan.changes {
            sqlx::query("UPDATE branches SET manager_id = ? WHERE id = ?")
                .bind(change.manager_id.as_ref().map(|id| id.0.as_str()))
                .bind(&change.branch_id.0)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE managers SET branch_context = ? WHERE id = ?")
            .bind(plan.branch_context.as_ref().map(|id| id.0.as_str()))
            .bind(&manager_id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
