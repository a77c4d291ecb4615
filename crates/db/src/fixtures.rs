use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

const SEED_REGION_IDS: &[&str] = &["region-north", "region-south"];

const SEED_DISTRICT_IDS: &[&str] = &["district-north-1", "district-north-2", "district-south-1"];

const SEED_BRANCH_IDS: &[&str] =
    &["branch-harbor", "branch-market", "branch-ridge", "branch-plaza", "branch-mill"];

const SEED_MANAGER_IDS: &[&str] =
    &["manager-ada", "manager-grace", "manager-alan", "manager-joan"];

const SEED_ACTIVITY_IDS: &[&str] =
    &["activity-0001", "activity-0002", "activity-0003", "activity-0004"];

/// Demo seed dataset: two regions, three districts, five branches, and a
/// manager at every role, plus a few activity entries.
pub struct DemoSeedDataset;

impl DemoSeedDataset {
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_seed_data.sql");

    /// Load the demo dataset. Safe to run more than once.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        Ok(SeedResult {
            regions: SEED_REGION_IDS.len(),
            districts: SEED_DISTRICT_IDS.len(),
            branches: SEED_BRANCH_IDS.len(),
            managers: SEED_MANAGER_IDS.len(),
            activity_entries: SEED_ACTIVITY_IDS.len(),
        })
    }

    /// Verify the demo dataset is present, table by table.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        checks.push(("regions", Self::count_by_ids(pool, "regions", SEED_REGION_IDS).await?));
        checks.push(("districts", Self::count_by_ids(pool, "districts", SEED_DISTRICT_IDS).await?));
        checks.push(("branches", Self::count_by_ids(pool, "branches", SEED_BRANCH_IDS).await?));
        checks.push(("managers", Self::count_by_ids(pool, "managers", SEED_MANAGER_IDS).await?));
        checks.push((
            "activity-log",
            Self::count_by_ids(pool, "activity_log", SEED_ACTIVITY_IDS).await?,
        ));

        let assigned: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM branches WHERE id = 'branch-harbor' AND manager_id = 'manager-ada')",
        )
        .fetch_one(pool)
        .await?;
        checks.push(("harbor-assignment", assigned == 1));

        let context: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM managers WHERE id = 'manager-ada' AND branch_context = 'branch-harbor')",
        )
        .fetch_one(pool)
        .await?;
        checks.push(("ada-branch-context", context == 1));

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }

    async fn count_by_ids(
        pool: &DbPool,
        table: &str,
        ids: &[&str],
    ) -> Result<bool, RepositoryError> {
        let quoted =
            ids.iter().map(|id| format!("'{id}'")).collect::<Vec<_>>().join(", ");
        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(1) FROM {table} WHERE id IN ({quoted})"))
                .fetch_one(pool)
                .await?;
        Ok(count == ids.len() as i64)
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub regions: usize,
    pub districts: usize,
    pub branches: usize,
    pub managers: usize,
    pub activity_entries: usize,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

impl VerificationResult {
    pub fn failed_checks(&self) -> Vec<&'static str> {
        self.checks
            .iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect()
    }
}
