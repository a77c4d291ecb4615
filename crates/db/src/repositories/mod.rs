use async_trait::async_trait;
use thiserror::Error;

use storegrid_core::activity::ActivityEvent;
use storegrid_core::assignment::AssignmentPlan;
use storegrid_core::domain::branch::{Branch, BranchId};
use storegrid_core::domain::district::{District, DistrictId};
use storegrid_core::domain::manager::{Manager, ManagerId, ManagerRole};
use storegrid_core::domain::region::{Region, RegionId};

pub mod activity;
pub mod assignment;
pub mod branch;
pub mod district;
pub mod manager;
pub mod memory;
pub mod region;

pub use activity::SqlActivityRepository;
pub use assignment::SqlAssignmentRepository;
pub use branch::SqlBranchRepository;
pub use district::SqlDistrictRepository;
pub use manager::SqlManagerRepository;
pub use memory::InMemoryOrgStore;
pub use region::SqlRegionRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait RegionRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Region>, RepositoryError>;
    async fn find_by_id(&self, id: &RegionId) -> Result<Option<Region>, RepositoryError>;
    async fn save(&self, region: Region) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &RegionId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait DistrictRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<District>, RepositoryError>;
    async fn save(&self, district: District) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &DistrictId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait BranchRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Branch>, RepositoryError>;
    async fn save(&self, branch: Branch) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &BranchId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait ManagerRepository: Send + Sync {
    async fn list_by_roles(&self, roles: &[ManagerRole]) -> Result<Vec<Manager>, RepositoryError>;
    async fn find_by_id(&self, id: &ManagerId) -> Result<Option<Manager>, RepositoryError>;
    async fn save(&self, manager: Manager) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn list_recent(&self, limit: u32) -> Result<Vec<ActivityEvent>, RepositoryError>;
    async fn append(&self, event: ActivityEvent) -> Result<(), RepositoryError>;
}

/// Applies a planned assignment commit. Implementations must apply the whole
/// plan atomically: branch rows and the manager's `branch_context` change
/// together or not at all. After a failure the caller re-reads the snapshot
/// and reconciles; there is no automatic rollback beyond the transaction.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    async fn apply(
        &self,
        manager_id: &ManagerId,
        plan: &AssignmentPlan,
    ) -> Result<(), RepositoryError>;
}
