//! In-memory repository backend for tests and offline tooling.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use storegrid_core::activity::ActivityEvent;
use storegrid_core::assignment::AssignmentPlan;
use storegrid_core::domain::branch::{Branch, BranchId};
use storegrid_core::domain::district::{District, DistrictId};
use storegrid_core::domain::manager::{Manager, ManagerId, ManagerRole};
use storegrid_core::domain::region::{Region, RegionId};

use super::{
    ActivityRepository, AssignmentRepository, BranchRepository, DistrictRepository,
    ManagerRepository, RegionRepository, RepositoryError,
};

#[derive(Default)]
struct Inner {
    regions: HashMap<String, Region>,
    districts: HashMap<String, District>,
    branches: HashMap<String, Branch>,
    managers: HashMap<String, Manager>,
    activity: Vec<ActivityEvent>,
}

/// A single store backing every repository trait, so assignment plans can
/// touch branches and managers under one lock.
#[derive(Clone, Default)]
pub struct InMemoryOrgStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryOrgStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_name<T: Clone>(values: impl Iterator<Item = T>, key: impl Fn(&T) -> (String, String)) -> Vec<T> {
    let mut values: Vec<T> = values.collect();
    values.sort_by_key(&key);
    values
}

#[async_trait::async_trait]
impl RegionRepository for InMemoryOrgStore {
    async fn list(&self) -> Result<Vec<Region>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(sorted_by_name(inner.regions.values().cloned(), |r| {
            (r.name.clone(), r.id.0.clone())
        }))
    }

    async fn find_by_id(&self, id: &RegionId) -> Result<Option<Region>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.regions.get(&id.0).cloned())
    }

    async fn save(&self, region: Region) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.regions.insert(region.id.0.clone(), region);
        Ok(())
    }

    async fn delete(&self, id: &RegionId) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        Ok(inner.regions.remove(&id.0).is_some())
    }
}

#[async_trait::async_trait]
impl DistrictRepository for InMemoryOrgStore {
    async fn list(&self) -> Result<Vec<District>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(sorted_by_name(inner.districts.values().cloned(), |d| {
            (d.name.clone(), d.id.0.clone())
        }))
    }

    async fn save(&self, district: District) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.districts.insert(district.id.0.clone(), district);
        Ok(())
    }

    async fn delete(&self, id: &DistrictId) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        Ok(inner.districts.remove(&id.0).is_some())
    }
}

#[async_trait::async_trait]
impl BranchRepository for InMemoryOrgStore {
    async fn list(&self) -> Result<Vec<Branch>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(sorted_by_name(inner.branches.values().cloned(), |b| {
            (b.name.clone(), b.id.0.clone())
        }))
    }

    async fn save(&self, branch: Branch) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.branches.insert(branch.id.0.clone(), branch);
        Ok(())
    }

    async fn delete(&self, id: &BranchId) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        Ok(inner.branches.remove(&id.0).is_some())
    }
}

#[async_trait::async_trait]
impl ManagerRepository for InMemoryOrgStore {
    async fn list_by_roles(&self, roles: &[ManagerRole]) -> Result<Vec<Manager>, RepositoryError> {
        let inner = self.inner.read().await;
        let filtered = inner
            .managers
            .values()
            .filter(|manager| roles.is_empty() || roles.contains(&manager.role))
            .cloned();
        Ok(sorted_by_name(filtered, |m| (m.name.clone(), m.id.0.clone())))
    }

    async fn find_by_id(&self, id: &ManagerId) -> Result<Option<Manager>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.managers.get(&id.0).cloned())
    }

    async fn save(&self, manager: Manager) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.managers.insert(manager.id.0.clone(), manager);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ActivityRepository for InMemoryOrgStore {
    async fn list_recent(&self, limit: u32) -> Result<Vec<ActivityEvent>, RepositoryError> {
        let inner = self.inner.read().await;
        let mut events = inner.activity.clone();
        events.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at).then(b.id.0.cmp(&a.id.0)));
        events.truncate(limit as usize);
        Ok(events)
    }

    async fn append(&self, event: ActivityEvent) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.activity.push(event);
        Ok(())
    }
}

#[async_trait::async_trait]
impl AssignmentRepository for InMemoryOrgStore {
    async fn apply(
        &self,
        manager_id: &ManagerId,
        plan: &AssignmentPlan,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;

        for change in &plan.changes {
            if let Some(branch) = inner.branches.get_mut(&change.branch_id.0) {
                branch.manager_id = change.manager_id.clone();
            }
        }
        if let Some(manager) = inner.managers.get_mut(&manager_id.0) {
            manager.branch_context = plan.branch_context.clone();
        }

        Ok(())
    }
}
