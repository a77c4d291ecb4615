use serde::{Deserialize, Serialize};

use crate::domain::district::DistrictId;
use crate::domain::manager::ManagerId;
use crate::domain::region::RegionId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchId(pub String);

/// A physical/operational unit. `manager_id` is exclusive: a branch belongs
/// to at most one manager at any time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    pub region_id: RegionId,
    pub district_id: Option<DistrictId>,
    pub manager_id: Option<ManagerId>,
}
