use serde::{Deserialize, Serialize};

use crate::domain::branch::BranchId;
use crate::domain::district::DistrictId;
use crate::domain::region::RegionId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManagerId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagerRole {
    RegionalManager,
    DistrictManager,
    Manager,
    AssistantManager,
    Staff,
    Admin,
}

impl ManagerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegionalManager => "regional_manager",
            Self::DistrictManager => "district_manager",
            Self::Manager => "manager",
            Self::AssistantManager => "assistant_manager",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }

    /// Only regional and district managers may hold branch assignments.
    pub fn is_branch_assignable(&self) -> bool {
        matches!(self, Self::RegionalManager | Self::DistrictManager)
    }
}

impl std::str::FromStr for ManagerRole {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "regional_manager" => Ok(Self::RegionalManager),
            "district_manager" => Ok(Self::DistrictManager),
            "manager" => Ok(Self::Manager),
            "assistant_manager" => Ok(Self::AssistantManager),
            "staff" => Ok(Self::Staff),
            "admin" => Ok(Self::Admin),
            other => Err(DomainError::UnknownRole { role: other.to_string() }),
        }
    }
}

impl std::fmt::Display for ManagerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `branch_context` is the manager's cached "primary branch" pointer. It is
/// derived from the assignment set on commit, never edited directly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manager {
    pub id: ManagerId,
    pub name: String,
    pub role: ManagerRole,
    pub region_id: Option<RegionId>,
    pub district_id: Option<DistrictId>,
    pub branch_context: Option<BranchId>,
}
