use serde::{Deserialize, Serialize};

use crate::domain::manager::ManagerId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionId(pub String);

/// Top-level organizational grouping. Holds at most one regional manager;
/// the link is mirrored on the manager side but not enforced by the schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub regional_manager_id: Option<ManagerId>,
}
