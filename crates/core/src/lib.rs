pub mod activity;
pub mod assignment;
pub mod config;
pub mod domain;
pub mod errors;

pub use activity::{
    describe, ActivityCategory, ActivityDescription, ActivityDetails, ActivityEvent, ActivityId,
};
pub use assignment::{
    commit_assignment, eligible_branches, AssignmentPlan, BranchChange, BranchScope,
};
pub use domain::branch::{Branch, BranchId};
pub use domain::district::{District, DistrictId};
pub use domain::manager::{Manager, ManagerId, ManagerRole};
pub use domain::region::{Region, RegionId};
pub use domain::snapshot::OrgSnapshot;
pub use errors::{ApplicationError, DomainError, InterfaceError};
