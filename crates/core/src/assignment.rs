//! Branch-assignment consistency model.
//!
//! `eligible_branches` answers "which branches may this manager be assigned
//! to" from a full hierarchy snapshot; `commit_assignment` turns a target
//! branch set into the exact mutations persistence must apply as one
//! transaction. Both are pure: no I/O, deterministic for a given snapshot.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::branch::{Branch, BranchId};
use crate::domain::district::DistrictId;
use crate::domain::manager::{Manager, ManagerId, ManagerRole};
use crate::domain::region::RegionId;
use crate::domain::snapshot::OrgSnapshot;

/// The branch filter produced by one resolution strategy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchScope {
    Region(RegionId),
    District(DistrictId),
}

impl BranchScope {
    fn contains(&self, branch: &Branch) -> bool {
        match self {
            Self::Region(region_id) => branch.region_id == *region_id,
            Self::District(district_id) => branch.district_id.as_ref() == Some(district_id),
        }
    }
}

type ScopeStrategy = fn(&Manager, &OrgSnapshot) -> Option<BranchScope>;

/// Resolution order: explicit region link first, the manager's own region
/// field second, the manager's district last. The first strategy that
/// resolves wins.
const SCOPE_STRATEGIES: &[ScopeStrategy] =
    &[region_link_scope, region_field_scope, district_scope];

/// A region that names this manager as its regional manager takes precedence
/// over whatever `manager.region_id` says.
fn region_link_scope(manager: &Manager, snapshot: &OrgSnapshot) -> Option<BranchScope> {
    if manager.role != ManagerRole::RegionalManager {
        return None;
    }

    snapshot
        .regions
        .iter()
        .find(|region| region.regional_manager_id.as_ref() == Some(&manager.id))
        .map(|region| BranchScope::Region(region.id.clone()))
}

fn region_field_scope(manager: &Manager, _snapshot: &OrgSnapshot) -> Option<BranchScope> {
    if manager.role != ManagerRole::RegionalManager {
        return None;
    }

    manager.region_id.clone().map(BranchScope::Region)
}

fn district_scope(manager: &Manager, _snapshot: &OrgSnapshot) -> Option<BranchScope> {
    if manager.role != ManagerRole::DistrictManager {
        return None;
    }

    manager.district_id.clone().map(BranchScope::District)
}

/// Resolves the manager's assignment scope, if any.
pub fn resolve_scope(manager: &Manager, snapshot: &OrgSnapshot) -> Option<BranchScope> {
    if !manager.role.is_branch_assignable() {
        return None;
    }

    SCOPE_STRATEGIES.iter().find_map(|strategy| strategy(manager, snapshot))
}

/// Branches the manager may be assigned to, in snapshot order. Empty when no
/// strategy resolves a scope or the role is not assignable through this flow.
pub fn eligible_branches(manager: &Manager, snapshot: &OrgSnapshot) -> Vec<Branch> {
    let Some(scope) = resolve_scope(manager, snapshot) else {
        return Vec::new();
    };

    snapshot.branches.iter().filter(|branch| scope.contains(branch)).cloned().collect()
}

/// One branch-level mutation: `manager_id = None` clears the assignment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchChange {
    pub branch_id: BranchId,
    pub manager_id: Option<ManagerId>,
}

/// The mutations persistence must apply atomically, plus the manager's
/// derived primary-branch pointer. Partial application breaks the exclusive
/// assignment invariant; callers re-fetch and reconcile after a failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPlan {
    pub changes: Vec<BranchChange>,
    pub branch_context: Option<BranchId>,
}

/// Plans the commit of `selected` as the manager's complete assignment set.
/// An empty set unassigns everything. A selected branch currently owned by a
/// different manager is silently reassigned (last-writer-wins).
pub fn commit_assignment(
    manager: &Manager,
    selected: &[BranchId],
    branches: &[Branch],
) -> AssignmentPlan {
    // Duplicates collapse to their first occurrence; order is the caller's.
    let mut seen = HashSet::new();
    let ordered: Vec<&BranchId> = selected.iter().filter(|id| seen.insert(*id)).collect();

    let mut changes = Vec::new();
    for branch in branches {
        if branch.manager_id.as_ref() == Some(&manager.id) && !seen.contains(&branch.id) {
            changes.push(BranchChange { branch_id: branch.id.clone(), manager_id: None });
        }
    }
    for branch_id in &ordered {
        changes.push(BranchChange {
            branch_id: (*branch_id).clone(),
            manager_id: Some(manager.id.clone()),
        });
    }

    AssignmentPlan { changes, branch_context: ordered.first().map(|id| (*id).clone()) }
}
