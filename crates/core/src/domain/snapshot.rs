use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::branch::Branch;
use crate::domain::district::District;
use crate::domain::manager::Manager;
use crate::domain::region::Region;
use crate::errors::DomainError;

/// The full in-memory copy of the organizational hierarchy a screen session
/// works against. The assignment resolver only ever reads a snapshot; it is
/// refreshed wholesale after each mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgSnapshot {
    pub regions: Vec<Region>,
    pub districts: Vec<District>,
    pub branches: Vec<Branch>,
    pub managers: Vec<Manager>,
}

impl OrgSnapshot {
    /// Collects every hierarchy invariant the snapshot violates. The
    /// resolver itself never fails on a bad snapshot; callers decide whether
    /// violations block a commit or are only logged.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        let region_ids: HashSet<_> = self.regions.iter().map(|region| &region.id).collect();
        let district_regions: HashMap<_, _> =
            self.districts.iter().map(|district| (&district.id, &district.region_id)).collect();
        let manager_roles: HashMap<_, _> =
            self.managers.iter().map(|manager| (&manager.id, manager.role)).collect();

        for district in &self.districts {
            if !region_ids.contains(&district.region_id) {
                violations.push(format!(
                    "district `{}` references missing region `{}`",
                    district.id.0, district.region_id.0
                ));
            }
        }

        let mut seen_branch_ids = HashSet::new();
        for branch in &self.branches {
            if !seen_branch_ids.insert(&branch.id) {
                violations.push(format!("branch id `{}` appears more than once", branch.id.0));
            }

            if let Some(district_id) = &branch.district_id {
                match district_regions.get(district_id) {
                    Some(region_id) if **region_id != branch.region_id => {
                        violations.push(format!(
                            "branch `{}` is in region `{}` but its district `{}` belongs to region `{}`",
                            branch.id.0, branch.region_id.0, district_id.0, region_id.0
                        ));
                    }
                    None => {
                        violations.push(format!(
                            "branch `{}` references missing district `{}`",
                            branch.id.0, district_id.0
                        ));
                    }
                    _ => {}
                }
            }

            if let Some(manager_id) = &branch.manager_id {
                match manager_roles.get(manager_id) {
                    Some(role) if !role.is_branch_assignable() => {
                        violations.push(format!(
                            "branch `{}` is assigned to `{}` whose role `{role}` cannot hold branches",
                            branch.id.0, manager_id.0
                        ));
                    }
                    None => {
                        violations.push(format!(
                            "branch `{}` is assigned to missing manager `{}`",
                            branch.id.0, manager_id.0
                        ));
                    }
                    _ => {}
                }
            }
        }

        let mut linked_managers = HashSet::new();
        for region in &self.regions {
            if let Some(manager_id) = &region.regional_manager_id {
                if !linked_managers.insert(manager_id) {
                    violations.push(format!(
                        "manager `{}` is linked as regional manager by more than one region",
                        manager_id.0
                    ));
                }
            }
        }

        violations
    }

    pub fn check_invariants(&self) -> Result<(), DomainError> {
        match self.invariant_violations().into_iter().next() {
            Some(violation) => Err(DomainError::InvariantViolation(violation)),
            None => Ok(()),
        }
    }
}
