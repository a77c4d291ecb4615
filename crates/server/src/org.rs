//! Org hierarchy JSON API.
//!
//! Endpoints under `/api/v1`:
//! - regions / districts / branches CRUD,
//! - `GET /managers?roles=a,b` role-filtered manager listing,
//! - `GET /managers/{id}/eligible-branches` assignment scope resolution,
//! - `PUT /managers/{id}/branches` assignment commit,
//! - `GET /activity?limit=n` recent activity with display descriptions.
//!
//! Fetch and commit failures surface as 503 with a retry-safe message; the
//! client re-fetches the snapshot to reconcile. There is no queuing or
//! dedup of concurrent commits: last writer wins.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use storegrid_core::activity::{describe, ActivityDetails, ActivityEvent};
use storegrid_core::assignment::{commit_assignment, eligible_branches, AssignmentPlan};
use storegrid_core::domain::branch::{Branch, BranchId};
use storegrid_core::domain::district::{District, DistrictId};
use storegrid_core::domain::manager::{Manager, ManagerId, ManagerRole};
use storegrid_core::domain::region::{Region, RegionId};
use storegrid_core::domain::snapshot::OrgSnapshot;
use storegrid_core::errors::{ApplicationError, DomainError};
use storegrid_db::repositories::{
    ActivityRepository, AssignmentRepository, BranchRepository, DistrictRepository,
    ManagerRepository, RegionRepository, RepositoryError, SqlActivityRepository,
    SqlAssignmentRepository, SqlBranchRepository, SqlDistrictRepository, SqlManagerRepository,
    SqlRegionRepository,
};
use storegrid_db::DbPool;

#[derive(Clone)]
pub struct OrgState {
    db_pool: DbPool,
}

#[derive(Debug, Serialize)]
pub struct OrgApiError {
    pub error: String,
    pub correlation_id: String,
}

type ApiError = (StatusCode, Json<OrgApiError>);
type ApiResult<T> = Result<T, ApiError>;

pub fn router(db_pool: DbPool) -> Router {
    Router::new()
        .route("/api/v1/regions", get(list_regions).post(create_region))
        .route("/api/v1/regions/{id}", put(update_region).delete(delete_region))
        .route("/api/v1/districts", get(list_districts).post(create_district))
        .route("/api/v1/districts/{id}", put(update_district).delete(delete_district))
        .route("/api/v1/branches", get(list_branches).post(create_branch))
        .route("/api/v1/branches/{id}", put(update_branch).delete(delete_branch))
        .route("/api/v1/managers", get(list_managers))
        .route("/api/v1/managers/{id}/eligible-branches", get(manager_eligible_branches))
        .route("/api/v1/managers/{id}/branches", put(assign_manager_branches))
        .route("/api/v1/activity", get(list_activity))
        .with_state(OrgState { db_pool })
}

// ---------------------------------------------------------------------------
// Error helpers
// ---------------------------------------------------------------------------

fn repository_failure(operation: &'static str, failure: RepositoryError) -> ApiError {
    let correlation_id = Uuid::new_v4().to_string();
    error!(
        event_name = "org.api.repository_failure",
        correlation_id = %correlation_id,
        operation,
        error = %failure,
        "repository call failed"
    );

    let interface =
        ApplicationError::Persistence(failure.to_string()).into_interface(correlation_id.clone());
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(OrgApiError { error: interface.user_message().to_string(), correlation_id }),
    )
}

fn bad_request(message: String) -> ApiError {
    let correlation_id = Uuid::new_v4().to_string();
    warn!(
        event_name = "org.api.bad_request",
        correlation_id = %correlation_id,
        reason = %message,
        "rejected request"
    );
    (StatusCode::BAD_REQUEST, Json(OrgApiError { error: message, correlation_id }))
}

fn not_found(what: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(OrgApiError {
            error: format!("{what} `{id}` was not found"),
            correlation_id: Uuid::new_v4().to_string(),
        }),
    )
}

// ---------------------------------------------------------------------------
// Snapshot access
// ---------------------------------------------------------------------------

async fn load_snapshot(pool: &DbPool) -> Result<OrgSnapshot, RepositoryError> {
    Ok(OrgSnapshot {
        regions: SqlRegionRepository::new(pool.clone()).list().await?,
        districts: SqlDistrictRepository::new(pool.clone()).list().await?,
        branches: SqlBranchRepository::new(pool.clone()).list().await?,
        managers: SqlManagerRepository::new(pool.clone()).list_by_roles(&[]).await?,
    })
}

/// Invariant violations in stored data are reported, never fatal; the
/// hierarchy stays serveable while operators reconcile.
fn warn_on_invariant_violations(snapshot: &OrgSnapshot) {
    for violation in snapshot.invariant_violations() {
        warn!(
            event_name = "org.snapshot.invariant_violation",
            correlation_id = "snapshot",
            violation = %violation,
            "stored hierarchy violates an invariant"
        );
    }
}

// ---------------------------------------------------------------------------
// Region handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateRegionRequest {
    pub id: Option<String>,
    pub name: String,
    pub regional_manager_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRegionRequest {
    pub name: String,
    pub regional_manager_id: Option<String>,
}

async fn list_regions(State(state): State<OrgState>) -> ApiResult<Json<Vec<Region>>> {
    SqlRegionRepository::new(state.db_pool.clone())
        .list()
        .await
        .map(Json)
        .map_err(|failure| repository_failure("regions.list", failure))
}

async fn create_region(
    State(state): State<OrgState>,
    Json(request): Json<CreateRegionRequest>,
) -> ApiResult<(StatusCode, Json<Region>)> {
    if request.name.trim().is_empty() {
        return Err(bad_request("region name must not be empty".to_string()));
    }

    let region = Region {
        id: RegionId(request.id.unwrap_or_else(|| Uuid::new_v4().to_string())),
        name: request.name,
        regional_manager_id: request.regional_manager_id.map(ManagerId),
    };
    SqlRegionRepository::new(state.db_pool.clone())
        .save(region.clone())
        .await
        .map_err(|failure| repository_failure("regions.save", failure))?;

    Ok((StatusCode::CREATED, Json(region)))
}

async fn update_region(
    Path(id): Path<String>,
    State(state): State<OrgState>,
    Json(request): Json<UpdateRegionRequest>,
) -> ApiResult<Json<Region>> {
    if request.name.trim().is_empty() {
        return Err(bad_request("region name must not be empty".to_string()));
    }

    let region = Region {
        id: RegionId(id),
        name: request.name,
        regional_manager_id: request.regional_manager_id.map(ManagerId),
    };
    SqlRegionRepository::new(state.db_pool.clone())
        .save(region.clone())
        .await
        .map_err(|failure| repository_failure("regions.save", failure))?;

    Ok(Json(region))
}

async fn delete_region(
    Path(id): Path<String>,
    State(state): State<OrgState>,
) -> ApiResult<StatusCode> {
    let deleted = SqlRegionRepository::new(state.db_pool.clone())
        .delete(&RegionId(id.clone()))
        .await
        .map_err(|failure| repository_failure("regions.delete", failure))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("region", &id))
    }
}

// ---------------------------------------------------------------------------
// District handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateDistrictRequest {
    pub id: Option<String>,
    pub name: String,
    pub region_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDistrictRequest {
    pub name: String,
    pub region_id: String,
}

async fn list_districts(State(state): State<OrgState>) -> ApiResult<Json<Vec<District>>> {
    SqlDistrictRepository::new(state.db_pool.clone())
        .list()
        .await
        .map(Json)
        .map_err(|failure| repository_failure("districts.list", failure))
}

async fn create_district(
    State(state): State<OrgState>,
    Json(request): Json<CreateDistrictRequest>,
) -> ApiResult<(StatusCode, Json<District>)> {
    if request.name.trim().is_empty() {
        return Err(bad_request("district name must not be empty".to_string()));
    }

    let district = District {
        id: DistrictId(request.id.unwrap_or_else(|| Uuid::new_v4().to_string())),
        name: request.name,
        region_id: RegionId(request.region_id),
    };
    SqlDistrictRepository::new(state.db_pool.clone())
        .save(district.clone())
        .await
        .map_err(|failure| repository_failure("districts.save", failure))?;

    Ok((StatusCode::CREATED, Json(district)))
}

async fn update_district(
    Path(id): Path<String>,
    State(state): State<OrgState>,
    Json(request): Json<UpdateDistrictRequest>,
) -> ApiResult<Json<District>> {
    if request.name.trim().is_empty() {
        return Err(bad_request("district name must not be empty".to_string()));
    }

    let district = District {
        id: DistrictId(id),
        name: request.name,
        region_id: RegionId(request.region_id),
    };
    SqlDistrictRepository::new(state.db_pool.clone())
        .save(district.clone())
        .await
        .map_err(|failure| repository_failure("districts.save", failure))?;

    Ok(Json(district))
}

async fn delete_district(
    Path(id): Path<String>,
    State(state): State<OrgState>,
) -> ApiResult<StatusCode> {
    let deleted = SqlDistrictRepository::new(state.db_pool.clone())
        .delete(&DistrictId(id.clone()))
        .await
        .map_err(|failure| repository_failure("districts.delete", failure))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("district", &id))
    }
}

// ---------------------------------------------------------------------------
// Branch handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateBranchRequest {
    pub id: Option<String>,
    pub name: String,
    pub region_id: String,
    pub district_id: Option<String>,
    pub manager_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBranchRequest {
    pub name: String,
    pub region_id: String,
    pub district_id: Option<String>,
    pub manager_id: Option<String>,
}

async fn list_branches(State(state): State<OrgState>) -> ApiResult<Json<Vec<Branch>>> {
    SqlBranchRepository::new(state.db_pool.clone())
        .list()
        .await
        .map(Json)
        .map_err(|failure| repository_failure("branches.list", failure))
}

async fn create_branch(
    State(state): State<OrgState>,
    Json(request): Json<CreateBranchRequest>,
) -> ApiResult<(StatusCode, Json<Branch>)> {
    if request.name.trim().is_empty() {
        return Err(bad_request("branch name must not be empty".to_string()));
    }

    let branch = Branch {
        id: BranchId(request.id.unwrap_or_else(|| Uuid::new_v4().to_string())),
        name: request.name,
        region_id: RegionId(request.region_id),
        district_id: request.district_id.map(DistrictId),
        manager_id: request.manager_id.map(ManagerId),
    };
    SqlBranchRepository::new(state.db_pool.clone())
        .save(branch.clone())
        .await
        .map_err(|failure| repository_failure("branches.save", failure))?;

    Ok((StatusCode::CREATED, Json(branch)))
}

async fn update_branch(
    Path(id): Path<String>,
    State(state): State<OrgState>,
    Json(request): Json<UpdateBranchRequest>,
) -> ApiResult<Json<Branch>> {
    if request.name.trim().is_empty() {
        return Err(bad_request("branch name must not be empty".to_string()));
    }

    let branch = Branch {
        id: BranchId(id),
        name: request.name,
        region_id: RegionId(request.region_id),
        district_id: request.district_id.map(DistrictId),
        manager_id: request.manager_id.map(ManagerId),
    };
    SqlBranchRepository::new(state.db_pool.clone())
        .save(branch.clone())
        .await
        .map_err(|failure| repository_failure("branches.save", failure))?;

    Ok(Json(branch))
}

async fn delete_branch(
    Path(id): Path<String>,
    State(state): State<OrgState>,
) -> ApiResult<StatusCode> {
    let deleted = SqlBranchRepository::new(state.db_pool.clone())
        .delete(&BranchId(id.clone()))
        .await
        .map_err(|failure| repository_failure("branches.delete", failure))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("branch", &id))
    }
}

// ---------------------------------------------------------------------------
// Manager handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ManagerQuery {
    pub roles: Option<String>,
}

/// Without an explicit filter only the branch-assignable roles are listed,
/// which is what assignment UIs ask for.
fn parse_role_filter(raw: Option<&str>) -> Result<Vec<ManagerRole>, DomainError> {
    match raw {
        None => Ok(vec![ManagerRole::RegionalManager, ManagerRole::DistrictManager]),
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::parse)
            .collect(),
    }
}

async fn list_managers(
    Query(query): Query<ManagerQuery>,
    State(state): State<OrgState>,
) -> ApiResult<Json<Vec<Manager>>> {
    let roles = parse_role_filter(query.roles.as_deref())
        .map_err(|failure| bad_request(failure.to_string()))?;

    SqlManagerRepository::new(state.db_pool.clone())
        .list_by_roles(&roles)
        .await
        .map(Json)
        .map_err(|failure| repository_failure("managers.list", failure))
}

async fn manager_eligible_branches(
    Path(id): Path<String>,
    State(state): State<OrgState>,
) -> ApiResult<Json<Vec<Branch>>> {
    let manager_id = ManagerId(id.clone());
    let manager = SqlManagerRepository::new(state.db_pool.clone())
        .find_by_id(&manager_id)
        .await
        .map_err(|failure| repository_failure("managers.find", failure))?
        .ok_or_else(|| not_found("manager", &id))?;

    let snapshot = load_snapshot(&state.db_pool)
        .await
        .map_err(|failure| repository_failure("snapshot.load", failure))?;
    warn_on_invariant_violations(&snapshot);

    Ok(Json(eligible_branches(&manager, &snapshot)))
}

#[derive(Debug, Deserialize)]
pub struct AssignBranchesRequest {
    pub branch_ids: Vec<String>,
    pub actor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssignBranchesResponse {
    pub manager_id: String,
    pub plan: AssignmentPlan,
}

async fn assign_manager_branches(
    Path(id): Path<String>,
    State(state): State<OrgState>,
    Json(request): Json<AssignBranchesRequest>,
) -> ApiResult<Json<AssignBranchesResponse>> {
    let manager_id = ManagerId(id.clone());
    let manager = SqlManagerRepository::new(state.db_pool.clone())
        .find_by_id(&manager_id)
        .await
        .map_err(|failure| repository_failure("managers.find", failure))?
        .ok_or_else(|| not_found("manager", &id))?;

    if !manager.role.is_branch_assignable() {
        let failure = DomainError::RoleNotAssignable { role: manager.role.to_string() };
        return Err(bad_request(failure.to_string()));
    }

    let branches = SqlBranchRepository::new(state.db_pool.clone())
        .list()
        .await
        .map_err(|failure| repository_failure("branches.list", failure))?;

    let selected: Vec<BranchId> = request.branch_ids.into_iter().map(BranchId).collect();
    for branch_id in &selected {
        if !branches.iter().any(|branch| branch.id == *branch_id) {
            return Err(bad_request(format!("unknown branch id `{}`", branch_id.0)));
        }
    }

    let plan = commit_assignment(&manager, &selected, &branches);
    SqlAssignmentRepository::new(state.db_pool.clone())
        .apply(&manager.id, &plan)
        .await
        .map_err(|failure| repository_failure("assignment.apply", failure))?;

    let correlation_id = Uuid::new_v4().to_string();
    info!(
        event_name = "org.assignment.committed",
        correlation_id = %correlation_id,
        manager_id = %manager.id.0,
        changes = plan.changes.len(),
        branch_context = plan.branch_context.as_ref().map(|b| b.0.as_str()).unwrap_or("none"),
        "branch assignment committed"
    );

    record_assignment_activity(&state.db_pool, &manager, &plan, &branches, request.actor).await;

    Ok(Json(AssignBranchesResponse { manager_id: manager.id.0.clone(), plan }))
}

/// The assignment itself already committed; a failed activity write is
/// logged and the request still succeeds.
async fn record_assignment_activity(
    pool: &DbPool,
    manager: &Manager,
    plan: &AssignmentPlan,
    branches: &[Branch],
    actor: Option<String>,
) {
    let mut fields = Map::new();
    fields.insert("manager_name".to_string(), Value::String(manager.name.clone()));
    if let Some(primary) = &plan.branch_context {
        if let Some(branch) = branches.iter().find(|branch| branch.id == *primary) {
            fields.insert("branch_name".to_string(), Value::String(branch.name.clone()));
        }
    }

    let event = ActivityEvent::new(
        "manager_assigned",
        actor.unwrap_or_else(|| "system".to_string()),
        ActivityDetails::Structured(fields),
    );

    if let Err(failure) = SqlActivityRepository::new(pool.clone()).append(event).await {
        warn!(
            event_name = "org.activity.append_failed",
            correlation_id = "assignment",
            error = %failure,
            "activity entry for assignment commit was not recorded"
        );
    }
}

// ---------------------------------------------------------------------------
// Activity handlers
// ---------------------------------------------------------------------------

const DEFAULT_ACTIVITY_LIMIT: u32 = 50;
const MAX_ACTIVITY_LIMIT: u32 = 200;

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ActivityEntry {
    pub id: String,
    pub action: String,
    pub user_name: String,
    pub occurred_at: String,
    pub label: String,
    pub description: String,
    pub category: &'static str,
}

async fn list_activity(
    Query(query): Query<ActivityQuery>,
    State(state): State<OrgState>,
) -> ApiResult<Json<Vec<ActivityEntry>>> {
    let limit = query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT).clamp(1, MAX_ACTIVITY_LIMIT);

    let events = SqlActivityRepository::new(state.db_pool.clone())
        .list_recent(limit)
        .await
        .map_err(|failure| repository_failure("activity.list", failure))?;

    let entries = events
        .iter()
        .map(|event| {
            let described = describe(event);
            ActivityEntry {
                id: event.id.0.clone(),
                action: event.action.clone(),
                user_name: event.user_name.clone(),
                occurred_at: event.occurred_at.to_rfc3339(),
                label: described.label,
                description: described.description,
                category: described.category.as_str(),
            }
        })
        .collect();

    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use axum::extract::{Path, Query, State};
    use axum::http::StatusCode;
    use axum::Json;

    use storegrid_core::domain::branch::{Branch, BranchId};
    use storegrid_core::domain::district::{District, DistrictId};
    use storegrid_core::domain::manager::{Manager, ManagerId, ManagerRole};
    use storegrid_core::domain::region::{Region, RegionId};
    use storegrid_db::repositories::{
        BranchRepository, DistrictRepository, ManagerRepository, RegionRepository,
        SqlBranchRepository, SqlDistrictRepository, SqlManagerRepository, SqlRegionRepository,
    };
    use storegrid_db::{connect_with_settings, migrations, DbPool};

    use super::{
        assign_manager_branches, create_region, delete_region, list_activity, list_managers,
        manager_eligible_branches, ActivityQuery, AssignBranchesRequest, CreateRegionRequest,
        ManagerQuery, OrgState,
    };

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("pool");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn state(pool: DbPool) -> State<OrgState> {
        State(OrgState { db_pool: pool })
    }

    async fn seed_hierarchy(pool: &DbPool) {
        SqlRegionRepository::new(pool.clone())
            .save(Region {
                id: RegionId("r1".into()),
                name: "North".into(),
                regional_manager_id: Some(ManagerId("m-regional".into())),
            })
            .await
            .expect("save region");

        SqlDistrictRepository::new(pool.clone())
            .save(District {
                id: DistrictId("d1".into()),
                name: "Coastal".into(),
                region_id: RegionId("r1".into()),
            })
            .await
            .expect("save district");

        let branches = SqlBranchRepository::new(pool.clone());
        for (id, name, district) in
            [("b1", "Harbor", Some("d1")), ("b2", "Ridge", None), ("b3", "Mill", Some("d1"))]
        {
            branches
                .save(Branch {
                    id: BranchId(id.into()),
                    name: name.into(),
                    region_id: RegionId("r1".into()),
                    district_id: district.map(|d| DistrictId(d.into())),
                    manager_id: None,
                })
                .await
                .expect("save branch");
        }

        let managers = SqlManagerRepository::new(pool.clone());
        managers
            .save(Manager {
                id: ManagerId("m-regional".into()),
                name: "Ada".into(),
                role: ManagerRole::RegionalManager,
                region_id: None,
                district_id: None,
                branch_context: None,
            })
            .await
            .expect("save manager");
        managers
            .save(Manager {
                id: ManagerId("m-staff".into()),
                name: "Joan".into(),
                role: ManagerRole::Staff,
                region_id: None,
                district_id: None,
                branch_context: None,
            })
            .await
            .expect("save manager");
    }

    #[tokio::test]
    async fn eligible_branches_resolve_from_region_link() {
        let pool = setup().await;
        seed_hierarchy(&pool).await;

        let Json(branches) =
            manager_eligible_branches(Path("m-regional".to_string()), state(pool.clone()))
                .await
                .expect("should succeed");

        let ids: Vec<&str> = branches.iter().map(|b| b.id.0.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b3", "b2"], "snapshot order is name-sorted");
    }

    #[tokio::test]
    async fn eligible_branches_for_unknown_manager_is_not_found() {
        let pool = setup().await;

        let result =
            manager_eligible_branches(Path("missing".to_string()), state(pool.clone())).await;

        let (status, _) = result.expect_err("should fail");
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn assignment_commit_updates_branches_context_and_activity() {
        let pool = setup().await;
        seed_hierarchy(&pool).await;

        let Json(response) = assign_manager_branches(
            Path("m-regional".to_string()),
            state(pool.clone()),
            Json(AssignBranchesRequest {
                branch_ids: vec!["b2".to_string(), "b1".to_string()],
                actor: Some("Admin".to_string()),
            }),
        )
        .await
        .expect("should succeed");

        assert_eq!(response.plan.branch_context, Some(BranchId("b2".into())));

        let owner: Option<String> =
            sqlx::query_scalar("SELECT manager_id FROM branches WHERE id = 'b1'")
                .fetch_one(&pool)
                .await
                .expect("fetch owner");
        assert_eq!(owner.as_deref(), Some("m-regional"));

        let context: Option<String> =
            sqlx::query_scalar("SELECT branch_context FROM managers WHERE id = 'm-regional'")
                .fetch_one(&pool)
                .await
                .expect("fetch context");
        assert_eq!(context.as_deref(), Some("b2"));

        let Json(entries) = list_activity(Query(ActivityQuery::default()), state(pool.clone()))
            .await
            .expect("should succeed");
        assert_eq!(entries[0].action, "manager_assigned");
        assert_eq!(entries[0].label, "Manager assigned");
        assert!(entries[0].description.contains("Ada"));
        assert!(entries[0].description.contains("Ridge"));
    }

    #[tokio::test]
    async fn assignment_commit_rejects_non_assignable_role() {
        let pool = setup().await;
        seed_hierarchy(&pool).await;

        let result = assign_manager_branches(
            Path("m-staff".to_string()),
            state(pool.clone()),
            Json(AssignBranchesRequest { branch_ids: vec!["b1".to_string()], actor: None }),
        )
        .await;

        let (status, Json(payload)) = result.expect_err("should fail");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(payload.error.contains("staff"));
    }

    #[tokio::test]
    async fn assignment_commit_rejects_unknown_branch_id() {
        let pool = setup().await;
        seed_hierarchy(&pool).await;

        let result = assign_manager_branches(
            Path("m-regional".to_string()),
            state(pool.clone()),
            Json(AssignBranchesRequest { branch_ids: vec!["nope".to_string()], actor: None }),
        )
        .await;

        let (status, _) = result.expect_err("should fail");
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_selection_unassigns_previous_branches() {
        let pool = setup().await;
        seed_hierarchy(&pool).await;

        let Json(first) = assign_manager_branches(
            Path("m-regional".to_string()),
            state(pool.clone()),
            Json(AssignBranchesRequest { branch_ids: vec!["b1".to_string()], actor: None }),
        )
        .await
        .expect("first commit");
        assert_eq!(first.plan.branch_context, Some(BranchId("b1".into())));

        let Json(response) = assign_manager_branches(
            Path("m-regional".to_string()),
            state(pool.clone()),
            Json(AssignBranchesRequest { branch_ids: Vec::new(), actor: None }),
        )
        .await
        .expect("second commit");

        assert_eq!(response.plan.branch_context, None);
        let owner: Option<String> =
            sqlx::query_scalar("SELECT manager_id FROM branches WHERE id = 'b1'")
                .fetch_one(&pool)
                .await
                .expect("fetch owner");
        assert_eq!(owner, None);
    }

    #[tokio::test]
    async fn manager_listing_defaults_to_assignable_roles() {
        let pool = setup().await;
        seed_hierarchy(&pool).await;

        let Json(managers) = list_managers(Query(ManagerQuery::default()), state(pool.clone()))
            .await
            .expect("should succeed");
        assert_eq!(managers.len(), 1);
        assert_eq!(managers[0].id, ManagerId("m-regional".into()));

        let Json(all) = list_managers(
            Query(ManagerQuery { roles: Some("regional_manager, staff".to_string()) }),
            state(pool.clone()),
        )
        .await
        .expect("should succeed");
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn manager_listing_rejects_unknown_role() {
        let pool = setup().await;

        let result = list_managers(
            Query(ManagerQuery { roles: Some("superuser".to_string()) }),
            state(pool.clone()),
        )
        .await;

        let (status, Json(payload)) = result.expect_err("should fail");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(payload.error.contains("superuser"));
    }

    #[tokio::test]
    async fn region_create_and_delete_round_trip() {
        let pool = setup().await;

        let (status, Json(region)) = create_region(
            state(pool.clone()),
            Json(CreateRegionRequest {
                id: None,
                name: "West".to_string(),
                regional_manager_id: None,
            }),
        )
        .await
        .expect("should succeed");
        assert_eq!(status, StatusCode::CREATED);
        assert!(!region.id.0.is_empty());

        let deleted = delete_region(Path(region.id.0.clone()), state(pool.clone()))
            .await
            .expect("should succeed");
        assert_eq!(deleted, StatusCode::NO_CONTENT);

        let result = delete_region(Path(region.id.0), state(pool.clone())).await;
        let (status, _) = result.expect_err("second delete should fail");
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn blank_region_name_is_rejected() {
        let pool = setup().await;

        let result = create_region(
            state(pool.clone()),
            Json(CreateRegionRequest {
                id: None,
                name: "   ".to_string(),
                regional_manager_id: None,
            }),
        )
        .await;

        let (status, _) = result.expect_err("should fail");
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
