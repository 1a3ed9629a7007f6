use crate::access::approval::{
    Stage, authorize_director_decision, authorize_manager_decision, initial_director_state,
    pending_for,
};
use crate::access::chain::resolve;
use crate::access::scope::{can_view, scope_ids};
use crate::access::Directory;
use crate::api::{SqlFilter, page_bounds, require_person, snapshot};
use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::leave_request::{ApprovalState, Decision, LeaveRequest};
use crate::utils::directory_cache::DirectoryCache;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use std::collections::BTreeSet;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

const LEAVE_COLUMNS: &str = "id, person_id, start_date, end_date, reason, manager_approval, director_approval, created_at";

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family event")]
    pub reason: String,
}

impl CreateLeave {
    fn validate(&self) -> Result<(), ApiError> {
        if self.start_date > self.end_date {
            return Err(ApiError::BadRequest(
                "start_date cannot be after end_date".to_string(),
            ));
        }
        if self.reason.trim().is_empty() {
            return Err(ApiError::BadRequest("reason must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Deserialize, ToSchema)]
pub struct DecideLeave {
    #[schema(example = "approved")]
    pub decision: Decision,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveResponse {
    #[schema(example = "3f2b8c1e-0d4a-4e5f-9a6b-7c8d9e0f1a2b")]
    /// leave application id
    pub id: String,
    /// person the leave is requested for
    #[schema(example = "5b0c7a52-8d1e-4c1b-9a57-1f0e6f3c2a10")]
    pub person_id: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family event")]
    pub reason: String,
    pub manager_approval: ApprovalState,
    pub director_approval: ApprovalState,
    /// rejected if either stage rejected, approved once both approved
    pub status: ApprovalState,
    /// stage the caller may decide, if any
    #[schema(nullable = true, example = "manager", value_type = Option<String>)]
    pub actionable_stage: Option<Stage>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = Option<String>)]
    pub created_at: Option<DateTime<Utc>>,
}

impl LeaveResponse {
    fn new(request: &LeaveRequest, actionable_stage: Option<Stage>) -> Self {
        Self {
            id: request.id.clone(),
            person_id: request.person_id.clone(),
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason.clone(),
            manager_approval: request.manager_state(),
            director_approval: request.director_state(),
            status: request.overall_status(),
            actionable_stage,
            created_at: request.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by requester
    pub person_id: Option<String>,
    #[schema(example = "pending")]
    /// Filter by manager stage state
    pub manager_approval: Option<ApprovalState>,
    #[schema(example = "pending")]
    /// Filter by director stage state
    pub director_approval: Option<ApprovalState>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u32>,
}

fn in_chain_of(viewer_id: &str, requester_id: &str, directory: &Directory) -> bool {
    resolve(requester_id, directory)
        .iter()
        .any(|id| id == viewer_id)
}

/// A leave request is visible to people who can see the requester and to
/// anyone in the requester's approval chain.
fn may_see(viewer_id: &str, request: &LeaveRequest, directory: &Directory) -> bool {
    can_view(viewer_id, &request.person_id, directory)
        || in_chain_of(viewer_id, &request.person_id, directory)
}

/// Requesters whose leave `viewer_id` may list; same rule as [`may_see`].
fn visible_requesters(viewer_id: &str, directory: &Directory) -> BTreeSet<String> {
    let mut ids = scope_ids(viewer_id, directory);
    ids.extend(
        directory
            .iter()
            .filter(|p| in_chain_of(viewer_id, &p.id, directory))
            .map(|p| p.id.clone()),
    );
    ids
}

fn actionable_stage(viewer_id: &str, request: &LeaveRequest, directory: &Directory) -> Option<Stage> {
    pending_for(viewer_id, std::slice::from_ref(request), directory)
        .first()
        .map(|(stage, _)| *stage)
}

async fn fetch_leave(pool: &MySqlPool, leave_id: &str) -> Result<LeaveRequest, ApiError> {
    sqlx::query_as::<_, LeaveRequest>(&format!(
        "SELECT {} FROM leave_requests WHERE id = ?",
        LEAVE_COLUMNS
    ))
    .bind(leave_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::NotFound("Leave request not found".to_string()))
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = Object,
         example = json!({
            "message": "Leave request submitted",
            "id": "3f2b8c1e-0d4a-4e5f-9a6b-7c8d9e0f1a2b",
            "status": "pending"
         })
        ),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No person record for this account")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
#[instrument(name = "create_leave", skip(pool, cache, payload, auth), fields(person_id = %auth.person_id))]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<DirectoryCache>,
    payload: web::Json<CreateLeave>,
) -> Result<impl Responder, ApiError> {
    payload.validate()?;

    let directory = snapshot(&cache, &pool).await?;
    require_person(&auth.person_id, &directory)?;

    let leave_id = Uuid::new_v4().to_string();
    let director_state = initial_director_state(&auth.person_id, &directory);

    sqlx::query(
        r#"
        INSERT INTO leave_requests
            (id, person_id, start_date, end_date, reason, manager_approval, director_approval)
        VALUES (?, ?, ?, ?, ?, 'pending', ?)
        "#,
    )
    .bind(&leave_id)
    .bind(&auth.person_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.reason.trim())
    .bind(director_state.as_ref())
    .execute(pool.get_ref())
    .await?;

    info!(leave_id = %leave_id, director_stage = %director_state, "Leave request submitted");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Leave request submitted",
        "id": leave_id,
        "status": "pending"
    })))
}

/// Leave requests of people in the caller's access scope or approval chain
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<DirectoryCache>,
    query: web::Query<LeaveFilter>,
) -> Result<impl Responder, ApiError> {
    let (page, per_page, offset) = page_bounds(query.page, query.per_page);
    let directory = snapshot(&cache, &pool).await?;

    let mut visible = visible_requesters(&auth.person_id, &directory);
    if let Some(person_id) = query.person_id.as_deref() {
        visible.retain(|id| id == person_id);
    }

    let mut filter = SqlFilter::new();
    filter.push_in("person_id", visible);
    if let Some(state) = query.manager_approval {
        filter.push_eq("manager_approval", state.as_ref());
    }
    if let Some(state) = query.director_approval {
        filter.push_eq("director_approval", state.as_ref());
    }

    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", filter.sql());
    let total = filter
        .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(pool.get_ref())
        .await?;

    let data_sql = format!(
        "SELECT {} FROM leave_requests{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        LEAVE_COLUMNS,
        filter.sql()
    );
    let leaves = filter
        .bind_rows(sqlx::query_as::<_, LeaveRequest>(&data_sql))
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    let data = leaves
        .iter()
        .map(|l| LeaveResponse::new(l, actionable_stage(&auth.person_id, l, &directory)))
        .collect();

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Leave requests the caller can decide right now
#[utoipa::path(
    get,
    path = "/api/leave/pending",
    responses(
        (status = 200, description = "Requests awaiting the caller's decision", body = [LeaveResponse]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn pending_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<DirectoryCache>,
) -> Result<impl Responder, ApiError> {
    let directory = snapshot(&cache, &pool).await?;

    let requesters: Vec<String> = directory
        .iter()
        .filter(|p| in_chain_of(&auth.person_id, &p.id, &directory))
        .map(|p| p.id.clone())
        .collect();

    let mut filter = SqlFilter::new();
    filter.push_in("person_id", requesters);

    let sql = format!(
        "SELECT {} FROM leave_requests{} AND (manager_approval = 'pending' OR director_approval = 'pending') ORDER BY created_at ASC",
        LEAVE_COLUMNS,
        filter.sql()
    );
    let candidates = filter
        .bind_rows(sqlx::query_as::<_, LeaveRequest>(&sql))
        .fetch_all(pool.get_ref())
        .await?;

    let data: Vec<LeaveResponse> = pending_for(&auth.person_id, &candidates, &directory)
        .into_iter()
        .map(|(stage, l)| LeaveResponse::new(l, Some(stage)))
        .collect();

    Ok(HttpResponse::Ok().json(data))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(("leave_id" = String, Path, description = "ID of the leave request to fetch")),
    responses(
        (status = 200, description = "Leave request found", body = LeaveResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<DirectoryCache>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let leave_id = path.into_inner();
    let directory = snapshot(&cache, &pool).await?;
    let leave = fetch_leave(&pool, &leave_id).await?;

    if !may_see(&auth.person_id, &leave, &directory) {
        return Err(ApiError::Forbidden(
            "Leave request is outside your access scope".to_string(),
        ));
    }

    let stage = actionable_stage(&auth.person_id, &leave, &directory);
    Ok(HttpResponse::Ok().json(LeaveResponse::new(&leave, stage)))
}

async fn decide(
    stage: Stage,
    auth: &AuthUser,
    pool: &MySqlPool,
    cache: &DirectoryCache,
    leave_id: &str,
    decision: Decision,
) -> Result<HttpResponse, ApiError> {
    let directory = snapshot(cache, pool).await?;
    let leave = fetch_leave(pool, leave_id).await?;

    let column = match stage {
        Stage::Manager => {
            authorize_manager_decision(&auth.person_id, &leave, &directory)?;
            "manager_approval"
        }
        Stage::Director => {
            authorize_director_decision(&auth.person_id, &leave, &directory)?;
            "director_approval"
        }
    };

    let state = ApprovalState::from(decision);
    let sql = format!(
        "UPDATE leave_requests SET {column} = ? WHERE id = ? AND {column} = 'pending'",
        column = column
    );
    let result = sqlx::query(&sql)
        .bind(state.as_ref())
        .bind(leave_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::Conflict(
            "Leave request already processed".to_string(),
        ));
    }

    info!(leave_id, ?stage, decision = %state, "Leave decision recorded");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Leave {}", state),
        "stage": stage,
    })))
}

/* =========================
Manager stage (direct manager)
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/manager-decision",
    params(("leave_id" = String, Path, description = "ID of the leave request")),
    request_body = DecideLeave,
    responses(
        (status = 200, description = "Decision recorded", body = Object, example = json!({
            "message": "Leave approved",
            "stage": "manager"
        })),
        (status = 403, description = "Caller is not the requester's direct manager"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
#[instrument(name = "manager_decision", skip(pool, cache, payload, auth), fields(approver = %auth.person_id))]
pub async fn manager_decision(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<DirectoryCache>,
    path: web::Path<String>,
    payload: web::Json<DecideLeave>,
) -> Result<impl Responder, ApiError> {
    decide(
        Stage::Manager,
        &auth,
        &pool,
        &cache,
        &path.into_inner(),
        payload.decision,
    )
    .await
}

/* =========================
Director stage (chain-aware)
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/director-decision",
    params(("leave_id" = String, Path, description = "ID of the leave request")),
    request_body = DecideLeave,
    responses(
        (status = 200, description = "Decision recorded", body = Object, example = json!({
            "message": "Leave approved",
            "stage": "director"
        })),
        (status = 403, description = "Caller is not a director in the approval chain, or the manager has not approved"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
#[instrument(name = "director_decision", skip(pool, cache, payload, auth), fields(approver = %auth.person_id))]
pub async fn director_decision(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<DirectoryCache>,
    path: web::Path<String>,
    payload: web::Json<DecideLeave>,
) -> Result<impl Responder, ApiError> {
    decide(
        Stage::Director,
        &auth,
        &pool,
        &cache,
        &path.into_inner(),
        payload.decision,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::person::Person;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    fn leave(person: &str) -> LeaveRequest {
        LeaveRequest {
            id: "l1".to_string(),
            person_id: person.to_string(),
            start_date: date(4),
            end_date: date(6),
            reason: "rest".to_string(),
            manager_approval: "pending".to_string(),
            director_approval: "pending".to_string(),
            created_at: None,
        }
    }

    fn org() -> Directory {
        [
            Person::new("d", "director", None),
            Person::new("m", "manager", Some("d")),
            Person::new("t", "team_lead", Some("m")),
            Person::new("s", "intern", Some("t")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn create_payload_validation() {
        let ok = CreateLeave {
            start_date: date(4),
            end_date: date(4),
            reason: "dentist".to_string(),
        };
        assert!(ok.validate().is_ok());

        let backwards = CreateLeave {
            start_date: date(6),
            end_date: date(4),
            reason: "trip".to_string(),
        };
        assert!(backwards.validate().is_err());

        let blank = CreateLeave {
            start_date: date(4),
            end_date: date(5),
            reason: "   ".to_string(),
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn team_lead_sees_reports_leave_through_chain() {
        let dir = org();
        // team leads only see themselves in the directory, but approve their reports
        assert!(may_see("t", &leave("s"), &dir));
        assert!(may_see("m", &leave("s"), &dir));
        assert!(!may_see("s", &leave("t"), &dir));
        assert!(may_see("s", &leave("s"), &dir));
    }

    #[test]
    fn list_and_detail_agree_on_visibility() {
        let dir = org();
        let ids = |viewer: &str| -> Vec<String> {
            visible_requesters(viewer, &dir).into_iter().collect()
        };
        assert_eq!(ids("t"), vec!["s", "t"]);
        assert_eq!(ids("m"), vec!["m", "s", "t"]);
        assert_eq!(ids("d"), vec!["d", "m", "t"]);
        assert_eq!(ids("s"), vec!["s"]);
        assert!(ids("ghost").is_empty());

        for viewer in ["d", "m", "t", "s"] {
            let visible = visible_requesters(viewer, &dir);
            for requester in ["d", "m", "t", "s"] {
                assert_eq!(
                    may_see(viewer, &leave(requester), &dir),
                    visible.contains(requester),
                    "{viewer} viewing {requester}"
                );
            }
        }
    }

    #[test]
    fn actionable_stage_for_viewer() {
        let dir = org();
        assert_eq!(actionable_stage("t", &leave("s"), &dir), Some(Stage::Manager));
        assert_eq!(actionable_stage("m", &leave("s"), &dir), None);
    }

    #[test]
    fn response_derives_overall_status() {
        let mut request = leave("s");
        request.manager_approval = "approved".to_string();
        request.director_approval = "rejected".to_string();
        let resp = LeaveResponse::new(&request, None);
        assert_eq!(resp.manager_approval, ApprovalState::Approved);
        assert_eq!(resp.status, ApprovalState::Rejected);
    }
}
