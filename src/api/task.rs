use crate::access::hierarchy::tier_of;
use crate::access::scope::{can_view, scope_ids};
use crate::access::Directory;
use crate::api::{SqlFilter, page_bounds, snapshot};
use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::task::{Task, TaskStatus};
use crate::utils::directory_cache::DirectoryCache;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

const TASK_COLUMNS: &str =
    "id, title, description, assignee_id, assigned_by, due_date, status, created_at";

#[derive(Deserialize, ToSchema)]
pub struct CreateTask {
    #[schema(example = "Prepare Q1 onboarding checklist")]
    pub title: String,
    #[schema(nullable = true)]
    pub description: Option<String>,
    #[schema(example = "5b0c7a52-8d1e-4c1b-9a57-1f0e6f3c2a10")]
    pub assignee_id: String,
    #[schema(example = "2026-02-01", value_type = Option<String>, format = "date")]
    pub due_date: Option<NaiveDate>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateTaskStatus {
    #[schema(example = "in_progress")]
    pub status: TaskStatus,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct TaskFilter {
    pub assignee_id: Option<String>,
    #[schema(example = "todo")]
    pub status: Option<TaskStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct TaskListResponse {
    pub data: Vec<Task>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Supervising tiers may assign work to anyone they can see.
fn authorize_assignment(
    assigner_id: &str,
    payload: &CreateTask,
    directory: &Directory,
) -> Result<(), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }

    let assigner = directory
        .get(assigner_id)
        .ok_or_else(|| ApiError::Forbidden("No person record for this account".to_string()))?;
    if !tier_of(&assigner.role).can_supervise() {
        return Err(ApiError::Forbidden(
            "Only managers, directors and team leads can assign tasks".to_string(),
        ));
    }

    if !directory.contains(&payload.assignee_id) {
        return Err(ApiError::BadRequest("Assignee not found".to_string()));
    }
    if !can_view(assigner_id, &payload.assignee_id, directory) {
        return Err(ApiError::Forbidden(
            "Assignee is outside your access scope".to_string(),
        ));
    }

    Ok(())
}

/// Assign a task
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTask,
    responses(
        (status = 201, description = "Task created", body = Object, example = json!({
            "message": "Task assigned",
            "id": "9a4d1c2b-3e5f-4a6b-8c7d-0e1f2a3b4c5d"
        })),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Caller may not assign to this person")
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
#[instrument(name = "assign_task", skip(pool, cache, payload, auth), fields(assigner = %auth.person_id))]
pub async fn create_task(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<DirectoryCache>,
    payload: web::Json<CreateTask>,
) -> Result<impl Responder, ApiError> {
    let directory = snapshot(&cache, &pool).await?;
    authorize_assignment(&auth.person_id, &payload, &directory)?;

    let task_id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO tasks
            (id, title, description, assignee_id, assigned_by, due_date, status)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&task_id)
    .bind(payload.title.trim())
    .bind(payload.description.as_deref())
    .bind(&payload.assignee_id)
    .bind(&auth.person_id)
    .bind(payload.due_date)
    .bind(TaskStatus::Todo.as_ref())
    .execute(pool.get_ref())
    .await?;

    info!(task_id = %task_id, assignee = %payload.assignee_id, "Task assigned");

    Ok(HttpResponse::Created().json(json!({
        "message": "Task assigned",
        "id": task_id
    })))
}

/// Tasks assigned to people in the caller's access scope
#[utoipa::path(
    get,
    path = "/api/tasks",
    params(TaskFilter),
    responses(
        (status = 200, description = "Paginated task list", body = TaskListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn list_tasks(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<DirectoryCache>,
    query: web::Query<TaskFilter>,
) -> Result<impl Responder, ApiError> {
    let (page, per_page, offset) = page_bounds(query.page, query.per_page);
    let directory = snapshot(&cache, &pool).await?;

    let mut visible = scope_ids(&auth.person_id, &directory);
    if let Some(assignee_id) = query.assignee_id.as_deref() {
        visible.retain(|id| id == assignee_id);
    }

    let mut filter = SqlFilter::new();
    filter.push_in("assignee_id", visible);
    if let Some(status) = query.status {
        filter.push_eq("status", status.as_ref());
    }

    let count_sql = format!("SELECT COUNT(*) FROM tasks{}", filter.sql());
    let total = filter
        .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(pool.get_ref())
        .await?;

    let data_sql = format!(
        "SELECT {} FROM tasks{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        TASK_COLUMNS,
        filter.sql()
    );
    let data = filter
        .bind_rows(sqlx::query_as::<_, Task>(&data_sql))
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(TaskListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Move a task along; only its assignee or assigner may do so
#[utoipa::path(
    put,
    path = "/api/tasks/{task_id}/status",
    params(("task_id" = String, Path, description = "Task ID")),
    request_body = UpdateTaskStatus,
    responses(
        (status = 200, description = "Status updated", body = Object, example = json!({
            "message": "Task status updated"
        })),
        (status = 403, description = "Not the assignee or assigner"),
        (status = 404, description = "Task not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn update_task_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    payload: web::Json<UpdateTaskStatus>,
) -> Result<impl Responder, ApiError> {
    let task_id = path.into_inner();

    let task = sqlx::query_as::<_, Task>(&format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS))
        .bind(&task_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if task.assignee_id != auth.person_id && task.assigned_by != auth.person_id {
        return Err(ApiError::Forbidden(
            "Only the assignee or assigner can update this task".to_string(),
        ));
    }

    sqlx::query("UPDATE tasks SET status = ? WHERE id = ?")
        .bind(payload.status.as_ref())
        .bind(&task_id)
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task status updated"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::person::Person;

    fn org() -> Directory {
        [
            Person::new("d", "director", None),
            Person::new("m", "manager", Some("d")),
            Person::new("t", "team_lead", Some("m")),
            Person::new("s", "employee", Some("m")),
            Person::new("x", "employee", None),
        ]
        .into_iter()
        .collect()
    }

    fn task_for(assignee: &str) -> CreateTask {
        CreateTask {
            title: "Write handover notes".to_string(),
            description: None,
            assignee_id: assignee.to_string(),
            due_date: None,
        }
    }

    #[test]
    fn manager_assigns_within_scope() {
        let dir = org();
        assert!(authorize_assignment("m", &task_for("s"), &dir).is_ok());
        assert!(authorize_assignment("d", &task_for("s"), &dir).is_ok());
    }

    #[test]
    fn outside_scope_is_forbidden() {
        let err = authorize_assignment("m", &task_for("x"), &org()).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn staff_cannot_assign() {
        let err = authorize_assignment("s", &task_for("s"), &org()).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn team_lead_can_only_reach_themselves() {
        let dir = org();
        assert!(authorize_assignment("t", &task_for("t"), &dir).is_ok());
        assert!(authorize_assignment("t", &task_for("s"), &dir).is_err());
    }

    #[test]
    fn blank_title_and_unknown_assignee() {
        let mut blank = task_for("s");
        blank.title = " ".to_string();
        assert!(matches!(
            authorize_assignment("m", &blank, &org()),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            authorize_assignment("m", &task_for("ghost"), &org()),
            Err(ApiError::BadRequest(_))
        ));
    }
}
