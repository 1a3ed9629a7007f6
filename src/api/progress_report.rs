use crate::access::scope::scope_ids;
use crate::api::{FilterValue, SqlFilter, page_bounds, require_person, snapshot};
use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::progress_report::ProgressReport;
use crate::utils::directory_cache::DirectoryCache;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct CreateReport {
    #[schema(example = "2026-01-15", format = "date", value_type = String)]
    pub report_date: NaiveDate,
    #[schema(example = "Finished the payroll export and reviewed two PRs")]
    pub summary: String,
    #[schema(example = 7.5)]
    pub hours_worked: f64,
    #[schema(example = "Waiting on staging credentials", nullable = true)]
    pub blockers: Option<String>,
}

impl CreateReport {
    fn validate(&self) -> Result<(), ApiError> {
        if self.summary.trim().is_empty() {
            return Err(ApiError::BadRequest("summary must not be empty".to_string()));
        }
        if !(0.0..=24.0).contains(&self.hours_worked) {
            return Err(ApiError::BadRequest(
                "hours_worked must be between 0 and 24".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ReportFilter {
    /// Filter by author
    pub person_id: Option<String>,
    /// Earliest report date (inclusive)
    #[schema(example = "2026-01-01", value_type = Option<String>, format = "date")]
    pub from: Option<NaiveDate>,
    /// Latest report date (inclusive)
    #[schema(example = "2026-01-31", value_type = Option<String>, format = "date")]
    pub to: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct ReportListResponse {
    pub data: Vec<ProgressReport>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Submit the caller's daily progress report
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = CreateReport,
    responses(
        (status = 201, description = "Report submitted", body = Object, example = json!({
            "message": "Report submitted",
            "id": "0f8e3c1a-6a55-4d0c-b1f4-8d7d2f5e9a11"
        })),
        (status = 400, description = "Bad request"),
        (status = 403, description = "No person record for this account"),
        (status = 409, description = "A report for this date already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
#[instrument(name = "submit_report", skip(pool, cache, payload, auth), fields(person_id = %auth.person_id))]
pub async fn submit_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<DirectoryCache>,
    payload: web::Json<CreateReport>,
) -> Result<impl Responder, ApiError> {
    payload.validate()?;

    let directory = snapshot(&cache, &pool).await?;
    require_person(&auth.person_id, &directory)?;

    let report_id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO progress_reports
            (id, person_id, report_date, summary, hours_worked, blockers)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&report_id)
    .bind(&auth.person_id)
    .bind(payload.report_date)
    .bind(payload.summary.trim())
    .bind(payload.hours_worked)
    .bind(payload.blockers.as_deref())
    .execute(pool.get_ref())
    .await
    .map_err(|e| match ApiError::from(e) {
        ApiError::Conflict(_) => {
            ApiError::Conflict("A report for this date already exists".to_string())
        }
        other => other,
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Report submitted",
        "id": report_id
    })))
}

/// Progress reports of people in the caller's access scope
#[utoipa::path(
    get,
    path = "/api/reports",
    params(ReportFilter),
    responses(
        (status = 200, description = "Paginated report list", body = ReportListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn list_reports(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<DirectoryCache>,
    query: web::Query<ReportFilter>,
) -> Result<impl Responder, ApiError> {
    let (page, per_page, offset) = page_bounds(query.page, query.per_page);
    let directory = snapshot(&cache, &pool).await?;

    let mut visible = scope_ids(&auth.person_id, &directory);
    if let Some(person_id) = query.person_id.as_deref() {
        visible.retain(|id| id == person_id);
    }

    let mut filter = SqlFilter::new();
    filter.push_in("person_id", visible);
    if let Some(from) = query.from {
        filter.push("report_date", ">=", FilterValue::Date(from));
    }
    if let Some(to) = query.to {
        filter.push("report_date", "<=", FilterValue::Date(to));
    }

    let count_sql = format!("SELECT COUNT(*) FROM progress_reports{}", filter.sql());
    let total = filter
        .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(pool.get_ref())
        .await?;

    let data_sql = format!(
        r#"
        SELECT id, person_id, report_date, summary, hours_worked, blockers, created_at
        FROM progress_reports
        {}
        ORDER BY report_date DESC, created_at DESC
        LIMIT ? OFFSET ?
        "#,
        filter.sql()
    );
    let data = filter
        .bind_rows(sqlx::query_as::<_, ProgressReport>(&data_sql))
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(ReportListResponse {
        data,
        page,
        per_page,
        total,
    }))
}
