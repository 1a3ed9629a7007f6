use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ProgressReport {
    #[schema(example = "0f8e3c1a-6a55-4d0c-b1f4-8d7d2f5e9a11")]
    pub id: String,
    #[schema(example = "5b0c7a52-8d1e-4c1b-9a57-1f0e6f3c2a10")]
    pub person_id: String,
    #[schema(example = "2026-01-15", value_type = String, format = "date")]
    pub report_date: NaiveDate,
    #[schema(example = "Finished the payroll export and reviewed two PRs")]
    pub summary: String,
    #[schema(example = 7.5)]
    pub hours_worked: f64,
    #[schema(example = "Waiting on staging credentials", nullable = true)]
    pub blockers: Option<String>,
    #[schema(example = "2026-01-15T17:30:00Z", value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}
