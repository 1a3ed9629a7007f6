use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Task {
    #[schema(example = "9a4d1c2b-3e5f-4a6b-8c7d-0e1f2a3b4c5d")]
    pub id: String,
    #[schema(example = "Prepare Q1 onboarding checklist")]
    pub title: String,
    #[schema(nullable = true)]
    pub description: Option<String>,
    #[schema(example = "5b0c7a52-8d1e-4c1b-9a57-1f0e6f3c2a10")]
    pub assignee_id: String,
    #[schema(example = "0c9f4e5e-2f7b-4f4a-8d0e-6c4c1b7a9e21")]
    pub assigned_by: String,
    #[schema(example = "2026-02-01", value_type = Option<String>, format = "date", nullable = true)]
    pub due_date: Option<NaiveDate>,
    #[schema(example = "todo")]
    pub status: String,
    #[schema(example = "2026-01-15T09:00:00Z", value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}
