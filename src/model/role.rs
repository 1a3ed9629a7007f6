use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Closed set of role tags stored on a person record.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Director,
    GlobalHrDirector,
    EngineeringDirector,
    Manager,
    ProjectManager,
    QaManager,
    HrManager,
    TeamLead,
    Employee,
    Intern,
}

impl Role {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}
