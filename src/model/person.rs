use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "5b0c7a52-8d1e-4c1b-9a57-1f0e6f3c2a10",
        "name": "Jane Doe",
        "email": "jane.doe@company.com",
        "role": "project_manager",
        "manager_id": "0c9f4e5e-2f7b-4f4a-8d0e-6c4c1b7a9e21"
    })
)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Raw role tag. Tags outside the known set are kept as-is.
    pub role: String,
    pub manager_id: Option<String>,
}

#[cfg(test)]
impl Person {
    pub fn new(id: impl Into<String>, role: impl Into<String>, manager_id: Option<&str>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            email: format!("{}@company.com", id),
            id,
            role: role.into(),
            manager_id: manager_id.map(str::to_string),
        }
    }
}
