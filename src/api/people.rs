use crate::access::chain::resolve;
use crate::access::hierarchy::{Tier, designation, display_name, tier_of};
use crate::access::scope::{can_view, scope};
use crate::access::Directory;
use crate::api::snapshot;
use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::person::Person;
use crate::model::role::Role;
use crate::utils::directory_cache::DirectoryCache;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{info, instrument};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": "5b0c7a52-8d1e-4c1b-9a57-1f0e6f3c2a10",
    "name": "Jane Doe",
    "email": "jane.doe@company.com",
    "role": "project_manager",
    "role_display": "Project Manager",
    "designation": "Manager",
    "tier": "manager",
    "manager_id": "0c9f4e5e-2f7b-4f4a-8d0e-6c4c1b7a9e21"
}))]
pub struct PersonResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub role_display: String,
    pub designation: String,
    pub tier: Tier,
    pub manager_id: Option<String>,
}

impl From<&Person> for PersonResponse {
    fn from(p: &Person) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            email: p.email.clone(),
            role: p.role.clone(),
            role_display: display_name(&p.role).to_string(),
            designation: designation(&p.role).to_string(),
            tier: tier_of(&p.role),
            manager_id: p.manager_id.clone(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRole {
    /// New role tag
    #[schema(example = "qa_manager")]
    pub role: String,
    /// New manager; `null` removes the reporting line
    #[schema(example = "0c9f4e5e-2f7b-4f4a-8d0e-6c4c1b7a9e21", nullable = true)]
    pub manager_id: Option<String>,
}

impl UpdateRole {
    /// Checks the change against the directory: known role, existing manager,
    /// and no reporting loop within two hops.
    fn validate(&self, target_id: &str, directory: &Directory) -> Result<Role, ApiError> {
        let role = Role::parse(self.role.trim())?;

        if !directory.contains(target_id) {
            return Err(ApiError::NotFound("Person not found".to_string()));
        }

        if let Some(manager_id) = self.manager_id.as_deref() {
            if manager_id == target_id {
                return Err(ApiError::BadRequest(
                    "A person cannot be their own manager".to_string(),
                ));
            }
            if !directory.contains(manager_id) {
                return Err(ApiError::BadRequest("Manager not found".to_string()));
            }
            if resolve(manager_id, directory).iter().any(|id| id == target_id) {
                return Err(ApiError::BadRequest(
                    "Reporting line would create a cycle".to_string(),
                ));
            }
        }

        Ok(role)
    }
}

fn require_director(auth: &AuthUser, directory: &Directory) -> Result<(), ApiError> {
    match directory.get(&auth.person_id) {
        Some(p) if tier_of(&p.role) == Tier::Director => Ok(()),
        _ => Err(ApiError::Forbidden("Director only".to_string())),
    }
}

/// Caller's own profile
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Caller profile", body = PersonResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No person record for this account")
    ),
    security(("bearer_auth" = [])),
    tag = "People"
)]
pub async fn get_me(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<DirectoryCache>,
) -> Result<impl Responder, ApiError> {
    let directory = snapshot(&cache, &pool).await?;

    let me = directory
        .get(&auth.person_id)
        .ok_or_else(|| ApiError::NotFound("No person record for this account".to_string()))?;

    Ok(HttpResponse::Ok().json(PersonResponse::from(me)))
}

/// People visible to the caller
#[utoipa::path(
    get,
    path = "/api/people",
    responses(
        (status = 200, description = "Scoped directory", body = [PersonResponse]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "People"
)]
pub async fn list_people(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<DirectoryCache>,
) -> Result<impl Responder, ApiError> {
    let directory = snapshot(&cache, &pool).await?;

    let people: Vec<PersonResponse> = scope(&auth.person_id, &directory)
        .into_iter()
        .map(PersonResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(people))
}

#[utoipa::path(
    get,
    path = "/api/people/{person_id}",
    params(("person_id" = String, Path, description = "Person ID")),
    responses(
        (status = 200, description = "Person found", body = PersonResponse),
        (status = 403, description = "Outside the caller's access scope"),
        (status = 404, description = "Person not found")
    ),
    security(("bearer_auth" = [])),
    tag = "People"
)]
pub async fn get_person(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<DirectoryCache>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let person_id = path.into_inner();
    let directory = snapshot(&cache, &pool).await?;

    let person = directory
        .get(&person_id)
        .ok_or_else(|| ApiError::NotFound("Person not found".to_string()))?;

    if !can_view(&auth.person_id, &person_id, &directory) {
        return Err(ApiError::Forbidden(
            "Person is outside your access scope".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(PersonResponse::from(person)))
}

/// Ordered approvers of a person: manager, then manager's manager
#[utoipa::path(
    get,
    path = "/api/people/{person_id}/approval-chain",
    params(("person_id" = String, Path, description = "Person ID")),
    responses(
        (status = 200, description = "Approval chain, nearest approver first", body = [PersonResponse]),
        (status = 403, description = "Outside the caller's access scope")
    ),
    security(("bearer_auth" = [])),
    tag = "People"
)]
pub async fn approval_chain(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<DirectoryCache>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let person_id = path.into_inner();
    let directory = snapshot(&cache, &pool).await?;

    if !can_view(&auth.person_id, &person_id, &directory) {
        return Err(ApiError::Forbidden(
            "Person is outside your access scope".to_string(),
        ));
    }

    let chain: Vec<PersonResponse> = resolve(&person_id, &directory)
        .iter()
        .filter_map(|id| directory.get(id))
        .map(PersonResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(chain))
}

/// Change a person's role and reporting line (directors only)
#[utoipa::path(
    put,
    path = "/api/people/{person_id}/role",
    params(("person_id" = String, Path, description = "Person ID")),
    request_body = UpdateRole,
    responses(
        (status = 200, description = "Role updated", body = Object, example = json!({
            "message": "Role updated"
        })),
        (status = 400, description = "Unknown role, missing manager or reporting cycle"),
        (status = 403, description = "Director only"),
        (status = 404, description = "Person not found")
    ),
    security(("bearer_auth" = [])),
    tag = "People"
)]
#[instrument(name = "update_role", skip(pool, cache, payload, auth), fields(actor = %auth.person_id))]
pub async fn update_role(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<DirectoryCache>,
    path: web::Path<String>,
    payload: web::Json<UpdateRole>,
) -> Result<impl Responder, ApiError> {
    let person_id = path.into_inner();
    let directory = snapshot(&cache, &pool).await?;

    require_director(&auth, &directory)?;
    let role = payload.validate(&person_id, &directory)?;

    let result = sqlx::query(
        r#"
        UPDATE people
        SET role = ?, manager_id = ?
        WHERE id = ?
        "#,
    )
    .bind(role.as_str())
    .bind(payload.manager_id.as_deref())
    .bind(&person_id)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Person not found".to_string()));
    }

    cache.invalidate().await;
    info!(person_id = %person_id, role = %role, "Role updated");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Role updated"
    })))
}
