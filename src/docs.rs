use crate::access::hierarchy::Tier;
use crate::api::leave_request::{CreateLeave, DecideLeave, LeaveFilter, LeaveListResponse, LeaveResponse};
use crate::api::people::{PersonResponse, UpdateRole};
use crate::api::progress_report::{CreateReport, ReportFilter, ReportListResponse};
use crate::api::task::{CreateTask, TaskFilter, TaskListResponse, UpdateTaskStatus};
use crate::model::leave_request::{ApprovalState, Decision};
use crate::model::person::Person;
use crate::model::progress_report::ProgressReport;
use crate::model::role::Role;
use crate::model::task::{Task, TaskStatus};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Portal API",
        version = "1.0.0",
        description = r#"
## HR Portal

Director / manager / employee hierarchy with scoped visibility.

### 🔹 Key Features
- **People**
  - Scoped directory, approval chains, role and reporting-line changes
- **Leave Management**
  - Apply for leave, two-stage approval (direct manager, then director)
- **Daily Progress Reports**
  - Submit one report per day, review reports of your team
- **Tasks**
  - Assign work within your access scope and track its status

### 🔐 Access scope
- Employees, interns and team leads see only themselves
- Managers see themselves and their direct reports
- Directors see their managers and the staff reporting to those managers

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints
"#,
    ),
    paths(
        crate::api::people::get_me,
        crate::api::people::list_people,
        crate::api::people::get_person,
        crate::api::people::approval_chain,
        crate::api::people::update_role,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::pending_leave,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::manager_decision,
        crate::api::leave_request::director_decision,

        crate::api::progress_report::submit_report,
        crate::api::progress_report::list_reports,

        crate::api::task::create_task,
        crate::api::task::list_tasks,
        crate::api::task::update_task_status
    ),
    components(
        schemas(
            Person,
            PersonResponse,
            Role,
            Tier,
            UpdateRole,
            ApprovalState,
            Decision,
            CreateLeave,
            DecideLeave,
            LeaveFilter,
            LeaveResponse,
            LeaveListResponse,
            ProgressReport,
            CreateReport,
            ReportFilter,
            ReportListResponse,
            Task,
            TaskStatus,
            CreateTask,
            UpdateTaskStatus,
            TaskFilter,
            TaskListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "People", description = "Directory and role management APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Reports", description = "Daily progress report APIs"),
        (name = "Tasks", description = "Task assignment APIs"),
    )
)]
pub struct ApiDoc;

/// Prefix baked into the `#[utoipa::path]` attributes.
const DOC_PREFIX: &str = "/api";

/// OpenAPI document with paths rebased onto the configured API prefix.
pub fn openapi_for(api_prefix: &str) -> openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    let prefix = api_prefix.trim_end_matches('/');
    let paths = std::mem::take(&mut doc.paths.paths);
    doc.paths.paths = paths
        .into_iter()
        .map(|(path, item)| {
            let rest = path.strip_prefix(DOC_PREFIX).unwrap_or(&path);
            (format!("{}{}", prefix, rest), item)
        })
        .collect();
    doc
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_scoped_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/people"));
        assert!(doc.paths.paths.contains_key("/api/leave/{leave_id}/director-decision"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("LeaveResponse"));
    }

    #[test]
    fn paths_follow_configured_prefix() {
        let doc = openapi_for("/hr/v1/");
        assert!(doc.paths.paths.contains_key("/hr/v1/people"));
        assert!(doc.paths.paths.contains_key("/hr/v1/leave/{leave_id}/manager-decision"));
        assert!(!doc.paths.paths.keys().any(|p| p.starts_with("/api/")));

        let default = openapi_for("/api");
        assert_eq!(default.paths.paths.len(), ApiDoc::openapi().paths.paths.len());
        assert!(default.paths.paths.contains_key("/api/tasks"));
    }
}
