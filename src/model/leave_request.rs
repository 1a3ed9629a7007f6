use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// State of a single approval stage.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApprovalState {
    Pending,
    Approved,
    Rejected,
    /// Stage skipped at submission: no separate director above the direct manager.
    NotRequired,
}

/// Verdict an approver submits for one stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl From<Decision> for ApprovalState {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => ApprovalState::Approved,
            Decision::Rejected => ApprovalState::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaveRequest {
    pub id: String,
    pub person_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub manager_approval: String,
    pub director_approval: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl LeaveRequest {
    /// Unrecognized stored states read as pending so they can still be decided.
    pub fn manager_state(&self) -> ApprovalState {
        self.manager_approval.parse().unwrap_or(ApprovalState::Pending)
    }

    pub fn director_state(&self) -> ApprovalState {
        self.director_approval.parse().unwrap_or(ApprovalState::Pending)
    }

    /// Rejected if either stage rejected, approved once every required stage
    /// approved.
    pub fn overall_status(&self) -> ApprovalState {
        match (self.manager_state(), self.director_state()) {
            (ApprovalState::Rejected, _) | (_, ApprovalState::Rejected) => ApprovalState::Rejected,
            (ApprovalState::Approved, ApprovalState::Approved | ApprovalState::NotRequired) => {
                ApprovalState::Approved
            }
            _ => ApprovalState::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leave(manager: &str, director: &str) -> LeaveRequest {
        LeaveRequest {
            id: "l1".to_string(),
            person_id: "s".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            reason: "family".to_string(),
            manager_approval: manager.to_string(),
            director_approval: director.to_string(),
            created_at: None,
        }
    }

    #[test]
    fn overall_status_needs_both_stages() {
        assert_eq!(leave("pending", "pending").overall_status(), ApprovalState::Pending);
        assert_eq!(leave("approved", "pending").overall_status(), ApprovalState::Pending);
        assert_eq!(leave("approved", "approved").overall_status(), ApprovalState::Approved);
    }

    #[test]
    fn any_rejection_rejects() {
        assert_eq!(leave("rejected", "pending").overall_status(), ApprovalState::Rejected);
        assert_eq!(leave("approved", "rejected").overall_status(), ApprovalState::Rejected);
    }

    #[test]
    fn skipped_director_stage_approves_on_manager_alone() {
        let request = leave("approved", "not_required");
        assert_eq!(request.director_state(), ApprovalState::NotRequired);
        assert_eq!(request.overall_status(), ApprovalState::Approved);
        assert_eq!(leave("pending", "not_required").overall_status(), ApprovalState::Pending);
        assert_eq!(leave("rejected", "not_required").overall_status(), ApprovalState::Rejected);
        assert_eq!(ApprovalState::NotRequired.as_ref(), "not_required");
    }

    #[test]
    fn unknown_stored_state_reads_as_pending() {
        let request = leave("on_hold", "pending");
        assert_eq!(request.manager_state(), ApprovalState::Pending);
    }

    #[test]
    fn decision_maps_to_state() {
        assert_eq!(ApprovalState::from(Decision::Approved), ApprovalState::Approved);
        assert_eq!(ApprovalState::from(Decision::Rejected).as_ref(), "rejected");
    }
}
