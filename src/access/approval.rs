use serde::Serialize;

use crate::access::chain::{can_approve, resolve};
use crate::access::hierarchy::{Tier, tier_of};
use crate::access::Directory;
use crate::model::leave_request::{ApprovalState, LeaveRequest};

/// Approval stage a decision targets.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Manager,
    Director,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionDenied {
    AlreadyDecided { stage: Stage },
    NotDirectManager,
    NotDirector,
    NotInApprovalChain,
    AwaitingManagerApproval,
    DirectorStageNotRequired,
}

impl DecisionDenied {
    pub fn reason(&self) -> String {
        match self {
            Self::AlreadyDecided { stage } => {
                format!("{:?} approval has already been decided", stage)
            }
            Self::NotDirectManager => {
                "Only the requester's direct manager can decide this stage".to_string()
            }
            Self::NotDirector => "Only a director can decide this stage".to_string(),
            Self::NotInApprovalChain => {
                "Director is not in the requester's approval chain".to_string()
            }
            Self::AwaitingManagerApproval => {
                "The manager must approve before the director decides".to_string()
            }
            Self::DirectorStageNotRequired => {
                "This request does not need a director decision".to_string()
            }
        }
    }
}

/// Whether `approver_id` may record the manager-stage decision.
pub fn authorize_manager_decision(
    approver_id: &str,
    request: &LeaveRequest,
    directory: &Directory,
) -> Result<(), DecisionDenied> {
    if request.manager_state() != ApprovalState::Pending {
        return Err(DecisionDenied::AlreadyDecided {
            stage: Stage::Manager,
        });
    }
    if !can_approve(approver_id, &request.person_id, directory) {
        return Err(DecisionDenied::NotDirectManager);
    }
    Ok(())
}

/// Director who decides the second stage for `requester_id`: the chain entry
/// above the direct manager, when it is director tier and not the requester.
/// A director-tier direct manager already signs the first stage, so no one
/// is returned then.
pub fn director_approver<'a>(requester_id: &str, directory: &'a Directory) -> Option<&'a str> {
    let chain = resolve(requester_id, directory);
    let candidate = chain.get(1)?;
    let person = directory.get(candidate)?;
    (person.id != requester_id && tier_of(&person.role) == Tier::Director)
        .then_some(person.id.as_str())
}

/// Director-stage state a new request from `requester_id` starts in.
pub fn initial_director_state(requester_id: &str, directory: &Directory) -> ApprovalState {
    match director_approver(requester_id, directory) {
        Some(_) => ApprovalState::Pending,
        None => ApprovalState::NotRequired,
    }
}

/// Whether `approver_id` may record the director-stage decision. Requires
/// the stage to be open, the approver to be the requester's second-stage
/// director and a manager approval first.
pub fn authorize_director_decision(
    approver_id: &str,
    request: &LeaveRequest,
    directory: &Directory,
) -> Result<(), DecisionDenied> {
    match request.director_state() {
        ApprovalState::Pending => {}
        ApprovalState::NotRequired => return Err(DecisionDenied::DirectorStageNotRequired),
        ApprovalState::Approved | ApprovalState::Rejected => {
            return Err(DecisionDenied::AlreadyDecided {
                stage: Stage::Director,
            });
        }
    }

    let is_director = directory
        .get(approver_id)
        .is_some_and(|p| tier_of(&p.role) == Tier::Director);
    if !is_director {
        return Err(DecisionDenied::NotDirector);
    }

    if director_approver(&request.person_id, directory) != Some(approver_id) {
        return Err(DecisionDenied::NotInApprovalChain);
    }

    match request.manager_state() {
        ApprovalState::Approved => Ok(()),
        ApprovalState::Rejected => Err(DecisionDenied::AlreadyDecided {
            stage: Stage::Manager,
        }),
        ApprovalState::Pending | ApprovalState::NotRequired => {
            Err(DecisionDenied::AwaitingManagerApproval)
        }
    }
}

/// Requests `viewer_id` could decide right now, tagged with the stage.
pub fn pending_for<'a>(
    viewer_id: &str,
    requests: &'a [LeaveRequest],
    directory: &Directory,
) -> Vec<(Stage, &'a LeaveRequest)> {
    requests
        .iter()
        .filter_map(|request| {
            if authorize_manager_decision(viewer_id, request, directory).is_ok() {
                Some((Stage::Manager, request))
            } else if authorize_director_decision(viewer_id, request, directory).is_ok() {
                Some((Stage::Director, request))
            } else {
                None
            }
        })
        .collect()
}
