use std::collections::HashMap;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::Serialize;
use utoipa::ToSchema;

use crate::access::AccessError;
use crate::model::role::Role;

/// Access tier a role tag belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Director,
    Manager,
    TeamLead,
    Staff,
}

impl Tier {
    /// Team leads sit with staff for scoping purposes.
    pub fn is_staff_tier(self) -> bool {
        matches!(self, Tier::TeamLead | Tier::Staff)
    }

    /// Tiers allowed to sign off a direct report's request.
    pub fn can_supervise(self) -> bool {
        matches!(self, Tier::Director | Tier::Manager | Tier::TeamLead)
    }
}

impl Role {
    /// Strict parse used when a role arrives as input.
    pub fn parse(tag: &str) -> Result<Role, AccessError> {
        Role::from_str(tag).map_err(|_| AccessError::UnknownRole(tag.to_string()))
    }

    pub fn tier(self) -> Tier {
        match self {
            Role::Director | Role::GlobalHrDirector | Role::EngineeringDirector => Tier::Director,
            Role::Manager | Role::ProjectManager | Role::QaManager | Role::HrManager => {
                Tier::Manager
            }
            Role::TeamLead => Tier::TeamLead,
            Role::Employee | Role::Intern => Tier::Staff,
        }
    }
}

static DISPLAY_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("director", "Director"),
        ("global_hr_director", "Global HR Director"),
        ("engineering_director", "Engineering Director"),
        ("manager", "Manager"),
        ("project_manager", "Project Manager"),
        ("qa_manager", "QA Manager"),
        ("hr_manager", "HR Manager"),
        ("team_lead", "Team Lead"),
        ("employee", "Employee"),
        ("intern", "Intern"),
    ])
});

/// Tier of a stored role tag. Tags outside the known set are treated as staff,
/// so an unrecognized role never widens access.
pub fn tier_of(role: &str) -> Tier {
    match Role::from_str(role) {
        Ok(role) => role.tier(),
        Err(_) => {
            tracing::debug!(role, "unknown role tag, falling back to staff tier");
            Tier::Staff
        }
    }
}

pub fn is_director(role: &str) -> bool {
    tier_of(role) == Tier::Director
}

pub fn is_manager(role: &str) -> bool {
    tier_of(role) == Tier::Manager
}

pub fn is_team_lead(role: &str) -> bool {
    tier_of(role) == Tier::TeamLead
}

pub fn is_employee_or_intern(role: &str) -> bool {
    tier_of(role) == Tier::Staff
}

/// Human readable role name; unknown tags come back unchanged.
pub fn display_name(role: &str) -> &str {
    DISPLAY_NAMES.get(role).copied().unwrap_or(role)
}

/// Coarse job designation shown on dashboards and documents.
pub fn designation(role: &str) -> &'static str {
    match Role::from_str(role) {
        Ok(Role::Intern) => "Intern",
        Ok(Role::TeamLead) => "Team Lead",
        Ok(role) => match role.tier() {
            Tier::Director => "Director",
            Tier::Manager => "Manager",
            _ => "Employee",
        },
        Err(_) => "Employee",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_known_role_has_a_stable_tier() {
        for role in Role::iter() {
            let first = tier_of(role.as_str());
            assert_eq!(first, role.tier());
            assert_eq!(tier_of(role.as_str()), first);
        }
    }

    #[test]
    fn tiers_partition_the_role_set() {
        assert_eq!(tier_of("global_hr_director"), Tier::Director);
        assert_eq!(tier_of("engineering_director"), Tier::Director);
        assert_eq!(tier_of("qa_manager"), Tier::Manager);
        assert_eq!(tier_of("team_lead"), Tier::TeamLead);
        assert_eq!(tier_of("intern"), Tier::Staff);
    }

    #[test]
    fn unknown_roles_fall_back_to_staff() {
        for tag in ["", "ceo", "Director", "project manager"] {
            assert_eq!(tier_of(tag), Tier::Staff);
            assert!(is_employee_or_intern(tag));
        }
    }

    #[test]
    fn predicates_follow_tier() {
        assert!(is_director("director"));
        assert!(!is_director("manager"));
        assert!(is_manager("hr_manager"));
        assert!(is_team_lead("team_lead"));
        assert!(!is_team_lead("employee"));
        assert!(is_employee_or_intern("employee"));
        assert!(!is_employee_or_intern("team_lead"));
    }

    #[test]
    fn strict_parse_reports_unknown_role() {
        assert_eq!(Role::parse("qa_manager").unwrap(), Role::QaManager);
        let err = Role::parse("wizard").unwrap_err();
        assert_eq!(err, AccessError::UnknownRole("wizard".to_string()));
    }

    #[test]
    fn display_name_falls_back_to_raw_tag() {
        assert_eq!(display_name("global_hr_director"), "Global HR Director");
        assert_eq!(display_name("qa_manager"), "QA Manager");
        assert_eq!(display_name("chief_of_fun"), "chief_of_fun");
    }

    #[test]
    fn designation_is_coarse() {
        assert_eq!(designation("engineering_director"), "Director");
        assert_eq!(designation("project_manager"), "Manager");
        assert_eq!(designation("team_lead"), "Team Lead");
        assert_eq!(designation("intern"), "Intern");
        assert_eq!(designation("employee"), "Employee");
        assert_eq!(designation("unknown"), "Employee");
    }

    #[test]
    fn supervising_tiers() {
        assert!(Tier::Director.can_supervise());
        assert!(Tier::TeamLead.can_supervise());
        assert!(!Tier::Staff.can_supervise());
        assert!(Tier::TeamLead.is_staff_tier());
        assert!(!Tier::Manager.is_staff_tier());
    }
}
