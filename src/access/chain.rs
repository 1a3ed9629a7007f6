use crate::access::Directory;
use crate::access::hierarchy::tier_of;

/// Approval chains never walk past the manager's manager.
pub const MAX_CHAIN_DEPTH: usize = 2;

/// Ordered approvers of `target`: direct manager first, then that manager's
/// manager. A reference to someone missing from the directory ends the chain.
///
/// The depth cap doubles as the cycle guard, so a two-person loop
/// `a -> b -> a` resolves to `[b, a]` for `a`.
pub fn resolve(target: &str, directory: &Directory) -> Vec<String> {
    let mut chain = Vec::with_capacity(MAX_CHAIN_DEPTH);
    let mut current = target;

    while chain.len() < MAX_CHAIN_DEPTH {
        match directory.manager_of(current) {
            Some(manager) => {
                chain.push(manager.id.clone());
                current = &manager.id;
            }
            None => break,
        }
    }

    chain
}

/// True only when `approver` is the requester's direct manager and holds a
/// supervising tier. A director two hops up is not covered here.
pub fn can_approve(approver_id: &str, requester_id: &str, directory: &Directory) -> bool {
    let Some(requester) = directory.get(requester_id) else {
        return false;
    };
    if requester.manager_id.as_deref() != Some(approver_id) {
        return false;
    }

    directory
        .get(approver_id)
        .is_some_and(|approver| tier_of(&approver.role).can_supervise())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::person::Person;

    fn three_levels() -> Directory {
        [
            Person::new("a", "employee", Some("b")),
            Person::new("b", "project_manager", Some("c")),
            Person::new("c", "global_hr_director", None),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn resolves_manager_then_managers_manager() {
        let dir = three_levels();
        assert_eq!(resolve("a", &dir), vec!["b", "c"]);
        assert_eq!(resolve("b", &dir), vec!["c"]);
        assert!(resolve("c", &dir).is_empty());
    }

    #[test]
    fn unknown_target_has_no_chain() {
        assert!(resolve("zz", &three_levels()).is_empty());
    }

    #[test]
    fn chain_stops_at_two_hops() {
        let dir: Directory = [
            Person::new("a", "intern", Some("b")),
            Person::new("b", "team_lead", Some("c")),
            Person::new("c", "manager", Some("d")),
            Person::new("d", "director", None),
        ]
        .into_iter()
        .collect();

        assert_eq!(resolve("a", &dir), vec!["b", "c"]);
    }

    #[test]
    fn two_cycle_terminates() {
        let dir: Directory = [
            Person::new("a", "manager", Some("b")),
            Person::new("b", "manager", Some("a")),
        ]
        .into_iter()
        .collect();

        assert_eq!(resolve("a", &dir), vec!["b", "a"]);
        assert_eq!(resolve("b", &dir), vec!["a", "b"]);
    }

    #[test]
    fn self_loop_terminates() {
        let dir: Directory = [Person::new("a", "manager", Some("a"))].into_iter().collect();
        assert_eq!(resolve("a", &dir), vec!["a", "a"]);
    }

    #[test]
    fn dangling_reference_keeps_valid_prefix() {
        let dir: Directory = [
            Person::new("a", "employee", Some("b")),
            Person::new("b", "manager", Some("gone")),
            Person::new("x", "employee", Some("gone")),
        ]
        .into_iter()
        .collect();

        assert_eq!(resolve("a", &dir), vec!["b"]);
        assert!(resolve("x", &dir).is_empty());
    }

    #[test]
    fn resolve_is_idempotent() {
        let dir = three_levels();
        assert_eq!(resolve("a", &dir), resolve("a", &dir));
    }

    #[test]
    fn direct_manager_can_approve() {
        let dir = three_levels();
        assert!(can_approve("b", "a", &dir));
        assert!(can_approve("c", "b", &dir));
    }

    #[test]
    fn director_two_hops_up_cannot_approve() {
        let dir = three_levels();
        assert!(!can_approve("c", "a", &dir));
    }

    #[test]
    fn staff_tier_manager_cannot_approve() {
        let dir: Directory = [
            Person::new("a", "intern", Some("b")),
            Person::new("b", "employee", None),
            Person::new("c", "intern", Some("t")),
            Person::new("t", "team_lead", None),
        ]
        .into_iter()
        .collect();

        assert!(!can_approve("b", "a", &dir));
        assert!(can_approve("t", "c", &dir));
    }

    #[test]
    fn unknown_parties_cannot_approve() {
        let dir: Directory = [Person::new("a", "employee", Some("ghost"))].into_iter().collect();
        assert!(!can_approve("ghost", "a", &dir));
        assert!(!can_approve("a", "nobody", &dir));
    }
}
