use std::collections::{BTreeMap, BTreeSet};

use crate::access::hierarchy::{Tier, tier_of};
use crate::access::Directory;
use crate::model::person::Person;

/// People `viewer_id` may see, ordered by id and free of duplicates.
///
/// - staff tier (team leads included) and unknown roles: only themselves
/// - manager tier: themselves plus direct reports
/// - director tier: themselves, the managers reporting to them, and the
///   staff reporting to those managers
///
/// A viewer missing from the directory sees nobody.
pub fn scope<'a>(viewer_id: &str, directory: &'a Directory) -> Vec<&'a Person> {
    let Some(viewer) = directory.get(viewer_id) else {
        return Vec::new();
    };

    let mut visible: BTreeMap<&str, &Person> = BTreeMap::new();
    visible.insert(viewer.id.as_str(), viewer);

    match tier_of(&viewer.role) {
        Tier::Manager => {
            for report in directory.direct_reports(&viewer.id) {
                visible.insert(report.id.as_str(), report);
            }
        }
        Tier::Director => {
            let managers: Vec<&Person> = directory
                .direct_reports(&viewer.id)
                .filter(|p| tier_of(&p.role) == Tier::Manager)
                .collect();

            for manager in managers {
                visible.insert(manager.id.as_str(), manager);
                for staff in directory
                    .direct_reports(&manager.id)
                    .filter(|p| tier_of(&p.role).is_staff_tier())
                {
                    visible.insert(staff.id.as_str(), staff);
                }
            }
        }
        Tier::TeamLead | Tier::Staff => {}
    }

    visible.into_values().collect()
}

pub fn scope_ids(viewer_id: &str, directory: &Directory) -> BTreeSet<String> {
    scope(viewer_id, directory)
        .into_iter()
        .map(|p| p.id.clone())
        .collect()
}

pub fn can_view(viewer_id: &str, target_id: &str, directory: &Directory) -> bool {
    scope(viewer_id, directory)
        .iter()
        .any(|p| p.id == target_id)
}
