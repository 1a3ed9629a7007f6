use std::collections::HashMap;

use crate::model::person::Person;

/// Immutable snapshot of every person, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    people: HashMap<String, Person>,
}

impl Directory {
    pub fn get(&self, id: &str) -> Option<&Person> {
        self.people.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.people.contains_key(id)
    }

    /// Manager of `id`, if it resolves to a known person.
    pub fn manager_of(&self, id: &str) -> Option<&Person> {
        self.get(id)?
            .manager_id
            .as_deref()
            .and_then(|manager_id| self.get(manager_id))
    }

    /// People whose `manager_id` points at `manager_id`.
    pub fn direct_reports<'a>(&'a self, manager_id: &'a str) -> impl Iterator<Item = &'a Person> {
        self.people
            .values()
            .filter(move |p| p.manager_id.as_deref() == Some(manager_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.people.values()
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

impl FromIterator<Person> for Directory {
    fn from_iter<I: IntoIterator<Item = Person>>(iter: I) -> Self {
        Self {
            people: iter.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }
}
