//! Member roster.

use std::collections::HashSet;

/// Ordered, duplicate-free list of present members.
///
/// Replaced wholesale on every roster update; there is no incremental diffing
/// and no client-side notion of membership between updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    members: Vec<String>,
}

impl Roster {
    /// Build a roster, keeping the first occurrence of each name.
    pub fn from_members(members: impl IntoIterator<Item = String>) -> Self {
        let mut seen = HashSet::new();
        let members = members.into_iter().filter(|m| seen.insert(m.clone())).collect();
        Self { members }
    }

    /// Members in relay order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Whether `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m == name)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Forget all members.
    pub fn clear(&mut self) {
        self.members.clear();
    }
}
