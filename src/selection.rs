#![forbid(unsafe_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::model::Entry;
use crate::snapshot::ListingSnapshot;

/// Identities the user marked in one pane. Membership outlives any single
/// listing: identities missing from the current snapshot stay in the set and
/// simply do not materialize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: HashSet<PathBuf>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the membership after the toggle.
    pub fn toggle(&mut self, identity: &Path) -> bool {
        if self.ids.remove(identity) {
            false
        } else {
            self.ids.insert(identity.to_path_buf());
            true
        }
    }

    pub fn deselect(&mut self, identity: &Path) -> bool {
        self.ids.remove(identity)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, identity: &Path) -> bool {
        self.ids.contains(identity)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Live members of the set, in snapshot order.
    pub fn materialize<'a>(&self, snapshot: &'a ListingSnapshot) -> Vec<&'a Entry> {
        if self.ids.is_empty() {
            return Vec::new();
        }
        snapshot
            .entries()
            .iter()
            .filter(|e| self.ids.contains(&e.path))
            .collect()
    }

    pub fn select_all(&mut self, snapshot: &ListingSnapshot) {
        self.ids
            .extend(snapshot.entries().iter().map(|e| e.path.clone()));
    }

    /// Flips every live entry; stale members are left alone.
    pub fn invert(&mut self, snapshot: &ListingSnapshot) {
        for entry in snapshot.entries() {
            self.toggle(&entry.path);
        }
    }

    pub fn total_size(&self, snapshot: &ListingSnapshot) -> u64 {
        self.materialize(snapshot).iter().map(|e| e.size).sum()
    }
}
