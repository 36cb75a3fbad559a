#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use crate::error::{PaneError, PaneResult};
use crate::snapshot::ListingSnapshot;

/// The focused entry of a pane, held by identity. `None` only when the
/// snapshot is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusCursor {
    current: Option<PathBuf>,
}

impl FocusCursor {
    pub fn current(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    pub fn index(&self, snapshot: &ListingSnapshot) -> Option<usize> {
        self.current.as_deref().and_then(|id| snapshot.position(id))
    }

    pub fn reset(&mut self, snapshot: &ListingSnapshot) {
        self.current = snapshot.first().map(|e| e.path.clone());
    }

    pub fn move_up(&mut self, snapshot: &ListingSnapshot) -> bool {
        self.move_by(snapshot, -1)
    }

    pub fn move_down(&mut self, snapshot: &ListingSnapshot) -> bool {
        self.move_by(snapshot, 1)
    }

    /// Clamped at both ends. Returns whether the cursor moved.
    pub fn move_by(&mut self, snapshot: &ListingSnapshot, delta: isize) -> bool {
        if snapshot.is_empty() {
            self.current = None;
            return false;
        }
        let last = snapshot.len() - 1;
        let current = self.index(snapshot).unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(last);
        self.seat(snapshot, next)
    }

    pub fn move_first(&mut self, snapshot: &ListingSnapshot) -> bool {
        self.seat(snapshot, 0)
    }

    pub fn move_last(&mut self, snapshot: &ListingSnapshot) -> bool {
        self.seat(snapshot, snapshot.len().saturating_sub(1))
    }

    pub fn move_to(&mut self, snapshot: &ListingSnapshot, identity: &Path) -> PaneResult<()> {
        if !snapshot.contains(identity) {
            return Err(PaneError::StaleReference(identity.to_path_buf()));
        }
        self.current = Some(identity.to_path_buf());
        Ok(())
    }

    fn seat(&mut self, snapshot: &ListingSnapshot, idx: usize) -> bool {
        let next = snapshot.get(idx).map(|e| e.path.clone());
        let moved = next != self.current;
        self.current = next;
        moved
    }
}
