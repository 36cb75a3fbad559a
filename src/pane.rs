#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use crate::cursor::FocusCursor;
use crate::error::PaneResult;
use crate::model::{CursorMove, Entry, Location, SortMode};
use crate::reader::DirectoryReader;
use crate::resolver;
use crate::selection::SelectionSet;
use crate::snapshot::{self, ListingOptions, ListingSnapshot};
use crate::vfs::{zip_child_prefix, zip_parent_prefix};

#[derive(Debug)]
pub struct Pane {
    snapshot: ListingSnapshot,
    selection: SelectionSet,
    cursor: FocusCursor,
    options: ListingOptions,
    filter: Option<String>,
}

impl Pane {
    /// A pane parked at `dir` with nothing loaded yet. `dir` is normalized
    /// lexically so its entries get the same identities a later navigation
    /// would give them.
    pub fn new(dir: PathBuf, options: ListingOptions) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        let dir = resolver::normalize_path(&dir, &cwd);
        Self {
            snapshot: ListingSnapshot::empty(Location::Local(dir)),
            selection: SelectionSet::new(),
            cursor: FocusCursor::default(),
            options,
            filter: None,
        }
    }

    pub fn location(&self) -> &Location {
        self.snapshot.location()
    }

    pub fn snapshot(&self) -> &ListingSnapshot {
        &self.snapshot
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionSet {
        &mut self.selection
    }

    pub fn cursor(&self) -> &FocusCursor {
        &self.cursor
    }

    pub fn options(&self) -> ListingOptions {
        self.options
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn focused_entry(&self) -> Option<&Entry> {
        self.cursor.current().and_then(|id| self.snapshot.entry(id))
    }

    /// Replace the snapshot with a fresh read of `location`. On error the
    /// pane keeps its previous snapshot and cursor.
    pub fn load(&mut self, reader: &dyn DirectoryReader, location: Location) -> PaneResult<()> {
        let snapshot = snapshot::build(reader, &location, &self.options, self.filter.as_deref())?;
        self.snapshot = snapshot;
        self.cursor.reset(&self.snapshot);
        Ok(())
    }

    pub fn refresh(&mut self, reader: &dyn DirectoryReader) -> PaneResult<()> {
        let location = self.location().clone();
        self.load(reader, location)
    }

    pub fn navigate(&mut self, reader: &dyn DirectoryReader, raw: &str) -> PaneResult<()> {
        let base = self.location().base_dir();
        let dir = resolver::resolve_dir(raw, &base)?;
        self.load(reader, Location::Local(dir))
    }

    /// Navigate to an already-built path, which need not be valid UTF-8.
    pub fn navigate_to(&mut self, reader: &dyn DirectoryReader, dir: &Path) -> PaneResult<()> {
        let base = self.location().base_dir();
        let dir = resolver::resolve_dir_path(dir, &base)?;
        self.load(reader, Location::Local(dir))
    }

    /// Returns `false` when already at the top.
    pub fn go_up(&mut self, reader: &dyn DirectoryReader) -> PaneResult<bool> {
        let next = match self.location() {
            Location::Archive { archive, prefix } => match zip_parent_prefix(prefix) {
                Some(parent) => Location::Archive {
                    archive: archive.clone(),
                    prefix: parent,
                },
                None => Location::Local(self.location().base_dir()),
            },
            Location::Local(dir) => match dir.parent() {
                Some(parent) => Location::Local(parent.to_path_buf()),
                None => return Ok(false),
            },
        };
        self.load(reader, next)?;
        Ok(true)
    }

    /// Open the focused entry: descend into a directory or a zip archive.
    /// Returns `false` for plain files.
    pub fn enter(&mut self, reader: &dyn DirectoryReader) -> PaneResult<bool> {
        let Some(entry) = self.focused_entry() else {
            return Ok(false);
        };
        let next = match self.location() {
            Location::Archive { archive, prefix } if entry.is_dir => Location::Archive {
                archive: archive.clone(),
                prefix: zip_child_prefix(prefix, &entry.name),
            },
            Location::Archive { .. } => return Ok(false),
            Location::Local(_) if entry.is_dir => Location::Local(entry.path.clone()),
            Location::Local(_) if entry.is_archive() => Location::Archive {
                archive: entry.path.clone(),
                prefix: String::new(),
            },
            Location::Local(_) => return Ok(false),
        };
        self.load(reader, next)?;
        Ok(true)
    }

    pub fn move_cursor(&mut self, movement: CursorMove) -> bool {
        let snap = &self.snapshot;
        match movement {
            CursorMove::Up => self.cursor.move_up(snap),
            CursorMove::Down => self.cursor.move_down(snap),
            CursorMove::PageUp(page) => self.cursor.move_by(snap, -(page.max(1) as isize)),
            CursorMove::PageDown(page) => self.cursor.move_by(snap, page.max(1) as isize),
            CursorMove::First => self.cursor.move_first(snap),
            CursorMove::Last => self.cursor.move_last(snap),
        }
    }

    pub fn move_cursor_to(&mut self, identity: &Path) -> PaneResult<()> {
        self.cursor.move_to(&self.snapshot, identity)
    }

    /// `None` when the cursor is unset, otherwise the new membership.
    pub fn toggle_at_cursor(&mut self) -> Option<bool> {
        let identity = self.cursor.current()?.to_path_buf();
        Some(self.selection.toggle(&identity))
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.snapshot);
    }

    pub fn invert_selection(&mut self) {
        self.selection.invert(&self.snapshot);
    }

    /// Explicit selection if any of it is live, else the focused entry.
    pub fn action_targets(&self) -> Vec<Entry> {
        let selected = self.selection.materialize(&self.snapshot);
        if !selected.is_empty() {
            return selected.into_iter().cloned().collect();
        }
        self.focused_entry().cloned().into_iter().collect()
    }

    pub fn set_filter(&mut self, reader: &dyn DirectoryReader, filter: Option<String>) -> PaneResult<()> {
        let previous = std::mem::replace(&mut self.filter, filter.filter(|f| !f.is_empty()));
        let result = self.refresh(reader);
        if result.is_err() {
            self.filter = previous;
        }
        result
    }

    pub fn set_options(&mut self, reader: &dyn DirectoryReader, options: ListingOptions) -> PaneResult<()> {
        let previous = std::mem::replace(&mut self.options, options);
        let result = self.refresh(reader);
        if result.is_err() {
            self.options = previous;
        }
        result
    }

    pub fn set_sort_mode(&mut self, reader: &dyn DirectoryReader, sort_mode: SortMode) -> PaneResult<()> {
        let options = ListingOptions {
            sort_mode,
            ..self.options
        };
        self.set_options(reader, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaneError;
    use crate::reader::LocalReader;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        File::create(tmp.path().join("a.txt")).unwrap();
        fs::create_dir(tmp.path().join("b")).unwrap();
        File::create(tmp.path().join("b").join("inner.txt")).unwrap();
        File::create(tmp.path().join("c.txt")).unwrap();
        tmp
    }

    fn loaded(tmp: &TempDir) -> Pane {
        let mut pane = Pane::new(tmp.path().to_path_buf(), ListingOptions::default());
        pane.refresh(&LocalReader).unwrap();
        pane
    }

    #[test]
    fn new_pane_is_empty_until_loaded() {
        let tmp = tree();
        let pane = Pane::new(tmp.path().to_path_buf(), ListingOptions::default());
        assert!(pane.snapshot().is_empty());
        assert!(pane.cursor().current().is_none());
        assert!(pane.action_targets().is_empty());
    }

    #[test]
    fn refresh_resets_cursor_to_first() {
        let tmp = tree();
        let mut pane = loaded(&tmp);
        pane.move_cursor(CursorMove::Last);
        assert_eq!(pane.focused_entry().unwrap().name, "c.txt");
        pane.refresh(&LocalReader).unwrap();
        assert_eq!(pane.focused_entry().unwrap().name, "a.txt");
    }

    #[test]
    fn failed_navigation_keeps_state() {
        let tmp = tree();
        let mut pane = loaded(&tmp);
        pane.move_cursor(CursorMove::Down);
        let before = pane.cursor().clone();

        let err = pane.navigate(&LocalReader, "does-not-exist").unwrap_err();
        assert!(matches!(err, PaneError::NotFound(_)));
        assert_eq!(pane.location(), &Location::Local(tmp.path().to_path_buf()));
        assert_eq!(pane.cursor(), &before);
    }

    #[test]
    fn dotted_start_dir_keeps_selection_across_reload() {
        let tmp = tree();
        let dotted = tmp.path().join("b").join("..").join(".");
        let mut pane = Pane::new(dotted, ListingOptions::default());
        assert_eq!(pane.location(), &Location::Local(tmp.path().to_path_buf()));

        pane.refresh(&LocalReader).unwrap();
        pane.toggle_at_cursor();
        pane.navigate(&LocalReader, ".").unwrap();
        let selected = pane.selection().materialize(pane.snapshot());
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].path, tmp.path().join("a.txt"));
    }

    #[test]
    fn navigate_to_takes_paths() {
        let tmp = tree();
        let mut pane = loaded(&tmp);
        pane.navigate_to(&LocalReader, &tmp.path().join("b").join(".")).unwrap();
        assert_eq!(pane.location(), &Location::Local(tmp.path().join("b")));

        let err = pane.navigate_to(&LocalReader, &tmp.path().join("a.txt")).unwrap_err();
        assert!(matches!(err, PaneError::NotADirectory(_)));
        assert_eq!(pane.location(), &Location::Local(tmp.path().join("b")));
    }

    #[test]
    fn enter_and_go_up() {
        let tmp = tree();
        let mut pane = loaded(&tmp);
        pane.move_cursor(CursorMove::Down);
        assert!(pane.enter(&LocalReader).unwrap());
        assert_eq!(pane.location(), &Location::Local(tmp.path().join("b")));
        assert_eq!(pane.focused_entry().unwrap().name, "inner.txt");

        // Plain files are not entered.
        assert!(!pane.enter(&LocalReader).unwrap());

        assert!(pane.go_up(&LocalReader).unwrap());
        assert_eq!(pane.location(), &Location::Local(tmp.path().to_path_buf()));
    }

    #[test]
    fn go_up_at_root_is_a_no_op() {
        let mut pane = Pane::new(PathBuf::from("/"), ListingOptions::default());
        assert!(!pane.go_up(&LocalReader).unwrap());
    }

    #[test]
    fn archive_round_trip() {
        let tmp = TempDir::new().unwrap();
        let zip_path = tmp.path().join("bundle.zip");
        crate::vfs::tests::write_sample_zip(&zip_path);
        let mut pane = loaded(&tmp);
        assert_eq!(pane.focused_entry().unwrap().name, "bundle.zip");

        assert!(pane.enter(&LocalReader).unwrap());
        assert!(pane.location().is_archive());
        assert_eq!(pane.focused_entry().unwrap().name, "docs");

        assert!(pane.enter(&LocalReader).unwrap());
        assert_eq!(pane.focused_entry().unwrap().name, "guide.md");
        assert_eq!(
            pane.focused_entry().unwrap().path,
            zip_path.join("docs").join("guide.md")
        );

        assert!(pane.go_up(&LocalReader).unwrap());
        assert!(pane.location().is_archive());
        assert!(pane.go_up(&LocalReader).unwrap());
        assert_eq!(pane.location(), &Location::Local(tmp.path().to_path_buf()));
    }

    #[test]
    fn filter_narrows_and_clears() {
        let tmp = tree();
        let mut pane = loaded(&tmp);
        pane.set_filter(&LocalReader, Some("TXT".to_string())).unwrap();
        let names: Vec<&str> = pane.snapshot().entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "c.txt"]);

        pane.set_filter(&LocalReader, Some(String::new())).unwrap();
        assert_eq!(pane.filter(), None);
        assert_eq!(pane.snapshot().len(), 3);
    }

    #[test]
    fn sort_mode_change_reorders() {
        let tmp = tree();
        let mut pane = loaded(&tmp);
        pane.set_sort_mode(&LocalReader, SortMode::NameDesc).unwrap();
        assert_eq!(pane.snapshot().first().unwrap().name, "c.txt");
        assert_eq!(pane.options().sort_mode, SortMode::NameDesc);
    }
}
