#![forbid(unsafe_code)]

//! Two panes, one active, and the command surface the key map drives.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::PaneResult;
use crate::model::{CursorMove, Entry, PaneId, SortMode};
use crate::pane::Pane;
use crate::reader::DirectoryReader;
use crate::snapshot::ListingOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    Listing(PaneId),
    Selection(PaneId),
    Cursor(PaneId),
    ActivePane(PaneId),
}

/// Receives a notification whenever pane state changes.
pub trait PresentationSink {
    fn notify(&mut self, event: ViewEvent);
}

#[derive(Debug, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn notify(&mut self, _event: ViewEvent) {}
}

pub struct DualPaneController {
    left: Pane,
    right: Pane,
    active: PaneId,
    reader: Box<dyn DirectoryReader>,
    sink: Box<dyn PresentationSink>,
}

impl DualPaneController {
    /// Nothing is read until `refresh_all` or a navigation.
    pub fn new(
        left_dir: PathBuf,
        right_dir: PathBuf,
        options: ListingOptions,
        reader: Box<dyn DirectoryReader>,
        sink: Box<dyn PresentationSink>,
    ) -> Self {
        Self {
            left: Pane::new(left_dir, options),
            right: Pane::new(right_dir, options),
            active: PaneId::Left,
            reader,
            sink,
        }
    }

    pub fn pane(&self, id: PaneId) -> &Pane {
        match id {
            PaneId::Left => &self.left,
            PaneId::Right => &self.right,
        }
    }

    fn pane_mut(&mut self, id: PaneId) -> &mut Pane {
        match id {
            PaneId::Left => &mut self.left,
            PaneId::Right => &mut self.right,
        }
    }

    fn parts(&mut self, id: PaneId) -> (&mut Pane, &dyn DirectoryReader) {
        let pane = match id {
            PaneId::Left => &mut self.left,
            PaneId::Right => &mut self.right,
        };
        (pane, self.reader.as_ref())
    }

    pub fn active_pane(&self) -> PaneId {
        self.active
    }

    pub fn opposite_pane(&self, id: PaneId) -> PaneId {
        id.opposite()
    }

    /// Activating a pane wipes the other pane's selection, so only one
    /// selection is ever live for file operations.
    pub fn set_active_pane(&mut self, id: PaneId) {
        let other = id.opposite();
        if !self.pane(other).selection().is_empty() {
            self.pane_mut(other).selection_mut().clear();
            self.sink.notify(ViewEvent::Selection(other));
        }
        if self.active != id {
            debug!(pane = id.label(), "active pane changed");
            self.active = id;
            self.sink.notify(ViewEvent::ActivePane(id));
        }
    }

    pub fn switch_pane(&mut self) {
        self.set_active_pane(self.active.opposite());
    }

    pub fn navigate(&mut self, id: PaneId, raw: &str) -> PaneResult<()> {
        let (pane, reader) = self.parts(id);
        let result = pane.navigate(reader, raw);
        self.after_load(id, "navigate", result)
    }

    pub fn navigate_to(&mut self, id: PaneId, dir: &Path) -> PaneResult<()> {
        let (pane, reader) = self.parts(id);
        let result = pane.navigate_to(reader, dir);
        self.after_load(id, "navigate", result)
    }

    pub fn go_up(&mut self, id: PaneId) -> PaneResult<bool> {
        let (pane, reader) = self.parts(id);
        match pane.go_up(reader) {
            Ok(true) => self.after_load(id, "go up", Ok(())).map(|()| true),
            Ok(false) => Ok(false),
            Err(err) => self.after_load(id, "go up", Err(err)).map(|()| false),
        }
    }

    /// Enter the focused directory or archive. `Ok(false)` for plain files.
    pub fn enter(&mut self, id: PaneId) -> PaneResult<bool> {
        let (pane, reader) = self.parts(id);
        match pane.enter(reader) {
            Ok(true) => self.after_load(id, "enter", Ok(())).map(|()| true),
            Ok(false) => Ok(false),
            Err(err) => self.after_load(id, "enter", Err(err)).map(|()| false),
        }
    }

    pub fn refresh(&mut self, id: PaneId) -> PaneResult<()> {
        let (pane, reader) = self.parts(id);
        let result = pane.refresh(reader);
        self.after_load(id, "refresh", result)
    }

    /// Refreshes both panes even if the first fails; reports the first error.
    pub fn refresh_all(&mut self) -> PaneResult<()> {
        let left = self.refresh(PaneId::Left);
        let right = self.refresh(PaneId::Right);
        left.and(right)
    }

    pub fn move_cursor(&mut self, id: PaneId, movement: CursorMove) {
        if self.pane_mut(id).move_cursor(movement) {
            self.sink.notify(ViewEvent::Cursor(id));
        }
    }

    pub fn move_cursor_to(&mut self, id: PaneId, identity: &Path) -> PaneResult<()> {
        self.pane_mut(id).move_cursor_to(identity)?;
        self.sink.notify(ViewEvent::Cursor(id));
        Ok(())
    }

    /// No-op when the cursor is unset. Returns the new membership.
    pub fn toggle_selection_at_cursor(&mut self, id: PaneId) -> Option<bool> {
        let selected = self.pane_mut(id).toggle_at_cursor()?;
        debug!(pane = id.label(), selected, "selection toggled");
        self.sink.notify(ViewEvent::Selection(id));
        Some(selected)
    }

    pub fn select_all(&mut self, id: PaneId) {
        self.pane_mut(id).select_all();
        self.sink.notify(ViewEvent::Selection(id));
    }

    pub fn clear_selection(&mut self, id: PaneId) {
        self.pane_mut(id).selection_mut().clear();
        self.sink.notify(ViewEvent::Selection(id));
    }

    pub fn invert_selection(&mut self, id: PaneId) {
        self.pane_mut(id).invert_selection();
        self.sink.notify(ViewEvent::Selection(id));
    }

    pub fn deselect(&mut self, id: PaneId, identities: &[PathBuf]) {
        let selection = self.pane_mut(id).selection_mut();
        let mut changed = false;
        for identity in identities {
            changed |= selection.deselect(identity);
        }
        if changed {
            self.sink.notify(ViewEvent::Selection(id));
        }
    }

    /// Entries a file operation on `id` should act on: the live selection,
    /// or the focused entry when nothing live is selected.
    pub fn resolve_action_targets(&self, id: PaneId) -> Vec<Entry> {
        self.pane(id).action_targets()
    }

    /// Copy/move destination for operations started in `id`.
    pub fn destination_dir(&self, id: PaneId) -> Option<PathBuf> {
        self.pane(self.opposite_pane(id))
            .location()
            .local_dir()
            .map(Path::to_path_buf)
    }

    pub fn set_filter(&mut self, id: PaneId, filter: Option<String>) -> PaneResult<()> {
        let (pane, reader) = self.parts(id);
        let result = pane.set_filter(reader, filter);
        self.after_load(id, "filter", result)
    }

    pub fn set_sort_mode(&mut self, id: PaneId, sort_mode: SortMode) -> PaneResult<()> {
        let (pane, reader) = self.parts(id);
        let result = pane.set_sort_mode(reader, sort_mode);
        self.after_load(id, "sort", result)
    }

    pub fn set_show_hidden(&mut self, show_hidden: bool) -> PaneResult<()> {
        let mut first_err = Ok(());
        for id in [PaneId::Left, PaneId::Right] {
            let (pane, reader) = self.parts(id);
            let options = ListingOptions {
                show_hidden,
                ..pane.options()
            };
            let result = pane.set_options(reader, options);
            let result = self.after_load(id, "show hidden", result);
            if first_err.is_ok() {
                first_err = result;
            }
        }
        first_err
    }

    fn after_load(&mut self, id: PaneId, action: &str, result: PaneResult<()>) -> PaneResult<()> {
        match &result {
            Ok(()) => {
                let location = self.pane(id).location().display();
                debug!(pane = id.label(), action, %location, "listing replaced");
                self.sink.notify(ViewEvent::Listing(id));
            }
            Err(err) => warn!(pane = id.label(), action, "pane unchanged: {err}"),
        }
        result
    }
}
