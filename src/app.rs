#![forbid(unsafe_code)]

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, warn};

use crate::config::Config;
use crate::controller::DualPaneController;
use crate::fs_ops::{self, FileOps};
use crate::keymap;
use crate::model::{CursorMove, Entry, PaneId};
use crate::plugin::{CommandRegistry, PluginContext};
use crate::resolver;

const QUICK_SEARCH_TIMEOUT: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveCursor(CursorMove),
    GoUp,
    Enter,
    /// Shortens the quick search if one is active, otherwise goes up.
    Backspace,
    SwitchPane,
    ToggleSelection,
    SelectAll,
    ClearSelection,
    InvertSelection,
    Refresh,
    Copy,
    Move,
    Delete,
    MakeDirectory,
    View,
    Edit,
    ToggleHidden,
    ToggleTheme,
    CycleSort,
    GoTo,
    Filter,
    RunPlugin,
    QuickSearch(char),
    Escape,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingPrompt {
    MakeDirectory { base: PathBuf },
    GoTo,
    Filter,
    RunPlugin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingConfirm {
    Delete { sources: Vec<PathBuf> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Prompt {
        title: String,
        value: String,
        action: PendingPrompt,
    },
    Confirm {
        message: String,
        action: PendingConfirm,
    },
}

/// What the front end has to do after a key was handled.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
    /// Suspend the terminal and run `program` on `paths`.
    External { program: String, paths: Vec<PathBuf> },
}

#[derive(Debug, Clone, Copy)]
enum Transfer {
    Copy,
    Move,
}

#[derive(Debug, Clone, Copy)]
enum External {
    View,
    Edit,
}

pub struct App {
    controller: DualPaneController,
    file_ops: Box<dyn FileOps>,
    config: Config,
    config_path: Option<PathBuf>,
    plugins: CommandRegistry,
    status: String,
    modal: Option<Modal>,
    quick_search: Option<String>,
    quick_search_time: Option<Instant>,
}

impl App {
    pub fn new(
        controller: DualPaneController,
        file_ops: Box<dyn FileOps>,
        config: Config,
        config_path: Option<PathBuf>,
        plugins: CommandRegistry,
    ) -> Self {
        Self {
            controller,
            file_ops,
            config,
            config_path,
            plugins,
            status: String::from("Ready"),
            modal: None,
            quick_search: None,
            quick_search_time: None,
        }
    }

    pub fn controller(&self) -> &DualPaneController {
        &self.controller
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn quick_search(&self) -> Option<&str> {
        self.quick_search.as_deref()
    }

    pub fn handle_key(&mut self, key: &KeyEvent, page: usize) -> Outcome {
        if key.kind != KeyEventKind::Press {
            return Outcome::Continue;
        }
        debug!(code = ?key.code, modifiers = ?key.modifiers, "key");
        if let Some(modal) = self.modal.take() {
            self.handle_modal_key(key, modal);
            return Outcome::Continue;
        }
        match keymap::command_for(key, page) {
            Some(command) => self.execute(command),
            None => Outcome::Continue,
        }
    }

    pub fn execute(&mut self, command: Command) -> Outcome {
        let active = self.controller.active_pane();
        match command {
            Command::Quit => return Outcome::Quit,
            Command::MoveCursor(movement) => self.controller.move_cursor(active, movement),
            Command::GoUp => self.go_up(active),
            Command::Backspace => {
                if !self.pop_quick_search() {
                    self.go_up(active);
                }
            }
            Command::Enter => match self.controller.enter(active) {
                Ok(true) => self.reset_quick_search(),
                Ok(false) => return self.view_focused(active),
                Err(err) => self.status = format!("Open failed: {err}"),
            },
            Command::SwitchPane => self.controller.switch_pane(),
            Command::ToggleSelection => {
                self.controller.toggle_selection_at_cursor(active);
                self.selection_status(active);
            }
            Command::SelectAll => {
                self.controller.select_all(active);
                self.selection_status(active);
            }
            Command::ClearSelection => {
                self.controller.clear_selection(active);
                self.selection_status(active);
            }
            Command::InvertSelection => {
                self.controller.invert_selection(active);
                self.selection_status(active);
            }
            Command::Refresh => match self.controller.refresh_all() {
                Ok(()) => self.status = "Refreshed".to_string(),
                Err(err) => self.status = format!("Refresh failed: {err}"),
            },
            Command::Copy => self.transfer(Transfer::Copy),
            Command::Move => self.transfer(Transfer::Move),
            Command::Delete => self.begin_delete(),
            Command::MakeDirectory => self.begin_mkdir(),
            Command::View => return self.open_external(External::View),
            Command::Edit => return self.open_external(External::Edit),
            Command::ToggleHidden => self.toggle_hidden(),
            Command::ToggleTheme => self.toggle_theme(),
            Command::CycleSort => {
                let mode = self.controller.pane(active).options().sort_mode.cycle();
                match self.controller.set_sort_mode(active, mode) {
                    Ok(()) => self.status = format!("Sort: {}", mode.label()),
                    Err(err) => self.status = format!("Sort failed: {err}"),
                }
            }
            Command::GoTo => {
                self.modal = Some(Modal::Prompt {
                    title: "Go to".to_string(),
                    value: String::new(),
                    action: PendingPrompt::GoTo,
                });
            }
            Command::Filter => {
                let current = self.controller.pane(active).filter().unwrap_or_default();
                self.modal = Some(Modal::Prompt {
                    title: "Filter".to_string(),
                    value: current.to_string(),
                    action: PendingPrompt::Filter,
                });
            }
            Command::RunPlugin => self.begin_plugin(),
            Command::QuickSearch(ch) => self.handle_quick_search_char(ch),
            Command::Escape => self.escape(active),
        }
        Outcome::Continue
    }

    /// Called by the front end once an external program has exited.
    pub fn external_finished(&mut self, program: &str, result: io::Result<()>) {
        match result {
            Ok(()) => self.status = format!("{program} closed"),
            Err(err) => {
                warn!(program, "external program failed: {err}");
                self.status = format!("{program} failed: {err}");
            }
        }
        if let Err(err) = self.controller.refresh_all() {
            warn!("refresh after external program failed: {err}");
        }
    }

    fn go_up(&mut self, active: PaneId) {
        match self.controller.go_up(active) {
            Ok(_) => self.reset_quick_search(),
            Err(err) => self.status = format!("Up failed: {err}"),
        }
    }

    fn selection_status(&mut self, id: PaneId) {
        let pane = self.controller.pane(id);
        let live = pane.selection().materialize(pane.snapshot()).len();
        let bytes = pane.selection().total_size(pane.snapshot());
        self.status = if live == 0 {
            "Ready".to_string()
        } else {
            format!("{live} selected, {bytes} bytes")
        };
    }

    fn target_paths(&self, id: PaneId) -> Vec<PathBuf> {
        self.controller
            .resolve_action_targets(id)
            .into_iter()
            .map(|entry| entry.path)
            .collect()
    }

    fn transfer(&mut self, kind: Transfer) {
        let active = self.controller.active_pane();
        let (verb, done_verb) = match kind {
            Transfer::Copy => ("Copy", "Copied"),
            Transfer::Move => ("Move", "Moved"),
        };
        if self.controller.pane(active).location().is_archive() {
            self.status = format!("{verb} from archive not supported");
            return;
        }
        let Some(dest) = self.controller.destination_dir(active) else {
            self.status = format!("{verb} into archive not supported");
            return;
        };
        let sources = self.target_paths(active);
        if sources.is_empty() {
            self.status = "No file selected".to_string();
            return;
        }
        let report = match kind {
            Transfer::Copy => fs_ops::copy_all(self.file_ops.as_ref(), &sources, &dest),
            Transfer::Move => fs_ops::move_all(self.file_ops.as_ref(), &sources, &dest),
        };
        debug!(?kind, done = report.done.len(), failed = report.failed.len(), "transfer finished");
        self.controller.deselect(active, &report.done);
        self.refresh_after_change();
        self.status = report.summary(done_verb);
    }

    fn begin_delete(&mut self) {
        let active = self.controller.active_pane();
        if self.controller.pane(active).location().is_archive() {
            self.status = "Delete in archive not supported".to_string();
            return;
        }
        let targets = self.controller.resolve_action_targets(active);
        let label = match targets.as_slice() {
            [] => {
                self.status = "No file selected".to_string();
                return;
            }
            [single] => single.name.clone(),
            many => format!("{} items", many.len()),
        };
        self.modal = Some(Modal::Confirm {
            message: format!("Delete {label}? (y/n)"),
            action: PendingConfirm::Delete {
                sources: targets.into_iter().map(|e| e.path).collect(),
            },
        });
    }

    fn begin_mkdir(&mut self) {
        let active = self.controller.active_pane();
        let Some(base) = self.controller.pane(active).location().local_dir() else {
            self.status = "Mkdir in archive not supported".to_string();
            return;
        };
        self.modal = Some(Modal::Prompt {
            title: "Make directory".to_string(),
            value: "new_folder".to_string(),
            action: PendingPrompt::MakeDirectory {
                base: base.to_path_buf(),
            },
        });
    }

    fn begin_plugin(&mut self) {
        if self.plugins.is_empty() {
            self.status = "No plugin commands enabled".to_string();
            return;
        }
        let listed: Vec<String> = self
            .plugins
            .commands()
            .map(|(name, label)| format!("{name}: {label}"))
            .collect();
        self.modal = Some(Modal::Prompt {
            title: format!("Plugin command ({})", listed.join(", ")),
            value: String::new(),
            action: PendingPrompt::RunPlugin,
        });
    }

    fn open_external(&mut self, kind: External) -> Outcome {
        let active = self.controller.active_pane();
        if self.controller.pane(active).location().is_archive() {
            self.status = "Cannot open files inside an archive".to_string();
            return Outcome::Continue;
        }
        let targets = self.controller.resolve_action_targets(active);
        if targets.is_empty() {
            self.status = "No file selected".to_string();
            return Outcome::Continue;
        }
        let paths: Vec<PathBuf> = targets
            .into_iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.path)
            .collect();
        if paths.is_empty() {
            self.status = "Cannot open directory".to_string();
            return Outcome::Continue;
        }
        Self::hand_off(kind, paths)
    }

    /// Enter on a plain file views that file alone, whatever is selected.
    fn view_focused(&mut self, active: PaneId) -> Outcome {
        let pane = self.controller.pane(active);
        let path = match pane.focused_entry() {
            Some(entry) if !entry.is_dir => entry.path.clone(),
            _ => return Outcome::Continue,
        };
        if pane.location().is_archive() {
            self.status = "Cannot open files inside an archive".to_string();
            return Outcome::Continue;
        }
        Self::hand_off(External::View, vec![path])
    }

    fn hand_off(kind: External, paths: Vec<PathBuf>) -> Outcome {
        let (var, fallback) = match kind {
            External::View => ("PAGER", "less"),
            External::Edit => ("EDITOR", "nano"),
        };
        let program = std::env::var(var).unwrap_or_else(|_| fallback.to_string());
        debug!(%program, count = paths.len(), "handing files to external program");
        Outcome::External { program, paths }
    }

    fn toggle_hidden(&mut self) {
        let show_hidden = !self.config.listing.show_hidden;
        match self.controller.set_show_hidden(show_hidden) {
            Ok(()) => {
                self.config.listing.show_hidden = show_hidden;
                self.status = if show_hidden {
                    "Showing hidden files".to_string()
                } else {
                    "Hiding hidden files".to_string()
                };
            }
            Err(err) => self.status = format!("Refresh failed: {err}"),
        }
    }

    fn toggle_theme(&mut self) {
        let mode = self.config.toggle_theme().to_string();
        self.status = format!("Theme: {mode}");
        if let Some(path) = &self.config_path {
            if let Err(err) = self.config.save_to(path) {
                warn!("saving config failed: {err:#}");
                self.status = format!("Theme: {mode} (not saved: {err})");
            }
        }
    }

    fn escape(&mut self, active: PaneId) {
        if self.quick_search.is_some() {
            self.reset_quick_search();
            self.status = "Ready".to_string();
            return;
        }
        if self.controller.pane(active).filter().is_some() {
            match self.controller.set_filter(active, None) {
                Ok(()) => self.status = "Filter cleared".to_string(),
                Err(err) => self.status = format!("Filter failed: {err}"),
            }
        }
    }

    fn handle_quick_search_char(&mut self, ch: char) {
        if let Some(last_time) = self.quick_search_time {
            if last_time.elapsed() > QUICK_SEARCH_TIMEOUT {
                self.quick_search = None;
            }
        }
        let search = self.quick_search.get_or_insert_with(String::new);
        search.extend(ch.to_lowercase());
        self.quick_search_time = Some(Instant::now());
        self.status = format!("Quick search: {search}");
        self.do_quick_search();
    }

    /// Returns `false` when no quick search was active.
    fn pop_quick_search(&mut self) -> bool {
        let Some(search) = self.quick_search.as_mut() else {
            return false;
        };
        search.pop();
        if search.is_empty() {
            self.reset_quick_search();
            self.status = "Ready".to_string();
        } else {
            self.quick_search_time = Some(Instant::now());
            self.status = format!("Quick search: {search}");
            self.do_quick_search();
        }
        true
    }

    fn reset_quick_search(&mut self) {
        self.quick_search = None;
        self.quick_search_time = None;
    }

    fn do_quick_search(&mut self) {
        let Some(search) = self.quick_search.as_deref() else {
            return;
        };
        let active = self.controller.active_pane();
        let found = self
            .controller
            .pane(active)
            .snapshot()
            .entries()
            .iter()
            .find(|e| e.name.to_lowercase().starts_with(search))
            .map(|e| e.identity().to_path_buf());
        if let Some(identity) = found {
            if let Err(err) = self.controller.move_cursor_to(active, &identity) {
                debug!("quick search target vanished: {err}");
            }
        }
    }

    fn handle_modal_key(&mut self, key: &KeyEvent, mut modal: Modal) {
        match &mut modal {
            Modal::Prompt { value, action, .. } => match key.code {
                KeyCode::Esc => self.status = "Cancelled".to_string(),
                KeyCode::Enter => {
                    let input = std::mem::take(value);
                    let action = action.clone();
                    self.execute_prompt(action, input);
                    return;
                }
                KeyCode::Backspace => {
                    value.pop();
                    self.modal = Some(modal);
                }
                KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    value.clear();
                    self.modal = Some(modal);
                }
                KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    value.push(ch);
                    self.modal = Some(modal);
                }
                _ => self.modal = Some(modal),
            },
            Modal::Confirm { action, .. } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    let action = action.clone();
                    self.execute_confirm(action);
                }
                _ => self.status = "Cancelled".to_string(),
            },
        }
    }

    fn execute_prompt(&mut self, action: PendingPrompt, input: String) {
        let active = self.controller.active_pane();
        match action {
            PendingPrompt::MakeDirectory { base } => {
                let name = input.trim();
                if name.is_empty() {
                    self.status = "Cancelled".to_string();
                    return;
                }
                let path = base.join(name);
                if let Err(err) = self.file_ops.make_directory(&path) {
                    self.status = format!("Mkdir failed: {err}");
                    return;
                }
                self.status = format!("Created {}", path.display());
                self.refresh_after_change();
                if self.controller.pane(active).snapshot().contains(&path) {
                    let _ = self.controller.move_cursor_to(active, &path);
                }
            }
            PendingPrompt::GoTo => self.go_to(active, input.trim()),
            PendingPrompt::Filter => match self.controller.set_filter(active, Some(input)) {
                Ok(()) => {
                    self.status = match self.controller.pane(active).filter() {
                        Some(filter) => format!("Filter: {filter}"),
                        None => "Filter cleared".to_string(),
                    };
                }
                Err(err) => self.status = format!("Filter failed: {err}"),
            },
            PendingPrompt::RunPlugin => self.run_plugin(active, input.trim()),
        }
    }

    fn execute_confirm(&mut self, action: PendingConfirm) {
        match action {
            PendingConfirm::Delete { sources } => {
                let active = self.controller.active_pane();
                let report = fs_ops::delete_all(self.file_ops.as_ref(), &sources);
                self.controller.deselect(active, &report.done);
                self.refresh_after_change();
                self.status = report.summary("Deleted");
            }
        }
    }

    /// Directories are entered; files open their parent with the cursor on them.
    fn go_to(&mut self, active: PaneId, raw: &str) {
        if raw.is_empty() {
            self.status = "Cancelled".to_string();
            return;
        }
        let base = self.controller.pane(active).location().base_dir();
        let target = match resolver::resolve_target(raw, &base) {
            Ok(target) => target,
            Err(err) => {
                self.status = format!("Go to failed: {err}");
                return;
            }
        };
        let (dir, focus) = if target.is_dir() {
            (target, None)
        } else {
            match target.parent() {
                Some(parent) => (parent.to_path_buf(), Some(target.clone())),
                None => (target, None),
            }
        };
        if let Err(err) = self.controller.navigate_to(active, &dir) {
            self.status = format!("Go to failed: {err}");
            return;
        }
        self.reset_quick_search();
        self.status = format!("Now in {}", dir.display());
        if let Some(focus) = focus {
            if let Err(err) = self.controller.move_cursor_to(active, &focus) {
                debug!("go to target not listed: {err}");
            }
        }
    }

    fn run_plugin(&mut self, active: PaneId, name: &str) {
        let targets: Vec<Entry> = self.controller.resolve_action_targets(active);
        let destination = self.controller.destination_dir(active);
        let ctx = PluginContext {
            pane: active,
            targets: &targets,
            destination: destination.as_deref(),
        };
        self.status = match self.plugins.run(name, &ctx) {
            Ok(message) => message,
            Err(err) => format!("Plugin failed: {err}"),
        };
    }

    fn refresh_after_change(&mut self) {
        if let Err(err) = self.controller.refresh_all() {
            warn!("refresh after file operation failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::NullSink;
    use crate::fs_ops::LocalFileOps;
    use crate::plugin::builtin_plugins;
    use crate::reader::LocalReader;
    use std::fs::{self, File};
    use tempfile::TempDir;

    /// Left pane on `src` (`a.txt`, `b.txt`, `c/`), right pane on `dst`.
    fn setup() -> (TempDir, App) {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(src.join("c")).unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(src.join("a.txt"), b"alpha").unwrap();
        fs::write(src.join("b.txt"), b"bravo").unwrap();

        let config = Config::default();
        let mut controller = DualPaneController::new(
            src,
            dst,
            config.listing_options(),
            Box::new(LocalReader),
            Box::new(NullSink),
        );
        controller.refresh_all().unwrap();
        let plugins = CommandRegistry::from_manifest(
            builtin_plugins(),
            &["sample".to_string(), "selection-info".to_string()],
        );
        let app = App::new(controller, Box::new(LocalFileOps), config, None, plugins);
        (tmp, app)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(&key(KeyCode::Char(ch)), 10);
        }
    }

    fn focused(app: &App) -> String {
        let active = app.controller().active_pane();
        app.controller()
            .pane(active)
            .focused_entry()
            .map(|e| e.name.clone())
            .unwrap_or_default()
    }

    #[test]
    fn copy_deselects_only_successful_items() {
        let (tmp, mut app) = setup();
        let dst = tmp.path().join("dst");
        fs::write(dst.join("b.txt"), b"existing").unwrap();

        app.handle_key(&key(KeyCode::Char(' ')), 10);
        app.handle_key(&key(KeyCode::Down), 10);
        app.handle_key(&key(KeyCode::Char(' ')), 10);
        assert_eq!(app.status(), "2 selected, 10 bytes");

        app.handle_key(&key(KeyCode::F(5)), 10);
        assert!(app.status().starts_with("Copied 1 item(s), 1 failed: b.txt"));
        assert_eq!(fs::read(dst.join("a.txt")).unwrap(), b"alpha");
        assert_eq!(fs::read(dst.join("b.txt")).unwrap(), b"existing");

        let selection = app.controller().pane(PaneId::Left).selection();
        assert!(!selection.is_selected(&tmp.path().join("src").join("a.txt")));
        assert!(selection.is_selected(&tmp.path().join("src").join("b.txt")));
        // The destination pane was refreshed.
        assert_eq!(app.controller().pane(PaneId::Right).snapshot().len(), 2);
    }

    #[test]
    fn move_falls_back_to_focused_entry() {
        let (tmp, mut app) = setup();
        app.handle_key(&key(KeyCode::F(6)), 10);
        assert_eq!(app.status(), "Moved 1 item(s)");
        assert!(!tmp.path().join("src").join("a.txt").exists());
        assert!(tmp.path().join("dst").join("a.txt").exists());
        assert_eq!(focused(&app), "b.txt");
    }

    #[test]
    fn delete_asks_first() {
        let (tmp, mut app) = setup();
        let a = tmp.path().join("src").join("a.txt");

        app.handle_key(&key(KeyCode::F(8)), 10);
        assert!(matches!(app.modal(), Some(Modal::Confirm { message, .. }) if message == "Delete a.txt? (y/n)"));
        app.handle_key(&key(KeyCode::Char('n')), 10);
        assert!(app.modal().is_none());
        assert_eq!(app.status(), "Cancelled");
        assert!(a.exists());

        app.handle_key(&key(KeyCode::F(8)), 10);
        app.handle_key(&key(KeyCode::Char('y')), 10);
        assert!(!a.exists());
        assert_eq!(app.status(), "Deleted 1 item(s)");
    }

    #[test]
    fn mkdir_prompt_creates_and_focuses() {
        let (tmp, mut app) = setup();
        app.handle_key(&key(KeyCode::F(7)), 10);
        app.handle_key(&ctrl('u'), 10);
        type_text(&mut app, "docs");
        app.handle_key(&key(KeyCode::Enter), 10);
        assert!(tmp.path().join("src").join("docs").is_dir());
        assert_eq!(focused(&app), "docs");
    }

    #[test]
    fn quick_search_jumps_and_backs_off() {
        let (_tmp, mut app) = setup();
        type_text(&mut app, "C");
        assert_eq!(focused(&app), "c");
        assert_eq!(app.quick_search(), Some("c"));

        app.handle_key(&key(KeyCode::Backspace), 10);
        assert_eq!(app.quick_search(), None);
        type_text(&mut app, "b.");
        assert_eq!(focused(&app), "b.txt");
        app.handle_key(&key(KeyCode::Esc), 10);
        assert_eq!(app.quick_search(), None);
    }

    #[test]
    fn go_to_file_focuses_it_in_its_parent() {
        let (tmp, mut app) = setup();
        File::create(tmp.path().join("dst").join("z.log")).unwrap();
        app.handle_key(&ctrl('g'), 10);
        type_text(&mut app, "../dst/z.log");
        app.handle_key(&key(KeyCode::Enter), 10);

        let left = app.controller().pane(PaneId::Left);
        assert_eq!(left.location().local_dir(), Some(tmp.path().join("dst").as_path()));
        assert_eq!(focused(&app), "z.log");
    }

    #[test]
    fn go_to_missing_path_keeps_pane() {
        let (tmp, mut app) = setup();
        app.handle_key(&ctrl('g'), 10);
        type_text(&mut app, "nowhere");
        app.handle_key(&key(KeyCode::Enter), 10);
        assert!(app.status().starts_with("Go to failed"));
        let left = app.controller().pane(PaneId::Left);
        assert_eq!(left.location().local_dir(), Some(tmp.path().join("src").as_path()));
    }

    #[test]
    fn filter_prompt_and_escape() {
        let (_tmp, mut app) = setup();
        app.handle_key(&ctrl('f'), 10);
        type_text(&mut app, "TXT");
        app.handle_key(&key(KeyCode::Enter), 10);
        assert_eq!(app.status(), "Filter: TXT");
        assert_eq!(app.controller().pane(PaneId::Left).snapshot().len(), 2);

        app.handle_key(&key(KeyCode::Esc), 10);
        assert_eq!(app.status(), "Filter cleared");
        assert_eq!(app.controller().pane(PaneId::Left).snapshot().len(), 3);
    }

    #[test]
    fn view_refuses_directories() {
        let (_tmp, mut app) = setup();
        app.execute(Command::MoveCursor(CursorMove::Last));
        assert_eq!(focused(&app), "c");
        assert_eq!(app.execute(Command::View), Outcome::Continue);
        assert_eq!(app.status(), "Cannot open directory");

        app.execute(Command::MoveCursor(CursorMove::First));
        match app.execute(Command::Edit) {
            Outcome::External { paths, .. } => {
                assert_eq!(paths.len(), 1);
                assert!(paths[0].ends_with("a.txt"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn enter_opens_directories_and_views_files() {
        let (_tmp, mut app) = setup();
        app.execute(Command::MoveCursor(CursorMove::Last));
        assert_eq!(app.execute(Command::Enter), Outcome::Continue);
        assert!(app.controller().pane(PaneId::Left).snapshot().is_empty());
        app.execute(Command::GoUp);
        assert!(matches!(app.execute(Command::Enter), Outcome::External { .. }));
    }

    #[test]
    fn enter_views_the_focused_file_not_the_selection() {
        let (tmp, mut app) = setup();
        app.execute(Command::ToggleSelection);
        app.execute(Command::MoveCursor(CursorMove::Down));
        assert_eq!(focused(&app), "b.txt");

        match app.execute(Command::Enter) {
            Outcome::External { paths, .. } => {
                assert_eq!(paths, [tmp.path().join("src").join("b.txt")]);
            }
            other => panic!("expected a hand-off, got {other:?}"),
        }
        // View still works on the selection.
        match app.execute(Command::View) {
            Outcome::External { paths, .. } => {
                assert_eq!(paths, [tmp.path().join("src").join("a.txt")]);
            }
            other => panic!("expected a hand-off, got {other:?}"),
        }
    }

    #[test]
    fn plugin_prompt_runs_command() {
        let (_tmp, mut app) = setup();
        app.handle_key(&key(KeyCode::F(2)), 10);
        match app.modal() {
            Some(Modal::Prompt { title, .. }) => {
                assert!(title.contains("sample.hello: Sample plugin action"));
                assert!(title.contains("selection.size: Size of the current targets"));
            }
            other => panic!("expected the plugin prompt, got {other:?}"),
        }
        type_text(&mut app, "selection.size");
        app.handle_key(&key(KeyCode::Enter), 10);
        assert!(app.status().starts_with("1 item(s) in left pane, 5 bytes, target"));

        app.handle_key(&key(KeyCode::F(2)), 10);
        type_text(&mut app, "missing");
        app.handle_key(&key(KeyCode::Enter), 10);
        assert_eq!(app.status(), "Plugin failed: unknown command `missing`");
    }

    #[test]
    fn theme_and_hidden_toggles_update_config() {
        let (tmp, mut app) = setup();
        File::create(tmp.path().join("src").join(".hidden")).unwrap();
        app.handle_key(&ctrl('t'), 10);
        assert_eq!(app.config().theme.mode, "light");

        app.handle_key(&KeyEvent::new(KeyCode::Char('.'), KeyModifiers::ALT), 10);
        assert!(app.config().listing.show_hidden);
        assert_eq!(app.controller().pane(PaneId::Left).snapshot().len(), 4);
    }

    #[test]
    fn tab_switch_clears_other_selection() {
        let (_tmp, mut app) = setup();
        app.handle_key(&key(KeyCode::Char('+')), 10);
        app.handle_key(&key(KeyCode::Tab), 10);
        assert_eq!(app.controller().active_pane(), PaneId::Right);
        assert!(app.controller().pane(PaneId::Left).selection().is_empty());
    }

    #[test]
    fn quit_keys() {
        let (_tmp, mut app) = setup();
        assert_eq!(app.handle_key(&ctrl('q'), 10), Outcome::Quit);
        assert_eq!(app.handle_key(&key(KeyCode::F(10)), 10), Outcome::Quit);
    }
}
