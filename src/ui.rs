#![forbid(unsafe_code)]

use std::cell::Cell;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
};
use crossterm::{execute, queue};
use time::macros::format_description;
use tracing::debug;

use crate::app::{App, Modal, Outcome};
use crate::controller::{PresentationSink, ViewEvent};
use crate::model::{Entry, PaneId};
use crate::pane::Pane;

pub const HEADER_HEIGHT: u16 = 1;
pub const STATUS_HEIGHT: u16 = 1;
pub const KEYBAR_HEIGHT: u16 = 1;

const SIZE_WIDTH: usize = 7;
const DATE_WIDTH: usize = 8;
const TIME_WIDTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColors {
    pub panel_bg: Color,
    pub panel_fg: Color,
    pub title_active: Color,
    pub title_inactive: Color,
    pub cursor_bg: Color,
    pub cursor_fg: Color,
    pub marked_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub keybar_bg: Color,
    pub keybar_fg: Color,
}

impl ThemeColors {
    pub fn classic() -> Self {
        Self {
            panel_bg: Color::DarkBlue,
            panel_fg: Color::Grey,
            title_active: Color::Cyan,
            title_inactive: Color::DarkGrey,
            cursor_bg: Color::DarkYellow,
            cursor_fg: Color::Black,
            marked_fg: Color::Yellow,
            status_bg: Color::DarkBlue,
            status_fg: Color::White,
            keybar_bg: Color::DarkCyan,
            keybar_fg: Color::White,
        }
    }

    pub fn light() -> Self {
        Self {
            panel_bg: Color::White,
            panel_fg: Color::Black,
            title_active: Color::DarkBlue,
            title_inactive: Color::DarkGrey,
            cursor_bg: Color::DarkCyan,
            cursor_fg: Color::White,
            marked_fg: Color::DarkRed,
            status_bg: Color::Grey,
            status_fg: Color::Black,
            keybar_bg: Color::DarkGrey,
            keybar_fg: Color::White,
        }
    }

    pub fn for_mode(mode: &str) -> Self {
        if mode == "light" {
            Self::light()
        } else {
            Self::classic()
        }
    }
}

/// Presentation sink that only records that something changed.
#[derive(Debug, Clone, Default)]
pub struct RedrawFlag(Rc<Cell<bool>>);

impl RedrawFlag {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
}

impl PresentationSink for RedrawFlag {
    fn notify(&mut self, event: ViewEvent) {
        debug!(?event, "view event");
        self.0.set(true);
    }
}

/// Per-pane scroll offsets; the model knows nothing about rows on screen.
#[derive(Debug, Default)]
struct Viewport {
    left: usize,
    right: usize,
}

impl Viewport {
    fn offset_mut(&mut self, id: PaneId) -> &mut usize {
        match id {
            PaneId::Left => &mut self.left,
            PaneId::Right => &mut self.right,
        }
    }
}

pub fn run(app: &mut App, dirty: RedrawFlag) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        previous_hook(info);
    }));

    let result = event_loop(app, &dirty, &mut stdout);

    disable_raw_mode()?;
    execute!(stdout, ResetColor, Show, LeaveAlternateScreen)?;
    result
}

fn event_loop(app: &mut App, dirty: &RedrawFlag, out: &mut impl Write) -> io::Result<()> {
    let mut viewport = Viewport::default();
    let mut last_status = String::new();
    let mut last_modal: Option<Modal> = None;
    let mut force = true;
    loop {
        let (width, height) = terminal::size()?;
        let page = list_height(height);
        let changed = dirty.take()
            || app.status() != last_status
            || app.modal() != last_modal.as_ref();
        if force || changed {
            draw(out, app, &mut viewport, width, height)?;
            last_status = app.status().to_string();
            last_modal = app.modal().cloned();
            force = false;
        }

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => match app.handle_key(&key, page) {
                Outcome::Continue => {}
                Outcome::Quit => return Ok(()),
                Outcome::External { program, paths } => {
                    let result = run_external(&program, &paths);
                    app.external_finished(&program, result);
                    force = true;
                }
            },
            Event::Resize(..) => force = true,
            _ => {}
        }
    }
}

fn list_height(height: u16) -> usize {
    height.saturating_sub(HEADER_HEIGHT + STATUS_HEIGHT + KEYBAR_HEIGHT) as usize
}

fn draw(
    out: &mut impl Write,
    app: &App,
    viewport: &mut Viewport,
    width: u16,
    height: u16,
) -> io::Result<()> {
    let theme = ThemeColors::for_mode(&app.config().theme.mode);
    let rows = list_height(height);
    let left_width = width / 2;
    let right_width = width - left_width;
    let controller = app.controller();
    let active = controller.active_pane();

    queue!(out, Clear(ClearType::All))?;
    for (id, x, w) in [
        (PaneId::Left, 0, left_width),
        (PaneId::Right, left_width, right_width),
    ] {
        let pane = controller.pane(id);
        let offset = viewport.offset_mut(id);
        ensure_visible(offset, pane.cursor().index(pane.snapshot()), rows);
        draw_pane(out, pane, id == active, *offset, x, w, rows, theme)?;
    }

    let status_row = height.saturating_sub(STATUS_HEIGHT + KEYBAR_HEIGHT);
    let status = match app.modal() {
        Some(Modal::Prompt { title, value, .. }) => format!("{title}: {value}_"),
        Some(Modal::Confirm { message, .. }) => message.clone(),
        None => status_text(app.status(), controller.pane(active), width as usize),
    };
    queue!(
        out,
        MoveTo(0, status_row),
        SetBackgroundColor(theme.status_bg),
        SetForegroundColor(theme.status_fg),
        Print(fit(&status, width as usize)),
    )?;

    let keybar = "2Plugin 3View 4Edit 5Copy 6Move 7Mkdir 8Delete 10Quit";
    queue!(
        out,
        MoveTo(0, height.saturating_sub(KEYBAR_HEIGHT)),
        SetBackgroundColor(theme.keybar_bg),
        SetForegroundColor(theme.keybar_fg),
        Print(fit(keybar, width as usize)),
        ResetColor,
    )?;
    out.flush()
}

#[allow(clippy::too_many_arguments)]
fn draw_pane(
    out: &mut impl Write,
    pane: &Pane,
    active: bool,
    offset: usize,
    x: u16,
    width: u16,
    rows: usize,
    theme: ThemeColors,
) -> io::Result<()> {
    let width = width as usize;
    let title_color = if active {
        theme.title_active
    } else {
        theme.title_inactive
    };
    queue!(
        out,
        MoveTo(x, 0),
        SetBackgroundColor(theme.panel_bg),
        SetForegroundColor(title_color),
        Print(fit(&pane_title(pane), width)),
    )?;

    let snapshot = pane.snapshot();
    let cursor = pane.cursor().current();
    for row in 0..rows {
        let y = (row as u16).saturating_add(HEADER_HEIGHT);
        let (line, fg, bg) = match snapshot.get(offset + row) {
            Some(entry) => {
                let focused = cursor == Some(entry.identity());
                let marked = pane.selection().is_selected(entry.identity());
                let line = format_row(entry, focused, marked, width);
                if focused && active {
                    (line, theme.cursor_fg, theme.cursor_bg)
                } else if marked {
                    (line, theme.marked_fg, theme.panel_bg)
                } else {
                    (line, theme.panel_fg, theme.panel_bg)
                }
            }
            None => (" ".repeat(width), theme.panel_fg, theme.panel_bg),
        };
        queue!(
            out,
            MoveTo(x, y),
            SetBackgroundColor(bg),
            SetForegroundColor(fg),
            Print(line),
        )?;
    }
    Ok(())
}

fn pane_title(pane: &Pane) -> String {
    let mut title = format!(" {} [{}]", pane.location().display(), pane.options().sort_mode.label());
    if let Some(filter) = pane.filter() {
        title.push_str(&format!(" filter: {filter}"));
    }
    title
}

fn status_text(status: &str, pane: &Pane, width: usize) -> String {
    let selected = pane.selection().materialize(pane.snapshot()).len();
    let right = format!("Sel: {} Size: {}", selected, pane.selection().total_size(pane.snapshot()));
    let used = status.chars().count() + right.chars().count();
    let spacing = width.saturating_sub(used);
    format!("{status}{}{right}", " ".repeat(spacing))
}

/// One listing line: cursor marker, selection marker, name, size, date, time.
pub fn format_row(entry: &Entry, focused: bool, marked: bool, width: usize) -> String {
    let cursor = if focused { '>' } else { ' ' };
    let mark = if marked { '*' } else { ' ' };
    let size = if entry.is_dir {
        "<DIR>".to_string()
    } else {
        entry.size.to_string()
    };
    let (date, clock) = format_time(entry.modified);
    let columns = SIZE_WIDTH + DATE_WIDTH + TIME_WIDTH + 3;
    let name_width = width.saturating_sub(columns + 2);
    let line = format!(
        "{cursor}{mark}{} {:>SIZE_WIDTH$} {:>DATE_WIDTH$} {:>TIME_WIDTH$}",
        fit(&entry.name, name_width),
        size,
        date,
        clock
    );
    fit(&line, width)
}

/// `(date, time)` in the local offset, or blanks when unknown.
pub fn format_time(time: Option<SystemTime>) -> (String, String) {
    let Some(time) = time else {
        return (String::new(), String::new());
    };
    let offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let dt = time::OffsetDateTime::from(time).to_offset(offset);
    let date = dt
        .format(format_description!("[day]-[month]-[year repr:last_two]"))
        .unwrap_or_default();
    let clock = dt
        .format(format_description!("[hour]:[minute]"))
        .unwrap_or_default();
    (date, clock)
}

/// Truncate or pad `text` to exactly `width` characters.
pub fn fit(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat_n(' ', width - len));
    out
}

pub fn ensure_visible(offset: &mut usize, selected: Option<usize>, view_height: usize) {
    if view_height == 0 {
        return;
    }
    let Some(selected) = selected else {
        *offset = 0;
        return;
    };
    if selected < *offset {
        *offset = selected;
    } else if selected >= *offset + view_height {
        *offset = selected.saturating_sub(view_height - 1);
    }
}

pub fn run_external(program: &str, paths: &[PathBuf]) -> io::Result<()> {
    let mut parts = program.split_whitespace();
    let Some(binary) = parts.next() else {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty command"));
    };
    let mut stdout = io::stdout();
    disable_raw_mode().ok();
    execute!(stdout, ResetColor, Show, LeaveAlternateScreen)?;
    let status = std::process::Command::new(binary)
        .args(parts)
        .args(paths)
        .status();
    execute!(stdout, EnterAlternateScreen, Clear(ClearType::All), MoveTo(0, 0), Hide)?;
    enable_raw_mode().ok();
    while event::poll(Duration::from_millis(0))? {
        let _ = event::read();
    }
    let status = status?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("exited with {status}")))
    }
}
