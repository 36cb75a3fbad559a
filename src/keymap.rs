#![forbid(unsafe_code)]

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::Command;
use crate::model::CursorMove;

/// Map a key press in the pane view to a command. `page` is the number of
/// visible rows, used for PageUp/PageDown.
pub fn command_for(key: &KeyEvent, page: usize) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    let command = match key.code {
        KeyCode::Char('q') if ctrl => Command::Quit,
        KeyCode::Char('r') if ctrl => Command::Refresh,
        KeyCode::Char('t') if ctrl => Command::ToggleTheme,
        KeyCode::Char('s') if ctrl => Command::CycleSort,
        KeyCode::Char('g') if ctrl => Command::GoTo,
        KeyCode::Char('f') if ctrl => Command::Filter,
        KeyCode::Char('.') if alt => Command::ToggleHidden,
        _ if ctrl || alt => return None,

        KeyCode::F(2) => Command::RunPlugin,
        KeyCode::F(3) => Command::View,
        KeyCode::F(4) => Command::Edit,
        KeyCode::F(5) => Command::Copy,
        KeyCode::F(6) => Command::Move,
        KeyCode::F(7) => Command::MakeDirectory,
        KeyCode::F(8) => Command::Delete,
        KeyCode::F(10) => Command::Quit,

        KeyCode::Tab => Command::SwitchPane,
        KeyCode::Up => Command::MoveCursor(CursorMove::Up),
        KeyCode::Down => Command::MoveCursor(CursorMove::Down),
        KeyCode::PageUp => Command::MoveCursor(CursorMove::PageUp(page)),
        KeyCode::PageDown => Command::MoveCursor(CursorMove::PageDown(page)),
        KeyCode::Home => Command::MoveCursor(CursorMove::First),
        KeyCode::End => Command::MoveCursor(CursorMove::Last),
        KeyCode::Left => Command::GoUp,
        KeyCode::Backspace => Command::Backspace,
        KeyCode::Right | KeyCode::Enter => Command::Enter,
        KeyCode::Char(' ') | KeyCode::Insert => Command::ToggleSelection,
        KeyCode::Char('+') => Command::SelectAll,
        KeyCode::Char('-') => Command::ClearSelection,
        KeyCode::Char('*') => Command::InvertSelection,
        KeyCode::Esc => Command::Escape,
        KeyCode::Char(ch) if ch.is_alphanumeric() || ch == '.' || ch == '_' => {
            Command::QuickSearch(ch)
        }
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn function_keys() {
        let none = KeyModifiers::NONE;
        assert_eq!(command_for(&press(KeyCode::F(5), none), 10), Some(Command::Copy));
        assert_eq!(command_for(&press(KeyCode::F(6), none), 10), Some(Command::Move));
        assert_eq!(command_for(&press(KeyCode::F(8), none), 10), Some(Command::Delete));
        assert_eq!(command_for(&press(KeyCode::F(10), none), 10), Some(Command::Quit));
        assert_eq!(command_for(&press(KeyCode::F(12), none), 10), None);
    }

    #[test]
    fn control_chords_are_not_quick_search() {
        let ctrl = KeyModifiers::CONTROL;
        assert_eq!(command_for(&press(KeyCode::Char('q'), ctrl), 10), Some(Command::Quit));
        assert_eq!(command_for(&press(KeyCode::Char('f'), ctrl), 10), Some(Command::Filter));
        assert_eq!(command_for(&press(KeyCode::Char('x'), ctrl), 10), None);
        assert_eq!(
            command_for(&press(KeyCode::Char('.'), KeyModifiers::ALT), 10),
            Some(Command::ToggleHidden)
        );
    }

    #[test]
    fn plain_letters_start_quick_search() {
        assert_eq!(
            command_for(&press(KeyCode::Char('R'), KeyModifiers::SHIFT), 10),
            Some(Command::QuickSearch('R'))
        );
        assert_eq!(
            command_for(&press(KeyCode::Char(' '), KeyModifiers::NONE), 10),
            Some(Command::ToggleSelection)
        );
    }

    #[test]
    fn paging_uses_visible_rows() {
        assert_eq!(
            command_for(&press(KeyCode::PageDown, KeyModifiers::NONE), 17),
            Some(Command::MoveCursor(CursorMove::PageDown(17)))
        );
    }

    #[test]
    fn releases_are_ignored() {
        let release = KeyEvent {
            code: KeyCode::Down,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(command_for(&release, 10), None);
    }
}
