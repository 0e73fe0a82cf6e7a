//! Key bindings (normal and vim-style) and header mouse hits.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CursorLeft,
    CursorRight,
    /// Drop a block at the cursor column.
    Drop,
    /// Remove the topmost settled block under the cursor.
    Remove,
    ToggleTheme,
    Pause,
    Quit,
    None,
}

/// Map key event to header action. Supports both normal (arrows, space) and vim (h/l).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Char('t') => Action::ToggleTheme,
        KeyCode::Left | KeyCode::Char('h') => Action::CursorLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::CursorRight,
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Down | KeyCode::Char('j') => Action::Drop,
        KeyCode::Delete | KeyCode::Backspace | KeyCode::Char('x') => Action::Remove,
        _ => Action::None,
    }
}

/// Left-button press inside `band`, as (column, line) relative to the band's top-left cell.
pub fn band_click(event: MouseEvent, band: Rect) -> Option<(u16, u16)> {
    if event.kind != MouseEventKind::Down(MouseButton::Left) {
        return None;
    }
    let inside_x = event.column >= band.x && event.column < band.x.saturating_add(band.width);
    let inside_y = event.row >= band.y && event.row < band.y.saturating_add(band.height);
    (inside_x && inside_y).then(|| (event.column - band.x, event.row - band.y))
}
