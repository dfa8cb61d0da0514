//! Key to action mapping for the chat view.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Submit,
    InsertNewline,
    OpenPersonaPicker,
    NewThread,
    PickerUp,
    PickerDown,
    PickerConfirm,
    PickerCancel,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    ScrollToBottom,
    /// Forward the key to the text area.
    Edit,
    Ignore,
}

pub fn map_key(key: &KeyEvent, picker_open: bool) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('c')) {
        return KeyAction::Quit;
    }

    if picker_open {
        return match key.code {
            KeyCode::Up | KeyCode::Char('k') => KeyAction::PickerUp,
            KeyCode::Down | KeyCode::Char('j') => KeyAction::PickerDown,
            KeyCode::Enter => KeyAction::PickerConfirm,
            KeyCode::Esc => KeyAction::PickerCancel,
            _ => KeyAction::Ignore,
        };
    }

    match key.code {
        KeyCode::Enter
            if key
                .modifiers
                .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
        {
            KeyAction::InsertNewline
        }
        KeyCode::Enter => KeyAction::Submit,
        KeyCode::Char('p') if ctrl => KeyAction::OpenPersonaPicker,
        KeyCode::Char('n') if ctrl => KeyAction::NewThread,
        KeyCode::Up if ctrl => KeyAction::ScrollUp,
        KeyCode::Down if ctrl => KeyAction::ScrollDown,
        KeyCode::PageUp => KeyAction::PageUp,
        KeyCode::PageDown => KeyAction::PageDown,
        KeyCode::End if ctrl => KeyAction::ScrollToBottom,
        _ => KeyAction::Edit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn plain_enter_submits() {
        assert_eq!(
            map_key(&key(KeyCode::Enter, KeyModifiers::NONE), false),
            KeyAction::Submit
        );
    }

    #[test]
    fn shift_or_alt_enter_inserts_newline() {
        assert_eq!(
            map_key(&key(KeyCode::Enter, KeyModifiers::SHIFT), false),
            KeyAction::InsertNewline
        );
        assert_eq!(
            map_key(&key(KeyCode::Enter, KeyModifiers::ALT), false),
            KeyAction::InsertNewline
        );
    }

    #[test]
    fn picker_captures_navigation() {
        assert_eq!(
            map_key(&key(KeyCode::Enter, KeyModifiers::NONE), true),
            KeyAction::PickerConfirm
        );
        assert_eq!(
            map_key(&key(KeyCode::Char('x'), KeyModifiers::NONE), true),
            KeyAction::Ignore
        );
        assert_eq!(
            map_key(&key(KeyCode::Char('c'), KeyModifiers::CONTROL), true),
            KeyAction::Quit
        );
    }

    #[test]
    fn ordinary_characters_edit_input() {
        assert_eq!(
            map_key(&key(KeyCode::Char('a'), KeyModifiers::NONE), false),
            KeyAction::Edit
        );
        assert_eq!(
            map_key(&key(KeyCode::Char('p'), KeyModifiers::CONTROL), false),
            KeyAction::OpenPersonaPicker
        );
    }
}
