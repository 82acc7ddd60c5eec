use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Quit,
    Select,
    Next,
    Prev,
    Backspace,
    Clear,
    Help,
    Speak,
    OpenWiki,
    AddFlower,
    EditFlower,
    ChangeSource,
    ToggleTheme,
    Insert(char),
}

pub fn map_key(event: KeyEvent) -> InputAction {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    match event.code {
        KeyCode::Esc => InputAction::Quit,
        KeyCode::Char('q') if ctrl => InputAction::Quit,
        KeyCode::Char('c') if ctrl => InputAction::Quit,
        KeyCode::Char('s') if ctrl => InputAction::Speak,
        KeyCode::Char('w') if ctrl => InputAction::OpenWiki,
        KeyCode::Char('n') if ctrl => InputAction::AddFlower,
        KeyCode::Char('e') if ctrl => InputAction::EditFlower,
        KeyCode::Char('o') if ctrl => InputAction::ChangeSource,
        KeyCode::Char('t') if ctrl => InputAction::ToggleTheme,
        KeyCode::Char('u') if ctrl => InputAction::Clear,
        KeyCode::Char(_) if ctrl => InputAction::None,
        KeyCode::Char('?') => InputAction::Help,
        KeyCode::Down => InputAction::Next,
        KeyCode::Up => InputAction::Prev,
        KeyCode::Enter => InputAction::Select,
        KeyCode::Backspace => InputAction::Backspace,
        KeyCode::Char(ch) => InputAction::Insert(ch),
        _ => InputAction::None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    None,
    Cancel,
    Submit,
    NextField,
    Backspace,
    Clear,
    Insert(char),
}

/// Keys inside an overlay text prompt.
pub fn map_edit_key(event: KeyEvent) -> EditAction {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    match event.code {
        KeyCode::Esc => EditAction::Cancel,
        KeyCode::Enter => EditAction::Submit,
        KeyCode::Tab | KeyCode::BackTab => EditAction::NextField,
        KeyCode::Backspace => EditAction::Backspace,
        KeyCode::Char('u') if ctrl => EditAction::Clear,
        KeyCode::Char(_) if ctrl => EditAction::None,
        KeyCode::Char(ch) => EditAction::Insert(ch),
        _ => EditAction::None,
    }
}
