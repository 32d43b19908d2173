use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    // Form actions
    NextField,
    PrevField,
    InputChar(char),
    InputBackspace,
    NextLevel,
    PrevLevel,
    Submit,
    // Result actions
    OpenVideo,
    DownloadVideo,
    NewVideo,
    // Popups
    DismissAlert,
    ShowHelp,
    HideHelp,
}

/// What the keyboard is currently talking to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Alert,
    Help,
    FormText,
    FormChoice,
    Busy,
    Result,
}

pub fn handle_key_event(key: KeyEvent, mode: InputMode) -> Option<AppAction> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(AppAction::Quit);
    }

    match mode {
        // The alert must be acknowledged before anything else happens
        InputMode::Alert => match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Some(AppAction::DismissAlert),
            _ => None,
        },

        InputMode::Help => Some(AppAction::HideHelp),

        InputMode::FormText => match key.code {
            KeyCode::Enter => Some(AppAction::Submit),
            KeyCode::Esc => Some(AppAction::Quit),
            KeyCode::Tab | KeyCode::Down => Some(AppAction::NextField),
            KeyCode::BackTab | KeyCode::Up => Some(AppAction::PrevField),
            KeyCode::Backspace => Some(AppAction::InputBackspace),
            KeyCode::F(1) => Some(AppAction::ShowHelp),
            KeyCode::Char(c) => Some(AppAction::InputChar(c)),
            _ => None,
        },

        InputMode::FormChoice => match key.code {
            KeyCode::Enter => Some(AppAction::Submit),
            KeyCode::Esc | KeyCode::Char('q') => Some(AppAction::Quit),
            KeyCode::Tab | KeyCode::Down => Some(AppAction::NextField),
            KeyCode::BackTab | KeyCode::Up => Some(AppAction::PrevField),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => Some(AppAction::NextLevel),
            KeyCode::Left | KeyCode::Char('h') => Some(AppAction::PrevLevel),
            KeyCode::F(1) | KeyCode::Char('?') => Some(AppAction::ShowHelp),
            _ => None,
        },

        InputMode::Busy => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(AppAction::Quit),
            KeyCode::F(1) | KeyCode::Char('?') => Some(AppAction::ShowHelp),
            _ => None,
        },

        InputMode::Result => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(AppAction::Quit),
            KeyCode::Char('o') | KeyCode::Enter => Some(AppAction::OpenVideo),
            KeyCode::Char('d') => Some(AppAction::DownloadVideo),
            KeyCode::Char('n') => Some(AppAction::NewVideo),
            KeyCode::F(1) | KeyCode::Char('?') => Some(AppAction::ShowHelp),
            _ => None,
        },
    }
}
