//! Key bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Named actions shared by screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Select,
    Quit,
    Help,
    Search,
}

impl Action {
    /// Maps a key press to an action.
    #[must_use]
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return (key.code == KeyCode::Char('c')).then_some(Self::Quit);
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Self::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(Self::Down),
            KeyCode::Enter => Some(Self::Select),
            KeyCode::Char('q') => Some(Self::Quit),
            KeyCode::Char('?') => Some(Self::Help),
            KeyCode::Char('/') => Some(Self::Search),
            _ => None,
        }
    }

    /// Returns the `(keys, description)` pair shown in help lines.
    #[must_use]
    pub fn help(self) -> (&'static str, &'static str) {
        match self {
            Self::Up => ("↑/k", "up"),
            Self::Down => ("↓/j", "down"),
            Self::Select => ("enter", "select"),
            Self::Quit => ("q", "quit"),
            Self::Help => ("?", "help"),
            Self::Search => ("/", "search"),
        }
    }
}

/// Returns `true` for Ctrl+C, which quits from any screen.
#[must_use]
pub fn is_force_quit(key: &KeyEvent) -> bool {
    is_ctrl(key, 'c')
}

/// Returns `true` when `key` is Ctrl plus `ch`.
#[must_use]
pub fn is_ctrl(key: &KeyEvent, ch: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(ch)
}

/// Formats a help line such as `↑/k: up • enter: select`.
#[must_use]
pub fn help_line(actions: &[Action]) -> String {
    actions
        .iter()
        .map(|action| {
            let (keys, description) = action.help();
            format!("{keys}: {description}")
        })
        .collect::<Vec<_>>()
        .join(" • ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_vim_and_arrow_keys_map_to_same_action() {
        assert_eq!(Action::from_key(&key(KeyCode::Up)), Some(Action::Up));
        assert_eq!(Action::from_key(&key(KeyCode::Char('k'))), Some(Action::Up));
        assert_eq!(Action::from_key(&key(KeyCode::Down)), Some(Action::Down));
        assert_eq!(Action::from_key(&key(KeyCode::Char('j'))), Some(Action::Down));
    }

    #[test]
    fn test_unbound_keys_have_no_action() {
        for code in [KeyCode::Left, KeyCode::Char('h'), KeyCode::Esc, KeyCode::Tab] {
            assert_eq!(Action::from_key(&key(code)), None, "{code:?}");
        }
    }

    #[test]
    fn test_ctrl_c_is_quit_and_force_quit() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(Action::from_key(&ctrl_c), Some(Action::Quit));
        assert!(is_force_quit(&ctrl_c));
        assert!(!is_force_quit(&key(KeyCode::Char('q'))));
    }

    #[test]
    fn test_other_ctrl_chords_have_no_action() {
        let ctrl_k = KeyEvent::new(KeyCode::Char('k'), KeyModifiers::CONTROL);
        assert_eq!(Action::from_key(&ctrl_k), None);
        assert!(is_ctrl(&ctrl_k, 'k'));
    }

    #[test]
    fn test_help_line_format() {
        assert_eq!(
            help_line(&[Action::Up, Action::Select, Action::Quit]),
            "↑/k: up • enter: select • q: quit"
        );
    }
}
