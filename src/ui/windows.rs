use crossterm::event::{KeyCode, KeyModifiers};

use crate::config::KeyBindings;
use crate::tmux::Window;

use super::nav::Navigation;

/// What the windows view asks of the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowAction {
    /// Switch to a `session:window` target
    Select(String),
    /// Return to the session tree
    Back,
}

/// Flat list of one session's windows
#[derive(Debug, Clone)]
pub struct WindowsView {
    session: String,
    windows: Vec<Window>,
    nav: Navigation,
    keys: KeyBindings,
}

impl WindowsView {
    /// Open on `session`, cursor on its active window.
    pub fn new(session: impl Into<String>, windows: Vec<Window>, keys: KeyBindings) -> Self {
        let mut nav = Navigation::new();
        if let Some(active) = windows.iter().position(|w| w.active) {
            nav.jump(active, windows.len());
        }
        Self {
            session: session.into(),
            windows,
            nav,
            keys,
        }
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn navigation(&self) -> &Navigation {
        &self.nav
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.nav.set_size(width, height);
    }

    pub fn selected(&self) -> Option<&Window> {
        self.nav.selected(&self.windows)
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<WindowAction> {
        let len = self.windows.len();
        let keys = &self.keys;

        if keys.matches("down", &code, modifiers) {
            self.nav.move_down(len);
        } else if keys.matches("up", &code, modifiers) {
            self.nav.move_up(len);
        } else if keys.matches("first", &code, modifiers) {
            self.nav.first();
        } else if keys.matches("last", &code, modifiers) {
            self.nav.last(len);
        } else if keys.matches("activate", &code, modifiers) {
            return self
                .selected()
                .map(|w| WindowAction::Select(w.target(&self.session)));
        } else if keys.matches("back", &code, modifiers) {
            return Some(WindowAction::Back);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(index: u32, name: &str, active: bool) -> Window {
        Window {
            index,
            name: name.to_string(),
            active,
            panes: 1,
        }
    }

    fn view() -> WindowsView {
        let mut v = WindowsView::new(
            "api",
            vec![
                window(0, "editor", false),
                window(1, "server", true),
                window(3, "logs", false),
            ],
            KeyBindings::default(),
        );
        v.set_size(80, 24);
        v
    }

    #[test]
    fn test_opens_on_active_window() {
        let v = view();
        assert_eq!(v.navigation().cursor(), 1);
        assert_eq!(v.selected().map(|w| w.name.as_str()), Some("server"));
    }

    #[test]
    fn test_select_uses_window_index() {
        let mut v = view();
        v.handle_key(KeyCode::Char('j'), KeyModifiers::NONE);
        v.handle_key(KeyCode::Char('j'), KeyModifiers::NONE);
        assert_eq!(
            v.handle_key(KeyCode::Enter, KeyModifiers::NONE),
            Some(WindowAction::Select("api:3".to_string()))
        );
    }

    #[test]
    fn test_back_keys() {
        let mut v = view();
        for code in [KeyCode::Esc, KeyCode::Char('h'), KeyCode::Left] {
            assert_eq!(v.handle_key(code, KeyModifiers::NONE), Some(WindowAction::Back));
        }
    }

    #[test]
    fn test_empty_window_list() {
        let mut v = WindowsView::new("gone", Vec::new(), KeyBindings::default());
        assert_eq!(v.handle_key(KeyCode::Down, KeyModifiers::NONE), None);
        assert_eq!(v.handle_key(KeyCode::Enter, KeyModifiers::NONE), None);
        assert_eq!(v.navigation().cursor(), 0);
    }
}
