use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyModifiers};

use crate::config::KeyBindings;
use crate::tmux::Session;
use crate::tree::{self, NodeRef, TreeNode};

use super::intent::Intent;
use super::mode::Mode;
use super::nav::Navigation;

/// The session tree view: forest, visible rows, cursor and keyboard mode.
///
/// Everything here is synchronous. Key handling returns at most one
/// [`Intent`] for the controller to carry out.
#[derive(Debug, Clone)]
pub struct SessionsView {
    roots: Vec<TreeNode>,
    visible: Vec<NodeRef>,
    nav: Navigation,
    mode: Mode,
    keys: KeyBindings,
}

impl SessionsView {
    pub fn new(keys: KeyBindings) -> Self {
        Self {
            roots: Vec::new(),
            visible: Vec::new(),
            nav: Navigation::new(),
            mode: Mode::Normal,
            keys,
        }
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.nav.set_size(width, height);
    }

    /// Replace the forest with freshly listed sessions. The cursor stays on
    /// the session it was on; if that session is gone it keeps its index.
    pub fn set_sessions(&mut self, sessions: &[Session], repo_roots: &HashMap<String, String>) {
        let focused = self.selected_session_name().map(str::to_string);
        let mut roots = tree::build_tree(sessions, repo_roots);
        tree::restore_expanded(&self.roots, &mut roots);
        self.roots = roots;
        self.refresh_visible();
        if let Some(name) = focused {
            self.focus_session(&name);
        }
    }

    fn refresh_visible(&mut self) {
        self.visible = tree::flatten(&self.roots);
        self.nav.clamp(self.visible.len());
        self.nav.ensure_visible();
    }

    /// Visible rows in display order
    pub fn rows(&self) -> impl Iterator<Item = &TreeNode> {
        self.visible
            .iter()
            .filter_map(|&at| tree::resolve(&self.roots, at))
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn navigation(&self) -> &Navigation {
        &self.nav
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// True while a prompt or confirmation owns the keyboard
    pub fn is_editing(&self) -> bool {
        !self.mode.is_normal()
    }

    /// Node under the cursor
    pub fn selected(&self) -> Option<&TreeNode> {
        let &at = self.nav.selected(&self.visible)?;
        tree::resolve(&self.roots, at)
    }

    /// Session under the cursor, `None` on group headers
    pub fn selected_session_name(&self) -> Option<&str> {
        self.selected().and_then(TreeNode::session_name)
    }

    /// Put the cursor on a session by name, if it is visible.
    pub fn focus_session(&mut self, name: &str) -> bool {
        let Some(idx) = self
            .rows()
            .position(|n| n.session_name() == Some(name))
        else {
            return false;
        };
        self.nav.jump(idx, self.visible.len())
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<Intent> {
        match self.mode {
            Mode::Normal => self.handle_normal(code, modifiers),
            Mode::ConfirmingKill => self.handle_confirm(code),
            Mode::Renaming { .. } | Mode::Creating { .. } => self.handle_prompt(code, modifiers),
        }
    }

    fn handle_normal(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<Intent> {
        let len = self.visible.len();

        if let KeyCode::Char(digit @ '1'..='9') = code {
            if modifiers.contains(KeyModifiers::ALT) {
                let idx = digit as usize - '1' as usize;
                self.nav.jump(idx, len);
                return None;
            }
        }

        let keys = &self.keys;
        if keys.matches("down", &code, modifiers) {
            self.nav.move_down(len);
        } else if keys.matches("up", &code, modifiers) {
            self.nav.move_up(len);
        } else if keys.matches("first", &code, modifiers) {
            self.nav.first();
        } else if keys.matches("last", &code, modifiers) {
            self.nav.last(len);
        } else if keys.matches("toggle", &code, modifiers) {
            self.toggle_selected();
        } else if keys.matches("activate", &code, modifiers) {
            return self.selected_session_name().map(|n| Intent::Switch(n.to_string()));
        } else if keys.matches("drill", &code, modifiers) {
            return self.selected_session_name().map(|n| Intent::Drill(n.to_string()));
        } else if keys.matches("delete", &code, modifiers) {
            if self.selected_session_name().is_some() {
                self.mode = Mode::ConfirmingKill;
            }
        } else if keys.matches("rename", &code, modifiers) {
            if let Some(name) = self.selected_session_name().map(str::to_string) {
                self.mode = Mode::renaming(name);
            }
        } else if keys.matches("new_session", &code, modifiers) {
            self.mode = Mode::creating();
        } else if keys.matches("refresh", &code, modifiers) {
            return Some(Intent::Reload);
        }

        None
    }

    fn toggle_selected(&mut self) {
        let Some(&at) = self.nav.selected(&self.visible) else {
            return;
        };
        let Some(node) = tree::resolve_mut(&mut self.roots, at) else {
            return;
        };
        if !node.has_children() {
            return;
        }
        node.expanded = !node.expanded;
        self.refresh_visible();
    }

    fn handle_confirm(&mut self, code: KeyCode) -> Option<Intent> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.mode = Mode::Normal;
                self.selected_session_name()
                    .map(|n| Intent::Kill(n.to_string()))
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.mode = Mode::Normal;
                None
            }
            _ => None,
        }
    }

    fn handle_prompt(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<Intent> {
        match code {
            KeyCode::Enter => submit(std::mem::take(&mut self.mode)),
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                None
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.mode = Mode::Normal;
                None
            }
            _ => {
                if let Mode::Renaming { input, .. } | Mode::Creating { input } = &mut self.mode {
                    input.handle_key(code, modifiers);
                }
                None
            }
        }
    }
}

/// Turn a finished prompt into an intent; empty or unchanged names are
/// dropped.
fn submit(mode: Mode) -> Option<Intent> {
    match mode {
        Mode::Renaming { original, input } => {
            let to = input.text().trim();
            (!to.is_empty() && to != original).then(|| Intent::Rename {
                to: to.to_string(),
                from: original,
            })
        }
        Mode::Creating { input } => {
            let name = input.text().trim();
            (!name.is_empty()).then(|| Intent::Create(name.to_string()))
        }
        Mode::Normal | Mode::ConfirmingKill => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(names: &[&str]) -> SessionsView {
        let mut v = SessionsView::new(KeyBindings::default());
        v.set_size(80, 40);
        let sessions: Vec<Session> = names.iter().map(|n| Session::new(*n, 1)).collect();
        v.set_sessions(&sessions, &HashMap::new());
        v
    }

    fn press(v: &mut SessionsView, code: KeyCode) -> Option<Intent> {
        v.handle_key(code, KeyModifiers::NONE)
    }

    fn type_text(v: &mut SessionsView, text: &str) {
        for ch in text.chars() {
            assert_eq!(press(v, KeyCode::Char(ch)), None);
        }
    }

    fn row_names(v: &SessionsView) -> Vec<&str> {
        v.rows().map(|n| n.display_name.as_str()).collect()
    }

    #[test]
    fn test_navigation_clamps() {
        let mut v = view(&["a", "b", "c"]);
        press(&mut v, KeyCode::Up);
        assert_eq!(v.navigation().cursor(), 0);
        for _ in 0..5 {
            press(&mut v, KeyCode::Char('j'));
        }
        assert_eq!(v.navigation().cursor(), 2);
        press(&mut v, KeyCode::Char('g'));
        assert_eq!(v.navigation().cursor(), 0);
        v.handle_key(KeyCode::Char('G'), KeyModifiers::SHIFT);
        assert_eq!(v.navigation().cursor(), 2);
    }

    #[test]
    fn test_empty_view_is_inert() {
        let mut v = view(&[]);
        assert_eq!(press(&mut v, KeyCode::Down), None);
        assert_eq!(press(&mut v, KeyCode::Enter), None);
        assert_eq!(press(&mut v, KeyCode::Char('d')), None);
        assert!(v.mode().is_normal());
        assert_eq!(v.navigation().cursor(), 0);
        assert!(v.selected().is_none());
    }

    #[test]
    fn test_toggle_collapses_and_reclamps() {
        let mut v = view(&["api", "api-dev", "api-docs"]);
        assert_eq!(row_names(&v), vec!["api", "dev", "docs"]);

        // Collapse while the cursor sits on the last child
        press(&mut v, KeyCode::End);
        assert_eq!(v.navigation().cursor(), 2);
        press(&mut v, KeyCode::Char(' '));
        // Leaf: nothing happens
        assert_eq!(v.visible_len(), 3);

        press(&mut v, KeyCode::Home);
        press(&mut v, KeyCode::Char(' '));
        assert_eq!(row_names(&v), vec!["api"]);
        assert_eq!(v.navigation().cursor(), 0);

        press(&mut v, KeyCode::Char(' '));
        assert_eq!(v.visible_len(), 3);
    }

    #[test]
    fn test_collapse_survives_refresh() {
        let mut v = view(&["api", "api-dev"]);
        press(&mut v, KeyCode::Char(' '));
        assert_eq!(v.visible_len(), 1);

        let sessions = vec![Session::new("api", 2), Session::new("api-dev", 1)];
        v.set_sessions(&sessions, &HashMap::new());
        assert_eq!(v.visible_len(), 1);
    }

    #[test]
    fn test_refresh_shrink_reclamps_cursor() {
        let mut v = view(&["a", "b", "c", "d"]);
        press(&mut v, KeyCode::End);
        v.set_sessions(&[Session::new("a", 1)], &HashMap::new());
        assert_eq!(v.navigation().cursor(), 0);

        v.set_sessions(&[], &HashMap::new());
        assert_eq!(v.navigation().cursor(), 0);
        assert!(v.selected().is_none());
    }

    #[test]
    fn test_activate_and_drill() {
        let mut v = view(&["api", "api-dev"]);
        press(&mut v, KeyCode::Down);
        assert_eq!(
            press(&mut v, KeyCode::Enter),
            Some(Intent::Switch("api-dev".to_string()))
        );
        assert_eq!(
            press(&mut v, KeyCode::Char('l')),
            Some(Intent::Drill("api-dev".to_string()))
        );
        assert!(v.mode().is_normal());
    }

    #[test]
    fn test_group_header_ignores_session_actions() {
        let mut v = SessionsView::new(KeyBindings::default());
        v.set_size(80, 40);
        let sessions = vec![Session::new("web-main", 1), Session::new("web-feature", 1)];
        let roots: HashMap<String, String> = sessions
            .iter()
            .map(|s| (s.name.clone(), "/src/web".to_string()))
            .collect();
        v.set_sessions(&sessions, &roots);

        assert!(v.selected().unwrap().is_group_header());
        assert_eq!(press(&mut v, KeyCode::Enter), None);
        assert_eq!(press(&mut v, KeyCode::Tab), None);
        press(&mut v, KeyCode::Char('d'));
        assert!(v.mode().is_normal());
        press(&mut v, KeyCode::Char('r'));
        assert!(v.mode().is_normal());
    }

    #[test]
    fn test_alt_digit_jumps() {
        let mut v = view(&["a", "b", "c"]);
        v.handle_key(KeyCode::Char('3'), KeyModifiers::ALT);
        assert_eq!(v.navigation().cursor(), 2);
        v.handle_key(KeyCode::Char('9'), KeyModifiers::ALT);
        assert_eq!(v.navigation().cursor(), 2);
        // Without Alt the digit is not a jump
        v.handle_key(KeyCode::Char('1'), KeyModifiers::NONE);
        assert_eq!(v.navigation().cursor(), 2);
    }

    #[test]
    fn test_kill_confirm() {
        let mut v = view(&["a", "b"]);
        press(&mut v, KeyCode::Down);
        press(&mut v, KeyCode::Char('d'));
        assert_eq!(v.mode(), &Mode::ConfirmingKill);
        assert!(v.is_editing());

        // Unrelated keys are swallowed
        assert_eq!(press(&mut v, KeyCode::Up), None);
        assert_eq!(v.mode(), &Mode::ConfirmingKill);
        assert_eq!(v.navigation().cursor(), 1);

        assert_eq!(
            press(&mut v, KeyCode::Char('y')),
            Some(Intent::Kill("b".to_string()))
        );
        assert!(v.mode().is_normal());
    }

    #[test]
    fn test_kill_decline() {
        let mut v = view(&["a"]);
        press(&mut v, KeyCode::Char('d'));
        assert_eq!(press(&mut v, KeyCode::Esc), None);
        assert!(v.mode().is_normal());

        press(&mut v, KeyCode::Char('d'));
        assert_eq!(press(&mut v, KeyCode::Char('N')), None);
        assert!(v.mode().is_normal());
    }

    #[test]
    fn test_kill_targets_cursor_at_confirmation() {
        let mut v = view(&["a", "b", "c"]);
        press(&mut v, KeyCode::Down);
        press(&mut v, KeyCode::Char('d'));
        // A refresh lands while the prompt is open and "a" is gone
        v.set_sessions(&[Session::new("b", 1), Session::new("c", 1)], &HashMap::new());
        assert_eq!(v.navigation().cursor(), 0);
        assert_eq!(
            press(&mut v, KeyCode::Char('Y')),
            Some(Intent::Kill("b".to_string()))
        );
    }

    #[test]
    fn test_refresh_keeps_cursor_on_same_session() {
        let mut v = view(&["b", "c"]);
        press(&mut v, KeyCode::Down);
        press(&mut v, KeyCode::Char('d'));
        // A new session sorts in above the cursor
        let sessions: Vec<Session> = ["a", "b", "c"].iter().map(|n| Session::new(*n, 1)).collect();
        v.set_sessions(&sessions, &HashMap::new());
        assert_eq!(v.selected_session_name(), Some("c"));
        assert_eq!(
            press(&mut v, KeyCode::Char('y')),
            Some(Intent::Kill("c".to_string()))
        );
    }

    #[test]
    fn test_refresh_falls_back_to_index_when_session_gone() {
        let mut v = view(&["a", "b", "c"]);
        press(&mut v, KeyCode::Down);
        let sessions: Vec<Session> = ["a", "c", "d"].iter().map(|n| Session::new(*n, 1)).collect();
        v.set_sessions(&sessions, &HashMap::new());
        assert_eq!(v.navigation().cursor(), 1);
        assert_eq!(v.selected_session_name(), Some("c"));
    }

    #[test]
    fn test_rename_round_trip() {
        let mut v = view(&["api"]);
        press(&mut v, KeyCode::Char('r'));
        match v.mode() {
            Mode::Renaming { original, input } => {
                assert_eq!(original, "api");
                assert_eq!(input.text(), "api");
            }
            other => panic!("expected Renaming, got {other:?}"),
        }

        // Keys that mean something in Normal mode are plain text here
        type_text(&mut v, "-jd");
        assert_eq!(
            press(&mut v, KeyCode::Enter),
            Some(Intent::Rename {
                from: "api".to_string(),
                to: "api-jd".to_string()
            })
        );
        assert!(v.mode().is_normal());
    }

    #[test]
    fn test_rename_cancel_and_noops() {
        let mut v = view(&["api"]);

        press(&mut v, KeyCode::Char('r'));
        type_text(&mut v, "x");
        assert_eq!(press(&mut v, KeyCode::Esc), None);
        assert!(v.mode().is_normal());

        // Unchanged name
        press(&mut v, KeyCode::Char('r'));
        assert_eq!(press(&mut v, KeyCode::Enter), None);
        assert!(v.mode().is_normal());

        // Emptied buffer
        press(&mut v, KeyCode::Char('r'));
        v.handle_key(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(press(&mut v, KeyCode::Enter), None);
        assert!(v.mode().is_normal());

        assert_eq!(v.selected_session_name(), Some("api"));
    }

    #[test]
    fn test_create() {
        let mut v = view(&[]);
        press(&mut v, KeyCode::Char('n'));
        assert_eq!(v.mode(), &Mode::creating());

        type_text(&mut v, " notes ");
        assert_eq!(
            press(&mut v, KeyCode::Enter),
            Some(Intent::Create("notes".to_string()))
        );
        assert!(v.mode().is_normal());

        press(&mut v, KeyCode::Char('n'));
        type_text(&mut v, "   ");
        assert_eq!(press(&mut v, KeyCode::Enter), None);

        press(&mut v, KeyCode::Char('n'));
        type_text(&mut v, "x");
        assert_eq!(
            v.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            None
        );
        assert!(v.mode().is_normal());
    }

    #[test]
    fn test_refresh_key() {
        let mut v = view(&["a"]);
        assert_eq!(
            v.handle_key(KeyCode::Char('r'), KeyModifiers::CONTROL),
            Some(Intent::Reload)
        );
    }

    #[test]
    fn test_focus_session() {
        let mut v = view(&["a", "b", "b-x"]);
        assert!(v.focus_session("b-x"));
        assert_eq!(v.selected_session_name(), Some("b-x"));
        assert!(!v.focus_session("zzz"));
    }

    #[test]
    fn test_scroll_follows_cursor_in_small_viewport() {
        let names: Vec<String> = (0..20).map(|i| format!("s{i:02}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut v = view(&refs);
        v.set_size(80, 8);

        for _ in 0..10 {
            press(&mut v, KeyCode::Down);
            let nav = v.navigation();
            assert!(nav.scroll() <= nav.cursor());
            assert!(nav.cursor() < nav.scroll() + nav.max_visible_items());
        }
        assert_eq!(v.navigation().cursor(), 10);
        assert_eq!(v.navigation().scroll(), 8);
    }
}
