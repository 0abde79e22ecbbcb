use std::path::PathBuf;

use serde::Serialize;

/// Format string handed to `tmux list-sessions -F`
pub(crate) const SESSION_FORMAT: &str =
    "#{session_name}\t#{session_windows}\t#{session_attached}\t#{session_path}";

/// Format string handed to `tmux list-windows -F`
pub(crate) const WINDOW_FORMAT: &str =
    "#{window_index}\t#{window_name}\t#{window_active}\t#{window_panes}";

/// A tmux session as reported by `list-sessions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub name: String,
    pub windows: u32,
    pub attached: bool,
    pub path: Option<PathBuf>,
}

impl Session {
    pub fn new(name: impl Into<String>, windows: u32) -> Self {
        Self {
            name: name.into(),
            windows,
            attached: false,
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn attached(mut self, attached: bool) -> Self {
        self.attached = attached;
        self
    }

    /// Parse one line of [`SESSION_FORMAT`] output
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(4, '\t');
        let name = parts.next()?.trim();
        if name.is_empty() {
            return None;
        }
        let windows = parts.next()?.trim().parse::<u32>().ok()?;
        // session_attached is a client count, not a flag
        let attached = parts
            .next()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .is_some_and(|n| n > 0);
        let path = parts
            .next()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Some(Self {
            name: name.to_string(),
            windows,
            attached,
            path,
        })
    }

    pub fn parse_list(output: &str) -> Vec<Self> {
        output.lines().filter_map(Self::parse_line).collect()
    }
}

/// A window inside a session, used by the drill-down view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Window {
    pub index: u32,
    pub name: String,
    pub active: bool,
    pub panes: u32,
}

impl Window {
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(4, '\t');
        let index = parts.next()?.trim().parse::<u32>().ok()?;
        let name = parts.next()?.to_string();
        let active = parts.next().map(str::trim) == Some("1");
        let panes = parts
            .next()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(1);

        Some(Self {
            index,
            name,
            active,
            panes,
        })
    }

    pub fn parse_list(output: &str) -> Vec<Self> {
        output.lines().filter_map(Self::parse_line).collect()
    }

    /// Target string understood by `switch-client -t`
    pub fn target(&self, session: &str) -> String {
        format!("{}:{}", session, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_line() {
        let s = Session::parse_line("dotfiles-main\t3\t1\t/home/user/dotfiles").unwrap();
        assert_eq!(s.name, "dotfiles-main");
        assert_eq!(s.windows, 3);
        assert!(s.attached);
        assert_eq!(s.path, Some(PathBuf::from("/home/user/dotfiles")));
    }

    #[test]
    fn test_parse_session_counts_clients() {
        let s = Session::parse_line("work\t1\t2\t/tmp").unwrap();
        assert!(s.attached);

        let s = Session::parse_line("work\t1\t0\t").unwrap();
        assert!(!s.attached);
        assert_eq!(s.path, None);
    }

    #[test]
    fn test_parse_session_list_skips_garbage() {
        let out = "a\t1\t0\t/a\n\nnot a session\nb\t2\t0\t/b\n";
        let sessions = Session::parse_list(out);
        let names: Vec<&str> = sessions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_window_line() {
        let w = Window::parse_line("2\tvim server\t1\t3").unwrap();
        assert_eq!(w.index, 2);
        assert_eq!(w.name, "vim server");
        assert!(w.active);
        assert_eq!(w.panes, 3);
        assert_eq!(w.target("api"), "api:2");
    }
}
