use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyModifiers};
use serde::Deserialize;
use tokio::fs;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// `~/.config/mux/config.json`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// tmux server socket name (`tmux -L`)
    pub socket: Option<String>,
    /// Group sessions by git repository root
    pub repo_roots: bool,
    /// Background refresh period in seconds, 0 disables it
    pub refresh_secs: u64,
    keybindings: HashMap<String, OneOrMany>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            socket: None,
            repo_roots: true,
            refresh_secs: 5,
            keybindings: HashMap::new(),
        }
    }
}

impl ConfigFile {
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::config("Cannot determine config directory"))?;
        Ok(dir.join("mux").join("config.json"))
    }

    /// Load the user config; a missing file is `Ok(None)`.
    pub async fn load() -> Result<Option<Self>> {
        Self::load_from(&Self::default_path()?).await
    }

    pub async fn load_from(path: &Path) -> Result<Option<Self>> {
        let content = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let cfg = serde_json::from_str::<Self>(&content)?;
        Ok(Some(cfg))
    }

    /// Key bindings with this file's overrides applied
    pub fn key_bindings(&self) -> KeyBindings {
        let mut kb = KeyBindings::default();
        for (action, spec) in &self.keybindings {
            kb.apply_override(action, spec.clone().into_vec());
        }
        kb
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    const fn ctrl(ch: char) -> Self {
        Self {
            code: KeyCode::Char(ch),
            modifiers: KeyModifiers::CONTROL,
        }
    }

    const fn char(ch: char) -> Self {
        Self::plain(KeyCode::Char(ch))
    }
}

/// Named actions and the keys that trigger them
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<&'static str, Vec<KeySpec>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let defaults: [(&'static str, Vec<KeySpec>); 13] = [
            (
                "quit",
                vec![KeySpec::char('q'), KeySpec::ctrl('c')],
            ),
            (
                "up",
                vec![KeySpec::plain(KeyCode::Up), KeySpec::char('k')],
            ),
            (
                "down",
                vec![KeySpec::plain(KeyCode::Down), KeySpec::char('j')],
            ),
            (
                "first",
                vec![KeySpec::char('g'), KeySpec::plain(KeyCode::Home)],
            ),
            (
                "last",
                vec![KeySpec::char('G'), KeySpec::plain(KeyCode::End)],
            ),
            ("toggle", vec![KeySpec::char(' ')]),
            ("activate", vec![KeySpec::plain(KeyCode::Enter)]),
            (
                "drill",
                vec![
                    KeySpec::char('l'),
                    KeySpec::plain(KeyCode::Right),
                    KeySpec::plain(KeyCode::Tab),
                ],
            ),
            (
                "back",
                vec![
                    KeySpec::char('h'),
                    KeySpec::plain(KeyCode::Left),
                    KeySpec::plain(KeyCode::Esc),
                    KeySpec::plain(KeyCode::Backspace),
                ],
            ),
            ("delete", vec![KeySpec::char('d')]),
            ("rename", vec![KeySpec::char('r')]),
            ("new_session", vec![KeySpec::char('n')]),
            ("refresh", vec![KeySpec::ctrl('r')]),
        ];

        Self {
            bindings: defaults.into_iter().collect(),
        }
    }
}

impl KeyBindings {
    fn apply_override(&mut self, action: &str, specs: Vec<String>) {
        let Some(slot) = self.bindings.get_mut(action) else {
            tracing::warn!("ignoring key binding for unknown action '{}'", action);
            return;
        };

        let parsed: Vec<KeySpec> = specs.iter().filter_map(|s| parse_key_spec(s)).collect();
        if parsed.is_empty() {
            tracing::warn!("no usable keys for action '{}': {:?}", action, specs);
            return;
        }
        *slot = parsed;
    }

    pub fn matches(&self, action: &'static str, code: &KeyCode, modifiers: KeyModifiers) -> bool {
        // Terminals report uppercase letters with SHIFT; bindings spell them
        // as the bare character.
        let modifiers = match code {
            KeyCode::Char(_) => modifiers - KeyModifiers::SHIFT,
            _ => modifiers,
        };
        self.bindings
            .get(action)
            .is_some_and(|v| v.iter().any(|k| &k.code == code && k.modifiers == modifiers))
    }
}

pub fn parse_key_spec(s: &str) -> Option<KeySpec> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    // A lone "+" is the plus key, not a separator
    if s == "+" {
        return Some(KeySpec::char('+'));
    }

    let mut modifiers = KeyModifiers::NONE;
    let parts: Vec<&str> = s.split('+').map(str::trim).collect();
    let (mods, key_part) = match parts.split_last() {
        Some((key, mods)) => (mods, *key),
        None => return None,
    };

    for m in mods {
        match m.to_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "alt" => modifiers |= KeyModifiers::ALT,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            _ => return None,
        }
    }

    let code = match key_part.to_lowercase().as_str() {
        "enter" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "space" => KeyCode::Char(' '),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        lower => {
            if let Some(n) = lower
                .strip_prefix('f')
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| (1..=12).contains(n))
            {
                KeyCode::F(n)
            } else {
                // Single-character fallback (keeps case for e.g. "G")
                let mut chars = key_part.chars();
                let ch = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                KeyCode::Char(ch)
            }
        }
    };

    // Shift on a character is carried by its case
    let code = match code {
        KeyCode::Char(ch) => {
            let shifted = modifiers.contains(KeyModifiers::SHIFT);
            modifiers -= KeyModifiers::SHIFT;
            KeyCode::Char(if shifted { ch.to_ascii_uppercase() } else { ch })
        }
        other => other,
    };

    Some(KeySpec { code, modifiers })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_spec() {
        assert_eq!(
            parse_key_spec("ctrl+r"),
            Some(KeySpec {
                code: KeyCode::Char('r'),
                modifiers: KeyModifiers::CONTROL
            })
        );
        assert_eq!(parse_key_spec("Enter"), Some(KeySpec::plain(KeyCode::Enter)));
        assert_eq!(parse_key_spec("F2"), Some(KeySpec::plain(KeyCode::F(2))));
        assert_eq!(parse_key_spec("G"), Some(KeySpec::char('G')));
        assert_eq!(parse_key_spec("space"), Some(KeySpec::char(' ')));
        assert_eq!(parse_key_spec("+"), Some(KeySpec::char('+')));
        assert_eq!(parse_key_spec("shift+g"), Some(KeySpec::char('G')));
        assert_eq!(
            parse_key_spec("ctrl+shift+x"),
            Some(KeySpec {
                code: KeyCode::Char('X'),
                modifiers: KeyModifiers::CONTROL
            })
        );
        assert_eq!(parse_key_spec("hyper+x"), None);
        assert_eq!(parse_key_spec("xy"), None);
        assert_eq!(parse_key_spec(""), None);
    }

    #[test]
    fn test_defaults_match() {
        let kb = KeyBindings::default();
        assert!(kb.matches("down", &KeyCode::Char('j'), KeyModifiers::NONE));
        assert!(kb.matches("last", &KeyCode::Char('G'), KeyModifiers::SHIFT));
        assert!(kb.matches("refresh", &KeyCode::Char('r'), KeyModifiers::CONTROL));
        assert!(!kb.matches("rename", &KeyCode::Char('r'), KeyModifiers::CONTROL));
        assert!(kb.matches("rename", &KeyCode::Char('r'), KeyModifiers::NONE));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "socket": "work",
                "refresh_secs": 0,
                "keybindings": { "rename": "F2", "down": ["j", "ctrl+n"], "bogus": "x" }
            }"#,
        )
        .unwrap();

        let cfg = ConfigFile::load_from(&path).await.unwrap().unwrap();
        assert_eq!(cfg.socket.as_deref(), Some("work"));
        assert!(cfg.repo_roots);
        assert_eq!(cfg.refresh_secs, 0);

        let kb = cfg.key_bindings();
        assert!(kb.matches("rename", &KeyCode::F(2), KeyModifiers::NONE));
        assert!(!kb.matches("rename", &KeyCode::Char('r'), KeyModifiers::NONE));
        assert!(kb.matches("down", &KeyCode::Char('n'), KeyModifiers::CONTROL));
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ConfigFile::load_from(&dir.path().join("nope.json"))
            .await
            .unwrap();
        assert!(cfg.is_none());
    }

    #[tokio::test]
    async fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ConfigFile::load_from(&path).await,
            Err(Error::Json(_))
        ));
    }
}
