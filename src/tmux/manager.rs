use async_trait::async_trait;
use tokio::process::Command;

use crate::backend::SessionBackend;
use crate::error::{Error, Result};

use super::session::{Session, Window, SESSION_FORMAT, WINDOW_FORMAT};

/// Tmux manager - handles all tmux operations
#[derive(Debug, Clone, Default)]
pub struct TmuxManager {
    /// Server socket name passed as `-L`; `None` uses the default server
    socket: Option<String>,
}

impl TmuxManager {
    pub fn new(socket: Option<String>) -> Self {
        Self { socket }
    }

    fn tmux_cmd(&self) -> Command {
        let mut cmd = Command::new("tmux");
        if let Some(socket) = &self.socket {
            cmd.args(["-L", socket.as_str()]);
        }
        cmd
    }

    /// True when running inside a tmux client
    pub fn inside_tmux() -> bool {
        std::env::var_os("TMUX").is_some_and(|v| !v.is_empty())
    }

    /// Check if tmux is available
    pub async fn is_available() -> bool {
        Command::new("tmux").arg("-V").output().await.is_ok()
    }

    async fn run(&self, what: &str, args: &[&str]) -> Result<()> {
        let output = self.tmux_cmd().args(args).output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::tmux(format!(
                "Failed to {}: {}",
                what,
                stderr.trim()
            )));
        }

        Ok(())
    }

    /// Attach to a session in the foreground (blocking until detach)
    pub async fn attach_session(&self, target: &str) -> Result<()> {
        let status = self
            .tmux_cmd()
            .args(["attach-session", "-t", target])
            .status()
            .await?;

        if !status.success() {
            return Err(Error::tmux(format!("Failed to attach to {target}")));
        }

        Ok(())
    }
}

/// Reject names tmux would silently rewrite or refuse.
pub fn validate_session_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("session name is empty".to_string()));
    }
    if name.contains(':') || name.contains('.') {
        return Err(Error::InvalidInput(format!(
            "session name may not contain ':' or '.': {name}"
        )));
    }
    Ok(())
}

#[async_trait]
impl SessionBackend for TmuxManager {
    async fn list_sessions(&self) -> Result<Vec<Session>> {
        let output = self
            .tmux_cmd()
            .args(["list-sessions", "-F", SESSION_FORMAT])
            .output()
            .await?;

        if !output.status.success() {
            // tmux not running or no sessions
            return Ok(Vec::new());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(Session::parse_list(&stdout))
    }

    async fn list_windows(&self, session: &str) -> Result<Vec<Window>> {
        let target = format!("={session}");
        let output = self
            .tmux_cmd()
            .args(["list-windows", "-t", target.as_str(), "-F", WINDOW_FORMAT])
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::tmux(format!(
                "Failed to list windows: {}",
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(Window::parse_list(&stdout))
    }

    async fn kill_session(&self, name: &str) -> Result<()> {
        let target = format!("={name}");
        self.run("kill session", &["kill-session", "-t", target.as_str()])
            .await
    }

    async fn rename_session(&self, from: &str, to: &str) -> Result<()> {
        validate_session_name(to)?;
        let target = format!("={from}");
        self.run("rename session", &["rename-session", "-t", target.as_str(), to])
            .await
    }

    async fn create_session(&self, name: &str) -> Result<()> {
        validate_session_name(name)?;
        let cwd = std::env::current_dir()?.to_string_lossy().into_owned();
        self.run(
            "create session",
            &["new-session", "-d", "-s", name, "-c", cwd.as_str()],
        )
        .await
    }

    async fn switch_client(&self, target: &str) -> Result<()> {
        self.run("switch client", &["switch-client", "-t", target])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_session_name() {
        assert!(validate_session_name("api-main").is_ok());
        assert!(matches!(
            validate_session_name("  "),
            Err(Error::InvalidInput(_))
        ));
        assert!(validate_session_name("a:b").is_err());
        assert!(validate_session_name("v1.2").is_err());
    }

    fn cmd_args(tmux: &TmuxManager) -> Vec<String> {
        tmux.tmux_cmd()
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_socket_selects_server() {
        assert_eq!(
            cmd_args(&TmuxManager::new(Some("work".to_string()))),
            vec!["-L", "work"]
        );
        assert!(cmd_args(&TmuxManager::default()).is_empty());
    }
}
