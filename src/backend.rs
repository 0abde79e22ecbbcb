//! Seams between the dashboard and the processes it drives.
//!
//! The view never calls tmux or git directly; the controller hands these
//! trait objects to spawned intent tasks, and tests swap in fakes.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::tmux::{Session, Window};

/// Session manager operations (implemented by [`crate::tmux::TmuxManager`])
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn list_sessions(&self) -> Result<Vec<Session>>;

    async fn list_windows(&self, session: &str) -> Result<Vec<Window>>;

    async fn kill_session(&self, name: &str) -> Result<()>;

    async fn rename_session(&self, from: &str, to: &str) -> Result<()>;

    async fn create_session(&self, name: &str) -> Result<()>;

    /// Point the current client at a session or `session:window` target
    async fn switch_client(&self, target: &str) -> Result<()>;
}

/// Maps session names to canonical project roots
/// (implemented by [`crate::git::GitRootResolver`])
#[async_trait]
pub trait RootResolver: Send + Sync {
    /// Only sessions with a known, name-consistent root appear in the map.
    async fn resolve_roots(&self, sessions: &[Session]) -> HashMap<String, String>;
}

/// Resolver used when repo-root grouping is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRoots;

#[async_trait]
impl RootResolver for NoRoots {
    async fn resolve_roots(&self, _sessions: &[Session]) -> HashMap<String, String> {
        HashMap::new()
    }
}
