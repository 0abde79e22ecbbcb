//! Repository-root resolution for sessions.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::backend::RootResolver;
use crate::error::{Error, Result};
use crate::tmux::Session;

/// Resolves a session's working directory to its repository root with git.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitRootResolver;

impl GitRootResolver {
    pub fn new() -> Self {
        Self
    }

    /// Repository root for `dir`, following worktrees back to the main
    /// checkout.
    pub async fn repo_root(&self, dir: &Path) -> Result<PathBuf> {
        let output = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(["rev-parse", "--git-common-dir"])
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::git(format!(
                "rev-parse failed in {}: {}",
                dir.display(),
                stderr.trim()
            )));
        }

        let common_dir = String::from_utf8_lossy(&output.stdout).trim().to_string();
        root_from_common_dir(dir, &common_dir)
            .ok_or_else(|| Error::git(format!("no repository root for {}", dir.display())))
    }
}

#[async_trait]
impl RootResolver for GitRootResolver {
    async fn resolve_roots(&self, sessions: &[Session]) -> HashMap<String, String> {
        let mut roots = HashMap::new();
        for session in sessions {
            let Some(path) = session.path.as_deref() else {
                continue;
            };
            let root = match self.repo_root(path).await {
                Ok(root) => root,
                Err(e) => {
                    tracing::debug!(session = %session.name, "no repo root: {}", e);
                    continue;
                }
            };
            let root = root.to_string_lossy().into_owned();
            if name_matches_root(&session.name, &root) {
                roots.insert(session.name.clone(), root);
            } else {
                tracing::debug!(
                    session = %session.name,
                    root = %root,
                    "session name does not match repo, not grouping"
                );
            }
        }
        roots
    }
}

/// Turn the output of `git rev-parse --git-common-dir` into the directory
/// that contains it. A relative common dir is relative to `dir`.
pub fn root_from_common_dir(dir: &Path, common_dir: &str) -> Option<PathBuf> {
    if common_dir.is_empty() {
        return None;
    }
    let common = Path::new(common_dir);
    let common = if common.is_absolute() {
        common.to_path_buf()
    } else {
        dir.join(common)
    };
    clean(&common).parent().map(Path::to_path_buf)
}

/// A session may only join a repo group when its name is the repo's base
/// name or starts with `base-`. A session whose cwd wandered into another
/// repo keeps its own identity.
pub fn name_matches_root(name: &str, root: &str) -> bool {
    let Some(base) = base_name(root) else {
        return false;
    };
    name == base
        || name
            .strip_prefix(base)
            .is_some_and(|rest| rest.starts_with('-'))
}

/// Last path component of a root string.
pub fn base_name(root: &str) -> Option<&str> {
    root.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
}

/// Lexical cleanup of `.` and `..` components.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
