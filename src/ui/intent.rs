//! Requests the views hand to the controller, and the async side that
//! carries them out against tmux.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::backend::{RootResolver, SessionBackend};
use crate::tmux::{Session, Window};

/// Something a view wants done outside its own state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Move the client to this session
    Switch(String),
    /// Open the windows view for this session
    Drill(String),
    Kill(String),
    Rename { from: String, to: String },
    Create(String),
    /// Re-list sessions
    Reload,
    /// Move the client to a `session:window` target
    SelectWindow(String),
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Switch(_) | Intent::SelectWindow(_) => "switch",
            Intent::Drill(_) => "list windows",
            Intent::Kill(_) => "kill",
            Intent::Rename { .. } => "rename",
            Intent::Create(_) => "create",
            Intent::Reload => "reload",
        }
    }
}

/// Completions delivered back to the event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    SessionsLoaded {
        sessions: Vec<Session>,
        roots: HashMap<String, String>,
    },
    WindowsLoaded {
        session: String,
        windows: Vec<Window>,
    },
    Failed {
        action: &'static str,
        error: String,
    },
}

/// Shared handles to the outside world
#[derive(Clone)]
pub struct Backends {
    pub sessions: Arc<dyn SessionBackend>,
    pub roots: Arc<dyn RootResolver>,
}

impl Backends {
    pub fn new(sessions: Arc<dyn SessionBackend>, roots: Arc<dyn RootResolver>) -> Self {
        Self { sessions, roots }
    }
}

/// List sessions and resolve their repo roots. A failed listing reads as
/// zero sessions.
pub async fn load_sessions(backends: &Backends) -> AppEvent {
    let sessions = match backends.sessions.list_sessions().await {
        Ok(sessions) => sessions,
        Err(e) => {
            tracing::warn!("listing sessions failed, showing none: {}", e);
            Vec::new()
        }
    };
    let roots = backends.roots.resolve_roots(&sessions).await;
    tracing::debug!(sessions = sessions.len(), grouped = roots.len(), "sessions loaded");
    AppEvent::SessionsLoaded { sessions, roots }
}

/// Carry out one intent, reporting every outcome on `tx`. Mutations are
/// always followed by a fresh listing, successful or not.
pub async fn run_intent(intent: Intent, backends: Backends, tx: UnboundedSender<AppEvent>) {
    tracing::debug!(?intent, "running intent");
    let label = intent.label();
    let backend = backends.sessions.as_ref();

    let outcome = match &intent {
        Intent::Reload => Ok(()),
        Intent::Drill(session) => match backend.list_windows(session).await {
            Ok(windows) => {
                let _ = tx.send(AppEvent::WindowsLoaded {
                    session: session.clone(),
                    windows,
                });
                return;
            }
            Err(e) => Err(e),
        },
        Intent::Switch(target) | Intent::SelectWindow(target) => {
            backend.switch_client(target).await
        }
        Intent::Kill(name) => backend.kill_session(name).await,
        Intent::Rename { from, to } => backend.rename_session(from, to).await,
        Intent::Create(name) => backend.create_session(name).await,
    };

    if let Err(e) = outcome {
        tracing::warn!("{} failed: {}", label, e);
        let _ = tx.send(AppEvent::Failed {
            action: label,
            error: e.to_string(),
        });
        if matches!(intent, Intent::Drill(_)) {
            return;
        }
    }

    let _ = tx.send(load_sessions(&backends).await);
}
