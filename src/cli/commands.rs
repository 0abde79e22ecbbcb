use std::sync::Arc;
use std::time::Duration;

use crate::backend::{NoRoots, RootResolver};
use crate::cli::{Args, Command};
use crate::config::ConfigFile;
use crate::error::{Error, Result};
use crate::git::GitRootResolver;
use crate::tmux::TmuxManager;
use crate::tree::{self, TreeNode};
use crate::ui::{App, AppOptions, Backends};

pub async fn run_cli(args: Args) -> Result<()> {
    match args.command {
        Some(Command::Version) => {
            println!("mux v{}", crate::VERSION);
            Ok(())
        }

        Some(Command::Tree { json }) => {
            let (_, tmux) = setup(args.socket, args.no_repo_roots).await?;
            let backends = backends(&tmux, args.no_repo_roots);
            handle_tree(&backends, json).await
        }

        None => {
            let (config, tmux) = setup(args.socket, args.no_repo_roots).await?;
            let backends = backends(&tmux, args.no_repo_roots || !config.repo_roots);
            let options = AppOptions {
                keys: config.key_bindings(),
                refresh: (config.refresh_secs > 0).then(|| Duration::from_secs(config.refresh_secs)),
                inside_tmux: TmuxManager::inside_tmux(),
            };

            let mut app = App::new(backends, tmux, options);
            app.run().await
        }
    }
}

/// Load the config file and pick the tmux server; flags win over the file.
async fn setup(socket: Option<String>, no_repo_roots: bool) -> Result<(ConfigFile, TmuxManager)> {
    let config = ConfigFile::load().await?.unwrap_or_default();

    if !TmuxManager::is_available().await {
        return Err(Error::Other("tmux not found in PATH".to_string()));
    }

    let socket = socket.or_else(|| config.socket.clone());
    tracing::info!(
        socket = socket.as_deref().unwrap_or("default"),
        repo_roots = config.repo_roots && !no_repo_roots,
        "starting"
    );
    Ok((config, TmuxManager::new(socket)))
}

fn backends(tmux: &TmuxManager, no_repo_roots: bool) -> Backends {
    let roots: Arc<dyn RootResolver> = if no_repo_roots {
        Arc::new(NoRoots)
    } else {
        Arc::new(GitRootResolver::new())
    };
    Backends::new(Arc::new(tmux.clone()), roots)
}

async fn handle_tree(backends: &Backends, json: bool) -> Result<()> {
    let sessions = backends.sessions.list_sessions().await?;
    let roots = backends.roots.resolve_roots(&sessions).await;
    let forest = tree::build_tree(&sessions, &roots);

    if json {
        let json_str = serde_json::to_string_pretty(&forest)?;
        println!("{}", json_str);
        return Ok(());
    }

    if forest.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }

    for root in &forest {
        println!("{}", tree_line(root));
        for child in &root.children {
            println!("{}", tree_line(child));
        }
    }
    println!("\nTotal: {} sessions", sessions.len());
    Ok(())
}

fn tree_line(node: &TreeNode) -> String {
    if node.is_group_header() {
        return format!("▾ {}", node.display_name);
    }
    let indent = if node.depth > 0 { "  ┊ " } else { "" };
    let badge = if node.attached() { " ●" } else { "" };
    format!("{indent}{}  {}w{badge}", node.display_name, node.windows())
}
