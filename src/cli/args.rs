use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mux")]
#[command(version, about = "Tree dashboard for tmux sessions", long_about = None)]
pub struct Args {
    /// tmux server socket name (as in `tmux -L`)
    #[arg(short = 'L', long, global = true, env = "MUX_SOCKET")]
    pub socket: Option<String>,

    /// Group by name prefix only, skipping git repo-root lookups
    #[arg(long, global = true)]
    pub no_repo_roots: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the session tree and exit
    Tree {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}
