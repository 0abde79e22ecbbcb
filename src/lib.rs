pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod tmux;
pub mod tree;
pub mod ui;

pub use error::{Error, Result};

/// Version of mux
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
