use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use mux::cli::{run_cli, Args};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    // The TUI owns the terminal, so logs go to a file
    init_logging();

    // Parse CLI args
    let args = Args::parse();

    // Run CLI or TUI
    if let Err(e) = run_cli(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("MUX_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false);

    match open_log_file() {
        Some(file) => builder.with_writer(Mutex::new(file)).init(),
        None => builder.with_writer(std::io::sink).init(),
    }
}

fn open_log_file() -> Option<File> {
    let dir = dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|d| d.join("mux"))?;
    fs::create_dir_all(&dir).ok()?;
    let path: PathBuf = dir.join("mux.log");
    OpenOptions::new().create(true).append(true).open(path).ok()
}
