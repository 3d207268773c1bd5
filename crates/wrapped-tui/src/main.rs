mod action;
mod app;
mod app_state;
mod component;
mod components;
mod focus;
mod snapshot;
mod theme;
mod widgets;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use wrapped_core::config::{Config, PathsConfig};
use wrapped_core::curated::CuratedStore;
use wrapped_core::normalize::Normalizer;

#[derive(Parser, Debug)]
#[command(name = "wrapped-tui")]
#[command(about = "Terminal dashboard over the curated listening data", long_about = None)]
struct Cli {
    /// Same layout as `wrapped --data-dir`
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(dir) = &cli.data_dir {
        config.paths = PathsConfig::rooted_at(dir);
    }

    let data_dir = wrapped_core::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("tui.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // The terminal belongs to the dashboard, so logs go to a file.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("wrapped-tui log: {}", log_path.display());
    tracing::info!("wrapped-tui starting, curated dir {}", config.paths.curated_dir.display());

    // Missing curated files are rebuilt from raw data on load.
    let provider = Arc::new(Normalizer::from_config(&config));
    let store = CuratedStore::new(&config.paths.curated_dir);

    let app = app::App::new(store, provider, config.paths.exports_dir.clone());
    let result = app.run().await;
    if let Err(e) = &result {
        tracing::error!("wrapped-tui exited with error: {:#}", e);
    }
    result
}
