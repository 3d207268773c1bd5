use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use wrapped_core::api::ApiClient;
use wrapped_core::auth::{random_state, AuthClient};
use wrapped_core::config::{Config, PathsConfig};
use wrapped_core::credentials::Credentials;
use wrapped_core::fetcher::{FetchError, Fetcher};
use wrapped_core::normalize::Normalizer;
use wrapped_core::raw::RawStore;

#[derive(Parser, Debug)]
#[command(name = "wrapped")]
#[command(about = "Fetch and curate your listening history", long_about = None)]
struct Cli {
    /// Keep raw, curated, exports and credentials under this directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log at debug level (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download top tracks, top artists and recent plays as raw JSON
    Fetch,
    /// Turn raw JSON into curated tables, aggregates and the summary
    Normalize,
    /// Fetch, then normalize
    Run,
    /// Obtain or refresh API credentials
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
    /// Print where configuration and data live
    Paths,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Print the URL to open in a browser to grant access
    Url,
    /// Exchange the `code` from the redirect URL for tokens
    Exchange { code: String },
    /// Replace the access token using the stored refresh token
    Refresh,
}

/// Exit status when the stored token was rejected.
const EXIT_NEEDS_REFRESH: u8 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "debug,hyper_util=warn,reqwest=warn,hyper=warn"
    } else {
        "info"
    };
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter.as_str())
        .with_target(false)
        .init();

    let mut config = Config::load().context("loading config")?;
    if let Some(dir) = &cli.data_dir {
        config.paths = PathsConfig::rooted_at(dir);
    }

    match cli.command {
        Command::Fetch => {
            if !fetch(&config).await? {
                return Ok(ExitCode::from(EXIT_NEEDS_REFRESH));
            }
        }
        Command::Normalize => normalize(&config)?,
        Command::Run => {
            if !fetch(&config).await? {
                return Ok(ExitCode::from(EXIT_NEEDS_REFRESH));
            }
            normalize(&config)?;
        }
        Command::Auth { command } => auth(&config, command).await?,
        Command::Paths => paths(&config),
    }
    Ok(ExitCode::SUCCESS)
}

/// `Ok(false)` when the token was rejected and a refresh is required.
async fn fetch(config: &Config) -> anyhow::Result<bool> {
    let creds = Credentials::load(&config.paths.credentials_file)?;
    if creds.is_expired(chrono::Utc::now()) {
        warn!("Stored access token has expired; the API will likely reject it");
    }

    let api = ApiClient::new(&config.api, &config.fetch, &creds.access_token)?;
    let store = RawStore::new(&config.paths.raw_dir);
    match Fetcher::new(&api, &store, &config.fetch).run().await {
        Ok(report) => {
            info!("Fetch complete: {} files", report.written.len());
            Ok(true)
        }
        Err(e) if e.needs_refresh() => {
            eprintln!("Access token rejected. Run `wrapped auth refresh` and try again.");
            Ok(false)
        }
        Err(FetchError::Api(e)) => Err(e).context("fetch failed"),
        Err(FetchError::Store(e)) => Err(e.context("saving raw response")),
    }
}

fn normalize(config: &Config) -> anyhow::Result<()> {
    let report = Normalizer::from_config(config).run()?;
    for path in &report.missing {
        eprintln!("skipped (not fetched): {}", path.display());
    }
    println!(
        "{} track rows, {} artist rows, {} plays -> {}",
        report.tracks,
        report.artists,
        report.plays,
        config.paths.curated_dir.display()
    );
    Ok(())
}

async fn auth(config: &Config, command: AuthCommand) -> anyhow::Result<()> {
    let client = AuthClient::new(&config.api, &config.auth)
        .context("set [auth] client_id/client_secret or SPOTIFY_CLIENT_ID/SPOTIFY_CLIENT_SECRET")?;
    let path = &config.paths.credentials_file;

    match command {
        AuthCommand::Url => {
            let state = random_state();
            println!("Open this URL and approve access:\n\n  {}\n", client.authorize_url(&state));
            println!("Then run `wrapped auth exchange <code>` with the `code` from the redirect.");
            println!("The redirect's `state` should be: {}", state);
        }
        AuthCommand::Exchange { code } => {
            let creds = client.exchange_code(code.trim()).await?;
            creds.save(path)?;
            println!("Credentials saved to {}", path.display());
        }
        AuthCommand::Refresh => {
            let current = Credentials::load(path)?;
            let creds = client.refresh(&current).await?;
            creds.save(path)?;
            println!("Access token refreshed ({})", path.display());
        }
    }
    Ok(())
}

fn paths(config: &Config) {
    println!("config       {}", Config::config_path().display());
    println!("raw          {}", config.paths.raw_dir.display());
    println!("curated      {}", config.paths.curated_dir.display());
    println!("exports      {}", config.paths.exports_dir.display());
    println!("credentials  {}", config.paths.credentials_file.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["wrapped", "--data-dir", "/tmp/w", "auth", "exchange", "abc"])
            .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/w")));
        assert!(matches!(
            cli.command,
            Command::Auth { command: AuthCommand::Exchange { ref code } } if code == "abc"
        ));

        let cli = Cli::try_parse_from(["wrapped", "run", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Run));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
