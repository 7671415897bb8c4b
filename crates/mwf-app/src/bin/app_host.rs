//! Minimal host stub intended for desktop shells.
//! This binary is guarded by the `host` feature and simply boots the headless
//! `mwf_app::AppCore` against an offline gateway, so a shell integration can
//! check configuration and logging before wiring its own `BackendGateway`.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mwf_app::{AppConfig, AppCore, SessionCreationRequest};

#[derive(Parser)]
#[command(name = "app-host")]
#[command(about = "Boot the mining game client core without a backend", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Attempt to create a game under this nickname
    #[arg(long)]
    nickname: Option<String>,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AppConfig::default(),
    };
    config.merge_with_env()?;
    config.validate()?;
    Ok(config)
}

fn init_logging(config: &AppConfig, verbose: bool) {
    let fallback: &str = if verbose { "debug" } else { &config.log_filter };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config, cli.verbose);

    let app = AppCore::offline(config)?;
    tracing::info!(config = ?app.config(), "app host ready");

    if let Some(nickname) = cli.nickname {
        let request = SessionCreationRequest::new_game(nickname);
        if let Err(err) = app.submit_create_or_join(request).await {
            println!("create failed [{}]: {err}", err.category());
        }
    }

    let registry = app.registry();
    let session = app.session();
    println!("Known games: {}", registry.len());
    println!("Selected: {}", registry.selection_label());
    println!("Session: {}", session.phase);
    if let Some(err) = &session.last_error {
        println!("Last error: {err}");
    }
    Ok(())
}
