use clap::Parser;
use tracing_subscriber::EnvFilter;

use starmap_api::cli::{self, Cli};
use starmap_api::is_production;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("starmap_api=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = starmap_api::config::config().clone();
    tracing::info!("Starting Starmap API in {:?} mode", config.environment);
    if is_production!() && config.security.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("Wildcard CORS origin configured in production");
    }

    let cli = Cli::parse();
    if let Err(e) = cli::run(cli, config).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
