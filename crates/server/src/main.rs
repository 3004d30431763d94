//! Recommendation API server.
//!
//! Configuration comes from `RECS_*` environment variables (see `Config`).

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,engine=debug")),
        )
        .init();

    let config = Config::from_env()?;
    info!("Starting recommendation server with data dir {:?}", config.data_dir);

    server::run(config).await
}
