//! HTTP server for the movie recommendation engine.
//!
//! Thin request layer over [`engine::Recommender`]: routing, request
//! validation, CORS and startup. All recommendation logic lives in the
//! engine crate.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use engine::Recommender;
use tracing::info;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use routes::create_router;
pub use state::AppState;

/// Load (or synthesize) the dataset and build the first model
///
/// Any loader error aborts startup; the server never runs on partial data.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let start = Instant::now();
    let data_dir = config.data_dir.clone();
    let synthetic = config.synthetic_config();
    let engine_config = config.engine_config();
    let evaluate = config.evaluate_on_startup;

    let recommender = tokio::task::spawn_blocking(move || -> Result<Recommender> {
        let recommender = Recommender::load(&data_dir, &synthetic, engine_config)?;
        if evaluate {
            recommender.evaluate();
        }
        Ok(recommender)
    })
    .await
    .context("Startup task panicked")??;

    info!("Recommender ready in {:.2?}", start.elapsed());
    Ok(AppState::new(Arc::new(recommender), config.demo_user_id))
}

/// Build the state, bind and serve until shutdown
pub async fn run(config: Config) -> Result<()> {
    let state = build_state(&config).await?;
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
