use std::path::PathBuf;

use data_loader::{SyntheticConfig, UserId};
use engine::{EngineConfig, RebuildPolicy};
use serde::Deserialize;

/// Prefix for every environment variable read by [`Config::from_env`]
pub const ENV_PREFIX: &str = "RECS_";

/// Server configuration loaded from `RECS_*` environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding movies.csv and ratings.csv
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// User id recorded for ratings submitted over HTTP
    #[serde(default = "default_demo_user_id")]
    pub demo_user_id: UserId,

    /// Neighbors returned by /recommend/:id
    #[serde(default = "default_neighbors")]
    pub neighbors: usize,

    /// Catalog size above which a similarity build logs a capacity warning
    #[serde(default = "default_max_similarity_items")]
    pub max_similarity_items: usize,

    /// Rebuild the similarity model after this many new ratings; unset = only on /retrain
    #[serde(default)]
    pub rebuild_every: Option<usize>,

    /// Log the training RMSE after the first build
    #[serde(default)]
    pub evaluate_on_startup: bool,

    #[serde(default = "default_synthetic_movies")]
    pub synthetic_movies: u32,

    #[serde(default = "default_synthetic_users")]
    pub synthetic_users: u32,

    #[serde(default = "default_synthetic_ratings")]
    pub synthetic_ratings: usize,

    #[serde(default)]
    pub synthetic_seed: Option<u64>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_demo_user_id() -> UserId {
    999
}

fn default_neighbors() -> usize {
    engine::DEFAULT_NEIGHBORS
}

fn default_max_similarity_items() -> usize {
    5000
}

fn default_synthetic_movies() -> u32 {
    2000
}

fn default_synthetic_users() -> u32 {
    500
}

fn default_synthetic_ratings() -> usize {
    50_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            host: default_host(),
            port: default_port(),
            demo_user_id: default_demo_user_id(),
            neighbors: default_neighbors(),
            max_similarity_items: default_max_similarity_items(),
            rebuild_every: None,
            evaluate_on_startup: false,
            synthetic_movies: default_synthetic_movies(),
            synthetic_users: default_synthetic_users(),
            synthetic_ratings: default_synthetic_ratings(),
            synthetic_seed: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed(ENV_PREFIX)
            .from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_neighbors(self.neighbors)
            .with_max_similarity_items(self.max_similarity_items)
            .with_rebuild_policy(RebuildPolicy::from_interval(self.rebuild_every))
    }

    pub fn synthetic_config(&self) -> SyntheticConfig {
        SyntheticConfig {
            movies: self.synthetic_movies,
            users: self.synthetic_users,
            ratings: self.synthetic_ratings,
            seed: self.synthetic_seed,
        }
    }
}
