//! # Engine Crate
//!
//! Item-item collaborative filtering over an in-memory rating table.
//!
//! ## Components
//!
//! - **matrix**: dense user × movie rating matrix (missing = 0, last write wins)
//! - **similarity**: movie × movie cosine similarity with nearest-neighbor queries
//! - **ranking**: similar, popular and genre-filtered top-N lists
//! - **recommender**: shared state, queries, appends and the rebuild policy
//! - **evaluation**: training-set RMSE of the model
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{Dataset, SyntheticConfig};
//! use engine::{EngineConfig, Recommender};
//! use std::sync::Arc;
//!
//! let dataset = Dataset::load_or_generate(Path::new("data"), &SyntheticConfig::default())?;
//! let recommender = Arc::new(Recommender::new(dataset, EngineConfig::default()));
//!
//! let similar = recommender.recommend_similar(1);
//! recommender.add_rating(999, 1, 4.5);
//! let popular = recommender.list_popular(20); // already sees the new rating
//! recommender.rebuild();                      // similarity catches up
//! ```

pub mod config;
pub mod error;
pub mod evaluation;
pub mod matrix;
pub mod ranking;
pub mod recommender;
pub mod similarity;

pub use config::{EngineConfig, RebuildPolicy};
pub use error::{EngineError, Result};
pub use matrix::RatingMatrix;
pub use ranking::{DEFAULT_LIMIT, DEFAULT_NEIGHBORS, GenreMatch, MIN_SUPPORT, PopularMovie, SimilarMovie};
pub use recommender::{EngineSummary, ModelSnapshot, Recommender};
pub use similarity::SimilarityModel;
