//! Dataset bootstrap: locate, load, validate, or synthesize the two tables.
//!
//! Steps:
//! 1. Resolve the data directory (falls back to `backend/<dir>`)
//! 2. If `movies.csv` is missing or tiny, generate a synthetic dataset and write it
//! 3. Otherwise parse both files in parallel
//! 4. Validate before handing anything to the engine

use crate::catalog::Catalog;
use crate::error::{DataLoadError, Result};
use crate::interactions::InteractionTable;
use crate::parser;
use crate::synthetic::{self, SyntheticConfig};
use crate::types::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const MOVIES_FILE: &str = "movies.csv";
pub const RATINGS_FILE: &str = "ratings.csv";

/// A movies file smaller than this is treated as a placeholder and regenerated
pub const MIN_MOVIES_FILE_BYTES: u64 = 10 * 1024;

/// The two parsed tables the engine is built from
#[derive(Debug, Clone)]
pub struct Dataset {
    pub catalog: Catalog,
    pub interactions: InteractionTable,
}

impl Dataset {
    /// Validate raw rows and wrap them into a dataset
    pub fn from_parts(movies: Vec<Movie>, ratings: Vec<Rating>) -> Result<Self> {
        validate_ratings(&ratings)?;
        let catalog = Catalog::new(movies)?;

        let orphans = ratings.iter().filter(|r| !catalog.contains(r.movie_id)).count();
        if orphans > 0 {
            warn!("{} ratings reference movies missing from the catalog", orphans);
        }

        Ok(Self {
            catalog,
            interactions: InteractionTable::from_ratings(ratings),
        })
    }

    /// Load movies.csv and ratings.csv from a directory
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading dataset from {:?}", data_dir);

        let movies_path = data_dir.join(MOVIES_FILE);
        let ratings_path = data_dir.join(RATINGS_FILE);

        // Parse both files in parallel
        let (movies, ratings) = rayon::join(
            || parser::parse_movies(&movies_path),
            || parser::parse_ratings(&ratings_path),
        );
        let movies = movies?;
        let ratings = ratings?;

        info!("Loaded {} movies, {} ratings", movies.len(), ratings.len());
        Self::from_parts(movies, ratings)
    }

    /// Load the dataset, synthesizing and persisting one when none is usable
    pub fn load_or_generate(data_dir: &Path, synthetic: &SyntheticConfig) -> Result<Self> {
        let data_dir = resolve_data_dir(data_dir);
        if !needs_generation(&data_dir) {
            return Self::load_from_files(&data_dir);
        }

        info!(
            "Generating synthetic dataset ({} movies, {} ratings) in {:?}",
            synthetic.movies, synthetic.ratings, data_dir
        );
        let (movies, ratings) = synthetic::generate(synthetic);

        fs::create_dir_all(&data_dir)?;
        parser::write_movies(&data_dir.join(MOVIES_FILE), &movies)?;
        parser::write_ratings(&data_dir.join(RATINGS_FILE), &ratings)?;
        info!("Synthetic dataset written");

        Self::from_parts(movies, ratings)
    }
}

/// Pick the directory holding the dataset
///
/// When `data_dir` has no movies file but `backend/<data_dir>` does, use that.
pub fn resolve_data_dir(data_dir: &Path) -> PathBuf {
    if data_dir.join(MOVIES_FILE).exists() {
        return data_dir.to_path_buf();
    }
    let fallback = Path::new("backend").join(data_dir);
    if fallback.join(MOVIES_FILE).exists() {
        info!("Using dataset under {:?}", fallback);
        return fallback;
    }
    data_dir.to_path_buf()
}

/// True when the movies file is absent or below the placeholder threshold
pub fn needs_generation(data_dir: &Path) -> bool {
    match fs::metadata(data_dir.join(MOVIES_FILE)) {
        Ok(meta) => meta.len() <= MIN_MOVIES_FILE_BYTES,
        Err(_) => true,
    }
}

/// Reject rating values outside the declared range
fn validate_ratings(ratings: &[Rating]) -> Result<()> {
    for rating in ratings {
        if !(MIN_RATING..=MAX_RATING).contains(&rating.rating) {
            return Err(DataLoadError::InvalidValue {
                field: "rating".to_string(),
                value: format!(
                    "{} (user {}, movie {})",
                    rating.rating, rating.user_id, rating.movie_id
                ),
            });
        }
    }
    Ok(())
}
