//! # Data Loader Crate
//!
//! This crate supplies the two read-only record sources the recommendation
//! engine is built from: the movie catalog and the rating table.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, Rating, MovieStats)
//! - **parser**: Read and write the CSV files
//! - **catalog**: Ordered, id-indexed movie catalog
//! - **interactions**: Append-only rating table with per-movie aggregates
//! - **synthetic**: Random dataset generation for empty installs
//! - **dataset**: Locate, load, validate or synthesize a dataset
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{Dataset, SyntheticConfig};
//! use std::path::Path;
//!
//! let dataset = Dataset::load_or_generate(Path::new("data"), &SyntheticConfig::default())?;
//! let first_page = dataset.catalog.all_items(0, 50);
//! let stats = dataset.interactions.movie_stats();
//! ```

pub mod catalog;
pub mod dataset;
pub mod error;
pub mod interactions;
pub mod parser;
pub mod synthetic;
pub mod types;

pub use catalog::Catalog;
pub use dataset::Dataset;
pub use error::{DataLoadError, Result};
pub use interactions::InteractionTable;
pub use synthetic::SyntheticConfig;
pub use types::{
    // Type aliases
    MovieId,
    UserId,
    // Core types
    Movie,
    MovieStats,
    Rating,
    // Constants
    GENRE_DELIMITER,
    GENRE_NAMES,
    MAX_RATING,
    MIN_RATING,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::from_parts(Vec::new(), Vec::new()).unwrap();
        assert!(dataset.catalog.is_empty());
        assert!(dataset.interactions.is_empty());
        assert!(dataset.catalog.genres_in_use().is_empty());
    }

    #[test]
    fn test_dataset_from_parts() {
        let dataset = Dataset::from_parts(
            vec![Movie::new(1193, "One Flew Over the Cuckoo's Nest (1975)", "Drama")],
            vec![Rating {
                user_id: 1,
                movie_id: 1193,
                rating: 5.0,
                timestamp: 978300760,
            }],
        )
        .unwrap();

        assert_eq!(dataset.catalog.item_by_id(1193).unwrap().year, Some(1975));
        assert_eq!(dataset.interactions.movie_stats()[&1193].rating_count, 1);
    }
}
