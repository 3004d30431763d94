//! Error types for the engine crate.
//!
//! Empty recommendation lists are valid results and never show up here.

use data_loader::{DataLoadError, MovieId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Direct lookup of a movie id that is not in the catalog
    #[error("Movie {0} not found")]
    MovieNotFound(MovieId),

    /// Bootstrap failed; the engine does not start on partial data
    #[error("Failed to load dataset: {0}")]
    Load(#[from] DataLoadError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
