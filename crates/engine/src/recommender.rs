//! The recommender: shared process state plus the update coordinator.
//!
//! Consistency model:
//! - Popularity and genre rankings recompute from the rating table on every
//!   call, so an appended rating is visible to the next query.
//! - Similar-movie recommendations read the last built [`ModelSnapshot`].
//!   Under [`RebuildPolicy::Manual`] appends never trigger a rebuild; the
//!   model stays stale until `rebuild` is called.
//!
//! A rebuild works on a copy of the rating rows, outside every lock readers
//! take, and then swaps the `Arc` to the new snapshot. Readers hold either
//! the old snapshot or the new one, never a half-written matrix.

use crate::config::{EngineConfig, RebuildPolicy};
use crate::error::{EngineError, Result};
use crate::evaluation;
use crate::matrix::RatingMatrix;
use crate::ranking::{self, GenreMatch, PopularMovie, SimilarMovie};
use crate::similarity::SimilarityModel;
use data_loader::{
    Catalog, Dataset, InteractionTable, Movie, MovieId, Rating, SyntheticConfig, UserId,
};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, instrument, warn};

/// Rating matrix and similarity model built from the same table snapshot
#[derive(Debug, Default)]
pub struct ModelSnapshot {
    pub matrix: RatingMatrix,
    pub similarity: SimilarityModel,
    /// Number of rating rows the snapshot was built from
    pub rating_count: usize,
}

impl ModelSnapshot {
    pub fn build(ratings: &[Rating]) -> Self {
        let matrix = RatingMatrix::build(ratings);
        let similarity = SimilarityModel::build(&matrix);
        Self {
            matrix,
            similarity,
            rating_count: ratings.len(),
        }
    }
}

/// Counts describing the current state, for health and retrain responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSummary {
    pub movies: usize,
    pub ratings: usize,
    pub model_movies: usize,
    pub model_users: usize,
    /// Ratings appended since the model was last built
    pub pending_ratings: usize,
}

pub struct Recommender {
    catalog: Catalog,
    interactions: RwLock<InteractionTable>,
    model: RwLock<Arc<ModelSnapshot>>,
    /// Serializes rebuilds; readers never touch it
    rebuild_lock: Mutex<()>,
    config: EngineConfig,
}

impl Recommender {
    /// Build the engine and its first similarity model
    pub fn new(dataset: Dataset, config: EngineConfig) -> Self {
        let Dataset {
            catalog,
            interactions,
        } = dataset;
        let snapshot = build_snapshot(interactions.ratings(), &config);
        Self {
            catalog,
            interactions: RwLock::new(interactions),
            model: RwLock::new(Arc::new(snapshot)),
            rebuild_lock: Mutex::new(()),
            config,
        }
    }

    /// Load the dataset from `data_dir` (synthesizing one when needed) and
    /// build the first model
    pub fn load(data_dir: &Path, synthetic: &SyntheticConfig, config: EngineConfig) -> Result<Self> {
        let dataset = Dataset::load_or_generate(data_dir, synthetic)?;
        Ok(Self::new(dataset, config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The model currently served to similarity queries
    pub fn model(&self) -> Arc<ModelSnapshot> {
        Arc::clone(&self.model.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn interactions(&self) -> RwLockReadGuard<'_, InteractionTable> {
        self.interactions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn interactions_mut(&self) -> RwLockWriteGuard<'_, InteractionTable> {
        self.interactions.write().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// A page of the catalog in load order
    pub fn list_items(&self, offset: usize, limit: usize) -> &[Movie] {
        self.catalog.all_items(offset, limit)
    }

    /// Direct lookup; unlike recommendations this reports a missing id
    pub fn movie(&self, movie_id: MovieId) -> Result<&Movie> {
        self.catalog
            .item_by_id(movie_id)
            .ok_or(EngineError::MovieNotFound(movie_id))
    }

    pub fn list_genres(&self) -> Vec<String> {
        self.catalog.genres_in_use().into_iter().collect()
    }

    #[instrument(skip(self))]
    pub fn list_popular(&self, limit: usize) -> Vec<PopularMovie> {
        let stats = self.interactions().movie_stats();
        let popular = ranking::popular_movies(&self.catalog, &stats, limit);
        debug!("{} popular movies", popular.len());
        popular
    }

    #[instrument(skip(self, genres), fields(genres = genres.len()))]
    pub fn recommend_by_genres<S: AsRef<str>>(&self, genres: &[S], limit: usize) -> Vec<GenreMatch> {
        let stats = self.interactions().movie_stats();
        ranking::movies_by_genres(&self.catalog, &stats, genres, limit)
    }

    /// Movies most similar to `movie_id`, using the configured neighbor count
    pub fn recommend_similar(&self, movie_id: MovieId) -> Vec<SimilarMovie> {
        self.recommend_similar_k(movie_id, self.config.neighbors)
    }

    /// Empty for movies the current model has never seen
    #[instrument(skip(self))]
    pub fn recommend_similar_k(&self, movie_id: MovieId, k: usize) -> Vec<SimilarMovie> {
        let model = self.model();
        let similar = ranking::similar_movies(&model.similarity, &self.catalog, movie_id, k);
        if similar.is_empty() {
            debug!("No recommendations available for movie {}", movie_id);
        }
        similar
    }

    // =========================================================================
    // Updates
    // =========================================================================

    /// Append a rating; always succeeds
    ///
    /// The value is stored as given. Range checks belong to the caller.
    #[instrument(skip(self))]
    pub fn add_rating(&self, user_id: UserId, movie_id: MovieId, rating: f32) -> bool {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        let total = {
            let mut table = self.interactions_mut();
            table.append(Rating {
                user_id,
                movie_id,
                rating,
                timestamp,
            });
            table.len()
        };

        if let RebuildPolicy::EveryNRatings(every) = self.config.rebuild_policy {
            let pending = total.saturating_sub(self.model().rating_count);
            if pending >= every.get() {
                info!("{} ratings since last build, rebuilding similarity model", pending);
                self.rebuild();
            }
        }
        true
    }

    /// Rebuild the rating matrix and similarity model from the current table
    ///
    /// Runs on the calling thread. Queries keep using the previous snapshot
    /// until the new one is swapped in.
    pub fn rebuild(&self) -> Arc<ModelSnapshot> {
        let _guard = self.rebuild_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let ratings: Vec<Rating> = self.interactions().ratings().to_vec();
        let snapshot = Arc::new(build_snapshot(&ratings, &self.config));

        *self.model.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&snapshot);
        snapshot
    }

    /// Training RMSE of the current model, `None` without ratings
    pub fn evaluate(&self) -> Option<f64> {
        let model = self.model();
        let rmse = evaluation::training_rmse(&model.matrix, &model.similarity);
        if let Some(rmse) = rmse {
            info!("[Model Evaluation] RMSE: {:.4}", rmse);
        }
        rmse
    }

    pub fn summary(&self) -> EngineSummary {
        let model = self.model();
        let ratings = self.interactions().len();
        EngineSummary {
            movies: self.catalog.len(),
            ratings,
            model_movies: model.similarity.len(),
            model_users: model.matrix.n_users(),
            pending_ratings: ratings.saturating_sub(model.rating_count),
        }
    }
}

fn build_snapshot(ratings: &[Rating], config: &EngineConfig) -> ModelSnapshot {
    let start = Instant::now();
    info!("Training similarity model on {} ratings...", ratings.len());

    let snapshot = ModelSnapshot::build(ratings);
    let movies = snapshot.similarity.len();
    if movies > config.max_similarity_items {
        warn!(
            "Similarity model covers {} movies, above the design bound of {}; \
             build time and memory grow quadratically",
            movies, config.max_similarity_items
        );
    }

    info!(
        "Model trained: {} movies x {} users in {:.2?}",
        movies,
        snapshot.matrix.n_users(),
        start.elapsed()
    );
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Movie;
    use std::num::NonZeroUsize;

    fn rating(user_id: UserId, movie_id: MovieId, rating: f32) -> Rating {
        Rating {
            user_id,
            movie_id,
            rating,
            timestamp: 0,
        }
    }

    fn build(config: EngineConfig) -> Recommender {
        let movies = vec![
            Movie::new(1, "A", "Action"),
            Movie::new(2, "B", "Drama"),
            Movie::new(3, "C", "Comedy"),
        ];
        let ratings = vec![
            rating(1, 1, 5.0),
            rating(1, 2, 1.0),
            rating(2, 1, 5.0),
            rating(2, 2, 1.0),
            rating(2, 3, 3.0),
        ];
        Recommender::new(Dataset::from_parts(movies, ratings).unwrap(), config)
    }

    #[test]
    fn test_manual_policy_keeps_model_stale() {
        let rec = build(EngineConfig::default());
        let before = rec.recommend_similar(1);

        // User 3 rates movies 1 and 3 identically, which would raise sim(1, 3)
        assert!(rec.add_rating(3, 1, 5.0));
        assert!(rec.add_rating(3, 3, 5.0));

        assert_eq!(rec.recommend_similar(1), before);
        assert_eq!(rec.summary().pending_ratings, 2);

        rec.rebuild();
        assert_ne!(rec.recommend_similar(1), before);
        assert_eq!(rec.summary().pending_ratings, 0);
    }

    #[test]
    fn test_every_n_policy_rebuilds() {
        let policy = RebuildPolicy::EveryNRatings(NonZeroUsize::new(2).unwrap());
        let rec = build(EngineConfig::default().with_rebuild_policy(policy));

        rec.add_rating(3, 3, 4.0);
        assert_eq!(rec.summary().pending_ratings, 1);
        rec.add_rating(3, 1, 4.0);
        assert_eq!(rec.summary().pending_ratings, 0);
        assert_eq!(rec.model().rating_count, 7);
    }

    #[test]
    fn test_add_rating_accepts_any_value() {
        let rec = build(EngineConfig::default());
        assert!(rec.add_rating(9, 2, 42.0));
        assert_eq!(rec.summary().ratings, 6);
    }

    #[test]
    fn test_movie_lookup_reports_not_found() {
        let rec = build(EngineConfig::default());
        assert_eq!(rec.movie(2).unwrap().title, "B");
        assert!(matches!(rec.movie(404), Err(EngineError::MovieNotFound(404))));
        assert!(rec.recommend_similar(404).is_empty());
    }

    #[test]
    fn test_summary_and_evaluate() {
        let rec = build(EngineConfig::default().with_max_similarity_items(1));
        let summary = rec.summary();
        assert_eq!(summary.movies, 3);
        assert_eq!(summary.ratings, 5);
        assert_eq!(summary.model_movies, 3);
        assert_eq!(summary.model_users, 2);
        assert!(rec.evaluate().is_some());
    }

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("engine-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_load_synthesizes_into_empty_dir() {
        let dir = scratch_dir("load-synthetic");
        let synthetic = SyntheticConfig {
            movies: 50,
            users: 10,
            ratings: 200,
            seed: Some(3),
        };
        let rec = Recommender::load(&dir, &synthetic, EngineConfig::default()).unwrap();
        assert_eq!(rec.catalog().len(), 50);
        assert_eq!(rec.summary().ratings, 200);
        assert_eq!(rec.summary().pending_ratings, 0);
    }

    #[test]
    fn test_load_failure_is_reported_as_load_error() {
        let dir = scratch_dir("load-malformed");
        std::fs::create_dir_all(&dir).unwrap();

        // Large enough to count as a real dataset, so nothing is regenerated
        let mut movies = String::from("movieId,title,genres\n");
        for id in 1..=2000 {
            movies.push_str(&format!("{},Movie {} (1999),Drama\n", id, id));
        }
        movies.push_str("oops,Broken (2000),Drama\n");
        std::fs::write(dir.join(data_loader::dataset::MOVIES_FILE), movies).unwrap();
        std::fs::write(
            dir.join(data_loader::dataset::RATINGS_FILE),
            "userId,movieId,rating,timestamp\n1,1,4.0,0\n",
        )
        .unwrap();

        let result = Recommender::load(&dir, &SyntheticConfig::default(), EngineConfig::default());
        assert!(matches!(
            result,
            Err(EngineError::Load(data_loader::DataLoadError::ParseError { line: 2002, .. }))
        ));
    }
}
