//! Synthetic dataset generation, used when no usable dataset is on disk.
//!
//! The generated data satisfies the same invariants as a real load:
//! unique movie ids and ratings in 0.5..=5.0 at half steps.

use crate::types::{GENRE_NAMES, Movie, MovieId, Rating, UserId};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

/// Timestamp stamped on every generated rating
pub const SYNTHETIC_TIMESTAMP: i64 = 964_982_703;

/// Shape of the generated dataset
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub movies: u32,
    pub users: u32,
    pub ratings: usize,
    /// Fixed seed for reproducible output; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            movies: 2000,
            users: 500,
            ratings: 50_000,
            seed: None,
        }
    }
}

impl SyntheticConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Generate movies 1..=N and R random ratings over U users
pub fn generate(config: &SyntheticConfig) -> (Vec<Movie>, Vec<Rating>) {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let movies: Vec<Movie> = (1..=config.movies)
        .map(|id| {
            let n_genres = rng.random_range(1..=4);
            let genres: Vec<&str> = GENRE_NAMES
                .choose_multiple(&mut rng, n_genres)
                .copied()
                .collect();
            let title = format!("Movie {} ({})", id, rng.random_range(1980..=2025));
            Movie::new(id as MovieId, title, &genres.join("|"))
        })
        .collect();

    let ratings = if movies.is_empty() || config.users == 0 {
        Vec::new()
    } else {
        (0..config.ratings)
            .map(|_| Rating {
                user_id: rng.random_range(1..=config.users) as UserId,
                movie_id: rng.random_range(1..=config.movies) as MovieId,
                // 1..=10 half steps -> 0.5..=5.0
                rating: rng.random_range(1..=10u8) as f32 / 2.0,
                timestamp: SYNTHETIC_TIMESTAMP,
            })
            .collect()
    };

    (movies, ratings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn small() -> SyntheticConfig {
        SyntheticConfig {
            movies: 50,
            users: 10,
            ratings: 400,
            seed: None,
        }
        .with_seed(7)
    }

    #[test]
    fn test_generated_invariants() {
        let (movies, ratings) = generate(&small());
        assert_eq!(movies.len(), 50);
        assert_eq!(ratings.len(), 400);

        let ids: HashSet<MovieId> = movies.iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), movies.len(), "movie ids must be unique");

        for movie in &movies {
            assert!((1..=4).contains(&movie.genres.len()));
            assert!(movie.year.is_some());
        }
        for r in &ratings {
            assert!((0.5..=5.0).contains(&r.rating));
            assert_eq!((r.rating * 2.0).fract(), 0.0);
            assert!(ids.contains(&r.movie_id));
            assert!((1..=10).contains(&r.user_id));
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        assert_eq!(generate(&small()), generate(&small()));
    }

    #[test]
    fn test_empty_catalog_yields_no_ratings() {
        let config = SyntheticConfig {
            movies: 0,
            ..small()
        };
        let (movies, ratings) = generate(&config);
        assert!(movies.is_empty());
        assert!(ratings.is_empty());
    }
}
