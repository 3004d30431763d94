//! The interaction table: an append-only log of (user, movie, rating) rows.
//!
//! Aggregates are recomputed from the rows on every call, so an appended
//! rating is visible to them immediately.

use crate::types::{MovieId, MovieStats, Rating, UserId};
use rayon::prelude::*;
use std::collections::HashMap;

/// Append-only rating rows in insertion order
#[derive(Debug, Clone, Default)]
pub struct InteractionTable {
    ratings: Vec<Rating>,
}

impl InteractionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk load, keeping the given order
    pub fn from_ratings(ratings: Vec<Rating>) -> Self {
        Self { ratings }
    }

    /// Append a rating row; earlier rows for the same pair are left untouched
    pub fn append(&mut self, rating: Rating) {
        self.ratings.push(rating);
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Get counts of distinct users and movies, for logging
    pub fn counts(&self) -> (usize, usize) {
        let mut users: Vec<UserId> = self.ratings.iter().map(|r| r.user_id).collect();
        let mut movies: Vec<MovieId> = self.ratings.iter().map(|r| r.movie_id).collect();
        users.sort_unstable();
        users.dedup();
        movies.sort_unstable();
        movies.dedup();
        (users.len(), movies.len())
    }

    /// Mean rating and support count for every rated movie
    ///
    /// Every row counts, duplicates included.
    pub fn movie_stats(&self) -> HashMap<MovieId, MovieStats> {
        let sums = self
            .ratings
            .par_iter()
            .fold(HashMap::new, |mut local: HashMap<MovieId, (f64, u32)>, r| {
                let entry = local.entry(r.movie_id).or_insert((0.0, 0));
                entry.0 += f64::from(r.rating);
                entry.1 += 1;
                local
            })
            .reduce(HashMap::new, |mut acc, local| {
                for (movie_id, (sum, count)) in local {
                    let entry = acc.entry(movie_id).or_insert((0.0, 0));
                    entry.0 += sum;
                    entry.1 += count;
                }
                acc
            });

        sums.into_iter()
            .map(|(movie_id, (sum, count))| {
                (
                    movie_id,
                    MovieStats {
                        avg_rating: (sum / f64::from(count)) as f32,
                        rating_count: count,
                    },
                )
            })
            .collect()
    }
}
