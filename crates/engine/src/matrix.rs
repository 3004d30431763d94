//! Dense user × movie rating matrix.
//!
//! Rows and columns are the distinct user and movie ids present in the
//! ratings, ascending, mapped to compact indices. A cell holds the rating
//! from the last row seen for that pair, or 0.0 when the pair was never
//! rated. The `observed` mask keeps "never rated" distinguishable from a
//! stored value.

use data_loader::{MovieId, Rating, UserId};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct RatingMatrix {
    user_ids: Vec<UserId>,
    movie_ids: Vec<MovieId>,
    user_index: HashMap<UserId, usize>,
    movie_index: HashMap<MovieId, usize>,
    /// Row-major, `n_users * n_movies`
    values: Vec<f32>,
    observed: Vec<bool>,
}

impl RatingMatrix {
    /// Build from rating rows; duplicates for a pair resolve last-write-wins
    pub fn build(ratings: &[Rating]) -> Self {
        let mut user_ids: Vec<UserId> = ratings.iter().map(|r| r.user_id).collect();
        let mut movie_ids: Vec<MovieId> = ratings.iter().map(|r| r.movie_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();
        movie_ids.sort_unstable();
        movie_ids.dedup();

        let user_index: HashMap<UserId, usize> =
            user_ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let movie_index: HashMap<MovieId, usize> =
            movie_ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

        let n_movies = movie_ids.len();
        let mut values = vec![0.0; user_ids.len() * n_movies];
        let mut observed = vec![false; values.len()];

        for rating in ratings {
            let cell = user_index[&rating.user_id] * n_movies + movie_index[&rating.movie_id];
            values[cell] = rating.rating;
            observed[cell] = true;
        }

        Self {
            user_ids,
            movie_ids,
            user_index,
            movie_index,
            values,
            observed,
        }
    }

    pub fn n_users(&self) -> usize {
        self.user_ids.len()
    }

    pub fn n_movies(&self) -> usize {
        self.movie_ids.len()
    }

    /// Column order of the matrix
    pub fn movie_ids(&self) -> &[MovieId] {
        &self.movie_ids
    }

    /// Row order of the matrix
    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }

    pub fn movie_position(&self, movie_id: MovieId) -> Option<usize> {
        self.movie_index.get(&movie_id).copied()
    }

    pub fn user_position(&self, user_id: UserId) -> Option<usize> {
        self.user_index.get(&user_id).copied()
    }

    /// Cell value; 0.0 for unknown ids or unrated pairs
    #[cfg(test)]
    fn get(&self, user_id: UserId, movie_id: MovieId) -> f32 {
        match (self.user_position(user_id), self.movie_position(movie_id)) {
            (Some(u), Some(m)) => self.values[u * self.n_movies() + m],
            _ => 0.0,
        }
    }

    #[cfg(test)]
    fn is_observed(&self, user_id: UserId, movie_id: MovieId) -> bool {
        match (self.user_position(user_id), self.movie_position(movie_id)) {
            (Some(u), Some(m)) => self.observed[u * self.n_movies() + m],
            _ => false,
        }
    }

    /// One user's row by row index
    pub fn row(&self, user: usize) -> &[f32] {
        let n = self.n_movies();
        &self.values[user * n..(user + 1) * n]
    }

    /// Observed mask for one user's row
    pub fn observed_row(&self, user: usize) -> &[bool] {
        let n = self.n_movies();
        &self.observed[user * n..(user + 1) * n]
    }

    /// Transposed copy, movie-major: each movie's column is contiguous
    pub fn movie_major(&self) -> Vec<f32> {
        let (n_users, n_movies) = (self.n_users(), self.n_movies());
        let mut columns = vec![0.0; self.values.len()];
        for u in 0..n_users {
            for m in 0..n_movies {
                columns[m * n_users + u] = self.values[u * n_movies + m];
            }
        }
        columns
    }
}
