//! Item-item cosine similarity model.
//!
//! Each movie's feature vector is its column of the rating matrix.
//!
//! ```text
//! sim(i, j) = dot(v_i, v_j) / (|v_i| * |v_j|)      0 when either norm is 0
//! ```
//!
//! The full M × M matrix is materialised, so building costs O(M² · U) time
//! and O(M²) memory. Fine for catalogs in the low thousands; beyond that the
//! caller logs a capacity warning (see `EngineConfig::max_similarity_items`).

use crate::matrix::RatingMatrix;
use data_loader::MovieId;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Default)]
pub struct SimilarityModel {
    movie_ids: Vec<MovieId>,
    index: HashMap<MovieId, usize>,
    /// Row-major `n * n`
    scores: Vec<f32>,
}

impl SimilarityModel {
    /// Compute pairwise cosine similarity between every pair of movie columns
    #[instrument(skip(matrix), fields(movies = matrix.n_movies(), users = matrix.n_users()))]
    pub fn build(matrix: &RatingMatrix) -> Self {
        let n = matrix.n_movies();
        let n_users = matrix.n_users();
        let columns = matrix.movie_major();

        let norms: Vec<f64> = columns
            .par_chunks(n_users.max(1))
            .take(n)
            .map(|col| col.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt())
            .collect();

        let mut scores = vec![0.0f32; n * n];
        if n_users > 0 {
            scores
                .par_chunks_mut(n)
                .enumerate()
                .for_each(|(i, row)| {
                    if norms[i] == 0.0 {
                        return;
                    }
                    let col_i = &columns[i * n_users..(i + 1) * n_users];
                    for (j, cell) in row.iter_mut().enumerate() {
                        if i == j {
                            *cell = 1.0;
                        } else if norms[j] > 0.0 {
                            let col_j = &columns[j * n_users..(j + 1) * n_users];
                            *cell = cosine(col_i, col_j, norms[i], norms[j]);
                        }
                    }
                });
        }

        debug!("Built {}x{} similarity matrix", n, n);
        let movie_ids = matrix.movie_ids().to_vec();
        let index = movie_ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        Self {
            movie_ids,
            index,
            scores,
        }
    }

    pub fn len(&self) -> usize {
        self.movie_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movie_ids.is_empty()
    }

    pub fn contains(&self, movie_id: MovieId) -> bool {
        self.index.contains_key(&movie_id)
    }

    pub fn movie_ids(&self) -> &[MovieId] {
        &self.movie_ids
    }

    /// Similarity between two movies, `None` if either is not in the model
    pub fn score(&self, a: MovieId, b: MovieId) -> Option<f32> {
        let (i, j) = (*self.index.get(&a)?, *self.index.get(&b)?);
        Some(self.score_at(i, j))
    }

    /// Similarity by compact index (same order as the source matrix columns)
    pub(crate) fn score_at(&self, i: usize, j: usize) -> f32 {
        self.scores[i * self.len() + j]
    }

    /// Every other movie ranked by descending similarity to `movie_id`
    ///
    /// Ties break by ascending movie id. Unknown movies yield an empty list:
    /// a movie nobody has rated is a cold start, not an error.
    pub fn ranked_neighbors(&self, movie_id: MovieId) -> Vec<(MovieId, f32)> {
        let Some(&i) = self.index.get(&movie_id) else {
            return Vec::new();
        };
        let n = self.len();
        let mut ranked: Vec<(MovieId, f32)> = self.scores[i * n..(i + 1) * n]
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(j, &score)| (self.movie_ids[j], score))
            .collect();
        ranked.sort_by(by_score_then_id);
        ranked
    }

    /// Top `k` neighbors of `movie_id`, never including the movie itself
    pub fn neighbors(&self, movie_id: MovieId, k: usize) -> Vec<(MovieId, f32)> {
        let mut ranked = self.ranked_neighbors(movie_id);
        ranked.truncate(k);
        ranked
    }
}

fn cosine(a: &[f32], b: &[f32], norm_a: f64, norm_b: f64) -> f32 {
    let dot: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum();
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32
}

/// Descending score, then ascending id
pub(crate) fn by_score_then_id(a: &(MovieId, f32), b: &(MovieId, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}
