//! Training-set RMSE of the item-item model.
//!
//! For every observed cell the predicted rating is the similarity-weighted
//! sum of the user's ratings, normalised by the column sum of the similarity
//! matrix:
//!
//! ```text
//! p[u][j] = Σ_i R[u][i] · S[i][j] / Σ_i S[i][j]
//! ```
//!
//! This is a smoke metric on the data the model was built from, not a
//! held-out evaluation.

use crate::matrix::RatingMatrix;
use crate::similarity::SimilarityModel;
use rayon::prelude::*;
use tracing::instrument;

/// RMSE over observed cells, `None` when nothing was observed
///
/// `model` must have been built from `matrix`.
#[instrument(skip_all, fields(users = matrix.n_users(), movies = matrix.n_movies()))]
pub fn training_rmse(matrix: &RatingMatrix, model: &SimilarityModel) -> Option<f64> {
    let n = matrix.n_movies();
    if n == 0 || model.len() != n {
        return None;
    }

    let column_sums: Vec<f64> = (0..n)
        .into_par_iter()
        .map(|j| (0..n).map(|i| f64::from(model.score_at(i, j))).sum())
        .collect();

    let (squared_error, count) = (0..matrix.n_users())
        .into_par_iter()
        .map(|u| {
            let row = matrix.row(u);
            let rated: Vec<usize> = matrix
                .observed_row(u)
                .iter()
                .enumerate()
                .filter_map(|(m, &seen)| seen.then_some(m))
                .collect();

            let mut squared_error = 0.0f64;
            let mut count = 0usize;
            for &j in &rated {
                if column_sums[j] == 0.0 {
                    continue;
                }
                let weighted: f64 = rated
                    .iter()
                    .map(|&i| f64::from(row[i]) * f64::from(model.score_at(i, j)))
                    .sum();
                let error = f64::from(row[j]) - weighted / column_sums[j];
                squared_error += error * error;
                count += 1;
            }
            (squared_error, count)
        })
        .reduce(|| (0.0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

    (count > 0).then(|| (squared_error / count as f64).sqrt())
}
