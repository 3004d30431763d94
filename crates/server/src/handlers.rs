use axum::{
    Json,
    extract::{Path, Query, State},
};
use data_loader::{MAX_RATING, MIN_RATING, Movie, MovieId};
use engine::{DEFAULT_LIMIT, EngineSummary, GenreMatch, PopularMovie, SimilarMovie};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Upper bound on any `limit` query parameter
pub const MAX_PAGE_SIZE: usize = 500;

/// Page size for /items when none is given
pub const DEFAULT_PAGE_SIZE: usize = 50;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_page_size")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct GenresRequest {
    pub genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRequest {
    pub movie_id: MovieId,
    pub rating: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieResponse {
    pub movie_id: MovieId,
    pub title: String,
    /// Pipe-joined, as in the source data
    pub genres: String,
    pub year: Option<u16>,
}

impl From<&Movie> for MovieResponse {
    fn from(movie: &Movie) -> Self {
        Self {
            movie_id: movie.id,
            title: movie.title.clone(),
            genres: movie.genre_string(),
            year: movie.year,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SimilarResponse {
    #[serde(flatten)]
    pub movie: MovieResponse,
    pub similarity: f32,
}

impl From<&SimilarMovie> for SimilarResponse {
    fn from(similar: &SimilarMovie) -> Self {
        Self {
            movie: MovieResponse::from(&similar.movie),
            similarity: similar.similarity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PopularResponse {
    #[serde(flatten)]
    pub movie: MovieResponse,
    /// Mean rating
    pub rating: f32,
    /// Support count
    pub count: u32,
}

impl From<&PopularMovie> for PopularResponse {
    fn from(popular: &PopularMovie) -> Self {
        Self {
            movie: MovieResponse::from(&popular.movie),
            rating: popular.avg_rating,
            count: popular.rating_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenreMatchResponse {
    #[serde(flatten)]
    pub movie: MovieResponse,
    /// Mean rating, 0 for unrated movies
    pub rating: f32,
}

impl From<&GenreMatch> for GenreMatchResponse {
    fn from(found: &GenreMatch) -> Self {
        Self {
            movie: MovieResponse::from(&found.movie),
            rating: found.avg_rating,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrainResponse {
    pub movies: usize,
    pub ratings: usize,
    pub model_movies: usize,
    pub model_users: usize,
    pub pending_ratings: usize,
}

impl From<EngineSummary> for RetrainResponse {
    fn from(summary: EngineSummary) -> Self {
        Self {
            movies: summary.movies,
            ratings: summary.ratings,
            model_movies: summary.model_movies,
            model_users: summary.model_users,
            pending_ratings: summary.pending_ratings,
        }
    }
}

// Handlers

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Movie recommendation API is running" }))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /items?skip=&limit=
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Json<Vec<MovieResponse>> {
    let limit = params.limit.min(MAX_PAGE_SIZE);
    let page = state.recommender.list_items(params.skip, limit);
    Json(page.iter().map(MovieResponse::from).collect())
}

/// GET /items/:id
pub async fn get_item(
    State(state): State<AppState>,
    Path(movie_id): Path<MovieId>,
) -> AppResult<Json<MovieResponse>> {
    let movie = state.recommender.movie(movie_id)?;
    Ok(Json(MovieResponse::from(movie)))
}

/// GET /popular?limit=
///
/// Aggregates the whole rating table, so it runs off the async workers.
pub async fn list_popular(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<Vec<PopularResponse>>> {
    let limit = params.limit.min(MAX_PAGE_SIZE);
    let recommender = state.recommender.clone();
    let popular = tokio::task::spawn_blocking(move || recommender.list_popular(limit)).await?;
    Ok(Json(popular.iter().map(PopularResponse::from).collect()))
}

/// GET /genres
pub async fn list_genres(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.recommender.list_genres())
}

/// POST /recommend/genres
pub async fn recommend_by_genres(
    State(state): State<AppState>,
    Json(request): Json<GenresRequest>,
) -> AppResult<Json<Vec<GenreMatchResponse>>> {
    let recommender = state.recommender.clone();
    let matches = tokio::task::spawn_blocking(move || {
        recommender.recommend_by_genres(request.genres.as_slice(), DEFAULT_LIMIT)
    })
    .await?;
    Ok(Json(matches.iter().map(GenreMatchResponse::from).collect()))
}

/// POST /rate
///
/// Ratings are recorded under the demo identity.
pub async fn rate_movie(
    State(state): State<AppState>,
    Json(request): Json<RatingRequest>,
) -> AppResult<Json<RateResponse>> {
    if !request.rating.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&request.rating) {
        return Err(AppError::InvalidInput(format!(
            "rating must be between {} and {}, got {}",
            MIN_RATING, MAX_RATING, request.rating
        )));
    }

    // May rebuild the model under an every-N policy, so keep it off the runtime
    let recommender = state.recommender.clone();
    let user_id = state.demo_user_id;
    let success = tokio::task::spawn_blocking(move || {
        recommender.add_rating(user_id, request.movie_id, request.rating)
    })
    .await?;

    Ok(Json(RateResponse { success }))
}

/// GET /recommend/:item_id
///
/// Unknown movies get an empty list rather than a 404.
pub async fn recommend_similar(
    State(state): State<AppState>,
    Path(movie_id): Path<MovieId>,
) -> Json<Vec<SimilarResponse>> {
    let similar = state.recommender.recommend_similar(movie_id);
    Json(similar.iter().map(SimilarResponse::from).collect())
}

/// POST /retrain
pub async fn retrain(State(state): State<AppState>) -> AppResult<Json<RetrainResponse>> {
    let recommender = state.recommender.clone();
    let summary = tokio::task::spawn_blocking(move || {
        recommender.rebuild();
        recommender.summary()
    })
    .await?;

    info!(
        "Similarity model rebuilt: {} movies from {} ratings",
        summary.model_movies, summary.ratings
    );
    Ok(Json(RetrainResponse::from(summary)))
}
