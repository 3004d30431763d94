use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes
pub fn create_router(state: AppState) -> Router {
    // Browser frontend is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        // Catalog
        .route("/items", get(handlers::list_items))
        .route("/items/:id", get(handlers::get_item))
        .route("/genres", get(handlers::list_genres))
        // Recommendations
        .route("/popular", get(handlers::list_popular))
        .route("/recommend/genres", post(handlers::recommend_by_genres))
        .route("/recommend/:item_id", get(handlers::recommend_similar))
        // Updates
        .route("/rate", post(handlers::rate_movie))
        .route("/retrain", post(handlers::retrain))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
