use std::sync::Arc;

use data_loader::UserId;
use engine::Recommender;

/// Shared application state
///
/// The recommender does its own locking, so handlers only need an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    /// Identity recorded for ratings submitted over HTTP
    pub demo_user_id: UserId,
}

impl AppState {
    pub fn new(recommender: Arc<Recommender>, demo_user_id: UserId) -> Self {
        Self {
            recommender,
            demo_user_id,
        }
    }
}
