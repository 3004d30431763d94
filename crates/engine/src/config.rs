//! Engine tuning knobs.

use crate::ranking::DEFAULT_NEIGHBORS;
use std::num::NonZeroUsize;

/// When the similarity model is rebuilt after new ratings arrive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RebuildPolicy {
    /// Only an explicit `Recommender::rebuild` refreshes the model.
    ///
    /// Popularity and genre rankings see new ratings at once; similarity
    /// recommendations keep serving the last built model until then.
    #[default]
    Manual,
    /// Rebuild synchronously, on the appending caller's thread, once this
    /// many ratings have arrived since the last build.
    EveryNRatings(NonZeroUsize),
}

impl RebuildPolicy {
    /// `None` or `Some(0)` mean manual
    pub fn from_interval(every: Option<usize>) -> Self {
        every
            .and_then(NonZeroUsize::new)
            .map_or(Self::Manual, Self::EveryNRatings)
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Neighbors returned by similar-movie recommendations (default: 5)
    pub neighbors: usize,
    /// Catalog size above which a similarity build logs a capacity warning
    pub max_similarity_items: usize,
    pub rebuild_policy: RebuildPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            neighbors: DEFAULT_NEIGHBORS,
            max_similarity_items: 5000,
            rebuild_policy: RebuildPolicy::Manual,
        }
    }
}

impl EngineConfig {
    pub fn with_neighbors(mut self, neighbors: usize) -> Self {
        self.neighbors = neighbors;
        self
    }

    pub fn with_max_similarity_items(mut self, max: usize) -> Self {
        self.max_similarity_items = max;
        self
    }

    pub fn with_rebuild_policy(mut self, policy: RebuildPolicy) -> Self {
        self.rebuild_policy = policy;
        self
    }
}
