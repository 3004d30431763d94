//! The movie catalog: immutable after load, ordered by load order.

use crate::error::{DataLoadError, Result};
use crate::types::{Movie, MovieId};
use std::collections::{BTreeSet, HashMap};

/// Read-only collection of movies with O(1) lookup by id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Movies in load order
    movies: Vec<Movie>,
    /// MovieId -> position in `movies`
    positions: HashMap<MovieId, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate movie ids
    pub fn new(movies: Vec<Movie>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(movies.len());
        for (pos, movie) in movies.iter().enumerate() {
            if positions.insert(movie.id, pos).is_some() {
                return Err(DataLoadError::ValidationError(format!(
                    "Duplicate movie id {} in catalog",
                    movie.id
                )));
            }
        }
        Ok(Self { movies, positions })
    }

    /// A page of movies in load order
    ///
    /// An offset past the end yields an empty slice.
    pub fn all_items(&self, offset: usize, limit: usize) -> &[Movie] {
        let start = offset.min(self.movies.len());
        let end = start.saturating_add(limit).min(self.movies.len());
        &self.movies[start..end]
    }

    /// Get a movie by ID
    pub fn item_by_id(&self, id: MovieId) -> Option<&Movie> {
        self.positions.get(&id).map(|&pos| &self.movies[pos])
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Every distinct genre tag used by at least one movie, sorted
    pub fn genres_in_use(&self) -> BTreeSet<String> {
        self.movies
            .iter()
            .flat_map(|m| m.genres.iter().cloned())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Movie> {
        self.movies.iter()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::new(vec![
            Movie::new(30, "Thirty (1990)", "Drama"),
            Movie::new(10, "Ten (1991)", "Action|Drama"),
            Movie::new(20, "Twenty (1992)", "Comedy"),
        ])
        .unwrap()
    }

    #[test]
    fn test_pagination_keeps_load_order() {
        let catalog = sample();
        let ids: Vec<MovieId> = catalog.all_items(0, 2).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![30, 10]);
        assert_eq!(catalog.all_items(0, 50).len(), 3);
        assert_eq!(catalog.all_items(2, 50)[0].id, 20);
    }

    #[test]
    fn test_offset_past_end_is_empty() {
        let catalog = sample();
        assert!(catalog.all_items(3, 10).is_empty());
        assert!(catalog.all_items(100, 10).is_empty());
        assert!(catalog.all_items(usize::MAX, usize::MAX).is_empty());
    }

    #[test]
    fn test_genres_in_use_are_deduplicated() {
        let genres: Vec<String> = sample().genres_in_use().into_iter().collect();
        assert_eq!(genres, vec!["Action", "Comedy", "Drama"]);
    }

    #[test]
    fn test_item_by_id() {
        let catalog = sample();
        assert_eq!(catalog.item_by_id(10).map(|m| m.title.as_str()), Some("Ten (1991)"));
        assert!(catalog.item_by_id(99).is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Catalog::new(vec![Movie::new(1, "A", "Drama"), Movie::new(1, "B", "Drama")]);
        assert!(matches!(result, Err(DataLoadError::ValidationError(_))));
    }
}
