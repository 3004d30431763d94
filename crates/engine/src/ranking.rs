//! Top-N ranking over precomputed scores and statistics.
//!
//! Three independent rankings:
//! - similar movies: neighbors from the similarity model, joined to the catalog
//! - popular movies: mean rating among movies with enough support
//! - genre matches: mean rating among movies sharing any requested genre
//!
//! All orderings break ties by ascending movie id, so equal inputs always
//! produce equal output.

use crate::similarity::{SimilarityModel, by_score_then_id};
use data_loader::{Catalog, Movie, MovieId, MovieStats};
use std::collections::HashMap;

/// Default neighbor count for similar-movie recommendations
pub const DEFAULT_NEIGHBORS: usize = 5;

/// Default list length for popular and genre rankings
pub const DEFAULT_LIMIT: usize = 20;

/// Movies with fewer ratings than this never appear in the popular list
pub const MIN_SUPPORT: u32 = 5;

/// A movie recommended for its similarity to a reference movie
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarMovie {
    pub movie: Movie,
    pub similarity: f32,
}

/// A movie ranked by its mean rating, with the support behind it
#[derive(Debug, Clone, PartialEq)]
pub struct PopularMovie {
    pub movie: Movie,
    pub avg_rating: f32,
    pub rating_count: u32,
}

/// A movie matching a genre query; unrated movies carry a mean of 0
#[derive(Debug, Clone, PartialEq)]
pub struct GenreMatch {
    pub movie: Movie,
    pub avg_rating: f32,
}

/// Top `k` movies most similar to `movie_id` that exist in the catalog
pub fn similar_movies(
    model: &SimilarityModel,
    catalog: &Catalog,
    movie_id: MovieId,
    k: usize,
) -> Vec<SimilarMovie> {
    model
        .ranked_neighbors(movie_id)
        .into_iter()
        .filter_map(|(id, similarity)| {
            catalog.item_by_id(id).map(|movie| SimilarMovie {
                movie: movie.clone(),
                similarity,
            })
        })
        .take(k)
        .collect()
}

/// Highest-rated catalog movies with at least [`MIN_SUPPORT`] ratings
pub fn popular_movies(
    catalog: &Catalog,
    stats: &HashMap<MovieId, MovieStats>,
    limit: usize,
) -> Vec<PopularMovie> {
    let mut qualifying: Vec<(MovieId, f32)> = stats
        .iter()
        .filter(|(id, s)| s.rating_count >= MIN_SUPPORT && catalog.contains(**id))
        .map(|(&id, s)| (id, s.avg_rating))
        .collect();
    qualifying.sort_by(by_score_then_id);
    qualifying.truncate(limit);

    qualifying
        .into_iter()
        .filter_map(|(id, avg_rating)| {
            let movie = catalog.item_by_id(id)?;
            Some(PopularMovie {
                movie: movie.clone(),
                avg_rating,
                rating_count: stats[&id].rating_count,
            })
        })
        .collect()
}

/// Catalog movies tagged with any of `genres`, best mean rating first
pub fn movies_by_genres<S: AsRef<str>>(
    catalog: &Catalog,
    stats: &HashMap<MovieId, MovieStats>,
    genres: &[S],
    limit: usize,
) -> Vec<GenreMatch> {
    let mut matches: Vec<(MovieId, f32)> = catalog
        .iter()
        .filter(|movie| movie.has_any_genre(genres))
        .map(|movie| {
            let avg = stats.get(&movie.id).map_or(0.0, |s| s.avg_rating);
            (movie.id, avg)
        })
        .collect();
    matches.sort_by(by_score_then_id);
    matches.truncate(limit);

    matches
        .into_iter()
        .filter_map(|(id, avg_rating)| {
            catalog.item_by_id(id).map(|movie| GenreMatch {
                movie: movie.clone(),
                avg_rating,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::RatingMatrix;
    use data_loader::{InteractionTable, Rating, UserId};

    fn rating(user_id: UserId, movie_id: MovieId, rating: f32) -> Rating {
        Rating {
            user_id,
            movie_id,
            rating,
            timestamp: 0,
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Movie::new(1, "Heat (1995)", "Action|Drama"),
            Movie::new(2, "Airplane! (1980)", "Comedy"),
            Movie::new(3, "Alien (1979)", "Horror|Sci-Fi"),
            Movie::new(4, "Casablanca (1942)", "Drama|Romance"),
        ])
        .unwrap()
    }

    /// `count` ratings of `value` for `movie_id` from distinct users
    fn repeat(table: &mut InteractionTable, movie_id: MovieId, count: u32, value: f32) {
        for user in 0..count {
            table.append(rating(1000 + user, movie_id, value));
        }
    }

    #[test]
    fn test_popular_respects_min_support() {
        let mut table = InteractionTable::new();
        repeat(&mut table, 1, 4, 5.0); // support 4, perfect mean
        repeat(&mut table, 2, 5, 4.5); // support 5, best qualifying mean
        repeat(&mut table, 3, 6, 3.0);

        let popular = popular_movies(&catalog(), &table.movie_stats(), DEFAULT_LIMIT);
        let ids: Vec<MovieId> = popular.iter().map(|p| p.movie.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(popular[0].rating_count, 5);
        assert!((popular[0].avg_rating - 4.5).abs() < 1e-6);
    }

    #[test]
    fn test_popular_limit_and_ties() {
        let mut table = InteractionTable::new();
        repeat(&mut table, 4, 5, 4.0);
        repeat(&mut table, 2, 5, 4.0);
        repeat(&mut table, 3, 5, 4.0);

        let popular = popular_movies(&catalog(), &table.movie_stats(), 2);
        let ids: Vec<MovieId> = popular.iter().map(|p| p.movie.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_popular_skips_movies_outside_catalog() {
        let mut table = InteractionTable::new();
        repeat(&mut table, 77, 10, 5.0);
        assert!(popular_movies(&catalog(), &table.movie_stats(), 20).is_empty());
    }

    #[test]
    fn test_genre_union_and_left_join() {
        let mut table = InteractionTable::new();
        repeat(&mut table, 2, 1, 2.0);
        repeat(&mut table, 4, 1, 3.0);

        let matches = movies_by_genres(&catalog(), &table.movie_stats(), &["Comedy", "Action"], 20);
        let ids: Vec<MovieId> = matches.iter().map(|m| m.movie.id).collect();
        // Heat is unrated but still listed, with mean 0
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(matches[1].avg_rating, 0.0);

        let drama = movies_by_genres(&catalog(), &table.movie_stats(), &["Drama"], 20);
        let ids: Vec<MovieId> = drama.iter().map(|m| m.movie.id).collect();
        assert_eq!(ids, vec![4, 1]);
    }

    #[test]
    fn test_genre_no_match_is_empty() {
        let table = InteractionTable::new();
        assert!(movies_by_genres(&catalog(), &table.movie_stats(), &["Western"], 20).is_empty());
        assert!(movies_by_genres::<&str>(&catalog(), &table.movie_stats(), &[], 20).is_empty());
    }

    #[test]
    fn test_similar_movies_join_catalog_and_skip_unknown() {
        // Movie 9 is rated but not in the catalog
        let ratings = [
            rating(1, 1, 5.0),
            rating(1, 9, 5.0),
            rating(1, 2, 4.0),
            rating(2, 2, 1.0),
            rating(2, 3, 5.0),
        ];
        let model = SimilarityModel::build(&RatingMatrix::build(&ratings));

        let similar = similar_movies(&model, &catalog(), 1, 5);
        let ids: Vec<MovieId> = similar.iter().map(|s| s.movie.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(similar[0].similarity > similar[1].similarity);
        assert_eq!(similar[0].movie.title, "Airplane! (1980)");

        assert!(similar_movies(&model, &catalog(), 4, 5).is_empty());
    }
}
