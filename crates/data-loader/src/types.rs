//! Core domain types for the movie catalog and rating table.
//!
//! Key Rust concepts used here:
//! - Type aliases for domain clarity (UserId, MovieId)
//! - Structs with public fields
//! - Derive macros for common traits

use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up user IDs with movie IDs

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

/// Separator used inside the raw genre column ("Action|Adventure|Sci-Fi")
pub const GENRE_DELIMITER: char = '|';

/// Lowest rating value accepted when loading a dataset
pub const MIN_RATING: f32 = 0.5;

/// Highest rating value accepted when loading a dataset
pub const MAX_RATING: f32 = 5.0;

/// The 18 MovieLens genre tags
pub const GENRE_NAMES: [&str; 18] = [
    "Action",
    "Adventure",
    "Animation",
    "Children",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Fantasy",
    "Film-Noir",
    "Horror",
    "Musical",
    "Mystery",
    "Romance",
    "Sci-Fi",
    "Thriller",
    "War",
    "Western",
];

// =============================================================================
// Movie
// =============================================================================

/// Represents a movie in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Year extracted from title (e.g., "Toy Story (1995)")
    pub year: Option<u16>,
    /// Genre tags in the order they appeared in the source row, without duplicates
    pub genres: Vec<String>,
}

impl Movie {
    /// Build a movie from its raw columns, splitting the genre string on `|`
    pub fn new(id: MovieId, title: impl Into<String>, genres: &str) -> Self {
        let title = title.into();
        Self {
            id,
            year: extract_year_from_title(&title),
            title,
            genres: split_genres(genres),
        }
    }

    /// True when this movie carries at least one of the given tags
    pub fn has_any_genre<S: AsRef<str>>(&self, wanted: &[S]) -> bool {
        wanted
            .iter()
            .any(|w| self.genres.iter().any(|g| g == w.as_ref()))
    }

    /// The genre tags joined back into their raw `A|B|C` form
    pub fn genre_string(&self) -> String {
        self.genres.join(&GENRE_DELIMITER.to_string())
    }
}

/// Split a raw genre column into distinct, non-empty tags
///
/// Example: "Action|Drama|Action" -> ["Action", "Drama"]
pub fn split_genres(raw: &str) -> Vec<String> {
    let mut genres: Vec<String> = Vec::new();
    for tag in raw.split(GENRE_DELIMITER).map(str::trim) {
        if !tag.is_empty() && !genres.iter().any(|g| g == tag) {
            genres.push(tag.to_string());
        }
    }
    genres
}

/// Extract year from movie title
///
/// Example: "Toy Story (1995)" -> Some(1995)
///          "Movie Title" -> None
pub fn extract_year_from_title(title: &str) -> Option<u16> {
    let start = title.rfind('(')?;
    let end = title.rfind(')')?;
    if start < end {
        return title[start + 1..end].trim().parse::<u16>().ok();
    }
    None
}

// =============================================================================
// Rating Type
// =============================================================================

/// A single rating from a user for a movie
///
/// Ratings are never edited in place; a new rating for the same pair is appended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value, normally 0.5 to 5.0 in half steps
    pub rating: f32,
    /// Unix timestamp when rating was made (advisory only)
    pub timestamp: i64,
}

// =============================================================================
// Statistics Types
// =============================================================================

/// Aggregate statistics for a movie, computed from the rating table on demand
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovieStats {
    pub avg_rating: f32,
    /// Support count: number of rating rows observed for the movie
    pub rating_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year_from_title("Toy Story (1995)"), Some(1995));
        assert_eq!(extract_year_from_title("Movie 12 (2024)"), Some(2024));
        assert_eq!(extract_year_from_title("Movie Title"), None);
        assert_eq!(extract_year_from_title("Broken )( title"), None);
    }

    #[test]
    fn test_split_genres_dedups_and_keeps_order() {
        assert_eq!(split_genres("Drama|Action|Drama"), vec!["Drama", "Action"]);
        assert!(split_genres("").is_empty());
    }

    #[test]
    fn test_has_any_genre_is_a_union() {
        let movie = Movie::new(1, "Heat (1995)", "Action|Drama");
        assert!(movie.has_any_genre(&["Comedy", "Action"]));
        assert!(!movie.has_any_genre(&["Comedy", "Horror"]));
        assert!(!movie.has_any_genre::<&str>(&[]));
        assert_eq!(movie.genre_string(), "Action|Drama");
        assert_eq!(movie.year, Some(1995));
    }
}
