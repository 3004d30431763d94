//! Parser and writer for the CSV dataset files.
//!
//! - movies.csv: movieId,title,genres
//! - ratings.csv: userId,movieId,rating,timestamp
//!
//! Both files start with a header row and follow RFC 4180 quoting, so titles
//! may contain commas, quotes or line breaks. Fields are matched to columns
//! by header name.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::path::Path;

pub const MOVIES_HEADER: [&str; 3] = ["movieId", "title", "genres"];
pub const RATINGS_HEADER: [&str; 4] = ["userId", "movieId", "rating", "timestamp"];

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct MovieRow {
    movie_id: MovieId,
    title: String,
    genres: String,
}

/// The timestamp column is advisory; a missing one defaults to 0.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct RatingRow {
    user_id: UserId,
    movie_id: MovieId,
    rating: f32,
    #[serde(default)]
    timestamp: i64,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn line_of(err: &csv::Error) -> usize {
    err.position().map_or(0, |pos| pos.line() as usize)
}

/// Map a csv error onto the loader's line-numbered errors
fn csv_error(file: &str, err: csv::Error) -> DataLoadError {
    let line = line_of(&err);
    match err.into_kind() {
        csv::ErrorKind::Io(err) => DataLoadError::IoError(err),
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => DataLoadError::FieldCountMismatch {
            file: file.to_string(),
            expected: expected_len as usize,
            found: len as usize,
            line,
        },
        csv::ErrorKind::Utf8 { err, .. } => DataLoadError::ParseError {
            file: file.to_string(),
            line,
            reason: format!("Invalid UTF-8: {}", err),
        },
        csv::ErrorKind::Deserialize { err, .. } => DataLoadError::ParseError {
            file: file.to_string(),
            line,
            reason: err.to_string(),
        },
        other => DataLoadError::ParseError {
            file: file.to_string(),
            line,
            reason: format!("{:?}", other),
        },
    }
}

/// Read every data row of a headed CSV file, paired with its line number
///
/// Rows may omit trailing columns down to `min_fields`; serde defaults fill
/// the rest. Blank lines are skipped.
fn read_rows<T: DeserializeOwned>(path: &Path, min_fields: usize) -> Result<Vec<(usize, T)>> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let file = file_name(path);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| csv_error(&file, e))?;
    let headers = reader.headers().map_err(|e| csv_error(&file, e))?.clone();

    let mut rows = Vec::new();
    let mut record = csv::StringRecord::new();
    while reader
        .read_record(&mut record)
        .map_err(|e| csv_error(&file, e))?
    {
        let line = record.position().map_or(0, |pos| pos.line() as usize);
        if record.len() < min_fields || record.len() > headers.len() {
            return Err(DataLoadError::FieldCountMismatch {
                file: file.clone(),
                expected: headers.len(),
                found: record.len(),
                line,
            });
        }

        let row = record
            .deserialize(Some(&headers))
            .map_err(|e| DataLoadError::ParseError {
                file: file.clone(),
                line,
                reason: match e.kind() {
                    csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
                    _ => e.to_string(),
                },
            })?;
        rows.push((line, row));
    }
    Ok(rows)
}

/// Parse the movies.csv file, preserving file order
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    let file = file_name(path);
    read_rows::<MovieRow>(path, MOVIES_HEADER.len())?
        .into_iter()
        .map(|(line, row)| {
            if row.title.is_empty() {
                return Err(DataLoadError::ParseError {
                    file: file.clone(),
                    line,
                    reason: "Missing title".to_string(),
                });
            }
            Ok(Movie::new(row.movie_id, row.title, &row.genres))
        })
        .collect()
}

/// Parse the ratings.csv file, preserving file order
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    Ok(read_rows::<RatingRow>(path, RATINGS_HEADER.len() - 1)?
        .into_iter()
        .map(|(_, row)| Rating {
            user_id: row.user_id,
            movie_id: row.movie_id,
            rating: row.rating,
            timestamp: row.timestamp,
        })
        .collect())
}

/// Write rows under an explicit header, so an empty table still gets one
fn write_rows<T, I>(path: &Path, header: &[&str], rows: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let file = file_name(path);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| csv_error(&file, e))?;
    writer.write_record(header).map_err(|e| csv_error(&file, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| csv_error(&file, e))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write movies to a CSV file (with header)
pub fn write_movies(path: &Path, movies: &[Movie]) -> Result<()> {
    write_rows(
        path,
        &MOVIES_HEADER,
        movies.iter().map(|movie| MovieRow {
            movie_id: movie.id,
            title: movie.title.clone(),
            genres: movie.genre_string(),
        }),
    )
}

/// Write ratings to a CSV file (with header)
pub fn write_ratings(path: &Path, ratings: &[Rating]) -> Result<()> {
    write_rows(
        path,
        &RATINGS_HEADER,
        ratings.iter().map(|r| RatingRow {
            user_id: r.user_id,
            movie_id: r.movie_id,
            rating: r.rating,
            timestamp: r.timestamp,
        }),
    )
}
