use data_loader::{Dataset, SyntheticConfig};
use std::path::PathBuf;
use std::time::Instant;

fn main() {
    tracing_subscriber::fmt::init();

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));

    println!("Loading dataset from {}...\n", data_dir.display());

    let start = Instant::now();
    let dataset = Dataset::load_or_generate(&data_dir, &SyntheticConfig::default())
        .expect("Failed to load dataset");
    let elapsed = start.elapsed();

    let (users, movies) = dataset.interactions.counts();
    let ratings = dataset.interactions.len();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Catalog: {} movies", dataset.catalog.len());
    println!("Rated: {} users, {} movies", users, movies);
    println!("Ratings: {}", ratings);
    println!(
        "\nPerformance: {:.0} ratings/second",
        ratings as f64 / elapsed.as_secs_f64()
    );

    let start = Instant::now();
    let stats = dataset.interactions.movie_stats();
    println!("Aggregated {} movies in {:?}", stats.len(), start.elapsed());
}
