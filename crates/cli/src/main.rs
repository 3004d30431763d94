use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{MovieId, SyntheticConfig, dataset, parser, synthetic};
use engine::{EngineConfig, Recommender, SimilarMovie};
use rand::seq::IndexedRandom;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// movie-recs - item-to-item movie recommendations
#[derive(Parser)]
#[command(name = "movie-recs")]
#[command(about = "Movie recommendations from item-item cosine similarity", long_about = None)]
struct Cli {
    /// Directory holding movies.csv and ratings.csv
    #[arg(short, long, global = true, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Overrides RECS_HOST
        #[arg(long)]
        host: Option<String>,

        /// Overrides RECS_PORT
        #[arg(long)]
        port: Option<u16>,
    },

    /// Movies most similar to a given movie
    Similar {
        #[arg(long)]
        movie_id: MovieId,

        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// Highest-rated movies with enough ratings
    Popular {
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Every genre used by the catalog
    Genres,

    /// Best-rated movies in any of the given genres
    ByGenre {
        /// Comma-separated, e.g. "Comedy,Drama"
        #[arg(long, value_delimiter = ',')]
        genres: Vec<String>,

        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Page through the catalog
    Items {
        #[arg(long, default_value = "0")]
        skip: usize,

        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Training-set RMSE of the similarity model
    Evaluate,

    /// Write a synthetic dataset into the data directory
    Generate {
        #[arg(long, default_value = "2000")]
        movies: u32,

        #[arg(long, default_value = "500")]
        users: u32,

        #[arg(long, default_value = "50000")]
        ratings: usize,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Time model builds and similar-movie queries
    Benchmark {
        /// Number of queries to run
        #[arg(long, default_value = "1000")]
        requests: usize,

        /// Number of concurrent tasks
        #[arg(long, default_value = "8")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => handle_serve(cli.data_dir, host, port).await?,
        Commands::Generate {
            movies,
            users,
            ratings,
            seed,
        } => handle_generate(
            &cli.data_dir,
            SyntheticConfig {
                movies,
                users,
                ratings,
                seed,
            },
        )?,
        Commands::Similar { movie_id, limit } => {
            handle_similar(&load_recommender(&cli.data_dir)?, movie_id, limit)?
        }
        Commands::Popular { limit } => handle_popular(&load_recommender(&cli.data_dir)?, limit),
        Commands::Genres => handle_genres(&load_recommender(&cli.data_dir)?),
        Commands::ByGenre { genres, limit } => {
            handle_by_genre(&load_recommender(&cli.data_dir)?, &genres, limit)
        }
        Commands::Items { skip, limit } => {
            handle_items(&load_recommender(&cli.data_dir)?, skip, limit)
        }
        Commands::Evaluate => handle_evaluate(&load_recommender(&cli.data_dir)?),
        Commands::Benchmark {
            requests,
            concurrent,
        } => {
            let recommender = Arc::new(load_recommender(&cli.data_dir)?);
            handle_benchmark(recommender, requests, concurrent).await?
        }
    }

    Ok(())
}

fn load_recommender(data_dir: &Path) -> Result<Recommender> {
    println!("Loading dataset from {}...", data_dir.display());
    let start = Instant::now();
    let recommender =
        Recommender::load(data_dir, &SyntheticConfig::default(), EngineConfig::default())
            .context("Failed to load dataset")?;
    println!("{} Model ready in {:?}", "✓".green(), start.elapsed());
    Ok(recommender)
}

/// Handle the 'serve' command
async fn handle_serve(data_dir: PathBuf, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = server::Config::from_env()?;
    config.data_dir = data_dir;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    server::run(config).await
}

/// Handle the 'similar' command
fn handle_similar(recommender: &Recommender, movie_id: MovieId, limit: usize) -> Result<()> {
    let movie = recommender.movie(movie_id)?;
    println!("{}", format!("Movies similar to {}:", movie.title).bold().blue());

    let similar = recommender.recommend_similar_k(movie_id, limit);
    if similar.is_empty() {
        println!("  (no ratings yet for this movie)");
    }
    print_similar(&similar);
    Ok(())
}

fn print_similar(similar: &[SimilarMovie]) {
    for (rank, found) in similar.iter().enumerate() {
        println!(
            "{}. {} [{}] - Similarity: {:.3}",
            (rank + 1).to_string().green(),
            found.movie.title,
            found.movie.genre_string(),
            found.similarity
        );
    }
}

/// Handle the 'popular' command
fn handle_popular(recommender: &Recommender, limit: usize) {
    println!("{}", "Popular movies:".bold().blue());
    for (rank, popular) in recommender.list_popular(limit).iter().enumerate() {
        println!(
            "{}. {} - {:.2} avg ({} ratings)",
            (rank + 1).to_string().green(),
            popular.movie.title,
            popular.avg_rating,
            popular.rating_count
        );
    }
}

/// Handle the 'genres' command
fn handle_genres(recommender: &Recommender) {
    println!("{}", "Genres:".bold().blue());
    for genre in recommender.list_genres() {
        println!("{}{}", "• ".cyan(), genre);
    }
}

/// Handle the 'by-genre' command
fn handle_by_genre(recommender: &Recommender, genres: &[String], limit: usize) {
    println!(
        "{}",
        format!("Best rated in {}:", genres.join(", ")).bold().blue()
    );
    for (rank, found) in recommender
        .recommend_by_genres(genres, limit)
        .iter()
        .enumerate()
    {
        println!(
            "{}. {} [{}] - {:.2} avg",
            (rank + 1).to_string().green(),
            found.movie.title,
            found.movie.genre_string(),
            found.avg_rating
        );
    }
}

/// Handle the 'items' command
fn handle_items(recommender: &Recommender, skip: usize, limit: usize) {
    for movie in recommender.list_items(skip, limit) {
        println!("{}: {} [{}]", movie.id, movie.title, movie.genre_string());
    }
}

/// Handle the 'evaluate' command
fn handle_evaluate(recommender: &Recommender) {
    match recommender.evaluate() {
        Some(rmse) => println!("{} Training RMSE: {:.4}", "✓".green(), rmse),
        None => println!("{} No observed ratings to evaluate", "!".yellow()),
    }
}

/// Handle the 'generate' command
fn handle_generate(data_dir: &Path, config: SyntheticConfig) -> Result<()> {
    let start = Instant::now();
    let (movies, ratings) = synthetic::generate(&config);

    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    parser::write_movies(&data_dir.join(dataset::MOVIES_FILE), &movies)?;
    parser::write_ratings(&data_dir.join(dataset::RATINGS_FILE), &ratings)?;

    println!(
        "{} Wrote {} movies and {} ratings to {} in {:?}",
        "✓".green(),
        movies.len(),
        ratings.len(),
        data_dir.display(),
        start.elapsed()
    );
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    recommender: Arc<Recommender>,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    let build_start = Instant::now();
    let rebuilder = recommender.clone();
    tokio::task::spawn_blocking(move || rebuilder.rebuild()).await?;
    println!("Model rebuild: {:?}", build_start.elapsed());

    let movie_ids = recommender.model().similarity.movie_ids().to_vec();
    if movie_ids.is_empty() || requests == 0 {
        println!("{} Nothing to benchmark", "!".yellow());
        return Ok(());
    }

    // Random reference movies drawn from the model
    let queries: Vec<MovieId> = {
        let mut rng = rand::rng();
        (0..requests)
            .filter_map(|_| movie_ids.choose(&mut rng).copied())
            .collect()
    };

    let workers = concurrent.max(1);
    let chunk_size = queries.len().div_ceil(workers);
    let wall_start = Instant::now();

    let mut handles = vec![];
    for chunk in queries.chunks(chunk_size) {
        let recommender = recommender.clone();
        let chunk = chunk.to_vec();
        handles.push(tokio::task::spawn_blocking(move || {
            chunk
                .into_iter()
                .map(|movie_id| {
                    let start = Instant::now();
                    recommender.recommend_similar(movie_id);
                    start.elapsed()
                })
                .collect::<Vec<Duration>>()
        }));
    }

    let mut timings = Vec::with_capacity(queries.len());
    for handle in handles {
        timings.extend(handle.await?);
    }
    let wall = wall_start.elapsed();

    timings.sort();
    let total: Duration = timings.iter().sum();
    let avg = total / timings.len() as u32;
    let percentile = |p: f64| {
        let idx = ((timings.len() as f64 * p) as usize).min(timings.len() - 1);
        timings[idx]
    };

    println!("{}", "Benchmark results:".bold().blue());
    println!("Queries: {} over {} tasks", timings.len(), workers);
    println!("Wall time: {:?}", wall);
    println!("Average latency: {:?}", avg);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} queries/second",
        timings.len() as f64 / wall.as_secs_f64()
    );

    Ok(())
}
