//! gat-rating - command-line leaderboard viewer
//!
//! Fetches the multi-school exam rating from the provider, optionally loads
//! further pages, and prints the podium plus the ranked remainder either as
//! one list or grouped by school.

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use gat_common::config::ConfigResolver;
use gat_rating::export::ranked_rows;
use gat_rating::model::{format_score, Stats};
use gat_rating::{
    project, rank, FetchMode, FetchOutcome, FilterState, HttpRatingProvider, Leaderboard,
    PresentationModel, RankedRecord, ResultAccumulator, SkipReason, ViewMode,
};

#[derive(Parser, Debug)]
#[command(name = "gat-rating", version, about = "Multi-school exam leaderboard")]
struct Args {
    /// Config file (default: <config_dir>/gat-rating/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Provider root URL, e.g. http://127.0.0.1:8000/api
    #[arg(long)]
    base_url: Option<String>,

    /// Language tag (ru, tj, en)
    #[arg(long)]
    lang: Option<String>,

    #[arg(long, value_delimiter = ',')]
    schools: Vec<u64>,

    #[arg(long, value_delimiter = ',')]
    grades: Vec<u32>,

    #[arg(long, value_delimiter = ',')]
    sections: Vec<String>,

    /// Exam rounds, e.g. gat1,gat2
    #[arg(long, value_delimiter = ',')]
    exams: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    days: Vec<u32>,

    #[arg(long, value_delimiter = ',')]
    subjects: Vec<u64>,

    #[arg(long)]
    page_size: Option<u32>,

    /// Pages to load (first page plus "load more" up to this count)
    #[arg(long, default_value_t = 1)]
    pages: u32,

    /// global or group
    #[arg(long, default_value = "global")]
    view: ViewMode,

    /// Print the ranked dataset as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigResolver::new()
        .with_config_path(args.config.clone())
        .with_base_url(args.base_url.clone())
        .resolve()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting gat-rating v{} (provider {})",
        env!("CARGO_PKG_VERSION"),
        config.base_url
    );

    let provider = Arc::new(HttpRatingProvider::from_config(&config)?);
    let session = ResultAccumulator::new(provider);

    let mut filter = FilterState::new(
        args.page_size.unwrap_or(config.page_size),
        args.lang.clone().unwrap_or_else(|| config.locale.clone()),
    );
    filter.school_ids = args.schools;
    filter.grades = args.grades;
    filter.sections = args.sections;
    filter.exam_codes = args.exams;
    filter.day_numbers = args.days;
    filter.subject_ids = args.subjects;

    match session.request(&filter, FetchMode::Reset).await {
        FetchOutcome::Applied(_) => {}
        FetchOutcome::Failed { error, .. } => bail!("Failed to load rating: {}", error),
        other => bail!("Unexpected fetch outcome: {:?}", other),
    }

    for _ in 1..args.pages {
        match session.request(&filter, FetchMode::Append).await {
            FetchOutcome::Applied(_) => continue,
            FetchOutcome::Skipped(SkipReason::NoMorePages) => break,
            FetchOutcome::Failed { error, .. } => {
                warn!("Load more failed, showing results so far: {}", error);
                break;
            }
            other => {
                warn!("Load more stopped: {:?}", other);
                break;
            }
        }
    }

    let snapshot = session.snapshot().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ranked_rows(&snapshot))?);
        return Ok(());
    }

    print_summary(&snapshot.stats, &snapshot.leader.value, snapshot.records.len(), snapshot.has_next);
    let board = rank(&snapshot);
    print_board(&board, args.view);

    Ok(())
}

fn print_summary(stats: &Stats, leader: &str, loaded: usize, has_next: bool) {
    println!(
        "Participants: {}  Average: {}  Leader: {}",
        stats.participants,
        format_score(stats.avg_score),
        leader
    );
    println!(
        "Loaded {} record(s){}",
        loaded,
        if has_next { ", more available" } else { "" }
    );
    println!();
}

fn print_row(entry: &RankedRecord<'_>) {
    let record = entry.record;
    println!(
        "{:>4}  {:<32} {:<24} {:<6} {:>6}",
        entry.rank,
        record.display_name(),
        record.school_name,
        record.class_label(),
        format_score(record.score)
    );
}

fn print_board(board: &Leaderboard<'_>, view: ViewMode) {
    if board.is_empty() {
        println!("No results");
        return;
    }

    for slot in &board.podium {
        println!("#{}  {}  {}", slot.rank(), slot.display_name(), format_score(slot.score()));
    }
    println!();

    match project(&board.rest, view) {
        PresentationModel::Global(entries) => entries.iter().for_each(print_row),
        PresentationModel::Grouped(groups) => {
            for group in groups {
                println!("== {} [{}] ({})", group.school_name, group.theme, group.entries.len());
                group.entries.iter().for_each(print_row);
                println!();
            }
        }
    }
}
