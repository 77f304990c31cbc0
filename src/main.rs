//! Main entry point for the mars-ratings tool
//!
//! Loads the match table, replays it for players and/or corporations and
//! writes the rating history, current ratings and win-rate tables.

use anyhow::{Context, Result};
use clap::Parser;
use mars_ratings::config::{validate_config, AppConfig};
use mars_ratings::dataset::load_records;
use mars_ratings::rating::{
    HistoricalRatingEngine, MatchSizeFilter, MultiplayerEloCalculator, RatingCalculator,
};
use mars_ratings::report::{current_ratings, win_rates, write_table, OutputFormat};
use mars_ratings::types::{EntityDimension, MatchRecord};
use mars_ratings::{RatingHistory, ReplayOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Historical multiplayer Elo ratings for Terraforming Mars
#[derive(Parser)]
#[command(
    name = "mars-ratings",
    version,
    about = "Computes historical multiplayer Elo ratings for players and corporations",
    long_about = "Replays every recorded Terraforming Mars game in chronological order and \
                 writes a dense rating trajectory per player and per corporation, along with \
                 the current ratings and a win-rate summary."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Match table override
    #[arg(short, long, value_name = "FILE", help = "Path to the match table (CSV)")]
    input: Option<PathBuf>,

    /// Which dimensions to rate
    #[arg(
        long,
        default_value = "both",
        value_parser = ["players", "corporations", "both"],
        help = "Rate players, corporations or both"
    )]
    dimension: String,

    /// Scoring policy override
    #[arg(long, value_name = "NAME", help = "Scoring function (linear, exp)")]
    score_function: Option<String>,

    /// Match size filter
    #[arg(
        long,
        default_value = "all",
        value_parser = ["all", "two-player", "multiplayer"],
        help = "Restrict the replay by match size"
    )]
    match_size: String,

    /// Corporation origins in scope (repeatable)
    #[arg(long = "origin", value_name = "TAG", help = "Only rate corporations from this expansion")]
    origins: Vec<String>,

    /// Players to report (repeatable)
    #[arg(long = "include-player", value_name = "NAME", help = "Only output rows for this player")]
    include_players: Vec<String>,

    /// Corporations to report (repeatable)
    #[arg(
        long = "include-corporation",
        value_name = "NAME",
        help = "Only output rows for this corporation"
    )]
    include_corporations: Vec<String>,

    /// Recompute places from total points
    #[arg(long, help = "Recompute finishing places from total points before replay")]
    rerank: bool,

    /// Output directory override
    #[arg(short, long, value_name = "DIR", help = "Directory for the output tables")]
    output_dir: Option<PathBuf>,

    /// Output format override
    #[arg(short, long, value_name = "FORMAT", help = "Output format (csv, json)")]
    format: Option<String>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without replaying")]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from file or environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(input) = &args.input {
        config.data.input_path = input.clone();
    }
    if let Some(score_function) = &args.score_function {
        config.rating.score_function = score_function.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        config.data.output_dir = output_dir.clone();
    }
    if let Some(format) = &args.format {
        config.data.output_format = format.clone();
    }
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }
    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    validate_config(&config)?;
    Ok(config)
}

/// Display startup banner with run information
fn display_startup_banner(config: &AppConfig, args: &Args) {
    info!("{} v{}", config.service.name, mars_ratings::VERSION);
    info!("   Input: {}", config.data.input_path.display());
    info!(
        "   Output: {} ({})",
        config.data.output_dir.display(),
        config.data.output_format
    );
    info!(
        "   Rating: initial {}, K {}, scale {}, score function {}",
        config.rating.initial_rating,
        config.rating.k_factor,
        config.rating.scale,
        config.rating.score_function
    );
    info!("   Dimensions: {}", args.dimension);
    info!("   Match size: {}", args.match_size);
    if !args.origins.is_empty() {
        info!("   Corporation origins: {}", args.origins.join(", "));
    }
}

fn dimensions(selection: &str) -> Result<Vec<EntityDimension>> {
    if selection == "both" {
        return Ok(vec![EntityDimension::Player, EntityDimension::Corporation]);
    }
    Ok(vec![selection.parse()?])
}

fn replay_options(args: &Args, dimension: EntityDimension) -> Result<ReplayOptions> {
    let match_size: MatchSizeFilter = args.match_size.parse()?;
    let mut options = ReplayOptions::default().with_match_size(match_size);

    match dimension {
        EntityDimension::Player => {
            if !args.include_players.is_empty() {
                options = options.with_include(args.include_players.iter().cloned());
            }
        }
        EntityDimension::Corporation => {
            if !args.origins.is_empty() {
                options = options.with_origins(args.origins.iter().cloned());
            }
            if !args.include_corporations.is_empty() {
                options = options.with_include(args.include_corporations.iter().cloned());
            }
        }
    }

    Ok(options)
}

/// Replay each dimension on its own blocking task
async fn run_replays(
    engine: HistoricalRatingEngine,
    records: Arc<Vec<MatchRecord>>,
    args: &Args,
) -> Result<Vec<(EntityDimension, RatingHistory)>> {
    let mut handles = Vec::new();
    for dimension in dimensions(&args.dimension)? {
        let options = replay_options(args, dimension)?;
        let engine = engine.clone();
        let records = records.clone();
        handles.push((
            dimension,
            tokio::task::spawn_blocking(move || engine.replay(&records, dimension, &options)),
        ));
    }

    let mut histories = Vec::with_capacity(handles.len());
    for (dimension, handle) in handles {
        let history = handle
            .await
            .with_context(|| format!("{} replay task failed", dimension))?
            .with_context(|| format!("{} replay failed", dimension))?;
        histories.push((dimension, history));
    }

    Ok(histories)
}

fn write_outputs(
    config: &AppConfig,
    records: &[MatchRecord],
    histories: &[(EntityDimension, RatingHistory)],
) -> Result<()> {
    let format: OutputFormat = config.data.output_format.parse()?;
    let dir = &config.data.output_dir;

    for (dimension, history) in histories {
        write_table(dir, &format!("{}_ratings", dimension), format, &history.rows)?;

        let current = current_ratings(&history.rows);
        write_table(dir, &format!("{}_current_ratings", dimension), format, &current)?;

        for (rank, entry) in current.iter().take(5).enumerate() {
            info!("   {} #{}: {} ({})", dimension, rank + 1, entry.entity_id, entry.rating);
        }

        if *dimension == EntityDimension::Player {
            write_table(dir, "player_win_rates", format, &win_rates(records))?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config, &args);

    if args.dry_run {
        info!("Configuration validation successful");
        info!("Dry run completed - exiting without replaying");
        return Ok(());
    }

    if args.rerank {
        info!("Recomputing places from total points");
    }
    let records = Arc::new(load_records(&config.data.input_path, args.rerank)?);

    let calculator = MultiplayerEloCalculator::new(&config.rating)?;
    info!("Rating calculator: {}", calculator.config());
    let engine = HistoricalRatingEngine::new(Arc::new(calculator));

    let histories = match run_replays(engine, records.clone(), &args).await {
        Ok(histories) => histories,
        Err(e) => {
            error!("Rating replay failed: {:#}", e);
            std::process::exit(1);
        }
    };

    write_outputs(&config, &records, &histories)?;

    info!("Done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_selection() {
        assert_eq!(
            dimensions("both").unwrap(),
            vec![EntityDimension::Player, EntityDimension::Corporation]
        );
        assert_eq!(dimensions("players").unwrap(), vec![EntityDimension::Player]);
        assert_eq!(
            dimensions("corporations").unwrap(),
            vec![EntityDimension::Corporation]
        );
        assert!(dimensions("teams").is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "mars-ratings",
            "--input",
            "games.csv",
            "--score-function",
            "exp",
            "--debug",
        ]);
        let config = load_config(&args).unwrap();

        assert_eq!(config.service.log_level, "debug");
        assert_eq!(config.rating.score_function, "exp");
        assert_eq!(config.data.input_path, PathBuf::from("games.csv"));
    }

    #[test]
    fn test_corporation_options_carry_filters() {
        let args = Args::parse_from([
            "mars-ratings",
            "--origin",
            "Base",
            "--include-corporation",
            "Ecoline",
            "--include-player",
            "Alice",
        ]);

        let corporations = replay_options(&args, EntityDimension::Corporation).unwrap();
        assert_eq!(corporations.origins.map(|o| o.len()), Some(1));
        assert!(corporations.include.unwrap().contains("Ecoline"));

        let players = replay_options(&args, EntityDimension::Player).unwrap();
        assert!(players.origins.is_none());
        assert!(players.include.unwrap().contains("Alice"));
    }
}
