mod cache;
mod config;
mod greenhouse;
mod listing;
mod logging;

use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::cache::{CacheLayer, CacheStorage, NoopStorage, SqliteStorage};
use crate::config::Config;
use crate::greenhouse::{Position, PositionRepository};
use crate::listing::{aggregate, expand_shortcodes, RenderOptions, STYLESHEET};

#[derive(Parser, Debug)]
#[command(name = "greenhouse-jobs")]
#[command(about = "Render Greenhouse job board listings as embeddable HTML")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/greenhouse-jobs/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Greenhouse board token to use
  #[arg(short, long)]
  board_token: Option<String>,

  /// Bypass the positions cache entirely
  #[arg(long)]
  no_cache: bool,

  /// Debug-level logging
  #[arg(short, long)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print the listing fragment (nothing when no board is configured)
  Render {
    /// Only list positions at this location
    #[arg(short, long)]
    location: Option<String>,
  },
  /// Replace [greenhouse_job_listings] markers in a document ("-" for stdin)
  Expand { input: PathBuf },
  /// Print the board's departments, one per line
  Departments,
  /// Print the board's locations, one per line
  Locations,
  /// Drop the cached positions so the next run refetches
  Flush,
  /// Print the listing stylesheet
  Styles,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  logging::init(args.verbose)?;

  // Load configuration
  let config = Config::load(args.config.as_deref())?;

  // Override board token if specified on command line
  let config = if let Some(token) = &args.board_token {
    config.with_board_token(token)
  } else {
    config
  };

  if args.no_cache {
    run(&config, CacheLayer::new(NoopStorage), args.command).await
  } else {
    let storage = SqliteStorage::open(&config.cache_path()?)?;
    run(&config, CacheLayer::new(storage), args.command).await
  }
}

async fn run<S: CacheStorage>(
  config: &Config,
  cache: CacheLayer<S>,
  command: Command,
) -> Result<()> {
  let repository = PositionRepository::from_config(config, cache)?;
  if repository.is_none() {
    debug!("no board token configured");
  }

  match command {
    Command::Render { location } => {
      let options = RenderOptions { location };
      if let Some(html) = listing::render(repository.as_ref(), &options).await {
        print!("{}", html);
      }
    }
    Command::Expand { input } => {
      let document = read_document(&input)?;
      let options = RenderOptions::default();
      let expanded =
        expand_shortcodes(&document, || listing::render(repository.as_ref(), &options)).await;
      print!("{}", expanded);
    }
    Command::Departments => {
      let positions = positions(repository.as_ref()).await;
      print_lines(&aggregate::departments(&positions));
    }
    Command::Locations => {
      let positions = positions(repository.as_ref()).await;
      print_lines(&aggregate::locations(&positions));
    }
    Command::Flush => match &repository {
      Some(repository) => repository.flush()?,
      None => warn!("no board token configured, nothing to flush"),
    },
    Command::Styles => print!("{}", STYLESHEET),
  }

  Ok(())
}

async fn positions<S: CacheStorage>(repository: Option<&PositionRepository<S>>) -> Vec<Position> {
  match repository {
    Some(repository) => repository.positions().await,
    None => Vec::new(),
  }
}

fn read_document(input: &Path) -> Result<String> {
  if input.as_os_str() == "-" {
    return std::io::read_to_string(std::io::stdin())
      .map_err(|e| eyre!("Failed to read document from stdin: {}", e));
  }

  std::fs::read_to_string(input)
    .map_err(|e| eyre!("Failed to read document {}: {}", input.display(), e))
}

fn print_lines(lines: &[String]) {
  for line in lines {
    println!("{}", line);
  }
}
