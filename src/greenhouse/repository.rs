//! Position repository: cache-or-fetch orchestration over the board client.

use color_eyre::Result;
use tracing::{info, warn};

use crate::cache::{CacheLayer, CacheStorage};
use crate::config::{Config, MissingDepartment};

use super::api_types::{display_id, normalize_job};
use super::client::BoardClient;
use super::types::{Position, PositionSource, PositionsOutcome};

/// Cache key for a board's normalized positions
pub fn positions_key(board_token: &str) -> String {
  format!("positions:{}", board_token)
}

/// Job positions for one board, served from cache when possible.
///
/// Cache problems are logged and treated as misses; they never fail a lookup.
pub struct PositionRepository<S: CacheStorage> {
  client: BoardClient,
  cache: CacheLayer<S>,
  cache_key: String,
  missing_department: MissingDepartment,
}

impl<S: CacheStorage> PositionRepository<S> {
  pub fn new(client: BoardClient, cache: CacheLayer<S>, board_token: &str) -> Self {
    Self {
      client,
      cache,
      cache_key: positions_key(board_token),
      missing_department: MissingDepartment::default(),
    }
  }

  /// Build the repository for the configured board.
  ///
  /// Returns `None` while no board token is configured.
  pub fn from_config(config: &Config, cache: CacheLayer<S>) -> Result<Option<Self>> {
    let Some(board_token) = config.board_token() else {
      return Ok(None);
    };

    let client = BoardClient::from_config(config, board_token)?;
    let repository = Self::new(client, cache.with_ttl(config.cache_ttl()?), board_token)
      .with_missing_department(config.listing.missing_department);

    Ok(Some(repository))
  }

  pub fn with_missing_department(mut self, policy: MissingDepartment) -> Self {
    self.missing_department = policy;
    self
  }

  /// Get the board's positions, fetching and caching them on a miss.
  pub async fn get_positions(&self) -> PositionsOutcome {
    match self.cache.get_list::<Position>(&self.cache_key) {
      Ok(Some(positions)) => {
        return PositionsOutcome::Positions {
          positions,
          source: PositionSource::Cache,
        }
      }
      Ok(None) => {}
      Err(e) => warn!(key = %self.cache_key, error = %e, "cache read failed, fetching instead"),
    }

    let response = match self.client.fetch_jobs().await {
      Ok(response) => response,
      Err(e) => {
        warn!(error = %e, "failed to fetch jobs");
        return PositionsOutcome::FetchFailed(e.to_string());
      }
    };

    let Some(jobs) = response.jobs else {
      info!("board response has no job list");
      return PositionsOutcome::Empty;
    };

    let received = jobs.len();
    let positions: Vec<Position> = jobs
      .into_iter()
      .filter_map(|raw| {
        let job_id = display_id(&raw);
        match normalize_job(raw, self.missing_department) {
          Ok(position) => Some(position),
          Err(reason) => {
            warn!(job_id = %job_id, %reason, "skipping job");
            None
          }
        }
      })
      .collect();

    info!(received, kept = positions.len(), "fetched jobs");

    if positions.is_empty() {
      return PositionsOutcome::Empty;
    }

    if let Err(e) = self.store_positions(&positions) {
      warn!(key = %self.cache_key, error = %e, "failed to cache positions");
    }

    PositionsOutcome::Positions {
      positions,
      source: PositionSource::Network,
    }
  }

  /// Positions only; empty when the board is empty or unreachable.
  pub async fn positions(&self) -> Vec<Position> {
    self.get_positions().await.into_positions()
  }

  /// Cache `positions` unless another writer got there first.
  pub fn store_positions(&self, positions: &[Position]) -> Result<()> {
    if self.cache.store_list_if_absent(&self.cache_key, positions)? {
      info!(
        key = %self.cache_key,
        count = positions.len(),
        ttl_hours = self.cache.ttl().num_hours(),
        "cached positions"
      );
    }
    Ok(())
  }

  /// Drop the cached positions so the next lookup refetches.
  pub fn flush(&self) -> Result<()> {
    self.cache.invalidate(&self.cache_key)?;
    info!(key = %self.cache_key, "flushed cached positions");
    Ok(())
  }
}
