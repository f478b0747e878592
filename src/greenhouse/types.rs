use serde::{Deserialize, Serialize};

/// One job posting, normalized for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
  pub id: String,
  pub title: String,
  pub location: String,
  /// First department listed upstream
  pub department: String,
  pub hosted_url: String,
  /// Upstream's last-updated timestamp, kept as received
  pub created_at: String,
}

/// Where a list of positions came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSource {
  Network,
  Cache,
}

/// Result of asking the repository for positions.
///
/// Failures are kept distinct from an empty board so callers can log them,
/// while the rendered output treats both as "nothing to show".
#[derive(Debug, Clone, PartialEq)]
pub enum PositionsOutcome {
  Positions {
    positions: Vec<Position>,
    source: PositionSource,
  },
  /// The board returned no usable jobs
  Empty,
  /// The upstream call failed
  FetchFailed(String),
}

impl PositionsOutcome {
  pub fn positions(&self) -> &[Position] {
    match self {
      PositionsOutcome::Positions { positions, .. } => positions,
      _ => &[],
    }
  }

  pub fn into_positions(self) -> Vec<Position> {
    match self {
      PositionsOutcome::Positions { positions, .. } => positions,
      _ => Vec::new(),
    }
  }
}
