//! Serde-deserializable types matching Greenhouse job board API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::config::MissingDepartment;

use super::types::Position;

/// Department name used when a job lists none and the policy keeps it
pub const UNSPECIFIED_DEPARTMENT: &str = "Unspecified";

// ============================================================================
// Common nested field types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiLocation {
  pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiDepartment {
  pub name: Option<String>,
}

// ============================================================================
// Jobs endpoint response
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiJob {
  /// Ids are numeric upstream but may be null; kept loose
  pub internal_job_id: Option<Value>,
  pub id: Option<Value>,
  pub title: Option<String>,
  pub location: Option<ApiLocation>,
  pub departments: Option<Vec<ApiDepartment>>,
  pub absolute_url: Option<String>,
  pub updated_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiJobsResponse {
  /// Absent when the board has nothing to report. Records stay raw so one
  /// badly shaped job can be skipped on its own.
  pub jobs: Option<Vec<Value>>,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

/// Why a job record was left out of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
  Malformed(String),
  MissingId,
  MissingTitle,
  InvalidUrl(String),
  MissingLocation,
  MissingDepartment,
}

impl std::fmt::Display for SkipReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SkipReason::Malformed(e) => write!(f, "malformed record: {}", e),
      SkipReason::MissingId => write!(f, "missing id"),
      SkipReason::MissingTitle => write!(f, "missing title"),
      SkipReason::InvalidUrl(url) => write!(f, "invalid posting url '{}'", url),
      SkipReason::MissingLocation => write!(f, "missing location"),
      SkipReason::MissingDepartment => write!(f, "no department"),
    }
  }
}

impl ApiJob {
  /// Decode one raw job record.
  pub fn from_value(raw: Value) -> Result<Self, SkipReason> {
    serde_json::from_value(raw).map_err(|e| SkipReason::Malformed(e.to_string()))
  }

  pub fn into_position(self, policy: MissingDepartment) -> Result<Position, SkipReason> {
    let id = id_string(self.internal_job_id.as_ref())
      .or_else(|| id_string(self.id.as_ref()))
      .ok_or(SkipReason::MissingId)?;

    let title = self.title.unwrap_or_default().trim().to_string();
    if title.is_empty() {
      return Err(SkipReason::MissingTitle);
    }

    let hosted_url = self.absolute_url.unwrap_or_default();
    if !is_http_url(&hosted_url) {
      return Err(SkipReason::InvalidUrl(hosted_url));
    }

    let location = self
      .location
      .and_then(|l| l.name)
      .ok_or(SkipReason::MissingLocation)?;

    // Only the first department is kept
    let first_department = self
      .departments
      .unwrap_or_default()
      .into_iter()
      .next()
      .and_then(|d| d.name)
      .filter(|name| !name.is_empty());

    let department = match (first_department, policy) {
      (Some(name), _) => name,
      (None, MissingDepartment::Skip) => return Err(SkipReason::MissingDepartment),
      (None, MissingDepartment::Unspecified) => UNSPECIFIED_DEPARTMENT.to_string(),
    };

    Ok(Position {
      id,
      title,
      location,
      department,
      hosted_url,
      created_at: self.updated_at.unwrap_or_default(),
    })
  }
}

/// Identifier of a raw job record used in logs, whichever id upstream supplied.
pub fn display_id(raw: &Value) -> String {
  id_string(raw.get("internal_job_id"))
    .or_else(|| id_string(raw.get("id")))
    .unwrap_or_else(|| "?".to_string())
}

/// Decode and normalize one raw job record.
pub fn normalize_job(raw: Value, policy: MissingDepartment) -> Result<Position, SkipReason> {
  ApiJob::from_value(raw)?.into_position(policy)
}

// ============================================================================
// Helpers
// ============================================================================

/// Render an upstream id (number or string) as a non-empty string
fn id_string(value: Option<&Value>) -> Option<String> {
  match value? {
    Value::Number(n) => Some(n.to_string()),
    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
    _ => None,
  }
}

fn is_http_url(raw: &str) -> bool {
  Url::parse(raw)
    .map(|u| matches!(u.scheme(), "http" | "https"))
    .unwrap_or(false)
}
