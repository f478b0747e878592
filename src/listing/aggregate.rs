use std::collections::BTreeSet;

use crate::greenhouse::types::Position;

/// Distinct departments, sorted by byte order (case-sensitive)
pub fn departments(positions: &[Position]) -> Vec<String> {
  distinct_sorted(positions.iter().map(|p| p.department.as_str()))
}

/// Distinct locations, sorted by byte order (case-sensitive)
pub fn locations(positions: &[Position]) -> Vec<String> {
  distinct_sorted(positions.iter().map(|p| p.location.as_str()))
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
  values
    .collect::<BTreeSet<_>>()
    .into_iter()
    .map(String::from)
    .collect()
}
