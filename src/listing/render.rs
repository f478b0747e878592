//! HTML fragment rendering for a board's positions.
//!
//! The fragment shape is fixed:
//!
//! ```text
//! <div class="job-section"><h3 class="title">Department</h3><ul class="job-listings">
//!   <li class="job-listing"><a class="posting-title" href="URL"><h4>Title</h4>
//!     <div class="posting-categories"><span href="#" class="sort-by-location posting-category">Location</span></div>
//!   </a></li>
//! </ul></div>
//! ```
//!
//! (emitted without whitespace between tags). Text and attributes are escaped.

use tracing::{debug, warn};

use crate::cache::CacheStorage;
use crate::greenhouse::{Position, PositionRepository, PositionsOutcome};

use super::aggregate;
use super::utils::{escape_html, title_case};

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
  /// Only list positions at this exact location
  pub location: Option<String>,
}

/// Render the board's listing.
///
/// Returns `None` when no board is configured; nothing is fetched in that
/// case. Fetch failures and empty boards render as an empty fragment.
pub async fn render<S: CacheStorage>(
  repository: Option<&PositionRepository<S>>,
  options: &RenderOptions,
) -> Option<String> {
  let repository = repository?;

  let outcome = repository.get_positions().await;
  match &outcome {
    PositionsOutcome::Positions { positions, source } => {
      debug!(count = positions.len(), ?source, "rendering positions")
    }
    PositionsOutcome::Empty => debug!("board has no positions"),
    PositionsOutcome::FetchFailed(reason) => {
      warn!(%reason, "rendering empty listing after fetch failure")
    }
  }

  Some(render_filtered(outcome.positions(), options))
}

/// Apply the render options, then render.
pub fn render_filtered(positions: &[Position], options: &RenderOptions) -> String {
  let Some(location) = &options.location else {
    return render_positions(positions);
  };

  if !aggregate::locations(positions).contains(location) {
    warn!(%location, "no positions at requested location");
    return String::new();
  }

  let at_location: Vec<Position> = positions
    .iter()
    .filter(|p| &p.location == location)
    .cloned()
    .collect();
  render_positions(&at_location)
}

/// Render positions grouped under sorted department headings.
pub fn render_positions(positions: &[Position]) -> String {
  let mut output = String::new();

  for department in aggregate::departments(positions) {
    output.push_str(r#"<div class="job-section">"#);
    output.push_str(&format!(
      r#"<h3 class="title">{}</h3>"#,
      escape_html(&title_case(&department))
    ));
    output.push_str(r#"<ul class="job-listings">"#);

    for position in positions.iter().filter(|p| p.department == department) {
      output.push_str(&render_item(position));
    }

    output.push_str("</ul>");
    output.push_str("</div>");
  }

  output
}

fn render_item(position: &Position) -> String {
  format!(
    concat!(
      r#"<li class="job-listing">"#,
      r#"<a class="posting-title" href="{url}">"#,
      "<h4>{title}</h4>",
      r#"<div class="posting-categories">"#,
      r##"<span href="#" class="sort-by-location posting-category">{location}</span>"##,
      "</div>",
      "</a>",
      "</li>"
    ),
    url = escape_html(&position.hosted_url),
    title = escape_html(&position.title),
    location = escape_html(&position.location),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{CacheLayer, SqliteStorage};
  use crate::config::Config;
  use serde_json::json;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn position(title: &str, department: &str, location: &str, url: &str) -> Position {
    Position {
      id: title.to_string(),
      title: title.to_string(),
      location: location.to_string(),
      department: department.to_string(),
      hosted_url: url.to_string(),
      created_at: String::new(),
    }
  }

  fn config_for(server: &MockServer, token: Option<&str>) -> Config {
    let mut config = Config::default();
    config.greenhouse.api_base_url = server.uri();
    config.greenhouse.board_token = token.map(String::from);
    config
  }

  fn memory_cache() -> CacheLayer<SqliteStorage> {
    CacheLayer::new(SqliteStorage::open_in_memory().unwrap())
  }

  #[test]
  fn test_render_item_shape() {
    let html = render_positions(&[position("Engineer", "Engineering", "Remote", "https://x/1")]);
    assert_eq!(
      html,
      concat!(
        r#"<div class="job-section"><h3 class="title">Engineering</h3><ul class="job-listings">"#,
        r#"<li class="job-listing"><a class="posting-title" href="https://x/1"><h4>Engineer</h4>"#,
        r##"<div class="posting-categories"><span href="#" class="sort-by-location posting-category">Remote</span></div>"##,
        "</a></li></ul></div>"
      )
    );
  }

  #[test]
  fn test_render_empty() {
    assert_eq!(render_positions(&[]), "");
  }

  #[test]
  fn test_headings_are_title_cased() {
    let html = render_positions(&[position("Rep", "customer success", "NYC", "https://x/1")]);
    assert!(html.contains(r#"<h3 class="title">Customer Success</h3>"#));
  }

  #[test]
  fn test_case_variants_form_separate_sections() {
    let html = render_positions(&[
      position("A", "eng", "NYC", "https://x/a"),
      position("B", "Eng", "NYC", "https://x/b"),
    ]);
    assert_eq!(html.matches(r#"<div class="job-section">"#).count(), 2);
    assert_eq!(html.matches(r#"<h3 class="title">Eng</h3>"#).count(), 2);
    // "Eng" sorts before "eng"
    assert!(html.find("<h4>B</h4>").unwrap() < html.find("<h4>A</h4>").unwrap());
  }

  #[test]
  fn test_upstream_text_is_escaped() {
    let html = render_positions(&[position(
      "<script>alert(1)</script>",
      "R&D",
      "\"Remote\"",
      "https://x/1?a=1&b=2",
    )]);
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(html.contains(r#"<h3 class="title">R&amp;D</h3>"#));
    assert!(html.contains("&quot;Remote&quot;"));
    assert!(html.contains(r#"href="https://x/1?a=1&amp;b=2""#));
  }

  #[test]
  fn test_location_filter() {
    let positions = vec![
      position("Engineer", "Engineering", "Remote", "https://x/1"),
      position("Sales Rep", "Sales", "NYC", "https://x/2"),
    ];
    let options = RenderOptions {
      location: Some("NYC".to_string()),
    };
    let html = render_filtered(&positions, &options);
    assert!(html.contains("<h4>Sales Rep</h4>"));
    assert!(!html.contains("Engineering"));
  }

  #[test]
  fn test_unknown_location_filter_renders_nothing() {
    let positions = vec![position("Engineer", "Engineering", "Remote", "https://x/1")];
    let options = RenderOptions {
      location: Some("Mars".to_string()),
    };
    assert_eq!(render_filtered(&positions, &options), "");
  }

  #[tokio::test]
  async fn test_no_token_renders_nothing_without_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jobs": [] })))
      .expect(0)
      .mount(&server)
      .await;

    let config = config_for(&server, None);
    let repository = PositionRepository::from_config(&config, memory_cache()).unwrap();
    assert!(repository.is_none());

    let html = render(repository.as_ref(), &RenderOptions::default()).await;
    assert_eq!(html, None);
  }

  #[tokio::test]
  async fn test_end_to_end_two_departments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/acme/jobs/"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "jobs": [
          {
            "id": 2,
            "title": "Sales Rep",
            "location": { "name": "NYC" },
            "departments": [{ "name": "Sales" }],
            "absolute_url": "https://x/2"
          },
          {
            "id": 1,
            "title": "Engineer",
            "location": { "name": "Remote" },
            "departments": [{ "name": "Engineering" }],
            "absolute_url": "https://x/1"
          }
        ]
      })))
      .expect(1)
      .mount(&server)
      .await;

    let config = config_for(&server, Some("acme"));
    let repository = PositionRepository::from_config(&config, memory_cache())
      .unwrap()
      .unwrap();

    let html = render(Some(&repository), &RenderOptions::default())
      .await
      .unwrap();

    assert_eq!(html.matches(r#"<div class="job-section">"#).count(), 2);
    assert_eq!(html.matches(r#"<li class="job-listing">"#).count(), 2);

    let engineering = html.find(r#"<h3 class="title">Engineering</h3>"#).unwrap();
    let sales = html.find(r#"<h3 class="title">Sales</h3>"#).unwrap();
    assert!(engineering < sales);

    let (first_section, second_section) = html.split_at(sales);
    assert!(first_section.contains(r#"href="https://x/1"><h4>Engineer</h4>"#));
    assert!(!first_section.contains("Sales Rep"));
    assert!(second_section.contains(r#"href="https://x/2"><h4>Sales Rep</h4>"#));
    assert!(!second_section.contains("<h4>Engineer</h4>"));
  }

  #[tokio::test]
  async fn test_fetch_failure_renders_empty_fragment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(502))
      .mount(&server)
      .await;

    let config = config_for(&server, Some("acme"));
    let repository = PositionRepository::from_config(&config, memory_cache())
      .unwrap()
      .unwrap();

    let html = render(Some(&repository), &RenderOptions::default()).await;
    assert_eq!(html, Some(String::new()));
  }
}
