use std::future::Future;

/// Placement marker replaced by the rendered listing
pub const SHORTCODE: &str = "[greenhouse_job_listings]";

pub fn contains_shortcode(document: &str) -> bool {
  document.contains(SHORTCODE)
}

/// Replace every placement marker in `document` with the rendered listing.
///
/// `render` runs at most once, and only when the marker is present. A render
/// that yields `None` (board not configured) removes the marker.
pub async fn expand_shortcodes<F, Fut>(document: &str, render: F) -> String
where
  F: FnOnce() -> Fut,
  Fut: Future<Output = Option<String>>,
{
  if !contains_shortcode(document) {
    return document.to_string();
  }

  let fragment = render().await.unwrap_or_default();
  document.replace(SHORTCODE, &fragment)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::Arc;

  #[tokio::test]
  async fn test_document_without_marker_is_untouched() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();
    let out = expand_shortcodes("<p>Hello</p>", move || async move {
      calls_clone.fetch_add(1, Ordering::SeqCst);
      Some("jobs".to_string())
    })
    .await;

    assert_eq!(out, "<p>Hello</p>");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_every_marker_replaced_with_one_render() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();
    let doc = "<h2>Jobs</h2>[greenhouse_job_listings]<hr>[greenhouse_job_listings]";
    let out = expand_shortcodes(doc, move || async move {
      calls_clone.fetch_add(1, Ordering::SeqCst);
      Some("<ul></ul>".to_string())
    })
    .await;

    assert_eq!(out, "<h2>Jobs</h2><ul></ul><hr><ul></ul>");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_unconfigured_render_removes_marker() {
    let out = expand_shortcodes("before [greenhouse_job_listings] after", || async { None }).await;
    assert_eq!(out, "before  after");
  }

  #[test]
  fn test_contains_shortcode() {
    assert!(contains_shortcode("x [greenhouse_job_listings] y"));
    assert!(!contains_shortcode("x [greenhouse_jobs] y"));
  }
}
