use crate::config::Config;
use crate::greenhouse::api_types::ApiJobsResponse;
use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Greenhouse job board API client
#[derive(Clone)]
pub struct BoardClient {
  http: reqwest::Client,
  base_url: Url,
  board_token: String,
}

impl BoardClient {
  pub fn new(base_url: &str, board_token: &str, timeout: Duration) -> Result<Self> {
    let base_url =
      Url::parse(base_url).map_err(|e| eyre!("Invalid API base URL '{}': {}", base_url, e))?;

    let http = reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(concat!("greenhouse-jobs/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url,
      board_token: board_token.to_string(),
    })
  }

  pub fn from_config(config: &Config, board_token: &str) -> Result<Self> {
    Self::new(
      &config.greenhouse.api_base_url,
      board_token,
      config.request_timeout(),
    )
  }

  /// `{base}{board_token}/{endpoint}/?content=true`
  pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| eyre!("API base URL cannot hold a path: {}", self.base_url))?
      .pop_if_empty()
      .push(&self.board_token)
      .push(endpoint)
      .push("");
    url.set_query(Some("content=true"));
    Ok(url)
  }

  /// GET a board endpoint and decode its JSON body.
  ///
  /// Transport errors, non-2xx statuses and undecodable bodies are all errors.
  pub async fn fetch<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
    let url = self.endpoint_url(endpoint)?;
    debug!(%url, "requesting board endpoint");

    let response = self
      .http
      .get(url.clone())
      .send()
      .await
      .map_err(|e| eyre!("Failed to reach {}: {}", url, e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(eyre!("{} returned HTTP {}", url, status));
    }

    let body = response
      .bytes()
      .await
      .map_err(|e| eyre!("Failed to read response from {}: {}", url, e))?;

    serde_json::from_slice(&body).map_err(|e| eyre!("Failed to parse response from {}: {}", url, e))
  }

  /// Fetch all published jobs for the board
  pub async fn fetch_jobs(&self) -> Result<ApiJobsResponse> {
    self.fetch("jobs").await
  }
}
