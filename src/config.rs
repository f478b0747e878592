use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE_URL: &str = "https://api.greenhouse.io/v1/boards/";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub greenhouse: GreenhouseConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub listing: ListingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GreenhouseConfig {
  /// Board token identifying the employer's job board
  #[serde(default, deserialize_with = "deserialize_text_field")]
  pub board_token: Option<String>,
  #[serde(default = "default_api_base_url")]
  pub api_base_url: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for GreenhouseConfig {
  fn default() -> Self {
    Self {
      board_token: None,
      api_base_url: default_api_base_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Hours before cached positions expire
  #[serde(default = "default_ttl_hours")]
  pub ttl_hours: u64,
  /// Cache database location (defaults to the user data directory)
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      ttl_hours: default_ttl_hours(),
      path: None,
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingConfig {
  #[serde(default)]
  pub missing_department: MissingDepartment,
}

/// What to do with an upstream job that lists no department.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MissingDepartment {
  /// Leave the job out of the listing
  #[default]
  Skip,
  /// Group the job under "Unspecified"
  Unspecified,
}

fn default_api_base_url() -> String {
  DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
  30
}

fn default_ttl_hours() -> u64 {
  24
}

fn deserialize_text_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let v: Option<String> = Option::deserialize(deserializer)?;
  Ok(v.map(|s| sanitize_text_field(&s)).filter(|s| !s.is_empty()))
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./greenhouse-jobs.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/greenhouse-jobs/config.yaml
  ///
  /// Unlike an explicit path, a missing default file is not an error: the tool
  /// runs unconfigured and renders nothing.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    if let Some(token) = Self::board_token_from_env() {
      config.greenhouse.board_token = Some(token);
    }

    config.cache_ttl()?;

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("greenhouse-jobs.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("greenhouse-jobs").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    Ok(config)
  }

  /// Board token from GREENHOUSE_BOARD_TOKEN, if set and non-blank.
  fn board_token_from_env() -> Option<String> {
    std::env::var("GREENHOUSE_BOARD_TOKEN")
      .ok()
      .map(|t| sanitize_text_field(&t))
      .filter(|t| !t.is_empty())
  }

  /// Replace the board token, e.g. from a command-line flag.
  pub fn with_board_token(mut self, token: &str) -> Self {
    let token = sanitize_text_field(token);
    self.greenhouse.board_token = if token.is_empty() { None } else { Some(token) };
    self
  }

  /// The configured board token, or `None` while the board is unconfigured.
  pub fn board_token(&self) -> Option<&str> {
    self.greenhouse.board_token.as_deref()
  }

  /// Cache lifetime; fails when entries stored now could not carry an expiry.
  pub fn cache_ttl(&self) -> Result<chrono::Duration> {
    i64::try_from(self.cache.ttl_hours)
      .ok()
      .and_then(chrono::Duration::try_hours)
      .filter(|ttl| chrono::Utc::now().checked_add_signed(*ttl).is_some())
      .ok_or_else(|| eyre!("cache.ttl_hours out of range: {}", self.cache.ttl_hours))
  }

  pub fn request_timeout(&self) -> std::time::Duration {
    std::time::Duration::from_secs(self.greenhouse.timeout_secs)
  }

  /// Cache database path, falling back to the user data directory.
  pub fn cache_path(&self) -> Result<PathBuf> {
    if let Some(path) = &self.cache.path {
      return Ok(path.clone());
    }

    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("greenhouse-jobs").join("cache.db"))
  }
}

/// Reduce a free-text setting to plain text.
///
/// Strips markup tags, drops line breaks, tabs and other control characters,
/// collapses runs of whitespace and trims the result.
pub fn sanitize_text_field(input: &str) -> String {
  let mut stripped = String::with_capacity(input.len());
  let mut in_tag = false;

  for c in input.chars() {
    match c {
      '<' => in_tag = true,
      '>' if in_tag => in_tag = false,
      _ if in_tag => {}
      '\n' | '\r' | '\t' => stripped.push(' '),
      _ if c.is_control() => {}
      _ => stripped.push(c),
    }
  }

  stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
