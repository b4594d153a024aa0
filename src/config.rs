use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::blog::{Page, SessionSettings};
use crate::query::{CacheOptions, RetryPolicy};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  pub pagination: PaginationConfig,
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Base URL of the blog API
  pub base_url: String,
  /// Posts per page
  pub page_size: u32,
  /// Per-request timeout
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: "https://jsonplaceholder.typicode.com".to_string(),
      page_size: 10,
      timeout_secs: 10,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
  pub max_page: u32,
}

impl Default for PaginationConfig {
  fn default() -> Self {
    Self { max_page: 10 }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// How long a page of posts stays fresh
  pub posts_stale_time_ms: u64,
  /// How long comments stay fresh (0 = refetch on every selection)
  pub comments_stale_time_ms: u64,
  /// Entries kept per cache, `null` for unbounded
  pub max_entries: Option<usize>,
  pub retry: RetryConfig,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      posts_stale_time_ms: 2000,
      comments_stale_time_ms: 0,
      max_entries: Some(64),
      retry: RetryConfig::default(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
  /// Retries after the first failed attempt
  pub attempts: u32,
  pub base_delay_ms: u64,
  pub max_delay_ms: u64,
}

impl Default for RetryConfig {
  fn default() -> Self {
    Self {
      attempts: 3,
      base_delay_ms: 1000,
      max_delay_ms: 30_000,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./postq.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/postq/config.yaml
  ///
  /// Falls back to defaults when no file is found.
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

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("postq.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("postq").join("config.yaml");
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

  pub fn from_yaml(contents: &str) -> Result<Self> {
    // An empty file deserializes to null, treat it as all defaults
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    let config: Config = serde_yaml::from_str(contents).map_err(|e| eyre!("{}", e))?;
    Ok(config)
  }

  /// Check values that serde can't.
  pub fn validate(&self) -> Result<()> {
    if self.pagination.max_page == 0 {
      return Err(eyre!("pagination.max_page must be at least 1"));
    }
    if self.api.page_size == 0 {
      return Err(eyre!("api.page_size must be at least 1"));
    }
    if self.cache.max_entries == Some(0) {
      return Err(eyre!("cache.max_entries must be at least 1, or null for unbounded"));
    }
    Ok(())
  }

  pub fn session_settings(&self) -> Result<SessionSettings> {
    self.validate()?;

    let max_page = Page::new(self.pagination.max_page)
      .ok_or_else(|| eyre!("pagination.max_page must be at least 1"))?;

    let retry = RetryPolicy {
      retries: self.cache.retry.attempts,
      base_delay: Duration::from_millis(self.cache.retry.base_delay_ms),
      max_delay: Duration::from_millis(self.cache.retry.max_delay_ms),
    };

    Ok(SessionSettings {
      max_page,
      posts_stale_time: Duration::from_millis(self.cache.posts_stale_time_ms),
      comments_stale_time: Duration::from_millis(self.cache.comments_stale_time_ms),
      cache: CacheOptions {
        retry,
        max_entries: self.cache.max_entries.and_then(NonZeroUsize::new),
      },
    })
  }
}
