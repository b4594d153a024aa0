use color_eyre::{eyre::eyre, Result};
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;
use crate::query::FetchError;

use super::api::DataAccess;
use super::types::{Comment, Page, Post, PostId};

/// Title written by `update_post`
pub const UPDATED_TITLE: &str = "REACT QUERY FOREVER!!!!";

/// URLs of the blog endpoints, relative to the configured base
#[derive(Debug, Clone)]
struct Endpoints {
  base_url: Url,
  page_size: u32,
}

impl Endpoints {
  fn new(base_url: &str, page_size: u32) -> Result<Self> {
    Ok(Self {
      base_url: parse_base_url(base_url)?,
      page_size,
    })
  }

  fn join(&self, path: &str) -> Result<Url, FetchError> {
    self
      .base_url
      .join(path)
      .map_err(|e| FetchError::request(format!("invalid endpoint {}: {}", path, e)))
  }

  fn posts(&self, page: Page) -> Result<Url, FetchError> {
    let mut url = self.join("posts")?;
    url
      .query_pairs_mut()
      .append_pair("_limit", &self.page_size.to_string())
      .append_pair("_page", &page.to_string());
    Ok(url)
  }

  fn comments(&self, post: PostId) -> Result<Url, FetchError> {
    let mut url = self.join("comments")?;
    url.query_pairs_mut().append_pair("postId", &post.to_string());
    Ok(url)
  }

  fn post(&self, post: PostId) -> Result<Url, FetchError> {
    self.join(&format!("posts/{}", post))
  }
}

/// HTTP client for a JSONPlaceholder-style blog API
#[derive(Clone)]
pub struct BlogClient {
  client: reqwest::Client,
  endpoints: Endpoints,
}

impl BlogClient {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    let endpoints = Endpoints::new(&config.base_url, config.page_size)?;

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .user_agent(concat!("postq/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client, endpoints })
  }

  /// Host shown in the header
  pub fn host(&self) -> &str {
    self.endpoints.base_url.host_str().unwrap_or("")
  }
}

impl DataAccess for BlogClient {
  async fn fetch_posts(&self, page: Page) -> Result<Vec<Post>, FetchError> {
    let url = self.endpoints.posts(page)?;
    debug!(%url, "GET posts");

    let posts = self
      .client
      .get(url)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;
    Ok(posts)
  }

  async fn fetch_comments(&self, post: PostId) -> Result<Vec<Comment>, FetchError> {
    let url = self.endpoints.comments(post)?;
    debug!(%url, "GET comments");

    let comments = self
      .client
      .get(url)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;
    Ok(comments)
  }

  async fn delete_post(&self, post: PostId) -> Result<(), FetchError> {
    let url = self.endpoints.post(post)?;
    debug!(%url, "DELETE post");

    self.client.delete(url).send().await?.error_for_status()?;
    Ok(())
  }

  async fn update_post(&self, post: PostId) -> Result<Post, FetchError> {
    let url = self.endpoints.post(post)?;
    debug!(%url, "PATCH post");

    let updated = self
      .client
      .patch(url)
      .json(&json!({ "title": UPDATED_TITLE }))
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;
    Ok(updated)
  }
}

/// Parse the configured base URL so relative endpoints nest under its path.
fn parse_base_url(raw: &str) -> Result<Url> {
  let mut normalized = raw.trim_end_matches('/').to_string();
  normalized.push('/');

  let url = Url::parse(&normalized).map_err(|e| eyre!("Invalid API base URL {}: {}", raw, e))?;
  if url.cannot_be_a_base() {
    return Err(eyre!("Invalid API base URL {}: not a base URL", raw));
  }
  Ok(url)
}
