//! In-memory `DataAccess` for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::query::FetchError;

use super::api::DataAccess;
use super::types::{Comment, Page, Post, PostId};

pub const POSTS_PER_PAGE: u64 = 10;

#[derive(Default)]
struct State {
  post_calls: HashMap<Page, usize>,
  comment_calls: HashMap<PostId, usize>,
  post_failures: HashMap<Page, String>,
  comment_delays: HashMap<PostId, Duration>,
  deleted: Vec<PostId>,
  updated: Vec<PostId>,
}

/// Serves generated posts and comments, counting calls per key.
#[derive(Clone, Default)]
pub struct FakeApi {
  state: Arc<Mutex<State>>,
}

impl FakeApi {
  pub fn new() -> Self {
    Self::default()
  }

  /// Make `fetch_posts(page)` fail with `message`.
  pub fn fail_posts(self, page: Page, message: &str) -> Self {
    self.lock().post_failures.insert(page, message.to_string());
    self
  }

  /// Delay `fetch_comments(post)` by `delay`.
  pub fn delay_comments(self, post: PostId, delay: Duration) -> Self {
    self.lock().comment_delays.insert(post, delay);
    self
  }

  pub fn post_calls(&self, page: Page) -> usize {
    self.lock().post_calls.get(&page).copied().unwrap_or(0)
  }

  pub fn comment_calls(&self, post: PostId) -> usize {
    self.lock().comment_calls.get(&post).copied().unwrap_or(0)
  }

  pub fn deleted(&self) -> Vec<PostId> {
    self.lock().deleted.clone()
  }

  pub fn updated(&self) -> Vec<PostId> {
    self.lock().updated.clone()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, State> {
    self.state.lock().unwrap()
  }
}

pub fn post(id: u64) -> Post {
  Post {
    id: PostId(id),
    user_id: 1,
    title: format!("post {}", id),
    body: format!("body of post {}", id),
  }
}

impl DataAccess for FakeApi {
  async fn fetch_posts(&self, page: Page) -> Result<Vec<Post>, FetchError> {
    let failure = {
      let mut state = self.lock();
      *state.post_calls.entry(page).or_default() += 1;
      state.post_failures.get(&page).cloned()
    };
    if let Some(message) = failure {
      return Err(FetchError::request(message));
    }

    let first = (u64::from(page.get()) - 1) * POSTS_PER_PAGE + 1;
    Ok((first..first + POSTS_PER_PAGE).map(post).collect())
  }

  async fn fetch_comments(&self, post: PostId) -> Result<Vec<Comment>, FetchError> {
    let delay = {
      let mut state = self.lock();
      *state.comment_calls.entry(post).or_default() += 1;
      state.comment_delays.get(&post).copied()
    };
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }

    Ok(
      (1..=2)
        .map(|n| Comment {
          id: post.0 * 10 + n,
          post_id: post,
          name: format!("comment {}", n),
          email: format!("reader{}@example.com", n),
          body: format!("comment {} on post {}", n, post),
        })
        .collect(),
    )
  }

  async fn delete_post(&self, post: PostId) -> Result<(), FetchError> {
    self.lock().deleted.push(post);
    Ok(())
  }

  async fn update_post(&self, id: PostId) -> Result<Post, FetchError> {
    self.lock().updated.push(id);
    Ok(Post {
      title: "updated".to_string(),
      ..post(id.0)
    })
  }
}
