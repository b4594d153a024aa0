use std::future::Future;

use crate::query::FetchError;

use super::types::{Comment, Page, Post, PostId};

/// Request/response access to the blog backend. No caching happens here.
///
/// Implementations are cheap to clone; each fetch clones the handle into
/// its own task.
pub trait DataAccess: Clone + Send + Sync + 'static {
  fn fetch_posts(&self, page: Page) -> impl Future<Output = Result<Vec<Post>, FetchError>> + Send;

  fn fetch_comments(
    &self,
    post: PostId,
  ) -> impl Future<Output = Result<Vec<Comment>, FetchError>> + Send;

  fn delete_post(&self, post: PostId) -> impl Future<Output = Result<(), FetchError>> + Send;

  /// Change the post title, returning the post as the server now has it.
  fn update_post(&self, post: PostId) -> impl Future<Output = Result<Post, FetchError>> + Send;
}
