//! Typed query builders for the blog resources.
//!
//! Each builder produces both the cache key and the fetcher from the same
//! fields, so a fetcher can't depend on a value the key leaves out.

use futures::future::{BoxFuture, FutureExt};

use crate::query::{FetchError, QueryKey};

use super::api::DataAccess;
use super::types::{Comment, Page, Post, PostId};

const POSTS: &str = "posts";
const COMMENTS: &str = "comments";

/// One page of the post list: `["posts", page]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostsQuery {
  pub page: Page,
}

impl PostsQuery {
  pub fn new(page: Page) -> Self {
    Self { page }
  }

  pub fn key(&self) -> QueryKey {
    QueryKey::new(POSTS).with(self.page)
  }

  pub fn fetcher<A: DataAccess>(
    &self,
    api: &A,
  ) -> impl Fn() -> BoxFuture<'static, Result<Vec<Post>, FetchError>> + Send + Sync + 'static {
    let api = api.clone();
    let page = self.page;
    move || {
      let api = api.clone();
      async move { api.fetch_posts(page).await }.boxed()
    }
  }
}

/// Comments of a single post: `["comments", post_id]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentsQuery {
  pub post: PostId,
}

impl CommentsQuery {
  pub fn new(post: PostId) -> Self {
    Self { post }
  }

  pub fn key(&self) -> QueryKey {
    QueryKey::new(COMMENTS).with(self.post)
  }

  pub fn fetcher<A: DataAccess>(
    &self,
    api: &A,
  ) -> impl Fn() -> BoxFuture<'static, Result<Vec<Comment>, FetchError>> + Send + Sync + 'static
  {
    let api = api.clone();
    let post = self.post;
    move || {
      let api = api.clone();
      async move { api.fetch_comments(post).await }.boxed()
    }
  }
}
