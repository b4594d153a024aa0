//! Blog browsing session: the caches plus the controllers that drive them.

use std::time::Duration;
use tracing::{debug, info};

use crate::query::{
  CacheOptions, Mutation, MutationState, QueryCache, QueryResult, Subscription,
};

use super::api::DataAccess;
use super::pagination::PaginationController;
use super::prefetch::PrefetchScheduler;
use super::queries::PostsQuery;
use super::selection::SelectionController;
use super::types::{Comment, Page, Post, PostId};

#[derive(Debug, Clone)]
pub struct SessionSettings {
  pub max_page: Page,
  pub posts_stale_time: Duration,
  pub comments_stale_time: Duration,
  pub cache: CacheOptions,
}

/// State behind the posts screen.
///
/// Page changes resolve the page's posts and prefetch the following page;
/// selecting a post resolves its comments. Views render the `posts()` and
/// `comments()` snapshots, which only change on `tick()` when the cache
/// reports that the watched key settled.
pub struct BlogSession<A: DataAccess> {
  api: A,
  posts: QueryCache<Vec<Post>>,
  comments: QueryCache<Vec<Comment>>,
  pagination: PaginationController,
  prefetcher: PrefetchScheduler<A>,
  selection: SelectionController,
  posts_stale_time: Duration,
  comments_stale_time: Duration,

  posts_watch: Subscription,
  posts_view: QueryResult<Vec<Post>>,
  comments_watch: Option<Subscription>,
  comments_view: Option<QueryResult<Vec<Comment>>>,

  delete: Mutation<PostId, ()>,
  update: Mutation<PostId, Post>,
}

impl<A: DataAccess> BlogSession<A> {
  pub fn new(api: A, settings: SessionSettings) -> Self {
    let mut posts = QueryCache::new(settings.cache);
    let pagination = PaginationController::new(settings.max_page);
    let posts_watch = posts.subscribe(&PostsQuery::new(pagination.current()).key());

    let delete_api = api.clone();
    let delete = Mutation::new(move |post: PostId| {
      let api = delete_api.clone();
      async move { api.delete_post(post).await }
    });
    let update_api = api.clone();
    let update = Mutation::new(move |post: PostId| {
      let api = update_api.clone();
      async move { api.update_post(post).await }
    });

    let prefetcher =
      PrefetchScheduler::new(api.clone(), settings.max_page, settings.posts_stale_time);

    Self {
      api,
      posts,
      comments: QueryCache::new(settings.cache),
      pagination,
      prefetcher,
      selection: SelectionController::new(),
      posts_stale_time: settings.posts_stale_time,
      comments_stale_time: settings.comments_stale_time,
      posts_watch,
      posts_view: QueryResult::idle(),
      comments_watch: None,
      comments_view: None,
      delete,
      update,
    }
  }

  /// Load the first page. Must run inside the tokio runtime.
  pub fn start(&mut self) {
    self.load_current_page();
  }

  pub fn next_page(&mut self) -> bool {
    match self.pagination.next() {
      Some(page) => {
        info!(%page, "Next page");
        self.load_current_page();
        true
      }
      None => false,
    }
  }

  pub fn previous_page(&mut self) -> bool {
    match self.pagination.previous() {
      Some(page) => {
        info!(%page, "Previous page");
        self.load_current_page();
        true
      }
      None => false,
    }
  }

  /// Refetch the current page even if it is still fresh.
  pub fn refresh(&mut self) {
    let query = PostsQuery::new(self.pagination.current());
    let key = query.key();
    info!(%key, "Refreshing");
    self.posts.refetch(&key, query.fetcher(&self.api));
    self.posts_view = self.posts.snapshot(&key);
  }

  fn load_current_page(&mut self) {
    let query = PostsQuery::new(self.pagination.current());
    let key = query.key();

    if self.posts_watch.key() != &key {
      self.posts_watch = self.posts.subscribe(&key);
    }
    self.posts_view = self
      .posts
      .resolve(&key, query.fetcher(&self.api), self.posts_stale_time);
    self.prefetcher.on_page_change(query.page, &mut self.posts);
  }

  /// Open `post` in the detail pane and load its comments.
  pub fn select(&mut self, post: Post) {
    self.delete.reset();
    self.update.reset();

    info!(post = %post.id, "Selected post");
    let query = self.selection.select(post);
    let key = query.key();

    self.comments_watch = Some(self.comments.subscribe(&key));
    self.comments_view = Some(self.comments.resolve(
      &key,
      query.fetcher(&self.api),
      self.comments_stale_time,
    ));
  }

  /// Select the post at `index` on the current page, if loaded.
  pub fn select_index(&mut self, index: usize) -> bool {
    let post = self
      .posts_view
      .data()
      .and_then(|posts| posts.get(index))
      .cloned();
    match post {
      Some(post) => {
        self.select(post);
        true
      }
      None => false,
    }
  }

  pub fn clear_selection(&mut self) {
    self.selection.clear();
    self.comments_watch = None;
    self.comments_view = None;
  }

  pub fn delete_selected(&mut self) {
    if let Some(post) = self.selection.selected() {
      info!(post = %post.id, "Deleting post");
      self.delete.mutate(post.id);
    }
  }

  pub fn update_selected(&mut self) {
    if let Some(post) = self.selection.selected() {
      info!(post = %post.id, "Updating post title");
      self.update.mutate(post.id);
    }
  }

  /// Commit finished fetches and refresh the views that watch them.
  ///
  /// Returns `true` if anything visible changed.
  pub fn tick(&mut self) -> bool {
    self.posts.poll();
    self.comments.poll();

    let mut changed = false;

    if let Some(event) = self.posts_watch.try_latest() {
      self.posts_view = self.posts.snapshot(&event.key);
      changed = true;
    }

    if let Some(watch) = self.comments_watch.as_mut() {
      if let Some(event) = watch.try_latest() {
        // The watch is replaced on every selection, this guards the gap
        // between a late result and the swap
        if self.selection.is_current(&event.key) {
          self.comments_view = Some(self.comments.snapshot(&event.key));
          changed = true;
        } else {
          debug!(key = %event.key, "Ignoring comments for a deselected post");
        }
      }
    }

    changed |= self.delete.poll();
    changed |= self.update.poll();
    changed
  }

  pub fn current_page(&self) -> Page {
    self.pagination.current()
  }

  pub fn max_page(&self) -> Page {
    self.pagination.max_page()
  }

  pub fn can_go_previous(&self) -> bool {
    self.pagination.can_go_previous()
  }

  pub fn can_go_next(&self) -> bool {
    self.pagination.can_go_next()
  }

  pub fn posts(&self) -> &QueryResult<Vec<Post>> {
    &self.posts_view
  }

  pub fn selected_post(&self) -> Option<&Post> {
    self.selection.selected()
  }

  pub fn comments(&self) -> Option<&QueryResult<Vec<Comment>>> {
    self.comments_view.as_ref()
  }

  pub fn delete_state(&self) -> &MutationState<()> {
    self.delete.state()
  }

  pub fn update_state(&self) -> &MutationState<Post> {
    self.update.state()
  }
}
