use std::time::Duration;
use tracing::trace;

use crate::query::{QueryCache, QueryKey};

use super::api::DataAccess;
use super::queries::PostsQuery;
use super::types::{Page, Post};

/// Primes the cache with the page after the one being viewed.
pub struct PrefetchScheduler<A> {
  api: A,
  max_page: Page,
  stale_after: Duration,
}

impl<A: DataAccess> PrefetchScheduler<A> {
  pub fn new(api: A, max_page: Page, stale_after: Duration) -> Self {
    Self {
      api,
      max_page,
      stale_after,
    }
  }

  /// Prefetch `page + 1` unless `page` is the last one.
  ///
  /// Returns the key that was handed to the cache. Repeated calls are cheap,
  /// the cache skips keys that are in flight or still fresh.
  pub fn on_page_change(
    &self,
    page: Page,
    cache: &mut QueryCache<Vec<Post>>,
  ) -> Option<QueryKey> {
    if page >= self.max_page {
      trace!(%page, "No page to prefetch");
      return None;
    }

    let query = PostsQuery::new(page.next());
    let key = query.key();
    cache.prefetch(&key, query.fetcher(&self.api), self.stale_after);
    Some(key)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::blog::fake::FakeApi;
  use crate::query::{CacheOptions, QueryStatus, RetryPolicy};

  const STALE: Duration = Duration::from_millis(2000);

  fn page(n: u32) -> Page {
    Page::new(n).unwrap()
  }

  fn cache() -> QueryCache<Vec<Post>> {
    QueryCache::new(CacheOptions {
      retry: RetryPolicy::none(),
      max_entries: None,
    })
  }

  #[tokio::test(start_paused = true)]
  async fn test_prefetches_next_page() {
    let api = FakeApi::new();
    let scheduler = PrefetchScheduler::new(api.clone(), page(10), STALE);
    let mut cache = cache();

    let key = scheduler.on_page_change(page(1), &mut cache);
    assert_eq!(key, Some(PostsQuery::new(page(2)).key()));

    tokio::time::sleep(Duration::from_millis(10)).await;
    cache.poll();

    let entry = cache.peek(&PostsQuery::new(page(2)).key()).unwrap();
    assert_eq!(entry.status(), QueryStatus::Success);
    assert_eq!(api.post_calls(page(2)), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn test_no_prefetch_at_max_page() {
    let api = FakeApi::new();
    let scheduler = PrefetchScheduler::new(api.clone(), page(10), STALE);
    let mut cache = cache();

    assert_eq!(scheduler.on_page_change(page(10), &mut cache), None);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(cache.is_empty());
    assert_eq!(api.post_calls(page(11)), 0);
  }

  #[tokio::test(start_paused = true)]
  async fn test_repeated_page_change_fetches_once() {
    let api = FakeApi::new();
    let scheduler = PrefetchScheduler::new(api.clone(), page(10), STALE);
    let mut cache = cache();

    scheduler.on_page_change(page(4), &mut cache);
    scheduler.on_page_change(page(4), &mut cache);
    tokio::time::sleep(Duration::from_millis(10)).await;
    cache.poll();
    scheduler.on_page_change(page(4), &mut cache);
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(api.post_calls(page(5)), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn test_prefetch_failure_stays_in_cache() {
    let api = FakeApi::new().fail_posts(page(3), "network down");
    let scheduler = PrefetchScheduler::new(api, page(10), STALE);
    let mut cache = cache();

    scheduler.on_page_change(page(2), &mut cache);
    tokio::time::sleep(Duration::from_millis(10)).await;
    cache.poll();

    let entry = cache.peek(&PostsQuery::new(page(3)).key()).unwrap();
    assert_eq!(entry.status(), QueryStatus::Error);
  }
}
