//! Cache entry state and the read-only view handed to callers.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::error::FetchError;
use super::key::QueryKey;

/// Fetch status of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
  /// Never fetched
  Idle,
  /// A fetch is in flight (previous data, if any, is kept)
  Loading,
  /// Last fetch succeeded
  Success,
  /// Last fetch failed (previous data, if any, is kept)
  Error,
}

/// Identifies one fetch started for an entry.
pub(crate) type FetchId = u64;

/// A single cached query.
///
/// `status == Success` implies `data` and `fetched_at` are set;
/// `status == Error` implies `error` is set.
#[derive(Debug)]
pub struct CacheEntry<T> {
  key: QueryKey,
  pub(crate) data: Option<Arc<T>>,
  pub(crate) status: QueryStatus,
  pub(crate) error: Option<FetchError>,
  /// Monotonic time of the last successful fetch, used for staleness
  pub(crate) fetched_at: Option<Instant>,
  /// Wall-clock time of the last successful fetch, for display
  pub(crate) updated_at: Option<DateTime<Utc>>,
  pub(crate) stale_after: Duration,
  pub(crate) invalidated: bool,
  pub(crate) in_flight: Option<FetchId>,
}

impl<T> CacheEntry<T> {
  pub(crate) fn idle(key: QueryKey) -> Self {
    Self {
      key,
      data: None,
      status: QueryStatus::Idle,
      error: None,
      fetched_at: None,
      updated_at: None,
      stale_after: Duration::ZERO,
      invalidated: false,
      in_flight: None,
    }
  }

  pub fn key(&self) -> &QueryKey {
    &self.key
  }

  pub fn data(&self) -> Option<&Arc<T>> {
    self.data.as_ref()
  }

  pub fn status(&self) -> QueryStatus {
    self.status
  }

  pub fn error(&self) -> Option<&FetchError> {
    self.error.as_ref()
  }

  pub fn fetched_at(&self) -> Option<Instant> {
    self.fetched_at
  }

  pub fn updated_at(&self) -> Option<DateTime<Utc>> {
    self.updated_at
  }

  pub fn is_fetching(&self) -> bool {
    self.in_flight.is_some()
  }

  /// Whether the entry should be refetched on the next resolve.
  ///
  /// Entries that never succeeded or whose last fetch failed are always
  /// stale. A fetch in flight is never stale, the pending result will
  /// replace it.
  pub fn is_stale(&self, now: Instant) -> bool {
    if self.is_fetching() {
      return false;
    }
    if self.invalidated || self.status == QueryStatus::Error {
      return true;
    }
    match self.fetched_at {
      Some(at) => now.saturating_duration_since(at) > self.stale_after,
      None => true,
    }
  }

  pub(crate) fn begin_fetch(&mut self, id: FetchId) {
    self.status = QueryStatus::Loading;
    self.in_flight = Some(id);
  }

  pub(crate) fn settle(&mut self, result: Result<T, FetchError>) {
    self.in_flight = None;
    match result {
      Ok(data) => {
        self.data = Some(Arc::new(data));
        self.status = QueryStatus::Success;
        self.error = None;
        self.fetched_at = Some(Instant::now());
        self.updated_at = Some(Utc::now());
        self.invalidated = false;
      }
      Err(err) => {
        // Keep whatever data we had so the UI doesn't flicker to empty
        self.status = QueryStatus::Error;
        self.error = Some(err);
      }
    }
  }

  pub(crate) fn snapshot(&self, now: Instant) -> QueryResult<T> {
    QueryResult {
      data: self.data.clone(),
      status: self.status,
      error: self.error.clone(),
      is_stale: self.data.is_some() && self.is_stale(now),
      updated_at: self.updated_at,
    }
  }
}

/// What a caller sees when it resolves or observes a query.
#[derive(Debug)]
pub struct QueryResult<T> {
  pub data: Option<Arc<T>>,
  pub status: QueryStatus,
  pub error: Option<FetchError>,
  /// Data is present but older than the entry's stale time
  pub is_stale: bool,
  pub updated_at: Option<DateTime<Utc>>,
}

impl<T> QueryResult<T> {
  pub fn idle() -> Self {
    Self {
      data: None,
      status: QueryStatus::Idle,
      error: None,
      is_stale: false,
      updated_at: None,
    }
  }

  pub fn data(&self) -> Option<&T> {
    self.data.as_deref()
  }

  /// A fetch is in flight, possibly with previous data still available.
  pub fn is_loading(&self) -> bool {
    self.status == QueryStatus::Loading
  }

  /// Loading with nothing to show yet.
  pub fn is_pending(&self) -> bool {
    self.is_loading() && self.data.is_none()
  }

  pub fn is_success(&self) -> bool {
    self.status == QueryStatus::Success
  }

  pub fn is_error(&self) -> bool {
    self.status == QueryStatus::Error
  }

  pub fn error(&self) -> Option<&FetchError> {
    self.error.as_ref()
  }
}

// Derived Clone would require T: Clone, but data is behind an Arc.
impl<T> Clone for QueryResult<T> {
  fn clone(&self) -> Self {
    Self {
      data: self.data.clone(),
      status: self.status,
      error: self.error.clone(),
      is_stale: self.is_stale,
      updated_at: self.updated_at,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry() -> CacheEntry<u32> {
    CacheEntry::idle(QueryKey::new("numbers"))
  }

  #[tokio::test(start_paused = true)]
  async fn test_idle_entry_is_stale() {
    assert!(entry().is_stale(Instant::now()));
  }

  #[tokio::test(start_paused = true)]
  async fn test_success_sets_data_and_timestamp() {
    let mut e = entry();
    e.begin_fetch(1);
    assert_eq!(e.status(), QueryStatus::Loading);
    assert!(!e.is_stale(Instant::now()));

    e.settle(Ok(5));
    assert_eq!(e.status(), QueryStatus::Success);
    assert_eq!(e.data().map(|d| **d), Some(5));
    assert!(e.fetched_at().is_some());
    assert!(e.updated_at().is_some());
    assert!(!e.is_fetching());
  }

  #[tokio::test(start_paused = true)]
  async fn test_staleness_boundary_is_inclusive() {
    let mut e = entry();
    e.stale_after = Duration::from_millis(2000);
    e.begin_fetch(1);
    e.settle(Ok(1));

    tokio::time::advance(Duration::from_millis(2000)).await;
    assert!(!e.is_stale(Instant::now()));

    tokio::time::advance(Duration::from_millis(1)).await;
    assert!(e.is_stale(Instant::now()));
  }

  #[tokio::test(start_paused = true)]
  async fn test_error_keeps_previous_data() {
    let mut e = entry();
    e.begin_fetch(1);
    e.settle(Ok(9));
    e.begin_fetch(2);
    e.settle(Err(FetchError::request("boom")));

    assert_eq!(e.status(), QueryStatus::Error);
    assert_eq!(e.data().map(|d| **d), Some(9));
    assert_eq!(e.error(), Some(&FetchError::request("boom")));
  }

  #[tokio::test(start_paused = true)]
  async fn test_failed_refresh_is_stale_within_window() {
    let mut e = entry();
    e.stale_after = Duration::from_millis(2000);
    e.begin_fetch(1);
    e.settle(Ok(9));
    assert!(!e.is_stale(Instant::now()));

    e.begin_fetch(2);
    e.settle(Err(FetchError::request("boom")));
    assert!(e.is_stale(Instant::now()));

    e.begin_fetch(3);
    e.settle(Ok(10));
    assert!(!e.is_stale(Instant::now()));
  }

  #[tokio::test(start_paused = true)]
  async fn test_snapshot_flags() {
    let mut e = entry();
    e.begin_fetch(1);
    let loading = e.snapshot(Instant::now());
    assert!(loading.is_loading());
    assert!(loading.is_pending());
    assert!(!loading.is_stale);

    e.settle(Ok(3));
    let done = e.snapshot(Instant::now());
    assert!(done.is_success());
    assert!(!done.is_pending());
    assert_eq!(done.data(), Some(&3));
  }
}
