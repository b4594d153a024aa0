//! Keyed query cache with stale-while-revalidate semantics.

use lru::LruCache;
use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::entry::{CacheEntry, FetchId, QueryResult, QueryStatus};
use super::error::FetchError;
use super::key::QueryKey;
use super::retry::RetryPolicy;
use super::subscription::{QueryEvent, Subscription};

/// Tunables for a `QueryCache`.
#[derive(Debug, Clone, Copy)]
pub struct CacheOptions {
  pub retry: RetryPolicy,
  /// Upper bound on stored entries, `None` for unbounded
  pub max_entries: Option<NonZeroUsize>,
}

impl Default for CacheOptions {
  fn default() -> Self {
    Self {
      retry: RetryPolicy::default(),
      max_entries: NonZeroUsize::new(64),
    }
  }
}

/// Result of a spawned fetch, delivered back to the cache on `poll`.
struct Settled<T> {
  key: QueryKey,
  fetch_id: FetchId,
  result: Result<T, FetchError>,
}

/// Query cache keyed by `QueryKey`.
///
/// The cache lives on the UI task. Fetches run as spawned tokio tasks and
/// report back through a channel; `poll()` commits their results and
/// notifies subscribers. Callers never wait on the network: `resolve`
/// returns whatever is cached right now and starts a background fetch if
/// the entry is missing or stale.
pub struct QueryCache<T> {
  entries: LruCache<QueryKey, CacheEntry<T>>,
  max_entries: Option<NonZeroUsize>,
  retry: RetryPolicy,
  settled_tx: mpsc::UnboundedSender<Settled<T>>,
  settled_rx: mpsc::UnboundedReceiver<Settled<T>>,
  subscribers: HashMap<QueryKey, Vec<mpsc::UnboundedSender<QueryEvent>>>,
  next_fetch_id: FetchId,
}

impl<T: Send + Sync + 'static> QueryCache<T> {
  pub fn new(options: CacheOptions) -> Self {
    let (settled_tx, settled_rx) = mpsc::unbounded_channel();
    Self {
      entries: LruCache::unbounded(),
      max_entries: options.max_entries,
      retry: options.retry,
      settled_tx,
      settled_rx,
      subscribers: HashMap::new(),
      next_fetch_id: 0,
    }
  }

  /// Get the entry for `key`, creating an idle one if needed.
  pub fn get(&mut self, key: &QueryKey) -> &CacheEntry<T> {
    self.entry_mut(key)
  }

  /// Look at an entry without creating it or touching its recency.
  pub fn peek(&self, key: &QueryKey) -> Option<&CacheEntry<T>> {
    self.entries.peek(key)
  }

  /// Current view of `key` without starting a fetch.
  pub fn snapshot(&self, key: &QueryKey) -> QueryResult<T> {
    self
      .entries
      .peek(key)
      .map(|entry| entry.snapshot(Instant::now()))
      .unwrap_or_else(QueryResult::idle)
  }

  /// Return the cached state of `key`, fetching in the background when the
  /// entry is idle or older than `stale_after`.
  ///
  /// While a fetch for `key` is in flight no second fetch is started; every
  /// caller observes the same pending result.
  pub fn resolve<F, Fut>(
    &mut self,
    key: &QueryKey,
    fetcher: F,
    stale_after: Duration,
  ) -> QueryResult<T>
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
  {
    self.ensure_fresh(key, fetcher, stale_after);
    self.snapshot(key)
  }

  /// Seed the cache for a future `resolve`. Failures end up in the entry.
  pub fn prefetch<F, Fut>(&mut self, key: &QueryKey, fetcher: F, stale_after: Duration)
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
  {
    if self.ensure_fresh(key, fetcher, stale_after) {
      debug!(%key, "Prefetching");
    }
  }

  /// Start a fetch regardless of staleness.
  ///
  /// A fetch already in flight for `key` is superseded: its result is
  /// dropped when it arrives.
  pub fn refetch<F, Fut>(&mut self, key: &QueryKey, fetcher: F)
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
  {
    self.entry_mut(key);
    self.start_fetch(key, fetcher);
  }

  /// Mark `key` stale so the next resolve refetches it.
  ///
  /// Returns false if the key isn't cached.
  pub fn invalidate(&mut self, key: &QueryKey) -> bool {
    match self.entries.peek_mut(key) {
      Some(entry) => {
        entry.invalidated = true;
        true
      }
      None => false,
    }
  }

  pub fn remove(&mut self, key: &QueryKey) -> bool {
    self.entries.pop(key).is_some()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Watch `key` for status changes.
  pub fn subscribe(&mut self, key: &QueryKey) -> Subscription {
    let (tx, rx) = mpsc::unbounded_channel();
    self.subscribers.entry(key.clone()).or_default().push(tx);
    Subscription::new(key.clone(), rx)
  }

  /// Commit settled fetches and notify subscribers.
  ///
  /// Returns the keys whose entries changed. Call this from the event loop
  /// tick.
  pub fn poll(&mut self) -> Vec<QueryKey> {
    let mut changed = Vec::new();

    while let Ok(Settled {
      key,
      fetch_id,
      result,
    }) = self.settled_rx.try_recv()
    {
      let Some(entry) = self.entries.peek_mut(&key) else {
        debug!(%key, "Dropping result for evicted query");
        continue;
      };
      if entry.in_flight != Some(fetch_id) {
        debug!(%key, fetch_id, "Dropping superseded fetch result");
        continue;
      }

      match &result {
        Ok(_) => debug!(%key, fetch_id, "Fetch succeeded"),
        Err(err) => warn!(%key, fetch_id, error = %err, "Fetch failed"),
      }
      entry.settle(result);
      let status = entry.status();

      self.notify(&key, status);
      changed.push(key);
    }

    changed
  }

  /// Start a fetch if the entry is idle or stale. Returns whether one started.
  fn ensure_fresh<F, Fut>(&mut self, key: &QueryKey, fetcher: F, stale_after: Duration) -> bool
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
  {
    let now = Instant::now();
    let entry = self.entry_mut(key);
    entry.stale_after = stale_after;

    if entry.is_fetching() {
      debug!(%key, "Joining in-flight fetch");
      return false;
    }
    if !entry.is_stale(now) {
      debug!(%key, "Cache hit");
      return false;
    }

    self.start_fetch(key, fetcher);
    true
  }

  fn start_fetch<F, Fut>(&mut self, key: &QueryKey, fetcher: F)
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
  {
    self.next_fetch_id += 1;
    let fetch_id = self.next_fetch_id;

    if let Some(entry) = self.entries.peek_mut(key) {
      entry.begin_fetch(fetch_id);
    }
    debug!(%key, fetch_id, "Starting fetch");
    self.notify(key, QueryStatus::Loading);

    let tx = self.settled_tx.clone();
    let retry = self.retry;
    let key = key.clone();

    tokio::spawn(async move {
      let task_key = key.clone();
      let task = tokio::spawn(async move { retry.run(&task_key, &fetcher).await });

      // A panicking fetcher must still settle the entry, or it stays Loading forever
      let result = match task.await {
        Ok(result) => result,
        Err(err) => {
          warn!(%key, error = %err, "Fetch task aborted");
          Err(FetchError::Cancelled)
        }
      };

      // The receiver only goes away together with the cache
      let _ = tx.send(Settled {
        key,
        fetch_id,
        result,
      });
    });
  }

  fn entry_mut(&mut self, key: &QueryKey) -> &mut CacheEntry<T> {
    if !self.entries.contains(key) {
      self.entries.put(key.clone(), CacheEntry::idle(key.clone()));
      self.enforce_capacity(key);
    }
    self
      .entries
      .get_or_insert_mut(key.clone(), || CacheEntry::idle(key.clone()))
  }

  /// Evict least recently used entries until within `max_entries`.
  ///
  /// Entries with a fetch in flight or a live subscriber are never evicted,
  /// and neither is `keep`.
  fn enforce_capacity(&mut self, keep: &QueryKey) {
    let Some(max) = self.max_entries else {
      return;
    };

    while self.entries.len() > max.get() {
      let victim = self
        .entries
        .iter()
        .rev()
        .map(|(_, entry)| entry)
        .find(|entry| {
          entry.key() != keep
            && !entry.is_fetching()
            && !has_live_subscriber(&self.subscribers, entry.key())
        })
        .map(|entry| entry.key().clone());

      match victim {
        Some(key) => {
          debug!(%key, "Evicting query");
          self.entries.pop(&key);
          self.subscribers.remove(&key);
        }
        None => break,
      }
    }
  }

  fn notify(&mut self, key: &QueryKey, status: QueryStatus) {
    let Some(subscribers) = self.subscribers.get_mut(key) else {
      return;
    };
    subscribers.retain(|tx| {
      tx.send(QueryEvent {
        key: key.clone(),
        status,
      })
      .is_ok()
    });
    if subscribers.is_empty() {
      self.subscribers.remove(key);
    }
  }
}

fn has_live_subscriber(
  subscribers: &HashMap<QueryKey, Vec<mpsc::UnboundedSender<QueryEvent>>>,
  key: &QueryKey,
) -> bool {
  subscribers
    .get(key)
    .is_some_and(|subs| subs.iter().any(|tx| !tx.is_closed()))
}
