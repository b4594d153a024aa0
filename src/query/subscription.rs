use tokio::sync::mpsc;

use super::entry::QueryStatus;
use super::key::QueryKey;

/// Notification that a watched entry changed status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEvent {
  pub key: QueryKey,
  pub status: QueryStatus,
}

/// Receives events for a single query key.
///
/// Dropping the subscription unregisters it on the cache's next notify.
#[derive(Debug)]
pub struct Subscription {
  key: QueryKey,
  rx: mpsc::UnboundedReceiver<QueryEvent>,
}

impl Subscription {
  pub(crate) fn new(key: QueryKey, rx: mpsc::UnboundedReceiver<QueryEvent>) -> Self {
    Self { key, rx }
  }

  pub fn key(&self) -> &QueryKey {
    &self.key
  }

  /// Drain pending events without blocking, returning the latest one.
  pub fn try_latest(&mut self) -> Option<QueryEvent> {
    let mut latest = None;
    while let Ok(event) = self.rx.try_recv() {
      latest = Some(event);
    }
    latest
  }
}
