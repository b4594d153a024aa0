//! Fire-and-track async mutations.
//!
//! A `Mutation` wraps a write operation (delete, update, ...) and tracks its
//! state so the UI can show progress. Unlike queries, mutations have no key,
//! are never cached and never retried.
//!
//! # Example
//!
//! ```ignore
//! let api = api.clone();
//! let mut delete = Mutation::new(move |id: PostId| {
//!     let api = api.clone();
//!     async move { api.delete_post(id).await }
//! });
//!
//! delete.mutate(post.id);
//!
//! // In event loop tick
//! if delete.poll() {
//!     // State changed, trigger re-render
//! }
//! ```

use futures::future::BoxFuture;
use std::future::Future;
use tokio::sync::mpsc;

use super::error::FetchError;

/// The state of a mutation
#[derive(Debug, Clone, PartialEq)]
pub enum MutationState<T> {
  /// Not started, or reset
  Idle,
  /// Request in flight
  Pending,
  /// Completed successfully
  Success(T),
  /// Failed with an error
  Error(FetchError),
}

impl<T> MutationState<T> {
  pub fn is_idle(&self) -> bool {
    matches!(self, MutationState::Idle)
  }

  pub fn is_pending(&self) -> bool {
    matches!(self, MutationState::Pending)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, MutationState::Success(_))
  }

  pub fn is_error(&self) -> bool {
    matches!(self, MutationState::Error(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      MutationState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&FetchError> {
    match self {
      MutationState::Error(e) => Some(e),
      _ => None,
    }
  }
}

type MutateFn<A, T> = Box<dyn Fn(A) -> BoxFuture<'static, Result<T, FetchError>> + Send + Sync>;

/// Async mutation with state tracking.
pub struct Mutation<A, T> {
  state: MutationState<T>,
  mutate_fn: MutateFn<A, T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, FetchError>>>,
}

impl<A, T: Send + 'static> Mutation<A, T> {
  pub fn new<F, Fut>(mutate_fn: F) -> Self
  where
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
  {
    Self {
      state: MutationState::Idle,
      mutate_fn: Box::new(move |arg| -> BoxFuture<'static, Result<T, FetchError>> {
        Box::pin(mutate_fn(arg))
      }),
      receiver: None,
    }
  }

  pub fn state(&self) -> &MutationState<T> {
    &self.state
  }

  /// Run the mutation with `arg`.
  ///
  /// Calling this while a previous call is pending replaces it; the earlier
  /// result is ignored.
  pub fn mutate(&mut self, arg: A) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = MutationState::Pending;

    let future = (self.mutate_fn)(arg);
    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - receiver may have been reset
      let _ = tx.send(result);
    });
  }

  /// Forget the current state and any pending result.
  pub fn reset(&mut self) {
    self.receiver = None;
    self.state = MutationState::Idle;
  }

  /// Poll for the result of a pending mutation.
  ///
  /// Returns `true` if the state changed.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = MutationState::Success(data);
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.state = MutationState::Error(error);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Task ended without sending (panicked)
        self.state = MutationState::Error(FetchError::Cancelled);
        self.receiver = None;
        true
      }
    }
  }
}

impl<A, T: std::fmt::Debug> std::fmt::Debug for Mutation<A, T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Mutation")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}
