//! Errors captured into cache entries and mutation state.

use thiserror::Error;

/// Failure of a single fetch or mutation.
///
/// Stored inside cache entries and shared by every reader of the entry, so
/// it is `Clone` and carries its cause as text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
  /// Transport failure or any other failure reported by the fetcher
  #[error("Error: {0}")]
  Request(String),
  /// The server answered with a non-success status
  #[error("Error: request to {url} failed with status {status}")]
  Status { status: u16, url: String },
  /// The response body could not be decoded
  #[error("Error: failed to decode response: {0}")]
  Decode(String),
  /// The fetch task ended without producing a result
  #[error("Error: fetch was cancelled")]
  Cancelled,
}

impl FetchError {
  pub fn request(message: impl Into<String>) -> Self {
    FetchError::Request(message.into())
  }
}

impl From<reqwest::Error> for FetchError {
  fn from(err: reqwest::Error) -> Self {
    if let Some(status) = err.status() {
      return FetchError::Status {
        status: status.as_u16(),
        url: err.url().map(|u| u.to_string()).unwrap_or_default(),
      };
    }
    if err.is_decode() {
      return FetchError::Decode(err.to_string());
    }
    FetchError::Request(err.to_string())
  }
}
