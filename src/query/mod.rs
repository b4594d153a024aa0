//! Client-side query caching.
//!
//! Inspired by TanStack Query:
//! - `QueryCache` maps a `QueryKey` to cached data, fetch status and staleness
//! - resolving a key serves cached data immediately and refetches in the
//!   background when it is missing or stale
//! - at most one fetch per key is in flight, later callers join it
//! - `Mutation` tracks write operations that are not cached

mod cache;
mod entry;
mod error;
mod key;
mod mutation;
mod retry;
mod subscription;

pub use cache::{CacheOptions, QueryCache};
pub use entry::{QueryResult, QueryStatus};
pub use error::FetchError;
pub use key::{KeyPart, QueryKey};
pub use mutation::{Mutation, MutationState};
pub use retry::RetryPolicy;
pub use subscription::Subscription;
