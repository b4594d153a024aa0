//! The blog domain: posts, comments, and the controllers that page through
//! them on top of the query cache.

mod api;
mod client;
#[cfg(test)]
pub mod fake;
mod pagination;
mod prefetch;
mod queries;
mod selection;
mod session;
mod types;

pub use api::DataAccess;
pub use client::BlogClient;
pub use session::{BlogSession, SessionSettings};
pub use types::{Comment, Page, Post};
