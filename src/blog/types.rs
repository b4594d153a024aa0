use serde::{Deserialize, Serialize};
use std::fmt;

use crate::query::KeyPart;

/// Post identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<PostId> for KeyPart {
  fn from(id: PostId) -> Self {
    KeyPart::from(id.0)
  }
}

/// Blog post as returned by the list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
  pub id: PostId,
  pub user_id: u64,
  pub title: String,
  pub body: String,
}

/// Comment on a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  pub id: u64,
  pub post_id: PostId,
  pub name: String,
  pub email: String,
  pub body: String,
}

/// 1-based page number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Page(u32);

impl Page {
  pub const FIRST: Page = Page(1);

  /// Returns `None` for 0.
  pub fn new(n: u32) -> Option<Self> {
    (n >= 1).then_some(Page(n))
  }

  pub fn get(self) -> u32 {
    self.0
  }

  pub fn next(self) -> Page {
    Page(self.0.saturating_add(1))
  }

  pub fn previous(self) -> Option<Page> {
    Page::new(self.0 - 1)
  }
}

impl fmt::Display for Page {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<Page> for KeyPart {
  fn from(page: Page) -> Self {
    KeyPart::from(page.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_page_rejects_zero() {
    assert_eq!(Page::new(0), None);
    assert_eq!(Page::new(1), Some(Page::FIRST));
  }

  #[test]
  fn test_page_steps() {
    let two = Page::new(2).unwrap();
    assert_eq!(two.next().get(), 3);
    assert_eq!(two.previous(), Some(Page::FIRST));
    assert_eq!(Page::FIRST.previous(), None);
  }

  #[test]
  fn test_post_deserializes_camel_case() {
    let json = r#"{"userId": 1, "id": 3, "title": "ea molestias", "body": "et iusto"}"#;
    let post: Post = serde_json::from_str(json).unwrap();
    assert_eq!(post.id, PostId(3));
    assert_eq!(post.user_id, 1);
    assert_eq!(post.title, "ea molestias");
  }

  #[test]
  fn test_comment_deserializes_camel_case() {
    let json = r#"{
      "postId": 1,
      "id": 2,
      "name": "quo vero",
      "email": "Jayne_Kuhic@sydney.com",
      "body": "est natus"
    }"#;
    let comment: Comment = serde_json::from_str(json).unwrap();
    assert_eq!(comment.post_id, PostId(1));
    assert_eq!(comment.email, "Jayne_Kuhic@sydney.com");
  }
}
