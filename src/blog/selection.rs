use crate::query::QueryKey;

use super::queries::CommentsQuery;
use super::types::Post;

/// Tracks the post opened in the detail pane.
///
/// Independent of pagination: the selection survives page changes, and its
/// comments query is keyed by post id, not by page.
#[derive(Debug, Default)]
pub struct SelectionController {
  selected: Option<Post>,
}

impl SelectionController {
  pub fn new() -> Self {
    Self::default()
  }

  /// Open `post` and return the comments query scoped to it.
  pub fn select(&mut self, post: Post) -> CommentsQuery {
    let query = CommentsQuery::new(post.id);
    self.selected = Some(post);
    query
  }

  pub fn clear(&mut self) {
    self.selected = None;
  }

  pub fn selected(&self) -> Option<&Post> {
    self.selected.as_ref()
  }

  pub fn comments_query(&self) -> Option<CommentsQuery> {
    self.selected.as_ref().map(|post| CommentsQuery::new(post.id))
  }

  /// Whether `key` is the comments key of the current selection.
  pub fn is_current(&self, key: &QueryKey) -> bool {
    self
      .comments_query()
      .is_some_and(|query| query.key() == *key)
  }
}
