use tracing::debug;

use super::types::Page;

/// Owns the current page, kept within `1..=max_page`.
///
/// Moving past either end is a no-op rather than an error, the UI disables
/// the corresponding control instead.
#[derive(Debug, Clone)]
pub struct PaginationController {
  current: Page,
  max_page: Page,
}

impl PaginationController {
  pub fn new(max_page: Page) -> Self {
    Self {
      current: Page::FIRST,
      max_page,
    }
  }

  pub fn current(&self) -> Page {
    self.current
  }

  pub fn max_page(&self) -> Page {
    self.max_page
  }

  pub fn can_go_previous(&self) -> bool {
    self.current > Page::FIRST
  }

  pub fn can_go_next(&self) -> bool {
    self.current < self.max_page
  }

  /// Step back one page. Returns the new page, or `None` at the first page.
  pub fn previous(&mut self) -> Option<Page> {
    if !self.can_go_previous() {
      debug!(page = %self.current, "Already at first page");
      return None;
    }
    self.current = self.current.previous()?;
    Some(self.current)
  }

  /// Step forward one page. Returns the new page, or `None` at the last page.
  pub fn next(&mut self) -> Option<Page> {
    if !self.can_go_next() {
      debug!(page = %self.current, "Already at last page");
      return None;
    }
    self.current = self.current.next();
    Some(self.current)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn page(n: u32) -> Page {
    Page::new(n).unwrap()
  }

  #[test]
  fn test_starts_at_first_page() {
    let pagination = PaginationController::new(page(10));
    assert_eq!(pagination.current(), Page::FIRST);
    assert!(!pagination.can_go_previous());
    assert!(pagination.can_go_next());
  }

  #[test]
  fn test_previous_at_first_page_is_noop() {
    let mut pagination = PaginationController::new(page(10));
    assert_eq!(pagination.previous(), None);
    assert_eq!(pagination.current(), Page::FIRST);
  }

  #[test]
  fn test_next_at_max_page_is_noop() {
    let mut pagination = PaginationController::new(page(10));
    for expected in 2..=10 {
      assert_eq!(pagination.next(), Some(page(expected)));
    }
    assert!(!pagination.can_go_next());
    assert_eq!(pagination.next(), None);
    assert_eq!(pagination.current(), page(10));
  }

  #[test]
  fn test_next_then_previous() {
    let mut pagination = PaginationController::new(page(10));
    assert_eq!(pagination.next(), Some(page(2)));
    assert_eq!(pagination.previous(), Some(Page::FIRST));
  }

  #[test]
  fn test_single_page_disables_both() {
    let mut pagination = PaginationController::new(Page::FIRST);
    assert!(!pagination.can_go_previous());
    assert!(!pagination.can_go_next());
    assert_eq!(pagination.next(), None);
    assert_eq!(pagination.previous(), None);
  }
}
