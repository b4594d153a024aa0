//! Query identity.
//!
//! A `QueryKey` is an ordered tuple of a resource name followed by the
//! discriminator values the fetcher depends on. Two keys are equal only when
//! every element matches in order, so `["posts", 1]` and `["posts", 2]` are
//! separate cache entries.

use std::fmt;

/// A single discriminator value inside a query key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
  Int(i64),
  Str(String),
  Bool(bool),
}

impl fmt::Display for KeyPart {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      KeyPart::Int(n) => write!(f, "{}", n),
      KeyPart::Str(s) => write!(f, "{:?}", s),
      KeyPart::Bool(b) => write!(f, "{}", b),
    }
  }
}

impl From<i64> for KeyPart {
  fn from(value: i64) -> Self {
    KeyPart::Int(value)
  }
}

impl From<u32> for KeyPart {
  fn from(value: u32) -> Self {
    KeyPart::Int(i64::from(value))
  }
}

impl From<u64> for KeyPart {
  fn from(value: u64) -> Self {
    // Ids beyond i64::MAX don't occur in practice; saturate rather than wrap
    KeyPart::Int(i64::try_from(value).unwrap_or(i64::MAX))
  }
}

impl From<bool> for KeyPart {
  fn from(value: bool) -> Self {
    KeyPart::Bool(value)
  }
}

impl From<&str> for KeyPart {
  fn from(value: &str) -> Self {
    KeyPart::Str(value.to_string())
  }
}

impl From<String> for KeyPart {
  fn from(value: String) -> Self {
    KeyPart::Str(value)
  }
}

/// Identity of a cached query.
///
/// Build keys through the typed query builders rather than by hand so that
/// every value a fetcher closes over ends up in the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
  resource: &'static str,
  parts: Vec<KeyPart>,
}

impl QueryKey {
  /// Start a key for the given resource with no discriminators.
  pub fn new(resource: &'static str) -> Self {
    Self {
      resource,
      parts: Vec::new(),
    }
  }

  /// Append a discriminator.
  pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
    self.parts.push(part.into());
    self
  }
}

impl fmt::Display for QueryKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{:?}", self.resource)?;
    for part in &self.parts {
      write!(f, ", {}", part)?;
    }
    write!(f, "]")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_keys_compare_all_parts_in_order() {
    let a = QueryKey::new("posts").with(1u32);
    let b = QueryKey::new("posts").with(1u32);
    let c = QueryKey::new("posts").with(2u32);
    let d = QueryKey::new("comments").with(1u32);

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);
  }

  #[test]
  fn test_part_order_matters() {
    let a = QueryKey::new("search").with("rust").with(1u32);
    let b = QueryKey::new("search").with(1u32).with("rust");
    assert_ne!(a, b);
  }

  #[test]
  fn test_integer_widths_share_identity() {
    assert_eq!(
      QueryKey::new("posts").with(3u32),
      QueryKey::new("posts").with(3u64)
    );
  }

  #[test]
  fn test_display_reads_like_a_tuple() {
    let key = QueryKey::new("comments").with(7u64).with("new").with(true);
    assert_eq!(key.to_string(), r#"["comments", 7, "new", true]"#);
    assert_eq!(QueryKey::new("posts").to_string(), r#"["posts"]"#);
  }
}
