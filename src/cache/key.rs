//! Query keys: ordered tuples of primitive segments.

use std::fmt;

/// One segment of a query key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
  Str(String),
  Int(i64),
}

impl From<&str> for Segment {
  fn from(value: &str) -> Self {
    Segment::Str(value.to_string())
  }
}

impl From<String> for Segment {
  fn from(value: String) -> Self {
    Segment::Str(value)
  }
}

impl From<i64> for Segment {
  fn from(value: i64) -> Self {
    Segment::Int(value)
  }
}

impl From<u64> for Segment {
  fn from(value: u64) -> Self {
    Segment::Int(value as i64)
  }
}

impl From<u32> for Segment {
  fn from(value: u32) -> Self {
    Segment::Int(value as i64)
  }
}

impl fmt::Display for Segment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Segment::Str(s) => write!(f, "{}", s),
      Segment::Int(i) => write!(f, "{}", i),
    }
  }
}

/// Ordered tuple identifying one cached query result.
///
/// A key uniquely and deterministically identifies the query that populated
/// it. Invalidation operates on prefixes: a key matches a prefix if its
/// leading segments equal the prefix, so marking `["domains", "paginated"]`
/// stale covers every paginated domains query regardless of params.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<Segment>);

impl QueryKey {
  /// Start a key for the given resource name.
  pub fn root(resource: &str) -> Self {
    Self(vec![Segment::from(resource)])
  }

  /// Append a segment.
  pub fn push(mut self, segment: impl Into<Segment>) -> Self {
    self.0.push(segment.into());
    self
  }

  pub fn segments(&self) -> &[Segment] {
    &self.0
  }

  /// Whether this key's leading segments equal `prefix`.
  pub fn starts_with(&self, prefix: &[Segment]) -> bool {
    self.0.len() >= prefix.len() && self.0[..prefix.len()] == *prefix
  }
}

impl fmt::Display for QueryKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, segment) in self.0.iter().enumerate() {
      if i > 0 {
        write!(f, ":")?;
      }
      write!(f, "{}", segment)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn matches_own_segments_as_prefix() {
    let key = QueryKey::root("domains").push("detail").push(5u64);
    assert!(key.starts_with(key.segments()));
  }

  #[test]
  fn matches_leading_segments() {
    let key = QueryKey::root("domains").push("detail").push(5u64).push("records");
    assert!(key.starts_with(&[Segment::from("domains")]));
    assert!(key.starts_with(&[Segment::from("domains"), Segment::from("detail")]));
    assert!(key.starts_with(&[
      Segment::from("domains"),
      Segment::from("detail"),
      Segment::from(5u64)
    ]));
  }

  #[test]
  fn rejects_non_prefixes() {
    let key = QueryKey::root("domains").push("all");
    assert!(!key.starts_with(&[Segment::from("types")]));
    assert!(!key.starts_with(&[Segment::from("domains"), Segment::from("paginated")]));
    // A prefix longer than the key can never match
    assert!(!key.starts_with(&[
      Segment::from("domains"),
      Segment::from("all"),
      Segment::from(1u64)
    ]));
  }

  #[test]
  fn display_joins_segments() {
    let key = QueryKey::root("domains").push("detail").push(42u64);
    assert_eq!(key.to_string(), "domains:detail:42");
  }
}
