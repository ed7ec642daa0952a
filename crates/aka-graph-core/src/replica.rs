//! [`ReplicatedNode`] — a `(url, replica)` pair and its canonical string form.
//!
//! Every record implicitly instantiates one `ReplicatedNode` per configured
//! replica. The canonical form `"{replica}://{url}"` is the key under which
//! the node's [`crate::store::UnionEdgeRow`] is persisted.
use std::fmt;

/// A logical pair `(url, replica_index)`, one of the `K` Monte-Carlo copies
/// of a record's identity.
///
/// Equality is by canonical form: two `ReplicatedNode`s are equal iff they
/// share both `url` and `replica`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReplicatedNode {
    /// The record's opaque unique identifier.
    pub url: String,
    /// Which of the `K` replicas this node belongs to.
    pub replica: usize,
}

impl ReplicatedNode {
    /// Constructs a `ReplicatedNode` for `url` in the given `replica`.
    #[must_use]
    pub fn new(url: impl Into<String>, replica: usize) -> Self {
        Self {
            url: url.into(),
            replica,
        }
    }

    /// Returns the canonical string form, `"{replica}://{url}"`.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!("{}://{}", self.replica, self.url)
    }

    /// Parses a canonical string form back into a `ReplicatedNode`.
    ///
    /// The replica is recovered as the substring before the first `:`; the
    /// remainder must start with `//` followed by the original URL. Returns
    /// `None` if the string is not well-formed (missing `://`, or the
    /// replica segment is not a valid `usize`).
    #[must_use]
    pub fn parse(canonical: &str) -> Option<Self> {
        let (replica_str, rest) = canonical.split_once("://")?;
        let replica = replica_str.parse::<usize>().ok()?;
        Some(Self {
            url: rest.to_owned(),
            replica,
        })
    }
}

impl fmt::Display for ReplicatedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn canonical_form_matches_spec_shape() {
        let node = ReplicatedNode::new("https://example.com/a", 3);
        assert_eq!(node.canonical(), "3://https://example.com/a");
    }

    #[test]
    fn parse_round_trips() {
        let node = ReplicatedNode::new("user-123", 7);
        let parsed = ReplicatedNode::parse(&node.canonical()).expect("should parse");
        assert_eq!(parsed, node);
    }

    #[test]
    fn parse_rejects_missing_scheme_separator() {
        assert!(ReplicatedNode::parse("not-a-canonical-form").is_none());
    }

    #[test]
    fn parse_rejects_non_numeric_replica() {
        assert!(ReplicatedNode::parse("abc://url").is_none());
    }

    #[test]
    fn equality_requires_both_url_and_replica() {
        let a = ReplicatedNode::new("x", 0);
        let b = ReplicatedNode::new("x", 1);
        let c = ReplicatedNode::new("y", 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, ReplicatedNode::new("x", 0));
    }
}
