//! Stable identifiers for diagram elements.
//!
//! Every element of the diagram model (services, zones, subnets, access points
//! and geometry nodes) is addressed by an [`Id`]. Nested elements use the
//! `parent::child` scheme so a renderer can bind visual elements back to the
//! hierarchy without re-deriving it.

use std::{fmt, sync::Arc};

use serde::{Serialize, Serializer};

/// Separator placed between the segments of a nested identifier.
pub const NESTING_SEPARATOR: &str = "::";

/// Cheaply clonable identifier for a diagram element.
///
/// Identifiers are immutable and shared through an [`Arc`], so cloning one
/// never copies the underlying string and values can cross thread
/// boundaries.
///
/// # Examples
///
/// ```
/// use tfgraph_core::identifier::Id;
///
/// let network = Id::new("network");
/// let zone = network.create_nested("zone");
/// assert_eq!(zone, "network::zone");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(Arc<str>);

impl Id {
    /// Creates an `Id` from a string slice.
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// Creates a nested ID by joining this ID and `child` with `::`.
    pub fn create_nested(&self, child: &str) -> Self {
        Self(Arc::from(format!("{}{NESTING_SEPARATOR}{child}", self.0)))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last segment of a nested identifier.
    pub fn leaf(&self) -> &str {
        self.as_str()
            .rsplit(NESTING_SEPARATOR)
            .next()
            .unwrap_or(self.as_str())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Id {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_new() {
        let id1 = Id::new("aws_vpc.main");
        let id2 = Id::new("aws_vpc.main");
        let id3 = Id::new("aws_subnet.a");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1, "aws_vpc.main");
    }

    #[test]
    fn test_create_nested() {
        let parent = Id::new("network");
        let nested1 = parent.create_nested("zone");
        let nested2 = parent.create_nested("endpoint");

        assert_ne!(nested1, nested2);
        assert_eq!(nested1, "network::zone");
        assert_eq!(nested2, "network::endpoint");
    }

    #[test]
    fn test_deep_nesting() {
        let id = Id::new("canvas")
            .create_nested("network")
            .create_nested("zone")
            .create_nested("us-east-1a");

        assert_eq!(id, "canvas::network::zone::us-east-1a");
        assert_eq!(id.leaf(), "us-east-1a");
    }

    #[test]
    fn test_leaf_of_flat_id() {
        assert_eq!(Id::new("canvas").leaf(), "canvas");
    }

    #[test]
    fn test_display_trait() {
        let id = Id::new("service::alb");
        assert_eq!(format!("{id}"), "service::alb");
    }

    #[test]
    fn test_from_traits() {
        let id1: Id = "s3".into();
        let id2: Id = String::from("s3").into();

        assert_eq!(id1, id2);
        assert_eq!(id1.as_str(), "s3");
    }

    #[test]
    fn test_hash_and_eq() {
        let mut map = HashMap::new();
        map.insert(Id::new("key1"), "value1");
        map.insert(Id::new("key2"), "value2");

        assert_eq!(map.get(&Id::new("key1")), Some(&"value1"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut ids = vec![Id::new("zone-c"), Id::new("zone-a"), Id::new("zone-b")];
        ids.sort();
        assert_eq!(ids, vec!["zone-a", "zone-b", "zone-c"]);
    }
}
