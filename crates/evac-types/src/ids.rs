//! Type-safe identifiers for the city graph.
//!
//! Nodes are small integers assigned by the city generator. Edges are
//! undirected, so an [`EdgeKey`] always stores its endpoints in ascending
//! order: `EdgeKey::new(a, b) == EdgeKey::new(b, a)`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a node (intersection) in the city graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Canonical key of an undirected edge.
///
/// Serializes as the string `"low-high"` so it can key JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct EdgeKey {
    low: NodeId,
    high: NodeId,
}

impl EdgeKey {
    /// Build the key for the edge between `a` and `b`, in either order.
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// The endpoint with the smaller id.
    pub const fn low(self) -> NodeId {
        self.low
    }

    /// The endpoint with the larger id.
    pub const fn high(self) -> NodeId {
        self.high
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Error returned when a string is not of the form `"a-b"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid edge key: {input:?} (expected \"<node>-<node>\")")]
pub struct ParseEdgeKeyError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for EdgeKey {
    type Err = ParseEdgeKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseEdgeKeyError {
            input: s.to_owned(),
        };
        let (a, b) = s.split_once('-').ok_or_else(invalid)?;
        let a = a.trim().parse::<u32>().map_err(|_e| invalid())?;
        let b = b.trim().parse::<u32>().map_err(|_e| invalid())?;
        Ok(Self::new(NodeId(a), NodeId(b)))
    }
}

impl From<EdgeKey> for String {
    fn from(key: EdgeKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for EdgeKey {
    type Error = ParseEdgeKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
