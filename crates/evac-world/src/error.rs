//! Error types for the `evac-world` crate.
//!
//! These cover structurally invalid input only. Hazards, failed clears, and
//! unreachable targets are simulation outcomes and never show up here.

use evac_types::NodeId;

/// Errors that can occur while building or generating a city.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    /// City generation needs a start plus two extraction nodes.
    #[error("a city needs at least {minimum} nodes, got {requested}")]
    TooFewNodes {
        /// The requested node count.
        requested: usize,
        /// The smallest supported node count.
        minimum: usize,
    },

    /// A node was not found in the city graph.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// A node id was inserted twice.
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// An edge would connect a node to itself.
    #[error("self-loop on node {0}")]
    SelfLoop(NodeId),

    /// An edge weight was negative or not finite.
    #[error("invalid weight {weight} on edge {a}-{b}")]
    InvalidWeight {
        /// First endpoint.
        a: NodeId,
        /// Second endpoint.
        b: NodeId,
        /// The rejected weight.
        weight: f64,
    },

    /// The starting node cannot also be an extraction node.
    #[error("node {0} cannot be the starting node")]
    InvalidStartingNode(NodeId),

    /// The node is the start or already an extraction node.
    #[error("node {0} cannot be added as an extraction node")]
    InvalidExtractionNode(NodeId),

    /// Observation noise must be finite and non-negative.
    #[error("invalid noise level: {0}")]
    InvalidNoiseLevel(f64),
}
