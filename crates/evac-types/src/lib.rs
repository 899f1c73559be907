//! Shared type definitions for the evacuation simulation engine.
//!
//! This crate is the single source of truth for the plain data exchanged
//! between the generators, the path evaluator, and external decision
//! policies. It carries no randomness and no graph algorithms.
//!
//! # Modules
//!
//! - [`ids`] -- Node identifiers and unordered edge keys
//! - [`enums`] -- Resource kinds, failure reasons, budget classes, indicator names
//! - [`structs`] -- Resource ledgers, evacuation plans, events, simulation results

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{BudgetClass, EdgeIndicator, FailureReason, NodeIndicator, ResourceKind};
pub use ids::{EdgeKey, NodeId, ParseEdgeKeyError};
pub use structs::{
    EvacuationPlan, Position, ResourceAllocation, ResourceCounts, ResourceEfficiency,
    ResourceUsage, SimulationEvent, SimulationResult,
};
