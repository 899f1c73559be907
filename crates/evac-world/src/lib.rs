//! City synthesis, hidden hazards, and proxy observations for the
//! evacuation simulation.
//!
//! This crate builds everything a scenario needs before a plan is scored:
//! the spatial city graph, the hidden ground truth of hazards, and the noisy
//! indicators a decision policy is allowed to see.
//!
//! # Modules
//!
//! - [`city`] -- The undirected weighted [`CityGraph`] with shortest-path
//!   and hop-distance queries.
//! - [`city_gen`] -- [`CityGenerator`]: random placement, 3-nearest-neighbor
//!   wiring, start/extraction selection, and the resource budget.
//! - [`error`] -- Error types for graph construction and generation.
//! - [`hazards`] -- The hidden [`TrueState`] and its [`TrueStateGenerator`]
//!   (blockages, zombie hordes, radiation diffusion).
//! - [`metrics`] -- [`StructuralMetrics`]: betweenness, clustering, and
//!   neighborhood structure computed once per city.
//! - [`proxy`] -- [`ProxyData`] and the [`ProxyGenerator`] that derives it.
//! - [`sampling`] -- Seeded random streams and noise helpers.
//!
//! # Capability boundary
//!
//! [`TrueState`] and [`ProxyData`] are unrelated types. Decision policies
//! receive a [`CityGraph`] and a [`ProxyData`] and have no way to reach the
//! ground truth.

pub mod city;
pub mod city_gen;
pub mod error;
pub mod hazards;
pub mod metrics;
pub mod proxy;
pub mod sampling;

// Re-export primary types at crate root.
pub use city::CityGraph;
pub use city_gen::{CityGenerator, GeneratedCity};
pub use error::WorldError;
pub use hazards::{TrueState, TrueStateGenerator};
pub use metrics::StructuralMetrics;
pub use proxy::{ProxyData, ProxyGenerator};
pub use sampling::{ScenarioRng, add_noise, clamp01, derive_seed, seeded_rng};
