//! Path evaluation, decision policies, and scenario orchestration for the
//! evacuation simulation.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `evac-config.yaml` into
//!   strongly-typed structs.
//! - [`evaluator`] -- [`PathEvaluator`], the step-by-step mission replay
//!   against the hidden true state.
//! - [`policy`] -- [`EvacuationPolicy`] trait, [`ShortestPathPolicy`]
//!   baseline, and [`FixedPlanPolicy`].
//! - [`scenario`] -- [`ScenarioRunner`]: generate, plan, and score one
//!   scenario into a [`ScenarioReport`].
//!
//! [`PathEvaluator`]: evaluator::PathEvaluator
//! [`EvacuationPolicy`]: policy::EvacuationPolicy
//! [`ShortestPathPolicy`]: policy::ShortestPathPolicy
//! [`FixedPlanPolicy`]: policy::FixedPlanPolicy
//! [`ScenarioRunner`]: scenario::ScenarioRunner
//! [`ScenarioReport`]: scenario::ScenarioReport

pub mod config;
pub mod evaluator;
pub mod policy;
pub mod scenario;
