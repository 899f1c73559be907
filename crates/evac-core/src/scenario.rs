//! End-to-end scenario pipeline.
//!
//! [`ScenarioRunner`] owns one instance of each component, every one seeded
//! from its own stream derived from the scenario seed:
//!
//! 1. generate the city and its budget,
//! 2. generate the hidden true state,
//! 3. derive the proxy observations,
//! 4. ask the policy for a plan (city and proxy only),
//! 5. score the plan against the true state.
//!
//! The resulting [`ScenarioReport`] carries everything a downstream consumer
//! needs except the true state, which never leaves this module.

use chrono::{DateTime, Utc};
use evac_types::{BudgetClass, EvacuationPlan, FailureReason, SimulationResult};
use evac_world::{
    CityGenerator, CityGraph, ProxyData, ProxyGenerator, TrueStateGenerator, WorldError,
    derive_seed,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::{EvaluatorConfig, SimulationConfig};
use crate::evaluator::{EvaluationError, PathEvaluator};
use crate::policy::{EvacuationPolicy, PolicyError};

/// Stream id for city generation.
pub const CITY_STREAM: u64 = 1;
/// Stream id for hazard generation.
pub const HAZARD_STREAM: u64 = 2;
/// Stream id for proxy noise.
pub const PROXY_STREAM: u64 = 3;
/// Stream id for mission rolls.
pub const EVALUATOR_STREAM: u64 = 4;

/// Errors that can occur while running a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// City or proxy generation rejected its input.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The policy could not produce a plan.
    #[error("policy error: {source}")]
    Policy {
        /// The underlying policy error.
        #[from]
        source: PolicyError,
    },

    /// The plan was structurally invalid.
    #[error("evaluation error: {source}")]
    Evaluation {
        /// The underlying evaluation error.
        #[from]
        source: EvaluationError,
    },
}

/// Everything produced by one scenario, minus the hidden true state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Unique id of this run.
    pub scenario_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Scenario seed the component streams were derived from.
    pub seed: u64,
    /// Requested city size.
    pub n_nodes: usize,
    /// Resource cap handed to the policy and enforced by the evaluator.
    pub max_resources: u32,
    /// Feasibility class of the budget.
    pub budget_class: BudgetClass,
    /// The generated city.
    pub city: CityGraph,
    /// The observations the policy saw.
    pub proxy: ProxyData,
    /// The policy's answer.
    pub plan: EvacuationPlan,
    /// The scored outcome.
    pub result: SimulationResult,
}

/// Runs the generate, plan, and score pipeline.
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    seed: u64,
    n_nodes: usize,
    cities: CityGenerator,
    hazards: TrueStateGenerator,
    observer: ProxyGenerator,
    evaluator: PathEvaluator,
}

impl ScenarioRunner {
    /// Build a runner from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::World`] if the noise level is invalid.
    pub fn new(config: &SimulationConfig) -> Result<Self, ScenarioError> {
        Self::with_seed(
            config.scenario.seed,
            config.scenario.n_nodes,
            config.proxy.noise_level,
            config.evaluator,
        )
    }

    /// Build a runner from explicit parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::World`] if the noise level is invalid.
    pub fn with_seed(
        seed: u64,
        n_nodes: usize,
        noise_level: f64,
        evaluator: EvaluatorConfig,
    ) -> Result<Self, ScenarioError> {
        Ok(Self {
            seed,
            n_nodes,
            cities: CityGenerator::new(derive_seed(seed, CITY_STREAM)),
            hazards: TrueStateGenerator::new(derive_seed(seed, HAZARD_STREAM)),
            observer: ProxyGenerator::new(noise_level, derive_seed(seed, PROXY_STREAM))?,
            evaluator: PathEvaluator::new(derive_seed(seed, EVALUATOR_STREAM), evaluator),
        })
    }

    /// The scenario seed.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate one scenario, ask `policy` for a plan, and score it.
    ///
    /// Repeated calls continue each component's stream, so every call
    /// yields a fresh scenario.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] if generation fails, the policy gives up,
    /// or the plan is structurally invalid.
    pub fn run(
        &mut self,
        policy: &mut dyn EvacuationPolicy,
    ) -> Result<ScenarioReport, ScenarioError> {
        let scenario_id = Uuid::now_v7();
        let started_at = Utc::now();

        info!(
            %scenario_id,
            seed = self.seed,
            n_nodes = self.n_nodes,
            noise_level = self.observer.noise_level(),
            "Scenario starting"
        );

        let generated = self.cities.generate(self.n_nodes)?;
        let truth = self.hazards.generate(&generated.city);
        let proxy = self.observer.generate(&generated.city, &truth);

        let plan = policy.plan_evacuation(&generated.city, &proxy, generated.max_resources)?;

        let result = self.evaluator.evaluate(
            &plan.path,
            &plan.resources,
            &generated.city,
            &truth,
            generated.max_resources,
        )?;

        info!(
            %scenario_id,
            success = result.success,
            failure_reason = ?result.failure_reason,
            short_of = ?result.failure_reason.and_then(FailureReason::resource),
            budget_class = ?generated.budget_class,
            max_resources = generated.max_resources,
            path_nodes = plan.path.len(),
            "Scenario complete"
        );

        Ok(ScenarioReport {
            scenario_id,
            started_at,
            seed: self.seed,
            n_nodes: self.n_nodes,
            max_resources: generated.max_resources,
            budget_class: generated.budget_class,
            city: generated.city,
            proxy,
            plan,
            result,
        })
    }
}
