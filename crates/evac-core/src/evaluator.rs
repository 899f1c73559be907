//! Mission replay: scores a plan against the hidden true state.
//!
//! The [`PathEvaluator`] first checks that every consecutive pair of the
//! path is a street of the city. A plan that jumps between unconnected
//! nodes fails with [`FailureReason::NoPathExists`] before any hazard is
//! rolled. Otherwise it walks the path one node at a time and resolves, in
//! order:
//!
//! 1. radiation above [`RADIATION_THRESHOLD`] (one suit),
//! 2. a zombie horde above [`ZOMBIE_THRESHOLD`] (one round of ammo, which
//!    may fail to clear it),
//! 3. a blockage on the street to the next node (one explosive, which may
//!    fail to clear it),
//! 4. a random surprise encounter and a random radiation leak.
//!
//! The first unrecoverable event ends the mission. Mission failures are
//! ordinary [`SimulationResult`] values; only structurally invalid input
//! (an empty path, an unknown node) is an [`EvaluationError`].

use evac_types::{
    FailureReason, NodeId, ResourceAllocation, ResourceKind, ResourceUsage, SimulationEvent,
    SimulationResult,
};
use evac_world::{CityGraph, ScenarioRng, TrueState, clamp01, seeded_rng};
use rand::Rng;
use tracing::debug;

use crate::config::EvaluatorConfig;

/// Radiation above this level requires a suit.
pub const RADIATION_THRESHOLD: f64 = 0.35;

/// Zombie concentration above this level requires ammo.
pub const ZOMBIE_THRESHOLD: f64 = 0.45;

/// Extra travel time per encountered hazard, as a fraction of path length.
const DELAY_PER_OBSTACLE: f64 = 0.5;

/// Upper bound of the uniform travel-time jitter.
const MAX_TIME_JITTER: f64 = 0.2;

/// Structurally invalid evaluation input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    /// The plan contains no nodes.
    #[error("path is empty")]
    EmptyPath,

    /// The plan references a node the city does not have.
    #[error("path position {index} references unknown node {node}")]
    UnknownNode {
        /// The unknown node.
        node: NodeId,
        /// Its position in the path.
        index: usize,
    },
}

/// A terminal mission failure.
struct Failure {
    reason: FailureReason,
    message: String,
}

impl Failure {
    fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

/// Running ledger and trace of one mission.
struct Mission {
    usage: ResourceUsage,
    events: Vec<SimulationEvent>,
}

impl Mission {
    fn new(allocation: ResourceAllocation) -> Self {
        Self {
            usage: ResourceUsage::new(allocation),
            events: Vec::new(),
        }
    }

    fn log(&mut self, step: usize, description: impl Into<String>) {
        self.events.push(SimulationEvent::new(step, description));
    }
}

/// A hazard that demands one unit of a resource.
struct Encounter {
    kind: ResourceKind,
    /// Event text when the hazard shows up.
    detected: String,
    /// Event text when the unit clears it.
    cleared: &'static str,
    /// Where it happened, appended to failure messages.
    location: String,
    /// Chance the spent unit fails, with the resulting reason and wording.
    misfire: Option<Misfire>,
}

struct Misfire {
    chance: f64,
    reason: FailureReason,
    text: &'static str,
}

/// Plain-language name of a resource kind for event text.
const fn noun(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Explosives => "explosives",
        ResourceKind::Ammo => "ammo",
        ResourceKind::RadiationSuits => "radiation suits",
    }
}

const fn out_of(kind: ResourceKind) -> FailureReason {
    match kind {
        ResourceKind::Explosives => FailureReason::OutOfExplosives,
        ResourceKind::Ammo => FailureReason::OutOfAmmo,
        ResourceKind::RadiationSuits => FailureReason::OutOfSuits,
    }
}

/// Seeded path evaluator. One instance owns one random stream.
#[derive(Debug, Clone)]
pub struct PathEvaluator {
    rng: ScenarioRng,
    config: EvaluatorConfig,
}

impl PathEvaluator {
    /// Create an evaluator. Chances outside `[0, 1]` are clamped.
    pub fn new(seed: u64, config: EvaluatorConfig) -> Self {
        let config = EvaluatorConfig {
            ammo_failure_chance: clamp01(config.ammo_failure_chance),
            explosives_failure_chance: clamp01(config.explosives_failure_chance),
            surprise_encounter_chance: clamp01(config.surprise_encounter_chance),
            radiation_leak_chance: clamp01(config.radiation_leak_chance),
        };
        Self {
            rng: seeded_rng(seed),
            config,
        }
    }

    /// The probabilities in effect.
    pub const fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Replay `path` carrying `resources` against `state`.
    ///
    /// Any allocation totalling more than `max_resources` fails at step 1
    /// and forfeits the whole kit.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::EmptyPath`] for an empty path and
    /// [`EvaluationError::UnknownNode`] if the path names a node outside
    /// `city`. Every other outcome, including failure, is `Ok`.
    pub fn evaluate(
        &mut self,
        path: &[NodeId],
        resources: &ResourceAllocation,
        city: &CityGraph,
        state: &TrueState,
        max_resources: u32,
    ) -> Result<SimulationResult, EvaluationError> {
        let (&first, &last) = path
            .first()
            .zip(path.last())
            .ok_or(EvaluationError::EmptyPath)?;
        if let Some((index, &node)) = path
            .iter()
            .enumerate()
            .find(|&(_, &node)| !city.contains_node(node))
        {
            return Err(EvaluationError::UnknownNode { node, index });
        }

        let mut mission = Mission::new(*resources);
        mission.log(0, format!("Mission started at node {first}"));

        let total = resources.total();
        let outcome = if total > u64::from(max_resources) {
            mission.log(
                1,
                "Mission failed: the team exceeded the allowed resources and was killed by the population for its greed",
            );
            mission.usage.forfeit_all();
            Err(Failure::new(
                FailureReason::BudgetExceeded,
                format!(
                    "Allocated {total} resources, exceeding the limit of {max_resources}; the team was killed for its greed at the start"
                ),
            ))
        } else {
            Self::check_streets(path, city, &mut mission)
                .and_then(|()| self.replay(path, state, &mut mission))
                .and_then(|()| Self::finish(path.len(), last, city, &mut mission))
        };

        let path_length: f64 = path
            .windows(2)
            .filter_map(|pair| match pair {
                [a, b] => city.edge_weight(*a, *b),
                _ => None,
            })
            .sum();
        let obstacles = mission.usage.total_needed();
        let jitter = self.rng.random_range(0.0..MAX_TIME_JITTER);
        let time_taken = path_length * (1.0 + DELAY_PER_OBSTACLE * obstacle_count(obstacles) + jitter);

        let (success, failure_reason, failure_message) = match outcome {
            Ok(()) => (true, None, None),
            Err(failure) => (false, Some(failure.reason), Some(failure.message)),
        };

        debug!(
            success,
            failure_reason = ?failure_reason,
            path_nodes = path.len(),
            obstacles,
            path_length,
            "evaluated plan"
        );

        Ok(SimulationResult {
            success,
            path_length,
            time_taken,
            obstacles_encountered: obstacles,
            efficiency: mission.usage.efficiency(),
            resources: mission.usage,
            failure_reason,
            failure_message,
            events: mission.events,
        })
    }

    /// Walk a street-checked path node by node until it ends or the team
    /// dies.
    fn replay(
        &mut self,
        path: &[NodeId],
        state: &TrueState,
        mission: &mut Mission,
    ) -> Result<(), Failure> {
        for (index, &node) in path.iter().enumerate() {
            let step = index.saturating_add(1);
            let next = path.get(step).copied();
            mission.log(step, format!("Arrived at node {node}"));

            let radiation = state.radiation(node);
            if radiation > RADIATION_THRESHOLD {
                self.resolve(
                    mission,
                    step,
                    Encounter {
                        kind: ResourceKind::RadiationSuits,
                        detected: format!("High radiation detected (level: {radiation:.2})"),
                        cleared: "Used radiation suit successfully",
                        location: format!("at node {node}"),
                        misfire: None,
                    },
                )?;
            }

            let zombies = state.zombies(node);
            if zombies > ZOMBIE_THRESHOLD {
                self.resolve(
                    mission,
                    step,
                    Encounter {
                        kind: ResourceKind::Ammo,
                        detected: format!("Zombie horde encountered (level: {zombies:.2})"),
                        cleared: "Used ammo successfully against zombies",
                        location: format!("at node {node}"),
                        misfire: Some(Misfire {
                            chance: self.config.ammo_failure_chance,
                            reason: FailureReason::AmmoFailedToClear,
                            text: "Ammo failed to clear zombies",
                        }),
                    },
                )?;
            }

            if let Some(next) = next.filter(|&next| state.is_blocked(node, next)) {
                self.resolve(
                    mission,
                    step,
                    Encounter {
                        kind: ResourceKind::Explosives,
                        detected: format!("Path blocked to node {next} (blockage detected)"),
                        cleared: "Used explosives successfully to clear path",
                        location: format!("at edge {node}-{next}"),
                        misfire: Some(Misfire {
                            chance: self.config.explosives_failure_chance,
                            reason: FailureReason::ExplosivesFailedToClear,
                            text: "Explosives failed to clear blockage",
                        }),
                    },
                )?;
            }

            if self.rng.random_bool(self.config.surprise_encounter_chance) {
                self.resolve(
                    mission,
                    step,
                    Encounter {
                        kind: ResourceKind::Ammo,
                        detected: String::from("Surprise zombie encounter!"),
                        cleared: "Successfully handled surprise zombie encounter",
                        location: format!("during surprise zombie encounter at node {node}"),
                        misfire: None,
                    },
                )?;
            }

            if self.rng.random_bool(self.config.radiation_leak_chance) {
                self.resolve(
                    mission,
                    step,
                    Encounter {
                        kind: ResourceKind::RadiationSuits,
                        detected: String::from("Unexpected radiation leak detected!"),
                        cleared: "Successfully protected against radiation leak",
                        location: format!("during radiation leak at node {node}"),
                        misfire: None,
                    },
                )?;
            }

            if let Some(next) = next {
                mission.log(step, format!("Moving to node {next}"));
            }
        }
        Ok(())
    }

    /// Fail on the first consecutive pair with no street between them.
    /// Runs before any hazard is rolled.
    fn check_streets(
        path: &[NodeId],
        city: &CityGraph,
        mission: &mut Mission,
    ) -> Result<(), Failure> {
        let missing = path
            .windows(2)
            .enumerate()
            .find_map(|(index, pair)| match pair {
                [a, b] if !city.has_edge(*a, *b) => Some((index, *a, *b)),
                _ => None,
            });
        let Some((index, node, next)) = missing else {
            return Ok(());
        };

        let step = index.saturating_add(1);
        mission.log(
            step,
            format!("TEAM DIED - No street connects node {node} to node {next}"),
        );
        mission.usage.forfeit_all();
        Err(Failure::new(
            FailureReason::NoPathExists,
            format!("No path exists between node {node} and node {next}: missing edge {node}-{next}"),
        ))
    }

    /// Spend one unit on `encounter`, or end the mission.
    fn resolve(
        &mut self,
        mission: &mut Mission,
        step: usize,
        encounter: Encounter,
    ) -> Result<(), Failure> {
        let kind = encounter.kind;
        mission.log(step, encounter.detected);
        mission.usage.needed.increment(kind);

        if !mission.usage.has_remaining(kind) {
            mission.log(step, format!("TEAM DIED - Ran out of {}", noun(kind)));
            return Err(Failure::new(
                out_of(kind),
                format!("Ran out of {} {}", noun(kind), encounter.location),
            ));
        }
        mission.usage.used.increment(kind);

        if let Some(misfire) = encounter
            .misfire
            .filter(|misfire| self.rng.random_bool(misfire.chance))
        {
            mission.log(step, format!("TEAM DIED - {}", misfire.text));
            return Err(Failure::new(
                misfire.reason,
                format!("{} {}", misfire.text, encounter.location),
            ));
        }

        mission.usage.effective_uses.increment(kind);
        mission.log(step, encounter.cleared);
        Ok(())
    }

    /// Success requires ending on an extraction node; otherwise the kit is
    /// lost in the field.
    fn finish(
        len: usize,
        last: NodeId,
        city: &CityGraph,
        mission: &mut Mission,
    ) -> Result<(), Failure> {
        if city.is_extraction(last) {
            mission.log(len, format!("Successfully reached extraction point at node {last}"));
            return Ok(());
        }
        mission.log(len, "FAILED - Path does not reach extraction point");
        mission.usage.forfeit_all();
        Err(Failure::new(
            FailureReason::DidNotReachExtraction,
            format!("Path ends at node {last}, which is not an extraction point"),
        ))
    }
}

/// Obstacle counts stay far below 2^52.
#[allow(clippy::cast_precision_loss)]
const fn obstacle_count(count: u64) -> f64 {
    count as f64
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use evac_types::{EdgeKey, Position, ResourceCounts};

    use super::*;

    fn node(id: u32) -> NodeId {
        NodeId(id)
    }

    /// Line 0-1-2-3 with unit streets; start 0, extraction 3.
    fn line_city() -> CityGraph {
        let mut city = CityGraph::new();
        for id in 0..4 {
            city.add_node(node(id), Position::new(f64::from(id), 0.0))
                .unwrap();
        }
        for id in 0..3 {
            city.connect(node(id), node(id + 1)).unwrap();
        }
        city.set_starting_node(node(0)).unwrap();
        city.add_extraction_node(node(3)).unwrap();
        city
    }

    fn calm() -> TrueState {
        TrueState::new([], BTreeMap::new(), BTreeMap::new())
    }

    fn evaluator() -> PathEvaluator {
        PathEvaluator::new(7, EvaluatorConfig::deterministic())
    }

    fn full_path() -> Vec<NodeId> {
        (0..4).map(node).collect()
    }

    #[test]
    fn empty_path_is_an_error() {
        let result = evaluator().evaluate(&[], &ResourceCounts::default(), &line_city(), &calm(), 5);
        assert_eq!(result, Err(EvaluationError::EmptyPath));
    }

    #[test]
    fn unknown_node_is_an_error() {
        let result = evaluator().evaluate(
            &[node(0), node(9)],
            &ResourceCounts::default(),
            &line_city(),
            &calm(),
            5,
        );
        assert_eq!(
            result,
            Err(EvaluationError::UnknownNode {
                node: node(9),
                index: 1
            })
        );
    }

    #[test]
    fn standing_on_extraction_succeeds() {
        let result = evaluator()
            .evaluate(&[node(3)], &ResourceCounts::default(), &line_city(), &calm(), 0)
            .unwrap();
        assert!(result.success);
        assert!(result.path_length.abs() < f64::EPSILON);
        assert_eq!(result.obstacles_encountered, 0);
        assert_eq!(result.failure_reason, None);
        assert_eq!(result.final_step(), Some(1));
    }

    #[test]
    fn calm_walk_succeeds() {
        let result = evaluator()
            .evaluate(&full_path(), &ResourceCounts::default(), &line_city(), &calm(), 0)
            .unwrap();
        assert!(result.success);
        assert!((result.path_length - 3.0).abs() < 1e-12);
        assert!(result.time_taken >= 3.0 && result.time_taken < 3.0 * 1.2);
        assert_eq!(result.events[0].description, "Mission started at node 0");
        assert_eq!(result.final_step(), Some(4));
    }

    #[test]
    fn greed_fails_at_step_one() {
        let allocation = ResourceCounts::new(1, 2, 1);
        let result = evaluator()
            .evaluate(&full_path(), &allocation, &line_city(), &calm(), 3)
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.failure_reason, Some(FailureReason::BudgetExceeded));
        assert!(result.failure_message.as_deref().unwrap().contains("exceeding the limit"));
        assert_eq!(result.final_step(), Some(1));
        assert_eq!(result.resources.used, allocation);
        assert_eq!(result.resources.effective_uses.total(), 0);
        assert_eq!(result.resources.needed.total(), 0);
    }

    #[test]
    fn exact_budget_is_allowed() {
        let allocation = ResourceCounts::new(1, 1, 1);
        let result = evaluator()
            .evaluate(&full_path(), &allocation, &line_city(), &calm(), 3)
            .unwrap();
        assert!(result.success);
        assert_eq!(result.resources.used.total(), 0);
    }

    #[test]
    fn missing_street_fails_and_adds_nothing() {
        let result = evaluator()
            .evaluate(
                &[node(0), node(1), node(3)],
                &ResourceCounts::new(0, 1, 0),
                &line_city(),
                &calm(),
                5,
            )
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.failure_reason, Some(FailureReason::NoPathExists));
        assert!(result.failure_message.as_deref().unwrap().contains("missing edge 1-3"));
        assert!((result.path_length - 1.0).abs() < 1e-12);
        assert_eq!(result.resources.used, result.resources.allocated);
        assert_eq!(result.final_step(), Some(2));
    }

    #[test]
    fn missing_street_wins_over_hazards_on_the_way() {
        let state = TrueState::new([], BTreeMap::new(), BTreeMap::from([(node(0), 0.9)]));
        let result = evaluator()
            .evaluate(
                &[node(0), node(1), node(3)],
                &ResourceCounts::default(),
                &line_city(),
                &state,
                5,
            )
            .unwrap();
        assert_eq!(result.failure_reason, Some(FailureReason::NoPathExists));
        assert_eq!(result.resources.total_needed(), 0);
        assert_eq!(result.obstacles_encountered, 0);
    }

    #[test]
    fn missing_street_ignores_random_encounters() {
        for seed in 0..200 {
            let result = PathEvaluator::new(seed, EvaluatorConfig::default())
                .evaluate(
                    &[node(0), node(1), node(3)],
                    &ResourceCounts::default(),
                    &line_city(),
                    &TrueState::default(),
                    5,
                )
                .unwrap();
            assert_eq!(
                result.failure_reason,
                Some(FailureReason::NoPathExists),
                "seed {seed}"
            );
        }
    }

    #[test]
    fn efficiency_is_reported_with_the_result() {
        let config = EvaluatorConfig {
            ammo_failure_chance: 1.0,
            ..EvaluatorConfig::deterministic()
        };
        let state = TrueState::new(
            [],
            BTreeMap::from([(node(1), 0.8)]),
            BTreeMap::from([(node(2), 0.9)]),
        );
        let result = PathEvaluator::new(1, config)
            .evaluate(&full_path(), &ResourceCounts::new(0, 1, 1), &line_city(), &state, 5)
            .unwrap();
        assert_eq!(result.failure_reason, Some(FailureReason::AmmoFailedToClear));
        assert_eq!(result.efficiency, result.resources.efficiency());
        assert!(result.efficiency.ammo.abs() < f64::EPSILON);

        let clean = evaluator()
            .evaluate(
                &full_path(),
                &ResourceCounts::new(0, 0, 1),
                &line_city(),
                &state_with_radiation(),
                5,
            )
            .unwrap();
        assert!((clean.efficiency.radiation_suits - 1.0).abs() < f64::EPSILON);
    }

    fn state_with_radiation() -> TrueState {
        TrueState::new([], BTreeMap::new(), BTreeMap::from([(node(2), 0.9)]))
    }

    #[test]
    fn radiation_consumes_suits() {
        let state = TrueState::new(
            [],
            BTreeMap::new(),
            BTreeMap::from([(node(1), 0.9), (node(2), 0.36), (node(3), 0.35)]),
        );
        let result = evaluator()
            .evaluate(&full_path(), &ResourceCounts::new(0, 0, 2), &line_city(), &state, 5)
            .unwrap();
        assert!(result.success);
        assert_eq!(result.resources.needed.radiation_suits, 2);
        assert_eq!(result.resources.effective_uses.radiation_suits, 2);
        assert_eq!(result.obstacles_encountered, 2);
        assert!(result.time_taken >= 3.0 * 2.0);
    }

    #[test]
    fn running_out_of_suits_stops_the_mission() {
        let state = TrueState::new(
            [],
            BTreeMap::new(),
            BTreeMap::from([(node(1), 0.9), (node(2), 0.9)]),
        );
        let result = evaluator()
            .evaluate(&full_path(), &ResourceCounts::new(0, 0, 1), &line_city(), &state, 5)
            .unwrap();
        assert_eq!(result.failure_reason, Some(FailureReason::OutOfSuits));
        assert_eq!(result.final_step(), Some(3));
        assert_eq!(result.resources.needed.radiation_suits, 2);
        assert_eq!(result.resources.used.radiation_suits, 1);
        assert!(result.failure_message.as_deref().unwrap().contains("at node 2"));
    }

    #[test]
    fn ammo_misfire_spends_the_round() {
        let config = EvaluatorConfig {
            ammo_failure_chance: 1.0,
            ..EvaluatorConfig::deterministic()
        };
        let state = TrueState::new([], BTreeMap::from([(node(2), 0.8)]), BTreeMap::new());
        let result = PathEvaluator::new(1, config)
            .evaluate(&full_path(), &ResourceCounts::new(0, 3, 0), &line_city(), &state, 5)
            .unwrap();
        assert_eq!(result.failure_reason, Some(FailureReason::AmmoFailedToClear));
        assert_eq!(result.resources.used.ammo, 1);
        assert_eq!(result.resources.effective_uses.ammo, 0);
        assert_eq!(result.final_step(), Some(3));
    }

    #[test]
    fn blockage_needs_explosives() {
        let state = TrueState::new(
            [EdgeKey::new(node(1), node(2))],
            BTreeMap::new(),
            BTreeMap::new(),
        );
        let without = evaluator()
            .evaluate(&full_path(), &ResourceCounts::default(), &line_city(), &state, 5)
            .unwrap();
        assert_eq!(without.failure_reason, Some(FailureReason::OutOfExplosives));
        assert!(without.failure_message.as_deref().unwrap().contains("edge 1-2"));

        let with = evaluator()
            .evaluate(&full_path(), &ResourceCounts::new(1, 0, 0), &line_city(), &state, 5)
            .unwrap();
        assert!(with.success);
        assert_eq!(with.resources.effective_uses.explosives, 1);
    }

    #[test]
    fn explosives_can_fail() {
        let config = EvaluatorConfig {
            explosives_failure_chance: 1.0,
            ..EvaluatorConfig::deterministic()
        };
        let state = TrueState::new(
            [EdgeKey::new(node(0), node(1))],
            BTreeMap::new(),
            BTreeMap::new(),
        );
        let result = PathEvaluator::new(1, config)
            .evaluate(&full_path(), &ResourceCounts::new(2, 0, 0), &line_city(), &state, 5)
            .unwrap();
        assert_eq!(
            result.failure_reason,
            Some(FailureReason::ExplosivesFailedToClear)
        );
        assert_eq!(result.resources.used.explosives, 1);
        assert_eq!(result.resources.effective_uses.explosives, 0);
    }

    #[test]
    fn last_node_ignores_blocked_streets_beyond_it() {
        let state = TrueState::new(
            [EdgeKey::new(node(2), node(3))],
            BTreeMap::new(),
            BTreeMap::new(),
        );
        let result = evaluator()
            .evaluate(&[node(3)], &ResourceCounts::default(), &line_city(), &state, 0)
            .unwrap();
        assert!(result.success);
    }

    #[test]
    fn surprise_encounters_need_ammo_without_misfire() {
        let config = EvaluatorConfig {
            surprise_encounter_chance: 1.0,
            ammo_failure_chance: 1.0,
            ..EvaluatorConfig::deterministic()
        };
        let result = PathEvaluator::new(3, config)
            .evaluate(&full_path(), &ResourceCounts::new(0, 4, 0), &line_city(), &calm(), 5)
            .unwrap();
        assert!(result.success);
        assert_eq!(result.resources.effective_uses.ammo, 4);

        let short = PathEvaluator::new(3, config)
            .evaluate(&full_path(), &ResourceCounts::new(0, 1, 0), &line_city(), &calm(), 5)
            .unwrap();
        assert_eq!(short.failure_reason, Some(FailureReason::OutOfAmmo));
        assert_eq!(short.final_step(), Some(2));
    }

    #[test]
    fn radiation_leaks_need_suits() {
        let config = EvaluatorConfig {
            radiation_leak_chance: 1.0,
            ..EvaluatorConfig::deterministic()
        };
        let result = PathEvaluator::new(3, config)
            .evaluate(&[node(3)], &ResourceCounts::default(), &line_city(), &calm(), 5)
            .unwrap();
        assert_eq!(result.failure_reason, Some(FailureReason::OutOfSuits));
    }

    #[test]
    fn ending_away_from_extraction_forfeits_the_kit() {
        let allocation = ResourceCounts::new(1, 1, 1);
        let result = evaluator()
            .evaluate(&[node(0), node(1)], &allocation, &line_city(), &calm(), 5)
            .unwrap();
        assert!(!result.success);
        assert_eq!(
            result.failure_reason,
            Some(FailureReason::DidNotReachExtraction)
        );
        assert_eq!(result.resources.used, allocation);
        assert_eq!(result.final_step(), Some(2));
    }

    #[test]
    fn out_of_range_chances_are_clamped() {
        let config = EvaluatorConfig {
            ammo_failure_chance: 4.0,
            radiation_leak_chance: -1.0,
            ..EvaluatorConfig::default()
        };
        let evaluator = PathEvaluator::new(0, config);
        assert!((evaluator.config().ammo_failure_chance - 1.0).abs() < f64::EPSILON);
        assert!(evaluator.config().radiation_leak_chance.abs() < f64::EPSILON);
    }

    #[test]
    fn same_seed_same_outcome() {
        let state = TrueState::new(
            [EdgeKey::new(node(1), node(2))],
            BTreeMap::from([(node(2), 0.6)]),
            BTreeMap::from([(node(1), 0.5)]),
        );
        let allocation = ResourceCounts::new(1, 2, 2);
        let run = |seed| {
            PathEvaluator::new(seed, EvaluatorConfig::default())
                .evaluate(&full_path(), &allocation, &line_city(), &state, 10)
                .unwrap()
        };
        assert_eq!(run(11), run(11));
    }
}
