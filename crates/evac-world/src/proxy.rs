//! Noisy, indirect observations derived from the hidden true state.
//!
//! [`ProxyData`] is the only environmental information a decision policy
//! ever sees. Each indicator blends true hazards with graph structure and is
//! then perturbed by bounded uniform noise and clamped to `[0, 1]`.
//!
//! Indicator semantics (before noise):
//!
//! | Indicator              | Rises with                                   |
//! |------------------------|----------------------------------------------|
//! | `seismic_activity`     | blocked incident streets, isolation risk     |
//! | `radiation_readings`   | local and neighborhood radiation             |
//! | `population_density`   | chokepoint clustering, zombie presence       |
//! | `emergency_calls`      | zombie clusters, radiation zones, isolation  |
//! | `thermal_readings`     | zombie presence, clustering                  |
//! | `signal_strength`      | *falls* with radiation, blockages, isolation |
//! | `structural_integrity` | *falls* with blockages, isolation            |
//! | `structural_damage`    | the street's own blockage, nearby blockages  |
//! | `signal_interference`  | endpoint radiation, blockage                 |
//! | `movement_sightings`   | endpoint zombies, nearby zombie activity     |
//! | `debris_density`       | damage, nearby blockages, interference       |
//! | `hazard_gradient`      | hazard difference between the endpoints      |

use std::collections::{BTreeMap, BTreeSet};

use evac_types::{EdgeIndicator, EdgeKey, NodeId, NodeIndicator};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::city::CityGraph;
use crate::error::WorldError;
use crate::hazards::TrueState;
use crate::metrics::{StructuralMetrics, count_as_f64, ratio};
use crate::sampling::{self, ScenarioRng, clamp01, seeded_rng};

/// Radiation above this marks a node's neighborhood as a radiation zone.
const RADIATION_ZONE_LEVEL: f64 = 0.6;
/// Zombie level counted toward neighborhood presence.
const ZOMBIE_PRESENCE_LEVEL: f64 = 0.7;
/// Zombie level at which two adjacent neighbors form a cluster.
const ZOMBIE_CLUSTER_LEVEL: f64 = 0.5;
/// Zombie level counted as activity around a street.
const ZOMBIE_ACTIVITY_LEVEL: f64 = 0.4;

// ---------------------------------------------------------------------------
// ProxyData
// ---------------------------------------------------------------------------

/// Observable indicators per node and per street, each in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxyData {
    /// Node indicators keyed by node id.
    node_indicators: BTreeMap<NodeId, BTreeMap<NodeIndicator, f64>>,
    /// Edge indicators keyed by canonical edge key.
    edge_indicators: BTreeMap<EdgeKey, BTreeMap<EdgeIndicator, f64>>,
}

impl ProxyData {
    /// Create an empty set of observations.
    pub const fn new() -> Self {
        Self {
            node_indicators: BTreeMap::new(),
            edge_indicators: BTreeMap::new(),
        }
    }

    /// Record a node indicator, clamped to `[0, 1]`.
    pub fn add_node_indicator(&mut self, node: NodeId, indicator: NodeIndicator, value: f64) {
        self.node_indicators
            .entry(node)
            .or_default()
            .insert(indicator, clamp01(value));
    }

    /// Record an edge indicator, clamped to `[0, 1]`.
    pub fn add_edge_indicator(
        &mut self,
        a: NodeId,
        b: NodeId,
        indicator: EdgeIndicator,
        value: f64,
    ) {
        self.edge_indicators
            .entry(EdgeKey::new(a, b))
            .or_default()
            .insert(indicator, clamp01(value));
    }

    /// One indicator of one node.
    pub fn node_indicator(&self, node: NodeId, indicator: NodeIndicator) -> Option<f64> {
        self.node_indicators
            .get(&node)
            .and_then(|values| values.get(&indicator))
            .copied()
    }

    /// Every indicator of one node.
    pub fn node_indicators(&self, node: NodeId) -> Option<&BTreeMap<NodeIndicator, f64>> {
        self.node_indicators.get(&node)
    }

    /// One indicator of the street between `a` and `b`.
    pub fn edge_indicator(&self, a: NodeId, b: NodeId, indicator: EdgeIndicator) -> Option<f64> {
        self.edge_indicators
            .get(&EdgeKey::new(a, b))
            .and_then(|values| values.get(&indicator))
            .copied()
    }

    /// Every indicator of the street between `a` and `b`.
    pub fn edge_indicators(&self, a: NodeId, b: NodeId) -> Option<&BTreeMap<EdgeIndicator, f64>> {
        self.edge_indicators.get(&EdgeKey::new(a, b))
    }

    /// Iterate over observed nodes in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &BTreeMap<NodeIndicator, f64>)> + '_ {
        self.node_indicators.iter().map(|(&id, values)| (id, values))
    }

    /// Iterate over observed streets in ascending key order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, &BTreeMap<EdgeIndicator, f64>)> + '_ {
        self.edge_indicators.iter().map(|(&key, values)| (key, values))
    }
}

// ---------------------------------------------------------------------------
// Intermediate signals
// ---------------------------------------------------------------------------

/// Hazard and structure summary of a node's closed neighborhood.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeSignals {
    /// Betweenness centrality.
    pub centrality: f64,
    /// Clustering coefficient.
    pub clustering: f64,
    /// Any node in the closed neighborhood above the radiation-zone level.
    pub radiation_zone: bool,
    /// Mean radiation over the closed neighborhood.
    pub radiation_mean: f64,
    /// Fraction of the closed neighborhood with heavy zombie presence.
    pub zombie_presence: f64,
    /// Two adjacent neighbors both carry a horde.
    pub zombie_cluster: bool,
    /// Blocked incident streets over `max(1, degree)`.
    pub blocked_ratio: f64,
    /// Fraction of neighbors with most of their own streets blocked.
    pub isolation_risk: f64,
}

impl NodeSignals {
    /// Summarize the neighborhood of `node`.
    pub fn compute(node: NodeId, metrics: &StructuralMetrics, state: &TrueState) -> Self {
        let neighbors = metrics.neighbors(node);
        let neighbor_set: BTreeSet<NodeId> = neighbors.iter().copied().collect();
        let closed: Vec<NodeId> = neighbors.iter().copied().chain([node]).collect();

        let radiation_zone = closed
            .iter()
            .any(|&n| state.radiation(n) > RADIATION_ZONE_LEVEL);
        let radiation_mean =
            closed.iter().map(|&n| state.radiation(n)).sum::<f64>() / count_as_f64(closed.len());
        let heavy = closed
            .iter()
            .filter(|&&n| state.zombies(n) > ZOMBIE_PRESENCE_LEVEL)
            .count();

        let zombie_cluster = neighbors.iter().any(|&n1| {
            state.zombies(n1) > ZOMBIE_CLUSTER_LEVEL
                && metrics.neighbors(n1).iter().any(|n2| {
                    neighbor_set.contains(n2) && state.zombies(*n2) > ZOMBIE_CLUSTER_LEVEL
                })
        });

        let blocked = neighbors
            .iter()
            .filter(|&&n| state.is_blocked(node, n))
            .count();

        let isolated = neighbors
            .iter()
            .filter(|&&n| {
                let around = metrics.neighbors(n);
                let cut = around.iter().filter(|&&nn| state.is_blocked(n, nn)).count();
                cut.saturating_mul(2) > around.len()
            })
            .count();

        Self {
            centrality: metrics.centrality(node),
            clustering: metrics.clustering(node),
            radiation_zone,
            radiation_mean,
            zombie_presence: ratio(heavy, closed.len()),
            zombie_cluster,
            blocked_ratio: ratio(blocked, neighbors.len()),
            isolation_risk: ratio(isolated, neighbors.len()),
        }
    }

    /// Raw node indicators in [`NodeIndicator::ALL`] order, before noise.
    pub fn indicators(&self, own_radiation: f64) -> [(NodeIndicator, f64); 7] {
        let seismic = 0.7 * self.blocked_ratio + 0.3 * self.isolation_risk;
        let radiation = 0.8 * own_radiation + 0.2 * self.radiation_mean;
        let density = 0.4 * self.clustering * self.centrality * 2.0 + 0.6 * self.zombie_presence;
        let emergency = (f64::from(self.zombie_cluster) * 0.8)
            .max(f64::from(self.radiation_zone) * 0.9)
            .max(self.isolation_risk * 0.7);
        let thermal = 0.7 * self.zombie_presence + 0.3 * self.clustering;
        let signal = (1.0
            - (0.4 * self.radiation_mean + 0.3 * self.blocked_ratio + 0.3 * self.isolation_risk))
            .max(0.0);
        let structural =
            (1.0 - (0.5 * self.blocked_ratio + 0.3 * self.isolation_risk + 0.2 * seismic)).max(0.0);

        [
            (NodeIndicator::SeismicActivity, seismic),
            (NodeIndicator::RadiationReadings, radiation),
            (NodeIndicator::PopulationDensity, density),
            (NodeIndicator::EmergencyCalls, emergency),
            (NodeIndicator::ThermalReadings, thermal),
            (NodeIndicator::SignalStrength, signal),
            (NodeIndicator::StructuralIntegrity, structural),
        ]
    }
}

/// Hazard summary of one street and its shared neighborhood.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeSignals {
    /// The street itself is blocked.
    pub is_blocked: bool,
    /// Fraction of common neighbors with a blocked street to either endpoint.
    pub nearby_blockages: f64,
    /// Stronger endpoint radiation.
    pub radiation_exposure: f64,
    /// Absolute radiation difference between the endpoints.
    pub radiation_gradient: f64,
    /// Mean endpoint zombie level.
    pub zombie_movement: f64,
    /// Fraction of common neighbors with zombie activity.
    pub activity_cluster: f64,
}

impl EdgeSignals {
    /// Summarize the street `edge`.
    pub fn compute(edge: EdgeKey, metrics: &StructuralMetrics, state: &TrueState) -> Self {
        let (a, b) = (edge.low(), edge.high());
        let common = metrics.common_neighbors(edge);

        let near_blocked = common
            .iter()
            .filter(|&&n| state.is_blocked(n, a) || state.is_blocked(n, b))
            .count();
        let active = common
            .iter()
            .filter(|&&n| state.zombies(n) > ZOMBIE_ACTIVITY_LEVEL)
            .count();

        Self {
            is_blocked: state.is_blocked(a, b),
            nearby_blockages: ratio(near_blocked, common.len()),
            radiation_exposure: state.radiation(a).max(state.radiation(b)),
            radiation_gradient: (state.radiation(a) - state.radiation(b)).abs(),
            zombie_movement: (state.zombies(a) + state.zombies(b)) / 2.0,
            activity_cluster: ratio(active, common.len()),
        }
    }

    /// Raw edge indicators in [`EdgeIndicator::ALL`] order, before noise.
    ///
    /// `presence_gap` is the absolute difference in zombie presence between
    /// the endpoints' neighborhoods.
    pub fn indicators(&self, presence_gap: f64) -> [(EdgeIndicator, f64); 5] {
        let blocked = f64::from(self.is_blocked);
        let damage = 0.6 * blocked + 0.4 * self.nearby_blockages;
        let interference =
            0.4 * self.radiation_exposure + 0.4 * self.radiation_gradient + 0.2 * blocked;
        let movement = 0.6 * self.zombie_movement + 0.4 * self.activity_cluster;
        let debris = 0.5 * damage + 0.3 * self.nearby_blockages + 0.2 * interference;
        let hazard = self.radiation_gradient.max(presence_gap);

        [
            (EdgeIndicator::StructuralDamage, damage),
            (EdgeIndicator::SignalInterference, interference),
            (EdgeIndicator::MovementSightings, movement),
            (EdgeIndicator::DebrisDensity, debris),
            (EdgeIndicator::HazardGradient, hazard),
        ]
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Seeded proxy generator. One instance owns one random stream.
#[derive(Debug, Clone)]
pub struct ProxyGenerator {
    noise_level: f64,
    rng: ScenarioRng,
}

impl ProxyGenerator {
    /// Create a generator with the given noise half-width.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidNoiseLevel`] for a negative or non-finite
    /// noise level.
    pub fn new(noise_level: f64, seed: u64) -> Result<Self, WorldError> {
        if !noise_level.is_finite() || noise_level < 0.0 {
            return Err(WorldError::InvalidNoiseLevel(noise_level));
        }
        Ok(Self {
            noise_level,
            rng: seeded_rng(seed),
        })
    }

    /// The noise half-width.
    pub const fn noise_level(&self) -> f64 {
        self.noise_level
    }

    /// Perturb `value` with this generator's noise and clamp to `[0, 1]`.
    pub fn add_noise(&mut self, value: f64) -> f64 {
        sampling::add_noise(&mut self.rng, value, self.noise_level)
    }

    /// Derive observations for `city` from `state`.
    ///
    /// Nodes are processed in ascending id order (seven draws each), then
    /// streets in ascending key order (five draws each).
    pub fn generate(&mut self, city: &CityGraph, state: &TrueState) -> ProxyData {
        let metrics = StructuralMetrics::compute(city);
        let mut proxy = ProxyData::new();

        let node_signals: BTreeMap<NodeId, NodeSignals> = city
            .node_ids()
            .map(|node| (node, NodeSignals::compute(node, &metrics, state)))
            .collect();

        for (&node, signals) in &node_signals {
            for (indicator, raw) in signals.indicators(state.radiation(node)) {
                let observed = self.add_noise(raw);
                proxy.add_node_indicator(node, indicator, observed);
            }
        }

        for (edge, _) in city.edges() {
            let signals = EdgeSignals::compute(edge, &metrics, state);
            let presence = |node: NodeId| {
                node_signals
                    .get(&node)
                    .map_or(0.0, |s| s.zombie_presence)
            };
            let gap = (presence(edge.low()) - presence(edge.high())).abs();
            for (indicator, raw) in signals.indicators(gap) {
                let observed = self.add_noise(raw);
                proxy.add_edge_indicator(edge.low(), edge.high(), indicator, observed);
            }
        }

        debug!(
            nodes = node_signals.len(),
            edges = city.edge_count(),
            noise_level = self.noise_level,
            "generated proxy data"
        );

        proxy
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use evac_types::Position;

    use super::*;
    use crate::city_gen::CityGenerator;
    use crate::hazards::TrueStateGenerator;

    fn node(id: u32) -> NodeId {
        NodeId(id)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// Triangle 0-1-2 with a tail 2-3.
    fn kite() -> CityGraph {
        let mut city = CityGraph::new();
        for id in 0..4 {
            city.add_node(node(id), Position::new(f64::from(id), f64::from(id % 2)))
                .unwrap();
        }
        for (a, b) in [(0, 1), (1, 2), (0, 2), (2, 3)] {
            city.connect(node(a), node(b)).unwrap();
        }
        city
    }

    fn uniform_state(city: &CityGraph, zombies: f64, radiation: f64) -> TrueState {
        TrueState::new(
            [],
            city.node_ids().map(|id| (id, zombies)).collect(),
            city.node_ids().map(|id| (id, radiation)).collect(),
        )
    }

    #[test]
    fn rejects_bad_noise_levels() {
        assert!(ProxyGenerator::new(-0.1, 0).is_err());
        assert!(ProxyGenerator::new(f64::NAN, 0).is_err());
        let accepted = ProxyGenerator::new(0.25, 0).unwrap();
        assert!((accepted.noise_level() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn calm_city_reads_healthy() {
        let city = kite();
        let state = uniform_state(&city, 0.0, 0.0);
        let proxy = ProxyGenerator::new(0.0, 1).unwrap().generate(&city, &state);
        for id in city.node_ids() {
            let values = proxy.node_indicators(id).unwrap();
            assert_eq!(values.len(), 7);
            assert!(approx(values[&NodeIndicator::SignalStrength], 1.0));
            assert!(approx(values[&NodeIndicator::StructuralIntegrity], 1.0));
            assert!(approx(values[&NodeIndicator::SeismicActivity], 0.0));
            assert!(approx(values[&NodeIndicator::EmergencyCalls], 0.0));
        }
        assert_eq!(proxy.edges().count(), city.edge_count());
    }

    #[test]
    fn radiation_readings_follow_exact_blend() {
        let city = kite();
        let mut radiation: BTreeMap<NodeId, f64> = city.node_ids().map(|id| (id, 0.0)).collect();
        radiation.insert(node(3), 0.8);
        let state = TrueState::new([], BTreeMap::new(), radiation);
        let proxy = ProxyGenerator::new(0.0, 1).unwrap().generate(&city, &state);

        // Node 3: own 0.8, closed neighborhood {2, 3} averages 0.4.
        let reading = proxy
            .node_indicator(node(3), NodeIndicator::RadiationReadings)
            .unwrap();
        assert!(approx(reading, 0.8 * 0.8 + 0.2 * 0.4));
        // 0.8 > 0.6 marks node 2 as part of a radiation zone.
        let calls = proxy
            .node_indicator(node(2), NodeIndicator::EmergencyCalls)
            .unwrap();
        assert!(approx(calls, 0.9));
        let gradient = proxy
            .edge_indicator(node(3), node(2), EdgeIndicator::HazardGradient)
            .unwrap();
        assert!(approx(gradient, 0.8));
    }

    #[test]
    fn blocked_street_raises_damage() {
        let city = kite();
        let calm = uniform_state(&city, 0.0, 0.0);
        let blocked = TrueState::new([EdgeKey::new(node(2), node(3))], BTreeMap::new(), BTreeMap::new());

        let calm_proxy = ProxyGenerator::new(0.0, 1).unwrap().generate(&city, &calm);
        let blocked_proxy = ProxyGenerator::new(0.0, 1).unwrap().generate(&city, &blocked);

        let damage = |p: &ProxyData| {
            p.edge_indicator(node(2), node(3), EdgeIndicator::StructuralDamage)
                .unwrap()
        };
        assert!(approx(damage(&calm_proxy), 0.0));
        assert!(approx(damage(&blocked_proxy), 0.6));

        // Node 3 has its only street blocked.
        let seismic = blocked_proxy
            .node_indicator(node(3), NodeIndicator::SeismicActivity)
            .unwrap();
        assert!(approx(seismic, 0.7));
        let integrity = blocked_proxy
            .node_indicator(node(3), NodeIndicator::StructuralIntegrity)
            .unwrap();
        assert!(approx(integrity, 1.0 - (0.5 + 0.2 * 0.7)));
        // Node 2 sees neighbor 3 cut off.
        let isolation_calls = blocked_proxy
            .node_indicator(node(2), NodeIndicator::EmergencyCalls)
            .unwrap();
        assert!(approx(isolation_calls, 0.7 / 3.0));
    }

    #[test]
    fn zombie_cluster_in_triangle() {
        let city = kite();
        let state = uniform_state(&city, 0.6, 0.0);
        let metrics = StructuralMetrics::compute(&city);
        let signals = NodeSignals::compute(node(0), &metrics, &state);
        assert!(signals.zombie_cluster);
        assert!(approx(signals.zombie_presence, 0.0));
        // Node 3's only neighbor has no adjacent neighbor inside 3's set.
        assert!(!NodeSignals::compute(node(3), &metrics, &state).zombie_cluster);
    }

    #[test]
    fn indicators_rise_with_hazard() {
        let low = NodeSignals::default();
        let high = NodeSignals {
            radiation_mean: 0.9,
            zombie_presence: 1.0,
            blocked_ratio: 1.0,
            isolation_risk: 1.0,
            radiation_zone: true,
            zombie_cluster: true,
            ..NodeSignals::default()
        };
        let calm = low.indicators(0.0);
        let hot = high.indicators(1.0);
        for ((indicator, a), (_, b)) in calm.iter().zip(hot.iter()) {
            match indicator {
                NodeIndicator::SignalStrength | NodeIndicator::StructuralIntegrity => {
                    assert!(b < a, "{indicator:?} should fall");
                }
                NodeIndicator::PopulationDensity
                | NodeIndicator::ThermalReadings
                | NodeIndicator::SeismicActivity
                | NodeIndicator::RadiationReadings
                | NodeIndicator::EmergencyCalls => assert!(b > a, "{indicator:?} should rise"),
            }
        }
    }

    #[test]
    fn all_values_bounded_under_heavy_noise() {
        for seed in 0..5 {
            let city = CityGenerator::new(seed).generate(25).unwrap().city;
            let state = TrueStateGenerator::new(seed).generate(&city);
            let proxy = ProxyGenerator::new(5.0, seed).unwrap().generate(&city, &state);
            for (_, values) in proxy.nodes() {
                assert!(values.values().all(|v| (0.0..=1.0).contains(v)));
            }
            for (_, values) in proxy.edges() {
                assert_eq!(values.len(), 5);
                assert!(values.values().all(|v| (0.0..=1.0).contains(v)));
            }
        }
    }

    #[test]
    fn generation_leaves_true_state_untouched() {
        let city = CityGenerator::new(2).generate(15).unwrap().city;
        let state = TrueStateGenerator::new(2).generate(&city);
        let before = state.clone();
        let _ = ProxyGenerator::new(0.1, 2).unwrap().generate(&city, &state);
        assert_eq!(state, before);
    }

    #[test]
    fn serializes_with_named_indicators() {
        let city = kite();
        let state = uniform_state(&city, 0.2, 0.2);
        let proxy = ProxyGenerator::new(0.1, 4).unwrap().generate(&city, &state);
        let json = serde_json::to_value(&proxy).unwrap();
        assert!(json["node_indicators"]["0"]["seismic_activity"].is_number());
        assert!(json["edge_indicators"]["2-3"]["hazard_gradient"].is_number());
        let back: ProxyData = serde_json::from_value(json).unwrap();
        assert_eq!(back.nodes().count(), 4);
        assert_eq!(back.edges().count(), 4);
    }
}
