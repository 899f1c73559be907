//! The hidden ground truth of a scenario.
//!
//! [`TrueState`] holds three hazard layers: blocked streets (explosives),
//! zombie concentration per node (ammo), and radiation per node (suits).
//! It is read by the path evaluator and the proxy generator only. It does
//! not implement `Serialize`, so it cannot leak into a report by accident.
//!
//! Each layer follows a spatial pattern rather than pure noise:
//!
//! - **Radiation** diffuses from a handful of sources over at most four hops
//!   and takes the strongest source at each node.
//! - **Zombies** gather at chokepoints (high betweenness) with random hordes
//!   sprinkled on top.
//! - **Blockages** surround the good routes from start to extraction without
//!   cutting them, over a uniform background rate.

use std::collections::{BTreeMap, BTreeSet};

use evac_types::{EdgeKey, NodeId};
use rand::Rng;
use rand::seq::index::sample;
use tracing::debug;

use crate::city::CityGraph;
use crate::metrics::betweenness_centrality;
use crate::sampling::{ScenarioRng, clamp01, seeded_rng};

/// Radiation reaches this many hops from a source (with zero intensity at
/// the last one).
pub const RADIATION_MAX_HOPS: u32 = 4;

const RADIATION_DECAY_EXPONENT: f64 = 1.5;

const ZOMBIE_CENTRALITY_WEIGHT: f64 = 3.0;
const ZOMBIE_JITTER_LOW: f64 = -0.1;
const ZOMBIE_JITTER_HIGH: f64 = 0.3;
const HORDE_CHANCE: f64 = 0.3;
const HORDE_LOW: f64 = 0.5;
const HORDE_HIGH: f64 = 0.9;

const ROUTE_ADJACENT_BLOCK_CHANCE: f64 = 0.5;
const BACKGROUND_BLOCK_CHANCE: f64 = 0.25;

// ---------------------------------------------------------------------------
// TrueState
// ---------------------------------------------------------------------------

/// Ground-truth hazards for one city. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrueState {
    blockages: BTreeSet<EdgeKey>,
    zombies: BTreeMap<NodeId, f64>,
    radiation: BTreeMap<NodeId, f64>,
}

impl TrueState {
    /// Build a state from its three layers. Intensities are clamped to
    /// `[0, 1]`.
    pub fn new(
        blockages: impl IntoIterator<Item = EdgeKey>,
        zombies: BTreeMap<NodeId, f64>,
        radiation: BTreeMap<NodeId, f64>,
    ) -> Self {
        let clamp_all = |layer: BTreeMap<NodeId, f64>| {
            layer
                .into_iter()
                .map(|(node, value)| (node, clamp01(value)))
                .collect()
        };
        Self {
            blockages: blockages.into_iter().collect(),
            zombies: clamp_all(zombies),
            radiation: clamp_all(radiation),
        }
    }

    /// Whether the street between `a` and `b` is blocked.
    pub fn is_blocked(&self, a: NodeId, b: NodeId) -> bool {
        self.blockages.contains(&EdgeKey::new(a, b))
    }

    /// Zombie concentration at `node`; 0 for nodes without an entry.
    pub fn zombies(&self, node: NodeId) -> f64 {
        self.zombies.get(&node).copied().unwrap_or(0.0)
    }

    /// Radiation intensity at `node`; 0 for nodes without an entry.
    pub fn radiation(&self, node: NodeId) -> f64 {
        self.radiation.get(&node).copied().unwrap_or(0.0)
    }

    /// Every blocked street.
    pub const fn blockages(&self) -> &BTreeSet<EdgeKey> {
        &self.blockages
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Radiation contributed by a source `hops` away: `(1 - hops/4)^1.5`, or 0
/// beyond range.
pub fn radiation_intensity(hops: u32) -> f64 {
    if hops >= RADIATION_MAX_HOPS {
        return 0.0;
    }
    let falloff = 1.0 - f64::from(hops) / f64::from(RADIATION_MAX_HOPS);
    falloff.powf(RADIATION_DECAY_EXPONENT)
}

/// Seeded hazard generator. One instance owns one random stream.
#[derive(Debug, Clone)]
pub struct TrueStateGenerator {
    rng: ScenarioRng,
}

impl TrueStateGenerator {
    /// Create a generator whose output is fixed by `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: seeded_rng(seed),
        }
    }

    /// Generate hazards for `city`. Layers are drawn in a fixed order:
    /// radiation, zombies, then blockages.
    pub fn generate(&mut self, city: &CityGraph) -> TrueState {
        let (radiation, source_count) = self.generate_radiation(city);
        let zombies = self.generate_zombies(city);
        let blockages = self.generate_blockages(city);

        debug!(
            nodes = city.node_count(),
            radiation_sources = source_count,
            blockages = blockages.len(),
            "generated true state"
        );

        TrueState {
            blockages,
            zombies,
            radiation,
        }
    }

    /// Multi-source diffusion. Returns the layer and the number of sources.
    fn generate_radiation(&mut self, city: &CityGraph) -> (BTreeMap<NodeId, f64>, usize) {
        let mut radiation: BTreeMap<NodeId, f64> = city.node_ids().map(|id| (id, 0.0)).collect();
        let nodes: Vec<NodeId> = city.node_ids().collect();
        if nodes.is_empty() {
            return (radiation, 0);
        }

        let mut candidates: BTreeSet<NodeId> = city.extraction_nodes().iter().copied().collect();
        let extra = (nodes.len() / 8).max(2).min(nodes.len());
        for index in sample(&mut self.rng, nodes.len(), extra).iter() {
            if let Some(&node) = nodes.get(index) {
                candidates.insert(node);
            }
        }

        let candidates: Vec<NodeId> = candidates.into_iter().collect();
        let wanted = (candidates.len().saturating_mul(2) / 3)
            .max(2)
            .min(candidates.len());
        let sources: Vec<NodeId> = sample(&mut self.rng, candidates.len(), wanted)
            .iter()
            .filter_map(|index| candidates.get(index).copied())
            .collect();

        for &source in &sources {
            for (node, hops) in city.hop_distances(source, RADIATION_MAX_HOPS) {
                let intensity = radiation_intensity(hops);
                if let Some(level) = radiation.get_mut(&node) {
                    *level = level.max(intensity);
                }
            }
        }

        (radiation, sources.len())
    }

    /// Chokepoint-weighted concentration plus random hordes.
    fn generate_zombies(&mut self, city: &CityGraph) -> BTreeMap<NodeId, f64> {
        let centrality = betweenness_centrality(city);
        city.node_ids()
            .map(|node| {
                let base = centrality.get(&node).copied().unwrap_or(0.0) * ZOMBIE_CENTRALITY_WEIGHT;
                let jitter = self.rng.random_range(ZOMBIE_JITTER_LOW..ZOMBIE_JITTER_HIGH);
                let mut level = clamp01(base + jitter);
                if self.rng.random_bool(HORDE_CHANCE) {
                    level = level.max(self.rng.random_range(HORDE_LOW..HORDE_HIGH));
                }
                (node, level)
            })
            .collect()
    }

    /// Barriers beside the shortest start-to-extraction routes, then a
    /// background rate everywhere else.
    ///
    /// Routes are computed on the unblocked graph. Every edge on any route is
    /// protected from the first pass; each other edge touching a route node
    /// is rolled once.
    fn generate_blockages(&mut self, city: &CityGraph) -> BTreeSet<EdgeKey> {
        let mut blocked = BTreeSet::new();

        let routes: Vec<Vec<NodeId>> = city
            .starting_node()
            .map(|start| {
                city.extraction_nodes()
                    .iter()
                    .filter_map(|&target| city.shortest_path(start, target))
                    .collect()
            })
            .unwrap_or_default();

        let protected: BTreeSet<EdgeKey> = routes
            .iter()
            .flat_map(|route| {
                route.windows(2).filter_map(|pair| match pair {
                    [a, b] => Some(EdgeKey::new(*a, *b)),
                    _ => None,
                })
            })
            .collect();

        let adjacent: BTreeSet<EdgeKey> = routes
            .iter()
            .flatten()
            .flat_map(|&node| city.neighbors(node).map(move |other| EdgeKey::new(node, other)))
            .filter(|edge| !protected.contains(edge))
            .collect();

        for edge in adjacent {
            if self.rng.random_bool(ROUTE_ADJACENT_BLOCK_CHANCE) {
                blocked.insert(edge);
            }
        }

        let edges: Vec<EdgeKey> = city.edges().map(|(edge, _)| edge).collect();
        for edge in edges {
            if !blocked.contains(&edge) && self.rng.random_bool(BACKGROUND_BLOCK_CHANCE) {
                blocked.insert(edge);
            }
        }

        blocked
    }
}
