//! Random city synthesis.
//!
//! Nodes are scattered uniformly over a 100 x 100 square and each one is
//! wired to its three nearest neighbors. Because nearest-neighbor relations
//! are not symmetric, some nodes end up with more than three streets.

use evac_types::{BudgetClass, NodeId, Position};
use rand::Rng;
use rand::seq::index::sample;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::city::CityGraph;
use crate::error::WorldError;
use crate::metrics::count_as_f64;
use crate::sampling::{ScenarioRng, seeded_rng};

/// Side length of the square the city is drawn in.
const CITY_EXTENT: f64 = 100.0;

/// Streets wired from each node to its nearest neighbors.
const NEAREST_NEIGHBORS: usize = 3;

/// Extraction points picked per city.
const EXTRACTION_COUNT: usize = 2;

/// Start plus every extraction point.
pub const MIN_NODES: usize = 1 + EXTRACTION_COUNT;

/// A freshly generated city together with its resource budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCity {
    /// The city graph with start and extraction nodes set.
    pub city: CityGraph,
    /// Hard cap on the total resources a plan may declare.
    pub max_resources: u32,
    /// Which feasibility class the budget was drawn from.
    pub budget_class: BudgetClass,
}

/// Seeded city generator. One instance owns one random stream.
#[derive(Debug, Clone)]
pub struct CityGenerator {
    rng: ScenarioRng,
}

impl CityGenerator {
    /// Create a generator whose output is fixed by `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: seeded_rng(seed),
        }
    }

    /// Generate a city with `n_nodes` intersections.
    ///
    /// Draw order: positions (x then y per node), the starting node, the two
    /// extraction nodes, then the budget.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::TooFewNodes`] when `n_nodes < 3` or when
    /// `n_nodes` does not fit a node id.
    pub fn generate(&mut self, n_nodes: usize) -> Result<GeneratedCity, WorldError> {
        let too_few = WorldError::TooFewNodes {
            requested: n_nodes,
            minimum: MIN_NODES,
        };
        if n_nodes < MIN_NODES {
            return Err(too_few);
        }
        let Ok(count) = u32::try_from(n_nodes) else {
            return Err(too_few);
        };

        let mut city = CityGraph::new();
        for id in 0..count {
            let x = self.rng.random_range(0.0..CITY_EXTENT);
            let y = self.rng.random_range(0.0..CITY_EXTENT);
            city.add_node(NodeId(id), Position::new(x, y))?;
        }

        let positions: Vec<(NodeId, Position)> = city.nodes().collect();
        for &(id, pos) in &positions {
            let mut candidates: Vec<(f64, NodeId)> = positions
                .iter()
                .filter(|(other, _)| *other != id)
                .map(|&(other, other_pos)| (pos.distance_to(other_pos), other))
                .collect();
            candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
            for &(weight, other) in candidates.iter().take(NEAREST_NEIGHBORS) {
                city.add_edge(id, other, weight)?;
            }
        }

        let start = NodeId(self.rng.random_range(0..count));
        city.set_starting_node(start)?;

        let others: Vec<NodeId> = city.node_ids().filter(|&id| id != start).collect();
        for index in sample(&mut self.rng, others.len(), EXTRACTION_COUNT).iter() {
            if let Some(&node) = others.get(index) {
                city.add_extraction_node(node)?;
            }
        }

        let (max_resources, budget_class) = self.calculate_max_resources(n_nodes);

        debug!(
            nodes = city.node_count(),
            edges = city.edge_count(),
            start = %start,
            max_resources,
            ?budget_class,
            "generated city"
        );

        Ok(GeneratedCity {
            city,
            max_resources,
            budget_class,
        })
    }

    /// Draw the resource budget for a city of `n_nodes`.
    ///
    /// The base is `max(2, round(2 * log2(n)))`. One uniform roll then picks
    /// the class: 20% impossible (base minus 2..=4, floor 1), 30% tight
    /// (base), 30% comfortable (base plus 1..=3), 20% abundant (base plus
    /// 4..=6).
    pub fn calculate_max_resources(&mut self, n_nodes: usize) -> (u32, BudgetClass) {
        let base = budget_base(n_nodes);
        let roll: f64 = self.rng.random();

        if roll < 0.2 {
            let cut = self.rng.random_range(2..=4);
            (base.saturating_sub(cut).max(1), BudgetClass::Impossible)
        } else if roll < 0.5 {
            (base, BudgetClass::Tight)
        } else if roll < 0.8 {
            let extra = self.rng.random_range(1..=3);
            (base.saturating_add(extra), BudgetClass::Comfortable)
        } else {
            let extra = self.rng.random_range(4..=6);
            (base.saturating_add(extra), BudgetClass::Abundant)
        }
    }
}

/// `max(2, round(2 * log2(n)))`; 2 for `n <= 1`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn budget_base(n_nodes: usize) -> u32 {
    if n_nodes <= 1 {
        return 2;
    }
    // At most 2 * 64 for any usize, so the cast is exact.
    let scaled = (2.0 * count_as_f64(n_nodes).log2()).round() as u32;
    scaled.max(2)
}
