//! Structural graph metrics computed once per city.
//!
//! Both hazard generation and proxy synthesis read graph structure:
//! chokepoints attract zombie hordes, and most proxy indicators blend
//! hazards over a node's neighborhood. [`StructuralMetrics`] computes all
//! of it in one pass so nothing is recomputed per indicator.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use evac_types::{EdgeKey, NodeId};

use crate::city::CityGraph;

/// Precomputed structural metrics for one city.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuralMetrics {
    /// Normalized betweenness centrality per node.
    centrality: BTreeMap<NodeId, f64>,
    /// Local clustering coefficient per node.
    clustering: BTreeMap<NodeId, f64>,
    /// Sorted neighbor list per node.
    neighbors: BTreeMap<NodeId, Vec<NodeId>>,
    /// Neighbors shared by both endpoints, per edge.
    common_neighbors: BTreeMap<EdgeKey, Vec<NodeId>>,
}

impl StructuralMetrics {
    /// Compute every metric for `city`.
    pub fn compute(city: &CityGraph) -> Self {
        let neighbors: BTreeMap<NodeId, Vec<NodeId>> = city
            .node_ids()
            .map(|id| (id, city.neighbors(id).collect()))
            .collect();

        let common_neighbors = city
            .edges()
            .map(|(key, _)| {
                let low: BTreeSet<NodeId> = city.neighbors(key.low()).collect();
                let shared = city
                    .neighbors(key.high())
                    .filter(|n| low.contains(n))
                    .collect();
                (key, shared)
            })
            .collect();

        Self {
            centrality: betweenness_centrality(city),
            clustering: clustering_coefficients(city),
            neighbors,
            common_neighbors,
        }
    }

    /// Betweenness centrality of `node` in `[0, 1]`; 0 for unknown nodes.
    pub fn centrality(&self, node: NodeId) -> f64 {
        self.centrality.get(&node).copied().unwrap_or(0.0)
    }

    /// Clustering coefficient of `node` in `[0, 1]`; 0 for unknown nodes.
    pub fn clustering(&self, node: NodeId) -> f64 {
        self.clustering.get(&node).copied().unwrap_or(0.0)
    }

    /// Neighbors of `node` in ascending order.
    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.neighbors.get(&node).map_or(&[][..], Vec::as_slice)
    }

    /// Nodes adjacent to both endpoints of `edge`.
    pub fn common_neighbors(&self, edge: EdgeKey) -> &[NodeId] {
        self.common_neighbors.get(&edge).map_or(&[][..], Vec::as_slice)
    }
}

/// Unweighted betweenness centrality (Brandes), normalized by
/// `1 / ((n - 1)(n - 2))` so values fall in `[0, 1]`.
///
/// Graphs with two or fewer nodes have no intermediate nodes and score 0
/// everywhere.
pub fn betweenness_centrality(city: &CityGraph) -> BTreeMap<NodeId, f64> {
    let mut scores: BTreeMap<NodeId, f64> = city.node_ids().map(|id| (id, 0.0)).collect();

    for source in city.node_ids() {
        let mut order: Vec<NodeId> = Vec::new();
        let mut preds: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        let mut sigma: BTreeMap<NodeId, f64> = BTreeMap::new();
        let mut dist: BTreeMap<NodeId, u32> = BTreeMap::new();
        let mut queue = VecDeque::new();

        sigma.insert(source, 1.0);
        dist.insert(source, 0);
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            order.push(v);
            let dv = dist.get(&v).copied().unwrap_or(0);
            let sv = sigma.get(&v).copied().unwrap_or(0.0);
            for w in city.neighbors(v) {
                let dw = *dist.entry(w).or_insert_with(|| {
                    queue.push_back(w);
                    dv.saturating_add(1)
                });
                if dw == dv.saturating_add(1) {
                    *sigma.entry(w).or_insert(0.0) += sv;
                    preds.entry(w).or_default().push(v);
                }
            }
        }

        let mut delta: BTreeMap<NodeId, f64> = BTreeMap::new();
        while let Some(w) = order.pop() {
            let sw = sigma.get(&w).copied().unwrap_or(0.0);
            let dw = delta.get(&w).copied().unwrap_or(0.0);
            if sw > 0.0 {
                for &v in preds.get(&w).map_or(&[][..], Vec::as_slice) {
                    let sv = sigma.get(&v).copied().unwrap_or(0.0);
                    *delta.entry(v).or_insert(0.0) += sv / sw * (1.0 + dw);
                }
            }
            if w != source {
                *scores.entry(w).or_insert(0.0) += dw;
            }
        }
    }

    let n = count_as_f64(city.node_count());
    let scale = if city.node_count() > 2 {
        1.0 / ((n - 1.0) * (n - 2.0))
    } else {
        0.0
    };
    for score in scores.values_mut() {
        *score *= scale;
    }
    scores
}

/// Local clustering coefficient: the fraction of a node's neighbor pairs
/// that are themselves adjacent. Nodes with fewer than two neighbors score 0.
pub fn clustering_coefficients(city: &CityGraph) -> BTreeMap<NodeId, f64> {
    city.node_ids()
        .map(|id| {
            let neighbors: Vec<NodeId> = city.neighbors(id).collect();
            let k = neighbors.len();
            if k < 2 {
                return (id, 0.0);
            }
            let mut links: usize = 0;
            for (i, &u) in neighbors.iter().enumerate() {
                for &w in neighbors.iter().skip(i.saturating_add(1)) {
                    if city.has_edge(u, w) {
                        links = links.saturating_add(1);
                    }
                }
            }
            let pairs = k.saturating_mul(k.saturating_sub(1)) / 2;
            (id, ratio(links, pairs))
        })
        .collect()
}

/// `numerator / max(1, denominator)` as a float.
pub(crate) fn ratio(numerator: usize, denominator: usize) -> f64 {
    count_as_f64(numerator) / count_as_f64(denominator.max(1))
}

/// Node and edge counts in this engine stay far below 2^52.
#[allow(clippy::cast_precision_loss)]
pub(crate) const fn count_as_f64(count: usize) -> f64 {
    count as f64
}
