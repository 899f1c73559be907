//! City graph: intersections as nodes, streets as undirected weighted edges.
//!
//! The [`CityGraph`] is the spatial backbone of every scenario. It stores
//! node positions, edge weights (Euclidean street length), the team's
//! starting node, and the extraction nodes.
//!
//! Internally an adjacency map indexes the neighbors of every node:
//! `BTreeMap<NodeId, BTreeSet<NodeId>>`. All iteration runs in ascending id
//! order so that seeded generators built on top of it are reproducible.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use evac_types::{EdgeKey, NodeId, Position};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// The city graph holding all nodes, edges, and mission endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityGraph {
    /// Node positions indexed by id.
    positions: BTreeMap<NodeId, Position>,
    /// Edge weights indexed by canonical edge key.
    edges: BTreeMap<EdgeKey, f64>,
    /// Neighbor sets per node.
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
    /// Where the evacuation team starts.
    starting_node: Option<NodeId>,
    /// Where the team can be picked up, in selection order.
    extraction_nodes: Vec<NodeId>,
}

impl CityGraph {
    /// Create an empty city.
    pub const fn new() -> Self {
        Self {
            positions: BTreeMap::new(),
            edges: BTreeMap::new(),
            adjacency: BTreeMap::new(),
            starting_node: None,
            extraction_nodes: Vec::new(),
        }
    }

    // -------------------------------------------------------------------
    // Nodes
    // -------------------------------------------------------------------

    /// Add a node at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateNode`] if the id is already present.
    pub fn add_node(&mut self, id: NodeId, position: Position) -> Result<(), WorldError> {
        if self.positions.contains_key(&id) {
            return Err(WorldError::DuplicateNode(id));
        }
        self.positions.insert(id, position);
        self.adjacency.entry(id).or_default();
        Ok(())
    }

    /// Whether the node exists.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    /// All node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.positions.keys().copied()
    }

    /// Position of a node.
    pub fn position(&self, id: NodeId) -> Option<Position> {
        self.positions.get(&id).copied()
    }

    /// Iterate over `(id, position)` pairs in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, Position)> + '_ {
        self.positions.iter().map(|(&id, &pos)| (id, pos))
    }

    // -------------------------------------------------------------------
    // Edges
    // -------------------------------------------------------------------

    /// Add (or re-weight) the undirected edge between `a` and `b`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NodeNotFound`] if either endpoint is missing,
    /// [`WorldError::SelfLoop`] if `a == b`, or [`WorldError::InvalidWeight`]
    /// for a negative or non-finite weight.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, weight: f64) -> Result<(), WorldError> {
        if !self.contains_node(a) {
            return Err(WorldError::NodeNotFound(a));
        }
        if !self.contains_node(b) {
            return Err(WorldError::NodeNotFound(b));
        }
        if a == b {
            return Err(WorldError::SelfLoop(a));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(WorldError::InvalidWeight { a, b, weight });
        }

        self.edges.insert(EdgeKey::new(a, b), weight);
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
        Ok(())
    }

    /// Add the edge between `a` and `b` weighted by the Euclidean distance
    /// between their positions.
    ///
    /// # Errors
    ///
    /// Same as [`add_edge`](Self::add_edge).
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> Result<(), WorldError> {
        let pa = self.position(a).ok_or(WorldError::NodeNotFound(a))?;
        let pb = self.position(b).ok_or(WorldError::NodeNotFound(b))?;
        self.add_edge(a, b, pa.distance_to(pb))
    }

    /// Whether an edge joins `a` and `b`.
    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.edges.contains_key(&EdgeKey::new(a, b))
    }

    /// Weight of the edge between `a` and `b`, if it exists.
    pub fn edge_weight(&self, a: NodeId, b: NodeId) -> Option<f64> {
        self.edges.get(&EdgeKey::new(a, b)).copied()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterate over `(edge, weight)` pairs in ascending key order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, f64)> + '_ {
        self.edges.iter().map(|(&key, &w)| (key, w))
    }

    /// Neighbors of `id` in ascending order. Unknown nodes have none.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.get(&id).into_iter().flatten().copied()
    }

    /// Number of neighbors of `id`.
    pub fn degree(&self, id: NodeId) -> usize {
        self.adjacency.get(&id).map_or(0, BTreeSet::len)
    }

    // -------------------------------------------------------------------
    // Mission endpoints
    // -------------------------------------------------------------------

    /// Set the team's starting node.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NodeNotFound`] for an unknown node, or
    /// [`WorldError::InvalidStartingNode`] if it is already an extraction node.
    pub fn set_starting_node(&mut self, id: NodeId) -> Result<(), WorldError> {
        if !self.contains_node(id) {
            return Err(WorldError::NodeNotFound(id));
        }
        if self.extraction_nodes.contains(&id) {
            return Err(WorldError::InvalidStartingNode(id));
        }
        self.starting_node = Some(id);
        Ok(())
    }

    /// Register an extraction node.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NodeNotFound`] for an unknown node, or
    /// [`WorldError::InvalidExtractionNode`] if it is the starting node or
    /// already registered.
    pub fn add_extraction_node(&mut self, id: NodeId) -> Result<(), WorldError> {
        if !self.contains_node(id) {
            return Err(WorldError::NodeNotFound(id));
        }
        if self.starting_node == Some(id) || self.extraction_nodes.contains(&id) {
            return Err(WorldError::InvalidExtractionNode(id));
        }
        self.extraction_nodes.push(id);
        Ok(())
    }

    /// The team's starting node, once set.
    pub const fn starting_node(&self) -> Option<NodeId> {
        self.starting_node
    }

    /// Extraction nodes in selection order.
    pub fn extraction_nodes(&self) -> &[NodeId] {
        &self.extraction_nodes
    }

    /// Whether `id` is an extraction node.
    pub fn is_extraction(&self, id: NodeId) -> bool {
        self.extraction_nodes.contains(&id)
    }

    // -------------------------------------------------------------------
    // Graph queries
    // -------------------------------------------------------------------

    /// Find the shortest path between two nodes by edge weight. Returns the
    /// ordered node list from `start` to `goal` (inclusive), or `None` if
    /// either node is unknown or `goal` is unreachable.
    ///
    /// Uses Dijkstra's algorithm with a `BTreeSet` as the priority queue.
    pub fn shortest_path(&self, start: NodeId, goal: NodeId) -> Option<Vec<NodeId>> {
        if !self.contains_node(start) || !self.contains_node(goal) {
            return None;
        }
        if start == goal {
            return Some(vec![start]);
        }

        let mut dist: BTreeMap<NodeId, f64> = BTreeMap::new();
        let mut prev: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        let mut queue: BTreeSet<Frontier> = BTreeSet::new();

        dist.insert(start, 0.0);
        queue.insert(Frontier {
            dist: 0.0,
            node: start,
        });

        while let Some(Frontier {
            dist: current_dist,
            node: current,
        }) = queue.pop_first()
        {
            if current == goal {
                break;
            }

            for neighbor in self.neighbors(current) {
                let Some(weight) = self.edge_weight(current, neighbor) else {
                    continue;
                };
                let new_dist = current_dist + weight;

                let is_shorter = dist
                    .get(&neighbor)
                    .is_none_or(|&existing| new_dist < existing);

                if is_shorter {
                    if let Some(&old_dist) = dist.get(&neighbor) {
                        queue.remove(&Frontier {
                            dist: old_dist,
                            node: neighbor,
                        });
                    }
                    dist.insert(neighbor, new_dist);
                    prev.insert(neighbor, current);
                    queue.insert(Frontier {
                        dist: new_dist,
                        node: neighbor,
                    });
                }
            }
        }

        if !prev.contains_key(&goal) {
            return None;
        }

        let mut path = VecDeque::new();
        let mut current = goal;
        path.push_front(current);
        while let Some(&predecessor) = prev.get(&current) {
            path.push_front(predecessor);
            current = predecessor;
            if current == start {
                break;
            }
        }

        Some(path.into_iter().collect())
    }

    /// Sum of edge weights along `path`. Returns `None` if any consecutive
    /// pair is not joined by an edge.
    pub fn path_weight(&self, path: &[NodeId]) -> Option<f64> {
        path.windows(2).try_fold(0.0, |acc, pair| match pair {
            [a, b] => self.edge_weight(*a, *b).map(|w| acc + w),
            _ => Some(acc),
        })
    }

    /// Unweighted hop distance from `source` to every node within
    /// `max_hops`, including `source` itself at distance 0.
    pub fn hop_distances(&self, source: NodeId, max_hops: u32) -> BTreeMap<NodeId, u32> {
        let mut distances = BTreeMap::new();
        if !self.contains_node(source) {
            return distances;
        }

        let mut queue = VecDeque::new();
        distances.insert(source, 0);
        queue.push_back((source, 0_u32));

        while let Some((current, hops)) = queue.pop_front() {
            if hops >= max_hops {
                continue;
            }
            let next_hops = hops.saturating_add(1);
            for neighbor in self.neighbors(current) {
                if !distances.contains_key(&neighbor) {
                    distances.insert(neighbor, next_hops);
                    queue.push_back((neighbor, next_hops));
                }
            }
        }

        distances
    }

    /// Whether every node is reachable from every other node.
    pub fn is_connected(&self) -> bool {
        let Some(first) = self.node_ids().next() else {
            return true;
        };
        let reached = self.hop_distances(first, u32::MAX);
        reached.len() == self.node_count()
    }
}

/// Priority-queue entry for Dijkstra, ordered by distance then node id.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    dist: f64,
    node: NodeId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then_with(|| self.node.cmp(&other.node))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn node(id: u32) -> NodeId {
        NodeId(id)
    }

    /// Square a-b-c-d with a long diagonal a-c.
    ///
    /// ```text
    /// 0 --1-- 1
    /// |  \    |
    /// 1   5   1
    /// |     \ |
    /// 3 --1-- 2
    /// ```
    fn make_square_city() -> CityGraph {
        let mut city = CityGraph::new();
        for (id, x, y) in [(0, 0.0, 1.0), (1, 1.0, 1.0), (2, 1.0, 0.0), (3, 0.0, 0.0)] {
            city.add_node(node(id), Position::new(x, y)).unwrap();
        }
        city.add_edge(node(0), node(1), 1.0).unwrap();
        city.add_edge(node(1), node(2), 1.0).unwrap();
        city.add_edge(node(2), node(3), 1.0).unwrap();
        city.add_edge(node(3), node(0), 1.0).unwrap();
        city.add_edge(node(0), node(2), 5.0).unwrap();
        city
    }

    #[test]
    fn add_nodes_and_edges() {
        let city = make_square_city();
        assert_eq!(city.node_count(), 4);
        assert_eq!(city.edge_count(), 5);
        assert_eq!(city.degree(node(0)), 3);
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut city = CityGraph::new();
        city.add_node(node(0), Position::new(0.0, 0.0)).unwrap();
        assert_eq!(
            city.add_node(node(0), Position::new(1.0, 1.0)),
            Err(WorldError::DuplicateNode(node(0)))
        );
    }

    #[test]
    fn edge_requires_known_endpoints() {
        let mut city = CityGraph::new();
        city.add_node(node(0), Position::new(0.0, 0.0)).unwrap();
        assert_eq!(
            city.add_edge(node(0), node(1), 1.0),
            Err(WorldError::NodeNotFound(node(1)))
        );
        assert_eq!(
            city.add_edge(node(0), node(0), 1.0),
            Err(WorldError::SelfLoop(node(0)))
        );
    }

    #[test]
    fn edges_are_undirected() {
        let city = make_square_city();
        assert!(city.has_edge(node(1), node(0)));
        assert_eq!(city.edge_weight(node(2), node(0)), Some(5.0));
        assert!(!city.has_edge(node(1), node(3)));
        let neighbors: Vec<NodeId> = city.neighbors(node(1)).collect();
        assert_eq!(neighbors, vec![node(0), node(2)]);
    }

    #[test]
    fn connect_uses_euclidean_distance() {
        let mut city = CityGraph::new();
        city.add_node(node(0), Position::new(0.0, 0.0)).unwrap();
        city.add_node(node(1), Position::new(3.0, 4.0)).unwrap();
        city.connect(node(0), node(1)).unwrap();
        let w = city.edge_weight(node(0), node(1)).unwrap();
        assert!((w - 5.0).abs() < 1e-12);
    }

    #[test]
    fn shortest_path_avoids_heavy_diagonal() {
        let city = make_square_city();
        let path = city.shortest_path(node(0), node(2)).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.first(), Some(&node(0)));
        assert_eq!(path.last(), Some(&node(2)));
        assert!((city.path_weight(&path).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn shortest_path_same_node() {
        let city = make_square_city();
        assert_eq!(city.shortest_path(node(1), node(1)), Some(vec![node(1)]));
    }

    #[test]
    fn shortest_path_unreachable() {
        let mut city = make_square_city();
        city.add_node(node(9), Position::new(9.0, 9.0)).unwrap();
        assert_eq!(city.shortest_path(node(0), node(9)), None);
        assert_eq!(city.shortest_path(node(0), node(42)), None);
        assert!(!city.is_connected());
    }

    #[test]
    fn path_weight_rejects_missing_edge() {
        let city = make_square_city();
        assert_eq!(city.path_weight(&[node(1), node(3)]), None);
        assert_eq!(city.path_weight(&[node(1)]), Some(0.0));
    }

    #[test]
    fn hop_distances_respect_limit() {
        let mut city = CityGraph::new();
        for id in 0..5 {
            city.add_node(node(id), Position::new(f64::from(id), 0.0)).unwrap();
        }
        for id in 0..4 {
            city.connect(node(id), node(id + 1)).unwrap();
        }
        let hops = city.hop_distances(node(0), 2);
        assert_eq!(hops.get(&node(0)), Some(&0));
        assert_eq!(hops.get(&node(2)), Some(&2));
        assert_eq!(hops.get(&node(3)), None);
        assert!(city.is_connected());
    }

    #[test]
    fn endpoints_are_distinct() {
        let mut city = make_square_city();
        city.set_starting_node(node(0)).unwrap();
        assert_eq!(
            city.add_extraction_node(node(0)),
            Err(WorldError::InvalidExtractionNode(node(0)))
        );
        city.add_extraction_node(node(2)).unwrap();
        assert_eq!(
            city.add_extraction_node(node(2)),
            Err(WorldError::InvalidExtractionNode(node(2)))
        );
        assert_eq!(
            city.set_starting_node(node(2)),
            Err(WorldError::InvalidStartingNode(node(2)))
        );
        assert!(city.is_extraction(node(2)));
        assert_eq!(city.starting_node(), Some(node(0)));
    }

    #[test]
    fn serializes_with_string_edge_keys() {
        let city = make_square_city();
        let json = serde_json::to_value(&city).unwrap();
        assert!(json["edges"]["0-2"].is_number());
        let back: CityGraph = serde_json::from_value(json).unwrap();
        assert_eq!(back, city);
    }
}
