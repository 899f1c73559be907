//! Decision policy trait and the shortest-path baseline.
//!
//! A policy sees the city and the noisy proxy observations, never the true
//! state, and answers with an [`EvacuationPlan`]: a path and the resources
//! to carry. The [`EvacuationPolicy`] trait abstracts how that answer is
//! produced. It could be a heuristic, a learned model, or a test stub.

use evac_types::{EvacuationPlan, NodeId, ResourceCounts};
use evac_world::{CityGraph, ProxyData};

/// Errors a policy can report instead of a plan.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// The city has no starting node to plan from.
    #[error("city has no starting node")]
    NoStartingNode,

    /// An internal error in the policy.
    #[error("policy error: {message}")]
    Internal {
        /// Description of the error.
        message: String,
    },
}

/// A source of evacuation plans.
///
/// Called exactly once per scenario with immutable views of the city and
/// the observations.
pub trait EvacuationPolicy {
    /// Produce a plan for `city` under a budget of `max_resources`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if no plan can be produced at all. A poor or
    /// infeasible plan is still a plan and should be returned as one.
    fn plan_evacuation(
        &mut self,
        city: &CityGraph,
        proxy: &ProxyData,
        max_resources: u32,
    ) -> Result<EvacuationPlan, PolicyError>;
}

/// Baseline policy: walk the shortest route to the nearest reachable
/// extraction node and split the budget evenly across the three kinds.
///
/// Ignores the observations entirely. When no extraction node is reachable
/// the plan stays at the start.
#[derive(Debug, Clone, Default)]
pub struct ShortestPathPolicy;

impl ShortestPathPolicy {
    /// Create a new baseline policy.
    pub const fn new() -> Self {
        Self
    }
}

impl EvacuationPolicy for ShortestPathPolicy {
    fn plan_evacuation(
        &mut self,
        city: &CityGraph,
        _proxy: &ProxyData,
        max_resources: u32,
    ) -> Result<EvacuationPlan, PolicyError> {
        let start = city.starting_node().ok_or(PolicyError::NoStartingNode)?;

        let path = city
            .extraction_nodes()
            .iter()
            .filter_map(|&target| {
                let route = city.shortest_path(start, target)?;
                let length = city.path_weight(&route)?;
                Some((length, route))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map_or_else(|| vec![start], |(_, route)| route);

        let share = max_resources / 3;
        Ok(EvacuationPlan::new(path, ResourceCounts::new(share, share, share)))
    }
}

/// Fixed plan, handy for replaying a known answer.
#[derive(Debug, Clone, Default)]
pub struct FixedPlanPolicy {
    plan: EvacuationPlan,
}

impl FixedPlanPolicy {
    /// Always answer with `path` and `resources`.
    pub const fn new(path: Vec<NodeId>, resources: ResourceCounts) -> Self {
        Self {
            plan: EvacuationPlan::new(path, resources),
        }
    }
}

impl EvacuationPolicy for FixedPlanPolicy {
    fn plan_evacuation(
        &mut self,
        _city: &CityGraph,
        _proxy: &ProxyData,
        _max_resources: u32,
    ) -> Result<EvacuationPlan, PolicyError> {
        Ok(self.plan.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use evac_types::Position;

    use super::*;

    fn node(id: u32) -> NodeId {
        NodeId(id)
    }

    /// 0 -- 1 -- 2 -- 3 -- 4 on a line; start 2, extractions 0 and 4 with
    /// 4 pulled closer.
    fn line_city() -> CityGraph {
        let mut city = CityGraph::new();
        for (id, x) in [(0, 0.0), (1, 1.0), (2, 2.0), (3, 2.5), (4, 3.0)] {
            city.add_node(node(id), Position::new(x, 0.0)).unwrap();
        }
        for id in 0..4 {
            city.connect(node(id), node(id + 1)).unwrap();
        }
        city.set_starting_node(node(2)).unwrap();
        city.add_extraction_node(node(0)).unwrap();
        city.add_extraction_node(node(4)).unwrap();
        city
    }

    #[test]
    fn heads_for_nearest_extraction() {
        let plan = ShortestPathPolicy::new()
            .plan_evacuation(&line_city(), &ProxyData::new(), 10)
            .unwrap();
        assert_eq!(plan.path, vec![node(2), node(3), node(4)]);
        assert_eq!(plan.resources, ResourceCounts::new(3, 3, 3));
    }

    #[test]
    fn stays_put_when_nothing_is_reachable() {
        let mut city = CityGraph::new();
        for id in 0..3 {
            city.add_node(node(id), Position::new(f64::from(id), 0.0))
                .unwrap();
        }
        city.set_starting_node(node(0)).unwrap();
        city.add_extraction_node(node(1)).unwrap();
        city.add_extraction_node(node(2)).unwrap();

        let plan = ShortestPathPolicy::new()
            .plan_evacuation(&city, &ProxyData::new(), 2)
            .unwrap();
        assert_eq!(plan.path, vec![node(0)]);
        assert_eq!(plan.resources.total(), 0);
    }

    #[test]
    fn needs_a_starting_node() {
        let result = ShortestPathPolicy::new().plan_evacuation(&CityGraph::new(), &ProxyData::new(), 3);
        assert!(matches!(result, Err(PolicyError::NoStartingNode)));
    }

    #[test]
    fn fixed_plan_is_returned_verbatim() {
        let mut policy = FixedPlanPolicy::new(vec![node(2), node(1)], ResourceCounts::new(0, 1, 0));
        let plan = policy
            .plan_evacuation(&line_city(), &ProxyData::new(), 0)
            .unwrap();
        assert_eq!(plan.path, vec![node(2), node(1)]);
        assert_eq!(plan.resources.ammo, 1);
    }
}
