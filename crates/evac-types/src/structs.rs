//! Core data structs: positions, resource ledgers, plans, and results.

use serde::{Deserialize, Serialize};

use crate::enums::{FailureReason, ResourceKind};
use crate::ids::NodeId;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A point in the 2-D city plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Create a position from its coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// One non-negative count per [`ResourceKind`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCounts {
    /// Explosives count.
    pub explosives: u32,
    /// Ammo count.
    pub ammo: u32,
    /// Radiation suit count.
    pub radiation_suits: u32,
}

/// The resources a plan declares it will carry.
pub type ResourceAllocation = ResourceCounts;

impl ResourceCounts {
    /// Create a set of counts.
    pub const fn new(explosives: u32, ammo: u32, radiation_suits: u32) -> Self {
        Self {
            explosives,
            ammo,
            radiation_suits,
        }
    }

    /// Count for one kind.
    pub const fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Explosives => self.explosives,
            ResourceKind::Ammo => self.ammo,
            ResourceKind::RadiationSuits => self.radiation_suits,
        }
    }

    /// Overwrite the count for one kind.
    pub const fn set(&mut self, kind: ResourceKind, value: u32) {
        match kind {
            ResourceKind::Explosives => self.explosives = value,
            ResourceKind::Ammo => self.ammo = value,
            ResourceKind::RadiationSuits => self.radiation_suits = value,
        }
    }

    /// Add one to the count for `kind`, saturating at `u32::MAX`.
    pub const fn increment(&mut self, kind: ResourceKind) {
        let next = self.get(kind).saturating_add(1);
        self.set(kind, next);
    }

    /// Sum over all kinds, widened so it cannot overflow.
    pub fn total(&self) -> u64 {
        u64::from(self.explosives)
            .saturating_add(u64::from(self.ammo))
            .saturating_add(u64::from(self.radiation_suits))
    }
}

/// Fraction of used resources that actually resolved their hazard, per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceEfficiency {
    /// Explosives efficiency in `[0, 1]`.
    pub explosives: f64,
    /// Ammo efficiency in `[0, 1]`.
    pub ammo: f64,
    /// Radiation suit efficiency in `[0, 1]`.
    pub radiation_suits: f64,
}

impl ResourceEfficiency {
    /// Efficiency for one kind.
    pub const fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Explosives => self.explosives,
            ResourceKind::Ammo => self.ammo,
            ResourceKind::RadiationSuits => self.radiation_suits,
        }
    }
}

/// Resource ledger for a single mission.
///
/// Invariants maintained by the evaluator: `used <= allocated` and
/// `effective_uses <= used` for every kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// What the plan declared it would carry.
    pub allocated: ResourceCounts,
    /// What was consumed (successfully or not).
    pub used: ResourceCounts,
    /// How many hazards demanded each kind, satisfied or not.
    pub needed: ResourceCounts,
    /// Consumptions that cleared their hazard.
    pub effective_uses: ResourceCounts,
}

impl ResourceUsage {
    /// Start a ledger for a mission carrying `allocated`.
    pub fn new(allocated: ResourceAllocation) -> Self {
        Self {
            allocated,
            ..Self::default()
        }
    }

    /// Whether at least one unit of `kind` is still available.
    pub const fn has_remaining(&self, kind: ResourceKind) -> bool {
        self.used.get(kind) < self.allocated.get(kind)
    }

    /// Total hazards encountered across all kinds.
    pub fn total_needed(&self) -> u64 {
        self.needed.total()
    }

    /// Mark every declared resource as spent with no effect.
    ///
    /// Used when a mission is lost in a way that forfeits the whole kit.
    pub const fn forfeit_all(&mut self) {
        self.used = self.allocated;
    }

    /// Per-kind `effective_uses / used`, or 0 for kinds never used.
    pub fn efficiency(&self) -> ResourceEfficiency {
        let ratio = |kind: ResourceKind| {
            let used = self.used.get(kind);
            if used == 0 {
                0.0
            } else {
                f64::from(self.effective_uses.get(kind)) / f64::from(used)
            }
        };
        ResourceEfficiency {
            explosives: ratio(ResourceKind::Explosives),
            ammo: ratio(ResourceKind::Ammo),
            radiation_suits: ratio(ResourceKind::RadiationSuits),
        }
    }
}

// ---------------------------------------------------------------------------
// Plans and results
// ---------------------------------------------------------------------------

/// A decision policy's answer: the route to walk and the kit to carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvacuationPlan {
    /// Ordered node ids, starting at the city's starting node.
    pub path: Vec<NodeId>,
    /// Resources to carry.
    pub resources: ResourceAllocation,
}

impl EvacuationPlan {
    /// Create a plan.
    pub const fn new(path: Vec<NodeId>, resources: ResourceAllocation) -> Self {
        Self { path, resources }
    }
}

/// One entry of the mission trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Step index: 0 is mission start, `i` is the `i`-th node of the path.
    pub step: usize,
    /// Human-readable description.
    pub description: String,
}

impl SimulationEvent {
    /// Create an event.
    pub fn new(step: usize, description: impl Into<String>) -> Self {
        Self {
            step,
            description: description.into(),
        }
    }
}

/// Outcome of evaluating one plan against the hidden true state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Whether the team reached an extraction node alive.
    pub success: bool,
    /// Sum of weights of the path's edges that exist in the city.
    pub path_length: f64,
    /// Path length inflated by encountered hazards plus jitter.
    pub time_taken: f64,
    /// Hazards encountered, resolved or not.
    pub obstacles_encountered: u64,
    /// Resource ledger at the end of the mission.
    pub resources: ResourceUsage,
    /// Per-kind efficiency derived from `resources`.
    pub efficiency: ResourceEfficiency,
    /// Machine-readable failure cause, `None` on success.
    pub failure_reason: Option<FailureReason>,
    /// Human-readable failure description, `None` on success.
    pub failure_message: Option<String>,
    /// Chronological mission trace.
    pub events: Vec<SimulationEvent>,
}

impl SimulationResult {
    /// Step index of the last recorded event.
    pub fn final_step(&self) -> Option<usize> {
        self.events.last().map(|e| e.step)
    }
}
