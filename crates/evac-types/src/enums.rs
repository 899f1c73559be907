//! Enumeration types for the evacuation simulation.

use core::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A consumable resource carried by the evacuation team.
///
/// Each kind neutralizes exactly one hazard type:
/// - [`Explosives`](Self::Explosives) clear blocked edges
/// - [`Ammo`](Self::Ammo) clears zombie hordes
/// - [`RadiationSuits`](Self::RadiationSuits) protect against radiation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Demolition charges for blockages.
    Explosives,
    /// Ammunition for zombie hordes.
    Ammo,
    /// Protective suits for radiation zones.
    RadiationSuits,
}

impl ResourceKind {
    /// All resource kinds in canonical order.
    pub const ALL: [Self; 3] = [Self::Explosives, Self::Ammo, Self::RadiationSuits];

    /// The `snake_case` name used in serialized output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Explosives => "explosives",
            Self::Ammo => "ammo",
            Self::RadiationSuits => "radiation_suits",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Mission outcomes
// ---------------------------------------------------------------------------

/// Why a mission ended in failure.
///
/// Every variant is a normal, reportable outcome of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The plan declared more resources than the scenario allows.
    BudgetExceeded,
    /// A radiation hazard was met with no suit left.
    OutOfSuits,
    /// A zombie hazard was met with no ammo left.
    OutOfAmmo,
    /// Ammo was spent but the horde was not cleared.
    AmmoFailedToClear,
    /// A blocked edge was met with no explosives left.
    OutOfExplosives,
    /// Explosives were spent but the blockage held.
    ExplosivesFailedToClear,
    /// The plan steps across a pair of nodes with no edge between them.
    NoPathExists,
    /// The path ended somewhere other than an extraction node.
    DidNotReachExtraction,
}

impl FailureReason {
    /// The resource kind whose shortage or failure caused this outcome, if any.
    pub const fn resource(self) -> Option<ResourceKind> {
        match self {
            Self::OutOfSuits => Some(ResourceKind::RadiationSuits),
            Self::OutOfAmmo | Self::AmmoFailedToClear => Some(ResourceKind::Ammo),
            Self::OutOfExplosives | Self::ExplosivesFailedToClear => {
                Some(ResourceKind::Explosives)
            }
            Self::BudgetExceeded | Self::NoPathExists | Self::DidNotReachExtraction => None,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::BudgetExceeded => "budget exceeded",
            Self::OutOfSuits => "out of radiation suits",
            Self::OutOfAmmo => "out of ammo",
            Self::AmmoFailedToClear => "ammo failed to clear zombies",
            Self::OutOfExplosives => "out of explosives",
            Self::ExplosivesFailedToClear => "explosives failed to clear blockage",
            Self::NoPathExists => "no path exists",
            Self::DidNotReachExtraction => "did not reach extraction",
        };
        f.write_str(text)
    }
}

/// Feasibility class of a scenario's resource budget.
///
/// Drawn once per generated city: 20% impossible, 30% tight, 30%
/// comfortable, 20% abundant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetClass {
    /// Base minus 2-4 (floor 1): usually too little to survive.
    Impossible,
    /// Exactly the base: needs a near-perfect allocation.
    Tight,
    /// Base plus 1-3.
    Comfortable,
    /// Base plus 4-6: tests allocation efficiency.
    Abundant,
}

// ---------------------------------------------------------------------------
// Proxy indicators
// ---------------------------------------------------------------------------

/// Observable indicator attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeIndicator {
    /// Blocked incident edges blended with isolation risk.
    SeismicActivity,
    /// Local radiation blended with the neighborhood average.
    RadiationReadings,
    /// Structural density blended with zombie presence.
    PopulationDensity,
    /// Strongest of zombie clustering, radiation zone, and isolation signals.
    EmergencyCalls,
    /// Zombie presence blended with clustering.
    ThermalReadings,
    /// Communications health; falls as hazards rise.
    SignalStrength,
    /// Infrastructure health; falls as blockages rise.
    StructuralIntegrity,
}

impl NodeIndicator {
    /// All node indicators in generation order.
    pub const ALL: [Self; 7] = [
        Self::SeismicActivity,
        Self::RadiationReadings,
        Self::PopulationDensity,
        Self::EmergencyCalls,
        Self::ThermalReadings,
        Self::SignalStrength,
        Self::StructuralIntegrity,
    ];
}

/// Observable indicator attached to an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeIndicator {
    /// Physical route condition.
    StructuralDamage,
    /// Communications disruption along the route.
    SignalInterference,
    /// Reported zombie activity along the route.
    MovementSightings,
    /// Route blockage assessment.
    DebrisDensity,
    /// Change in hazard level between the endpoints.
    HazardGradient,
}

impl EdgeIndicator {
    /// All edge indicators in generation order.
    pub const ALL: [Self; 5] = [
        Self::StructuralDamage,
        Self::SignalInterference,
        Self::MovementSightings,
        Self::DebrisDensity,
        Self::HazardGradient,
    ];
}
