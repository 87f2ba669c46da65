//! Citizens: the endangered population.

use fr_core::Tick;

use crate::EdgePosition;

/// Speed floor for a wading citizen, m/s.  Depth slows people down but the
/// model never freezes an `Unsafe` citizen in place — that is what
/// `CriticallyUnsafe` is for.
pub const FLOOR_SPEED_MPS: f64 = 0.5;

/// Exponential decay rate of walking speed per metre of water depth:
/// `speed = max_speed * exp(-DEPTH_SPEED_DECAY * depth)`.
pub const DEPTH_SPEED_DECAY: f64 = 2.0;

/// Safety state of a citizen.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CitizenState {
    /// Evacuated — terminal, no further action.
    Safe,
    /// In endangered area, actively seeking evacuation.
    Unsafe,
    /// In heavily flooded area; cannot self-evacuate, awaits rescue.
    CriticallyUnsafe,
    /// Picked up by a rescue unit; position mirrors the carrier.
    Rescued,
}

impl CitizenState {
    pub fn as_str(self) -> &'static str {
        match self {
            CitizenState::Safe             => "safe",
            CitizenState::Unsafe           => "unsafe",
            CitizenState::CriticallyUnsafe => "critically_unsafe",
            CitizenState::Rescued          => "rescued",
        }
    }
}

impl std::fmt::Display for CitizenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a citizen picks evacuation destinations.  Fixed at creation; the only
/// permitted change is the permanent `ShortestPath → Random` downgrade when
/// no safe zone is reachable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecisionMode {
    /// Head for the nearest safe zone by shortest path over the full graph.
    ShortestPath,
    /// Wander: uniformly random neighbor each time.
    Random,
    /// Copy the destination of someone already leaving this node; wander if
    /// nobody is.
    Follower,
}

impl DecisionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionMode::ShortestPath => "shortest_path",
            DecisionMode::Random       => "random",
            DecisionMode::Follower     => "follower",
        }
    }
}

/// One member of the endangered population.
///
/// `state` must only change through [`crate::CitizenStore::set_state`] so the
/// critical index stays consistent.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Citizen {
    pub state: CitizenState,
    pub mode: DecisionMode,
    pub edge: EdgePosition,

    /// Dry-ground walking speed, m/s.  Drawn once at creation from
    /// `Normal(1.5, 0.3)`, clamped positive.
    pub max_speed_mps: f64,

    /// Speed actually used this step (after depth decay).  Kept for output.
    pub current_speed_mps: f64,

    /// Tick at which the citizen was picked up, if ever.
    pub rescued_tick: Option<Tick>,

    /// Tick at which the citizen reached `Safe`, if ever.
    pub safe_tick: Option<Tick>,
}

impl Citizen {
    /// A fresh `Unsafe` citizen parked at `start`.
    pub fn new(start: fr_core::NodeId, mode: DecisionMode, max_speed_mps: f64) -> Self {
        Self {
            state: CitizenState::Unsafe,
            mode,
            edge: EdgePosition::at_node(start),
            max_speed_mps,
            current_speed_mps: 0.0,
            rescued_tick: None,
            safe_tick: None,
        }
    }

    /// Walking speed in `depth_m` of water: exponential decay with a floor.
    #[inline]
    pub fn wading_speed(&self, depth_m: f64) -> f64 {
        (self.max_speed_mps * (-DEPTH_SPEED_DECAY * depth_m).exp()).max(FLOOR_SPEED_MPS)
    }
}
