//! Rescue units: the responders.

use fr_core::{CitizenId, NodeId};

use crate::EdgePosition;

/// Mission state of a rescue unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitState {
    /// Idle, awaiting assignment from the dispatcher.
    Available,
    /// Heading to an assigned citizen.
    OnMission,
    /// Transporting rescued citizens to a safe zone.
    Carrying,
}

impl UnitState {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitState::Available => "available",
            UnitState::OnMission => "on_mission",
            UnitState::Carrying  => "carrying",
        }
    }
}

impl std::fmt::Display for UnitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rescue vehicle.
///
/// `state` must only change through [`crate::UnitStore::set_state`] so the
/// availability index stays consistent.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RescueUnit {
    pub state: UnitState,
    pub edge: EdgePosition,

    /// Driving speed, m/s.  Drawn once at creation from `Normal(8.0, 1.0)`,
    /// clamped positive.
    pub speed_mps: f64,

    /// Maximum citizens carried at once.
    pub capacity: usize,

    /// Citizens on board, in pickup order.  `len() <= capacity` always.
    pub carrying: Vec<CitizenId>,

    /// The citizen this unit is heading for while `OnMission`.
    pub target: Option<CitizenId>,

    /// Remaining node sequence; `path[0]` is the node the unit is anchored
    /// at, `path[1]` the next stop.  Empty while idle (or stalled).
    pub path: Vec<NodeId>,
}

impl RescueUnit {
    /// A fresh `Available` unit parked at `start`.
    pub fn new(start: NodeId, speed_mps: f64, capacity: usize) -> Self {
        Self {
            state: UnitState::Available,
            edge: EdgePosition::at_node(start),
            speed_mps,
            capacity,
            carrying: Vec::new(),
            target: None,
            path: Vec::new(),
        }
    }

    /// Seats still free.
    #[inline]
    pub fn remaining_capacity(&self) -> usize {
        self.capacity - self.carrying.len()
    }

    /// `true` once the stored path has been fully consumed.
    #[inline]
    pub fn path_exhausted(&self) -> bool {
        self.path.len() < 2
    }
}
