//! The tagged entity handle.

use fr_core::{CitizenId, UnitId};

/// One slot in the scheduler's step order: either population, one tag.
///
/// The simulation iterates a single `Vec<Entity>` fixed at spawn time
/// (units first, then citizens, in creation order) and dispatches on the
/// variant — no runtime type inspection of the stored agents.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Entity {
    Rescue(UnitId),
    Citizen(CitizenId),
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Rescue(id)  => write!(f, "rescue:{}", id.0),
            Entity::Citizen(id) => write!(f, "citizen:{}", id.0),
        }
    }
}
