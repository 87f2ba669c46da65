//! Entity stores: the two populations plus incrementally maintained indices.
//!
//! The dispatcher and the rescue logic repeatedly need "all critically unsafe
//! citizens" and "all available units".  Instead of rescanning every entity
//! each tick, the stores keep those sets current inside the `set_state`
//! transition funnels — which are also where the state-machine legality rules
//! are asserted.

use rustc_hash::FxHashSet;

use fr_core::{CitizenId, Tick, UnitId};

use crate::{Citizen, CitizenState, RescueUnit, UnitState};

// ── CitizenStore ──────────────────────────────────────────────────────────────

/// All citizens, indexed by `CitizenId`, plus the critical-state index.
pub struct CitizenStore {
    citizens: Vec<Citizen>,
    /// Citizens currently in `CriticallyUnsafe`.  Maintained by `set_state`.
    critical: FxHashSet<CitizenId>,
}

impl CitizenStore {
    pub fn new(citizens: Vec<Citizen>) -> Self {
        let critical = citizens
            .iter()
            .enumerate()
            .filter(|(_, c)| c.state == CitizenState::CriticallyUnsafe)
            .map(|(i, _)| CitizenId(i as u32))
            .collect();
        Self { citizens, critical }
    }

    pub fn len(&self) -> usize {
        self.citizens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citizens.is_empty()
    }

    #[inline]
    pub fn get(&self, id: CitizenId) -> &Citizen {
        &self.citizens[id.index()]
    }

    /// Mutable access for movement and speed updates.
    ///
    /// Do not write `state` through this — use [`set_state`](Self::set_state)
    /// so the critical index and timestamps stay correct.
    #[inline]
    pub fn get_mut(&mut self, id: CitizenId) -> &mut Citizen {
        &mut self.citizens[id.index()]
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = CitizenId> + '_ {
        (0..self.citizens.len() as u32).map(CitizenId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CitizenId, &Citizen)> + '_ {
        self.citizens
            .iter()
            .enumerate()
            .map(|(i, c)| (CitizenId(i as u32), c))
    }

    /// Transition `id` to `new`, updating the critical index and recording
    /// rescue/safety timestamps.
    ///
    /// Debug-asserts the legality rules: `Safe` is terminal, `Rescued` may
    /// only become `Safe`, and `CriticallyUnsafe` never reaches `Safe`
    /// without passing through `Rescued`.
    pub fn set_state(&mut self, id: CitizenId, new: CitizenState, tick: Tick) {
        let citizen = &mut self.citizens[id.index()];
        let old = citizen.state;
        if old == new {
            return;
        }

        debug_assert!(old != CitizenState::Safe, "{id}: Safe is terminal");
        debug_assert!(
            old != CitizenState::Rescued || new == CitizenState::Safe,
            "{id}: Rescued may only transition to Safe"
        );
        debug_assert!(
            !(old == CitizenState::CriticallyUnsafe && new == CitizenState::Safe),
            "{id}: CriticallyUnsafe must pass through Rescued"
        );

        citizen.state = new;
        match new {
            CitizenState::CriticallyUnsafe => {
                self.critical.insert(id);
            }
            _ => {
                self.critical.remove(&id);
            }
        }
        if new == CitizenState::Rescued {
            citizen.rescued_tick.get_or_insert(tick);
        }
        if new == CitizenState::Safe {
            citizen.safe_tick.get_or_insert(tick);
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Critically unsafe citizens in ascending id order — the deterministic
    /// iteration order for dispatch and pickup.
    pub fn critical_sorted(&self) -> Vec<CitizenId> {
        let mut ids: Vec<CitizenId> = self.critical.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn critical_count(&self) -> usize {
        self.critical.len()
    }

    pub fn count_in_state(&self, state: CitizenState) -> usize {
        self.citizens.iter().filter(|c| c.state == state).count()
    }

    /// `true` once every citizen has been evacuated.
    pub fn all_safe(&self) -> bool {
        self.citizens.iter().all(|c| c.state == CitizenState::Safe)
    }
}

// ── UnitStore ─────────────────────────────────────────────────────────────────

/// All rescue units, indexed by `UnitId`, plus the availability index.
pub struct UnitStore {
    units: Vec<RescueUnit>,
    /// Units currently in `Available`.  Maintained by `set_state`.
    available: FxHashSet<UnitId>,
}

impl UnitStore {
    pub fn new(units: Vec<RescueUnit>) -> Self {
        let available = units
            .iter()
            .enumerate()
            .filter(|(_, u)| u.state == UnitState::Available)
            .map(|(i, _)| UnitId(i as u32))
            .collect();
        Self { units, available }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    #[inline]
    pub fn get(&self, id: UnitId) -> &RescueUnit {
        &self.units[id.index()]
    }

    /// Mutable access for movement, path, and cargo updates.
    ///
    /// Do not write `state` through this — use [`set_state`](Self::set_state).
    #[inline]
    pub fn get_mut(&mut self, id: UnitId) -> &mut RescueUnit {
        &mut self.units[id.index()]
    }

    pub fn ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        (0..self.units.len() as u32).map(UnitId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &RescueUnit)> + '_ {
        self.units
            .iter()
            .enumerate()
            .map(|(i, u)| (UnitId(i as u32), u))
    }

    /// Transition `id` to `new`, keeping the availability index current.
    pub fn set_state(&mut self, id: UnitId, new: UnitState) {
        let unit = &mut self.units[id.index()];
        if unit.state == new {
            return;
        }
        unit.state = new;
        match new {
            UnitState::Available => {
                self.available.insert(id);
            }
            _ => {
                self.available.remove(&id);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Available units in ascending id order.
    pub fn available_sorted(&self) -> Vec<UnitId> {
        let mut ids: Vec<UnitId> = self.available.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// `true` if some unit in `OnMission` or `Carrying` is already committed
    /// to `citizen` — the dispatcher's duplicate-assignment guard.
    pub fn is_targeted(&self, citizen: CitizenId) -> bool {
        self.units.iter().any(|u| {
            u.target == Some(citizen)
                && matches!(u.state, UnitState::OnMission | UnitState::Carrying)
        })
    }

    pub fn count_in_state(&self, state: UnitState) -> usize {
        self.units.iter().filter(|u| u.state == state).count()
    }
}
