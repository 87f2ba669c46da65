//! Greedy nearest-available assignment.

use fr_agents::{assign_target, CitizenStore, UnitStore};
use fr_core::{CitizenId, Tick, UnitId};
use fr_network::{route_with_policy, PathPolicy, RoadNetwork, Router};

/// One citizen↔unit pairing made during a dispatch round, for observers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Assignment {
    pub unit: UnitId,
    pub citizen: CitizenId,
    /// Approach distance at assignment time, metres.
    pub distance_m: f64,
}

/// The call-center coordinator.
///
/// Runs every `interval_ticks` ticks.  Citizens are visited in ascending
/// `CitizenId` (creation order) and units compared in ascending `UnitId` with
/// strict distance improvement, so a distance tie goes to the lower id —
/// the whole round is deterministic.
#[derive(Clone, Debug)]
pub struct DispatchCoordinator {
    interval_ticks: u64,
}

impl DispatchCoordinator {
    pub fn new(interval_ticks: u64) -> Self {
        debug_assert!(interval_ticks >= 1);
        Self { interval_ticks }
    }

    /// `true` on ticks where an assignment round should run.
    #[inline]
    pub fn is_due(&self, tick: Tick) -> bool {
        tick.0.is_multiple_of(self.interval_ticks)
    }

    /// One assignment round.
    ///
    /// For each critically unsafe citizen not already covered by an active
    /// mission, pick the available unit with the shortest approach path
    /// (under `policy`) and commit it.  Citizens with no available unit or no
    /// path stay queued for the next round.
    pub fn dispatch(
        &self,
        citizens: &CitizenStore,
        units: &mut UnitStore,
        network: &RoadNetwork,
        router: &dyn Router,
        policy: PathPolicy,
    ) -> Vec<Assignment> {
        let mut assignments = Vec::new();

        for citizen_id in citizens.critical_sorted() {
            if units.is_targeted(citizen_id) {
                continue;
            }

            let citizen_node = citizens.get(citizen_id).edge.node();

            // Nearest available unit by approach distance.
            let mut best: Option<(UnitId, f64)> = None;
            for unit_id in units.available_sorted() {
                let unit_node = units.get(unit_id).edge.node();
                let Ok(route) =
                    route_with_policy(router, network, unit_node, citizen_node, policy)
                else {
                    continue;
                };
                let closer = best.is_none_or(|(_, d)| route.total_length_m < d);
                if closer {
                    best = Some((unit_id, route.total_length_m));
                }
            }

            let Some((unit_id, distance_m)) = best else {
                // Nobody free or nobody can get there — try again next round.
                continue;
            };

            if assign_target(units, unit_id, citizens, citizen_id, network, router, policy) {
                assignments.push(Assignment { unit: unit_id, citizen: citizen_id, distance_m });
            }
        }

        assignments
    }
}
