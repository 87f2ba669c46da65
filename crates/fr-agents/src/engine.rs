//! Per-tick agent stepping.
//!
//! All functions here read the tick-start graph snapshot (depths and safety
//! flags are only rewritten in the flood phase) and mutate agent state
//! through the store funnels.  Entities step sequentially in the order fixed
//! at spawn time; a citizen's view of other citizens is the `departures`
//! board built once at the start of the agent phase, so stepping order never
//! changes what a follower sees.

use rustc_hash::FxHashMap;

use fr_core::{AgentRng, CitizenId, NodeId, Tick, UnitId};
use fr_network::{
    nearest_with_policy, route_with_policy, PathPolicy, RoadNetwork, RouteDomain, Router,
    SafeZones,
};

use crate::{
    CitizenState, CitizenStore, DecisionMode, EdgePosition, Entity, UnitState, UnitStore,
};

// ── StepCtx ───────────────────────────────────────────────────────────────────

/// Read-only world state handed to every agent step within one tick.
pub struct StepCtx<'a> {
    pub network: &'a RoadNetwork,
    pub zones: &'a SafeZones,
    pub router: &'a dyn Router,
    /// Fallback policy for rescue routing (safe subgraph first, then — per
    /// policy — the full graph).
    pub policy: PathPolicy,
    /// Tick-start board of `node → destination` for follower citizens.
    pub departures: &'a FxHashMap<NodeId, NodeId>,
    pub tick: Tick,
    /// Wall-clock seconds one tick represents.
    pub dt_secs: f64,
}

/// Snapshot the evacuation departures visible to `Follower` citizens this
/// tick: for every node, the destination of the lowest-id `Unsafe` citizen
/// currently departing it.
pub fn build_departures(citizens: &CitizenStore) -> FxHashMap<NodeId, NodeId> {
    let mut board = FxHashMap::default();
    for (_, citizen) in citizens.iter() {
        if citizen.state != CitizenState::Unsafe {
            continue;
        }
        if let Some(dest) = citizen.edge.to {
            board.entry(citizen.edge.from).or_insert(dest);
        }
    }
    board
}

/// Step one entity.  `citizen_rngs` is indexed by `CitizenId`; units have no
/// randomness.
pub fn step_entity(
    entity: Entity,
    citizens: &mut CitizenStore,
    units: &mut UnitStore,
    citizen_rngs: &mut [AgentRng],
    ctx: &StepCtx<'_>,
) {
    match entity {
        Entity::Citizen(id) => step_citizen(citizens, id, &mut citizen_rngs[id.index()], ctx),
        Entity::Rescue(id) => step_unit(units, citizens, id, ctx),
    }
}

// ── Citizen stepping ──────────────────────────────────────────────────────────

/// One tick of an `Unsafe` citizen.  Other states take no self-action:
/// `Safe` is terminal, `CriticallyUnsafe` waits for rescue, and `Rescued`
/// positions are mirrored by the carrying unit.
fn step_citizen(store: &mut CitizenStore, id: CitizenId, rng: &mut AgentRng, ctx: &StepCtx<'_>) {
    if store.get(id).state != CitizenState::Unsafe {
        return;
    }

    // Standing at an evacuation point is enough: self-evacuation succeeds.
    let node = store.get(id).edge.node();
    if store.get(id).edge.is_parked() && ctx.zones.contains(node) {
        store.set_state(id, CitizenState::Safe, ctx.tick);
        return;
    }

    if store.get(id).edge.is_parked() {
        choose_destination(store, id, rng, ctx);
    }

    let depth = ctx.network.depth_at(node);
    if !ctx.network.node_on_safe_ground[node.index()] {
        store.get_mut(id).current_speed_mps = 0.0;
        store.set_state(id, CitizenState::CriticallyUnsafe, ctx.tick);
        return;
    }

    let speed = store.get(id).wading_speed(depth);
    store.get_mut(id).current_speed_mps = speed;

    let citizen = store.get_mut(id);
    let Some(to) = citizen.edge.to else { return };
    let Some(length) = ctx.network.length_between(citizen.edge.from, to) else {
        // Destination is not adjacent — stale after an external graph swap.
        citizen.edge = EdgePosition::at_node(citizen.edge.from);
        return;
    };
    if let Some(arrived) = citizen.edge.advance(speed, ctx.dt_secs, length) {
        if ctx.zones.contains(arrived) {
            store.set_state(id, CitizenState::Safe, ctx.tick);
        }
    }
}

/// Pick the next edge for a parked citizen, per its decision mode.
fn choose_destination(
    store: &mut CitizenStore,
    id: CitizenId,
    rng: &mut AgentRng,
    ctx: &StepCtx<'_>,
) {
    let node = store.get(id).edge.node();
    let dest = match store.get(id).mode {
        DecisionMode::ShortestPath => {
            // Full-graph planning: citizens don't know which roads are flooded
            // until they reach them.
            match ctx
                .router
                .route_to_nearest(ctx.network, node, ctx.zones.as_slice(), RouteDomain::Full)
            {
                Ok(route) => route.next_node(),
                Err(_) => {
                    // No safe zone reachable at all: give up on planning for
                    // good and wander instead.
                    store.get_mut(id).mode = DecisionMode::Random;
                    random_neighbor(ctx.network, node, rng)
                }
            }
        }
        DecisionMode::Random => random_neighbor(ctx.network, node, rng),
        DecisionMode::Follower => ctx
            .departures
            .get(&node)
            .copied()
            .or_else(|| random_neighbor(ctx.network, node, rng)),
    };
    store.get_mut(id).edge.to = dest;
}

/// Uniformly random neighbor of `node`, `None` for an isolated node.
fn random_neighbor(network: &RoadNetwork, node: NodeId, rng: &mut AgentRng) -> Option<NodeId> {
    let neighbors: Vec<NodeId> = network.neighbors(node).collect();
    rng.choose(&neighbors).copied()
}

// ── Rescue-unit stepping ──────────────────────────────────────────────────────

/// One tick of a rescue unit.
fn step_unit(units: &mut UnitStore, citizens: &mut CitizenStore, id: UnitId, ctx: &StepCtx<'_>) {
    match units.get(id).state {
        UnitState::Available => {}

        UnitState::OnMission => {
            move_along_path(units, citizens, id, ctx);
            try_rescue(units, citizens, id, ctx);

            // Nobody left to pick up at the end of the path (the target was
            // rescued by another unit or walked away): stand down.
            let unit = units.get(id);
            if unit.state == UnitState::OnMission
                && unit.path_exhausted()
                && unit.edge.is_parked()
            {
                let unit = units.get_mut(id);
                unit.target = None;
                unit.path.clear();
                units.set_state(id, UnitState::Available);
            }
        }

        UnitState::Carrying => {
            // A stalled unit (no route to any safe zone when it loaded up)
            // re-plans every tick until the flood recedes.
            if units.get(id).path_exhausted() && units.get(id).edge.is_parked() {
                plan_to_safe_zone(units, id, ctx);
            }
            move_along_path(units, citizens, id, ctx);

            let unit = units.get(id);
            if unit.edge.is_parked() && ctx.zones.contains(unit.edge.node()) {
                drop_off(units, citizens, id, ctx);
            }
        }
    }
}

/// Advance the unit one tick along its stored path, mirroring its position
/// onto every carried citizen.
fn move_along_path(
    units: &mut UnitStore,
    citizens: &mut CitizenStore,
    id: UnitId,
    ctx: &StepCtx<'_>,
) {
    let unit = units.get_mut(id);
    if unit.path_exhausted() {
        return;
    }

    let from = unit.path[0];
    let next = unit.path[1];
    debug_assert_eq!(unit.edge.from, from);
    unit.edge.to = Some(next);

    let Some(length) = ctx.network.length_between(from, next) else {
        // Router output is adjacency-valid; a miss means the graph changed
        // under us.  Drop the stale path and re-plan next tick.
        unit.path.clear();
        unit.edge = EdgePosition::at_node(from);
        mirror_carried(units, citizens, id);
        return;
    };

    if let Some(arrived) = unit.edge.advance(unit.speed_mps, ctx.dt_secs, length) {
        unit.path.remove(0);
        debug_assert_eq!(unit.path[0], arrived);
    }

    mirror_carried(units, citizens, id);
}

/// Pick up critically unsafe citizens at the unit's node, up to remaining
/// capacity, then turn for the nearest safe zone.
fn try_rescue(units: &mut UnitStore, citizens: &mut CitizenStore, id: UnitId, ctx: &StepCtx<'_>) {
    if !units.get(id).edge.is_parked() {
        return;
    }
    let node = units.get(id).edge.node();
    let mut free = units.get(id).remaining_capacity();
    if free == 0 {
        // Full vehicle: citizens here stay CriticallyUnsafe and eligible for
        // the next dispatch round.
        return;
    }

    let mut picked_any = false;
    for cid in citizens.critical_sorted() {
        if free == 0 {
            break;
        }
        if citizens.get(cid).edge.node() != node {
            continue;
        }
        citizens.set_state(cid, CitizenState::Rescued, ctx.tick);
        citizens.get_mut(cid).edge = units.get(id).edge;
        units.get_mut(id).carrying.push(cid);
        free -= 1;
        picked_any = true;
    }

    if picked_any {
        debug_assert!(units.get(id).carrying.len() <= units.get(id).capacity);
        let unit = units.get_mut(id);
        unit.target = None;
        unit.path.clear();
        units.set_state(id, UnitState::Carrying);
        plan_to_safe_zone(units, id, ctx);
        // Passengers track the vehicle from the moment they board.
        mirror_carried(units, citizens, id);
    }
}

/// Route the unit to the nearest safe zone under the configured policy.
/// Leaves the path empty (stalled, observable in snapshots) when nothing is
/// reachable.
fn plan_to_safe_zone(units: &mut UnitStore, id: UnitId, ctx: &StepCtx<'_>) {
    let node = units.get(id).edge.node();
    match nearest_with_policy(ctx.router, ctx.network, node, ctx.zones.as_slice(), ctx.policy) {
        Ok(route) => {
            let unit = units.get_mut(id);
            unit.path = route.nodes;
            if let Some(&next) = unit.path.get(1) {
                unit.edge.to = Some(next);
            }
        }
        Err(_) => {
            units.get_mut(id).path.clear();
        }
    }
}

/// Unload every carried citizen at a safe zone and return to service.
fn drop_off(units: &mut UnitStore, citizens: &mut CitizenStore, id: UnitId, ctx: &StepCtx<'_>) {
    let carried = std::mem::take(&mut units.get_mut(id).carrying);
    let node = units.get(id).edge.node();
    for cid in carried {
        citizens.set_state(cid, CitizenState::Safe, ctx.tick);
        citizens.get_mut(cid).edge = EdgePosition::at_node(node);
    }
    let unit = units.get_mut(id);
    unit.target = None;
    unit.path.clear();
    units.set_state(id, UnitState::Available);
}

/// Copy the unit's position onto its passengers.
fn mirror_carried(units: &mut UnitStore, citizens: &mut CitizenStore, id: UnitId) {
    let edge = units.get(id).edge;
    // Cheap clone: `carrying` holds at most `capacity` ids.
    for cid in units.get(id).carrying.clone() {
        citizens.get_mut(cid).edge = edge;
    }
}

// ── Dispatch entry point ──────────────────────────────────────────────────────

/// Commit `unit` to rescuing `citizen`: compute an approach path (safe
/// subgraph first, full graph per policy) and switch to `OnMission`.
///
/// Returns `false` — and leaves the unit `Available` with no target — when no
/// path exists under the policy.
pub fn assign_target(
    units: &mut UnitStore,
    unit_id: UnitId,
    citizens: &CitizenStore,
    citizen_id: CitizenId,
    network: &RoadNetwork,
    router: &dyn Router,
    policy: PathPolicy,
) -> bool {
    debug_assert_eq!(units.get(unit_id).state, UnitState::Available);

    let from = units.get(unit_id).edge.node();
    let to = citizens.get(citizen_id).edge.node();

    match route_with_policy(router, network, from, to, policy) {
        Ok(route) => {
            let unit = units.get_mut(unit_id);
            unit.target = Some(citizen_id);
            unit.path = route.nodes;
            if let Some(&next) = unit.path.get(1) {
                unit.edge.to = Some(next);
            }
            units.set_state(unit_id, UnitState::OnMission);
            true
        }
        Err(_) => {
            let unit = units.get_mut(unit_id);
            unit.target = None;
            unit.path.clear();
            false
        }
    }
}
