//! The `Sim` struct and its tick loop.

use fr_agents::{build_departures, step_entity, CitizenStore, Entity, StepCtx, UnitStore};
use fr_core::{AgentRng, SimClock, SimConfig, Tick};
use fr_dispatch::{Assignment, DispatchCoordinator};
use fr_grid::{FloodEngine, FloodGrid, RainSchedule};
use fr_network::{
    refresh_hazard, GridMapping, HazardThresholds, PathPolicy, RoadNetwork, Router, SafeZones,
};

use crate::report::TerminalReport;
use crate::SimObserver;

/// The main simulation runner.
///
/// Holds all world state and drives the three-phase tick loop (flood →
/// dispatch → agents).  Create via [`SimBuilder`][crate::SimBuilder]; the
/// builder performs every fail-fast validation so a constructed `Sim` runs to
/// completion without errors.
pub struct Sim<R: Router> {
    /// Global configuration (total ticks, seed, cadences, …).
    pub config: SimConfig,

    /// Simulation clock — tracks the current tick and maps to wall time.
    pub clock: SimClock,

    // ── Flood state ───────────────────────────────────────────────────────
    pub grid: FloodGrid,
    pub engine: FloodEngine,
    pub rain: RainSchedule,

    /// Rainfall accumulated since the last solver step (the solver may run
    /// on a coarser cadence than the tick clock).
    rain_accum_m: f64,

    // ── Network state ─────────────────────────────────────────────────────
    pub network: RoadNetwork,
    pub mapping: GridMapping,
    pub zones: SafeZones,
    pub thresholds: HazardThresholds,
    pub policy: PathPolicy,

    // ── Populations ───────────────────────────────────────────────────────
    pub citizens: CitizenStore,
    pub units: UnitStore,
    /// Fixed step order: units first, then citizens, in creation order.
    pub entities: Vec<Entity>,
    /// Per-citizen RNGs, indexed by `CitizenId`.
    pub citizen_rngs: Vec<AgentRng>,

    // ── Coordination ──────────────────────────────────────────────────────
    pub dispatcher: DispatchCoordinator,
    pub router: R,
}

impl<R: Router> Sim<R> {
    /// Crate-internal constructor used by `SimBuilder`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: SimConfig,
        grid: FloodGrid,
        engine: FloodEngine,
        rain: RainSchedule,
        network: RoadNetwork,
        mapping: GridMapping,
        zones: SafeZones,
        thresholds: HazardThresholds,
        policy: PathPolicy,
        citizens: CitizenStore,
        units: UnitStore,
        entities: Vec<Entity>,
        citizen_rngs: Vec<AgentRng>,
        router: R,
    ) -> Self {
        let clock = config.make_clock();
        let dispatcher = DispatchCoordinator::new(config.dispatch_interval_ticks);
        Self {
            config,
            clock,
            grid,
            engine,
            rain,
            rain_accum_m: 0.0,
            network,
            mapping,
            zones,
            thresholds,
            policy,
            citizens,
            units,
            entities,
            citizen_rngs,
            dispatcher,
            router,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current tick to `config.end_tick()` (or until every
    /// citizen is safe, when `stop_when_settled` is set).
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) {
        loop {
            let now = self.clock.current_tick;
            if now >= self.config.end_tick() {
                break;
            }
            if self.config.stop_when_settled && self.citizens.all_safe() {
                break;
            }

            observer.on_tick_start(now);
            let assignments = self.process_tick(now);
            observer.on_tick_end(now, &assignments);
            if self.snapshot_due(now) {
                observer.on_snapshot(now, &self.grid, &self.network, &self.citizens, &self.units);
            }

            self.clock.advance();
        }
        observer.on_sim_end(self.clock.current_tick);
    }

    /// Run exactly `n` ticks from the current position, ignoring `end_tick`
    /// and the settled check.  Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            let now = self.clock.current_tick;
            observer.on_tick_start(now);
            let assignments = self.process_tick(now);
            observer.on_tick_end(now, &assignments);
            if self.snapshot_due(now) {
                observer.on_snapshot(now, &self.grid, &self.network, &self.citizens, &self.units);
            }
            self.clock.advance();
        }
    }

    /// Terminal report over the current state (normally read after `run`).
    pub fn report(&self) -> TerminalReport {
        TerminalReport::build(
            self.clock.current_tick,
            &self.citizens,
            &self.units,
            &self.grid,
            &self.network,
        )
    }

    fn snapshot_due(&self, now: Tick) -> bool {
        self.config.output_interval_ticks > 0
            && now.0.is_multiple_of(self.config.output_interval_ticks)
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick(&mut self, now: Tick) -> Vec<Assignment> {
        // ── Phase 1: flood update + hazard derivation ─────────────────────
        //
        // Rain falls every tick; the solver consumes the accumulated column
        // on its own cadence.  Hazard state is re-derived after every solver
        // step and is read-only for the rest of the tick.
        self.rain_accum_m += self.rain.rain_m_at(now);
        if now.0.is_multiple_of(self.config.flood_interval_ticks) {
            let rain = std::mem::take(&mut self.rain_accum_m);
            self.engine.advance(&mut self.grid, rain);
            refresh_hazard(&mut self.network, &self.grid, &self.mapping, &self.thresholds);
        }

        // ── Phase 2: dispatch ─────────────────────────────────────────────
        let assignments = if self.dispatcher.is_due(now) {
            self.dispatcher.dispatch(
                &self.citizens,
                &mut self.units,
                &self.network,
                &self.router,
                self.policy,
            )
        } else {
            Vec::new()
        };

        // ── Phase 3: agent steps ──────────────────────────────────────────
        //
        // Explicit field borrows so the borrow checker sees disjoint access:
        // the context reads network/zones, the steps write agent stores.
        let departures = build_departures(&self.citizens);
        let ctx = StepCtx {
            network: &self.network,
            zones: &self.zones,
            router: &self.router,
            policy: self.policy,
            departures: &departures,
            tick: now,
            dt_secs: self.config.tick_duration_secs as f64,
        };

        let citizens = &mut self.citizens;
        let units = &mut self.units;
        let rngs = self.citizen_rngs.as_mut_slice();
        for &entity in &self.entities {
            step_entity(entity, citizens, units, rngs, &ctx);
        }

        assignments
    }
}
