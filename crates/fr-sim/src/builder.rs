//! Fluent builder for constructing a [`Sim`].

use fr_agents::{spawn_population, Population, PopulationConfig};
use fr_core::{BoundingBox, NodeId, SimConfig};
use fr_grid::{FloodEngine, FloodGrid, OverflowTrigger, RainSchedule};
use fr_network::{
    refresh_hazard, GridMapping, HazardThresholds, NetworkError, PathPolicy, RoadNetwork, Router,
};

use crate::{Sim, SimResult};

/// The original scenario's starting transfer coefficient.
const DEFAULT_TRANSFER_COEFFICIENT: f64 = 0.15;

/// Fluent builder for [`Sim<R>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — cadences, seed, tick duration
/// - [`FloodGrid`] — terrain + initial water
/// - [`RoadNetwork`] — from `RoadNetworkBuilder` or the data pipeline
/// - `R: Router` — the routing algorithm (e.g. `DijkstraRouter`)
/// - [`safe_zones`](Self::safe_zones) — at least one drop-off node
///
/// # Optional inputs (have defaults)
///
/// | Method                        | Default                                |
/// |-------------------------------|----------------------------------------|
/// | `.transfer_coefficient(k)`    | 0.15                                   |
/// | `.rain(schedule)`             | no rain                                |
/// | `.overflow(trigger)`          | none                                   |
/// | `.thresholds(t)`              | 0.5 m critical / 3.0 m edge            |
/// | `.path_policy(p)`             | `SafeThenFull`                         |
/// | `.mapping(m)`                 | graph bounding box fit onto the grid   |
/// | `.population_config(c)`       | 30 citizens, 5 units                   |
/// | `.population(p)`              | spawned from `population_config`       |
///
/// All fail-fast validation happens in [`build`](Self::build): cadence knobs,
/// hazard thresholds, `k > 0`, non-empty in-bounds safe zones, population
/// draw parameters.  A `Sim` that builds will run without errors.
pub struct SimBuilder<R: Router> {
    config: SimConfig,
    grid: FloodGrid,
    network: RoadNetwork,
    router: R,

    k: f64,
    rain: RainSchedule,
    overflow: Option<OverflowTrigger>,
    zone_nodes: Vec<NodeId>,
    thresholds: HazardThresholds,
    policy: PathPolicy,
    mapping: Option<GridMapping>,
    population_config: PopulationConfig,
    population: Option<Population>,
}

impl<R: Router> SimBuilder<R> {
    pub fn new(config: SimConfig, grid: FloodGrid, network: RoadNetwork, router: R) -> Self {
        Self {
            config,
            grid,
            network,
            router,
            k: DEFAULT_TRANSFER_COEFFICIENT,
            rain: RainSchedule::none(),
            overflow: None,
            zone_nodes: Vec::new(),
            thresholds: HazardThresholds::default(),
            policy: PathPolicy::SafeThenFull,
            mapping: None,
            population_config: PopulationConfig::default(),
            population: None,
        }
    }

    /// Designate the evacuation/drop-off nodes.  Required, non-empty.
    pub fn safe_zones(mut self, nodes: Vec<NodeId>) -> Self {
        self.zone_nodes = nodes;
        self
    }

    /// Flood transfer coefficient `k` (validated > 0 at build).
    pub fn transfer_coefficient(mut self, k: f64) -> Self {
        self.k = k;
        self
    }

    /// Storm scenario.  Without it the run is rain-free.
    pub fn rain(mut self, schedule: RainSchedule) -> Self {
        self.rain = schedule;
        self
    }

    /// One-shot river-overflow trigger (mask validated against the grid).
    pub fn overflow(mut self, trigger: OverflowTrigger) -> Self {
        self.overflow = Some(trigger);
        self
    }

    /// Hazard depth thresholds (validated finite and positive at build).
    pub fn thresholds(mut self, thresholds: HazardThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Fallback behavior when the safe subgraph has no path.
    pub fn path_policy(mut self, policy: PathPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the position→cell mapping.  By default the graph's bounding
    /// box is fitted onto the grid.
    pub fn mapping(mut self, mapping: GridMapping) -> Self {
        self.mapping = Some(mapping);
        self
    }

    /// Population sizes and draw parameters for the default random spawn.
    pub fn population_config(mut self, config: PopulationConfig) -> Self {
        self.population_config = config;
        self
    }

    /// Supply a hand-built population instead of spawning one — scenario
    /// tests place agents at exact nodes.
    pub fn population(mut self, population: Population) -> Self {
        self.population = Some(population);
        self
    }

    /// Validate everything and produce a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<R>> {
        self.config.validate()?;
        self.thresholds.validate()?;

        let mut engine = FloodEngine::new(self.k)?;
        if let Some(trigger) = self.overflow {
            engine = engine.with_overflow(trigger, &self.grid)?;
        }

        let zones = fr_network::SafeZones::new(self.zone_nodes, &self.network)?;

        let mapping = match self.mapping {
            Some(m) => m,
            None => {
                let bounds = BoundingBox::of(&self.network.node_pos)
                    .ok_or(NetworkError::EmptyNetwork)?;
                GridMapping::for_grid(bounds, &self.grid)
            }
        };

        let population = match self.population {
            Some(p) => p,
            None => spawn_population(&self.population_config, &self.network, self.config.seed)?,
        };

        // Derive hazard state for the initial water field so even a sim that
        // is inspected before its first tick sees consistent flags.
        let mut network = self.network;
        refresh_hazard(&mut network, &self.grid, &mapping, &self.thresholds);

        Ok(Sim::new(
            self.config,
            self.grid,
            engine,
            self.rain,
            network,
            mapping,
            zones,
            self.thresholds,
            self.policy,
            population.citizens,
            population.units,
            population.entities,
            population.citizen_rngs,
            self.router,
        ))
    }
}
