//! Seeded population construction.
//!
//! Start positions are uniform over graph nodes — the upstream data pipeline
//! owns realistic placement, the simulation only needs agents *somewhere* on
//! the network.  All draws come from generators derived from the single run
//! seed, so a population is a pure function of `(config, network, seed)`.

use fr_core::{AgentRng, NodeId, SimRng};
use fr_network::RoadNetwork;

use crate::{
    AgentError, AgentResult, Citizen, CitizenStore, DecisionMode, Entity, RescueUnit, UnitStore,
};

/// Minimum speed an agent can be dealt, m/s.  The normal draws are clamped
/// here so an unlucky tail sample cannot park an agent forever.
const MIN_SPEED_MPS: f64 = 0.1;

/// Relative frequencies of the three citizen decision modes.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeWeights {
    pub shortest_path: f64,
    pub random: f64,
    pub follower: f64,
}

impl Default for ModeWeights {
    fn default() -> Self {
        Self { shortest_path: 0.6, random: 0.2, follower: 0.2 }
    }
}

impl ModeWeights {
    fn total(&self) -> f64 {
        self.shortest_path + self.random + self.follower
    }

    /// Draw a mode proportionally to the weights.
    fn sample(&self, rng: &mut SimRng) -> DecisionMode {
        let r = rng.gen_range(0.0..self.total());
        if r < self.shortest_path {
            DecisionMode::ShortestPath
        } else if r < self.shortest_path + self.random {
            DecisionMode::Random
        } else {
            DecisionMode::Follower
        }
    }
}

/// Population sizes and draw parameters.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PopulationConfig {
    pub n_citizens: usize,
    pub n_units: usize,

    /// Seats per rescue unit.
    pub unit_capacity: usize,

    /// Citizen walking speed: `Normal(mean, std)`, clamped positive.
    pub citizen_speed_mean_mps: f64,
    pub citizen_speed_std_mps: f64,

    /// Unit driving speed: `Normal(mean, std)`, clamped positive.
    pub unit_speed_mean_mps: f64,
    pub unit_speed_std_mps: f64,

    pub mode_weights: ModeWeights,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            n_citizens: 30,
            n_units: 5,
            unit_capacity: 2,
            citizen_speed_mean_mps: 1.5,
            citizen_speed_std_mps: 0.3,
            unit_speed_mean_mps: 8.0,
            unit_speed_std_mps: 1.0,
            mode_weights: ModeWeights::default(),
        }
    }
}

impl PopulationConfig {
    pub fn validate(&self) -> AgentResult<()> {
        if self.n_units > 0 && self.unit_capacity == 0 {
            return Err(AgentError::Config("unit_capacity must be >= 1".into()));
        }
        for (name, mean) in [
            ("citizen_speed_mean_mps", self.citizen_speed_mean_mps),
            ("unit_speed_mean_mps", self.unit_speed_mean_mps),
        ] {
            if !mean.is_finite() || mean <= 0.0 {
                return Err(AgentError::Config(format!("{name} must be > 0, got {mean}")));
            }
        }
        for (name, std) in [
            ("citizen_speed_std_mps", self.citizen_speed_std_mps),
            ("unit_speed_std_mps", self.unit_speed_std_mps),
        ] {
            if !std.is_finite() || std < 0.0 {
                return Err(AgentError::Config(format!("{name} must be >= 0, got {std}")));
            }
        }
        let w = self.mode_weights;
        for (name, v) in [
            ("shortest_path", w.shortest_path),
            ("random", w.random),
            ("follower", w.follower),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(AgentError::Config(format!(
                    "mode weight {name} must be >= 0, got {v}"
                )));
            }
        }
        if w.total() <= 0.0 {
            return Err(AgentError::Config("mode weights must not all be zero".into()));
        }
        Ok(())
    }
}

/// Everything spawned for one run.
pub struct Population {
    pub citizens: CitizenStore,
    pub units: UnitStore,
    /// Step order: units first, then citizens, both in creation order.
    pub entities: Vec<Entity>,
    /// Per-citizen RNGs, indexed by `CitizenId`.  Units are deterministic.
    pub citizen_rngs: Vec<AgentRng>,
}

/// Spawn the two populations at random graph nodes.
pub fn spawn_population(
    config: &PopulationConfig,
    network: &RoadNetwork,
    global_seed: u64,
) -> AgentResult<Population> {
    config.validate()?;

    let mut rng = SimRng::new(global_seed);
    let node_count = network.node_count() as u32;

    let mut entities = Vec::with_capacity(config.n_units + config.n_citizens);

    let mut units = Vec::with_capacity(config.n_units);
    for i in 0..config.n_units {
        let start = NodeId(rng.gen_range(0..node_count));
        let speed = rng
            .gen_normal(config.unit_speed_mean_mps, config.unit_speed_std_mps)
            .max(MIN_SPEED_MPS);
        units.push(RescueUnit::new(start, speed, config.unit_capacity));
        entities.push(Entity::Rescue(fr_core::UnitId(i as u32)));
    }

    let mut citizens = Vec::with_capacity(config.n_citizens);
    let mut citizen_rngs = Vec::with_capacity(config.n_citizens);
    for i in 0..config.n_citizens {
        let start = NodeId(rng.gen_range(0..node_count));
        let mode = config.mode_weights.sample(&mut rng);
        let speed = rng
            .gen_normal(config.citizen_speed_mean_mps, config.citizen_speed_std_mps)
            .max(MIN_SPEED_MPS);
        citizens.push(Citizen::new(start, mode, speed));
        citizen_rngs.push(AgentRng::new(global_seed, i as u32));
        entities.push(Entity::Citizen(fr_core::CitizenId(i as u32)));
    }

    Ok(Population {
        citizens: CitizenStore::new(citizens),
        units: UnitStore::new(units),
        entities,
        citizen_rngs,
    })
}
