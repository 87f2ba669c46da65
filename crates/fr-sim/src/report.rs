//! End-of-run reporting for external aggregation.

use fr_agents::{CitizenState, CitizenStore, DecisionMode, UnitState, UnitStore};
use fr_core::{CitizenId, Tick};
use fr_grid::FloodGrid;
use fr_network::RoadNetwork;

/// Final record for one citizen.
#[derive(Clone, Debug)]
pub struct CitizenOutcome {
    pub id: CitizenId,
    pub state: CitizenState,
    pub mode: DecisionMode,
    /// Ticks from start to reaching `Safe`, if they made it.
    pub time_to_safety_ticks: Option<u64>,
    /// `true` if a rescue unit carried them at some point.
    pub was_rescued: bool,
}

/// Terminal summary: per-citizen outcomes plus the aggregates the external
/// reporting collaborators consume.
#[derive(Clone, Debug)]
pub struct TerminalReport {
    pub final_tick: Tick,
    pub outcomes: Vec<CitizenOutcome>,

    // Aggregate citizen counts.
    pub safe: usize,
    pub rescued_in_transit: usize,
    pub critically_unsafe: usize,
    pub still_unsafe: usize,

    // World state at the end.
    pub units_available: usize,
    pub remaining_water: f64,
    pub unsafe_edges: usize,
}

impl TerminalReport {
    pub(crate) fn build(
        final_tick: Tick,
        citizens: &CitizenStore,
        units: &UnitStore,
        grid: &FloodGrid,
        network: &RoadNetwork,
    ) -> Self {
        let outcomes: Vec<CitizenOutcome> = citizens
            .iter()
            .map(|(id, c)| CitizenOutcome {
                id,
                state: c.state,
                mode: c.mode,
                time_to_safety_ticks: c.safe_tick.map(|t| t.0),
                was_rescued: c.rescued_tick.is_some(),
            })
            .collect();

        Self {
            final_tick,
            safe: citizens.count_in_state(CitizenState::Safe),
            rescued_in_transit: citizens.count_in_state(CitizenState::Rescued),
            critically_unsafe: citizens.count_in_state(CitizenState::CriticallyUnsafe),
            still_unsafe: citizens.count_in_state(CitizenState::Unsafe),
            units_available: units.count_in_state(UnitState::Available),
            remaining_water: grid.total_water(),
            unsafe_edges: network.unsafe_edge_count(),
            outcomes,
        }
    }

    /// Total number of citizens covered by the report.
    pub fn citizen_count(&self) -> usize {
        self.outcomes.len()
    }

    /// `true` when every citizen ended the run evacuated.
    pub fn everyone_safe(&self) -> bool {
        self.safe == self.outcomes.len()
    }

    /// Mean time-to-safety over citizens who made it, in ticks.
    pub fn mean_time_to_safety(&self) -> Option<f64> {
        let times: Vec<u64> = self
            .outcomes
            .iter()
            .filter_map(|o| o.time_to_safety_ticks)
            .collect();
        if times.is_empty() {
            return None;
        }
        Some(times.iter().sum::<u64>() as f64 / times.len() as f64)
    }
}

impl std::fmt::Display for TerminalReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== terminal report ({} ticks) ===", self.final_tick.0)?;
        writeln!(
            f,
            "citizens: {} safe / {} rescued-in-transit / {} critical / {} unsafe",
            self.safe, self.rescued_in_transit, self.critically_unsafe, self.still_unsafe
        )?;
        writeln!(f, "units available: {}", self.units_available)?;
        writeln!(
            f,
            "flood: {:.1} m total water remaining, {} unsafe edges",
            self.remaining_water, self.unsafe_edges
        )?;
        match self.mean_time_to_safety() {
            Some(mean) => writeln!(f, "mean time to safety: {mean:.1} ticks"),
            None => writeln!(f, "mean time to safety: n/a"),
        }
    }
}
