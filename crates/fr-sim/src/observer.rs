//! Simulation observer trait for progress reporting and data collection.

use fr_agents::{CitizenStore, UnitStore};
use fr_core::Tick;
use fr_dispatch::Assignment;
use fr_grid::FloodGrid;
use fr_network::RoadNetwork;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Snapshot callbacks receive read-only
/// views of the full world state — everything the external visualization and
/// logging collaborators need, without the sim knowing about any format.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, assignments: &[Assignment]) {
///         if tick.0 % self.interval == 0 {
///             println!("tick {tick}: {} new missions", assignments.len());
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick with the assignments made during it
    /// (empty on non-dispatch ticks).
    fn on_tick_end(&mut self, _tick: Tick, _assignments: &[Assignment]) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`).
    fn on_snapshot(
        &mut self,
        _tick:     Tick,
        _grid:     &FloodGrid,
        _network:  &RoadNetwork,
        _citizens: &CitizenStore,
        _units:    &UnitStore,
    ) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
