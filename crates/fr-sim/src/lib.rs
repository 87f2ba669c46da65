//! `fr-sim` — tick loop orchestrator for the flood-response simulation.
//!
//! # Tick phases
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Flood    — every flood_interval_ticks: FloodEngine::advance with the
//!                rainfall accumulated since the last solver step, then
//!                refresh_hazard re-derives node depths and edge safety.
//!   ② Dispatch — every dispatch_interval_ticks: greedy nearest-available
//!                citizen↔unit matching.
//!   ③ Agents   — every entity steps once, in the order fixed at spawn
//!                (units first, then citizens), against the tick-start
//!                graph snapshot.
//! ```
//!
//! The grid is written only in ①, the network's hazard fields only in ①, and
//! agent state only in ②/③ — a single-writer-per-phase discipline that keeps
//! the loop deterministic for a fixed seed.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let mut sim = SimBuilder::new(config, grid, network, DijkstraRouter)
//!     .safe_zones(vec![shelter])
//!     .transfer_coefficient(0.15)
//!     .population_config(PopulationConfig::default())
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! println!("{}", sim.report());
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod report;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use report::{CitizenOutcome, TerminalReport};
pub use sim::Sim;
