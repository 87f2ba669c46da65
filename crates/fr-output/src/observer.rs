//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use fr_agents::{CitizenState, CitizenStore, UnitStore};
use fr_core::{NodeId, SimConfig, Tick};
use fr_dispatch::Assignment;
use fr_grid::FloodGrid;
use fr_network::RoadNetwork;
use fr_sim::SimObserver;

use crate::row::{CitizenSnapshotRow, TickSummaryRow, UnitSnapshotRow};
use crate::writer::OutputWriter;
use crate::OutputError;

/// Standing-water cutoff for the `flooded_cells` summary column, metres.
const FLOODED_CELL_MIN_DEPTH_M: f64 = 0.05;

/// A [`SimObserver`] that writes agent snapshots and tick summaries to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:             W,
    start_unix_secs:    i64,
    tick_duration_secs: u32,
    /// Assignment count from this tick's `on_tick_end`, consumed by the
    /// summary row written in the following `on_snapshot`.
    assignments_this_tick: u64,
    last_error:         Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` for wall-clock
    /// conversion.
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self {
            writer,
            start_unix_secs:    config.start_unix_secs,
            tick_duration_secs: config.tick_duration_secs,
            assignments_this_tick: 0,
            last_error:         None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn unix_time(&self, tick: Tick) -> i64 {
        self.start_unix_secs + tick.0 as i64 * self.tick_duration_secs as i64
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

fn node_column(node: Option<NodeId>) -> u32 {
    node.unwrap_or(NodeId::INVALID).0
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, _tick: Tick, assignments: &[Assignment]) {
        self.assignments_this_tick = assignments.len() as u64;
    }

    fn on_snapshot(
        &mut self,
        tick: Tick,
        grid: &FloodGrid,
        network: &RoadNetwork,
        citizens: &CitizenStore,
        units: &UnitStore,
    ) {
        let citizen_rows: Vec<CitizenSnapshotRow> = citizens
            .iter()
            .map(|(id, c)| CitizenSnapshotRow {
                citizen_id: id.0,
                tick:       tick.0,
                state:      c.state.as_str(),
                mode:       c.mode.as_str(),
                from_node:  c.edge.from.0,
                to_node:    node_column(c.edge.to),
                progress:   c.edge.progress,
                speed_mps:  c.current_speed_mps,
            })
            .collect();
        let result = self.writer.write_citizens(&citizen_rows);
        self.store_err(result);

        let unit_rows: Vec<UnitSnapshotRow> = units
            .iter()
            .map(|(id, u)| UnitSnapshotRow {
                unit_id:   id.0,
                tick:      tick.0,
                state:     u.state.as_str(),
                from_node: u.edge.from.0,
                to_node:   node_column(u.edge.to),
                progress:  u.edge.progress,
                carrying:  u.carrying.len() as u32,
                target:    u.target.map(|c| c.0).unwrap_or(u32::MAX),
            })
            .collect();
        let result = self.writer.write_units(&unit_rows);
        self.store_err(result);

        let summary = TickSummaryRow {
            tick:              tick.0,
            unix_time_secs:    self.unix_time(tick),
            total_water_m:     grid.total_water(),
            flooded_cells:     grid.flooded_cells(FLOODED_CELL_MIN_DEPTH_M) as u64,
            unsafe_edges:      network.unsafe_edge_count() as u64,
            critically_unsafe: citizens.critical_count() as u64,
            safe_citizens:     citizens.count_in_state(CitizenState::Safe) as u64,
            available_units:   units.available_count() as u64,
            new_assignments:   self.assignments_this_tick,
        };
        let result = self.writer.write_tick_summary(&summary);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
