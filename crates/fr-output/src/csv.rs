//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `citizen_snapshots.csv`
//! - `unit_snapshots.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{CitizenSnapshotRow, OutputResult, TickSummaryRow, UnitSnapshotRow};

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    citizens:  Writer<File>,
    units:     Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut citizens = Writer::from_path(dir.join("citizen_snapshots.csv"))?;
        citizens.write_record([
            "citizen_id", "tick", "state", "mode", "from_node", "to_node", "progress",
            "speed_mps",
        ])?;

        let mut units = Writer::from_path(dir.join("unit_snapshots.csv"))?;
        units.write_record([
            "unit_id", "tick", "state", "from_node", "to_node", "progress", "carrying",
            "target",
        ])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record([
            "tick", "unix_time_secs", "total_water_m", "flooded_cells", "unsafe_edges",
            "critically_unsafe", "safe_citizens", "available_units", "new_assignments",
        ])?;

        Ok(Self { citizens, units, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_citizens(&mut self, rows: &[CitizenSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.citizens.write_record(&[
                row.citizen_id.to_string(),
                row.tick.to_string(),
                row.state.to_string(),
                row.mode.to_string(),
                row.from_node.to_string(),
                row.to_node.to_string(),
                format!("{:.4}", row.progress),
                format!("{:.3}", row.speed_mps),
            ])?;
        }
        Ok(())
    }

    fn write_units(&mut self, rows: &[UnitSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.units.write_record(&[
                row.unit_id.to_string(),
                row.tick.to_string(),
                row.state.to_string(),
                row.from_node.to_string(),
                row.to_node.to_string(),
                format!("{:.4}", row.progress),
                row.carrying.to_string(),
                row.target.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.unix_time_secs.to_string(),
            format!("{:.4}", row.total_water_m),
            row.flooded_cells.to_string(),
            row.unsafe_edges.to_string(),
            row.critically_unsafe.to_string(),
            row.safe_citizens.to_string(),
            row.available_units.to_string(),
            row.new_assignments.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.citizens.flush()?;
        self.units.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
