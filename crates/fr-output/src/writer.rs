//! The `OutputWriter` trait implemented by all backend writers.

use crate::{CitizenSnapshotRow, OutputResult, TickSummaryRow, UnitSnapshotRow};

/// Trait implemented by output backends (CSV today; the observer is generic
/// so alternatives slot in without touching the sim).
///
/// All methods are infallible from the observer's perspective — errors are
/// stored internally and retrieved with
/// [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of citizen snapshots.
    fn write_citizens(&mut self, rows: &[CitizenSnapshotRow]) -> OutputResult<()>;

    /// Write a batch of unit snapshots.
    fn write_units(&mut self, rows: &[UnitSnapshotRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
