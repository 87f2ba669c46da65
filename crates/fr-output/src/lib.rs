//! `fr-output` — bridges the sim's observer hooks to tabular output files.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`row`]      | Plain data rows: citizen/unit snapshots, tick summaries   |
//! | [`writer`]   | The `OutputWriter` trait implemented by all backends      |
//! | [`csv`]      | CSV backend (three files per run)                         |
//! | [`observer`] | `SimOutputObserver<W>` — a `SimObserver` that writes rows |
//! | [`error`]    | `OutputError`, `OutputResult<T>`                          |
//!
//! Raster persistence (full water-field dumps) stays with the external data
//! pipeline; these writers cover the per-tick agent/safety/summary record the
//! visualization side consumes.

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{CitizenSnapshotRow, TickSummaryRow, UnitSnapshotRow};
pub use writer::OutputWriter;
