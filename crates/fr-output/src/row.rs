//! Plain data row types written by output backends.
//!
//! `u32::MAX` in a node column means "none" (parked, no target) — the same
//! sentinel the typed IDs use.

/// A snapshot of one citizen at a given tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CitizenSnapshotRow {
    pub citizen_id: u32,
    pub tick: u64,
    pub state: &'static str,
    pub mode: &'static str,
    /// Node the citizen departed from (or stands at).
    pub from_node: u32,
    /// Destination node; `u32::MAX` while parked.
    pub to_node: u32,
    pub progress: f64,
    pub speed_mps: f64,
}

/// A snapshot of one rescue unit at a given tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitSnapshotRow {
    pub unit_id: u32,
    pub tick: u64,
    pub state: &'static str,
    pub from_node: u32,
    /// Destination node; `u32::MAX` while parked.
    pub to_node: u32,
    pub progress: f64,
    /// Citizens on board.
    pub carrying: u32,
    /// Target citizen; `u32::MAX` if none.
    pub target: u32,
}

/// Flood/safety/population summary for one snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub tick: u64,
    pub unix_time_secs: i64,
    pub total_water_m: f64,
    /// Cells at or above 5 cm of standing water.
    pub flooded_cells: u64,
    pub unsafe_edges: u64,
    pub critically_unsafe: u64,
    pub safe_citizens: u64,
    pub available_units: u64,
    /// Assignments made by the dispatcher this tick.
    pub new_assignments: u64,
}
