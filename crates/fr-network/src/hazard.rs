//! Depth sampling and edge-safety derivation.
//!
//! This is the only code that writes `node_depth_m`, `node_on_safe_ground`,
//! and `edge_safe`.  It is a pure function of the current grid and graph
//! topology: given identical depth fields it always produces identical flags,
//! which the end-of-run report and the routing layer both rely on.

use fr_grid::FloodGrid;

use crate::{GridMapping, NetworkError, NetworkResult, RoadNetwork};

/// Depth thresholds for the two hazard decisions.
///
/// The source scenarios disagreed on the numbers (0.5 m in some, 3 m in
/// another) — they are tuning parameters, so both live here as configuration.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HazardThresholds {
    /// Above this depth a node's ground counts as critically flooded: a
    /// citizen standing there can no longer self-evacuate.
    pub critical_depth_m: f64,

    /// An edge is unsafe when either endpoint is deeper than this.
    pub safe_depth_m: f64,
}

impl Default for HazardThresholds {
    fn default() -> Self {
        Self { critical_depth_m: 0.5, safe_depth_m: 3.0 }
    }
}

impl HazardThresholds {
    pub fn validate(&self) -> NetworkResult<()> {
        for t in [self.critical_depth_m, self.safe_depth_m] {
            if !t.is_finite() || t <= 0.0 {
                return Err(NetworkError::InvalidThreshold(t));
            }
        }
        Ok(())
    }
}

/// Re-derive all hazard state from the current water field.
///
/// Per node: sample `water` at the node's (clamped) grid cell into
/// `node_depth_m` and set `on_safe_ground`.  Per edge: `safe` iff the deeper
/// endpoint is at most `safe_depth_m` under water.
pub fn refresh_hazard(
    network: &mut RoadNetwork,
    grid: &FloodGrid,
    mapping: &GridMapping,
    thresholds: &HazardThresholds,
) {
    for i in 0..network.node_count() {
        let (r, c) = mapping.cell_of(network.node_pos[i]);
        let depth = grid.water_at(r, c);
        network.node_depth_m[i] = depth;
        network.node_on_safe_ground[i] = depth <= thresholds.critical_depth_m;
    }

    for e in 0..network.edge_count() {
        let du = network.node_depth_m[network.edge_from[e].index()];
        let dv = network.node_depth_m[network.edge_to[e].index()];
        network.edge_safe[e] = du.max(dv) <= thresholds.safe_depth_m;
    }
}
