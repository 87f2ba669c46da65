//! Synthetic road network for the smalltown scenario.
//!
//! A 4x4 street lattice over a 300 m x 300 m district.  The third row of
//! nodes sits in the river valley (y = 154 m maps to the valley row of the
//! terrain grid), so the riverside street floods first.

use fr_core::{NodeId, Point2};
use fr_network::{NetworkResult, RoadNetwork, RoadNetworkBuilder};

/// Street-grid x coordinates, metres.
const COLS_X: [f64; 4] = [0.0, 100.0, 200.0, 300.0];
/// Street-grid y coordinates, metres.  154 m is the riverside row.
const ROWS_Y: [f64; 4] = [0.0, 100.0, 154.0, 300.0];

/// Build the lattice and return it with the node grid (row-major).
pub fn build_network() -> NetworkResult<(RoadNetwork, Vec<NodeId>)> {
    let mut builder = RoadNetworkBuilder::with_capacity(16, 24);

    let mut nodes = Vec::with_capacity(16);
    for &y in &ROWS_Y {
        for &x in &COLS_X {
            nodes.push(builder.add_node(Point2::new(x, y)));
        }
    }

    let node_at = |row: usize, col: usize| nodes[row * COLS_X.len() + col];
    for row in 0..ROWS_Y.len() {
        for col in 0..COLS_X.len() {
            let here = node_at(row, col);
            if col + 1 < COLS_X.len() {
                let east = node_at(row, col + 1);
                let p = Point2::new(COLS_X[col], ROWS_Y[row]);
                let q = Point2::new(COLS_X[col + 1], ROWS_Y[row]);
                builder.add_road(here, east, p.distance_m(q));
            }
            if row + 1 < ROWS_Y.len() {
                let south = node_at(row + 1, col);
                let p = Point2::new(COLS_X[col], ROWS_Y[row]);
                let q = Point2::new(COLS_X[col], ROWS_Y[row + 1]);
                builder.add_road(here, south, p.distance_m(q));
            }
        }
    }

    let network = builder.build()?;
    Ok((network, nodes))
}
