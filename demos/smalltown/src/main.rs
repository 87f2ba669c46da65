//! smalltown — a complete flood-response scenario on synthetic data.
//!
//! A 300 m x 300 m river town: the terrain dips into a valley, the river
//! runs deep at simulation start, a storm adds rain, and the levee surge
//! trigger fires once the channel overtops.  Citizens evacuate toward two
//! shelters on the high north edge while rescue units collect the trapped.
//!
//! Swap `build_network` and the terrain loop for real extracted data to run
//! an actual district.

mod network;

use std::path::Path;

use anyhow::Result;

use fr_core::{Point2, SimConfig, Tick};
use fr_grid::{FloodGrid, OverflowTrigger, RainBlock, RainSchedule};
use fr_network::{DijkstraRouter, GridMapping, HazardThresholds, PathPolicy};
use fr_agents::PopulationConfig;
use fr_dispatch::Assignment;
use fr_output::{CsvWriter, SimOutputObserver};
use fr_sim::{SimBuilder, SimObserver};

use network::build_network;

// ── Scenario constants ────────────────────────────────────────────────────────

const SEED: u64 = 42;
const TOTAL_TICKS: u64 = 900;
const N_CITIZENS: usize = 24;
const N_UNITS: usize = 4;

const GRID_ROWS: usize = 40;
const GRID_COLS: usize = 40;
/// The district extent the grid covers, metres.
const EXTENT_M: f64 = 300.0;
/// Terrain grid row of the valley floor.
const VALLEY_ROW: usize = 20;
/// Terrain rises this much per row away from the valley.
const VALLEY_SLOPE_M: f64 = 0.3;
/// River depth at simulation start.
const RIVER_DEPTH_M: f64 = 3.0;

// ── Observer: CSV output + console progress ───────────────────────────────────

struct ProgressObserver<W: fr_output::OutputWriter> {
    inner: SimOutputObserver<W>,
    report_every: u64,
    missions_started: usize,
}

impl<W: fr_output::OutputWriter> SimObserver for ProgressObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, assignments: &[Assignment]) {
        self.missions_started += assignments.len();
        for a in assignments {
            println!("  [{tick}] unit {} -> citizen {} ({:.0} m away)", a.unit.0, a.citizen.0, a.distance_m);
        }
        self.inner.on_tick_end(tick, assignments);
    }

    fn on_snapshot(
        &mut self,
        tick: Tick,
        grid: &fr_grid::FloodGrid,
        network: &fr_network::RoadNetwork,
        citizens: &fr_agents::CitizenStore,
        units: &fr_agents::UnitStore,
    ) {
        if tick.0.is_multiple_of(self.report_every) {
            println!(
                "[{tick}] water {:>7.1} | unsafe edges {:>2} | critical {:>2} | safe {:>2}/{}",
                grid.total_water(),
                network.unsafe_edge_count(),
                citizens.critical_count(),
                citizens.count_in_state(fr_agents::CitizenState::Safe),
                citizens.len(),
            );
        }
        self.inner.on_snapshot(tick, grid, network, citizens, units);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── Terrain & river ───────────────────────────────────────────────────────────

/// V-shaped valley: elevation grows linearly with distance from `VALLEY_ROW`.
fn build_terrain() -> Vec<f64> {
    let mut height = vec![0.0; GRID_ROWS * GRID_COLS];
    for r in 0..GRID_ROWS {
        let elevation = (r as f64 - VALLEY_ROW as f64).abs() * VALLEY_SLOPE_M;
        for c in 0..GRID_COLS {
            height[r * GRID_COLS + c] = elevation;
        }
    }
    height
}

/// The river bed: the valley row and its two neighbors, full width.
fn river_mask() -> Vec<bool> {
    let mut mask = vec![false; GRID_ROWS * GRID_COLS];
    for r in (VALLEY_ROW - 1)..=(VALLEY_ROW + 1) {
        for c in 0..GRID_COLS {
            mask[r * GRID_COLS + c] = true;
        }
    }
    mask
}

/// Rasterize the streets onto the grid: cells under a road drain twice as
/// fast.  Straight-line sampling at one point per metre is plenty at this
/// cell size.
fn road_mask(network: &fr_network::RoadNetwork, mapping: &GridMapping) -> Vec<bool> {
    let mut mask = vec![false; GRID_ROWS * GRID_COLS];
    for e in 0..network.edge_count() {
        let p = network.node_pos[network.edge_from[e].index()];
        let q = network.node_pos[network.edge_to[e].index()];
        let steps = p.distance_m(q).ceil() as usize;
        for s in 0..=steps {
            let t = s as f64 / steps.max(1) as f64;
            let sample = Point2::new(p.x + (q.x - p.x) * t, p.y + (q.y - p.y) * t);
            let (r, c) = mapping.cell_of(sample);
            mask[r * GRID_COLS + c] = true;
        }
    }
    mask
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    println!("=== smalltown flood response ===");
    println!("{N_CITIZENS} citizens | {N_UNITS} rescue units | seed {SEED}");
    println!();

    // 1. Road network and shelters on the high north edge.
    let (network, _nodes) = build_network()?;
    let west_shelter = network.snap_to_node(Point2::new(0.0, 0.0)).unwrap();
    let east_shelter = network.snap_to_node(Point2::new(300.0, 0.0)).unwrap();
    println!(
        "network: {} nodes, {} road segments, shelters at {west_shelter} / {east_shelter}",
        network.node_count(),
        network.edge_count() / 2,
    );

    // 2. Terrain, river, and the street drainage mask.
    let mapping = GridMapping::new(
        fr_core::BoundingBox::of(&[Point2::new(0.0, 0.0), Point2::new(EXTENT_M, EXTENT_M)])
            .unwrap(),
        GRID_ROWS,
        GRID_COLS,
    );
    let mut grid = FloodGrid::new(GRID_ROWS, GRID_COLS, build_terrain())?;
    grid.set_fast_flow_mask(road_mask(&network, &mapping))?;
    grid.set_water_rect(VALLEY_ROW - 1, VALLEY_ROW + 2, 0, GRID_COLS, RIVER_DEPTH_M);
    println!("terrain: {GRID_ROWS}x{GRID_COLS} cells, river seeded at {RIVER_DEPTH_M} m");

    // 3. Storm: a compressed version of the 2010 scenario profile.
    let storm = RainSchedule::from_blocks(
        &[
            RainBlock::new(0.05, 6.0),  // first front
            RainBlock::new(0.10, 3.0),  // steady rain
            RainBlock::new(0.025, 15.0), // cloudburst
            RainBlock::new(0.05, 4.0),  // tapering off
        ],
        1,
    )?;
    println!("storm: {} ticks, {:.1} mm total", storm.len_ticks(), storm.total_m() * 1000.0);

    // 4. Levee surge: once the channel runs deeper than 1.5 m on average,
    //    the flow coefficient jumps and the banks take 0.4 m at once.
    let surge = OverflowTrigger::new(river_mask(), 1.5, 0.25, 0.4)?;

    let config = SimConfig {
        start_unix_secs: 1_700_000_000,
        tick_duration_secs: 1,
        total_ticks: TOTAL_TICKS,
        seed: SEED,
        flood_interval_ticks: 5,
        dispatch_interval_ticks: 5,
        output_interval_ticks: 5,
        stop_when_settled: true,
    };

    let mut sim = SimBuilder::new(config.clone(), grid, network, DijkstraRouter)
        .safe_zones(vec![west_shelter, east_shelter])
        .transfer_coefficient(0.15)
        .rain(storm)
        .overflow(surge)
        .thresholds(HazardThresholds::default())
        .path_policy(PathPolicy::SafeThenFull)
        .mapping(mapping)
        .population_config(PopulationConfig {
            n_citizens: N_CITIZENS,
            n_units: N_UNITS,
            ..Default::default()
        })
        .build()?;

    // 5. Run with CSV output under out/.
    let out_dir = Path::new("out");
    std::fs::create_dir_all(out_dir)?;
    let writer = CsvWriter::new(out_dir)?;
    let mut observer = ProgressObserver {
        inner: SimOutputObserver::new(writer, &config),
        report_every: 50,
        missions_started: 0,
    };

    println!();
    sim.run(&mut observer);
    if let Some(err) = observer.inner.take_error() {
        return Err(err.into());
    }

    // 6. Terminal report.
    println!();
    println!("{}", sim.report());
    println!("missions started: {}", observer.missions_started);
    println!("levee surge fired: {}", sim.engine.overflow_fired());
    println!("output written to {}", out_dir.display());

    Ok(())
}
