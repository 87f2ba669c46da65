//! End-to-end scenario tests for the tick loop.
//!
//! Scenario fixtures pin agents to exact nodes via `SimBuilder::population`;
//! the flood cadence is stretched (`flood_interval_ticks` beyond the run)
//! where a test needs the water field to hold still after the initial step.

#[cfg(test)]
mod helpers {
    use fr_agents::{
        Citizen, CitizenStore, DecisionMode, Entity, Population, RescueUnit, UnitStore,
    };
    use fr_core::{AgentRng, CitizenId, NodeId, Point2, SimConfig, UnitId};
    use fr_network::{RoadNetwork, RoadNetworkBuilder};

    /// A --20-- B --20-- C, B --20-- D --30-- C.  Shortest A→C is 40 m.
    pub fn diamond() -> (RoadNetwork, [NodeId; 4]) {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(Point2::new(0.0, 0.0));
        let bb = b.add_node(Point2::new(20.0, 0.0));
        let c = b.add_node(Point2::new(40.0, 0.0));
        let d = b.add_node(Point2::new(20.0, 20.0));
        b.add_road(a, bb, 20.0);
        b.add_road(bb, c, 20.0);
        b.add_road(bb, d, 20.0);
        b.add_road(d, c, 30.0);
        (b.build().unwrap(), [a, bb, c, d])
    }

    /// Hand-built population: units then citizens, fixed speeds (8.0 / 1.5).
    pub fn pinned_population(
        unit_starts: &[NodeId],
        citizen_starts: &[(NodeId, DecisionMode)],
        seed: u64,
    ) -> Population {
        let units: Vec<RescueUnit> = unit_starts
            .iter()
            .map(|&n| RescueUnit::new(n, 8.0, 2))
            .collect();
        let citizens: Vec<Citizen> = citizen_starts
            .iter()
            .map(|&(n, mode)| Citizen::new(n, mode, 1.5))
            .collect();

        let mut entities: Vec<Entity> =
            (0..units.len() as u32).map(|i| Entity::Rescue(UnitId(i))).collect();
        entities.extend((0..citizens.len() as u32).map(|i| Entity::Citizen(CitizenId(i))));

        let citizen_rngs = (0..citizens.len() as u32)
            .map(|i| AgentRng::new(seed, i))
            .collect();

        Population {
            citizens: CitizenStore::new(citizens),
            units: UnitStore::new(units),
            entities,
            citizen_rngs,
        }
    }

    pub fn base_config() -> SimConfig {
        SimConfig {
            total_ticks: 1_000,
            seed: 42,
            stop_when_settled: true,
            ..SimConfig::default()
        }
    }
}

#[cfg(test)]
mod builder {
    use fr_agents::PopulationConfig;
    use fr_core::SimConfig;
    use fr_grid::FloodGrid;
    use fr_network::{DijkstraRouter, HazardThresholds};

    use super::helpers::{base_config, diamond};
    use crate::{SimBuilder, SimError};

    #[test]
    fn missing_safe_zones_fails_fast() {
        let (net, _) = diamond();
        let grid = FloodGrid::flat(5, 5).unwrap();
        let result = SimBuilder::new(base_config(), grid, net, DijkstraRouter).build();
        assert!(matches!(result, Err(SimError::Network(_))));
    }

    #[test]
    fn non_positive_k_fails_fast() {
        let (net, [_, _, c, _]) = diamond();
        let grid = FloodGrid::flat(5, 5).unwrap();
        let result = SimBuilder::new(base_config(), grid, net, DijkstraRouter)
            .safe_zones(vec![c])
            .transfer_coefficient(0.0)
            .build();
        assert!(matches!(result, Err(SimError::Grid(_))));
    }

    #[test]
    fn zero_cadence_fails_fast() {
        let (net, [_, _, c, _]) = diamond();
        let grid = FloodGrid::flat(5, 5).unwrap();
        let config = SimConfig { dispatch_interval_ticks: 0, ..base_config() };
        let result = SimBuilder::new(config, grid, net, DijkstraRouter)
            .safe_zones(vec![c])
            .build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn bad_thresholds_fail_fast() {
        let (net, [_, _, c, _]) = diamond();
        let grid = FloodGrid::flat(5, 5).unwrap();
        let result = SimBuilder::new(base_config(), grid, net, DijkstraRouter)
            .safe_zones(vec![c])
            .thresholds(HazardThresholds { critical_depth_m: -1.0, safe_depth_m: 3.0 })
            .build();
        assert!(matches!(result, Err(SimError::Network(_))));
    }

    #[test]
    fn bad_population_config_fails_fast() {
        let (net, [_, _, c, _]) = diamond();
        let grid = FloodGrid::flat(5, 5).unwrap();
        let result = SimBuilder::new(base_config(), grid, net, DijkstraRouter)
            .safe_zones(vec![c])
            .population_config(PopulationConfig { unit_capacity: 0, ..Default::default() })
            .build();
        assert!(matches!(result, Err(SimError::Population(_))));
    }

    #[test]
    fn valid_inputs_build() {
        let (net, [_, _, c, _]) = diamond();
        let grid = FloodGrid::flat(5, 5).unwrap();
        let sim = SimBuilder::new(base_config(), grid, net, DijkstraRouter)
            .safe_zones(vec![c])
            .build()
            .unwrap();
        assert_eq!(sim.citizens.len(), 30);
        assert_eq!(sim.units.len(), 5);
    }
}

#[cfg(test)]
mod scenarios {
    use fr_agents::{CitizenState, DecisionMode, UnitState};
    use fr_core::{CitizenId, SimConfig, UnitId};
    use fr_grid::FloodGrid;
    use fr_network::DijkstraRouter;

    use super::helpers::{base_config, diamond, pinned_population};
    use crate::{NoopObserver, SimBuilder};

    /// One shortest-path citizen walks A→B→C to the safe zone
    /// at C, 40 m at 1.5 m/s, and the run stops as soon as everyone is safe.
    #[test]
    fn self_evacuation_takes_the_short_route() {
        let (net, [a, _, c, _]) = diamond();
        let grid = FloodGrid::flat(5, 5).unwrap();
        let population =
            pinned_population(&[], &[(a, DecisionMode::ShortestPath)], 42);

        let mut sim = SimBuilder::new(base_config(), grid, net, DijkstraRouter)
            .safe_zones(vec![c])
            .population(population)
            .build()
            .unwrap();
        sim.run(&mut NoopObserver);

        let report = sim.report();
        assert!(report.everyone_safe());
        let outcome = &report.outcomes[0];
        // Two 20 m edges at 1.5 m/s with per-edge tick rounding: 27 ticks.
        assert_eq!(outcome.time_to_safety_ticks, Some(27));
        assert!(!outcome.was_rescued);
        // The settled check fires at the top of tick 28.
        assert_eq!(report.final_tick.0, 28);
    }

    /// A citizen trapped by deep water is dispatched to,
    /// picked up, carried to the safe zone, and the unit returns to service.
    #[test]
    fn full_rescue_cycle() {
        let (net, [a, _, c, _]) = diamond();
        let mut grid = FloodGrid::flat(5, 5).unwrap();
        // C maps to cell (0,4) of the bounding-box fit.  2 m of water:
        // critically deep for a pedestrian, not deep enough to close roads.
        grid.set_water(0, 4, 2.0);

        // Freeze the flood after the initial step so the water holds.
        let config = SimConfig { flood_interval_ticks: 100_000, ..base_config() };
        let population =
            pinned_population(&[a], &[(c, DecisionMode::Random)], 42);

        let mut sim = SimBuilder::new(config, grid, net, DijkstraRouter)
            .safe_zones(vec![a])
            .population(population)
            .build()
            .unwrap();

        // Tick 0 turns the citizen critical; tick 1 dispatches.
        sim.run_ticks(2, &mut NoopObserver);
        assert_eq!(sim.citizens.get(CitizenId(0)).state, CitizenState::CriticallyUnsafe);
        assert_eq!(sim.units.get(UnitId(0)).state, UnitState::OnMission);
        assert_eq!(sim.units.get(UnitId(0)).target, Some(CitizenId(0)));

        let mut observer = NoopObserver;
        sim.run(&mut observer);

        let report = sim.report();
        assert!(report.everyone_safe());
        let citizen = sim.citizens.get(CitizenId(0));
        assert!(citizen.rescued_tick.is_some());
        assert!(citizen.rescued_tick.unwrap() < citizen.safe_tick.unwrap());
        assert_eq!(citizen.edge.node(), a, "dropped off at the safe zone");
        let unit = sim.units.get(UnitId(0));
        assert_eq!(unit.state, UnitState::Available);
        assert!(unit.carrying.is_empty());
        assert!(unit.target.is_none());
    }

    /// Two co-located critical citizens, one capacity-2 unit —
    /// both board before the unit departs.
    #[test]
    fn capacity_two_boards_both_before_departing() {
        let (net, [a, _, c, _]) = diamond();
        let mut grid = FloodGrid::flat(5, 5).unwrap();
        grid.set_water(0, 4, 2.0);

        let config = SimConfig { flood_interval_ticks: 100_000, ..base_config() };
        let population = pinned_population(
            &[a],
            &[(c, DecisionMode::Random), (c, DecisionMode::Random)],
            42,
        );

        let mut sim = SimBuilder::new(config, grid, net, DijkstraRouter)
            .safe_zones(vec![a])
            .population(population)
            .build()
            .unwrap();
        sim.run(&mut NoopObserver);

        let report = sim.report();
        assert!(report.everyone_safe());
        let c0 = sim.citizens.get(CitizenId(0));
        let c1 = sim.citizens.get(CitizenId(1));
        assert!(c0.rescued_tick.is_some() && c1.rescued_tick.is_some());
        // One stop, one shared ride.
        assert_eq!(c0.rescued_tick, c1.rescued_tick);
        assert_eq!(c0.safe_tick, c1.safe_tick);
    }

    /// The roads to the trapped citizen are flooded shut, but
    /// a full-graph path exists — the fallback still gets the unit on
    /// mission and the rescue completes.
    #[test]
    fn flooded_roads_use_full_graph_fallback() {
        let (net, [a, _, c, _]) = diamond();
        let mut grid = FloodGrid::flat(5, 5).unwrap();
        // 10 m of water at C's cell: still ~5.5 m after the initial transfer
        // step, so both roads into C stay flagged unsafe all run.
        grid.set_water(0, 4, 10.0);

        let config = SimConfig { flood_interval_ticks: 100_000, ..base_config() };
        let population =
            pinned_population(&[a], &[(c, DecisionMode::Random)], 42);

        let mut sim = SimBuilder::new(config, grid, net, DijkstraRouter)
            .safe_zones(vec![a])
            .population(population)
            .build()
            .unwrap();

        sim.run_ticks(2, &mut NoopObserver);
        assert!(sim.network.unsafe_edge_count() > 0, "roads into C should be closed");
        assert_eq!(sim.units.get(UnitId(0)).state, UnitState::OnMission);

        sim.run(&mut NoopObserver);
        let report = sim.report();
        assert!(report.everyone_safe());
        assert!(sim.citizens.get(CitizenId(0)).rescued_tick.is_some());
    }
}

#[cfg(test)]
mod properties {
    use fr_agents::{CitizenState, PopulationConfig, UnitState};
    use fr_core::{SimConfig, Tick};
    use fr_grid::{FloodGrid, RainBlock, RainSchedule};
    use fr_network::DijkstraRouter;

    use super::helpers::diamond;
    use crate::{NoopObserver, SimBuilder, SimObserver};

    /// Checks the cross-cutting invariants on every snapshot.
    struct InvariantObserver {
        ticks_seen: usize,
    }

    impl SimObserver for InvariantObserver {
        fn on_snapshot(
            &mut self,
            _tick: Tick,
            grid: &FloodGrid,
            network: &fr_network::RoadNetwork,
            citizens: &fr_agents::CitizenStore,
            units: &fr_agents::UnitStore,
        ) {
            self.ticks_seen += 1;

            // Non-negativity.
            assert!(grid.water().iter().all(|&w| w >= 0.0));

            // Safety flags agree with the derivation rule.
            for e in 0..network.edge_count() {
                let du = network.node_depth_m[network.edge_from[e].index()];
                let dv = network.node_depth_m[network.edge_to[e].index()];
                assert_eq!(network.edge_safe[e], du.max(dv) <= 3.0);
            }

            // Capacity invariant and no duplicate active targets.
            let mut seen_targets = Vec::new();
            for (_, unit) in units.iter() {
                assert!(unit.carrying.len() <= unit.capacity);
                if matches!(unit.state, UnitState::OnMission | UnitState::Carrying) {
                    if let Some(t) = unit.target {
                        assert!(!seen_targets.contains(&t), "duplicate target {t}");
                        seen_targets.push(t);
                    }
                }
            }

            // Carried citizens mirror their unit and stay Rescued.
            for (_, unit) in units.iter() {
                for &cid in &unit.carrying {
                    assert_eq!(citizens.get(cid).state, CitizenState::Rescued);
                    assert_eq!(citizens.get(cid).edge, unit.edge);
                }
            }
        }
    }

    #[test]
    fn storm_run_holds_all_invariants() {
        let (net, [a, _, c, _]) = diamond();
        let mut grid = FloodGrid::flat(8, 8).unwrap();
        grid.set_water_rect(3, 5, 3, 5, 1.0);

        let config = SimConfig {
            total_ticks: 300,
            seed: 7,
            flood_interval_ticks: 5,
            dispatch_interval_ticks: 2,
            output_interval_ticks: 1,
            stop_when_settled: false,
            ..SimConfig::default()
        };
        let rain = RainSchedule::from_blocks(&[RainBlock::new(0.02, 15.0)], 1).unwrap();

        let mut sim = SimBuilder::new(config, grid, net, DijkstraRouter)
            .safe_zones(vec![a, c])
            .rain(rain)
            .population_config(PopulationConfig {
                n_citizens: 10,
                n_units: 2,
                ..Default::default()
            })
            .build()
            .unwrap();

        let mut observer = InvariantObserver { ticks_seen: 0 };
        sim.run(&mut observer);
        assert_eq!(observer.ticks_seen, 300);
    }

    #[test]
    fn identical_seeds_identical_outcomes() {
        let run = |seed: u64| {
            let (net, [a, _, c, _]) = diamond();
            let mut grid = FloodGrid::flat(6, 6).unwrap();
            grid.set_water_rect(0, 2, 4, 6, 1.5);
            let config = SimConfig {
                total_ticks: 200,
                seed,
                stop_when_settled: false,
                ..SimConfig::default()
            };
            let mut sim = SimBuilder::new(config, grid, net, DijkstraRouter)
                .safe_zones(vec![a])
                .population_config(PopulationConfig {
                    n_citizens: 8,
                    n_units: 2,
                    ..Default::default()
                })
                .build()
                .unwrap();
            sim.run(&mut NoopObserver);
            sim
        };

        let s1 = run(123);
        let s2 = run(123);

        assert_eq!(s1.grid.water(), s2.grid.water());
        for (a, b) in s1.citizens.iter().zip(s2.citizens.iter()) {
            assert_eq!(a.1.state, b.1.state);
            assert_eq!(a.1.edge, b.1.edge);
            assert_eq!(a.1.safe_tick, b.1.safe_tick);
        }
        for (a, b) in s1.units.iter().zip(s2.units.iter()) {
            assert_eq!(a.1.state, b.1.state);
            assert_eq!(a.1.edge, b.1.edge);
        }
    }
}
