//! Unit tests for fr-grid.

#[cfg(test)]
mod grid {
    use crate::{FloodGrid, GridError};

    #[test]
    fn rejects_empty_shape() {
        assert!(matches!(FloodGrid::new(0, 5, vec![]), Err(GridError::EmptyGrid)));
        assert!(matches!(FloodGrid::new(5, 0, vec![]), Err(GridError::EmptyGrid)));
    }

    #[test]
    fn rejects_shape_mismatch() {
        let result = FloodGrid::new(3, 3, vec![0.0; 8]);
        assert!(matches!(result, Err(GridError::ShapeMismatch { got: 8, .. })));
    }

    #[test]
    fn fast_flow_mask_must_match_shape() {
        let mut grid = FloodGrid::flat(3, 3).unwrap();
        assert!(grid.set_fast_flow_mask(vec![true; 4]).is_err());
        assert!(grid.set_fast_flow_mask(vec![true; 9]).is_ok());
        assert!(grid.is_fast_flow(1, 1));
    }

    #[test]
    fn set_water_clamps_negative() {
        let mut grid = FloodGrid::flat(2, 2).unwrap();
        grid.set_water(0, 0, -3.0);
        assert_eq!(grid.water_at(0, 0), 0.0);
        grid.add_water(0, 0, 1.0);
        grid.add_water(0, 0, -5.0);
        assert_eq!(grid.water_at(0, 0), 0.0);
    }

    #[test]
    fn rect_seeding_and_aggregates() {
        let mut grid = FloodGrid::flat(4, 4).unwrap();
        grid.set_water_rect(1, 3, 1, 3, 2.0); // 2x2 block
        assert_eq!(grid.total_water(), 8.0);
        assert_eq!(grid.flooded_cells(0.5), 4);
        assert_eq!(grid.flooded_cells(3.0), 0);
        assert_eq!(grid.level_at(1, 1), 2.0);
    }

    #[test]
    fn rect_seeding_clips_at_edges() {
        let mut grid = FloodGrid::flat(3, 3).unwrap();
        grid.set_water_rect(2, 10, 2, 10, 1.0); // overshoots — only (2,2) wet
        assert_eq!(grid.total_water(), 1.0);
    }

    #[test]
    fn mean_depth_over_mask() {
        let mut grid = FloodGrid::flat(2, 2).unwrap();
        grid.set_water(0, 0, 2.0);
        grid.set_water(0, 1, 4.0);
        let mask = vec![true, true, false, false];
        assert_eq!(grid.mean_depth_over(&mask), 3.0);
        assert_eq!(grid.mean_depth_over(&[false; 4]), 0.0);
    }
}

#[cfg(test)]
mod engine {
    use crate::{FloodEngine, FloodGrid, GridError, OverflowTrigger};

    #[test]
    fn rejects_non_positive_k() {
        assert!(matches!(FloodEngine::new(0.0), Err(GridError::NonPositiveCoefficient(_))));
        assert!(matches!(FloodEngine::new(-0.1), Err(GridError::NonPositiveCoefficient(_))));
        assert!(FloodEngine::new(f64::NAN).is_err());
        assert!(FloodEngine::new(0.15).is_ok());
    }

    /// Flat 5x5, one wet corner cell, k = 0.15, no rain.
    /// Water must spread outward and total mass must never grow.
    #[test]
    fn corner_cell_spreads_outward() {
        let mut grid = FloodGrid::flat(5, 5).unwrap();
        grid.set_water(0, 0, 1.0);
        let mut engine = FloodEngine::new(0.15).unwrap();

        let initial = grid.total_water();
        for step in 0..15 {
            engine.advance(&mut grid, 0.0);
            assert!(
                grid.total_water() <= initial + 1e-9,
                "mass grew at step {step}: {}",
                grid.total_water()
            );
            if step == 2 {
                // All three in-bounds neighbors of the corner are wet by now.
                assert!(grid.water_at(0, 1) > 0.0);
                assert!(grid.water_at(1, 0) > 0.0);
                assert!(grid.water_at(1, 1) > 0.0);
            }
        }
        // The far corner receives something eventually on a flat grid.
        assert!(grid.water_at(4, 4) > 0.0);
    }

    #[test]
    fn mass_conserved_without_rain() {
        let mut grid = FloodGrid::flat(8, 8).unwrap();
        grid.set_water_rect(2, 5, 3, 6, 3.0);
        let mut engine = FloodEngine::new(0.12).unwrap();

        let initial = grid.total_water();
        for _ in 0..25 {
            engine.advance(&mut grid, 0.0);
        }
        assert!((grid.total_water() - initial).abs() < 1e-9);
    }

    #[test]
    fn rainfall_adds_exactly_rain_times_cells() {
        let mut grid = FloodGrid::flat(4, 4).unwrap();
        grid.set_water(1, 1, 1.0);
        let mut engine = FloodEngine::new(0.1).unwrap();

        let before = grid.total_water();
        engine.advance(&mut grid, 0.01);
        let expected = before + 0.01 * grid.cell_count() as f64;
        assert!((grid.total_water() - expected).abs() < 1e-12);
    }

    #[test]
    fn never_goes_negative_under_aggressive_k() {
        // A single towering column with k = 0.25: desired outflow far exceeds
        // the available water, exercising the flux limiter.
        let mut grid = FloodGrid::flat(7, 7).unwrap();
        grid.set_water(3, 3, 50.0);
        let mut engine = FloodEngine::new(0.25).unwrap();

        for _ in 0..50 {
            engine.advance(&mut grid, 0.0);
            assert!(grid.water().iter().all(|&w| w >= 0.0));
        }
    }

    #[test]
    fn water_does_not_climb_higher_ground() {
        // Terrain step: left half at 0 m, right half at 10 m.  A shallow pool
        // on the low side must not creep uphill.
        let mut height = vec![0.0; 5 * 5];
        for r in 0..5 {
            for c in 3..5 {
                height[r * 5 + c] = 10.0;
            }
        }
        let mut grid = FloodGrid::new(5, 5, height).unwrap();
        grid.set_water(2, 1, 1.0);
        let mut engine = FloodEngine::new(0.15).unwrap();

        for _ in 0..20 {
            engine.advance(&mut grid, 0.0);
        }
        for r in 0..5 {
            for c in 3..5 {
                assert_eq!(grid.water_at(r, c), 0.0, "water climbed to ({r},{c})");
            }
        }
    }

    #[test]
    fn fast_flow_doubles_transfer() {
        // k small enough that the limiter stays inactive on both grids.
        let mut slow = FloodGrid::flat(5, 5).unwrap();
        slow.set_water(2, 2, 1.0);

        let mut fast = FloodGrid::flat(5, 5).unwrap();
        fast.set_water(2, 2, 1.0);
        let mut mask = vec![false; 25];
        mask[2 * 5 + 2] = true;
        fast.set_fast_flow_mask(mask).unwrap();

        let mut engine = FloodEngine::new(0.05).unwrap();
        engine.advance(&mut slow, 0.0);
        engine.advance(&mut fast, 0.0);

        let gained_slow = slow.water_at(2, 3);
        let gained_fast = fast.water_at(2, 3);
        assert!(gained_slow > 0.0);
        assert!((gained_fast - 2.0 * gained_slow).abs() < 1e-12);
    }

    #[test]
    fn step_is_deterministic() {
        let build = || {
            let mut g = FloodGrid::flat(6, 6).unwrap();
            g.set_water_rect(1, 3, 1, 3, 2.5);
            g
        };
        let mut a = build();
        let mut b = build();
        let mut ea = FloodEngine::new(0.15).unwrap();
        let mut eb = FloodEngine::new(0.15).unwrap();
        for _ in 0..10 {
            ea.advance(&mut a, 0.001);
            eb.advance(&mut b, 0.001);
        }
        assert_eq!(a.water(), b.water());
    }

    #[test]
    fn overflow_trigger_fires_once() {
        let mut grid = FloodGrid::flat(5, 5).unwrap();
        let mut mask = vec![false; 25];
        mask[2 * 5 + 2] = true; // river = center cell

        let trigger = OverflowTrigger::new(mask, 1.5, 0.25, 0.4).unwrap();
        let mut engine = FloodEngine::new(0.1)
            .unwrap()
            .with_overflow(trigger, &grid)
            .unwrap();

        // Below the trigger level: nothing happens.
        grid.set_water(2, 2, 0.5);
        engine.advance(&mut grid, 0.0);
        assert!(!engine.overflow_fired());
        assert_eq!(engine.k(), 0.1);

        // Push the river over the levee.
        grid.set_water(2, 2, 10.0);
        engine.advance(&mut grid, 0.0);
        assert!(engine.overflow_fired());
        assert_eq!(engine.k(), 0.25);
        // The ring around the river received the surge (on top of diffusion).
        assert!(grid.water_at(1, 1) >= 0.4);
        assert!(grid.water_at(3, 3) >= 0.4);

        // Fires at most once: a second deep step changes nothing further.
        let k_after = engine.k();
        engine.advance(&mut grid, 0.0);
        assert!(engine.overflow_fired());
        assert_eq!(engine.k(), k_after);
    }

    #[test]
    fn overflow_mask_must_match_grid() {
        let grid = FloodGrid::flat(4, 4).unwrap();
        let trigger = OverflowTrigger::new(vec![false; 9], 1.0, 0.2, 0.1).unwrap();
        let result = FloodEngine::new(0.1).unwrap().with_overflow(trigger, &grid);
        assert!(matches!(result, Err(GridError::ShapeMismatch { .. })));
    }
}

#[cfg(test)]
mod rain {
    use fr_core::Tick;

    use crate::{GridError, RainBlock, RainSchedule};

    #[test]
    fn expands_blocks_to_ticks() {
        // 10-minute ticks: 6 h of 6 mm/h = 36 ticks of 1 mm each.
        let schedule =
            RainSchedule::from_blocks(&[RainBlock::new(6.0, 6.0)], 600).unwrap();
        assert_eq!(schedule.len_ticks(), 36);
        let per_tick = schedule.rain_m_at(Tick(0));
        assert!((per_tick - 0.001).abs() < 1e-12);
        assert!((schedule.total_m() - 0.036).abs() < 1e-12);
    }

    #[test]
    fn partial_blocks_round_up() {
        // 0.05 h at 600 s ticks = 0.3 ticks → 1 tick.
        let schedule =
            RainSchedule::from_blocks(&[RainBlock::new(0.05, 3.0)], 600).unwrap();
        assert_eq!(schedule.len_ticks(), 1);
    }

    #[test]
    fn dry_after_storm_ends() {
        let schedule =
            RainSchedule::from_blocks(&[RainBlock::new(1.0, 10.0)], 3_600).unwrap();
        assert_eq!(schedule.len_ticks(), 1);
        assert!(schedule.rain_m_at(Tick(0)) > 0.0);
        assert_eq!(schedule.rain_m_at(Tick(1)), 0.0);
        assert_eq!(schedule.rain_m_at(Tick(1_000)), 0.0);
    }

    #[test]
    fn rejects_negative_intensity() {
        let result = RainSchedule::from_blocks(&[RainBlock::new(1.0, -2.0)], 600);
        assert!(matches!(result, Err(GridError::InvalidRainfall(_))));
    }

    #[test]
    fn none_is_always_dry() {
        let schedule = RainSchedule::none();
        assert_eq!(schedule.rain_m_at(Tick(0)), 0.0);
        assert_eq!(schedule.total_m(), 0.0);
    }

    #[test]
    fn multi_block_storm_total() {
        // The 2010 Krakow scenario shape: four blocks, ~141 mm total.
        let blocks = [
            RainBlock::new(6.0, 6.0),
            RainBlock::new(12.0, 3.0),
            RainBlock::new(3.0, 15.0),
            RainBlock::new(6.0, 4.0),
        ];
        let schedule = RainSchedule::from_blocks(&blocks, 600).unwrap();
        assert!((schedule.total_m() - 0.141).abs() < 1e-9);
    }
}
