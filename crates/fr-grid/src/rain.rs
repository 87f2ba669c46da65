//! Piecewise-constant rainfall scenarios.
//!
//! A storm is described as blocks of `(hours, mm_per_hour)`; the schedule
//! expands them into a per-tick series of metres of water column, using the
//! usual conversion `mm/h → m/tick = mm / 1000 * tick_hours`.  Beyond the
//! last block the schedule returns 0 (the storm has passed).

use fr_core::Tick;

use crate::{GridError, GridResult};

/// One constant-intensity stretch of a storm.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RainBlock {
    pub hours: f64,
    pub mm_per_hour: f64,
}

impl RainBlock {
    pub fn new(hours: f64, mm_per_hour: f64) -> Self {
        Self { hours, mm_per_hour }
    }
}

/// Expanded per-tick rainfall series.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RainSchedule {
    per_tick_m: Vec<f64>,
}

impl RainSchedule {
    /// A schedule with no rain at all.
    pub fn none() -> Self {
        Self { per_tick_m: Vec::new() }
    }

    /// Expand `blocks` into a per-tick series at the given tick resolution.
    ///
    /// Block durations round up to whole ticks so no part of a storm is lost.
    pub fn from_blocks(blocks: &[RainBlock], tick_duration_secs: u32) -> GridResult<Self> {
        let tick_hours = tick_duration_secs as f64 / 3_600.0;
        let mut per_tick_m = Vec::new();

        for block in blocks {
            if !block.mm_per_hour.is_finite() || block.mm_per_hour < 0.0 {
                return Err(GridError::InvalidRainfall(block.mm_per_hour));
            }
            if !block.hours.is_finite() || block.hours < 0.0 {
                return Err(GridError::InvalidRainfall(block.hours));
            }
            let ticks = (block.hours / tick_hours).ceil() as u64;
            let m_per_tick = block.mm_per_hour / 1_000.0 * tick_hours;
            per_tick_m.extend(std::iter::repeat(m_per_tick).take(ticks as usize));
        }

        Ok(Self { per_tick_m })
    }

    /// Rainfall (metres) falling during `tick`.  0 after the storm ends.
    #[inline]
    pub fn rain_m_at(&self, tick: Tick) -> f64 {
        self.per_tick_m.get(tick.0 as usize).copied().unwrap_or(0.0)
    }

    /// Length of the storm in ticks.
    #[inline]
    pub fn len_ticks(&self) -> u64 {
        self.per_tick_m.len() as u64
    }

    /// Total water column the storm deposits on one cell, metres.
    pub fn total_m(&self) -> f64 {
        self.per_tick_m.iter().sum()
    }
}
