//! Per-tick reports and population statistics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What one tick decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    /// Movers eliminated by collision
    pub killed: usize,
    /// Eggs laid
    pub laid: usize,
    /// Eggs that hatched into movers
    pub hatched: usize,
    /// Mover count after the tick
    pub movers: usize,
    /// Egg count after the tick
    pub eggs: usize,
}

/// Counters accumulated over a whole run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunTotals {
    pub ticks: u64,
    pub killed: u64,
    pub laid: u64,
    pub hatched: u64,
    pub peak_movers: usize,
    pub peak_eggs: usize,
    /// Tick of the last report in which the mover population was empty
    pub last_extinct_tick: Option<u64>,
}

impl RunTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        self.killed += report.killed as u64;
        self.laid += report.laid as u64;
        self.hatched += report.hatched as u64;
        self.peak_movers = self.peak_movers.max(report.movers);
        self.peak_eggs = self.peak_eggs.max(report.eggs);
        if report.movers == 0 {
            self.last_extinct_tick = Some(report.tick);
        }
    }

    /// Fraction of laid eggs that have hatched so far
    pub fn hatch_rate(&self) -> f64 {
        if self.laid == 0 {
            0.0
        } else {
            self.hatched as f64 / self.laid as f64
        }
    }
}

/// Snapshot of population structure at one tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopulationStats {
    pub movers: usize,
    pub eggs: usize,
    /// Eggs whose timer has run out but which are still blocked by a mover
    pub waiting_eggs: usize,
    pub mean_speed: f64,
    pub max_speed: f64,
    pub total_momentum: f64,
    /// Population count per shape hash, movers and eggs together
    pub shapes: BTreeMap<u32, usize>,
}

impl PopulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_mover(&mut self, speed: f64, momentum: f64, shape: u32) {
        // Running mean keeps this O(1) per mover.
        let n = self.movers as f64;
        self.mean_speed = (self.mean_speed * n + speed) / (n + 1.0);
        self.max_speed = self.max_speed.max(speed);
        self.total_momentum += momentum;
        self.movers += 1;
        *self.shapes.entry(shape).or_insert(0) += 1;
    }

    pub fn record_egg(&mut self, waiting: bool, shape: u32) {
        self.eggs += 1;
        if waiting {
            self.waiting_eggs += 1;
        }
        *self.shapes.entry(shape).or_insert(0) += 1;
    }

    pub fn distinct_shapes(&self) -> usize {
        self.shapes.len()
    }

    /// Most common shape and its head count
    pub fn dominant_shape(&self) -> Option<(u32, usize)> {
        self.shapes
            .iter()
            .max_by_key(|(_, &count)| count)
            .map(|(&shape, &count)| (shape, count))
    }
}
