//! Wall-clock accounting of tick phases.

use anyhow::{Context, Result};
use hatchery_world::Phase;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Accumulated timings of one phase, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseTiming {
    pub count: u64,
    pub total_secs: f64,
    pub min_secs: f64,
    pub max_secs: f64,
}

impl PhaseTiming {
    fn first(secs: f64) -> Self {
        Self {
            count: 1,
            total_secs: secs,
            min_secs: secs,
            max_secs: secs,
        }
    }

    fn add(&mut self, secs: f64) {
        self.count += 1;
        self.total_secs += secs;
        self.min_secs = self.min_secs.min(secs);
        self.max_secs = self.max_secs.max(secs);
    }

    pub fn mean_secs(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_secs / self.count as f64
        }
    }
}

#[derive(Debug, Default)]
pub struct PhaseProfile {
    phases: BTreeMap<Phase, PhaseTiming>,
}

#[derive(Serialize)]
struct ProfileEntry<'a> {
    phase: &'a str,
    #[serde(flatten)]
    timing: PhaseTiming,
    mean_secs: f64,
}

impl PhaseProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, phase: Phase, elapsed: Duration) {
        let secs = elapsed.as_secs_f64();
        self.phases
            .entry(phase)
            .and_modify(|timing| timing.add(secs))
            .or_insert_with(|| PhaseTiming::first(secs));
    }

    pub fn get(&self, phase: Phase) -> Option<&PhaseTiming> {
        self.phases.get(&phase)
    }

    /// Phases in tick order, as JSON.
    pub fn to_json(&self) -> Result<String> {
        let entries: Vec<ProfileEntry<'_>> = self
            .phases
            .iter()
            .map(|(phase, timing)| ProfileEntry {
                phase: phase.name(),
                timing: *timing,
                mean_secs: timing.mean_secs(),
            })
            .collect();
        serde_json::to_string_pretty(&entries).context("Failed to serialize phase profile")
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write profile to {}", path.display()))?;

        for (phase, timing) in &self.phases {
            info!(
                histogram_name = "phase_seconds",
                histogram_value = timing.total_secs,
                phase = phase.name(),
                count = timing.count,
                "Histogram metric"
            );
        }
        info!(path = %path.display(), "Phase profile written");
        Ok(())
    }
}
