//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::geometry::Torus;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use tracing::debug;

/// World geometry parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the toroidal world
    pub width: f64,
    /// Height of the toroidal world
    pub height: f64,
    /// Radius shared by every core and limb circle
    pub core_radius: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 600.0,
            core_radius: 25.0,
        }
    }
}

impl WorldConfig {
    pub fn torus(&self) -> Torus {
        Torus::new(self.width, self.height)
    }
}

/// Reproduction timers, in ticks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Ticks between two eggs laid by the same mover
    pub laying_period: u32,
    /// Ticks an egg incubates before it tries to hatch
    pub incubation_period: u32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            laying_period: 20,
            incubation_period: 20,
        }
    }
}

/// Mover kinematics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Upper bound of the uniformly drawn speed of a new mover
    pub initial_speed: f64,
    /// Speed added along the heading every tick
    pub acceleration: f64,
    /// Bound of the uniform heading perturbation applied every tick (radians)
    pub rotation_angle: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            initial_speed: 10.0,
            acceleration: 0.0,
            rotation_angle: 0.1,
        }
    }
}

/// Heritable variation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Bound of the uniform rotation applied to each limb of an egg (radians)
    pub angle_scale: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self { angle_scale: 0.5 }
    }
}

/// Run length and output cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of ticks to simulate
    pub ticks: u64,
    /// Observers are handed the world every this many ticks
    pub output_every: u64,
    /// Population metrics are logged every this many ticks
    pub log_every: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 10_000,
            output_every: 1,
            log_every: 1000,
        }
    }
}

/// One body of the starting population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedBody {
    pub x: f64,
    pub y: f64,
    /// Limb angles around the core, radians
    pub limb_angles: Vec<f64>,
}

impl SeedBody {
    pub fn new(x: f64, y: f64, limb_angles: Vec<f64>) -> Self {
        Self { x, y, limb_angles }
    }
}

/// Starting population
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub movers: Vec<SeedBody>,
    pub eggs: Vec<SeedBody>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            movers: vec![
                SeedBody::new(100.0, 100.0, vec![0.0, FRAC_PI_2]),
                SeedBody::new(400.0, 400.0, vec![0.0, -FRAC_PI_2]),
            ],
            eggs: vec![SeedBody::new(100.0, 100.0, vec![0.0, FRAC_PI_2])],
        }
    }
}

/// Full simulation configuration. Fixed for the lifetime of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    pub world: WorldConfig,
    pub lifecycle: LifecycleConfig,
    pub motion: MotionConfig,
    pub mutation: MutationConfig,
    pub run: RunConfig,
    pub population: PopulationConfig,
}

impl SimConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        debug!(
            seed = config.seed,
            ticks = config.run.ticks,
            seed_movers = config.population.movers.len(),
            seed_eggs = config.population.eggs.len(),
            "Configuration parsed"
        );
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let world = &self.world;
        if !(world.width.is_finite() && world.width > 0.0)
            || !(world.height.is_finite() && world.height > 0.0)
        {
            return Err(Error::Validation(format!(
                "world dimensions must be positive and finite, got {}x{}",
                world.width, world.height
            )));
        }
        if !(world.core_radius.is_finite() && world.core_radius >= 0.0) {
            return Err(Error::Validation(format!(
                "core radius must be non-negative, got {}",
                world.core_radius
            )));
        }

        let motion = &self.motion;
        for (name, value) in [
            ("initial_speed", motion.initial_speed),
            ("rotation_angle", motion.rotation_angle),
            ("mutation.angle_scale", self.mutation.angle_scale),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::Validation(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        if !motion.acceleration.is_finite() {
            return Err(Error::Validation("acceleration must be finite".to_string()));
        }

        if self.run.output_every == 0 || self.run.log_every == 0 {
            return Err(Error::Validation(
                "output_every and log_every must be at least 1".to_string(),
            ));
        }

        for seed in self.population.movers.iter().chain(&self.population.eggs) {
            if !(seed.x.is_finite() && seed.y.is_finite()) {
                return Err(Error::Validation(format!(
                    "seed body position must be finite, got ({}, {})",
                    seed.x, seed.y
                )));
            }
        }

        Ok(())
    }
}
