//! Mover and egg records.

use crate::body::Body;
use crate::rng::{symmetric, unit_vector};
use hatchery_core::{Point, Torus};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A living organism: a body travelling with a velocity and counting down to
/// its next egg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    pub body: Body,
    pub velocity: Point,
    pub time_to_lay: u32,
}

impl Mover {
    /// New mover with a uniformly random heading and a speed drawn uniformly
    /// from `[0, max_speed)`.
    pub fn new<R: Rng + ?Sized>(body: Body, max_speed: f64, laying_period: u32, rng: &mut R) -> Self {
        let heading = unit_vector(rng);
        let speed = rng.gen::<f64>() * max_speed;
        Self::with_velocity(body, heading * speed, laying_period)
    }

    pub fn with_velocity(body: Body, velocity: Point, time_to_lay: u32) -> Self {
        Self {
            body,
            velocity,
            time_to_lay,
        }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Translate the whole body by one tick of velocity.
    pub fn move_by(&mut self, torus: &Torus) {
        self.body.translate(self.velocity, torus);
    }

    /// Perturb the heading by a uniform angle in `[-angle_scale, angle_scale]`.
    pub fn rotate<R: Rng + ?Sized>(&mut self, angle_scale: f64, rng: &mut R) {
        self.velocity = self.velocity.rotate(symmetric(rng, angle_scale));
    }

    /// Speed times body area. A bookkeeping figure, not physical momentum.
    pub fn momentum(&self) -> f64 {
        self.speed() * self.body.area()
    }

    /// Add `amount` to the speed along the current heading. A mover at rest
    /// has no heading and is left untouched.
    pub fn accelerate(&mut self, amount: f64) {
        let heading = self.velocity.normalize();
        self.velocity += heading * amount;
    }
}

/// A dormant offspring waiting to hatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Egg {
    pub body: Body,
    pub time_to_hatch: u32,
}

impl Egg {
    pub fn new(body: Body, incubation_period: u32) -> Self {
        Self {
            body,
            time_to_hatch: incubation_period,
        }
    }

    /// Incubation is over; hatching now only waits for free space.
    pub fn is_ready(&self) -> bool {
        self.time_to_hatch == 0
    }
}

/// Which record a body belongs to, as seen by renderers and writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    Mover,
    Egg,
}

impl BodyKind {
    /// Single-letter tag used in snapshot files.
    pub fn tag(&self) -> &'static str {
        match self {
            BodyKind::Mover => "m",
            BodyKind::Egg => "e",
        }
    }
}
