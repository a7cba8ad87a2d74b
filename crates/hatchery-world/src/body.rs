//! Composite bodies: a core circle with limb circles attached around it.

use crate::rng::symmetric;
use hatchery_core::{Circle, Point, Torus};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Number of buckets per full turn used to quantize limb angles for hashing.
const SHAPE_HASH_BUCKETS: f64 = 10.0;

/// One core circle plus a fixed number of equally sized limbs, each tangent
/// to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    core: Circle,
    limbs: Vec<Circle>,
}

impl Body {
    /// Attach one limb per angle at distance `2r` from the core centre.
    pub fn new(core: Circle, limb_angles: &[f64]) -> Self {
        let limbs = limb_angles
            .iter()
            .map(|&angle| adjacent_circle(&core, angle))
            .collect();
        Self { core, limbs }
    }

    pub fn core(&self) -> &Circle {
        &self.core
    }

    pub fn limbs(&self) -> &[Circle] {
        &self.limbs
    }

    pub fn limb_count(&self) -> usize {
        self.limbs.len()
    }

    /// Core first, then limbs in construction order.
    pub fn circles(&self) -> impl Iterator<Item = &Circle> + '_ {
        std::iter::once(&self.core).chain(self.limbs.iter())
    }

    /// Angle of each limb around the core, recovered through the wrapped
    /// displacement so limbs that crossed an edge still read correctly.
    pub fn limb_angles(&self, torus: &Torus) -> Vec<f64> {
        self.limbs
            .iter()
            .map(|limb| torus.delta(self.core.centre, limb.centre).angle())
            .collect()
    }

    /// Collision "mass": limb count times the core area. The core itself is
    /// not counted.
    pub fn area(&self) -> f64 {
        self.limbs.len() as f64 * self.core.area()
    }

    /// Distance from the core centre to the farthest point of the body, used
    /// as the half-side of the bounding-square prefilter.
    ///
    /// This is intentionally wider than core radius plus limb radius (`2r`):
    /// limb circles extend to `3r`, and a `2r` bound would reject limb-tip
    /// contacts between cores more than `4r` apart.
    pub fn reach(&self) -> f64 {
        match self.limbs.first() {
            Some(limb) => 2.0 * self.core.radius + limb.radius,
            None => self.core.radius,
        }
    }

    /// Copy with every limb independently swung around the core by a uniform
    /// angle in `[-angle_scale, angle_scale]`. The core never changes.
    pub fn mutate<R: Rng + ?Sized>(&self, angle_scale: f64, torus: &Torus, rng: &mut R) -> Body {
        let limbs = self
            .limbs
            .iter()
            .map(|limb| {
                let arm = torus.delta(self.core.centre, limb.centre);
                let swung = arm.rotate(symmetric(rng, angle_scale));
                Circle::new(torus.wrap(self.core.centre + swung), limb.radius)
            })
            .collect();
        Body {
            core: self.core,
            limbs,
        }
    }

    /// Rigid translation of every circle, each centre wrapped back into the world.
    pub fn translate(&mut self, by: Point, torus: &Torus) {
        self.core.centre = torus.wrap(self.core.centre + by);
        for limb in &mut self.limbs {
            limb.centre = torus.wrap(limb.centre + by);
        }
    }

    /// Wrapped body overlap. Core against core is deliberately not tested:
    /// only contacts involving at least one limb count, so a body without
    /// limbs never intersects anything.
    pub fn intersects(&self, other: &Body, torus: &Torus) -> bool {
        if !torus.bounding_squares_intersect(
            self.core.centre,
            other.core.centre,
            self.reach(),
            other.reach(),
        ) {
            return false;
        }

        let limb_limb = self.limbs.iter().any(|limb| {
            other
                .limbs
                .iter()
                .any(|other_limb| torus.circles_intersect(limb, other_limb))
        });
        limb_limb
            || self
                .limbs
                .iter()
                .any(|limb| torus.circles_intersect(limb, &other.core))
            || other
                .limbs
                .iter()
                .any(|other_limb| torus.circles_intersect(other_limb, &self.core))
    }

    /// Stable colour key: a CRC-32 over the limb angles quantized to tenths
    /// of a turn, so near-identical shapes share a hash across frames.
    pub fn shape_hash(&self, torus: &Torus) -> u32 {
        let mut bytes = Vec::with_capacity(self.limbs.len() * 8);
        for angle in self.limb_angles(torus) {
            let bucket = (SHAPE_HASH_BUCKETS * (angle / TAU + 0.5)).round() as i64;
            bytes.extend_from_slice(&bucket.to_le_bytes());
        }
        crc32fast::hash(&bytes)
    }
}

fn adjacent_circle(core: &Circle, angle: f64) -> Circle {
    Circle::new(
        core.centre + Point::from_angle(angle) * (2.0 * core.radius),
        core.radius,
    )
}
