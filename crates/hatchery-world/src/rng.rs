//! Random draws shared by every stochastic operation in the engine.

use hatchery_core::Point;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::TAU;

/// Create a deterministic RNG from a seed.
pub fn create_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Uniform draw from `[-scale, scale)`.
pub fn symmetric<R: Rng + ?Sized>(rng: &mut R, scale: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * 2.0 * scale
}

/// Unit vector with a uniformly distributed heading.
pub fn unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Point {
    Point::from_angle(rng.gen::<f64>() * TAU)
}
