//! Planar geometry on a toroidal (wrap-around) world.
//!
//! Every distance and intersection query considers the direct placement plus
//! the 8 neighbouring periodic images, which is enough as long as the objects
//! involved are smaller than half the world.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A 2D point. Doubles as a displacement or velocity vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians from the +x axis.
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn norm_squared(&self) -> f64 {
        self.dot(*self)
    }

    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Unit vector in the same direction. The zero vector normalizes to itself.
    pub fn normalize(&self) -> Point {
        let n = self.norm();
        if n == 0.0 {
            *self
        } else {
            Point::new(self.x / n, self.y / n)
        }
    }

    /// Rotate counter-clockwise by `angle` radians about the origin.
    pub fn rotate(&self, angle: f64) -> Point {
        let (sin, cos) = angle.sin_cos();
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Heading in `(-π, π]`.
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// A closed disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub centre: Point,
    pub radius: f64,
}

impl Circle {
    pub fn new(centre: Point, radius: f64) -> Self {
        Self { centre, radius }
    }

    pub fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }

    /// Same radius, centre shifted by `by`.
    pub fn offset(&self, by: Point) -> Circle {
        Circle::new(self.centre + by, self.radius)
    }

    /// Planar test, no wrapping. Touching disks intersect.
    pub fn intersects(&self, other: &Circle) -> bool {
        let reach = self.radius + other.radius;
        (other.centre - self.centre).norm_squared() <= reach * reach
    }
}

/// Dimensions of the toroidal world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Torus {
    pub width: f64,
    pub height: f64,
}

impl Torus {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The 9 translations that map the fundamental domain onto itself and
    /// its 8 neighbours, direct placement in the middle.
    pub fn image_offsets(&self) -> [Point; 9] {
        let (w, h) = (self.width, self.height);
        [
            Point::new(-w, -h),
            Point::new(-w, 0.0),
            Point::new(-w, h),
            Point::new(0.0, -h),
            Point::new(0.0, 0.0),
            Point::new(0.0, h),
            Point::new(w, -h),
            Point::new(w, 0.0),
            Point::new(w, h),
        ]
    }

    /// Reduce a point into `[0, width) × [0, height)`.
    pub fn wrap(&self, p: Point) -> Point {
        Point::new(wrap_coord(p.x, self.width), wrap_coord(p.y, self.height))
    }

    /// Shortest displacement from `a` to `b` over all periodic images of `b`.
    ///
    /// Antisymmetric: `delta(b, a) == -delta(a, b)` exactly, including the
    /// half-world tie, which resolves away from zero on each axis.
    pub fn delta(&self, a: Point, b: Point) -> Point {
        let direct = b - a;
        Point::new(
            minimum_image(direct.x, self.width),
            minimum_image(direct.y, self.height),
        )
    }

    /// True if any periodic placement of `c2` intersects `c1`.
    pub fn circles_intersect(&self, c1: &Circle, c2: &Circle) -> bool {
        // Working from the raw difference keeps the test exactly symmetric:
        // swapping the circles negates every candidate displacement.
        let direct = c2.centre - c1.centre;
        let reach = c1.radius + c2.radius;
        let reach_sq = reach * reach;
        self.image_offsets()
            .iter()
            .any(|&offset| (direct + offset).norm_squared() <= reach_sq)
    }

    /// Cheap prefilter: do the axis-aligned squares of half-sides `ra` and `rb`
    /// centred on `a` and `b` overlap under wrapping?
    pub fn bounding_squares_intersect(&self, a: Point, b: Point, ra: f64, rb: f64) -> bool {
        let d = self.delta(a, b);
        let reach = ra + rb;
        d.x.abs() <= reach && d.y.abs() <= reach
    }
}

/// `f64::round` sends ±0.5 away from zero, so negating `d` negates the result.
fn minimum_image(d: f64, extent: f64) -> f64 {
    d - extent * (d / extent).round()
}

fn wrap_coord(value: f64, extent: f64) -> f64 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid rounds tiny negatives up to `extent` itself.
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}
