use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg};

/// A 2D point in arena coordinates. Also used as a per-tick velocity vector.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Creates a new Point.
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    /// The origin, also the zero velocity.
    pub fn zero() -> Self {
        Point { x: 0.0, y: 0.0 }
    }

    /// Component-wise sum, returned as a new Point.
    pub fn add(&self, other: Point) -> Self {
        Point { x: self.x + other.x, y: self.y + other.y }
    }

    /// Calculates the squared distance to another point.
    pub fn distance_squared(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: Point) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Scales the vector by a scalar value.
    pub fn scale(&self, scalar: f32) -> Self {
        Point { x: self.x * scalar, y: self.y * scalar }
    }

    /// Length (speed, when used as a velocity).
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Point::add(&self, other)
    }
}

impl Mul<f32> for Point {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        self.scale(scalar)
    }
}

impl Neg for Point {
    type Output = Self;
    fn neg(self) -> Self {
        Point { x: -self.x, y: -self.y }
    }
}

/// Converts an angle (in radians) to a unit vector.
pub fn angle_to_vec(angle_rad: f32) -> Point {
    Point::new(angle_rad.cos(), angle_rad.sin())
}
