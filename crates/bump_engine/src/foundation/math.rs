//! Math utilities and types
//!
//! Vector aliases over `nalgebra` plus the handful of scalar helpers the
//! collision core leans on.

pub use nalgebra::{Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// 1 / sqrt(2), the scale between rotated diagonal coordinates and world distance
    pub const INV_SQRT_2: f32 = std::f32::consts::FRAC_1_SQRT_2;

    /// sqrt(2)
    pub const SQRT_2: f32 = std::f32::consts::SQRT_2;
}

/// Math utility functions
pub mod utils {
    use super::*;

    /// Wrap an angle into `[-PI, PI)`
    pub fn wrap_angle(angle: f32) -> f32 {
        (angle + constants::PI).rem_euclid(constants::TAU) - constants::PI
    }

    /// True when every component of the vector is finite
    pub fn is_finite(v: &Vec3) -> bool {
        v.iter().all(|c| c.is_finite())
    }

    /// Squared horizontal (XY) distance between two points
    pub fn horizontal_distance_squared(a: &Vec3, b: &Vec3) -> f32 {
        let dx = a.x - b.x;
        let dy = a.y - b.y;
        dx * dx + dy * dy
    }

    /// Component of `v` perpendicular to the unit vector `n`
    pub fn reject(v: &Vec3, n: &Vec3) -> Vec3 {
        v - n * v.dot(n)
    }
}
