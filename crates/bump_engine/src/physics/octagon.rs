//! Octagonal bounding volumes
//!
//! An octagon is the intersection of an axis-aligned square, a 45° diamond
//! and a vertical slab. It is stored as independent `[min, max]` ranges along
//! five axes: X, Y, Z and the two rotated coordinates `x + y` and `-x + y`.
//! Diagonal ranges are kept in rotated units; overlaps along them are scaled
//! by `1/√2` to convert back to world distance.

use serde::{Serialize, Deserialize};

use crate::foundation::math::{constants::{INV_SQRT_2, SQRT_2}, Vec3};

/// One of the five separating axes of an octagon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OctAxis {
    /// World X
    X = 0,
    /// World Y
    Y = 1,
    /// World Z (vertical)
    Z = 2,
    /// Rotated coordinate `x + y`
    XY = 3,
    /// Rotated coordinate `-x + y`
    YX = 4,
}

impl OctAxis {
    /// All five axes in storage order
    pub const ALL: [OctAxis; 5] = [OctAxis::X, OctAxis::Y, OctAxis::Z, OctAxis::XY, OctAxis::YX];

    /// Coordinate of a world point along this axis, in the axis' own units
    pub fn project(self, p: &Vec3) -> f32 {
        match self {
            OctAxis::X => p.x,
            OctAxis::Y => p.y,
            OctAxis::Z => p.z,
            OctAxis::XY => p.x + p.y,
            OctAxis::YX => -p.x + p.y,
        }
    }

    /// Factor converting a length along this axis into world distance
    pub fn scale(self) -> f32 {
        match self {
            OctAxis::X | OctAxis::Y | OctAxis::Z => 1.0,
            OctAxis::XY | OctAxis::YX => INV_SQRT_2,
        }
    }

    /// Unit world direction of this axis
    pub fn direction(self) -> Vec3 {
        match self {
            OctAxis::X => Vec3::new(1.0, 0.0, 0.0),
            OctAxis::Y => Vec3::new(0.0, 1.0, 0.0),
            OctAxis::Z => Vec3::new(0.0, 0.0, 1.0),
            OctAxis::XY => Vec3::new(INV_SQRT_2, INV_SQRT_2, 0.0),
            OctAxis::YX => Vec3::new(-INV_SQRT_2, INV_SQRT_2, 0.0),
        }
    }

    /// True for the four horizontal axes
    pub fn is_horizontal(self) -> bool {
        self != OctAxis::Z
    }
}

/// Five-axis bounding extent, either local (offsets from a position) or world-space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Octagon {
    /// Lower bound along each [`OctAxis`]
    pub mins: [f32; 5],
    /// Upper bound along each [`OctAxis`]
    pub maxs: [f32; 5],
}

impl Default for Octagon {
    fn default() -> Self {
        Self::empty()
    }
}

impl Octagon {
    /// A degenerate octagon with zero size on every axis
    pub fn empty() -> Self {
        Self { mins: [0.0; 5], maxs: [0.0; 5] }
    }

    /// Character-style bound: square half-width `size`, diamond half-width
    /// `size_big` (rotated units), standing on its position and `height` tall.
    pub fn from_bump(size: f32, size_big: f32, height: f32) -> Self {
        Self {
            mins: [-size, -size, 0.0, -size_big, -size_big],
            maxs: [size, size, height, size_big, size_big],
        }
    }

    /// Regular octagon of half-width `size` standing on its position
    pub fn regular(size: f32, height: f32) -> Self {
        Self::from_bump(size, size * SQRT_2, height)
    }

    /// Particle-style footprint: the octagon circumscribing a circle of `radius`,
    /// centred vertically on the position.
    pub fn from_radius(radius: f32, height: f32) -> Self {
        let half = height * 0.5;
        Self {
            mins: [-radius, -radius, -half, -radius * SQRT_2, -radius * SQRT_2],
            maxs: [radius, radius, half, radius * SQRT_2, radius * SQRT_2],
        }
    }

    /// Lower bound along an axis
    pub fn min(&self, axis: OctAxis) -> f32 {
        self.mins[axis as usize]
    }

    /// Upper bound along an axis
    pub fn max(&self, axis: OctAxis) -> f32 {
        self.maxs[axis as usize]
    }

    /// Midpoint along an axis
    pub fn center(&self, axis: OctAxis) -> f32 {
        (self.min(axis) + self.max(axis)) * 0.5
    }

    /// Move a local octagon to a world position
    pub fn translate(&self, position: &Vec3) -> Octagon {
        let mut world = *self;
        for axis in OctAxis::ALL {
            let offset = axis.project(position);
            world.mins[axis as usize] += offset;
            world.maxs[axis as usize] += offset;
        }
        world
    }

    /// Largest horizontal reach from the position along X or Y
    pub fn half_width(&self) -> f32 {
        self.max(OctAxis::X)
            .max(-self.min(OctAxis::X))
            .max(self.max(OctAxis::Y))
            .max(-self.min(OctAxis::Y))
    }

    /// True when the horizontal footprint has no area; such a bound cannot bump anything
    pub fn is_flat(&self) -> bool {
        self.max(OctAxis::X) <= self.min(OctAxis::X) || self.max(OctAxis::Y) <= self.min(OctAxis::Y)
    }

    /// Does a world point fall inside this (world-space) octagon's horizontal footprint?
    pub fn contains_xy(&self, point: &Vec3) -> bool {
        OctAxis::ALL
            .into_iter()
            .filter(|axis| axis.is_horizontal())
            .all(|axis| {
                let c = axis.project(point);
                c >= self.min(axis) && c <= self.max(axis)
            })
    }
}

/// Penetration depth of two world-space octagons along each axis, in world units.
/// A depth of zero or less means the axis separates them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisDepths(pub [f32; 5]);

impl AxisDepths {
    /// Measure the overlap of two world-space octagons
    pub fn between(a: &Octagon, b: &Octagon) -> Self {
        let mut depths = [0.0; 5];
        for axis in OctAxis::ALL {
            let i = axis as usize;
            let overlap = b.maxs[i].min(a.maxs[i]) - b.mins[i].max(a.mins[i]);
            depths[i] = overlap * axis.scale();
        }
        Self(depths)
    }

    /// Depth along one axis
    pub fn depth(&self, axis: OctAxis) -> f32 {
        self.0[axis as usize]
    }

    /// Colliding means strictly positive overlap on all five axes
    pub fn all_positive(&self) -> bool {
        self.0.iter().all(|&d| d > 0.0)
    }

    /// The axis with the smallest positive depth, if any
    pub fn shallowest(&self) -> Option<(OctAxis, f32)> {
        OctAxis::ALL
            .into_iter()
            .map(|axis| (axis, self.depth(axis)))
            .filter(|&(_, d)| d > 0.0)
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}
