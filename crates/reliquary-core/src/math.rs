//! Math primitives for skeleton transform propagation
//!
//! Source fragments store shifts and rotations as fixed-point integer
//! triples with a shared denominator. Rotations follow the Y-X-Z Euler
//! convention throughout, and the engine composes child rotations by adding
//! Euler vectors rather than multiplying rotations. That additive rule is
//! mathematically inexact but downstream consumers depend on its output, so
//! it is kept as-is.

use serde::{Deserialize, Serialize};

/// A 3-component f32 vector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a new vector
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Build a vector from a fixed-point integer triple and denominator
    pub fn from_fixed(x: i16, y: i16, z: i16, denominator: f32) -> Self {
        Self {
            x: x as f32 / denominator,
            y: y as f32 / denominator,
            z: z as f32 / denominator,
        }
    }

    /// Component-wise addition
    pub fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Multiply all components by a scalar
    pub fn scale(self, factor: f32) -> Vec3 {
        Vec3::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Cross product
    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(a: [f32; 3]) -> Self {
        Vec3::new(a[0], a[1], a[2])
    }
}

/// A Y-X-Z ordered Euler rotation (angles in radians)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Euler {
    pub const IDENTITY: Euler = Euler {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a Y-X-Z Euler from explicit angles
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Reinterpret a vector of angles as a Y-X-Z Euler
    pub fn from_vector(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }

    /// Re-express this rotation as a plain vector of its angles
    pub fn to_vector(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Convert to a unit quaternion `[x, y, z, w]` using Y-X-Z order
    pub fn to_quaternion(self) -> [f32; 4] {
        let (s1, c1) = (self.x / 2.0).sin_cos();
        let (s2, c2) = (self.y / 2.0).sin_cos();
        let (s3, c3) = (self.z / 2.0).sin_cos();

        [
            s1 * c2 * c3 + c1 * s2 * s3,
            c1 * s2 * c3 - s1 * c2 * s3,
            c1 * c2 * s3 - s1 * s2 * c3,
            c1 * c2 * c3 + s1 * s2 * s3,
        ]
    }

    /// Rotate a vector by this Euler rotation
    pub fn apply(self, v: Vec3) -> Vec3 {
        let [qx, qy, qz, qw] = self.to_quaternion();
        let q = Vec3::new(qx, qy, qz);

        // v' = v + w * t + q x t, where t = 2 * (q x v)
        let t = q.cross(v).scale(2.0);
        v.add(t.scale(qw)).add(q.cross(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!(
            (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5 && (a.z - b.z).abs() < 1e-5,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn test_fixed_point_vector() {
        let v = Vec3::from_fixed(10, -4, 6, 2.0);
        assert_close(v, Vec3::new(5.0, -2.0, 3.0));
    }

    #[test]
    fn test_identity_rotation_preserves_vector() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_close(Euler::IDENTITY.apply(v), v);
    }

    #[test]
    fn test_rotate_quarter_turn_about_z() {
        let rotated = Euler::new(0.0, 0.0, FRAC_PI_2).apply(Vec3::new(0.0, 5.0, 0.0));
        assert_close(rotated, Vec3::new(-5.0, 0.0, 0.0));
    }

    #[test]
    fn test_rotate_quarter_turn_about_y() {
        let rotated = Euler::new(0.0, FRAC_PI_2, 0.0).apply(Vec3::new(1.0, 0.0, 0.0));
        assert_close(rotated, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_euler_vector_round_trip() {
        let e = Euler::new(0.1, -0.2, 0.3);
        let back = Euler::from_vector(e.to_vector());
        assert_eq!(e, back);
    }
}
