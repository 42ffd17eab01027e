//! Plain vector, quaternion and pose types.
//!
//! These are the shapes that travel on the wire (`{x, y, z}` and
//! `{x, y, z, w}`) and that the public API hands out. Arithmetic happens on
//! Rapier's math types; convert with `From`/`Into` at the call site.

use rapier3d::math::{Rotation, Vector};
use serde::{Deserialize, Serialize};

/// A 3D vector in metres (positions) or unitless (directions).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const FORWARD: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Returns the unit vector, or `None` for a (near) zero or non-finite vector.
    pub fn try_normalize(self) -> Option<Vec3> {
        Vector::from(self).try_normalize().map(Vec3::from)
    }

    pub fn is_finite(self) -> bool {
        Vector::from(self).is_finite()
    }
}

impl From<Vector> for Vec3 {
    fn from(v: Vector) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for Vector {
    fn from(v: Vec3) -> Self {
        Vector::new(v.x, v.y, v.z)
    }
}

/// A rotation quaternion stored as `(x, y, z, w)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Quat = Quat::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians around the vertical axis.
    pub fn from_rotation_y(angle: f32) -> Self {
        Rotation::from_rotation_y(angle).into()
    }

    pub fn is_finite(self) -> bool {
        Rotation::from(self).is_finite()
    }

    /// Unit rotation for the physics layer. Degenerate quaternions collapse
    /// to identity.
    pub(crate) fn to_unit(self) -> Rotation {
        let q = Rotation::from(self);
        if q.is_finite() && q.length_squared() > f32::EPSILON {
            q.normalize()
        } else {
            Rotation::IDENTITY
        }
    }
}

impl From<Rotation> for Quat {
    fn from(q: Rotation) -> Self {
        Self::new(q.x, q.y, q.z, q.w)
    }
}

impl From<Quat> for Rotation {
    fn from(q: Quat) -> Self {
        Rotation::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

/// Position plus orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// `false` when the simulation or a peer produced NaN or infinities.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }
}
