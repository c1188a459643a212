use std::ops::Mul;

use glam::Vec2;

use super::Vec2Ext;

/// A 2D rotation.
///
/// This caches the sine and cosine of the angle so repeated rotations of offsets (joint
/// positions, atoms, limb path segments) are cheap.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rotation {
    angle: f32,
    cos: f32,
    sin: f32,
}

impl Rotation {
    pub const IDENTITY: Self = Self {
        angle: 0.0,
        cos: 1.0,
        sin: 0.0,
    };

    #[inline]
    pub fn new(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self { angle, cos, sin }
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[inline]
    pub fn set_angle(&mut self, angle: f32) {
        *self = Self::new(angle);
    }

    /// Rotates `v` by this rotation.
    #[inline]
    pub fn rotate(&self, v: Vec2) -> Vec2 {
        Vec2::new(v.x * self.cos - v.y * self.sin, v.x * self.sin + v.y * self.cos)
    }

    /// Rotates `v` by the inverse of this rotation.
    #[inline]
    pub fn unrotate(&self, v: Vec2) -> Vec2 {
        Vec2::new(v.x * self.cos + v.y * self.sin, -v.x * self.sin + v.y * self.cos)
    }

    #[inline]
    pub fn inverse(&self) -> Self {
        Self {
            angle: -self.angle,
            cos: self.cos,
            sin: -self.sin,
        }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Vec2> for Rotation {
    type Output = Vec2;

    #[inline]
    fn mul(self, rhs: Vec2) -> Vec2 {
        self.rotate(rhs)
    }
}

/// An extension trait for types that can be interpreted as a rotation.
pub trait RotationExt {
    /// Returns a direction unit vector represented by this rotation.
    fn dir_vec(&self) -> Vec2;
}

impl RotationExt for Rotation {
    #[inline]
    fn dir_vec(&self) -> Vec2 {
        Vec2::new(self.cos, self.sin)
    }
}

impl RotationExt for f32 {
    #[inline]
    fn dir_vec(&self) -> Vec2 {
        Vec2::X.rotated(*self)
    }
}
