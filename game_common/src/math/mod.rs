mod rotation;

use glam::Vec2;
pub use rotation::{Rotation, RotationExt};

/// Extension methods for [`Vec2`] used by the body simulation.
///
/// All angles are in radians and follow [`Vec2::from_angle`].
pub trait Vec2Ext {
    /// Mirrors the vector on the Y axis if `flipped` is `true`.
    fn flip_x(self, flipped: bool) -> Vec2;

    /// Rotates the vector by `angle`.
    fn rotated(self, angle: f32) -> Vec2;

    /// Returns the absolute angle of this vector. The zero vector has an angle of `0`.
    fn abs_angle(self) -> f32;

    /// Returns a vector with the same direction and the given magnitude. The zero vector stays
    /// zero.
    fn with_magnitude(self, magnitude: f32) -> Vec2;
}

impl Vec2Ext for Vec2 {
    #[inline]
    fn flip_x(self, flipped: bool) -> Vec2 {
        if flipped {
            Vec2::new(-self.x, self.y)
        } else {
            self
        }
    }

    #[inline]
    fn rotated(self, angle: f32) -> Vec2 {
        Vec2::from_angle(angle).rotate(self)
    }

    #[inline]
    fn abs_angle(self) -> f32 {
        if self == Vec2::ZERO {
            0.0
        } else {
            self.y.atan2(self.x)
        }
    }

    #[inline]
    fn with_magnitude(self, magnitude: f32) -> Vec2 {
        self.normalize_or_zero() * magnitude
    }
}

/// Horizontal wrapping of the scene.
///
/// Scenes may wrap around on the X axis. Distances between two points must then take the
/// shorter way around the seam.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SceneWrap {
    pub width: f32,
    pub wraps_x: bool,
}

impl SceneWrap {
    /// A scene that never wraps.
    pub const NONE: Self = Self {
        width: 0.0,
        wraps_x: false,
    };

    /// Returns the shortest vector pointing from `from` to `to`.
    pub fn shortest_distance(&self, from: Vec2, to: Vec2) -> Vec2 {
        let mut distance = to - from;

        if self.wraps_x && self.width > 0.0 {
            let half = self.width / 2.0;
            if distance.x > half {
                distance.x -= self.width;
            } else if distance.x < -half {
                distance.x += self.width;
            }
        }

        distance
    }

    /// Wraps `pos` back into the scene bounds.
    pub fn wrap(&self, mut pos: Vec2) -> Vec2 {
        if self.wraps_x && self.width > 0.0 {
            pos.x = pos.x.rem_euclid(self.width);
        }

        pos
    }
}

impl Default for SceneWrap {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use glam::Vec2;

    use super::{SceneWrap, Vec2Ext};
    use crate::assert_approx_eq;

    #[test]
    fn flip_x() {
        let v = Vec2::new(3.0, 4.0);
        assert_eq!(v.flip_x(false), v);
        assert_eq!(v.flip_x(true), Vec2::new(-3.0, 4.0));
    }

    #[test]
    fn rotated_quarter_turn() {
        let v = Vec2::new(1.0, 0.0).rotated(FRAC_PI_2);
        assert_approx_eq!(v.x, 0.0, epsilon = 1e-6);
        assert_approx_eq!(v.y, 1.0, epsilon = 1e-6);
        assert_approx_eq!(v.abs_angle(), FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn abs_angle_of_zero() {
        assert_eq!(Vec2::ZERO.abs_angle(), 0.0);
        assert_approx_eq!(Vec2::new(-1.0, 0.0).abs_angle(), PI, epsilon = 1e-6);
    }

    #[test]
    fn with_magnitude() {
        let v = Vec2::new(3.0, 4.0).with_magnitude(10.0);
        assert_approx_eq!(v.length(), 10.0, epsilon = 1e-5);
        assert_eq!(Vec2::ZERO.with_magnitude(5.0), Vec2::ZERO);
    }

    #[test]
    fn shortest_distance_wraps() {
        let wrap = SceneWrap {
            width: 100.0,
            wraps_x: true,
        };

        let d = wrap.shortest_distance(Vec2::new(95.0, 0.0), Vec2::new(5.0, 0.0));
        assert_approx_eq!(d.x, 10.0, epsilon = 1e-5);

        let d = wrap.shortest_distance(Vec2::new(5.0, 0.0), Vec2::new(95.0, 0.0));
        assert_approx_eq!(d.x, -10.0, epsilon = 1e-5);

        let d = SceneWrap::NONE.shortest_distance(Vec2::new(5.0, 0.0), Vec2::new(95.0, 0.0));
        assert_approx_eq!(d.x, 90.0, epsilon = 1e-5);
    }

    #[test]
    fn wrap_position() {
        let wrap = SceneWrap {
            width: 100.0,
            wraps_x: true,
        };
        assert_approx_eq!(wrap.wrap(Vec2::new(-10.0, 3.0)).x, 90.0, epsilon = 1e-5);
        assert_approx_eq!(wrap.wrap(Vec2::new(250.0, 3.0)).x, 50.0, epsilon = 1e-5);
    }
}
