//! 2D vector math used for positions, velocities and headings

use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Plain value type used both as a point and as a displacement
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product (positive when `other` is
    /// counter-clockwise from `self`)
    pub fn cross(self, other: Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Unit vector in the same direction, or `None` for a zero-length vector
    pub fn try_normalize(self) -> Option<Vec2> {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            Some(self * (1.0 / len))
        } else {
            None
        }
    }

    /// Rotate counter-clockwise by `angle` radians
    pub fn rotate(self, angle: f64) -> Vec2 {
        let (sin, cos) = angle.sin_cos();
        Vec2 {
            x: cos * self.x - sin * self.y,
            y: sin * self.x + cos * self.y,
        }
    }

    /// Rotation by -90 degrees
    pub fn perpendicular(self) -> Vec2 {
        Vec2 {
            x: self.y,
            y: -self.x,
        }
    }

    /// Drop the fractional part of each component (toward zero)
    pub fn truncate(self) -> Vec2 {
        Vec2 {
            x: self.x.trunc(),
            y: self.y.trunc(),
        }
    }

    /// Round each component to the nearest integer, halves away from zero
    pub fn round(self) -> Vec2 {
        Vec2 {
            x: self.x.round(),
            y: self.y.round(),
        }
    }

    /// Heading in whole degrees within [0, 360)
    ///
    /// The arctangent is truncated to an integer before the quadrant fix-up,
    /// and a vertical vector (x == 0) maps to exactly 90 or 270.
    pub fn degrees(self) -> i32 {
        if self.x == 0.0 {
            return if self.y > 0.0 { 90 } else { 270 };
        }

        let mut angle = (self.y / self.x).atan().to_degrees() as i32;
        if self.x < 0.0 {
            angle += 180;
        }
        if angle < 0 {
            angle += 360;
        }
        angle
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        *self = *self + rhs;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, scalar: f64) -> Vec2 {
        Vec2::new(self.x * scalar, self.y * scalar)
    }
}

impl MulAssign<f64> for Vec2 {
    fn mul_assign(&mut self, scalar: f64) {
        *self = *self * scalar;
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_dot_and_cross() {
        let a = Vec2::new(3.0, 4.0);
        let b = Vec2::new(-4.0, 3.0);
        assert_eq!(a.dot(b), 0.0);
        assert_eq!(a.cross(b), 25.0);
        assert_eq!(b.cross(a), -25.0);
        assert_eq!(a.length(), 5.0);
    }

    #[test]
    fn test_normalize_zero_vector_is_none() {
        assert!(Vec2::ZERO.try_normalize().is_none());

        let unit = Vec2::new(0.0, -7.5).try_normalize().unwrap();
        assert!((unit.length() - 1.0).abs() < EPS);
        assert!((unit.y + 1.0).abs() < EPS);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = Vec2::new(1.0, 0.0).rotate(FRAC_PI_2);
        assert!(v.x.abs() < EPS);
        assert!((v.y - 1.0).abs() < EPS);
    }

    #[test]
    fn test_perpendicular_is_clockwise() {
        let p = Vec2::new(2.0, 1.0).perpendicular();
        assert_eq!(p, Vec2::new(1.0, -2.0));
        assert_eq!(p.dot(Vec2::new(2.0, 1.0)), 0.0);
    }

    #[test]
    fn test_truncate_and_round() {
        let v = Vec2::new(2.7, -2.7);
        assert_eq!(v.truncate(), Vec2::new(2.0, -2.0));
        assert_eq!(v.round(), Vec2::new(3.0, -3.0));
        assert_eq!(Vec2::new(0.5, -0.5).round(), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_degrees_quadrants() {
        assert_eq!(Vec2::new(1.0, 0.0).degrees(), 0);
        assert_eq!(Vec2::new(1.0, 1.0).degrees(), 45);
        assert_eq!(Vec2::new(0.0, 5.0).degrees(), 90);
        assert_eq!(Vec2::new(-1.0, 1.0).degrees(), 135);
        assert_eq!(Vec2::new(-1.0, 0.0).degrees(), 180);
        assert_eq!(Vec2::new(-1.0, -1.0).degrees(), 225);
        assert_eq!(Vec2::new(0.0, -5.0).degrees(), 270);
        assert_eq!(Vec2::new(1.0, -1.0).degrees(), 315);
    }

    #[test]
    fn test_degrees_stays_in_range() {
        for step in 0..720 {
            let angle = (step as f64 * 0.5).to_radians();
            let d = Vec2::new(angle.cos(), angle.sin()).degrees();
            assert!((0..360).contains(&d), "angle {} out of range", d);
        }
    }
}
