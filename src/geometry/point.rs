//! Points and vectors in the plane.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use super::angle::Angle;

/// A location in the plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// The origin, `(0, 0)`.
pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    /// Returns the vector from the origin to this point.
    pub fn offset(self) -> Vec2 {
        Vec2 {
            x: self.x,
            y: self.y,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A displacement in the plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    pub fn from_direction_and_magnitude(direction: Angle, magnitude: f32) -> Vec2 {
        Vec2 {
            x: magnitude * direction.cos(),
            y: magnitude * direction.sin(),
        }
    }

    pub fn magnitude(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn magnitude_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// The direction of this vector, measured counter-clockwise from the
    /// positive x-axis, in `(-π, π]`.
    pub fn direction(self) -> Angle {
        Angle::radians(self.y.atan2(self.x))
    }

    /// Returns this vector rotated a quarter-turn counter-clockwise.
    pub fn orthogonal(self) -> Vec2 {
        Vec2 {
            x: -self.y,
            y: self.x,
        }
    }

    pub fn dot(a: Vec2, b: Vec2) -> f32 {
        a.x * b.x + a.y * b.y
    }

    /// The determinant of the 2×2 matrix `[a b]`, i.e. the signed cross
    /// product of the two vectors.
    pub fn determinant(a: Vec2, b: Vec2) -> f32 {
        a.x * b.y - a.y * b.x
    }

    /// The signed angle of rotation from `a` to `b`, in `(-π, π]`.
    pub fn signed_angle_between(a: Vec2, b: Vec2) -> Angle {
        Angle::radians(Vec2::determinant(a, b).atan2(Vec2::dot(a, b)))
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.x, self.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2 {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2 {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl Mul<Vec2> for f32 {
    type Output = Vec2;
    fn mul(self, rhs: Vec2) -> Vec2 {
        rhs * self
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    fn div(self, rhs: f32) -> Vec2 {
        Vec2 {
            x: self.x / rhs,
            y: self.y / rhs,
        }
    }
}

impl Add<Vec2> for Point {
    type Output = Point;
    fn add(self, rhs: Vec2) -> Point {
        Point {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign<Vec2> for Point {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub<Vec2> for Point {
    type Output = Point;
    fn sub(self, rhs: Vec2) -> Point {
        Point {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Sub for Point {
    type Output = Vec2;
    fn sub(self, rhs: Point) -> Vec2 {
        Vec2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts;

    const EPS: f32 = 1e-6;

    #[test]
    fn test_point_vector_arithmetic() {
        let p = Point::new(1.0, 2.0) + Vec2::new(3.0, -4.0);
        assert_eq!(p, Point::new(4.0, -2.0));
        assert_eq!(Point::new(4.0, -2.0) - Point::new(1.0, 2.0), Vec2::new(3.0, -4.0));
    }

    #[test]
    fn test_magnitude_and_direction() {
        let v = Vec2::new(3.0, 4.0);
        assert!((v.magnitude() - 5.0).abs() < EPS);
        assert!((v.magnitude_squared() - 25.0).abs() < EPS);
        assert!((Vec2::new(0.0, 2.0).direction().to_radians() - consts::FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn test_from_direction_and_magnitude() {
        let v = Vec2::from_direction_and_magnitude(Angle::degrees(180.0), 2.0);
        assert!((v.x + 2.0).abs() < EPS);
        assert!(v.y.abs() < EPS);
    }

    #[test]
    fn test_orthogonal_is_quarter_turn_ccw() {
        assert_eq!(Vec2::new(1.0, 0.0).orthogonal(), Vec2::new(0.0, 1.0));
        assert_eq!(Vec2::new(0.0, 1.0).orthogonal(), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_dot_and_determinant() {
        let a = Vec2::new(2.0, 3.0);
        let b = Vec2::new(-1.0, 4.0);
        assert!((Vec2::dot(a, b) - 10.0).abs() < EPS);
        assert!((Vec2::determinant(a, b) - 11.0).abs() < EPS);
    }

    #[test]
    fn test_signed_angle_between() {
        let a = Vec2::new(1.0, 0.0);
        let b = Vec2::new(0.0, 1.0);
        assert!(
            (Vec2::signed_angle_between(a, b).to_radians() - consts::FRAC_PI_2).abs() < EPS
        );
        assert!(
            (Vec2::signed_angle_between(b, a).to_radians() + consts::FRAC_PI_2).abs() < EPS
        );
        // Anti-parallel vectors come back as +π, not -π.
        assert!(
            (Vec2::signed_angle_between(a, -a).to_radians() - consts::PI).abs() < EPS
        );
    }
}
