//! Triangles.

use serde::{Deserialize, Serialize};

use super::point::{Point, Vec2};
use super::segment::Segment;

/// A triangle defined by its three corners. The winding of the corners
/// determines the sign of [`Triangle::signed_area`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
}

impl Triangle {
    pub const fn new(p0: Point, p1: Point, p2: Point) -> Self {
        Triangle { p0, p1, p2 }
    }

    /// Half the signed cross product of the edge vectors from `p0`. Positive
    /// when the corners wind counter-clockwise.
    pub fn signed_area(&self) -> f32 {
        0.5 * Vec2::determinant(self.p1 - self.p0, self.p2 - self.p0)
    }

    /// Returns whether `point` lies inside the triangle, by edge sign tests.
    /// Points on the boundary are contained.
    pub fn contains(&self, point: Point) -> bool {
        let d0 = Vec2::determinant(self.p1 - self.p0, point - self.p0);
        let d1 = Vec2::determinant(self.p2 - self.p1, point - self.p1);
        let d2 = Vec2::determinant(self.p0 - self.p2, point - self.p2);
        let has_negative = d0 < 0.0 || d1 < 0.0 || d2 < 0.0;
        let has_positive = d0 > 0.0 || d1 > 0.0 || d2 > 0.0;
        !(has_negative && has_positive)
    }

    /// Returns the edge from corner `index` to corner `(index + 1) % 3`.
    /// Panics if `index` is not 0, 1, or 2.
    pub fn get_edge(&self, index: usize) -> Segment {
        match index {
            0 => Segment::new(self.p0, self.p1),
            1 => Segment::new(self.p1, self.p2),
            2 => Segment::new(self.p2, self.p0),
            _ => panic!("Triangle edge index must be 0, 1, or 2; got {index}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn test_signed_area_follows_winding() {
        let ccw = Triangle::new(
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(0.0, 2.0),
        );
        assert!((ccw.signed_area() - 2.0).abs() < EPS);

        let cw = Triangle::new(ccw.p0, ccw.p2, ccw.p1);
        assert!((cw.signed_area() + 2.0).abs() < EPS);
    }

    #[test]
    fn test_contains_is_boundary_inclusive() {
        let t = Triangle::new(
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 4.0),
        );
        assert!(t.contains(Point::new(1.0, 1.0)));
        assert!(t.contains(Point::new(2.0, 0.0)));
        assert!(t.contains(Point::new(0.0, 0.0)));
        assert!(t.contains(Point::new(2.0, 2.0)));
        assert!(!t.contains(Point::new(3.0, 3.0)));
        assert!(!t.contains(Point::new(-0.1, 1.0)));
    }

    #[test]
    fn test_contains_works_for_clockwise_winding() {
        let t = Triangle::new(
            Point::new(0.0, 0.0),
            Point::new(0.0, 4.0),
            Point::new(4.0, 0.0),
        );
        assert!(t.contains(Point::new(1.0, 1.0)));
        assert!(!t.contains(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_get_edge() {
        let t = Triangle::new(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        );
        assert_eq!(t.get_edge(0), Segment::new(t.p0, t.p1));
        assert_eq!(t.get_edge(2), Segment::new(t.p2, t.p0));
    }

    #[test]
    #[should_panic(expected = "edge index")]
    fn test_get_edge_panics_out_of_range() {
        let t = Triangle::default();
        let _ = t.get_edge(3);
    }
}
