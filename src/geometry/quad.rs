//! Parallelograms ("quads").
//!
//! A `Quad` is a quadrilateral with parallel sides, defined by its center,
//! width, height, rotation, and shear factor. The parameters define a pair of
//! vector semi-axes:
//!   u = (½·w·cos θ, ½·w·sin θ)
//!   v = (½·h·(s·cos θ − sin θ), ½·h·(s·sin θ + cos θ))
//! and the shape is the set of points `C + α·u + β·v` with `α, β ∈ [−1, 1]`.
//!
//! The height may be negative (the angle from the first semi-axis to the
//! second is then negative), but the width may not: any operation that would
//! produce a negative width instead normalizes the `Quad` by negating both
//! width and height and adding π to the rotation. The rotation is kept in
//! `[0, 2π)`. A rectangle is a `Quad` with zero shear; an axis-aligned
//! rectangle additionally has a rotation that is a multiple of π/2.

use super::angle::Angle;
use super::point::{Point, Vec2};
use super::rect::Rect;
use super::segment::Segment;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    center: Point,
    width: f32,
    height: f32,
    rotation: Angle,
    shear_factor: f32,
}

impl Default for Quad {
    fn default() -> Self {
        Quad {
            center: Point::new(0.0, 0.0),
            width: 0.0,
            height: 0.0,
            rotation: Angle::ZERO,
            shear_factor: 0.0,
        }
    }
}

impl Quad {
    pub fn from_center_and_dimensions(center: Point, width: f32, height: f32) -> Quad {
        Quad::from_center_dimensions_rotation_and_shear(center, width, height, Angle::ZERO, 0.0)
    }

    pub fn from_center_dimensions_and_rotation(
        center: Point,
        width: f32,
        height: f32,
        rotation: Angle,
    ) -> Quad {
        Quad::from_center_dimensions_rotation_and_shear(center, width, height, rotation, 0.0)
    }

    pub fn from_center_dimensions_rotation_and_shear(
        center: Point,
        width: f32,
        height: f32,
        rotation: Angle,
        shear_factor: f32,
    ) -> Quad {
        let mut quad = Quad {
            center,
            width,
            height,
            rotation: rotation.normalized(),
            shear_factor,
        };
        quad.normalize();
        quad
    }

    /// Constructs a `Quad` equivalent to the given `Rect`.
    pub fn from_rect(rect: &Rect) -> Quad {
        Quad::from_center_and_dimensions(rect.center(), rect.width(), rect.height())
    }

    fn normalize(&mut self) {
        if self.width < 0.0 {
            self.width = -self.width;
            self.height = -self.height;
            self.rotation = (self.rotation + Angle::HALF_TURN).normalized();
        }
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn set_center(&mut self, center: Point) {
        self.center = center;
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Sets the width; a negative value normalizes the `Quad`.
    pub fn set_width(&mut self, width: f32) {
        self.width = width;
        self.normalize();
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn set_height(&mut self, height: f32) {
        self.height = height;
    }

    pub fn rotation(&self) -> Angle {
        self.rotation
    }

    /// Sets the rotation, normalized to `[0, 2π)`.
    pub fn set_rotation(&mut self, rotation: Angle) {
        self.rotation = rotation.normalized();
    }

    pub fn shear_factor(&self) -> f32 {
        self.shear_factor
    }

    pub fn set_shear_factor(&mut self, shear_factor: f32) {
        self.shear_factor = shear_factor;
    }

    /// Returns the pair of semi-axes `(u, v)`.
    pub fn semi_axes(&self) -> (Vec2, Vec2) {
        let cos = self.rotation.cos();
        let sin = self.rotation.sin();
        let u = Vec2::new(0.5 * self.width * cos, 0.5 * self.width * sin);
        let v = Vec2::new(
            0.5 * self.height * (self.shear_factor * cos - sin),
            0.5 * self.height * (self.shear_factor * sin + cos),
        );
        (u, v)
    }

    /// Returns true if the corners form right angles, i.e. the shear factor
    /// is zero. Degenerate `Quad`s are judged by shear factor alone.
    pub fn is_rectangular(&self) -> bool {
        self.shear_factor == 0.0
    }

    /// Returns true if this is a rectangle whose sides are parallel to the
    /// coordinate axes, up to the default rotation tolerance of 1e-5 rad.
    pub fn is_axis_aligned(&self) -> bool {
        self.is_axis_aligned_within(Angle::radians(1e-5))
    }

    /// As `is_axis_aligned`, with an explicit rotation tolerance.
    pub fn is_axis_aligned_within(&self, tolerance: Angle) -> bool {
        if !self.is_rectangular() {
            return false;
        }
        let remainder = self.rotation.modulo(Angle::QUARTER_TURN);
        remainder.abs() <= tolerance || (remainder - Angle::QUARTER_TURN).abs() <= tolerance
    }

    /// The signed area, `width · height`; negative iff the height is
    /// negative and the width non-zero.
    pub fn signed_area(&self) -> f32 {
        self.width * self.height
    }

    /// Width divided by height. Panics if the height is zero.
    pub fn aspect_ratio(&self) -> f32 {
        assert!(
            self.height != 0.0,
            "Cannot determine the aspect ratio when the height is 0"
        );
        self.width / self.height
    }

    /// The corners, in the order `C−u−v`, `C+u−v`, `C+u+v`, `C−u+v`.
    pub fn corners(&self) -> [Point; 4] {
        let (u, v) = self.semi_axes();
        [
            self.center - u - v,
            self.center + u - v,
            self.center + u + v,
            self.center - u + v,
        ]
    }

    /// Returns the edge from corner `index` to corner `(index + 1) % 4`.
    /// Panics if `index` is not 0, 1, 2, or 3.
    pub fn get_edge(&self, index: usize) -> Segment {
        assert!(index < 4, "Quad edge index must be 0, 1, 2, or 3; got {index}");
        let corners = self.corners();
        Segment::new(corners[index], corners[(index + 1) % 4])
    }

    /// Returns whether `point` is contained in the `Quad`; the boundary is
    /// contained. Solves `point − C = α·u + β·v` and tests `|α| ≤ 1`,
    /// `|β| ≤ 1`; degenerate `Quad`s reduce to a segment or point test.
    pub fn contains(&self, point: Point) -> bool {
        if self.width == 0.0 && self.height == 0.0 {
            return point == self.center;
        }
        let (u, v) = self.semi_axes();
        if self.height == 0.0 {
            return segment_contains_point(
                &Segment::new(self.center - u, self.center + u),
                point,
            );
        }
        if self.width == 0.0 {
            return segment_contains_point(
                &Segment::new(self.center - v, self.center + v),
                point,
            );
        }
        let det = Vec2::determinant(u, v);
        let d = point - self.center;
        let alpha = Vec2::determinant(d, v) / det;
        let beta = Vec2::determinant(u, d) / det;
        alpha.abs() <= 1.0 && beta.abs() <= 1.0
    }

    /// Expands the `Quad` so that it contains `point`, without altering the
    /// rotation or shear factor. Sides the point already lies within are
    /// left fixed.
    pub fn join(&mut self, point: Point) {
        let cos = self.rotation.cos();
        let sin = self.rotation.sin();
        // Unit-length basis along the axes; det(e1, e2) is exactly 1, so the
        // coordinates below are absolute distances along each axis.
        let e1 = Vec2::new(cos, sin);
        let e2 = Vec2::new(
            self.shear_factor * cos - sin,
            self.shear_factor * sin + cos,
        );
        let d = point - self.center;
        let x = Vec2::determinant(d, e2);
        let y = Vec2::determinant(e1, d);

        let x_lo = (-0.5 * self.width).min(x);
        let x_hi = (0.5 * self.width).max(x);
        let y_lo = (-0.5 * self.height).min(0.5 * self.height).min(y);
        let y_hi = (-0.5 * self.height).max(0.5 * self.height).max(y);

        self.center = self.center
            + e1 * (0.5 * (x_lo + x_hi))
            + e2 * (0.5 * (y_lo + y_hi));
        self.width = x_hi - x_lo;
        self.height = if self.height < 0.0 {
            y_lo - y_hi
        } else {
            y_hi - y_lo
        };
    }
}

/// Boundary-inclusive point-on-segment test, tolerating degenerate segments.
fn segment_contains_point(segment: &Segment, point: Point) -> bool {
    if segment.start == segment.end {
        return point == segment.start;
    }
    if Vec2::determinant(point - segment.start, segment.vector()) != 0.0 {
        return false;
    }
    match segment.project(point) {
        Some(t) => (0.0..=1.0).contains(&t),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn points_approx_eq(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn test_from_rect_has_identical_corners() {
        let rect = Rect::from_two_points(Point::new(-1.0, -2.0), Point::new(3.0, 4.0));
        let quad = Quad::from_rect(&rect);
        let quad_corners = quad.corners();
        let rect_corners = rect.corners();
        for i in 0..4 {
            assert!(points_approx_eq(quad_corners[i], rect_corners[i]));
        }
    }

    #[test]
    fn test_negative_width_normalizes() {
        let quad = Quad::from_center_dimensions_and_rotation(
            Point::new(0.0, 0.0),
            -4.0,
            2.0,
            Angle::ZERO,
        );
        assert_eq!(quad.width(), 4.0);
        assert_eq!(quad.height(), -2.0);
        assert!((quad.rotation().to_radians() - std::f32::consts::PI).abs() < EPS);
    }

    #[test]
    fn test_set_width_negative_normalizes() {
        let mut quad = Quad::from_center_and_dimensions(Point::new(0.0, 0.0), 2.0, 2.0);
        quad.set_width(-2.0);
        assert_eq!(quad.width(), 2.0);
        assert_eq!(quad.height(), -2.0);
        assert!((quad.rotation().to_radians() - std::f32::consts::PI).abs() < EPS);
    }

    #[test]
    fn test_signed_area() {
        let quad = Quad::from_center_dimensions_rotation_and_shear(
            Point::new(1.0, 1.0),
            3.0,
            -2.0,
            Angle::degrees(30.0),
            0.5,
        );
        assert!((quad.signed_area() + 6.0).abs() < EPS);
    }

    #[test]
    fn test_is_rectangular_and_axis_aligned() {
        let aligned = Quad::from_center_and_dimensions(Point::new(0.0, 0.0), 2.0, 1.0);
        assert!(aligned.is_rectangular());
        assert!(aligned.is_axis_aligned());

        let rotated = Quad::from_center_dimensions_and_rotation(
            Point::new(0.0, 0.0),
            2.0,
            1.0,
            Angle::degrees(90.0),
        );
        assert!(rotated.is_axis_aligned());

        let tilted = Quad::from_center_dimensions_and_rotation(
            Point::new(0.0, 0.0),
            2.0,
            1.0,
            Angle::degrees(45.0),
        );
        assert!(!tilted.is_axis_aligned());

        let sheared = Quad::from_center_dimensions_rotation_and_shear(
            Point::new(0.0, 0.0),
            2.0,
            1.0,
            Angle::ZERO,
            0.25,
        );
        assert!(!sheared.is_rectangular());
        assert!(!sheared.is_axis_aligned());
    }

    #[test]
    fn test_contains_in_parallelogram_basis() {
        let quad = Quad::from_center_dimensions_rotation_and_shear(
            Point::new(0.0, 0.0),
            2.0,
            2.0,
            Angle::ZERO,
            1.0,
        );
        // Corners: (-2, -1), (0, -1), (2, 1), (0, 1).
        assert!(quad.contains(Point::new(0.0, 0.0)));
        assert!(quad.contains(Point::new(2.0, 1.0)));
        assert!(quad.contains(Point::new(1.0, 0.5)));
        assert!(!quad.contains(Point::new(2.0, -1.0)));
        assert!(!quad.contains(Point::new(-2.0, 1.0)));
    }

    #[test]
    fn test_contains_degenerate_quads() {
        let point_like =
            Quad::from_center_and_dimensions(Point::new(3.0, 4.0), 0.0, 0.0);
        assert!(point_like.contains(Point::new(3.0, 4.0)));
        assert!(!point_like.contains(Point::new(3.0, 4.1)));

        let segment_like =
            Quad::from_center_and_dimensions(Point::new(0.0, 0.0), 4.0, 0.0);
        assert!(segment_like.contains(Point::new(1.0, 0.0)));
        assert!(segment_like.contains(Point::new(-2.0, 0.0)));
        assert!(!segment_like.contains(Point::new(2.5, 0.0)));
        assert!(!segment_like.contains(Point::new(1.0, 0.1)));
    }

    #[test]
    fn test_join_grows_along_axes() {
        let mut quad = Quad::from_center_and_dimensions(Point::new(0.0, 0.0), 2.0, 2.0);
        quad.join(Point::new(3.0, 0.0));
        assert!((quad.width() - 4.0).abs() < EPS);
        assert!((quad.height() - 2.0).abs() < EPS);
        assert!(points_approx_eq(quad.center(), Point::new(1.0, 0.0)));
        // The opposite side stays fixed.
        assert!(quad.contains(Point::new(-1.0, 0.0)));
        assert!(quad.contains(Point::new(3.0, 0.0)));
    }

    #[test]
    fn test_join_contained_point_is_a_no_op() {
        let mut quad = Quad::from_center_dimensions_and_rotation(
            Point::new(1.0, 1.0),
            2.0,
            2.0,
            Angle::degrees(45.0),
        );
        let before = quad;
        quad.join(Point::new(1.0, 1.0));
        assert_eq!(quad, before);
    }

    #[test]
    fn test_join_preserves_negative_height_sign() {
        let mut quad = Quad::from_center_and_dimensions(Point::new(0.0, 0.0), 2.0, -2.0);
        quad.join(Point::new(0.0, 4.0));
        assert!(quad.height() < 0.0);
        assert!(quad.contains(Point::new(0.0, 4.0)));
        assert!(quad.contains(Point::new(0.0, -1.0)));
    }

    #[test]
    fn test_corners_order() {
        let quad = Quad::from_center_and_dimensions(Point::new(0.0, 0.0), 2.0, 4.0);
        let corners = quad.corners();
        assert!(points_approx_eq(corners[0], Point::new(-1.0, -2.0)));
        assert!(points_approx_eq(corners[1], Point::new(1.0, -2.0)));
        assert!(points_approx_eq(corners[2], Point::new(1.0, 2.0)));
        assert!(points_approx_eq(corners[3], Point::new(-1.0, 2.0)));
    }

    #[test]
    #[should_panic(expected = "edge index")]
    fn test_get_edge_panics_out_of_range() {
        let _ = Quad::default().get_edge(4);
    }
}
