//! Pairwise intersection predicates.
//!
//! [`Intersects`] reports whether two objects overlap, i.e. whether any
//! point is contained in both. The predicate is symmetric, and boundaries
//! are inclusive: objects that merely touch intersect.

use super::point::{Point, Vec2};
use super::quad::Quad;
use super::rect::Rect;
use super::segment::Segment;
use super::triangle::Triangle;

/// Boundary-inclusive intersection test between two objects. Implemented for
/// every pair drawn from `Point`, `Segment`, `Triangle`, `Rect`, and `Quad`;
/// `a.intersects(&b)` always equals `b.intersects(&a)`.
pub trait Intersects<Rhs = Self> {
    fn intersects(&self, other: &Rhs) -> bool;
}

fn point_point(a: Point, b: Point) -> bool {
    a == b
}

fn point_segment(a: Point, b: &Segment) -> bool {
    // Compare the points directly when the segment is point-like.
    if b.start == b.end {
        return a == b.start;
    }
    // If the point isn't on the segment's line, they don't intersect.
    if Vec2::determinant(a - b.start, b.end - b.start) != 0.0 {
        return false;
    }
    // The segment is too short to project onto, and the point matches
    // neither endpoint.
    let Some(projection) = b.project(a) else {
        return false;
    };
    (0.0..=1.0).contains(&projection)
}

fn segment_segment(a: &Segment, b: &Segment) -> bool {
    // Exit early when the intersection is at shared endpoints.
    if a.start == b.start || a.start == b.end || a.end == b.start || a.end == b.end {
        return true;
    }
    if a.start == a.end {
        return point_segment(a.start, b);
    }
    if b.start == b.end {
        return point_segment(b.start, a);
    }

    let vec_a = a.vector();
    let vec_b = b.vector();

    if Vec2::determinant(vec_a, vec_b) == 0.0 {
        // Parallel; intersection requires collinearity and range overlap.
        if Vec2::determinant(vec_a, b.start - a.start) == 0.0 {
            if b.length() == 0.0 {
                return point_segment(b.start, a);
            }
            // Project `a`'s endpoints onto `b`. If `b` is too short to
            // project onto, there is no intersection (the endpoint equality
            // cases were handled above).
            let Some(projection_1) = b.project(a.start) else {
                return false;
            };
            let Some(projection_2) = b.project(a.end) else {
                return false;
            };
            // `a` is neither wholly before nor wholly after `b`: at least
            // one projection lands in [0, 1], or the two span it.
            return (projection_1 >= 0.0 || projection_2 >= 0.0)
                && (projection_1 <= 1.0 || projection_2 <= 1.0);
        }
        return false;
    }
    // The endpoints of each segment must lie on opposite sides of the other
    // segment's line, or on it.
    let v1 = Vec2::determinant(vec_a, b.start - a.start);
    let v2 = Vec2::determinant(vec_a, b.end - a.start);
    let v3 = Vec2::determinant(vec_b, a.start - b.start);
    let v4 = Vec2::determinant(vec_b, a.end - b.start);
    v1 * v2 <= 0.0 && v3 * v4 <= 0.0
}

fn segment_triangle(a: &Segment, b: &Triangle) -> bool {
    if a.start == a.end {
        return b.contains(a.start);
    }
    if b.p0 == b.p1 && b.p0 == b.p2 {
        return point_segment(b.p0, a);
    }
    // A fully contained segment crosses no edge, so test containment of one
    // endpoint first.
    if b.contains(a.start) {
        return true;
    }
    (0..3).any(|i| segment_segment(a, &b.get_edge(i)))
}

fn segment_rect(a: &Segment, b: &Rect) -> bool {
    if a.start == a.end {
        return b.contains(a.start);
    }
    if b.width() == 0.0 && b.height() == 0.0 {
        return point_segment(b.center(), a);
    }
    if b.contains(a.start) {
        return true;
    }
    (0..4).any(|i| segment_segment(a, &b.get_edge(i)))
}

fn segment_quad(a: &Segment, b: &Quad) -> bool {
    if a.start == a.end {
        return b.contains(a.start);
    }
    if b.width() == 0.0 && b.height() == 0.0 {
        return point_segment(b.center(), a);
    }
    if b.contains(a.start) {
        return true;
    }
    (0..4).any(|i| segment_segment(a, &b.get_edge(i)))
}

fn triangle_triangle(a: &Triangle, b: &Triangle) -> bool {
    if a.p0 == a.p1 && a.p0 == a.p2 {
        return b.contains(a.p0);
    }
    if b.p0 == b.p1 && b.p0 == b.p2 {
        return a.contains(b.p0);
    }
    // Containment of a representative point rules out one shape lying
    // entirely inside the other; otherwise some pair of edges must cross.
    if b.contains(a.p0) || a.contains(b.p0) {
        return true;
    }
    (0..3).any(|i| (0..3).any(|j| segment_segment(&a.get_edge(i), &b.get_edge(j))))
}

fn triangle_rect(a: &Triangle, b: &Rect) -> bool {
    if a.p0 == a.p1 && a.p0 == a.p2 {
        return b.contains(a.p0);
    }
    if b.width() == 0.0 && b.height() == 0.0 {
        return a.contains(b.center());
    }
    if b.contains(a.p0) || a.contains(b.center()) {
        return true;
    }
    (0..3).any(|i| (0..4).any(|j| segment_segment(&a.get_edge(i), &b.get_edge(j))))
}

fn triangle_quad(a: &Triangle, b: &Quad) -> bool {
    if a.p0 == a.p1 && a.p0 == a.p2 {
        return b.contains(a.p0);
    }
    if b.width() == 0.0 && b.height() == 0.0 {
        return a.contains(b.center());
    }
    if b.contains(a.p0) || a.contains(b.center()) {
        return true;
    }
    (0..3).any(|i| (0..4).any(|j| segment_segment(&a.get_edge(i), &b.get_edge(j))))
}

fn rect_rect(a: &Rect, b: &Rect) -> bool {
    // Separating-axis test on the two axis-aligned ranges; no edge
    // iteration needed, and degenerate rects fall out naturally.
    if a.x_min() > b.x_max() || b.x_min() > a.x_max() {
        return false;
    }
    if a.y_min() > b.y_max() || b.y_min() > a.y_max() {
        return false;
    }
    true
}

fn rect_quad(a: &Rect, b: &Quad) -> bool {
    if a.width() == 0.0 && a.height() == 0.0 {
        return b.contains(a.center());
    }
    if b.width() == 0.0 && b.height() == 0.0 {
        return a.contains(b.center());
    }
    if b.contains(a.center()) || a.contains(b.center()) {
        return true;
    }
    (0..4).any(|i| (0..4).any(|j| segment_segment(&a.get_edge(i), &b.get_edge(j))))
}

fn quad_quad(a: &Quad, b: &Quad) -> bool {
    if a.width() == 0.0 && a.height() == 0.0 {
        return b.contains(a.center());
    }
    if b.width() == 0.0 && b.height() == 0.0 {
        return a.contains(b.center());
    }
    if b.contains(a.center()) || a.contains(b.center()) {
        return true;
    }
    (0..4).any(|i| (0..4).any(|j| segment_segment(&a.get_edge(i), &b.get_edge(j))))
}

impl Intersects<Point> for Point {
    fn intersects(&self, other: &Point) -> bool {
        point_point(*self, *other)
    }
}
impl Intersects<Segment> for Point {
    fn intersects(&self, other: &Segment) -> bool {
        point_segment(*self, other)
    }
}
impl Intersects<Triangle> for Point {
    fn intersects(&self, other: &Triangle) -> bool {
        other.contains(*self)
    }
}
impl Intersects<Rect> for Point {
    fn intersects(&self, other: &Rect) -> bool {
        other.contains(*self)
    }
}
impl Intersects<Quad> for Point {
    fn intersects(&self, other: &Quad) -> bool {
        other.contains(*self)
    }
}

impl Intersects<Point> for Segment {
    fn intersects(&self, other: &Point) -> bool {
        point_segment(*other, self)
    }
}
impl Intersects<Segment> for Segment {
    fn intersects(&self, other: &Segment) -> bool {
        segment_segment(self, other)
    }
}
impl Intersects<Triangle> for Segment {
    fn intersects(&self, other: &Triangle) -> bool {
        segment_triangle(self, other)
    }
}
impl Intersects<Rect> for Segment {
    fn intersects(&self, other: &Rect) -> bool {
        segment_rect(self, other)
    }
}
impl Intersects<Quad> for Segment {
    fn intersects(&self, other: &Quad) -> bool {
        segment_quad(self, other)
    }
}

impl Intersects<Point> for Triangle {
    fn intersects(&self, other: &Point) -> bool {
        self.contains(*other)
    }
}
impl Intersects<Segment> for Triangle {
    fn intersects(&self, other: &Segment) -> bool {
        segment_triangle(other, self)
    }
}
impl Intersects<Triangle> for Triangle {
    fn intersects(&self, other: &Triangle) -> bool {
        triangle_triangle(self, other)
    }
}
impl Intersects<Rect> for Triangle {
    fn intersects(&self, other: &Rect) -> bool {
        triangle_rect(self, other)
    }
}
impl Intersects<Quad> for Triangle {
    fn intersects(&self, other: &Quad) -> bool {
        triangle_quad(self, other)
    }
}

impl Intersects<Point> for Rect {
    fn intersects(&self, other: &Point) -> bool {
        self.contains(*other)
    }
}
impl Intersects<Segment> for Rect {
    fn intersects(&self, other: &Segment) -> bool {
        segment_rect(other, self)
    }
}
impl Intersects<Triangle> for Rect {
    fn intersects(&self, other: &Triangle) -> bool {
        triangle_rect(other, self)
    }
}
impl Intersects<Rect> for Rect {
    fn intersects(&self, other: &Rect) -> bool {
        rect_rect(self, other)
    }
}
impl Intersects<Quad> for Rect {
    fn intersects(&self, other: &Quad) -> bool {
        rect_quad(self, other)
    }
}

impl Intersects<Point> for Quad {
    fn intersects(&self, other: &Point) -> bool {
        self.contains(*other)
    }
}
impl Intersects<Segment> for Quad {
    fn intersects(&self, other: &Segment) -> bool {
        segment_quad(other, self)
    }
}
impl Intersects<Triangle> for Quad {
    fn intersects(&self, other: &Triangle) -> bool {
        triangle_quad(other, self)
    }
}
impl Intersects<Rect> for Quad {
    fn intersects(&self, other: &Rect) -> bool {
        rect_quad(other, self)
    }
}
impl Intersects<Quad> for Quad {
    fn intersects(&self, other: &Quad) -> bool {
        quad_quad(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Angle;

    #[test]
    fn test_point_point() {
        assert!(Point::new(1.0, 2.0).intersects(&Point::new(1.0, 2.0)));
        assert!(!Point::new(1.0, 2.0).intersects(&Point::new(1.0, 2.5)));
    }

    #[test]
    fn test_point_segment_colinear_range() {
        let segment = Segment::new(Point::new(1.0, 1.0), Point::new(11.0, 11.0));
        assert!(Point::new(6.0, 6.0).intersects(&segment));
        assert!(Point::new(1.0, 1.0).intersects(&segment));
        // Colinear but beyond the end.
        assert!(!Point::new(20.0, 20.0).intersects(&segment));
        // Off the line entirely.
        assert!(!Point::new(6.0, 6.5).intersects(&segment));
        // Symmetry.
        assert!(segment.intersects(&Point::new(6.0, 6.0)));
    }

    #[test]
    fn test_point_degenerate_segment() {
        let degenerate = Segment::new(Point::new(2.0, 2.0), Point::new(2.0, 2.0));
        assert!(Point::new(2.0, 2.0).intersects(&degenerate));
        assert!(!Point::new(2.0, 3.0).intersects(&degenerate));
    }

    #[test]
    fn test_segment_segment_crossing() {
        let a = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let b = Segment::new(Point::new(0.0, 10.0), Point::new(10.0, 0.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_segment_segment_touching_endpoint() {
        let a = Segment::new(Point::new(0.0, 0.0), Point::new(5.0, 5.0));
        let b = Segment::new(Point::new(5.0, 5.0), Point::new(9.0, 0.0));
        assert!(a.intersects(&b));
        // An endpoint resting on the other segment's interior.
        let c = Segment::new(Point::new(2.0, 2.0), Point::new(2.0, -7.0));
        assert!(a.intersects(&c));
    }

    #[test]
    fn test_segment_segment_parallel_and_collinear() {
        let a = Segment::new(Point::new(0.0, 0.0), Point::new(4.0, 0.0));
        let parallel = Segment::new(Point::new(0.0, 1.0), Point::new(4.0, 1.0));
        assert!(!a.intersects(&parallel));

        let overlapping = Segment::new(Point::new(3.0, 0.0), Point::new(9.0, 0.0));
        assert!(a.intersects(&overlapping));

        let disjoint_collinear = Segment::new(Point::new(5.0, 0.0), Point::new(9.0, 0.0));
        assert!(!a.intersects(&disjoint_collinear));

        // Collinear and containing.
        let containing = Segment::new(Point::new(-1.0, 0.0), Point::new(5.0, 0.0));
        assert!(a.intersects(&containing));
    }

    #[test]
    fn test_segment_segment_near_miss() {
        let a = Segment::new(Point::new(0.0, 0.0), Point::new(4.0, 0.0));
        let b = Segment::new(Point::new(2.0, 0.1), Point::new(2.0, 5.0));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_segment_triangle() {
        let triangle = Triangle::new(
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 4.0),
        );
        // Fully contained.
        assert!(Segment::new(Point::new(0.5, 0.5), Point::new(1.0, 1.0)).intersects(&triangle));
        // Crossing an edge.
        assert!(Segment::new(Point::new(-1.0, 1.0), Point::new(1.0, 1.0)).intersects(&triangle));
        // Disjoint.
        assert!(!Segment::new(Point::new(5.0, 5.0), Point::new(6.0, 6.0)).intersects(&triangle));
        // Point-like triangle.
        let point_tri = Triangle::new(
            Point::new(1.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 0.0),
        );
        assert!(Segment::new(Point::new(0.0, 0.0), Point::new(2.0, 0.0)).intersects(&point_tri));
    }

    #[test]
    fn test_segment_rect_and_quad() {
        let rect = Rect::from_two_points(Point::new(0.0, 0.0), Point::new(4.0, 4.0));
        assert!(Segment::new(Point::new(-1.0, 2.0), Point::new(5.0, 2.0)).intersects(&rect));
        assert!(Segment::new(Point::new(1.0, 1.0), Point::new(2.0, 2.0)).intersects(&rect));
        assert!(!Segment::new(Point::new(5.0, 5.0), Point::new(6.0, 5.0)).intersects(&rect));

        let quad = Quad::from_center_dimensions_and_rotation(
            Point::new(0.0, 0.0),
            4.0,
            2.0,
            Angle::degrees(45.0),
        );
        assert!(Segment::new(Point::new(0.0, 0.0), Point::new(9.0, 0.0)).intersects(&quad));
        assert!(!Segment::new(Point::new(4.0, 0.0), Point::new(9.0, 0.0)).intersects(&quad));
    }

    #[test]
    fn test_triangle_triangle() {
        let a = Triangle::new(
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 4.0),
        );
        // One inside the other.
        let inner = Triangle::new(
            Point::new(0.5, 0.5),
            Point::new(1.5, 0.5),
            Point::new(0.5, 1.5),
        );
        assert!(a.intersects(&inner));
        assert!(inner.intersects(&a));
        // Overlapping edges only.
        let crossing = Triangle::new(
            Point::new(2.0, -1.0),
            Point::new(2.0, 5.0),
            Point::new(6.0, 2.0),
        );
        assert!(a.intersects(&crossing));
        // Disjoint.
        let far = Triangle::new(
            Point::new(10.0, 10.0),
            Point::new(11.0, 10.0),
            Point::new(10.0, 11.0),
        );
        assert!(!a.intersects(&far));
    }

    #[test]
    fn test_rect_rect_corner_touch() {
        let a = Rect::from_two_points(Point::new(-100.0, -100.0), Point::new(100.0, 100.0));
        let touching = Rect::from_two_points(Point::new(100.0, 100.0), Point::new(200.0, 200.0));
        assert!(a.intersects(&touching));
        let separated =
            Rect::from_two_points(Point::new(100.001, 100.0), Point::new(200.0, 200.0));
        assert!(!a.intersects(&separated));
    }

    #[test]
    fn test_rect_quad_and_quad_quad() {
        let rect = Rect::from_two_points(Point::new(-1.0, -1.0), Point::new(1.0, 1.0));
        let quad = Quad::from_center_dimensions_and_rotation(
            Point::new(1.5, 0.0),
            2.0,
            2.0,
            Angle::degrees(45.0),
        );
        assert!(rect.intersects(&quad));
        assert!(quad.intersects(&rect));

        let far_quad = Quad::from_center_and_dimensions(Point::new(10.0, 10.0), 1.0, 1.0);
        assert!(!rect.intersects(&far_quad));
        assert!(!quad_quad(&quad, &far_quad));

        // A point-like quad inside the other.
        let point_quad = Quad::from_center_and_dimensions(Point::new(0.5, 0.5), 0.0, 0.0);
        assert!(rect.intersects(&point_quad));
        assert!(point_quad.intersects(&rect));
    }

    #[test]
    fn test_symmetry_across_primitive_pairs() {
        let point = Point::new(0.5, 0.5);
        let segment = Segment::new(Point::new(0.0, 0.0), Point::new(2.0, 2.0));
        let triangle = Triangle::new(
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(0.0, 3.0),
        );
        let rect = Rect::from_two_points(Point::new(-1.0, -1.0), Point::new(1.0, 1.0));
        let quad = Quad::from_center_and_dimensions(Point::new(0.0, 0.0), 2.0, 2.0);

        assert_eq!(point.intersects(&segment), segment.intersects(&point));
        assert_eq!(point.intersects(&triangle), triangle.intersects(&point));
        assert_eq!(point.intersects(&rect), rect.intersects(&point));
        assert_eq!(point.intersects(&quad), quad.intersects(&point));
        assert_eq!(segment.intersects(&triangle), triangle.intersects(&segment));
        assert_eq!(segment.intersects(&rect), rect.intersects(&segment));
        assert_eq!(segment.intersects(&quad), quad.intersects(&segment));
        assert_eq!(triangle.intersects(&rect), rect.intersects(&triangle));
        assert_eq!(triangle.intersects(&quad), quad.intersects(&triangle));
        assert_eq!(rect.intersects(&quad), quad.intersects(&rect));
    }
}
