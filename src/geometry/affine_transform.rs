//! Affine transformations in the plane.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Mul;

use super::angle::Angle;
use super::point::{Point, Vec2};
use super::quad::Quad;
use super::rect::Rect;
use super::segment::Segment;
use super::triangle::Triangle;

/// An affine transformation in the plane, stored row-major as the top two
/// rows of the 3×3 matrix:
///
/// ```text
///   ⎡a  b  c⎤   ⎡x⎤   ⎡a·x + b·y + c⎤
///   ⎢d  e  f⎥ * ⎢y⎥ = ⎢d·x + e·y + f⎥
///   ⎣0  0  1⎦   ⎣1⎦   ⎣      1      ⎦
/// ```
///
/// Transformations compose via multiplication, which is not commutative; the
/// left-hand side is applied *after* the right-hand side, so
/// `rotate * translate` first translates and then rotates about the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for AffineTransform {
    fn default() -> Self {
        AffineTransform::IDENTITY
    }
}

impl AffineTransform {
    /// The identity transformation, which maps every point to itself.
    pub const IDENTITY: AffineTransform = AffineTransform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 0.0,
        e: 1.0,
        f: 0.0,
    };

    /// Constructs a transformation from its six coefficients, row-major.
    /// You may find it easier to compose the named factories instead.
    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        AffineTransform { a, b, c, d, e, f }
    }

    /// A transformation that translates by `offset`.
    pub fn translate(offset: Vec2) -> Self {
        AffineTransform::new(1.0, 0.0, offset.x, 0.0, 1.0, offset.y)
    }

    /// A transformation that scales both directions by `factor`, centered
    /// about the origin.
    pub fn scale(factor: f32) -> Self {
        AffineTransform::scale_xy(factor, factor)
    }

    /// A transformation that scales by the given pair of factors, centered
    /// about the origin.
    pub fn scale_xy(x_factor: f32, y_factor: f32) -> Self {
        AffineTransform::new(x_factor, 0.0, 0.0, 0.0, y_factor, 0.0)
    }

    /// A transformation that scales in the x-direction only.
    pub fn scale_x(factor: f32) -> Self {
        AffineTransform::scale_xy(factor, 1.0)
    }

    /// A transformation that scales in the y-direction only.
    pub fn scale_y(factor: f32) -> Self {
        AffineTransform::scale_xy(1.0, factor)
    }

    /// A transformation that rotates by `angle` about the origin.
    pub fn rotate(angle: Angle) -> Self {
        let sin = angle.sin();
        let cos = angle.cos();
        AffineTransform::new(cos, -sin, 0.0, sin, cos, 0.0)
    }

    /// A transformation that shears in the x-direction by `factor`.
    pub fn shear_x(factor: f32) -> Self {
        AffineTransform::new(1.0, factor, 0.0, 0.0, 1.0, 0.0)
    }

    /// A transformation that shears in the y-direction by `factor`.
    pub fn shear_y(factor: f32) -> Self {
        AffineTransform::new(1.0, 0.0, 0.0, factor, 1.0, 0.0)
    }

    /// A transformation that scales both directions by `factor`, centered
    /// about `center`. Equivalent to translating `center` to the origin,
    /// scaling, and translating back.
    pub fn scale_about_point(factor: f32, center: Point) -> Self {
        AffineTransform::scale_xy_about_point(factor, factor, center)
    }

    /// As `scale_about_point`, with independent factors.
    pub fn scale_xy_about_point(x_factor: f32, y_factor: f32, center: Point) -> Self {
        AffineTransform::new(
            x_factor,
            0.0,
            center.x - x_factor * center.x,
            0.0,
            y_factor,
            center.y - y_factor * center.y,
        )
    }

    /// A transformation that rotates by `angle` about `center`.
    pub fn rotate_about_point(angle: Angle, center: Point) -> Self {
        let sin = angle.sin();
        let cos = angle.cos();
        AffineTransform::new(
            cos,
            -sin,
            center.x - center.x * cos + center.y * sin,
            sin,
            cos,
            center.y - center.x * sin - center.y * cos,
        )
    }

    pub fn a(&self) -> f32 {
        self.a
    }
    pub fn b(&self) -> f32 {
        self.b
    }
    pub fn c(&self) -> f32 {
        self.c
    }
    pub fn d(&self) -> f32 {
        self.d
    }
    pub fn e(&self) -> f32 {
        self.e
    }
    pub fn f(&self) -> f32 {
        self.f
    }

    /// Returns the inverse transformation, or `None` if the determinant
    /// `a·e − b·d` is zero (the transform collapses the plane to a segment
    /// or a point, and cannot be inverted).
    pub fn inverse(&self) -> Option<AffineTransform> {
        let determinant = self.a * self.e - self.b * self.d;
        if determinant == 0.0 {
            return None;
        }
        Some(AffineTransform::new(
            self.e / determinant,
            -self.b / determinant,
            (self.b * self.f - self.c * self.e) / determinant,
            -self.d / determinant,
            self.a / determinant,
            (self.c * self.d - self.a * self.f) / determinant,
        ))
    }

    pub fn apply_point(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.b * p.y + self.c,
            self.d * p.x + self.e * p.y + self.f,
        )
    }

    /// Applies the linear part only (no translation); this is how
    /// displacement vectors transform.
    fn apply_vec(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.a * v.x + self.b * v.y, self.d * v.x + self.e * v.y)
    }

    pub fn apply_segment(&self, s: &Segment) -> Segment {
        Segment::new(self.apply_point(s.start), self.apply_point(s.end))
    }

    pub fn apply_triangle(&self, t: &Triangle) -> Triangle {
        Triangle::new(
            self.apply_point(t.p0),
            self.apply_point(t.p1),
            self.apply_point(t.p2),
        )
    }

    /// Applies the transformation to a `Quad`, recovering the parameters of
    /// the image parallelogram. Zero-width and zero-height `Quad`s
    /// substitute unit axes so that the rotation of the image is still
    /// meaningful.
    pub fn apply_quad(&self, q: &Quad) -> Quad {
        let new_center = self.apply_point(q.center());
        let (semi_u, semi_v) = q.semi_axes();
        let u = if q.width() == 0.0 {
            Vec2::from_direction_and_magnitude(q.rotation(), 1.0)
        } else {
            semi_u
        };
        let v = if q.height() == 0.0 {
            q.shear_factor() * u + u.orthogonal()
        } else {
            semi_v
        };
        let u = self.apply_vec(u);
        let v = self.apply_vec(v);

        let u_magnitude = u.magnitude();
        let u_dot_v = Vec2::dot(u, v);
        let u_cross_v = Vec2::determinant(u, v);

        let new_width = if q.width() == 0.0 { 0.0 } else { 2.0 * u_magnitude };
        let new_height = if q.height() == 0.0 || u_cross_v == 0.0 {
            0.0
        } else {
            2.0 * u_cross_v / u_magnitude
        };
        let new_rotation = u.direction();
        let new_shear = if u_cross_v == 0.0 {
            0.0
        } else {
            u_dot_v / u_cross_v
        };

        Quad::from_center_dimensions_rotation_and_shear(
            new_center, new_width, new_height, new_rotation, new_shear,
        )
    }

    /// Applies the transformation to a `Rect`. Since the transformation may
    /// rotate or shear, the result is a `Quad`, not a `Rect`; take the
    /// envelope of the result if axis-aligned bounds are needed.
    pub fn apply_rect(&self, r: &Rect) -> Quad {
        self.apply_quad(&Quad::from_rect(r))
    }

    /// Finds the isotropic transformation (translate · uniform-scale ·
    /// rotate · translate) that maps `from` onto `to`. Returns `None` when
    /// `from` has zero length and `to` does not, since a zero-length segment
    /// cannot be scaled onto a non-degenerate one. Two zero-length segments
    /// yield a pure translation. Anti-parallel segments produce a half-turn
    /// rotation, never a negative scale factor.
    pub fn find_segment_to_segment(from: &Segment, to: &Segment) -> Option<AffineTransform> {
        let from_length = from.length();
        let to_length = to.length();
        if from_length == 0.0 {
            if to_length == 0.0 {
                return Some(AffineTransform::translate(to.start - from.start));
            }
            return None;
        }

        let scale = to_length / from_length;
        let rotation = Vec2::signed_angle_between(from.vector(), to.vector());
        let scaled_sin = scale * rotation.sin();
        let scaled_cos = scale * rotation.cos();
        let v1 = -from.start.offset();
        let v2 = to.start.offset();

        // Equivalent to:
        //   translate(v2) * scale(scale) * rotate(rotation) * translate(v1)
        Some(AffineTransform::new(
            scaled_cos,
            -scaled_sin,
            scaled_cos * v1.x - scaled_sin * v1.y + v2.x,
            scaled_sin,
            scaled_cos,
            scaled_sin * v1.x + scaled_cos * v1.y + v2.y,
        ))
    }

    /// Finds the unique affine transformation sending each corner of `from`
    /// to the corresponding corner of `to`. Returns `None` when `from` is
    /// degenerate (zero area). A degenerate `to` triangle is permitted.
    pub fn find_triangle_to_triangle(from: &Triangle, to: &Triangle) -> Option<AffineTransform> {
        let (a0, a1, a2) = (from.p0, from.p1, from.p2);
        let (b0, b1, b2) = (to.p0, to.p1, to.p2);

        // The shared denominator of every term; zero if and only if `from`
        // has zero area.
        let d = (a1.x * a0.y) - (a2.x * a0.y) - (a0.x * a1.y)
            + (a2.x * a1.y)
            + (a0.x * a2.y)
            - (a1.x * a2.y);

        // With large enough coordinates, `d` can come out very small but
        // nonzero purely from floating-point error, so the signed area is
        // checked as well.
        if d == 0.0 || from.signed_area() == 0.0 {
            return None;
        }

        let n0 = (b1.x * a0.y) - (b2.x * a0.y) - (b0.x * a1.y)
            + (b2.x * a1.y)
            + (b0.x * a2.y)
            - (b1.x * a2.y);
        let n1 = (b1.x * a0.x) - (b2.x * a0.x) - (b0.x * a1.x)
            + (b2.x * a1.x)
            + (b0.x * a2.x)
            - (b1.x * a2.x);
        let n2 = (b2.x * a1.x * a0.y) - (b1.x * a2.x * a0.y) - (b2.x * a0.x * a1.y)
            + (b0.x * a2.x * a1.y)
            + (b1.x * a0.x * a2.y)
            - (b0.x * a1.x * a2.y);
        let n3 = (b1.y * a0.y) - (b2.y * a0.y) - (b0.y * a1.y)
            + (b2.y * a1.y)
            + (b0.y * a2.y)
            - (b1.y * a2.y);
        let n4 = (b1.y * a0.x) - (b2.y * a0.x) - (b0.y * a1.x)
            + (b2.y * a1.x)
            + (b0.y * a2.x)
            - (b1.y * a2.x);
        let n5 = (b2.y * a1.x * a0.y) - (b1.y * a2.x * a0.y) - (b2.y * a0.x * a1.y)
            + (b0.y * a2.x * a1.y)
            + (b1.y * a0.x * a2.y)
            - (b0.y * a1.x * a2.y);

        Some(AffineTransform::new(
            n0 / d,
            n1 / -d,
            n2 / d,
            n3 / d,
            n4 / -d,
            n5 / d,
        ))
    }

    /// Finds the transformation mapping `from` onto `to`, via three of each
    /// rect's corners. Returns `None` when `from` has zero area.
    pub fn find_rect_to_rect(from: &Rect, to: &Rect) -> Option<AffineTransform> {
        let a = from.corners();
        let b = to.corners();
        AffineTransform::find_triangle_to_triangle(
            &Triangle::new(a[0], a[1], a[2]),
            &Triangle::new(b[0], b[1], b[2]),
        )
    }

    /// Finds the transformation mapping `from` onto `to`, via three of each
    /// quad's corners. Returns `None` when `from` has zero area.
    pub fn find_quad_to_quad(from: &Quad, to: &Quad) -> Option<AffineTransform> {
        let a = from.corners();
        let b = to.corners();
        AffineTransform::find_triangle_to_triangle(
            &Triangle::new(a[0], a[1], a[2]),
            &Triangle::new(b[0], b[1], b[2]),
        )
    }
}

impl Mul for AffineTransform {
    type Output = AffineTransform;

    fn mul(self, rhs: AffineTransform) -> AffineTransform {
        AffineTransform::new(
            self.a * rhs.a + self.b * rhs.d,
            self.a * rhs.b + self.b * rhs.e,
            self.a * rhs.c + self.b * rhs.f + self.c,
            self.d * rhs.a + self.e * rhs.d,
            self.d * rhs.b + self.e * rhs.e,
            self.d * rhs.c + self.e * rhs.f + self.f,
        )
    }
}

impl fmt::Display for AffineTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AffineTransform({}, {}, {}, {}, {}, {})",
            self.a, self.b, self.c, self.d, self.e, self.f
        )
    }
}
