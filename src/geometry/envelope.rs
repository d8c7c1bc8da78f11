//! Possibly-empty axis-aligned bounds.

use super::point::Point;
use super::quad::Quad;
use super::rect::Rect;
use super::segment::Segment;
use super::triangle::Triangle;

/// The smallest axis-aligned region covering whatever has been added to it.
/// Unlike [`Rect`], an `Envelope` may be empty.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Envelope {
    rect: Option<Rect>,
}

impl Envelope {
    pub fn new() -> Envelope {
        Envelope { rect: None }
    }

    pub fn is_empty(&self) -> bool {
        self.rect.is_none()
    }

    /// The bounds as a `Rect`, or `None` if nothing has been added.
    pub fn as_rect(&self) -> Option<Rect> {
        self.rect
    }

    pub fn add_point(&mut self, point: Point) {
        match &mut self.rect {
            Some(rect) => rect.join(point),
            None => self.rect = Some(Rect::from_two_points(point, point)),
        }
    }

    pub fn add_rect(&mut self, rect: &Rect) {
        match &mut self.rect {
            Some(existing) => existing.join_rect(rect),
            None => self.rect = Some(*rect),
        }
    }

    pub fn add_envelope(&mut self, other: &Envelope) {
        if let Some(rect) = &other.rect {
            self.add_rect(rect);
        }
    }

    /// The envelope of anything with a bounding rectangle.
    pub fn of(bounded: &impl Bounded) -> Envelope {
        Envelope {
            rect: Some(bounded.bounding_rect()),
        }
    }
}

/// Implemented by primitives whose axis-aligned bounds are always non-empty.
pub trait Bounded {
    fn bounding_rect(&self) -> Rect;
}

impl Bounded for Point {
    fn bounding_rect(&self) -> Rect {
        Rect::from_two_points(*self, *self)
    }
}

impl Bounded for Segment {
    fn bounding_rect(&self) -> Rect {
        Rect::from_two_points(self.start, self.end)
    }
}

impl Bounded for Triangle {
    fn bounding_rect(&self) -> Rect {
        let mut rect = Rect::from_two_points(self.p0, self.p1);
        rect.join(self.p2);
        rect
    }
}

impl Bounded for Rect {
    fn bounding_rect(&self) -> Rect {
        *self
    }
}

impl Bounded for Quad {
    fn bounding_rect(&self) -> Rect {
        let corners = self.corners();
        let mut rect = Rect::from_two_points(corners[0], corners[1]);
        rect.join(corners[2]);
        rect.join(corners[3]);
        rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_envelope() {
        let env = Envelope::new();
        assert!(env.is_empty());
        assert_eq!(env.as_rect(), None);
    }

    #[test]
    fn test_add_points_accumulates() {
        let mut env = Envelope::new();
        env.add_point(Point::new(1.0, 2.0));
        env.add_point(Point::new(-3.0, 5.0));
        let rect = env.as_rect().unwrap();
        assert_eq!(rect.x_min(), -3.0);
        assert_eq!(rect.y_min(), 2.0);
        assert_eq!(rect.x_max(), 1.0);
        assert_eq!(rect.y_max(), 5.0);
    }

    #[test]
    fn test_add_envelope_ignores_empty() {
        let mut env = Envelope::of(&Point::new(1.0, 1.0));
        env.add_envelope(&Envelope::new());
        assert_eq!(
            env.as_rect().unwrap(),
            Rect::from_two_points(Point::new(1.0, 1.0), Point::new(1.0, 1.0))
        );
    }

    #[test]
    fn test_bounds_of_primitives() {
        let tri = Triangle::new(
            Point::new(0.0, 0.0),
            Point::new(4.0, 1.0),
            Point::new(2.0, -3.0),
        );
        let rect = tri.bounding_rect();
        assert_eq!(rect.x_min(), 0.0);
        assert_eq!(rect.y_min(), -3.0);
        assert_eq!(rect.x_max(), 4.0);
        assert_eq!(rect.y_max(), 1.0);

        let quad = Quad::from_center_dimensions_and_rotation(
            Point::new(0.0, 0.0),
            2.0,
            2.0,
            crate::geometry::Angle::degrees(45.0),
        );
        let quad_rect = quad.bounding_rect();
        let expected = std::f32::consts::SQRT_2;
        assert!((quad_rect.x_max() - expected).abs() < 1e-5);
        assert!((quad_rect.y_min() + expected).abs() < 1e-5);
    }
}
