//! Axis-aligned rectangles.

use super::point::{Point, Vec2};
use super::segment::Segment;

/// An axis-aligned rectangle, a.k.a. an axis-aligned bounding box. Defined by
/// its minimum and maximum x- and y-values; the constructors maintain
/// `x_min ≤ x_max` and `y_min ≤ y_max`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    x_min: f32,
    y_min: f32,
    x_max: f32,
    y_max: f32,
}

impl Rect {
    /// Constructs a `Rect` centered on `center` with the given dimensions.
    /// Panics if either dimension is negative.
    pub fn from_center_and_dimensions(center: Point, width: f32, height: f32) -> Rect {
        assert!(
            width >= 0.0 && height >= 0.0,
            "Cannot construct a rectangle with negative width or height"
        );
        Rect {
            x_min: center.x - width / 2.0,
            y_min: center.y - height / 2.0,
            x_max: center.x + width / 2.0,
            y_max: center.y + height / 2.0,
        }
    }

    /// Constructs the smallest `Rect` containing both points.
    pub fn from_two_points(a: Point, b: Point) -> Rect {
        Rect {
            x_min: a.x.min(b.x),
            y_min: a.y.min(b.y),
            x_max: a.x.max(b.x),
            y_max: a.y.max(b.y),
        }
    }

    pub fn x_min(&self) -> f32 {
        self.x_min
    }
    pub fn y_min(&self) -> f32 {
        self.y_min
    }
    pub fn x_max(&self) -> f32 {
        self.x_max
    }
    pub fn y_max(&self) -> f32 {
        self.y_max
    }

    pub fn center(&self) -> Point {
        Point::new(
            0.5 * self.x_min + 0.5 * self.x_max,
            0.5 * self.y_min + 0.5 * self.y_max,
        )
    }

    /// Moves the `Rect` so that it is centered on `center`, preserving its
    /// width and height.
    pub fn set_center(&mut self, center: Point) {
        let half_width = self.semi_width();
        let half_height = self.semi_height();
        self.x_min = center.x - half_width;
        self.x_max = center.x + half_width;
        self.y_min = center.y - half_height;
        self.y_max = center.y + half_height;
    }

    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    /// Sets the width, preserving center and height. Panics if `width` is
    /// negative.
    pub fn set_width(&mut self, width: f32) {
        assert!(width >= 0.0, "Cannot set a width less than 0");
        let x_center = (self.x_min + self.x_max) / 2.0;
        self.x_min = x_center - width / 2.0;
        self.x_max = x_center + width / 2.0;
    }

    /// Half the width. Unlike `width() / 2`, this is guaranteed to be finite
    /// whenever the bounds are finite; the halving happens before the
    /// subtraction so the intermediate cannot overflow.
    pub fn semi_width(&self) -> f32 {
        0.5 * self.x_max - 0.5 * self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// Sets the height, preserving center and width. Panics if `height` is
    /// negative.
    pub fn set_height(&mut self, height: f32) {
        assert!(height >= 0.0, "Cannot set a height less than 0");
        let y_center = (self.y_min + self.y_max) / 2.0;
        self.y_min = y_center - height / 2.0;
        self.y_max = y_center + height / 2.0;
    }

    /// Half the height; same overflow guarantee as `semi_width`.
    pub fn semi_height(&self) -> f32 {
        0.5 * self.y_max - 0.5 * self.y_min
    }

    /// Width divided by height. Panics if the height is zero.
    pub fn aspect_ratio(&self) -> f32 {
        assert!(
            self.height() != 0.0,
            "Cannot determine the aspect ratio when the height is 0"
        );
        self.width() / self.height()
    }

    /// The area of the `Rect`; always non-negative.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// The corners, in the order `(x_min, y_min)`, `(x_max, y_min)`,
    /// `(x_max, y_max)`, `(x_min, y_max)`.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x_min, self.y_min),
            Point::new(self.x_max, self.y_min),
            Point::new(self.x_max, self.y_max),
            Point::new(self.x_min, self.y_max),
        ]
    }

    /// Returns the edge from corner `index` to corner `(index + 1) % 4`, as
    /// per `corners`. Panics if `index` is not 0, 1, 2, or 3.
    pub fn get_edge(&self, index: usize) -> Segment {
        let corners = self.corners();
        assert!(index < 4, "Rect edge index must be 0, 1, 2, or 3; got {index}");
        Segment::new(corners[index], corners[(index + 1) % 4])
    }

    /// Returns whether `point` lies inside the `Rect`; points exactly on the
    /// boundary are contained.
    pub fn contains(&self, point: Point) -> bool {
        self.x_min <= point.x
            && self.x_max >= point.x
            && self.y_min <= point.y
            && self.y_max >= point.y
    }

    /// Returns whether `rect` lies entirely inside this one; overlapping
    /// boundaries count as contained.
    pub fn contains_rect(&self, rect: &Rect) -> bool {
        self.x_min <= rect.x_min
            && self.x_max >= rect.x_max
            && self.y_min <= rect.y_min
            && self.y_max >= rect.y_max
    }

    /// Moves each side outward a distance of `offset` (inward for negative
    /// values). If an inset would make the width or height negative, that
    /// dimension is set to zero instead.
    pub fn offset(&mut self, offset: f32) {
        self.offset_xy(offset, offset);
    }

    /// As `offset`, with independent horizontal and vertical distances.
    pub fn offset_xy(&mut self, horizontal_offset: f32, vertical_offset: f32) {
        self.x_min -= horizontal_offset;
        self.x_max += horizontal_offset;
        self.y_min -= vertical_offset;
        self.y_max += vertical_offset;
        if self.width() < 0.0 {
            self.set_width(0.0);
        }
        if self.height() < 0.0 {
            self.set_height(0.0);
        }
    }

    /// Scales width and height by `scale`, preserving the center. Panics if
    /// `scale` is negative.
    pub fn scale(&mut self, scale: f32) {
        self.scale_xy(scale, scale);
    }

    /// As `scale`, with independent factors. Panics if either is negative.
    pub fn scale_xy(&mut self, x_scale: f32, y_scale: f32) {
        assert!(
            x_scale >= 0.0 && y_scale >= 0.0,
            "Cannot scale a rectangle by a value less than 0"
        );
        self.offset_xy(
            -0.5 * (1.0 - x_scale) * self.width(),
            -0.5 * (1.0 - y_scale) * self.height(),
        );
    }

    /// Moves the `Rect` by `offset`, preserving width and height.
    pub fn translate(&mut self, offset: Vec2) {
        self.x_min += offset.x;
        self.x_max += offset.x;
        self.y_min += offset.y;
        self.y_max += offset.y;
    }

    /// Expands the `Rect` so that it contains `point`.
    pub fn join(&mut self, point: Point) {
        self.x_min = self.x_min.min(point.x);
        self.x_max = self.x_max.max(point.x);
        self.y_min = self.y_min.min(point.y);
        self.y_max = self.y_max.max(point.y);
    }

    /// Expands the `Rect` so that it contains `rect`.
    pub fn join_rect(&mut self, rect: &Rect) {
        self.x_min = self.x_min.min(rect.x_min);
        self.x_max = self.x_max.max(rect.x_max);
        self.y_min = self.y_min.min(rect.y_min);
        self.y_max = self.y_max.max(rect.y_max);
    }

    /// Returns a `Rect` with the given aspect ratio that contains this one,
    /// sharing its center, with one dimension unchanged and the other grown
    /// as needed. Panics if `aspect_ratio` is not positive.
    pub fn containing_rect_with_aspect_ratio(&self, aspect_ratio: f32) -> Rect {
        assert!(
            aspect_ratio > 0.0,
            "Cannot produce a containing rectangle with a non-positive aspect ratio"
        );
        let mut result = *self;
        if self.width() < aspect_ratio * self.height() {
            result.set_width(aspect_ratio * self.height());
        } else {
            result.set_height(self.width() / aspect_ratio);
        }
        result
    }

    /// Returns a `Rect` with the given aspect ratio contained within this
    /// one, sharing its center, with one dimension unchanged and the other
    /// shrunk as needed. An aspect ratio of zero produces a zero-width rect
    /// of the same height. Panics if `aspect_ratio` is negative.
    pub fn interior_rect_with_aspect_ratio(&self, aspect_ratio: f32) -> Rect {
        assert!(
            aspect_ratio >= 0.0,
            "Cannot produce an interior rectangle with a negative aspect ratio"
        );
        let mut result = *self;
        if aspect_ratio == 0.0 {
            result.set_width(0.0);
        } else if self.width() > aspect_ratio * self.height() {
            result.set_width(aspect_ratio * self.height());
        } else {
            result.set_height(self.width() / aspect_ratio);
        }
        result
    }

    /// Resizes, setting `x_min`; if the extrema would flip, `x_max` is also
    /// set to the given value.
    pub fn resize_setting_x_min(&mut self, x_min: f32) {
        self.x_min = x_min;
        if self.x_max < self.x_min {
            self.x_max = self.x_min;
        }
    }

    pub fn resize_setting_y_min(&mut self, y_min: f32) {
        self.y_min = y_min;
        if self.y_max < self.y_min {
            self.y_max = self.y_min;
        }
    }

    pub fn resize_setting_x_max(&mut self, x_max: f32) {
        self.x_max = x_max;
        if self.x_min > self.x_max {
            self.x_min = self.x_max;
        }
    }

    pub fn resize_setting_y_max(&mut self, y_max: f32) {
        self.y_max = y_max;
        if self.y_min > self.y_max {
            self.y_min = self.y_max;
        }
    }

    /// Translates, preserving width and height, so that `x_min` equals the
    /// given value.
    pub fn translate_setting_x_min(&mut self, x_min: f32) {
        self.translate(Vec2::new(x_min - self.x_min, 0.0));
    }

    pub fn translate_setting_y_min(&mut self, y_min: f32) {
        self.translate(Vec2::new(0.0, y_min - self.y_min));
    }

    pub fn translate_setting_x_max(&mut self, x_max: f32) {
        self.translate(Vec2::new(x_max - self.x_max, 0.0));
    }

    pub fn translate_setting_y_max(&mut self, y_max: f32) {
        self.translate(Vec2::new(0.0, y_max - self.y_max));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn test_from_two_points_sorts_coordinates() {
        let r = Rect::from_two_points(Point::new(5.0, -1.0), Point::new(-2.0, 3.0));
        assert_eq!(r.x_min(), -2.0);
        assert_eq!(r.y_min(), -1.0);
        assert_eq!(r.x_max(), 5.0);
        assert_eq!(r.y_max(), 3.0);
    }

    #[test]
    fn test_from_center_and_dimensions() {
        let r = Rect::from_center_and_dimensions(Point::new(1.0, 2.0), 4.0, 6.0);
        assert_eq!(r.center(), Point::new(1.0, 2.0));
        assert_eq!(r.width(), 4.0);
        assert_eq!(r.height(), 6.0);
        assert!((r.area() - 24.0).abs() < EPS);
    }

    #[test]
    #[should_panic(expected = "negative width or height")]
    fn test_negative_dimensions_panic() {
        let _ = Rect::from_center_and_dimensions(Point::new(0.0, 0.0), -1.0, 1.0);
    }

    #[test]
    fn test_contains_is_boundary_inclusive() {
        let r = Rect::from_two_points(Point::new(0.0, 0.0), Point::new(2.0, 2.0));
        assert!(r.contains(Point::new(1.0, 1.0)));
        assert!(r.contains(Point::new(0.0, 2.0)));
        assert!(r.contains(Point::new(2.0, 2.0)));
        assert!(!r.contains(Point::new(2.0001, 1.0)));
    }

    #[test]
    fn test_contains_rect() {
        let outer = Rect::from_two_points(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let inner = Rect::from_two_points(Point::new(1.0, 1.0), Point::new(9.0, 10.0));
        assert!(outer.contains_rect(&inner));
        assert!(!inner.contains_rect(&outer));
    }

    #[test]
    fn test_offset_clamps_negative_dimensions_to_zero() {
        let mut r = Rect::from_center_and_dimensions(Point::new(0.0, 0.0), 2.0, 10.0);
        r.offset(-2.0);
        assert_eq!(r.width(), 0.0);
        assert_eq!(r.height(), 6.0);
        assert_eq!(r.center(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_scale_preserves_center() {
        let mut r = Rect::from_center_and_dimensions(Point::new(3.0, -2.0), 4.0, 2.0);
        r.scale(0.5);
        assert_eq!(r.center(), Point::new(3.0, -2.0));
        assert!((r.width() - 2.0).abs() < EPS);
        assert!((r.height() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_join_point_and_rect() {
        let mut r = Rect::from_two_points(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        r.join(Point::new(-1.0, 3.0));
        assert_eq!(r.x_min(), -1.0);
        assert_eq!(r.y_max(), 3.0);
        r.join_rect(&Rect::from_two_points(Point::new(0.0, -5.0), Point::new(4.0, 0.0)));
        assert_eq!(r.x_max(), 4.0);
        assert_eq!(r.y_min(), -5.0);
    }

    #[test]
    fn test_semi_width_does_not_overflow() {
        let r = Rect::from_two_points(
            Point::new(-f32::MAX, -f32::MAX),
            Point::new(f32::MAX, f32::MAX),
        );
        assert!(r.semi_width().is_finite());
        assert!(r.semi_height().is_finite());
    }

    #[test]
    fn test_aspect_ratio_helpers() {
        let r = Rect::from_center_and_dimensions(Point::new(0.0, 0.0), 4.0, 2.0);
        let containing = r.containing_rect_with_aspect_ratio(1.0);
        assert_eq!(containing.width(), 4.0);
        assert_eq!(containing.height(), 4.0);
        let interior = r.interior_rect_with_aspect_ratio(1.0);
        assert_eq!(interior.width(), 2.0);
        assert_eq!(interior.height(), 2.0);
        let zero = r.interior_rect_with_aspect_ratio(0.0);
        assert_eq!(zero.width(), 0.0);
        assert_eq!(zero.height(), 2.0);
    }

    #[test]
    fn test_resize_setting_flips_extrema_together() {
        let mut r = Rect::from_two_points(Point::new(0.0, 0.0), Point::new(2.0, 2.0));
        r.resize_setting_x_min(5.0);
        assert_eq!(r.x_min(), 5.0);
        assert_eq!(r.x_max(), 5.0);
    }

    #[test]
    fn test_translate_setting_preserves_dimensions() {
        let mut r = Rect::from_two_points(Point::new(0.0, 0.0), Point::new(2.0, 3.0));
        r.translate_setting_x_max(10.0);
        assert_eq!(r.x_min(), 8.0);
        assert_eq!(r.x_max(), 10.0);
        assert_eq!(r.height(), 3.0);
    }

    #[test]
    fn test_get_edge_order() {
        let r = Rect::from_two_points(Point::new(0.0, 0.0), Point::new(1.0, 2.0));
        assert_eq!(
            r.get_edge(0),
            Segment::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0))
        );
        assert_eq!(
            r.get_edge(3),
            Segment::new(Point::new(0.0, 2.0), Point::new(0.0, 0.0))
        );
    }
}
