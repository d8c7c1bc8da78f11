//! Directed line segments.

use serde::{Deserialize, Serialize};

use super::point::{Point, Vec2};

/// A directed line segment between two points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Segment { start, end }
    }

    pub fn length(&self) -> f32 {
        self.vector().magnitude()
    }

    /// The displacement from `start` to `end`.
    pub fn vector(&self) -> Vec2 {
        self.end - self.start
    }

    /// Returns the parameter `t` such that `start + t·(end − start)` is the
    /// point on the segment's line closest to `point`. `t` may lie outside
    /// `[0, 1]`. Returns `None` when `start == end`, or when the segment is
    /// so short that its squared magnitude underflows and the projection
    /// cannot be computed reliably.
    pub fn project(&self, point: Point) -> Option<f32> {
        if self.start == self.end {
            return None;
        }
        let v = self.vector();
        let magnitude_squared = v.magnitude_squared();
        if magnitude_squared == 0.0 {
            return None;
        }
        Some(Vec2::dot(point - self.start, v) / magnitude_squared)
    }

    /// The point at parameter `t` along the segment.
    pub fn lerp(&self, t: f32) -> Point {
        self.start + self.vector() * t
    }
}
