//! Node paths: how an entity connects to its nodes.
//!
//! Three visualizations are supported by the editor:
//! - **Polyline**: entity → node 1 → node 2 → …
//! - **Fan**: entity → each node independently
//! - **Circle**: a circle centred on the entity passing through the first node
//!
//! Each shape also answers "how far is this point from me", which the
//! editor uses to pick connections under the cursor.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rect;

/// A straight line between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start point
    pub start: Vec2,
    /// End point
    pub end: Vec2,
}

impl Segment {
    /// Create a segment.
    #[must_use]
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// Length of the segment.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Shortest distance from `point` to any point on the segment.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        let span = self.end - self.start;
        let length_sq = span.length_squared();
        if length_sq == 0.0 {
            return point.distance(self.start);
        }
        let t = ((point - self.start).dot(span) / length_sq).clamp(0.0, 1.0);
        point.distance(self.start + span * t)
    }

    /// Bounding rectangle of the segment.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_corners(self.start, self.end)
    }
}

/// A circle given by centre and radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Centre point
    pub center: Vec2,
    /// Radius
    pub radius: f32,
}

impl Circle {
    /// Distance from `point` to the circle's outline.
    #[must_use]
    pub fn distance_to_outline(&self, point: Vec2) -> f32 {
        (point.distance(self.center) - self.radius).abs()
    }

    /// Bounding square of the circle.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::centered(self.center, self.radius * 2.0)
    }
}

/// Consecutive segments through `points` in order.
///
/// Fewer than two points produce no segments.
#[must_use]
pub fn polyline_segments(points: &[Vec2]) -> Vec<Segment> {
    points
        .windows(2)
        .map(|pair| Segment::new(pair[0], pair[1]))
        .collect()
}

/// One segment from `center` to each of `points`.
#[must_use]
pub fn fan_segments(center: Vec2, points: &[Vec2]) -> Vec<Segment> {
    points.iter().map(|&point| Segment::new(center, point)).collect()
}

/// Circle centred on `center` whose outline passes through `point`.
#[must_use]
pub fn circle_through(center: Vec2, point: Vec2) -> Circle {
    Circle {
        center,
        radius: center.distance(point),
    }
}

/// Position for a node inserted after an anchor.
///
/// The new node sits `spacing` units to the right of the anchor's right edge
/// (`anchor.x + anchor_width + spacing`) at the anchor's `y`. For a node
/// anchor the width is zero.
///
/// ```
/// use glam::Vec2;
/// use tessera_geom::next_node_position;
///
/// let pos = next_node_position(Vec2::new(16.0, 24.0), 32.0, 8.0);
/// assert_eq!(pos, Vec2::new(56.0, 24.0));
/// ```
#[must_use]
pub fn next_node_position(anchor: Vec2, anchor_width: f32, spacing: f32) -> Vec2 {
    Vec2::new(anchor.x + anchor_width + spacing, anchor.y)
}
