//! # Tessera Geom
//!
//! Geometry substrate for the Tessera level editor.
//!
//! Everything here is a pure function over plain values: no handlers, no
//! rooms, no entity types. The engine in `tessera-core` builds its drawable,
//! selection and mutation behaviour on top of these primitives:
//!
//! - **Rectangles**: [`Rect`] construction, translation, intersection
//! - **Covering**: [`cover`] and [`cover_until`] aggregate rectangle lists
//! - **Directional resize**: [`resize_axis`] keeps the opposite edge fixed
//! - **Node paths**: polyline, fan and circle connections between an entity
//!   and its nodes, plus point-to-path distance queries
//! - **Sprite bounds**: axis-aligned bounds of a justified, scaled, rotated quad
//!
//! ## Quick Start
//!
//! ```
//! use tessera_geom::{cover, Rect};
//!
//! let merged = cover(&[
//!     Rect::new(0.0, 0.0, 10.0, 10.0),
//!     Rect::new(20.0, 20.0, 5.0, 5.0),
//! ]);
//! assert_eq!(merged, Rect::new(0.0, 0.0, 25.0, 25.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cover;
pub mod path;
pub mod resize;
pub mod sprite;

pub use cover::{cover, cover_until, try_cover};
pub use path::{circle_through, fan_segments, next_node_position, polyline_segments, Circle, Segment};
pub use resize::{resize_axis, AxisResize};
pub use sprite::{sprite_bounds, SpriteQuad};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in map units.
///
/// `x`/`y` is the top-left corner. Width and height are expected to be
/// non-negative; constructors that take arbitrary corners normalize them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Horizontal extent
    pub width: f32,
    /// Vertical extent
    pub height: f32,
}

impl Rect {
    /// The zero rectangle at the origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Create a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create the smallest rectangle spanning two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Create a square of side `size` centred on `center`.
    ///
    /// Used for point-like things that still need a clickable box.
    #[must_use]
    pub fn centered(center: Vec2, size: f32) -> Self {
        let half = size / 2.0;
        Self::new(center.x - half, center.y - half, size, size)
    }

    /// Top-left corner.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Width and height as a vector.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Returns this rectangle moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Returns the smallest rectangle containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(left, top, right - left, bottom - top)
    }

    /// Check if a point lies inside (edges inclusive).
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Check if `other` lies completely inside this rectangle.
    #[must_use]
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Check if two rectangles overlap (touching edges count).
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    /// Grow the rectangle by `amount` on every side.
    #[must_use]
    pub fn expanded(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }
}
