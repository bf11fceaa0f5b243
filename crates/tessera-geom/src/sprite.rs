//! Bounds of a positioned texture quad.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rect;

/// Placement of a textured quad in map space.
///
/// The quad is anchored at `position + offset`. `justification` picks the
/// anchor inside the quad (`(0, 0)` top-left, `(0.5, 0.5)` centre,
/// `(1, 1)` bottom-right). Scale may be negative to mirror the quad, and
/// rotation (radians) turns it around the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteQuad {
    /// Anchor position
    pub position: Vec2,
    /// Unscaled texture size
    pub size: Vec2,
    /// Anchor inside the quad, in fractions of its size
    pub justification: Vec2,
    /// Per-axis scale
    pub scale: Vec2,
    /// Extra displacement added to the anchor
    pub offset: Vec2,
    /// Rotation in radians around the anchor
    pub rotation: f32,
}

impl SpriteQuad {
    /// A centred, unscaled, unrotated quad.
    #[must_use]
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            justification: Vec2::splat(0.5),
            scale: Vec2::ONE,
            offset: Vec2::ZERO,
            rotation: 0.0,
        }
    }
}

/// Axis-aligned bounds of a sprite quad.
///
/// ```
/// use glam::Vec2;
/// use tessera_geom::{sprite_bounds, Rect, SpriteQuad};
///
/// let quad = SpriteQuad::new(Vec2::new(10.0, 10.0), Vec2::new(8.0, 4.0));
/// assert_eq!(sprite_bounds(&quad), Rect::new(6.0, 8.0, 8.0, 4.0));
/// ```
#[must_use]
pub fn sprite_bounds(quad: &SpriteQuad) -> Rect {
    let anchor = quad.position + quad.offset;
    let origin = -quad.justification * quad.size;

    let corners = [
        origin,
        origin + Vec2::new(quad.size.x, 0.0),
        origin + Vec2::new(0.0, quad.size.y),
        origin + quad.size,
    ];

    let rotation = Vec2::from_angle(quad.rotation);
    let mut min = Vec2::splat(f32::INFINITY);
    let mut max = Vec2::splat(f32::NEG_INFINITY);

    for corner in corners {
        let world = anchor + rotation.rotate(corner * quad.scale);
        min = min.min(world);
        max = max.max(world);
    }

    Rect::from_corners(min, max)
}
