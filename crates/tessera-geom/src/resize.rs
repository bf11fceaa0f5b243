//! Directional resize math.
//!
//! A resize drags one edge of a box. Dragging the right/bottom edge
//! (positive direction) only changes the size. Dragging the left/top edge
//! (negative direction) changes the size and moves the position by the
//! opposite amount, so the far edge stays where it was.

use serde::{Deserialize, Serialize};

/// Result of resizing one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisResize {
    /// New position on this axis
    pub position: f32,
    /// New size on this axis
    pub size: f32,
}

impl AxisResize {
    /// How far the position moved relative to `old_position`.
    #[must_use]
    pub fn position_offset(&self, old_position: f32) -> f32 {
        self.position - old_position
    }
}

/// Resize one axis of a box.
///
/// * `position`, `size` - current extent on this axis
/// * `delta` - requested size change
/// * `direction` - sign of the dragged edge; negative keeps the far edge fixed
/// * `minimum`, `maximum` - allowed size range; `None` means unbounded above
///
/// Returns `None` when nothing changes: a zero delta, or a new size outside
/// `[minimum, maximum]`. Out-of-range requests are refused, not clamped.
///
/// ```
/// use tessera_geom::resize_axis;
///
/// let grown = resize_axis(0.0, 10.0, 5.0, -1, 8.0, Some(100.0)).unwrap();
/// assert_eq!((grown.position, grown.size), (-5.0, 15.0));
///
/// assert!(resize_axis(0.0, 10.0, -100.0, 1, 8.0, Some(100.0)).is_none());
/// ```
#[must_use]
pub fn resize_axis(
    position: f32,
    size: f32,
    delta: f32,
    direction: i32,
    minimum: f32,
    maximum: Option<f32>,
) -> Option<AxisResize> {
    if delta == 0.0 {
        return None;
    }

    let new_size = size + delta;
    if new_size < minimum || maximum.is_some_and(|max| new_size > max) {
        return None;
    }

    let new_position = if direction < 0 { position - delta } else { position };

    Some(AxisResize {
        position: new_position,
        size: new_size,
    })
}
