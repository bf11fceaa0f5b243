//! Placeholder for entities whose handler failed.
//!
//! Drawn as a box with a cross through it so broken entities stand out from
//! merely unknown ones.

use glam::Vec2;
use tessera_geom::Rect;

use crate::config::EngineConfig;
use crate::drawable::{Drawable, LineSprite, RectangleSprite};

pub(super) fn drawable(rect: Rect, config: &EngineConfig) -> Drawable {
    let top_left = rect.position();
    let bottom_right = top_left + rect.size();
    let top_right = Vec2::new(bottom_right.x, top_left.y);
    let bottom_left = Vec2::new(top_left.x, bottom_right.y);

    let mut drawable = Drawable::single(RectangleSprite::bordered(rect, config.erroring_color, config.border_color));
    drawable.push(LineSprite::new(vec![top_left, bottom_right], config.border_color));
    drawable.push(LineSprite::new(vec![top_right, bottom_left], config.border_color));
    drawable
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_stays_inside_box() {
        let config = EngineConfig::default();
        let rect = Rect::new(4.0, 4.0, 16.0, 8.0);
        let drawable = drawable(rect, &config);

        assert_eq!(drawable.len(), 3);
        assert_eq!(drawable.bounds(), Some(rect));
    }
}
