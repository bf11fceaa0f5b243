//! Placeholder for entity types without a registered handler.

use tessera_geom::Rect;

use crate::config::EngineConfig;
use crate::drawable::{Drawable, RectangleSprite};
use crate::handler::{Handler, PlaceholderKind};

/// The missing-entity handler.
#[must_use]
pub fn handler() -> Handler {
    Handler::placeholder(PlaceholderKind::Missing, "@missing")
}

pub(super) fn drawable(rect: Rect, config: &EngineConfig) -> Drawable {
    Drawable::single(RectangleSprite::bordered(rect, config.missing_color, config.border_color))
}
