//! Resolvers: turn partial handlers into concrete drawables and selections.
//!
//! Each resolver walks a fixed priority list of capabilities and falls back
//! to defaults from [`EngineConfig`]. They return
//! `Result<_, HandlerFault>`; callers run them behind the
//! [`FaultBarrier`](crate::fault::FaultBarrier), which substitutes the
//! broken-entity placeholder on failure.
//!
//! - [`drawable`]: entity and node drawables with depth
//! - [`selection`]: selection rectangles and selected items
//! - [`node_lines`]: connections between an entity and its nodes

pub(crate) mod drawable;
pub(crate) mod node_lines;
pub(crate) mod selection;

use std::cell::RefCell;
use std::collections::HashSet;

use tessera_geom::Rect;
use tracing::warn;

use crate::config::EngineConfig;
use crate::entity::EntityInstance;
use crate::services::Services;

pub use drawable::{ResolvedDrawable, ResolvedNodeDrawable};
pub use selection::{SelectedItem, SelectionRects};

/// Shared, read-only inputs of one resolver call.
pub(crate) struct ResolveContext<'a> {
    pub config: &'a EngineConfig,
    pub services: &'a Services,
    pub missing_textures: &'a RefCell<HashSet<String>>,
}

impl ResolveContext<'_> {
    /// Logs a missing texture the first time it is seen.
    pub fn warn_missing_texture(&self, texture: &str, entity_type: &str) {
        if self.missing_textures.borrow_mut().insert(texture.to_string()) {
            warn!(texture, entity_type, "texture not found, drawing placeholder");
        }
    }
}

/// Rectangle spanned by an entity's own width and height.
///
/// Entities with only one of the two use the configured default for the
/// other axis. Unsized entities have none.
#[must_use]
pub fn implicit_rectangle(entity: &EntityInstance, config: &EngineConfig) -> Option<Rect> {
    entity.is_sized().then(|| {
        Rect::new(
            entity.x,
            entity.y,
            entity.width.unwrap_or(config.default_rectangle_size),
            entity.height.unwrap_or(config.default_rectangle_size),
        )
    })
}
