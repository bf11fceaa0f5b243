//! Built-in placeholders.
//!
//! Two placeholders can never fail:
//! - [`missing`]: the handler the registry hands out for entity types nobody
//!   registered; it reports no capabilities and the resolvers recognise it by
//!   [`PlaceholderKind`]
//! - [`erroring`]: drawn by the fault barrier in place of whatever a broken
//!   handler was resolving
//!
//! Both draw a box sized to the entity.

pub mod erroring;
pub mod missing;

use tessera_geom::Rect;

use crate::config::EngineConfig;
use crate::drawable::Drawable;
use crate::entity::{EntityInstance, Node};
use crate::handler::PlaceholderKind;
use crate::resolver::{implicit_rectangle, ResolvedDrawable, ResolvedNodeDrawable, SelectionRects};

/// Area a placeholder covers: the entity rectangle for sized entities, a
/// point marker otherwise.
#[must_use]
pub fn placeholder_bounds(entity: &EntityInstance, config: &EngineConfig) -> Rect {
    implicit_rectangle(entity, config)
        .unwrap_or_else(|| Rect::centered(entity.position(), config.point_marker_size))
}

fn node_bounds(entity: &EntityInstance, node: &Node, config: &EngineConfig) -> Rect {
    placeholder_bounds(entity, config).translated(node.position() - entity.position())
}

fn placeholder_elements(kind: PlaceholderKind, rect: Rect, config: &EngineConfig) -> Drawable {
    match kind {
        PlaceholderKind::Missing => missing::drawable(rect, config),
        PlaceholderKind::Erroring => erroring::drawable(rect, config),
    }
}

pub(crate) fn drawable(kind: PlaceholderKind, entity: &EntityInstance, config: &EngineConfig) -> ResolvedDrawable {
    ResolvedDrawable {
        drawable: placeholder_elements(kind, placeholder_bounds(entity, config), config),
        depth: config.default_depth,
    }
}

pub(crate) fn node_drawable(
    kind: PlaceholderKind,
    entity: &EntityInstance,
    node: &Node,
    config: &EngineConfig,
) -> ResolvedNodeDrawable {
    ResolvedNodeDrawable {
        drawable: placeholder_elements(kind, node_bounds(entity, node, config), config),
        depth: config.default_depth,
        used_entity_fallback: false,
    }
}

pub(crate) fn selection(entity: &EntityInstance, config: &EngineConfig) -> SelectionRects {
    let rect = placeholder_bounds(entity, config);
    let nodes = entity.nodes.as_ref().map(|nodes| {
        nodes
            .iter()
            .map(|node| rect.translated(node.position() - entity.position()))
            .collect()
    });
    SelectionRects { entity: rect, nodes }
}
