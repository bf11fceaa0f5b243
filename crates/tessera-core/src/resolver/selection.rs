//! Selection rectangles.
//!
//! Priority for the entity box: `selection` capability, then `rectangle`,
//! then the entity's own width/height, then the cover of its drawable, and
//! finally a point marker. Node boxes come from `node_rectangle`, else from
//! the node drawable. A node that borrowed the entity drawable gets the
//! entity box moved by the node's offset from the entity.

use serde::{Deserialize, Serialize};
use tessera_geom::Rect;

use super::{drawable, implicit_rectangle, ResolveContext};
use crate::entity::{EntityId, Target};
use crate::error::HandlerFault;
use crate::handler::{resolve_opt, CapabilityContext, Handler};
use crate::handlers;
use crate::room::Layer;

/// Selection boxes of an entity and, when it has a node list, of each node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionRects {
    /// Entity box.
    pub entity: Rect,
    /// One box per node, in node order; `None` for entities without nodes.
    pub nodes: Option<Vec<Rect>>,
}

impl SelectionRects {
    /// Selection of an entity without nodes.
    #[must_use]
    pub const fn new(entity: Rect) -> Self {
        Self { entity, nodes: None }
    }

    /// Builder: add node boxes.
    #[must_use]
    pub fn with_nodes(mut self, nodes: Vec<Rect>) -> Self {
        self.nodes = Some(nodes);
        self
    }

    /// Box of one target.
    #[must_use]
    pub fn rect_for(&self, target: Target) -> Option<Rect> {
        match target {
            Target::Entity => Some(self.entity),
            Target::Node(index) => self.nodes.as_ref()?.get(index.checked_sub(1)?).copied(),
        }
    }
}

impl From<Rect> for SelectionRects {
    fn from(entity: Rect) -> Self {
        Self::new(entity)
    }
}

/// The cached box of one selected target.
///
/// Drag gestures mutate `rect` alongside the entity so the selection
/// follows without being resolved again.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectedItem {
    /// Owning entity.
    pub entity: EntityId,
    /// Entity or node.
    pub target: Target,
    /// Layer the entity is on.
    pub layer: Layer,
    /// Current selection box.
    pub rect: Rect,
}

impl SelectedItem {
    /// Creates a selected item.
    #[must_use]
    pub const fn new(entity: EntityId, target: Target, layer: Layer, rect: Rect) -> Self {
        Self {
            entity,
            target,
            layer,
            rect,
        }
    }
}

/// Resolves the selection of `cx.entity`.
pub(crate) fn selection(
    rc: &ResolveContext<'_>,
    handler: &Handler,
    cx: &CapabilityContext<'_>,
) -> Result<SelectionRects, HandlerFault> {
    if handler.placeholder_kind().is_some() {
        return Ok(handlers::selection(cx.entity, rc.config));
    }

    if let Some(rects) = resolve_opt(handler.selection.as_ref(), cx, "selection")? {
        return Ok(rects);
    }

    let entity_rect = entity_rectangle(rc, handler, cx)?;
    let nodes = match &cx.entity.nodes {
        Some(nodes) => Some(
            nodes
                .iter()
                .enumerate()
                .map(|(i, node)| node_rectangle(rc, handler, &cx.with_node(node, i + 1), entity_rect))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => None,
    };

    Ok(SelectionRects {
        entity: entity_rect,
        nodes,
    })
}

fn entity_rectangle(
    rc: &ResolveContext<'_>,
    handler: &Handler,
    cx: &CapabilityContext<'_>,
) -> Result<Rect, HandlerFault> {
    if let Some(rect) = resolve_opt(handler.rectangle.as_ref(), cx, "rectangle")? {
        return Ok(rect);
    }

    if let Some(rect) = implicit_rectangle(cx.entity, rc.config) {
        return Ok(rect);
    }

    let resolved = drawable::entity_drawable(rc, handler, cx)?;
    Ok(resolved
        .drawable
        .bounds()
        .unwrap_or_else(|| Rect::centered(cx.entity.position(), rc.config.point_marker_size)))
}

fn node_rectangle(
    rc: &ResolveContext<'_>,
    handler: &Handler,
    cx: &CapabilityContext<'_>,
    entity_rect: Rect,
) -> Result<Rect, HandlerFault> {
    if let Some(rect) = resolve_opt(handler.node_rectangle.as_ref(), cx, "nodeRectangle")? {
        return Ok(rect);
    }

    let Some((node, _)) = cx.node else {
        return Ok(entity_rect);
    };

    let resolved = drawable::node_drawable(rc, handler, cx)?;
    if resolved.used_entity_fallback {
        return Ok(entity_rect.translated(node.position() - cx.entity.position()));
    }

    Ok(resolved
        .drawable
        .bounds()
        .unwrap_or_else(|| Rect::centered(node.position(), rc.config.point_marker_size)))
}
