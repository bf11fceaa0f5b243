//! Connections drawn between an entity and its nodes.

use glam::Vec2;
use tessera_geom::{circle_through, fan_segments};

use super::implicit_rectangle;
use crate::config::EngineConfig;
use crate::drawable::{CircleSprite, DrawElement, Drawable, LineSprite};
use crate::entity::EntityInstance;
use crate::handler::NodeLineRenderType;

/// Builds the connection drawable for `entity`.
///
/// Sized entities connect through rectangle centres (the node boxes share
/// the entity's size); point entities through their positions.
pub(crate) fn node_lines(config: &EngineConfig, entity: &EntityInstance, render_type: NodeLineRenderType) -> Drawable {
    let half_size = implicit_rectangle(entity, config).map_or(Vec2::ZERO, |rect| rect.size() / 2.0);
    let anchor = entity.position() + half_size;
    let nodes: Vec<Vec2> = entity
        .indexed_nodes()
        .map(|(_, node)| node.position() + half_size)
        .collect();

    if nodes.is_empty() {
        return Drawable::new();
    }

    let color = config.node_line_color;
    match render_type {
        NodeLineRenderType::Line => {
            let points: Vec<Vec2> = std::iter::once(anchor).chain(nodes).collect();
            Drawable::single(LineSprite::new(points, color))
        }
        NodeLineRenderType::Fan => fan_segments(anchor, &nodes)
            .into_iter()
            .map(|segment| DrawElement::from(LineSprite::new(vec![segment.start, segment.end], color)))
            .collect(),
        NodeLineRenderType::Circle => Drawable::single(CircleSprite {
            circle: circle_through(anchor, nodes[0]),
            color,
        }),
        NodeLineRenderType::None => Drawable::new(),
    }
}
