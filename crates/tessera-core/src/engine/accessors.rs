//! Capability reads for the editor UI.
//!
//! Each accessor resolves one capability through the fault barrier and
//! falls back to its default when the handler does not declare it or the
//! read faults.
//!
//! | Accessor | Default |
//! |----------|---------|
//! | [`can_resize`](Engine::can_resize) | `(has width, has height)` |
//! | [`minimum_size`](Engine::minimum_size) | configured minimum |
//! | [`maximum_size`](Engine::maximum_size) | configured maximum (unbounded) |
//! | [`node_limits`](Engine::node_limits) | `(0, 0)` |
//! | [`node_line_render_type`](Engine::node_line_render_type) | `line` |
//! | [`node_visibility`](Engine::node_visibility) | `selected` |
//! | [`field_order`](Engine::field_order) | configured order |
//! | [`field_information`](Engine::field_information) | empty |
//! | [`ignored_fields`](Engine::ignored_fields) | configured list |

use glam::{BVec2, Vec2};

use super::Engine;
use crate::entity::{EntityInstance, NodeLimits};
use crate::fault::Operation;
use crate::handler::{
    resolve_opt, Capability, CapabilityContext, FieldInformation, Handler, NodeLineRenderType, NodeVisibility,
};
use crate::room::Room;

impl Engine {
    fn read<T: Clone>(
        &mut self,
        room: &Room,
        entity: &EntityInstance,
        name: &'static str,
        field: impl FnOnce(&Handler) -> Option<&Capability<T>>,
    ) -> Option<T> {
        let handler = self.registry.lookup(&entity.entity_type);
        let cx = CapabilityContext::new(room, entity);

        self.barrier.guard(
            &entity.entity_type,
            entity.id,
            Operation::Accessor(name),
            || resolve_opt(field(&handler), &cx, name),
            || None,
        )
    }

    /// Which axes of `entity` may be resized.
    pub fn can_resize(&mut self, room: &Room, entity: &EntityInstance) -> BVec2 {
        self.read(room, entity, "canResize", |h| h.can_resize.as_ref())
            .unwrap_or_else(|| BVec2::new(entity.width.is_some(), entity.height.is_some()))
    }

    /// Smallest size a resize may produce.
    pub fn minimum_size(&mut self, room: &Room, entity: &EntityInstance) -> Vec2 {
        self.read(room, entity, "minimumSize", |h| h.minimum_size.as_ref())
            .unwrap_or(self.config.minimum_size)
    }

    /// Largest size a resize may produce. A non-positive axis is unbounded.
    pub fn maximum_size(&mut self, room: &Room, entity: &EntityInstance) -> Option<Vec2> {
        self.read(room, entity, "maximumSize", |h| h.maximum_size.as_ref())
            .or(self.config.maximum_size)
    }

    /// How many nodes `entity` accepts.
    pub fn node_limits(&mut self, room: &Room, entity: &EntityInstance) -> NodeLimits {
        self.read(room, entity, "nodeLimits", |h| h.node_limits.as_ref())
            .unwrap_or_default()
    }

    /// How the connections to the nodes of `entity` are drawn.
    pub fn node_line_render_type(&mut self, room: &Room, entity: &EntityInstance) -> NodeLineRenderType {
        self.read(room, entity, "nodeLineRenderType", |h| h.node_line_render_type.as_ref())
            .unwrap_or_default()
    }

    /// When the nodes of `entity` are drawn.
    pub fn node_visibility(&mut self, room: &Room, entity: &EntityInstance) -> NodeVisibility {
        self.read(room, entity, "nodeVisibility", |h| h.node_visibility.as_ref())
            .unwrap_or_default()
    }

    /// Property panel order.
    pub fn field_order(&mut self, room: &Room, entity: &EntityInstance) -> Vec<String> {
        self.read(room, entity, "fieldOrder", |h| h.field_order.as_ref())
            .unwrap_or_else(|| self.config.field_order.clone())
    }

    /// Property panel metadata.
    pub fn field_information(&mut self, room: &Room, entity: &EntityInstance) -> FieldInformation {
        self.read(room, entity, "fieldInformation", |h| h.field_information.as_ref())
            .unwrap_or_default()
    }

    /// Fields hidden from the property panel.
    pub fn ignored_fields(&mut self, room: &Room, entity: &EntityInstance) -> Vec<String> {
        self.read(room, entity, "ignoredFields", |h| h.ignored_fields.as_ref())
            .unwrap_or_else(|| self.config.ignored_fields.clone())
    }
}
