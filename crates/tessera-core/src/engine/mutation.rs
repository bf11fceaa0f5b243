//! Editing operations: move, resize, delete and add-node.
//!
//! Every operation follows the same shape:
//!
//! 1. look up the entity; unknown ids and out-of-range nodes are a no-op
//! 2. check constraints read through the accessors
//! 3. fire the handler's notification hook; its failures are logged and
//!    never block the operation
//! 4. run the handler's override, or the default behaviour
//!
//! Operations return whether anything changed. A failing override is the
//! only error: it surfaces as [`EngineError::HandlerFault`].

use glam::{BVec2, Vec2};
use tessera_geom::{next_node_position, resize_axis, Rect};
use tracing::{debug, warn};

use super::Engine;
use crate::entity::{EntityId, EntityInstance, Node, Target};
use crate::error::{EngineError, HandlerFault};
use crate::fault::contain;
use crate::handler::ResizeRequest;
use crate::resolver::SelectedItem;
use crate::room::Room;

// =============================================================================
// Hook Plumbing
// =============================================================================

/// Runs a notification hook. Failures are logged and swallowed.
fn notify(entity_type: &str, entity: EntityId, hook: &'static str, f: impl FnOnce() -> anyhow::Result<()>) {
    if let Err(fault) = contain(|| f().map_err(|source| HandlerFault::capability(hook, source))) {
        warn!(entity_type, entity = %entity, hook, "notification hook failed: {fault}");
    }
}

/// Runs an override hook, turning its failure into an [`EngineError`].
fn run_override<T>(
    entity_type: &str,
    entity: EntityId,
    operation: &'static str,
    f: impl FnOnce() -> anyhow::Result<T>,
) -> Result<T, EngineError> {
    contain(|| f().map_err(|source| HandlerFault::capability(operation, source))).map_err(|fault| {
        EngineError::HandlerFault {
            entity_type: entity_type.to_string(),
            entity,
            operation,
            fault,
        }
    })
}

// =============================================================================
// Default Behaviour
// =============================================================================

fn default_move(entity: &mut EntityInstance, target: Target, delta: Vec2) -> bool {
    match target {
        Target::Entity => {
            entity.set_position(entity.position() + delta);
            true
        }
        Target::Node(index) => entity.node_mut(index).map(|node| node.translate(delta)).is_some(),
    }
}

/// Resizes one axis in place. A non-positive maximum is unbounded.
fn resize_dimension(
    position: &mut f32,
    size: &mut Option<f32>,
    delta: f32,
    direction: i32,
    minimum: f32,
    maximum: Option<f32>,
) -> bool {
    let Some(current) = *size else {
        return false;
    };
    let maximum = maximum.filter(|max| *max > 0.0);

    match resize_axis(*position, current, delta, direction, minimum, maximum) {
        Some(result) => {
            *position = result.position;
            *size = Some(result.size);
            true
        }
        None => false,
    }
}

fn default_resize(
    entity: &mut EntityInstance,
    request: ResizeRequest,
    can_resize: BVec2,
    minimum: Vec2,
    maximum: Option<Vec2>,
) -> bool {
    let mut changed = false;

    if can_resize.x {
        changed |= resize_dimension(
            &mut entity.x,
            &mut entity.width,
            request.delta.x,
            request.direction.x,
            minimum.x,
            maximum.map(|max| max.x),
        );
    }
    if can_resize.y {
        changed |= resize_dimension(
            &mut entity.y,
            &mut entity.height,
            request.delta.y,
            request.direction.y,
            minimum.y,
            maximum.map(|max| max.y),
        );
    }

    changed
}

/// Moves the cached box by the entity's position change and takes over its
/// size.
fn default_resize_selection(entity: &EntityInstance, item: &mut SelectedItem, offset: Vec2) {
    let rect = item.rect;
    item.rect = Rect::new(
        rect.x + offset.x,
        rect.y + offset.y,
        entity.width.unwrap_or(rect.width),
        entity.height.unwrap_or(rect.height),
    );
}

fn default_delete(room: &mut Room, id: EntityId, target: Target) -> bool {
    match target {
        Target::Entity => room.remove(id).is_some(),
        Target::Node(index) => room
            .get_mut(id)
            .and_then(|entity| entity.nodes.as_mut())
            .filter(|nodes| (1..=nodes.len()).contains(&index))
            .map(|nodes| nodes.remove(index - 1))
            .is_some(),
    }
}

/// Inserts a node `spacing` units right of the anchor: the entity's right
/// edge, or the node after which it is added.
fn default_add_node(entity: &mut EntityInstance, after: Target, spacing: f32) -> bool {
    let (anchor, width) = match after {
        Target::Entity => (entity.position(), entity.width.unwrap_or(0.0)),
        Target::Node(index) => match entity.node(index) {
            Some(node) => (node.position(), 0.0),
            None => return false,
        },
    };

    let position = next_node_position(anchor, width, spacing);
    let nodes = entity.nodes.get_or_insert_with(Vec::new);
    let insert_at = after.index().min(nodes.len());
    nodes.insert(insert_at, Node::from(position));
    true
}

// =============================================================================
// Operations
// =============================================================================

impl Engine {
    /// Moves the selected entity or node by `delta` and updates the cached
    /// selection box. Targeting a node the entity lacks does nothing and
    /// fires no `onMove` hook.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::HandlerFault`] when a `move` or
    /// `updateMoveSelection` override fails.
    pub fn move_item(&mut self, room: &mut Room, item: &mut SelectedItem, delta: Vec2) -> Result<bool, EngineError> {
        let (id, target) = (item.entity, item.target);
        let view: &Room = room;
        let Some(entity) = view.get(id) else {
            debug!(entity = %id, "move of unknown entity ignored");
            return Ok(false);
        };
        if let Target::Node(index) = target {
            let count = entity.node_count();
            if index == 0 || index > count {
                debug!(entity = %id, %target, count, "move of missing node ignored");
                return Ok(false);
            }
        }

        let handler = self.registry.lookup(&entity.entity_type);
        let entity_type = entity.entity_type.clone();

        if let Some(hook) = &handler.on_move {
            notify(&entity_type, id, "onMove", || hook(view, entity, target, delta));
        }

        let Some(entity) = room.get_mut(id) else {
            return Ok(false);
        };
        let moved = match &handler.move_override {
            Some(hook) => run_override(&entity_type, id, "move", || hook(entity, target, delta))?,
            None => default_move(entity, target, delta),
        };

        if moved {
            let entity: &EntityInstance = entity;
            match &handler.update_move_selection {
                Some(hook) => run_override(&entity_type, id, "updateMoveSelection", || hook(entity, item, delta))?,
                None => item.rect = item.rect.translated(delta),
            }
        }

        debug!(entity_type = %entity_type, entity = %id, %target, moved, "move");
        Ok(moved)
    }

    /// Resizes the selected entity and updates the cached selection box.
    ///
    /// Nodes cannot be resized. Each axis is only resized when `canResize`
    /// allows it and the new size stays within the size limits.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::HandlerFault`] when a `resize` or
    /// `updateResizeSelection` override fails.
    pub fn resize_item(
        &mut self,
        room: &mut Room,
        item: &mut SelectedItem,
        request: ResizeRequest,
    ) -> Result<bool, EngineError> {
        let id = item.entity;
        if item.target.is_node() || request.delta == Vec2::ZERO {
            return Ok(false);
        }
        let view: &Room = room;
        let Some(entity) = view.get(id) else {
            debug!(entity = %id, "resize of unknown entity ignored");
            return Ok(false);
        };

        let handler = self.registry.lookup(&entity.entity_type);
        let entity_type = entity.entity_type.clone();
        let can_resize = self.can_resize(view, entity);
        let minimum = self.minimum_size(view, entity);
        let maximum = self.maximum_size(view, entity);
        let before = entity.position();

        if let Some(hook) = &handler.on_resize {
            notify(&entity_type, id, "onResize", || hook(view, entity, request));
        }

        let Some(entity) = room.get_mut(id) else {
            return Ok(false);
        };
        let resized = match &handler.resize_override {
            Some(hook) => run_override(&entity_type, id, "resize", || hook(entity, request))?,
            None => default_resize(entity, request, can_resize, minimum, maximum),
        };

        if resized {
            let entity: &EntityInstance = entity;
            let offset = entity.position() - before;
            match &handler.update_resize_selection {
                Some(hook) => run_override(&entity_type, id, "updateResizeSelection", || hook(entity, item, request))?,
                None => default_resize_selection(entity, item, offset),
            }
        }

        debug!(entity_type = %entity_type, entity = %id, resized, "resize");
        Ok(resized)
    }

    /// Deletes an entity or one of its nodes.
    ///
    /// Deleting a node the entity cannot spare (it would drop below the
    /// minimum node count) deletes the whole entity instead.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::HandlerFault`] when a `delete` override fails.
    pub fn delete(&mut self, room: &mut Room, id: EntityId, target: Target) -> Result<bool, EngineError> {
        let view: &Room = room;
        let Some(entity) = view.get(id) else {
            debug!(entity = %id, "delete of unknown entity ignored");
            return Ok(false);
        };

        let mut target = target;
        if let Target::Node(index) = target {
            let count = entity.node_count();
            if index == 0 || index > count {
                debug!(entity = %id, %target, count, "delete of missing node ignored");
                return Ok(false);
            }
            if !self.node_limits(view, entity).allows_remove(count) {
                debug!(entity = %id, %target, count, "node count at minimum, deleting entity");
                target = Target::Entity;
            }
        }

        let handler = self.registry.lookup(&entity.entity_type);
        let entity_type = entity.entity_type.clone();

        if let Some(hook) = &handler.on_delete {
            notify(&entity_type, id, "onDelete", || hook(view, entity, target));
        }

        let deleted = match &handler.delete_override {
            Some(hook) => run_override(&entity_type, id, "delete", || hook(room, id, target))?,
            None => default_delete(room, id, target),
        };

        debug!(entity_type = %entity_type, entity = %id, %target, deleted, "delete");
        Ok(deleted)
    }

    /// Adds a node after `after` (the entity itself or one of its nodes).
    ///
    /// Refused when the entity already has the maximum number of nodes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::HandlerFault`] when a `nodeAdded` override
    /// fails.
    pub fn add_node(&mut self, room: &mut Room, id: EntityId, after: Target) -> Result<bool, EngineError> {
        let view: &Room = room;
        let Some(entity) = view.get(id) else {
            debug!(entity = %id, "add-node on unknown entity ignored");
            return Ok(false);
        };

        let count = entity.node_count();
        if let Target::Node(index) = after {
            if index == 0 || index > count {
                debug!(entity = %id, %after, count, "add-node after missing node ignored");
                return Ok(false);
            }
        }
        if !self.node_limits(view, entity).allows_add(count) {
            debug!(entity = %id, count, "node count at maximum, add-node refused");
            return Ok(false);
        }

        let handler = self.registry.lookup(&entity.entity_type);
        let entity_type = entity.entity_type.clone();

        if let Some(entity) = room.get_mut(id) {
            entity.nodes.get_or_insert_with(Vec::new);
        }

        if let Some(hook) = &handler.on_node_added {
            let view: &Room = room;
            if let Some(entity) = view.get(id) {
                notify(&entity_type, id, "onNodeAdded", || hook(view, entity, after));
            }
        }

        let spacing = self.config.node_offset;
        let Some(entity) = room.get_mut(id) else {
            return Ok(false);
        };
        let added = match &handler.node_added {
            Some(hook) => run_override(&entity_type, id, "nodeAdded", || hook(entity, after))?,
            None => default_add_node(entity, after, spacing),
        };

        debug!(entity_type = %entity_type, entity = %id, %after, added, "add node");
        Ok(added)
    }
}
