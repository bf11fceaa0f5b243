//! The engine facade the editor talks to.
//!
//! [`Engine`] owns the handler registry, the external collaborators, the
//! configuration and the fault barrier. Every handler call it makes goes
//! through the barrier, so a broken plugin degrades to a placeholder instead
//! of taking the editor down.
//!
//! # Architecture
//!
//! - Resolution (this module): drawables, node lines, selections, room draw
//!   lists and hit testing
//! - [`accessors`]: capability reads with defaults, for the editor UI
//! - [`mutation`]: move, resize, delete and add-node
//! - [`catalog`]: placement listing and cloning
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use tessera_core::engine::Engine;
//! use tessera_core::entity::EntityInstance;
//! use tessera_core::handler::{Handler, HandlerRegistry};
//! use tessera_core::room::{Layer, Room};
//! use tessera_geom::Rect;
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register(Handler::new("block").with_rectangle(Rect::new(0.0, 0.0, 16.0, 16.0)));
//! let mut engine = Engine::new(registry);
//!
//! let mut room = Room::new("a-00");
//! let id = room.add(Layer::Entities, EntityInstance::new("block", Vec2::ZERO));
//! let entity = room.get(id).cloned().unwrap();
//!
//! let selection = engine.resolve_selection(&room, &entity, None);
//! assert_eq!(selection.entity, Rect::new(0.0, 0.0, 16.0, 16.0));
//! ```

pub mod accessors;
pub mod catalog;
pub mod mutation;

use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::HashSet;
use std::fmt;

use glam::Vec2;
use tessera_geom::Rect;
use tracing::debug;

use crate::config::EngineConfig;
use crate::drawable::{Drawable, Viewport};
use crate::entity::{EntityId, EntityInstance, Target};
use crate::fault::{FaultBarrier, Operation};
use crate::handler::{CapabilityContext, HandlerRegistry, NodeVisibility, PlaceholderKind};
use crate::handlers;
use crate::resolver::{
    self, ResolveContext, ResolvedDrawable, ResolvedNodeDrawable, SelectedItem, SelectionRects,
};
use crate::room::{Layer, Room};
use crate::services::Services;

/// A run of one entity's elements sharing a draw depth.
#[derive(Debug, Clone)]
pub struct DrawItem {
    /// Entity drawn.
    pub entity: EntityId,
    /// Node lines (when nodes are always visible), entity and node elements.
    pub drawable: Drawable,
    /// Draw depth; higher is further back.
    pub depth: i32,
}

/// Appends one item per run of consecutive elements sharing a depth.
fn push_depth_runs(items: &mut Vec<DrawItem>, entity: EntityId, drawable: Drawable, depth: i32) {
    let start = items.len();
    for element in drawable.elements {
        let element_depth = element.depth.unwrap_or(depth);
        match items[start..].last_mut() {
            Some(item) if item.depth == element_depth => item.drawable.push(element),
            _ => items.push(DrawItem {
                entity,
                drawable: Drawable::single(element),
                depth: element_depth,
            }),
        }
    }
}

/// Entity dispatch and editing engine.
pub struct Engine {
    registry: HandlerRegistry,
    services: Services,
    config: EngineConfig,
    barrier: FaultBarrier,
    missing_textures: RefCell<HashSet<String>>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("barrier", &self.barrier)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates an engine with empty collaborators and the default
    /// configuration.
    #[must_use]
    pub fn new(registry: HandlerRegistry) -> Self {
        Self::with_parts(registry, Services::default(), EngineConfig::default())
    }

    /// Creates an engine from all of its parts.
    #[must_use]
    pub fn with_parts(registry: HandlerRegistry, services: Services, config: EngineConfig) -> Self {
        let barrier = FaultBarrier::new(config.fault_report_capacity);
        Self {
            registry,
            services,
            config,
            barrier,
            missing_textures: RefCell::new(HashSet::new()),
        }
    }

    /// Handler registry.
    #[must_use]
    pub const fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Mutable handler registry, for plugin (re)loading.
    pub fn registry_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// External collaborators.
    #[must_use]
    pub const fn services(&self) -> &Services {
        &self.services
    }

    /// Fault barrier, for inspecting reported faults.
    #[must_use]
    pub const fn barrier(&self) -> &FaultBarrier {
        &self.barrier
    }

    /// Starts a new editing session: forgets reported faults and missing
    /// textures so they are logged again.
    pub fn begin_session(&mut self) {
        debug!(forgotten = self.barrier.len(), "starting editing session");
        self.barrier.reset();
        self.missing_textures.get_mut().clear();
    }

    fn split(&mut self) -> (ResolveContext<'_>, &mut FaultBarrier) {
        (
            ResolveContext {
                config: &self.config,
                services: &self.services,
                missing_textures: &self.missing_textures,
            },
            &mut self.barrier,
        )
    }

    // =========================================================================
    // Drawables
    // =========================================================================

    /// Resolves the drawable of `entity` and the depth it is drawn at.
    pub fn resolve_entity_drawable(
        &mut self,
        room: &Room,
        entity: &EntityInstance,
        viewport: Option<&Viewport>,
    ) -> ResolvedDrawable {
        let handler = self.registry.lookup(&entity.entity_type);
        let cx = CapabilityContext::new(room, entity).with_viewport(viewport);
        let (rc, barrier) = self.split();

        barrier.guard(
            &entity.entity_type,
            entity.id,
            Operation::EntityDrawable,
            || resolver::drawable::entity_drawable(&rc, &handler, &cx),
            || handlers::drawable(PlaceholderKind::Erroring, entity, rc.config),
        )
    }

    /// Resolves the drawable of node `index` (1-based). `None` when the
    /// entity has no such node.
    pub fn resolve_node_drawable(
        &mut self,
        room: &Room,
        entity: &EntityInstance,
        index: usize,
        viewport: Option<&Viewport>,
    ) -> Option<ResolvedNodeDrawable> {
        let node = entity.node(index)?;
        let handler = self.registry.lookup(&entity.entity_type);
        let cx = CapabilityContext::new(room, entity)
            .with_node(node, index)
            .with_viewport(viewport);
        let (rc, barrier) = self.split();

        Some(barrier.guard(
            &entity.entity_type,
            entity.id,
            Operation::NodeDrawable,
            || resolver::drawable::node_drawable(&rc, &handler, &cx),
            || handlers::node_drawable(PlaceholderKind::Erroring, entity, node, rc.config),
        ))
    }

    /// Entity drawable followed by every node drawable when the type's nodes
    /// are always visible.
    pub fn resolve_combined_drawable(
        &mut self,
        room: &Room,
        entity: &EntityInstance,
        viewport: Option<&Viewport>,
    ) -> ResolvedDrawable {
        let visibility = self.node_visibility(room, entity);
        self.combined(room, entity, viewport, visibility)
    }

    fn combined(
        &mut self,
        room: &Room,
        entity: &EntityInstance,
        viewport: Option<&Viewport>,
        visibility: NodeVisibility,
    ) -> ResolvedDrawable {
        let mut resolved = self.resolve_entity_drawable(room, entity, viewport);
        if visibility == NodeVisibility::Always {
            for index in 1..=entity.node_count() {
                if let Some(node) = self.resolve_node_drawable(room, entity, index, viewport) {
                    let mut drawable = node.drawable;
                    if node.depth != resolved.depth {
                        for element in &mut drawable.elements {
                            element.depth.get_or_insert(node.depth);
                        }
                    }
                    resolved.drawable.append(drawable);
                }
            }
        }
        resolved
    }

    /// Connection lines between `entity` and its nodes.
    pub fn resolve_node_lines(&mut self, room: &Room, entity: &EntityInstance) -> Drawable {
        let render_type = self.node_line_render_type(room, entity);
        resolver::node_lines::node_lines(&self.config, entity, render_type)
    }

    /// Draw list of one layer, deepest first. Equal depths keep room order.
    ///
    /// Elements carrying their own depth are split out of their entity's
    /// item, so one entity may contribute several items.
    pub fn draw_room(&mut self, room: &Room, layer: Layer, viewport: Option<&Viewport>) -> Vec<DrawItem> {
        let mut items = Vec::with_capacity(room.layer(layer).len());

        for entity in room.layer(layer) {
            let visibility = self.node_visibility(room, entity);
            let resolved = self.combined(room, entity, viewport, visibility);

            let mut drawable = if visibility == NodeVisibility::Always {
                self.resolve_node_lines(room, entity)
            } else {
                Drawable::new()
            };
            drawable.append(resolved.drawable);

            push_depth_runs(&mut items, entity.id, drawable, resolved.depth);
        }

        items.sort_by_key(|item| Reverse(item.depth));
        items
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Selection boxes of `entity` and its nodes.
    pub fn resolve_selection(
        &mut self,
        room: &Room,
        entity: &EntityInstance,
        viewport: Option<&Viewport>,
    ) -> SelectionRects {
        let handler = self.registry.lookup(&entity.entity_type);
        let cx = CapabilityContext::new(room, entity).with_viewport(viewport);
        let (rc, barrier) = self.split();

        barrier.guard(
            &entity.entity_type,
            entity.id,
            Operation::Selection,
            || resolver::selection::selection(&rc, &handler, &cx),
            || handlers::selection(entity, rc.config),
        )
    }

    /// One selected item for the entity and one per node.
    pub fn selections_for_entity(&mut self, room: &Room, entity: &EntityInstance) -> Vec<SelectedItem> {
        let rects = self.resolve_selection(room, entity, None);
        let layer = room
            .layer_of(entity.id)
            .unwrap_or_else(|| self.registry.lookup(&entity.entity_type).layer);

        let mut items = vec![SelectedItem::new(entity.id, Target::Entity, layer, rects.entity)];
        items.extend(
            rects
                .nodes
                .into_iter()
                .flatten()
                .enumerate()
                .map(|(i, rect)| SelectedItem::new(entity.id, Target::Node(i + 1), layer, rect)),
        );
        items
    }

    /// Items of `layer` whose box contains `point`, in room order.
    pub fn items_at(&mut self, room: &Room, layer: Layer, point: Vec2) -> Vec<SelectedItem> {
        self.collect_items(room, layer, |rect| rect.contains_point(point))
    }

    /// Items of `layer` whose box overlaps `area`, in room order.
    pub fn items_in_area(&mut self, room: &Room, layer: Layer, area: Rect) -> Vec<SelectedItem> {
        self.collect_items(room, layer, |rect| area.intersects(rect))
    }

    fn collect_items(&mut self, room: &Room, layer: Layer, hit: impl Fn(&Rect) -> bool) -> Vec<SelectedItem> {
        let mut items = Vec::new();
        for entity in room.layer(layer) {
            items.extend(
                self.selections_for_entity(room, entity)
                    .into_iter()
                    .filter(|item| hit(&item.rect)),
            );
        }
        items
    }
}
