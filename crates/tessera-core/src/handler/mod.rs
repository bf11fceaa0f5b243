//! Entity handlers: what an entity type can do.
//!
//! A [`Handler`] describes one entity type with a set of independently
//! optional capabilities. Handlers come from plugins the editor does not
//! trust, so every capability may be absent, derived per entity, or broken;
//! the resolvers fill in defaults and the fault barrier contains failures.
//!
//! # Architecture
//!
//! - [`Capability`] holds a literal value or a derivation function
//! - [`Handler`] is the immutable record for one entity type, shared as
//!   `Arc<Handler>` once published
//! - [`HandlerRegistry`] maps type names to handlers and hands out the
//!   missing-entity placeholder for unknown names
//!
//! Mutation hooks (`move_override`, `on_move`, ...) are plain functions
//! rather than [`Capability`] values: they act on the entity instead of
//! describing it.
//!
//! # Example
//!
//! ```
//! use tessera_core::handler::{Capabilities, Handler};
//! use tessera_core::entity::NodeLimits;
//! use tessera_core::room::Layer;
//!
//! let handler = Handler::new("zipMover")
//!     .with_texture("objects/zipmover/block")
//!     .with_depth(-9999)
//!     .with_node_limits(NodeLimits::new(1, Some(1)));
//!
//! assert_eq!(handler.layer, Layer::Entities);
//! assert!(handler.capabilities().contains(Capabilities::TEXTURE | Capabilities::NODE_LIMITS));
//! ```

mod capability;
mod registry;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use glam::{BVec2, IVec2, Vec2};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tessera_geom::Rect;

use crate::drawable::{Color, CustomDraw, Drawable};
use crate::entity::{EntityId, EntityInstance, NodeLimits, Target};
use crate::placement::{Placement, PlacementDeclaration};
use crate::resolver::{SelectedItem, SelectionRects};
use crate::room::{Layer, Room};
use crate::services::LanguageTable;

pub use capability::{resolve_opt, Capability, CapabilityContext, DeriveFn};
pub use registry::{ContentOrigin, HandlerRegistry};

// =============================================================================
// Enumerations
// =============================================================================

/// When an entity's nodes are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeVisibility {
    /// Only while the entity is selected.
    #[default]
    Selected,
    /// Always, as part of the entity's drawable.
    Always,
    /// Never.
    Never,
}

/// How the connection between an entity and its nodes is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeLineRenderType {
    /// Entity → node 1 → node 2 → …
    #[default]
    Line,
    /// Entity → each node.
    Fan,
    /// Circle around the entity through node 1.
    Circle,
    /// No connection.
    None,
}

/// Property panel metadata, keyed by field name.
pub type FieldInformation = BTreeMap<String, Value>;

/// A resize gesture: requested size change and which edges are dragged.
///
/// A negative direction component means the left (or top) edge is dragged.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResizeRequest {
    /// Requested size change per axis.
    pub delta: Vec2,
    /// Sign of the dragged edge per axis.
    pub direction: IVec2,
}

// =============================================================================
// Mutation Hooks
// =============================================================================

/// Replaces the default move. Returns whether anything moved.
pub type MoveHook = Arc<dyn Fn(&mut EntityInstance, Target, Vec2) -> anyhow::Result<bool> + Send + Sync>;
/// Observes a move before it happens.
pub type MoveNotify = Arc<dyn Fn(&Room, &EntityInstance, Target, Vec2) -> anyhow::Result<()> + Send + Sync>;
/// Replaces the default selection update after a move.
pub type SelectionMoveHook =
    Arc<dyn Fn(&EntityInstance, &mut SelectedItem, Vec2) -> anyhow::Result<()> + Send + Sync>;
/// Replaces the default resize. Returns whether anything changed.
pub type ResizeHook = Arc<dyn Fn(&mut EntityInstance, ResizeRequest) -> anyhow::Result<bool> + Send + Sync>;
/// Observes a resize before it happens.
pub type ResizeNotify = Arc<dyn Fn(&Room, &EntityInstance, ResizeRequest) -> anyhow::Result<()> + Send + Sync>;
/// Replaces the default selection update after a resize.
pub type SelectionResizeHook =
    Arc<dyn Fn(&EntityInstance, &mut SelectedItem, ResizeRequest) -> anyhow::Result<()> + Send + Sync>;
/// Replaces the default delete. Returns whether anything was deleted.
pub type DeleteHook = Arc<dyn Fn(&mut Room, EntityId, Target) -> anyhow::Result<bool> + Send + Sync>;
/// Observes a delete before it happens.
pub type DeleteNotify = Arc<dyn Fn(&Room, &EntityInstance, Target) -> anyhow::Result<()> + Send + Sync>;
/// Replaces the default node insertion. Returns whether a node was added.
pub type NodeAddedHook = Arc<dyn Fn(&mut EntityInstance, Target) -> anyhow::Result<bool> + Send + Sync>;
/// Observes a node insertion before it happens.
pub type NodeAddedNotify = Arc<dyn Fn(&Room, &EntityInstance, Target) -> anyhow::Result<()> + Send + Sync>;
/// Builds a placement from an existing instance.
pub type CloneItemHook = Arc<dyn Fn(&Room, &EntityInstance) -> anyhow::Result<Placement> + Send + Sync>;

// =============================================================================
// Capability Set
// =============================================================================

bitflags! {
    /// Which capabilities a handler carries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u32 {
        /// `depth`
        const DEPTH = 1 << 0;
        /// `sprite`
        const SPRITE = 1 << 1;
        /// `texture`
        const TEXTURE = 1 << 2;
        /// `draw`
        const DRAW = 1 << 3;
        /// `rectangle`
        const RECTANGLE = 1 << 4;
        /// `nodeSprite`
        const NODE_SPRITE = 1 << 5;
        /// `nodeTexture`
        const NODE_TEXTURE = 1 << 6;
        /// `nodeDraw`
        const NODE_DRAW = 1 << 7;
        /// `nodeRectangle`
        const NODE_RECTANGLE = 1 << 8;
        /// `selection`
        const SELECTION = 1 << 9;
        /// Any move hook.
        const MOVE = 1 << 10;
        /// Any resize hook.
        const RESIZE = 1 << 11;
        /// Any delete hook.
        const DELETE = 1 << 12;
        /// Any node-added hook.
        const NODE_ADDED = 1 << 13;
        /// `canResize`
        const CAN_RESIZE = 1 << 14;
        /// `minimumSize`
        const MINIMUM_SIZE = 1 << 15;
        /// `maximumSize`
        const MAXIMUM_SIZE = 1 << 16;
        /// `nodeLimits`
        const NODE_LIMITS = 1 << 17;
        /// `nodeVisibility`
        const NODE_VISIBILITY = 1 << 18;
        /// `nodeLineRenderType`
        const NODE_LINE_RENDER_TYPE = 1 << 19;
        /// `placements`
        const PLACEMENTS = 1 << 20;
        /// `fieldOrder`
        const FIELD_ORDER = 1 << 21;
        /// `fieldInformation`
        const FIELD_INFORMATION = 1 << 22;
        /// `ignoredFields`
        const IGNORED_FIELDS = 1 << 23;
        /// `languageData`
        const LANGUAGE_DATA = 1 << 24;
        /// `cloneItem`
        const CLONE_ITEM = 1 << 25;
    }
}

/// Built-in placeholder handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    /// No handler is registered for the entity type.
    Missing,
    /// The registered handler failed.
    Erroring,
}

// =============================================================================
// Handler
// =============================================================================

/// Everything the editor knows about one entity type.
///
/// All capability fields are public and optional; the `with_*` builders
/// cover the common ones. Node-scoped overlay fields (`node_justification`,
/// `node_color`, ...) fall back to their entity-scoped counterparts.
#[derive(Clone, Default)]
pub struct Handler {
    /// Entity type name.
    pub name: String,
    /// Layer this type is placed on.
    pub layer: Layer,

    /// Depth of the entity drawable.
    pub depth: Option<Capability<i32>>,
    /// Ready-made drawable.
    pub sprite: Option<Capability<Drawable>>,
    /// Texture name drawn at the entity position.
    pub texture: Option<Capability<String>>,
    /// Custom render callback.
    pub draw: Option<Capability<CustomDraw>>,
    /// Rectangle drawn and selected.
    pub rectangle: Option<Capability<Rect>>,
    /// Texture anchor.
    pub justification: Option<Capability<Vec2>>,
    /// Texture scale.
    pub scale: Option<Capability<Vec2>>,
    /// Texture offset.
    pub offset: Option<Capability<Vec2>>,
    /// Texture rotation in radians.
    pub rotation: Option<Capability<f32>>,
    /// Texture tint or rectangle fill.
    pub color: Option<Capability<Color>>,
    /// Rectangle fill when bordered.
    pub fill_color: Option<Capability<Color>>,
    /// Rectangle outline.
    pub border_color: Option<Capability<Color>>,

    /// Node drawable.
    pub node_sprite: Option<Capability<Drawable>>,
    /// Node texture.
    pub node_texture: Option<Capability<String>>,
    /// Node render callback.
    pub node_draw: Option<Capability<CustomDraw>>,
    /// Node rectangle.
    pub node_rectangle: Option<Capability<Rect>>,
    /// Node depth.
    pub node_depth: Option<Capability<i32>>,
    /// Node texture anchor.
    pub node_justification: Option<Capability<Vec2>>,
    /// Node texture scale.
    pub node_scale: Option<Capability<Vec2>>,
    /// Node texture offset.
    pub node_offset: Option<Capability<Vec2>>,
    /// Node texture rotation.
    pub node_rotation: Option<Capability<f32>>,
    /// Node tint or rectangle fill.
    pub node_color: Option<Capability<Color>>,
    /// Node rectangle fill when bordered.
    pub node_fill_color: Option<Capability<Color>>,
    /// Node rectangle outline.
    pub node_border_color: Option<Capability<Color>>,

    /// Selection rectangles, bypassing drawable-derived selection.
    pub selection: Option<Capability<SelectionRects>>,

    /// Replaces the default move.
    pub move_override: Option<MoveHook>,
    /// Called before every move.
    pub on_move: Option<MoveNotify>,
    /// Replaces the default selection update after a move.
    pub update_move_selection: Option<SelectionMoveHook>,
    /// Replaces the default resize.
    pub resize_override: Option<ResizeHook>,
    /// Called before every resize.
    pub on_resize: Option<ResizeNotify>,
    /// Replaces the default selection update after a resize.
    pub update_resize_selection: Option<SelectionResizeHook>,
    /// Which axes may be resized.
    pub can_resize: Option<Capability<BVec2>>,
    /// Smallest allowed size.
    pub minimum_size: Option<Capability<Vec2>>,
    /// Largest allowed size; a non-positive axis is unbounded.
    pub maximum_size: Option<Capability<Vec2>>,
    /// Replaces the default delete.
    pub delete_override: Option<DeleteHook>,
    /// Called before every delete.
    pub on_delete: Option<DeleteNotify>,
    /// Replaces the default node insertion.
    pub node_added: Option<NodeAddedHook>,
    /// Called before every node insertion.
    pub on_node_added: Option<NodeAddedNotify>,

    /// How many nodes the type accepts.
    pub node_limits: Option<Capability<NodeLimits>>,
    /// When nodes are drawn.
    pub node_visibility: Option<Capability<NodeVisibility>>,
    /// How node connections are drawn.
    pub node_line_render_type: Option<Capability<NodeLineRenderType>>,

    /// Placement templates offered in the palette.
    pub placements: Option<Capability<PlacementDeclaration>>,
    /// Property panel order.
    pub field_order: Option<Capability<Vec<String>>>,
    /// Property panel metadata.
    pub field_information: Option<Capability<FieldInformation>>,
    /// Fields hidden from the property panel.
    pub ignored_fields: Option<Capability<Vec<String>>>,
    /// Handler-local strings, keyed relative to the type
    /// (`placements.name.<placement>`).
    pub language_data: Option<LanguageTable>,
    /// Builds a placement from an instance.
    pub clone_item: Option<CloneItemHook>,

    placeholder: Option<PlaceholderKind>,
}

impl Handler {
    /// A handler with no capabilities on the entity layer.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn placeholder(kind: PlaceholderKind, name: &str) -> Self {
        Self {
            name: name.to_string(),
            placeholder: Some(kind),
            ..Self::default()
        }
    }

    /// Which built-in placeholder this is, if any.
    #[must_use]
    pub const fn placeholder_kind(&self) -> Option<PlaceholderKind> {
        self.placeholder
    }

    /// Builder: set the layer.
    #[must_use]
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    /// Builder: set `depth`.
    #[must_use]
    pub fn with_depth(mut self, depth: impl Into<Capability<i32>>) -> Self {
        self.depth = Some(depth.into());
        self
    }

    /// Builder: set `node_depth`.
    #[must_use]
    pub fn with_node_depth(mut self, depth: impl Into<Capability<i32>>) -> Self {
        self.node_depth = Some(depth.into());
        self
    }

    /// Builder: set `sprite`.
    #[must_use]
    pub fn with_sprite(mut self, sprite: impl Into<Capability<Drawable>>) -> Self {
        self.sprite = Some(sprite.into());
        self
    }

    /// Builder: set `texture`.
    #[must_use]
    pub fn with_texture(mut self, texture: impl Into<String>) -> Self {
        self.texture = Some(Capability::Value(texture.into()));
        self
    }

    /// Builder: set `draw`.
    #[must_use]
    pub fn with_draw(mut self, draw: impl Into<Capability<CustomDraw>>) -> Self {
        self.draw = Some(draw.into());
        self
    }

    /// Builder: set `rectangle`.
    #[must_use]
    pub fn with_rectangle(mut self, rectangle: impl Into<Capability<Rect>>) -> Self {
        self.rectangle = Some(rectangle.into());
        self
    }

    /// Builder: set `selection`.
    #[must_use]
    pub fn with_selection(mut self, selection: impl Into<Capability<SelectionRects>>) -> Self {
        self.selection = Some(selection.into());
        self
    }

    /// Builder: set `nodeLimits`.
    #[must_use]
    pub fn with_node_limits(mut self, limits: impl Into<Capability<NodeLimits>>) -> Self {
        self.node_limits = Some(limits.into());
        self
    }

    /// Builder: set `nodeVisibility`.
    #[must_use]
    pub fn with_node_visibility(mut self, visibility: NodeVisibility) -> Self {
        self.node_visibility = Some(visibility.into());
        self
    }

    /// Builder: set `nodeLineRenderType`.
    #[must_use]
    pub fn with_node_line_render_type(mut self, render_type: NodeLineRenderType) -> Self {
        self.node_line_render_type = Some(render_type.into());
        self
    }

    /// Builder: set `placements`.
    #[must_use]
    pub fn with_placements(mut self, placements: impl Into<Capability<PlacementDeclaration>>) -> Self {
        self.placements = Some(placements.into());
        self
    }

    /// Builder: set `languageData`.
    #[must_use]
    pub fn with_language_data(mut self, language: LanguageTable) -> Self {
        self.language_data = Some(language);
        self
    }

    /// Builder: replace the default move.
    #[must_use]
    pub fn with_move_override(
        mut self,
        hook: impl Fn(&mut EntityInstance, Target, Vec2) -> anyhow::Result<bool> + Send + Sync + 'static,
    ) -> Self {
        self.move_override = Some(Arc::new(hook));
        self
    }

    /// Builder: observe moves.
    #[must_use]
    pub fn with_on_move(
        mut self,
        hook: impl Fn(&Room, &EntityInstance, Target, Vec2) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_move = Some(Arc::new(hook));
        self
    }

    /// Builder: replace the selection update after a move.
    #[must_use]
    pub fn with_update_move_selection(
        mut self,
        hook: impl Fn(&EntityInstance, &mut SelectedItem, Vec2) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.update_move_selection = Some(Arc::new(hook));
        self
    }

    /// Builder: replace the default resize.
    #[must_use]
    pub fn with_resize_override(
        mut self,
        hook: impl Fn(&mut EntityInstance, ResizeRequest) -> anyhow::Result<bool> + Send + Sync + 'static,
    ) -> Self {
        self.resize_override = Some(Arc::new(hook));
        self
    }

    /// Builder: observe resizes.
    #[must_use]
    pub fn with_on_resize(
        mut self,
        hook: impl Fn(&Room, &EntityInstance, ResizeRequest) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_resize = Some(Arc::new(hook));
        self
    }

    /// Builder: replace the selection update after a resize.
    #[must_use]
    pub fn with_update_resize_selection(
        mut self,
        hook: impl Fn(&EntityInstance, &mut SelectedItem, ResizeRequest) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.update_resize_selection = Some(Arc::new(hook));
        self
    }

    /// Builder: replace the default delete.
    #[must_use]
    pub fn with_delete_override(
        mut self,
        hook: impl Fn(&mut Room, EntityId, Target) -> anyhow::Result<bool> + Send + Sync + 'static,
    ) -> Self {
        self.delete_override = Some(Arc::new(hook));
        self
    }

    /// Builder: observe deletes.
    #[must_use]
    pub fn with_on_delete(
        mut self,
        hook: impl Fn(&Room, &EntityInstance, Target) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_delete = Some(Arc::new(hook));
        self
    }

    /// Builder: replace the default node insertion.
    #[must_use]
    pub fn with_node_added(
        mut self,
        hook: impl Fn(&mut EntityInstance, Target) -> anyhow::Result<bool> + Send + Sync + 'static,
    ) -> Self {
        self.node_added = Some(Arc::new(hook));
        self
    }

    /// Builder: observe node insertions.
    #[must_use]
    pub fn with_on_node_added(
        mut self,
        hook: impl Fn(&Room, &EntityInstance, Target) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_node_added = Some(Arc::new(hook));
        self
    }

    /// Builder: build placements from instances.
    #[must_use]
    pub fn with_clone_item(
        mut self,
        hook: impl Fn(&Room, &EntityInstance) -> anyhow::Result<Placement> + Send + Sync + 'static,
    ) -> Self {
        self.clone_item = Some(Arc::new(hook));
        self
    }

    /// The capabilities this handler carries. Placeholders report none.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        if self.placeholder.is_some() {
            return Capabilities::empty();
        }

        let flags = [
            (Capabilities::DEPTH, self.depth.is_some()),
            (Capabilities::SPRITE, self.sprite.is_some()),
            (Capabilities::TEXTURE, self.texture.is_some()),
            (Capabilities::DRAW, self.draw.is_some()),
            (Capabilities::RECTANGLE, self.rectangle.is_some()),
            (Capabilities::NODE_SPRITE, self.node_sprite.is_some()),
            (Capabilities::NODE_TEXTURE, self.node_texture.is_some()),
            (Capabilities::NODE_DRAW, self.node_draw.is_some()),
            (Capabilities::NODE_RECTANGLE, self.node_rectangle.is_some()),
            (Capabilities::SELECTION, self.selection.is_some()),
            (
                Capabilities::MOVE,
                self.move_override.is_some() || self.on_move.is_some() || self.update_move_selection.is_some(),
            ),
            (
                Capabilities::RESIZE,
                self.resize_override.is_some()
                    || self.on_resize.is_some()
                    || self.update_resize_selection.is_some(),
            ),
            (Capabilities::DELETE, self.delete_override.is_some() || self.on_delete.is_some()),
            (Capabilities::NODE_ADDED, self.node_added.is_some() || self.on_node_added.is_some()),
            (Capabilities::CAN_RESIZE, self.can_resize.is_some()),
            (Capabilities::MINIMUM_SIZE, self.minimum_size.is_some()),
            (Capabilities::MAXIMUM_SIZE, self.maximum_size.is_some()),
            (Capabilities::NODE_LIMITS, self.node_limits.is_some()),
            (Capabilities::NODE_VISIBILITY, self.node_visibility.is_some()),
            (Capabilities::NODE_LINE_RENDER_TYPE, self.node_line_render_type.is_some()),
            (Capabilities::PLACEMENTS, self.placements.is_some()),
            (Capabilities::FIELD_ORDER, self.field_order.is_some()),
            (Capabilities::FIELD_INFORMATION, self.field_information.is_some()),
            (Capabilities::IGNORED_FIELDS, self.ignored_fields.is_some()),
            (Capabilities::LANGUAGE_DATA, self.language_data.is_some()),
            (Capabilities::CLONE_ITEM, self.clone_item.is_some()),
        ];

        flags
            .into_iter()
            .filter(|(_, present)| *present)
            .fold(Capabilities::empty(), |acc, (flag, _)| acc | flag)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("layer", &self.layer)
            .field("placeholder", &self.placeholder)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_handler_has_no_capabilities() {
        let handler = Handler::new("empty");
        assert!(handler.capabilities().is_empty());
        assert_eq!(handler.layer, Layer::Entities);
        assert!(handler.placeholder_kind().is_none());
    }

    #[test]
    fn hooks_count_as_capabilities() {
        let handler = Handler::new("hooked")
            .with_on_move(|_, _, _, _| Ok(()))
            .with_delete_override(|_, _, _| Ok(true));

        let caps = handler.capabilities();
        assert!(caps.contains(Capabilities::MOVE));
        assert!(caps.contains(Capabilities::DELETE));
        assert!(!caps.contains(Capabilities::RESIZE));
    }

    #[test]
    fn placeholder_reports_nothing() {
        let handler = Handler::placeholder(PlaceholderKind::Missing, "x");
        assert!(handler.capabilities().is_empty());
        assert_eq!(handler.placeholder_kind(), Some(PlaceholderKind::Missing));
    }

    #[test]
    fn node_enums_deserialize_lowercase() {
        let visibility: NodeVisibility = serde_json::from_str("\"always\"").unwrap();
        assert_eq!(visibility, NodeVisibility::Always);
        let line: NodeLineRenderType = serde_json::from_str("\"fan\"").unwrap();
        assert_eq!(line, NodeLineRenderType::Fan);
        assert_eq!(NodeLineRenderType::default(), NodeLineRenderType::Line);
    }

    #[test]
    fn debug_lists_capabilities() {
        let handler = Handler::new("spring").with_texture("objects/spring/00");
        let text = format!("{handler:?}");
        assert!(text.contains("spring"));
        assert!(text.contains("TEXTURE"));
    }
}
