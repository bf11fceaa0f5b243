//! Entity model for the level editor.
//!
//! This module provides the placed-object types the engine operates on:
//! - [`EntityId`]: Map-unique identifier assigned by the owning room
//! - [`EntityInstance`]: A typed, positioned object with optional size and nodes
//! - [`Node`] / [`Target`]: Auxiliary control points and entity-or-node addressing
//! - [`NodeLimits`]: How many nodes an entity type accepts
//!
//! # Data Shape
//!
//! Instances (de)serialize as one flat field map, the same shape placement
//! templates use:
//!
//! ```
//! use tessera_core::entity::EntityInstance;
//!
//! let entity: EntityInstance = serde_json::from_value(serde_json::json!({
//!     "_name": "spikesUp",
//!     "_id": 7,
//!     "x": 16.0,
//!     "y": 32.0,
//!     "width": 24.0,
//!     "type": "dust"
//! }))
//! .unwrap();
//!
//! assert_eq!(entity.entity_type, "spikesUp");
//! assert_eq!(entity.width, Some(24.0));
//! assert_eq!(entity.fields["type"], "dust");
//! ```

mod node;

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use node::{Node, NodeLimits, Target};

/// Custom per-entity fields, keyed by field name.
///
/// `BTreeMap` keeps field iteration (and therefore serialization and the
/// property panel) in a stable order.
pub type FieldMap = BTreeMap<String, Value>;

/// Unique identifier for an entity within a map.
///
/// The zero id is reserved for instances that have not been added to a room
/// yet, such as placement templates.
///
/// # Example
///
/// ```
/// use tessera_core::entity::EntityId;
///
/// let id = EntityId::new(3);
/// assert_eq!(id.as_u64(), 3);
/// assert!(!id.is_unassigned());
/// assert!(EntityId::UNASSIGNED.is_unassigned());
/// ```
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Id of an instance that belongs to no room.
    pub const UNASSIGNED: Self = Self(0);

    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// True for the reserved "not in a room" id.
    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// A placed, typed object on a map layer.
///
/// Position is the entity's anchor; `width`/`height` are only present for
/// sized entity types. Nodes, when present, are ordered and addressed with
/// 1-based indices (see [`Target`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityInstance {
    /// Entity type name, used to look up the handler.
    #[serde(rename = "_name")]
    pub entity_type: String,
    /// Map-unique id.
    #[serde(rename = "_id", default)]
    pub id: EntityId,
    /// Horizontal position.
    #[serde(default)]
    pub x: f32,
    /// Vertical position.
    #[serde(default)]
    pub y: f32,
    /// Width, for sized entities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// Height, for sized entities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    /// Ordered control points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<Node>>,
    /// Every other field, owned by the entity type.
    #[serde(flatten)]
    pub fields: FieldMap,
}

impl EntityInstance {
    /// Creates an unsized, node-less instance at `position`.
    #[must_use]
    pub fn new(entity_type: impl Into<String>, position: Vec2) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: EntityId::UNASSIGNED,
            x: position.x,
            y: position.y,
            width: None,
            height: None,
            nodes: None,
            fields: FieldMap::new(),
        }
    }

    /// Builder: set width and height.
    #[must_use]
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Builder: replace the node list.
    #[must_use]
    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = Vec2>) -> Self {
        self.nodes = Some(nodes.into_iter().map(Node::from).collect());
        self
    }

    /// Builder: set one custom field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Builds an instance from a flat field map.
    ///
    /// `nodes` may be given as a list of `{x, y}` objects or, as template
    /// data often does, as a map of them; a map is read in key order.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error when a well-known field has the
    /// wrong shape (e.g. a string `x`).
    pub fn from_fields(
        entity_type: &str,
        mut fields: serde_json::Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        if let Some(Value::Object(nodes)) = fields.get("nodes") {
            let list: Vec<Value> = nodes.values().cloned().collect();
            fields.insert("nodes".to_string(), Value::Array(list));
        }
        fields.insert("_name".to_string(), Value::String(entity_type.to_string()));
        serde_json::from_value(Value::Object(fields))
    }

    /// Position as a vector.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Sets the position.
    pub fn set_position(&mut self, position: Vec2) {
        self.x = position.x;
        self.y = position.y;
    }

    /// True if the entity carries width or height.
    #[must_use]
    pub fn is_sized(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }

    /// Number of nodes (zero when the entity has no node list).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.as_ref().map_or(0, Vec::len)
    }

    /// Node at a 1-based index.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&Node> {
        index
            .checked_sub(1)
            .and_then(|i| self.nodes.as_ref()?.get(i))
    }

    /// Mutable node at a 1-based index.
    pub fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
        index
            .checked_sub(1)
            .and_then(|i| self.nodes.as_mut()?.get_mut(i))
    }

    /// Iterates nodes with their 1-based indices.
    pub fn indexed_nodes(&self) -> impl Iterator<Item = (usize, &Node)> {
        self.nodes
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, node)| (i + 1, node))
    }

    /// A copy of this entity moved onto `node`, used when a node borrows the
    /// entity's own drawable.
    #[must_use]
    pub fn at_node(&self, node: &Node) -> Self {
        let mut clone = self.clone();
        clone.set_position(node.position());
        clone
    }
}
