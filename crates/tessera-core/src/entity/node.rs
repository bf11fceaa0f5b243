//! Nodes and entity-or-node addressing.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An auxiliary control point owned by an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
}

impl Node {
    /// Creates a node at `(x, y)`.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Position as a vector.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Moves the node by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }
}

impl From<Vec2> for Node {
    fn from(position: Vec2) -> Self {
        Self::new(position.x, position.y)
    }
}

/// What an editing operation acts on: the entity itself or one of its nodes.
///
/// Node indices are 1-based. In raw form index `0` means "the entity
/// itself"; [`Target::from_index`] and [`Target::index`] convert between the
/// two representations.
///
/// # Example
///
/// ```
/// use tessera_core::entity::Target;
///
/// assert_eq!(Target::from_index(0), Target::Entity);
/// assert_eq!(Target::from_index(2), Target::Node(2));
/// assert_eq!(Target::Node(2).index(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// The owning entity.
    #[default]
    Entity,
    /// A node, by 1-based index.
    Node(usize),
}

impl Target {
    /// Converts a raw index (`0` = entity) into a target.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        if index == 0 {
            Self::Entity
        } else {
            Self::Node(index)
        }
    }

    /// Raw index of this target (`0` = entity).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Entity => 0,
            Self::Node(index) => index,
        }
    }

    /// True when targeting a node.
    #[must_use]
    pub const fn is_node(self) -> bool {
        matches!(self, Self::Node(_))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity => write!(f, "entity"),
            Self::Node(index) => write!(f, "node {index}"),
        }
    }
}

/// Bounds on the number of nodes an entity type accepts.
///
/// `max: None` means unbounded. Raw handler data uses `-1` for unbounded on
/// either side; see [`NodeLimits::from_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeLimits {
    /// Fewest nodes the entity may keep.
    pub min: usize,
    /// Most nodes the entity may have, if bounded.
    pub max: Option<usize>,
}

impl NodeLimits {
    /// No nodes at all; the default for types that do not declare limits.
    pub const NONE: Self = Self { min: 0, max: Some(0) };

    /// Any number of nodes.
    pub const UNBOUNDED: Self = Self { min: 0, max: None };

    /// Creates limits from a minimum and an optional maximum.
    #[must_use]
    pub const fn new(min: usize, max: Option<usize>) -> Self {
        Self { min, max }
    }

    /// Creates limits from raw values where a negative number means
    /// unbounded.
    ///
    /// ```
    /// use tessera_core::entity::NodeLimits;
    ///
    /// assert_eq!(NodeLimits::from_raw(1, -1), NodeLimits::new(1, None));
    /// assert_eq!(NodeLimits::from_raw(-1, 2), NodeLimits::new(0, Some(2)));
    /// ```
    #[must_use]
    pub fn from_raw(min: i64, max: i64) -> Self {
        Self {
            min: usize::try_from(min).unwrap_or(0),
            max: usize::try_from(max).ok(),
        }
    }

    /// True if one more node may be added to an entity with `count` nodes.
    #[must_use]
    pub fn allows_add(&self, count: usize) -> bool {
        self.max.map_or(true, |max| count < max)
    }

    /// True if a node may be removed from an entity with `count` nodes
    /// without dropping below the minimum.
    #[must_use]
    pub fn allows_remove(&self, count: usize) -> bool {
        count > self.min
    }

    /// True for exactly one required and allowed node.
    #[must_use]
    pub fn is_single_node(&self) -> bool {
        self.min == 1 && self.max == Some(1)
    }
}

impl Default for NodeLimits {
    fn default() -> Self {
        Self::NONE
    }
}
