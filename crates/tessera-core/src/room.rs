//! Room: the container for placed entities.
//!
//! A room owns its entities, split into layers ([`Layer::Entities`] and
//! [`Layer::Triggers`]). Each layer keeps insertion order, which is also the
//! order the editor draws equal-depth items in. The room assigns
//! [`EntityId`]s when instances are added, from an [`IdAllocator`] that the
//! rooms of one map share so ids stay unique across the whole map.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use tessera_core::entity::EntityInstance;
//! use tessera_core::room::{Layer, Room};
//!
//! let mut room = Room::new("a-00");
//! let id = room.add(Layer::Entities, EntityInstance::new("strawberry", Vec2::new(8.0, 8.0)));
//!
//! assert_eq!(room.get(id).unwrap().entity_type, "strawberry");
//! assert_eq!(room.layer_of(id), Some(Layer::Entities));
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityInstance};

/// Which collection of a room an entity lives in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Visible gameplay objects.
    #[default]
    Entities,
    /// Invisible trigger regions.
    Triggers,
}

impl Layer {
    /// Every layer, in draw order.
    pub const ALL: [Self; 2] = [Self::Entities, Self::Triggers];

    /// Key used for this layer in language lookups.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Entities => "entities",
            Self::Triggers => "triggers",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// =============================================================================
// Id Allocation
// =============================================================================

/// Hands out entity ids. Clones share the counter, so every room built from
/// the same allocator draws from one id space.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: Arc<AtomicU64>,
}

impl IdAllocator {
    /// Creates an allocator whose first id is 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Returns a fresh id. Saturates at `u64::MAX` instead of wrapping.
    pub fn allocate(&self) -> EntityId {
        let current = match self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| Some(n.saturating_add(1)))
        {
            Ok(n) | Err(n) => n,
        };
        EntityId::new(current.max(1))
    }

    /// Records an id assigned elsewhere so it is never handed out again.
    pub fn observe(&self, id: EntityId) {
        if let Some(next) = id.as_u64().checked_add(1) {
            self.next.fetch_max(next, Ordering::Relaxed);
        }
    }

    /// True if both allocators draw from the same counter.
    #[must_use]
    pub fn shares_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.next, &other.next)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Room
// =============================================================================

/// A room of the map being edited.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Room {
    /// Room name.
    pub name: String,
    /// Entity layer, in insertion order.
    entities: Vec<EntityInstance>,
    /// Trigger layer, in insertion order.
    triggers: Vec<EntityInstance>,
    /// Id source, shared with the other rooms of the map.
    #[serde(skip)]
    ids: IdAllocator,
}

impl Room {
    /// Creates an empty room.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: Vec::new(),
            triggers: Vec::new(),
            ids: IdAllocator::new(),
        }
    }

    /// Builder: draw ids from `ids`, shared with other rooms of the map.
    ///
    /// Ids already in the room are recorded so they are not handed out
    /// again.
    #[must_use]
    pub fn with_ids(mut self, ids: &IdAllocator) -> Self {
        for entity in self.entities.iter().chain(self.triggers.iter()) {
            ids.observe(entity.id);
        }
        self.ids = ids.clone();
        self
    }

    /// The allocator this room draws ids from.
    #[must_use]
    pub const fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    /// Adds an instance to a layer and returns its id.
    ///
    /// Unassigned or already-used ids are replaced with a fresh one; any
    /// other id is kept so loaded maps retain their ids.
    pub fn add(&mut self, layer: Layer, mut entity: EntityInstance) -> EntityId {
        if entity.id.is_unassigned() || self.get(entity.id).is_some() {
            entity.id = self.allocate_id();
        } else {
            self.ids.observe(entity.id);
        }

        let id = entity.id;
        self.layer_vec_mut(layer).push(entity);
        id
    }

    /// Removes an entity from whichever layer holds it.
    pub fn remove(&mut self, id: EntityId) -> Option<EntityInstance> {
        let layer = self.layer_of(id)?;
        let items = self.layer_vec_mut(layer);
        let index = items.iter().position(|e| e.id == id)?;
        Some(items.remove(index))
    }

    /// Returns the entity with `id`, from any layer.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntityInstance> {
        self.iter().find(|e| e.id == id)
    }

    /// Returns a mutable reference to the entity with `id`.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityInstance> {
        self.entities
            .iter_mut()
            .chain(self.triggers.iter_mut())
            .find(|e| e.id == id)
    }

    /// Returns the layer holding `id`.
    #[must_use]
    pub fn layer_of(&self, id: EntityId) -> Option<Layer> {
        Layer::ALL
            .into_iter()
            .find(|&layer| self.layer(layer).iter().any(|e| e.id == id))
    }

    /// The instances of one layer, in insertion order.
    #[must_use]
    pub fn layer(&self, layer: Layer) -> &[EntityInstance] {
        match layer {
            Layer::Entities => &self.entities,
            Layer::Triggers => &self.triggers,
        }
    }

    /// Iterates every instance, entity layer first.
    pub fn iter(&self) -> impl Iterator<Item = &EntityInstance> {
        self.entities.iter().chain(self.triggers.iter())
    }

    /// Total number of instances across layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len() + self.triggers.len()
    }

    /// True if the room holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.triggers.is_empty()
    }

    fn layer_vec_mut(&mut self, layer: Layer) -> &mut Vec<EntityInstance> {
        match layer {
            Layer::Entities => &mut self.entities,
            Layer::Triggers => &mut self.triggers,
        }
    }

    /// Skips ids already present; a saturated allocator keeps returning
    /// `u64::MAX`, so the search falls back to the lowest free id.
    fn allocate_id(&self) -> EntityId {
        let id = self.ids.allocate();
        if self.get(id).is_none() {
            return id;
        }
        (1..=u64::MAX)
            .map(EntityId::new)
            .find(|&candidate| self.get(candidate).is_none())
            .unwrap_or(id)
    }
}
