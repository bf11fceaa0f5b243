//! # Tessera Core
//!
//! Entity handler dispatch and editing engine for the Tessera level editor.
//!
//! Map content is made of typed entities. Each entity type is described by a
//! [`Handler`](handler::Handler) contributed by a plugin: how to draw it, how
//! to select it, how it reacts to edits and what it offers in the placement
//! palette. Handlers may be incomplete, buggy or missing; the engine fills
//! the gaps with defaults and contains their failures.
//!
//! ## Architecture
//!
//! - **Handlers** ([`handler`], [`handlers`]): capability records, the
//!   registry, and the built-in missing/erroring placeholders
//! - **Resolvers** ([`resolver`]): drawables, selections and node lines from
//!   partial handlers
//! - **Fault barrier** ([`fault`]): panics and errors become placeholders,
//!   reported once per entity and operation
//! - **Engine** ([`engine`]): the facade for resolution, mutation, accessors
//!   and the placement catalog
//! - **Geometry** ([`tessera_geom`]): re-exported pure geometry
//!
//! ## Usage
//!
//! ```
//! use glam::Vec2;
//! use tessera_core::engine::Engine;
//! use tessera_core::entity::{EntityInstance, NodeLimits, Target};
//! use tessera_core::handler::{Handler, HandlerRegistry};
//! use tessera_core::room::{Layer, Room};
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register(
//!     Handler::new("zipMover")
//!         .with_texture("objects/zipmover/block")
//!         .with_node_limits(NodeLimits::new(1, Some(1))),
//! );
//! let mut engine = Engine::new(registry);
//!
//! let mut room = Room::new("a-00");
//! let id = room.add(Layer::Entities, EntityInstance::new("zipMover", Vec2::ZERO).with_size(16.0, 16.0));
//!
//! assert!(engine.add_node(&mut room, id, Target::Entity).unwrap());
//! assert_eq!(room.get(id).unwrap().node(1).unwrap().position(), Vec2::new(24.0, 0.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export geometry for callers building rectangles and quads
pub use tessera_geom;

pub mod config;
pub mod drawable;
pub mod engine;
pub mod entity;
pub mod error;
pub mod fault;
pub mod handler;
pub mod handlers;
pub mod placement;
pub mod resolver;
pub mod room;
pub mod services;

pub use config::EngineConfig;
pub use drawable::{Drawable, DrawElement};
pub use engine::{DrawItem, Engine};
pub use entity::{EntityId, EntityInstance, Node, NodeLimits, Target};
pub use error::{ConfigError, EngineError, HandlerFault};
pub use handler::{Capability, Handler, HandlerRegistry};
pub use placement::{Placement, PlacementType};
pub use room::{IdAllocator, Layer, Room};

#[cfg(test)]
mod tests;
