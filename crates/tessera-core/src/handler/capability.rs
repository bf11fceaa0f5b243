//! Literal-or-derived capability values.
//!
//! Every capability of a [`Handler`](super::Handler) is either a fixed value
//! or a function of the entity being asked about. [`Capability::resolve`] is
//! the single place either form is turned into a value, and
//! [`resolve_opt`] adds the "capability absent" case on top.

use std::fmt;
use std::sync::Arc;

use crate::drawable::Viewport;
use crate::entity::{EntityInstance, Node};
use crate::error::HandlerFault;
use crate::room::Room;

/// Inputs a derived capability may look at.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityContext<'a> {
    /// Room the entity is in.
    pub room: &'a Room,
    /// Entity being resolved.
    pub entity: &'a EntityInstance,
    /// Node being resolved and its 1-based index, for node capabilities.
    pub node: Option<(&'a Node, usize)>,
    /// Visible area, when resolving for rendering.
    pub viewport: Option<&'a Viewport>,
}

impl<'a> CapabilityContext<'a> {
    /// Context for an entity-scoped capability.
    #[must_use]
    pub const fn new(room: &'a Room, entity: &'a EntityInstance) -> Self {
        Self {
            room,
            entity,
            node: None,
            viewport: None,
        }
    }

    /// Builder: scope to one node.
    #[must_use]
    pub fn with_node(mut self, node: &'a Node, index: usize) -> Self {
        self.node = Some((node, index));
        self
    }

    /// Builder: attach the viewport.
    #[must_use]
    pub fn with_viewport(mut self, viewport: Option<&'a Viewport>) -> Self {
        self.viewport = viewport;
        self
    }
}

/// Function form of a capability.
pub type DeriveFn<T> = Arc<dyn Fn(&CapabilityContext<'_>) -> anyhow::Result<T> + Send + Sync>;

/// A capability value: literal, or derived per entity.
///
/// # Example
///
/// ```
/// use glam::Vec2;
/// use tessera_core::entity::EntityInstance;
/// use tessera_core::handler::{Capability, CapabilityContext};
/// use tessera_core::room::Room;
///
/// let fixed: Capability<i32> = 8000.into();
/// let by_width = Capability::derived(|cx: &CapabilityContext<'_>| {
///     Ok(cx.entity.width.unwrap_or(0.0) as i32)
/// });
///
/// let room = Room::new("test");
/// let entity = EntityInstance::new("block", Vec2::ZERO).with_size(24.0, 8.0);
/// let cx = CapabilityContext::new(&room, &entity);
///
/// assert_eq!(fixed.resolve(&cx).unwrap(), 8000);
/// assert_eq!(by_width.resolve(&cx).unwrap(), 24);
/// ```
pub enum Capability<T> {
    /// Same value for every entity.
    Value(T),
    /// Computed from the entity (and node, viewport).
    Derived(DeriveFn<T>),
}

impl<T> Capability<T> {
    /// Wraps a derivation function.
    pub fn derived(
        f: impl Fn(&CapabilityContext<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    ) -> Self {
        Self::Derived(Arc::new(f))
    }

    /// True for the function form.
    #[must_use]
    pub const fn is_derived(&self) -> bool {
        matches!(self, Self::Derived(_))
    }
}

impl<T: Clone> Capability<T> {
    /// Returns the literal or invokes the derivation.
    ///
    /// # Errors
    ///
    /// Propagates whatever the derivation returns.
    pub fn resolve(&self, cx: &CapabilityContext<'_>) -> anyhow::Result<T> {
        match self {
            Self::Value(value) => Ok(value.clone()),
            Self::Derived(f) => f(cx),
        }
    }
}

impl<T> From<T> for Capability<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T: Clone> Clone for Capability<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Value(value) => Self::Value(value.clone()),
            Self::Derived(f) => Self::Derived(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Capability<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// Resolves an optional capability, naming it in the fault on failure.
///
/// # Errors
///
/// Returns [`HandlerFault::Capability`] when the derivation fails.
pub fn resolve_opt<T: Clone>(
    capability: Option<&Capability<T>>,
    cx: &CapabilityContext<'_>,
    name: &'static str,
) -> Result<Option<T>, HandlerFault> {
    capability
        .map(|cap| cap.resolve(cx).map_err(|source| HandlerFault::capability(name, source)))
        .transpose()
}
