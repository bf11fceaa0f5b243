//! Handler registry: entity type name → handler.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::Handler;
use crate::handlers;

/// Where a handler came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ContentOrigin {
    /// Shipped with the editor.
    #[default]
    Core,
    /// Contributed by a named mod.
    Mod(String),
}

impl ContentOrigin {
    /// Mod name for non-core content.
    #[must_use]
    pub fn mod_name(&self) -> Option<&str> {
        match self {
            Self::Core => None,
            Self::Mod(name) => Some(name),
        }
    }
}

impl fmt::Display for ContentOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core => f.write_str("core"),
            Self::Mod(name) => write!(f, "mod {name}"),
        }
    }
}

struct Entry {
    handler: Arc<Handler>,
    origin: ContentOrigin,
}

/// Registry of published handlers.
///
/// Lookups never fail: unknown type names get the shared missing-entity
/// placeholder. Iteration is sorted by type name.
///
/// # Example
///
/// ```
/// use tessera_core::handler::{ContentOrigin, Handler, HandlerRegistry, PlaceholderKind};
///
/// let mut registry = HandlerRegistry::new();
/// registry.register(Handler::new("spring").with_texture("objects/spring/00"));
/// registry.register_from(Handler::new("customSpinner"), ContentOrigin::Mod("Spins".into()));
///
/// assert_eq!(registry.lookup("spring").name, "spring");
/// assert_eq!(registry.lookup("nope").placeholder_kind(), Some(PlaceholderKind::Missing));
/// assert_eq!(registry.origin("customSpinner").and_then(|o| o.mod_name()), Some("Spins"));
/// ```
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Entry>,
    missing: Arc<Handler>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
            missing: Arc::new(handlers::missing::handler()),
        }
    }

    /// Publishes a core handler, returning the one it replaced.
    pub fn register(&mut self, handler: Handler) -> Option<Arc<Handler>> {
        self.register_from(handler, ContentOrigin::Core)
    }

    /// Publishes a handler from `origin`, returning the one it replaced.
    pub fn register_from(&mut self, handler: Handler, origin: ContentOrigin) -> Option<Arc<Handler>> {
        let name = handler.name.clone();
        debug!(
            entity_type = %name,
            origin = %origin,
            capabilities = ?handler.capabilities(),
            "registered handler"
        );

        let entry = Entry {
            handler: Arc::new(handler),
            origin,
        };
        self.handlers.insert(name, entry).map(|old| old.handler)
    }

    /// Returns the handler for `entity_type`, or the missing-entity
    /// placeholder.
    #[must_use]
    pub fn lookup(&self, entity_type: &str) -> Arc<Handler> {
        self.get(entity_type)
            .map_or_else(|| Arc::clone(&self.missing), Arc::clone)
    }

    /// Returns the registered handler for `entity_type`, if any.
    #[must_use]
    pub fn get(&self, entity_type: &str) -> Option<&Arc<Handler>> {
        self.handlers.get(entity_type).map(|entry| &entry.handler)
    }

    /// True if a handler is registered for `entity_type`.
    #[must_use]
    pub fn contains(&self, entity_type: &str) -> bool {
        self.handlers.contains_key(entity_type)
    }

    /// Where the handler for `entity_type` came from.
    #[must_use]
    pub fn origin(&self, entity_type: &str) -> Option<&ContentOrigin> {
        self.handlers.get(entity_type).map(|entry| &entry.origin)
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Iterates `(type name, handler)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Handler>)> {
        self.handlers
            .iter()
            .map(|(name, entry)| (name.as_str(), &entry.handler))
    }

    /// Removes every handler, e.g. before reloading plugins.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// The unknown-entity placeholder.
    #[must_use]
    pub fn missing(&self) -> &Arc<Handler> {
        &self.missing
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handler_count", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::PlaceholderKind;
    use crate::room::Layer;

    #[test]
    fn unknown_type_gets_missing_placeholder() {
        let registry = HandlerRegistry::new();
        let handler = registry.lookup("doesNotExist");

        assert_eq!(handler.placeholder_kind(), Some(PlaceholderKind::Missing));
        assert!(handler.capabilities().is_empty());
        assert!(Arc::ptr_eq(&handler, registry.missing()));
    }

    #[test]
    fn register_replaces_and_returns_previous() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.register(Handler::new("spring")).is_none());

        let previous = registry
            .register(Handler::new("spring").with_layer(Layer::Triggers))
            .unwrap();
        assert_eq!(previous.layer, Layer::Entities);
        assert_eq!(registry.lookup("spring").layer, Layer::Triggers);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn iteration_is_sorted() {
        let mut registry = HandlerRegistry::new();
        for name in ["zipMover", "booster", "refill"] {
            registry.register(Handler::new(name));
        }
        let names: Vec<_> = registry.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["booster", "refill", "zipMover"]);
    }

    #[test]
    fn origin_tracking() {
        let mut registry = HandlerRegistry::new();
        registry.register(Handler::new("core"));
        registry.register_from(Handler::new("modded"), ContentOrigin::Mod("Helper".into()));

        assert_eq!(registry.origin("core"), Some(&ContentOrigin::Core));
        assert_eq!(registry.origin("modded").and_then(ContentOrigin::mod_name), Some("Helper"));
        assert!(registry.origin("absent").is_none());
    }

    #[test]
    fn clear_keeps_placeholders() {
        let mut registry = HandlerRegistry::new();
        registry.register(Handler::new("spring"));
        registry.clear();

        assert!(registry.is_empty());
        assert!(!registry.contains("spring"));
        assert_eq!(registry.lookup("spring").placeholder_kind(), Some(PlaceholderKind::Missing));
    }
}
