//! Collaborators the engine consumes but does not own.
//!
//! The host editor provides texture metadata, localized strings and a
//! render target. The engine only sees them through these traits;
//! [`TextureTable`] and [`LanguageTable`] are simple in-memory
//! implementations for hosts that preload everything (and for tests).

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use serde_json::Value;

use crate::drawable::{CircleSprite, LineSprite, RectangleSprite, TextureSprite};

/// Dimensions of a loaded texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureInfo {
    /// Width in map units.
    pub width: f32,
    /// Height in map units.
    pub height: f32,
}

impl TextureInfo {
    /// Creates texture metadata.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Size as a vector.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Resolves texture names to their dimensions.
pub trait TextureLookup: Send + Sync {
    /// Returns the texture's size, or `None` if it does not exist.
    fn texture(&self, name: &str) -> Option<TextureInfo>;
}

/// Resolves localization key paths to strings.
pub trait LanguageLookup: Send + Sync {
    /// Looks up `path` (e.g. `["entities", "spring", "placements", "name", "normal"]`).
    fn text(&self, path: &[&str]) -> Option<String>;
}

/// Render target that drawables replay onto.
pub trait Canvas {
    /// Draws a textured quad.
    fn draw_texture(&mut self, sprite: &TextureSprite);
    /// Draws a rectangle.
    fn draw_rectangle(&mut self, sprite: &RectangleSprite);
    /// Draws a polyline.
    fn draw_line(&mut self, line: &LineSprite);
    /// Draws a circle outline.
    fn draw_circle(&mut self, circle: &CircleSprite);
}

// =============================================================================
// In-memory Tables
// =============================================================================

/// Texture metadata held in a map.
#[derive(Debug, Clone, Default)]
pub struct TextureTable {
    textures: HashMap<String, TextureInfo>,
}

impl TextureTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a texture.
    pub fn insert(&mut self, name: impl Into<String>, info: TextureInfo) {
        self.textures.insert(name.into(), info);
    }

    /// Builder: add a texture.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, width: f32, height: f32) -> Self {
        self.insert(name, TextureInfo::new(width, height));
        self
    }
}

impl TextureLookup for TextureTable {
    fn texture(&self, name: &str) -> Option<TextureInfo> {
        self.textures.get(name).copied()
    }
}

/// Strings keyed by dotted path.
///
/// ```
/// use tessera_core::services::{LanguageLookup, LanguageTable};
///
/// let table = LanguageTable::from_json(&serde_json::json!({
///     "entities": { "spring": { "placements": { "name": { "normal": "Spring" } } } }
/// }));
/// assert_eq!(
///     table.text(&["entities", "spring", "placements", "name", "normal"]).as_deref(),
///     Some("Spring")
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageTable {
    entries: BTreeMap<String, String>,
}

impl LanguageTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens a nested JSON object of strings. Non-string leaves are
    /// ignored.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let mut table = Self::new();
        table.flatten_into(String::new(), value);
        table
    }

    fn flatten_into(&mut self, prefix: String, value: &Value) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}.{key}")
                    };
                    self.flatten_into(path, child);
                }
            }
            Value::String(text) => {
                self.entries.insert(prefix, text.clone());
            }
            _ => {}
        }
    }

    /// Adds or replaces a string under a dotted key.
    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    /// Builder: add a string.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(key, text);
        self
    }

    /// Number of strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table holds no strings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LanguageLookup for LanguageTable {
    fn text(&self, path: &[&str]) -> Option<String> {
        self.entries.get(&path.join(".")).cloned()
    }
}

// =============================================================================
// Service Bundle
// =============================================================================

/// The collaborators an [`Engine`](crate::engine::Engine) is built with.
#[derive(Clone)]
pub struct Services {
    /// Texture metadata.
    pub textures: Arc<dyn TextureLookup>,
    /// Localized strings.
    pub language: Arc<dyn LanguageLookup>,
}

impl Services {
    /// Bundles collaborators.
    pub fn new(textures: impl TextureLookup + 'static, language: impl LanguageLookup + 'static) -> Self {
        Self {
            textures: Arc::new(textures),
            language: Arc::new(language),
        }
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::new(TextureTable::new(), LanguageTable::new())
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
