//! Renderable descriptions produced by handlers and the resolvers.
//!
//! A [`Drawable`] is an ordered list of [`DrawElement`]s. Each element knows
//! its own bounding rectangle, may override the drawable's depth, and may set
//! `ignore_rest` to stop selection covering after itself. Drawables are plain
//! data; [`Drawable::draw`] replays them onto a [`Canvas`].
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use tessera_core::drawable::{Color, DrawElement, Drawable, RectangleSprite};
//! use tessera_core::tessera_geom::Rect;
//!
//! let drawable: Drawable = [
//!     DrawElement::from(RectangleSprite::filled(Rect::new(0.0, 0.0, 8.0, 8.0), Color::WHITE)),
//!     DrawElement::from(RectangleSprite::filled(Rect::new(8.0, 0.0, 8.0, 8.0), Color::WHITE)),
//! ]
//! .into_iter()
//! .collect();
//!
//! assert_eq!(drawable.bounds(), Some(Rect::new(0.0, 0.0, 16.0, 8.0)));
//! ```

use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tessera_geom::{cover_until, sprite_bounds, Circle, Rect, SpriteQuad};

use crate::services::Canvas;

// =============================================================================
// Colour & Viewport
// =============================================================================

/// Linear RGBA colour, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    /// Creates a colour from its components.
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// The visible part of the map, passed to capabilities that draw
/// differently depending on what is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Visible area in map units.
    pub area: Rect,
    /// Zoom factor.
    pub scale: f32,
}

impl Viewport {
    /// Creates a viewport.
    #[must_use]
    pub const fn new(area: Rect, scale: f32) -> Self {
        Self { area, scale }
    }
}

// =============================================================================
// Element Kinds
// =============================================================================

/// A texture drawn as a positioned quad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureSprite {
    /// Texture name.
    pub texture: String,
    /// Placement of the quad.
    pub quad: SpriteQuad,
    /// Tint.
    pub color: Color,
}

impl TextureSprite {
    /// A centred, untinted sprite.
    #[must_use]
    pub fn new(texture: impl Into<String>, position: Vec2, size: Vec2) -> Self {
        Self {
            texture: texture.into(),
            quad: SpriteQuad::new(position, size),
            color: Color::WHITE,
        }
    }
}

/// How a rectangle sprite is painted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RectangleMode {
    /// Solid fill.
    Fill(Color),
    /// Fill with a one-unit outline.
    Bordered {
        /// Interior colour.
        fill: Color,
        /// Outline colour.
        border: Color,
    },
}

/// A solid or bordered rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectangleSprite {
    /// Area covered.
    pub rect: Rect,
    /// Paint mode.
    pub mode: RectangleMode,
}

impl RectangleSprite {
    /// A filled rectangle.
    #[must_use]
    pub const fn filled(rect: Rect, color: Color) -> Self {
        Self {
            rect,
            mode: RectangleMode::Fill(color),
        }
    }

    /// A filled rectangle with an outline.
    #[must_use]
    pub const fn bordered(rect: Rect, fill: Color, border: Color) -> Self {
        Self {
            rect,
            mode: RectangleMode::Bordered { fill, border },
        }
    }
}

/// An open polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSprite {
    /// Points in order.
    pub points: Vec<Vec2>,
    /// Stroke colour.
    pub color: Color,
    /// Stroke width.
    pub thickness: f32,
}

impl LineSprite {
    /// A one-unit line through `points`.
    #[must_use]
    pub fn new(points: Vec<Vec2>, color: Color) -> Self {
        Self {
            points,
            color,
            thickness: 1.0,
        }
    }

    fn bounds(&self) -> Option<Rect> {
        let first = *self.points.first()?;
        let (min, max) = self
            .points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Some(Rect::from_corners(min, max))
    }
}

/// A circle outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleSprite {
    /// Geometry.
    pub circle: Circle,
    /// Stroke colour.
    pub color: Color,
}

/// Paint callback of a custom draw element.
pub type PaintFn = Arc<dyn Fn(&mut dyn Canvas) + Send + Sync>;

/// A handler-supplied render callback.
///
/// The engine cannot look inside the callback, so the handler reports the
/// bounds (for selection) and depth it draws at.
#[derive(Clone)]
pub struct CustomDraw {
    /// Render callback.
    pub paint: PaintFn,
    /// Area the callback draws into, if known.
    pub bounds: Option<Rect>,
    /// Depth the callback draws at.
    pub depth: Option<i32>,
}

impl CustomDraw {
    /// Wraps a paint callback.
    pub fn new(paint: impl Fn(&mut dyn Canvas) + Send + Sync + 'static) -> Self {
        Self {
            paint: Arc::new(paint),
            bounds: None,
            depth: None,
        }
    }

    /// Builder: set the reported bounds.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Builder: set the depth.
    #[must_use]
    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = Some(depth);
        self
    }
}

impl fmt::Debug for CustomDraw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomDraw")
            .field("bounds", &self.bounds)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

/// The shape an element draws.
#[derive(Debug, Clone)]
pub enum ElementKind {
    /// Textured quad.
    Texture(TextureSprite),
    /// Plain rectangle.
    Rectangle(RectangleSprite),
    /// Polyline.
    Line(LineSprite),
    /// Circle outline.
    Circle(CircleSprite),
    /// Opaque callback.
    Custom(CustomDraw),
}

// =============================================================================
// Elements & Drawables
// =============================================================================

/// One entry of a [`Drawable`].
#[derive(Debug, Clone)]
pub struct DrawElement {
    /// What to draw.
    pub kind: ElementKind,
    /// Depth override for this element.
    pub depth: Option<i32>,
    /// When set, selection covering stops after this element.
    pub ignore_rest: bool,
}

impl DrawElement {
    /// Wraps an element kind with no depth override.
    #[must_use]
    pub const fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            depth: None,
            ignore_rest: false,
        }
    }

    /// Builder: override depth.
    #[must_use]
    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Builder: stop selection covering after this element.
    #[must_use]
    pub fn ignoring_rest(mut self) -> Self {
        self.ignore_rest = true;
        self
    }

    /// Bounding rectangle of this element, if it has one.
    #[must_use]
    pub fn rectangle(&self) -> Option<Rect> {
        match &self.kind {
            ElementKind::Texture(sprite) => Some(sprite_bounds(&sprite.quad)),
            ElementKind::Rectangle(sprite) => Some(sprite.rect),
            ElementKind::Line(line) => line.bounds(),
            ElementKind::Circle(circle) => Some(circle.circle.bounds()),
            ElementKind::Custom(custom) => custom.bounds,
        }
    }

    /// Replays this element onto a canvas.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        match &self.kind {
            ElementKind::Texture(sprite) => canvas.draw_texture(sprite),
            ElementKind::Rectangle(sprite) => canvas.draw_rectangle(sprite),
            ElementKind::Line(line) => canvas.draw_line(line),
            ElementKind::Circle(circle) => canvas.draw_circle(circle),
            ElementKind::Custom(custom) => (custom.paint)(canvas),
        }
    }
}

impl From<TextureSprite> for DrawElement {
    fn from(sprite: TextureSprite) -> Self {
        Self::new(ElementKind::Texture(sprite))
    }
}

impl From<RectangleSprite> for DrawElement {
    fn from(sprite: RectangleSprite) -> Self {
        Self::new(ElementKind::Rectangle(sprite))
    }
}

impl From<LineSprite> for DrawElement {
    fn from(line: LineSprite) -> Self {
        Self::new(ElementKind::Line(line))
    }
}

impl From<CircleSprite> for DrawElement {
    fn from(circle: CircleSprite) -> Self {
        Self::new(ElementKind::Circle(circle))
    }
}

impl From<CustomDraw> for DrawElement {
    fn from(custom: CustomDraw) -> Self {
        let depth = custom.depth;
        Self {
            kind: ElementKind::Custom(custom),
            depth,
            ignore_rest: false,
        }
    }
}

/// An ordered list of draw elements.
#[derive(Debug, Clone, Default)]
pub struct Drawable {
    /// Elements in draw order.
    pub elements: Vec<DrawElement>,
}

impl Drawable {
    /// An empty drawable.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    /// A one-element drawable.
    #[must_use]
    pub fn single(element: impl Into<DrawElement>) -> Self {
        Self {
            elements: vec![element.into()],
        }
    }

    /// Appends an element.
    pub fn push(&mut self, element: impl Into<DrawElement>) {
        self.elements.push(element.into());
    }

    /// Appends every element of `other`.
    pub fn append(&mut self, other: Drawable) {
        self.elements.extend(other.elements);
    }

    /// True if there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Iterates elements in draw order.
    pub fn iter(&self) -> std::slice::Iter<'_, DrawElement> {
        self.elements.iter()
    }

    /// Cover of the element rectangles, honouring `ignore_rest`.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        cover_until(self.elements.iter().map(|e| (e.rectangle(), e.ignore_rest)))
    }

    /// Replays every element onto a canvas, in order.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        for element in &self.elements {
            element.draw(canvas);
        }
    }
}

impl From<DrawElement> for Drawable {
    fn from(element: DrawElement) -> Self {
        Self::single(element)
    }
}

impl FromIterator<DrawElement> for Drawable {
    fn from_iter<I: IntoIterator<Item = DrawElement>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Drawable {
    type Item = &'a DrawElement;
    type IntoIter = std::slice::Iter<'a, DrawElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
