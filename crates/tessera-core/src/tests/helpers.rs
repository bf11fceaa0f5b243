//! Test helpers: fixture handlers, engine setup and observers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use glam::Vec2;
use tessera_geom::Rect;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use crate::config::EngineConfig;
use crate::drawable::{CircleSprite, Color, CustomDraw, Drawable, LineSprite, RectangleSprite, TextureSprite};
use crate::engine::Engine;
use crate::entity::NodeLimits;
use crate::handler::{Capability, Handler, HandlerRegistry, NodeVisibility};
use crate::placement::{PlacementDeclaration, PlacementTemplate};
use crate::resolver::SelectionRects;
use crate::services::{Canvas, LanguageTable, Services, TextureTable};

// =============================================================================
// Engine Setup
// =============================================================================

/// Textures the fixture handlers use.
pub fn fixture_textures() -> TextureTable {
    TextureTable::new()
        .with("objects/spring/00", 16.0, 16.0)
        .with("objects/zipmover/block", 8.0, 8.0)
}

/// Strings the fixture handlers use.
pub fn fixture_language() -> LanguageTable {
    LanguageTable::new()
        .with("entities.spring.placements.name.normal", "Spring")
        .with("entities.spring.placements.description.normal", "Bounces the player upwards")
}

/// An engine with the given handlers and the fixture collaborators.
pub fn engine_with(handlers: impl IntoIterator<Item = Handler>) -> Engine {
    let mut registry = HandlerRegistry::new();
    for handler in handlers {
        registry.register(handler);
    }
    Engine::with_parts(
        registry,
        Services::new(fixture_textures(), fixture_language()),
        EngineConfig::default(),
    )
}

/// An engine with every well-behaved fixture handler.
pub fn fixture_engine() -> Engine {
    engine_with([spring_handler(), zip_mover_handler(), block_handler(), track_handler()])
}

// =============================================================================
// Fixture Handlers
// =============================================================================

/// A textured point entity.
pub fn spring_handler() -> Handler {
    Handler::new("spring")
        .with_texture("objects/spring/00")
        .with_depth(-8501)
        .with_placements(PlacementDeclaration::single(PlacementTemplate::new("normal")))
}

/// A sized entity with exactly one node.
pub fn zip_mover_handler() -> Handler {
    Handler::new("zipMover")
        .with_texture("objects/zipmover/block")
        .with_depth(-9999)
        .with_node_limits(NodeLimits::new(1, Some(1)))
        .with_placements(PlacementDeclaration::single(PlacementTemplate::new("default").with_field("width", 16.0)))
}

/// A plain resizable rectangle.
pub fn block_handler() -> Handler {
    let mut handler = Handler::new("block").with_depth(-10000);
    handler.maximum_size = Some(Vec2::splat(100.0).into());
    handler
}

/// A point entity with any number of always-visible nodes.
pub fn track_handler() -> Handler {
    Handler::new("track")
        .with_node_limits(NodeLimits::UNBOUNDED)
        .with_node_visibility(NodeVisibility::Always)
        .with_sprite(Capability::<Drawable>::derived(|cx| {
            Ok(Drawable::single(RectangleSprite::filled(
                Rect::centered(cx.entity.position(), 4.0),
                Color::WHITE,
            )))
        }))
}

/// A handler whose `sprite` always returns an error.
pub fn failing_sprite_handler(name: &str) -> Handler {
    Handler::new(name).with_sprite(Capability::<Drawable>::derived(|_| anyhow::bail!("sprite atlas not loaded")))
}

/// A handler whose `draw` always panics.
pub fn panicking_draw_handler(name: &str) -> Handler {
    Handler::new(name).with_draw(Capability::<CustomDraw>::derived(|_| panic!("draw callback bug")))
}

/// A handler whose `selection` always returns an error.
pub fn failing_selection_handler(name: &str) -> Handler {
    Handler::new(name)
        .with_rectangle(Rect::new(0.0, 0.0, 8.0, 8.0))
        .with_selection(Capability::<SelectionRects>::derived(|_| anyhow::bail!("selection unavailable")))
}

// =============================================================================
// Observers
// =============================================================================

/// Canvas that records what was drawn.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    /// Texture names, in draw order.
    pub textures: Vec<String>,
    /// Rectangles drawn.
    pub rectangles: Vec<Rect>,
    /// Lines drawn.
    pub lines: usize,
    /// Circles drawn.
    pub circles: usize,
}

impl Canvas for RecordingCanvas {
    fn draw_texture(&mut self, sprite: &TextureSprite) {
        self.textures.push(sprite.texture.clone());
    }

    fn draw_rectangle(&mut self, sprite: &RectangleSprite) {
        self.rectangles.push(sprite.rect);
    }

    fn draw_line(&mut self, _line: &LineSprite) {
        self.lines += 1;
    }

    fn draw_circle(&mut self, _circle: &CircleSprite) {
        self.circles += 1;
    }
}

/// Counts `error` and `warn` events.
#[derive(Debug, Clone, Default)]
pub struct EventCounts {
    errors: Arc<AtomicUsize>,
    warnings: Arc<AtomicUsize>,
}

impl EventCounts {
    /// Error events seen.
    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }

    /// Warning events seen.
    pub fn warnings(&self) -> usize {
        self.warnings.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for EventCounts {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        match *event.metadata().level() {
            Level::ERROR => {
                self.errors.fetch_add(1, Ordering::SeqCst);
            }
            Level::WARN => {
                self.warnings.fetch_add(1, Ordering::SeqCst);
            }
            _ => {}
        }
    }
}

/// Runs `f` with a subscriber that counts events, returning the counts.
pub fn count_events(f: impl FnOnce()) -> EventCounts {
    let counts = EventCounts::default();
    let subscriber = tracing_subscriber::registry().with(counts.clone());
    tracing::subscriber::with_default(subscriber, f);
    counts
}
