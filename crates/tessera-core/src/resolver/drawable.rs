//! Entity and node drawables.
//!
//! Capabilities are tried in order, first hit wins:
//!
//! 1. `sprite`: a ready drawable; an empty one falls through
//! 2. `texture`: one sprite with the justification/scale/offset/rotation/color
//!    overlay applied; unknown textures draw the missing-texture sprite
//! 3. `draw`: a custom callback, depth taken from the callback
//! 4. `rectangle`, or the entity's own width/height: a filled rectangle, or a
//!    bordered one when both `fill_color` and `border_color` are given
//!
//! Nodes use the `node_*` variants. When none of them produces anything, the
//! node borrows the entity's drawable, drawn at the node position.

use glam::Vec2;
use tessera_geom::Rect;

use super::{implicit_rectangle, ResolveContext};
use crate::drawable::{Color, CustomDraw, Drawable, RectangleSprite, TextureSprite};
use crate::error::HandlerFault;
use crate::handler::{resolve_opt, Capability, CapabilityContext, Handler};
use crate::handlers;

/// A drawable with the depth it is drawn at.
#[derive(Debug, Clone, Default)]
pub struct ResolvedDrawable {
    /// What to draw.
    pub drawable: Drawable,
    /// Draw depth; higher is further back.
    pub depth: i32,
}

/// A node drawable with the depth it is drawn at.
#[derive(Debug, Clone, Default)]
pub struct ResolvedNodeDrawable {
    /// What to draw.
    pub drawable: Drawable,
    /// Draw depth.
    pub depth: i32,
    /// True when the node borrowed the entity's drawable.
    pub used_entity_fallback: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scope {
    Entity,
    Node,
}

/// The capabilities one scope draws with. Node overlay fields fall back to
/// the entity ones.
struct DrawCapabilities<'h> {
    scope: Scope,
    sprite: Option<&'h Capability<Drawable>>,
    texture: Option<&'h Capability<String>>,
    draw: Option<&'h Capability<CustomDraw>>,
    rectangle: Option<&'h Capability<Rect>>,
    depth: Option<&'h Capability<i32>>,
    justification: Option<&'h Capability<Vec2>>,
    scale: Option<&'h Capability<Vec2>>,
    offset: Option<&'h Capability<Vec2>>,
    rotation: Option<&'h Capability<f32>>,
    color: Option<&'h Capability<Color>>,
    fill_color: Option<&'h Capability<Color>>,
    border_color: Option<&'h Capability<Color>>,
}

impl<'h> DrawCapabilities<'h> {
    fn entity(handler: &'h Handler) -> Self {
        Self {
            scope: Scope::Entity,
            sprite: handler.sprite.as_ref(),
            texture: handler.texture.as_ref(),
            draw: handler.draw.as_ref(),
            rectangle: handler.rectangle.as_ref(),
            depth: handler.depth.as_ref(),
            justification: handler.justification.as_ref(),
            scale: handler.scale.as_ref(),
            offset: handler.offset.as_ref(),
            rotation: handler.rotation.as_ref(),
            color: handler.color.as_ref(),
            fill_color: handler.fill_color.as_ref(),
            border_color: handler.border_color.as_ref(),
        }
    }

    fn node(handler: &'h Handler) -> Self {
        Self {
            scope: Scope::Node,
            sprite: handler.node_sprite.as_ref(),
            texture: handler.node_texture.as_ref(),
            draw: handler.node_draw.as_ref(),
            rectangle: handler.node_rectangle.as_ref(),
            depth: handler.node_depth.as_ref().or(handler.depth.as_ref()),
            justification: handler.node_justification.as_ref().or(handler.justification.as_ref()),
            scale: handler.node_scale.as_ref().or(handler.scale.as_ref()),
            offset: handler.node_offset.as_ref().or(handler.offset.as_ref()),
            rotation: handler.node_rotation.as_ref().or(handler.rotation.as_ref()),
            color: handler.node_color.as_ref().or(handler.color.as_ref()),
            fill_color: handler.node_fill_color.as_ref().or(handler.fill_color.as_ref()),
            border_color: handler.node_border_color.as_ref().or(handler.border_color.as_ref()),
        }
    }

    fn name(&self, entity: &'static str, node: &'static str) -> &'static str {
        match self.scope {
            Scope::Entity => entity,
            Scope::Node => node,
        }
    }
}

/// Resolves the entity drawable.
pub(crate) fn entity_drawable(
    rc: &ResolveContext<'_>,
    handler: &Handler,
    cx: &CapabilityContext<'_>,
) -> Result<ResolvedDrawable, HandlerFault> {
    if let Some(kind) = handler.placeholder_kind() {
        return Ok(handlers::drawable(kind, cx.entity, rc.config));
    }

    let (resolved, _) = resolve_scoped(rc, &DrawCapabilities::entity(handler), cx)?;
    Ok(resolved)
}

/// Resolves the drawable of the node in `cx.node`.
///
/// Without a node in the context this is the entity drawable.
pub(crate) fn node_drawable(
    rc: &ResolveContext<'_>,
    handler: &Handler,
    cx: &CapabilityContext<'_>,
) -> Result<ResolvedNodeDrawable, HandlerFault> {
    let Some((node, _)) = cx.node else {
        let resolved = entity_drawable(rc, handler, cx)?;
        return Ok(ResolvedNodeDrawable {
            drawable: resolved.drawable,
            depth: resolved.depth,
            used_entity_fallback: true,
        });
    };

    if let Some(kind) = handler.placeholder_kind() {
        return Ok(handlers::node_drawable(kind, cx.entity, node, rc.config));
    }

    let (resolved, matched) = resolve_scoped(rc, &DrawCapabilities::node(handler), cx)?;
    if matched {
        return Ok(ResolvedNodeDrawable {
            drawable: resolved.drawable,
            depth: resolved.depth,
            used_entity_fallback: false,
        });
    }

    let moved = cx.entity.at_node(node);
    let entity_cx = CapabilityContext::new(cx.room, &moved).with_viewport(cx.viewport);
    let resolved = entity_drawable(rc, handler, &entity_cx)?;

    Ok(ResolvedNodeDrawable {
        drawable: resolved.drawable,
        depth: resolved.depth,
        used_entity_fallback: true,
    })
}

/// Walks the priority list for one scope. The flag is false when nothing
/// matched and the drawable is empty.
fn resolve_scoped(
    rc: &ResolveContext<'_>,
    caps: &DrawCapabilities<'_>,
    cx: &CapabilityContext<'_>,
) -> Result<(ResolvedDrawable, bool), HandlerFault> {
    let depth = resolve_opt(caps.depth, cx, caps.name("depth", "nodeDepth"))?.unwrap_or(rc.config.default_depth);
    let found = |drawable: Drawable, depth: i32| Ok((ResolvedDrawable { drawable, depth }, true));

    if let Some(drawable) = resolve_opt(caps.sprite, cx, caps.name("sprite", "nodeSprite"))? {
        if !drawable.is_empty() {
            return found(drawable, depth);
        }
    }

    if let Some(texture) = resolve_opt(caps.texture, cx, caps.name("texture", "nodeTexture"))? {
        let sprite = texture_sprite(rc, caps, cx, &texture)?;
        return found(Drawable::single(sprite), depth);
    }

    if let Some(custom) = resolve_opt(caps.draw, cx, caps.name("draw", "nodeDraw"))? {
        let depth = custom.depth.unwrap_or(depth);
        return found(Drawable::single(custom), depth);
    }

    let rectangle = match resolve_opt(caps.rectangle, cx, caps.name("rectangle", "nodeRectangle"))? {
        Some(rect) => Some(rect),
        None if caps.scope == Scope::Entity => implicit_rectangle(cx.entity, rc.config),
        None => None,
    };
    if let Some(rect) = rectangle {
        let sprite = rectangle_sprite(rc, caps, cx, rect)?;
        return found(Drawable::single(sprite), depth);
    }

    Ok((
        ResolvedDrawable {
            drawable: Drawable::new(),
            depth,
        },
        false,
    ))
}

fn texture_sprite(
    rc: &ResolveContext<'_>,
    caps: &DrawCapabilities<'_>,
    cx: &CapabilityContext<'_>,
    name: &str,
) -> Result<TextureSprite, HandlerFault> {
    let (texture, size) = match rc.services.textures.texture(name) {
        Some(info) => (name.to_string(), info.size()),
        None => {
            rc.warn_missing_texture(name, &cx.entity.entity_type);
            (rc.config.missing_texture.clone(), rc.config.missing_texture_size)
        }
    };

    let position = cx
        .node
        .map_or_else(|| cx.entity.position(), |(node, _)| node.position());
    let mut sprite = TextureSprite::new(texture, position, size);

    sprite.quad.justification = resolve_opt(caps.justification, cx, caps.name("justification", "nodeJustification"))?
        .unwrap_or(rc.config.default_justification);
    sprite.quad.scale = resolve_opt(caps.scale, cx, caps.name("scale", "nodeScale"))?.unwrap_or(Vec2::ONE);
    sprite.quad.offset = resolve_opt(caps.offset, cx, caps.name("offset", "nodeOffset"))?.unwrap_or(Vec2::ZERO);
    sprite.quad.rotation = resolve_opt(caps.rotation, cx, caps.name("rotation", "nodeRotation"))?.unwrap_or(0.0);
    sprite.color = resolve_opt(caps.color, cx, caps.name("color", "nodeColor"))?.unwrap_or(Color::WHITE);

    Ok(sprite)
}

fn rectangle_sprite(
    rc: &ResolveContext<'_>,
    caps: &DrawCapabilities<'_>,
    cx: &CapabilityContext<'_>,
    rect: Rect,
) -> Result<RectangleSprite, HandlerFault> {
    let fill = resolve_opt(caps.fill_color, cx, caps.name("fillColor", "nodeFillColor"))?;
    let border = resolve_opt(caps.border_color, cx, caps.name("borderColor", "nodeBorderColor"))?;

    if let (Some(fill), Some(border)) = (fill, border) {
        return Ok(RectangleSprite::bordered(rect, fill, border));
    }

    let color = resolve_opt(caps.color, cx, caps.name("color", "nodeColor"))?.unwrap_or(rc.config.fill_color);
    Ok(RectangleSprite::filled(rect, color))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    use crate::config::EngineConfig;
    use crate::drawable::{ElementKind, RectangleMode};
    use crate::entity::EntityInstance;
    use crate::room::Room;
    use crate::services::{LanguageTable, Services, TextureTable};

    struct Fixture {
        config: EngineConfig,
        services: Services,
        seen: RefCell<HashSet<String>>,
        room: Room,
    }

    impl Fixture {
        fn new() -> Self {
            let textures = TextureTable::new().with("objects/spring", 16.0, 8.0);
            Self {
                config: EngineConfig::default(),
                services: Services::new(textures, LanguageTable::new()),
                seen: RefCell::new(HashSet::new()),
                room: Room::new("test"),
            }
        }

        fn rc(&self) -> ResolveContext<'_> {
            ResolveContext {
                config: &self.config,
                services: &self.services,
                missing_textures: &self.seen,
            }
        }
    }

    fn point(x: f32, y: f32) -> EntityInstance {
        EntityInstance::new("thing", Vec2::new(x, y))
    }

    mod entity_tests {
        use super::*;

        #[test]
        fn empty_sprite_falls_through_to_texture() {
            let fx = Fixture::new();
            let handler = Handler::new("thing")
                .with_sprite(Drawable::new())
                .with_texture("objects/spring")
                .with_depth(-10);
            let entity = point(32.0, 32.0);
            let cx = CapabilityContext::new(&fx.room, &entity);

            let resolved = entity_drawable(&fx.rc(), &handler, &cx).unwrap();
            assert_eq!(resolved.depth, -10);
            assert_eq!(resolved.drawable.bounds(), Some(Rect::new(24.0, 28.0, 16.0, 8.0)));
        }

        #[test]
        fn texture_overlay_applies() {
            let fx = Fixture::new();
            let mut handler = Handler::new("thing").with_texture("objects/spring");
            handler.justification = Some(Vec2::new(0.5, 1.0).into());
            handler.color = Some(Color::BLACK.into());
            let entity = point(32.0, 32.0);
            let cx = CapabilityContext::new(&fx.room, &entity);

            let resolved = entity_drawable(&fx.rc(), &handler, &cx).unwrap();
            let ElementKind::Texture(sprite) = &resolved.drawable.elements[0].kind else {
                panic!("expected a texture sprite");
            };
            assert_eq!(sprite.color, Color::BLACK);
            assert_eq!(resolved.drawable.bounds(), Some(Rect::new(24.0, 24.0, 16.0, 8.0)));
        }

        #[test]
        fn unknown_texture_uses_missing_sprite_and_warns_once() {
            let fx = Fixture::new();
            let handler = Handler::new("thing").with_texture("objects/gone");
            let entity = point(0.0, 0.0);
            let cx = CapabilityContext::new(&fx.room, &entity);

            for _ in 0..3 {
                let resolved = entity_drawable(&fx.rc(), &handler, &cx).unwrap();
                let ElementKind::Texture(sprite) = &resolved.drawable.elements[0].kind else {
                    panic!("expected a texture sprite");
                };
                assert_eq!(sprite.texture, fx.config.missing_texture);
            }
            assert_eq!(fx.seen.borrow().len(), 1);
        }

        #[test]
        fn draw_callback_sets_depth() {
            let fx = Fixture::new();
            let handler = Handler::new("thing").with_draw(CustomDraw::new(|_| {}).with_depth(5000));
            let entity = point(0.0, 0.0);
            let cx = CapabilityContext::new(&fx.room, &entity);

            let resolved = entity_drawable(&fx.rc(), &handler, &cx).unwrap();
            assert_eq!(resolved.depth, 5000);
            assert_eq!(resolved.drawable.len(), 1);
        }

        #[test]
        fn implicit_rectangle_is_filled_with_default() {
            let fx = Fixture::new();
            let handler = Handler::new("thing");
            let entity = point(0.0, 0.0).with_size(16.0, 24.0);
            let cx = CapabilityContext::new(&fx.room, &entity);

            let resolved = entity_drawable(&fx.rc(), &handler, &cx).unwrap();
            let ElementKind::Rectangle(sprite) = &resolved.drawable.elements[0].kind else {
                panic!("expected a rectangle");
            };
            assert_eq!(sprite.rect, Rect::new(0.0, 0.0, 16.0, 24.0));
            assert_eq!(sprite.mode, RectangleMode::Fill(fx.config.fill_color));
        }

        #[test]
        fn fill_and_border_make_bordered_rectangle() {
            let fx = Fixture::new();
            let mut handler = Handler::new("thing").with_rectangle(Rect::new(1.0, 2.0, 3.0, 4.0));
            handler.fill_color = Some(Color::BLACK.into());
            handler.border_color = Some(Color::WHITE.into());
            let entity = point(0.0, 0.0);
            let cx = CapabilityContext::new(&fx.room, &entity);

            let resolved = entity_drawable(&fx.rc(), &handler, &cx).unwrap();
            let ElementKind::Rectangle(sprite) = &resolved.drawable.elements[0].kind else {
                panic!("expected a rectangle");
            };
            assert_eq!(
                sprite.mode,
                RectangleMode::Bordered {
                    fill: Color::BLACK,
                    border: Color::WHITE
                }
            );
        }

        #[test]
        fn nothing_matches_gives_empty_drawable() {
            let fx = Fixture::new();
            let handler = Handler::new("thing");
            let entity = point(0.0, 0.0);
            let cx = CapabilityContext::new(&fx.room, &entity);

            let resolved = entity_drawable(&fx.rc(), &handler, &cx).unwrap();
            assert!(resolved.drawable.is_empty());
            assert_eq!(resolved.depth, fx.config.default_depth);
        }

        #[test]
        fn failing_capability_is_a_named_fault() {
            let fx = Fixture::new();
            let mut handler = Handler::new("thing");
            handler.sprite = Some(Capability::derived(|_| anyhow::bail!("atlas not loaded")));
            let entity = point(0.0, 0.0);
            let cx = CapabilityContext::new(&fx.room, &entity);

            let err = entity_drawable(&fx.rc(), &handler, &cx).unwrap_err();
            assert!(matches!(err, HandlerFault::Capability { capability: "sprite", .. }));
        }
    }

    mod node_tests {
        use super::*;

        #[test]
        fn node_texture_is_drawn_at_node() {
            let fx = Fixture::new();
            let mut handler = Handler::new("thing");
            handler.node_texture = Some(Capability::Value("objects/spring".to_string()));
            let entity = point(0.0, 0.0).with_nodes([Vec2::new(64.0, 0.0)]);
            let node = entity.node(1).copied().unwrap();
            let cx = CapabilityContext::new(&fx.room, &entity).with_node(&node, 1);

            let resolved = node_drawable(&fx.rc(), &handler, &cx).unwrap();
            assert!(!resolved.used_entity_fallback);
            assert_eq!(resolved.drawable.bounds(), Some(Rect::new(56.0, -4.0, 16.0, 8.0)));
        }

        #[test]
        fn node_overlay_falls_back_to_entity_overlay() {
            let fx = Fixture::new();
            let mut handler = Handler::new("thing").with_depth(42);
            handler.node_texture = Some(Capability::Value("objects/spring".to_string()));
            handler.justification = Some(Vec2::ZERO.into());
            let entity = point(0.0, 0.0).with_nodes([Vec2::new(64.0, 0.0)]);
            let node = entity.node(1).copied().unwrap();
            let cx = CapabilityContext::new(&fx.room, &entity).with_node(&node, 1);

            let resolved = node_drawable(&fx.rc(), &handler, &cx).unwrap();
            assert_eq!(resolved.depth, 42);
            assert_eq!(resolved.drawable.bounds(), Some(Rect::new(64.0, 0.0, 16.0, 8.0)));
        }

        #[test]
        fn node_without_capabilities_borrows_entity_drawable() {
            let fx = Fixture::new();
            let handler = Handler::new("thing");
            let entity = point(0.0, 0.0)
                .with_size(16.0, 16.0)
                .with_nodes([Vec2::new(40.0, 8.0)]);
            let node = entity.node(1).copied().unwrap();
            let cx = CapabilityContext::new(&fx.room, &entity).with_node(&node, 1);

            let resolved = node_drawable(&fx.rc(), &handler, &cx).unwrap();
            assert!(resolved.used_entity_fallback);
            assert_eq!(resolved.drawable.bounds(), Some(Rect::new(40.0, 8.0, 16.0, 16.0)));
        }
    }
}
