//! Fault isolation tests.
//!
//! Broken or missing handlers must never take the editor down:
//! - Unregistered types draw the missing placeholder without complaint
//! - Failing and panicking capabilities draw the broken-entity placeholder
//! - Each fault is logged once per entity and operation, until the next
//!   session
//! - Healthy entities keep drawing next to broken ones

use glam::Vec2;
use tessera_geom::Rect;

use crate::config::EngineConfig;
use crate::entity::{EntityInstance, Target};
use crate::error::EngineError;
use crate::handler::Handler;
use crate::room::{IdAllocator, Layer, Room};

use super::helpers::{
    count_events, engine_with, failing_selection_handler, failing_sprite_handler, panicking_draw_handler,
    spring_handler, RecordingCanvas,
};

fn room_with(entity_type: &str, position: Vec2) -> (Room, EntityInstance) {
    let mut room = Room::new("broken");
    let id = room.add(Layer::Entities, EntityInstance::new(entity_type, position));
    let entity = room.get(id).cloned().unwrap();
    (room, entity)
}

// =============================================================================
// Placeholders
// =============================================================================

mod placeholder_tests {
    use super::*;

    #[test]
    fn unregistered_type_draws_missing_placeholder_quietly() {
        let mut engine = engine_with([]);
        let (room, entity) = room_with("ghost", Vec2::new(10.0, 10.0));

        let mut drawable = None;
        let mut selection = None;
        let events = count_events(|| {
            drawable = Some(engine.resolve_entity_drawable(&room, &entity, None));
            selection = Some(engine.resolve_selection(&room, &entity, None));
        });

        assert_eq!(drawable.unwrap().drawable.len(), 1);
        assert_eq!(selection.unwrap().entity, Rect::centered(Vec2::new(10.0, 10.0), 8.0));
        assert_eq!(events.errors(), 0);
        assert_eq!(engine.barrier().reported(), 0);
    }

    #[test]
    fn failing_sprite_draws_erroring_placeholder() {
        let mut engine = engine_with([failing_sprite_handler("brokenSprite")]);
        let (room, entity) = room_with("brokenSprite", Vec2::new(32.0, 32.0));

        let resolved = engine.resolve_entity_drawable(&room, &entity, None);

        assert_eq!(resolved.drawable.len(), 3);
        assert_eq!(resolved.drawable.bounds(), Some(Rect::centered(Vec2::new(32.0, 32.0), 8.0)));
        assert_eq!(resolved.depth, EngineConfig::default().default_depth);
    }

    #[test]
    fn panicking_draw_draws_erroring_placeholder() {
        let mut engine = engine_with([panicking_draw_handler("brokenDraw")]);
        let (room, entity) = room_with("brokenDraw", Vec2::ZERO);

        let resolved = engine.resolve_entity_drawable(&room, &entity, None);

        assert_eq!(resolved.drawable.len(), 3);
        assert_eq!(engine.barrier().reported(), 1);
    }

    #[test]
    fn failing_selection_falls_back_to_placeholder_bounds() {
        let mut engine = engine_with([failing_selection_handler("brokenSelection")]);
        let (room, entity) = room_with("brokenSelection", Vec2::new(16.0, 0.0));

        let selection = engine.resolve_selection(&room, &entity, None);
        assert_eq!(selection.entity, Rect::centered(Vec2::new(16.0, 0.0), 8.0));
        assert_eq!(selection.nodes, None);

        // Drawing does not use the selection and is unaffected
        let resolved = engine.resolve_entity_drawable(&room, &entity, None);
        assert_eq!(resolved.drawable.bounds(), Some(Rect::new(0.0, 0.0, 8.0, 8.0)));
    }
}

// =============================================================================
// Reporting
// =============================================================================

mod reporting_tests {
    use super::*;

    #[test]
    fn repeated_fault_is_logged_once() {
        let mut engine = engine_with([failing_sprite_handler("brokenSprite")]);
        let (room, entity) = room_with("brokenSprite", Vec2::ZERO);

        let events = count_events(|| {
            for _ in 0..5 {
                engine.resolve_entity_drawable(&room, &entity, None);
            }
        });

        assert_eq!(events.errors(), 1);
        assert_eq!(engine.barrier().reported(), 1);
    }

    #[test]
    fn new_session_reports_again() {
        let mut engine = engine_with([panicking_draw_handler("brokenDraw")]);
        let (room, entity) = room_with("brokenDraw", Vec2::ZERO);

        let events = count_events(|| {
            engine.resolve_entity_drawable(&room, &entity, None);
            engine.resolve_entity_drawable(&room, &entity, None);
            engine.begin_session();
            engine.resolve_entity_drawable(&room, &entity, None);
        });

        assert_eq!(events.errors(), 2);
    }

    #[test]
    fn each_entity_and_operation_is_reported_separately() {
        let mut engine = engine_with([failing_sprite_handler("brokenSprite")]);
        let mut room = Room::new("broken");
        let first = room.add(Layer::Entities, EntityInstance::new("brokenSprite", Vec2::ZERO));
        let second = room.add(Layer::Entities, EntityInstance::new("brokenSprite", Vec2::new(64.0, 0.0)));
        let first = room.get(first).cloned().unwrap();
        let second = room.get(second).cloned().unwrap();

        let events = count_events(|| {
            engine.resolve_entity_drawable(&room, &first, None);
            engine.resolve_entity_drawable(&room, &second, None);
            // Selection covers the drawable, so it faults under its own key
            engine.resolve_selection(&room, &first, None);
            engine.resolve_selection(&room, &first, None);
        });

        assert_eq!(events.errors(), 3);
    }

    #[test]
    fn same_type_in_two_rooms_is_reported_per_entity() {
        let mut engine = engine_with([failing_sprite_handler("brokenSprite")]);
        let ids = IdAllocator::new();
        let mut upper = Room::new("a-00").with_ids(&ids);
        let mut lower = Room::new("a-01").with_ids(&ids);
        upper.add(Layer::Entities, EntityInstance::new("brokenSprite", Vec2::ZERO));
        lower.add(Layer::Entities, EntityInstance::new("brokenSprite", Vec2::ZERO));

        let events = count_events(|| {
            engine.draw_room(&upper, Layer::Entities, None);
            engine.draw_room(&lower, Layer::Entities, None);
        });

        assert_eq!(events.errors(), 2);
        assert_eq!(engine.barrier().reported(), 2);
    }

    #[test]
    fn missing_texture_warns_once_per_name() {
        let mut engine = engine_with([Handler::new("crate").with_texture("objects/crate/idle")]);
        let mut room = Room::new("storage");
        room.add(Layer::Entities, EntityInstance::new("crate", Vec2::ZERO));
        room.add(Layer::Entities, EntityInstance::new("crate", Vec2::new(32.0, 0.0)));

        let mut canvas = RecordingCanvas::default();
        let events = count_events(|| {
            for _ in 0..3 {
                for item in engine.draw_room(&room, Layer::Entities, None) {
                    item.drawable.draw(&mut canvas);
                }
            }
        });

        assert_eq!(events.warnings(), 1);
        assert_eq!(events.errors(), 0);
        assert_eq!(canvas.textures.len(), 6);
        assert!(canvas.textures.iter().all(|t| *t == EngineConfig::default().missing_texture));
    }
}

// =============================================================================
// Isolation
// =============================================================================

mod isolation_tests {
    use super::*;

    #[test]
    fn healthy_entities_draw_next_to_broken_ones() {
        let mut engine = engine_with([
            spring_handler(),
            failing_sprite_handler("brokenSprite"),
            panicking_draw_handler("brokenDraw"),
        ]);
        let mut room = Room::new("mixed");
        let spring = room.add(Layer::Entities, EntityInstance::new("spring", Vec2::ZERO));
        room.add(Layer::Entities, EntityInstance::new("brokenSprite", Vec2::new(32.0, 0.0)));
        room.add(Layer::Entities, EntityInstance::new("brokenDraw", Vec2::new(64.0, 0.0)));

        let mut items = Vec::new();
        let events = count_events(|| {
            items = engine.draw_room(&room, Layer::Entities, None);
        });

        assert_eq!(items.len(), 3);
        assert_eq!(events.errors(), 2);

        let spring_item = items.iter().find(|item| item.entity == spring).unwrap();
        let mut canvas = RecordingCanvas::default();
        spring_item.drawable.draw(&mut canvas);
        assert_eq!(canvas.textures, vec!["objects/spring/00"]);

        let broken: Vec<usize> = items
            .iter()
            .filter(|item| item.entity != spring)
            .map(|item| item.drawable.len())
            .collect();
        assert_eq!(broken, vec![3, 3]);
    }

    #[test]
    fn failing_notification_does_not_block_the_edit() {
        let handler = Handler::new("noisy").with_on_move(|_, _, _, _| anyhow::bail!("listener crashed"));
        let mut engine = engine_with([handler]);
        let (mut room, entity) = room_with("noisy", Vec2::ZERO);
        let mut item = engine.selections_for_entity(&room, &entity)[0];

        let mut moved = None;
        let events = count_events(|| {
            moved = Some(engine.move_item(&mut room, &mut item, Vec2::new(4.0, 0.0)));
        });

        assert!(moved.unwrap().unwrap());
        assert_eq!(room.get(entity.id).unwrap().position(), Vec2::new(4.0, 0.0));
        assert_eq!(events.warnings(), 1);
        assert_eq!(events.errors(), 0);
    }

    #[test]
    fn failing_override_is_returned_to_the_caller() {
        let handler = Handler::new("stubborn").with_move_override(|_, _, _| anyhow::bail!("cannot move"));
        let mut engine = engine_with([handler]);
        let (mut room, entity) = room_with("stubborn", Vec2::ZERO);
        let mut item = engine.selections_for_entity(&room, &entity)[0];

        let err = engine.move_item(&mut room, &mut item, Vec2::ONE).unwrap_err();

        assert!(matches!(
            err,
            EngineError::HandlerFault { ref entity_type, operation: "move", .. } if entity_type == "stubborn"
        ));
        assert_eq!(room.get(entity.id).unwrap().position(), Vec2::ZERO);
    }

    #[test]
    fn panicking_delete_override_leaves_the_room_intact() {
        let handler = Handler::new("sticky").with_delete_override(|_, _, _| panic!("delete hook bug"));
        let mut engine = engine_with([handler]);
        let (mut room, entity) = room_with("sticky", Vec2::ZERO);

        let result = engine.delete(&mut room, entity.id, Target::Entity);

        assert!(matches!(result, Err(EngineError::HandlerFault { operation: "delete", .. })));
        assert!(room.get(entity.id).is_some());
    }
}
