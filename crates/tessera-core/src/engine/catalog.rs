//! Placement catalog: palette entries for a layer, and placements cloned
//! from existing instances.
//!
//! Display names are looked up in the handler's own language data first
//! (`placements.name.<placement>`), then in the language collaborator
//! (`<layer>.<type>.placements.name.<placement>`). Tooltips use the same
//! keys with `description` instead of `name`. Types contributed by mods get
//! the mod name appended.

use std::sync::Arc;

use glam::Vec2;
use tracing::warn;

use super::Engine;
use crate::entity::{EntityId, EntityInstance, NodeLimits};
use crate::error::{EngineError, HandlerFault};
use crate::fault::Operation;
use crate::handler::{resolve_opt, CapabilityContext, Handler};
use crate::placement::{Placement, PlacementDeclaration, PlacementTemplate, PlacementType};
use crate::room::{Layer, Room};
use crate::services::LanguageLookup;

impl Engine {
    /// Every placement offered on `layer`, by type name then declaration
    /// order. Templates whose data does not form a valid instance are
    /// skipped.
    pub fn list_placements(&mut self, room: &Room, layer: Layer) -> Vec<Placement> {
        let handlers: Vec<Arc<Handler>> = self
            .registry
            .iter()
            .filter(|(_, handler)| handler.layer == layer)
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        let mut placements = Vec::new();
        for handler in handlers {
            let probe = EntityInstance::new(handler.name.clone(), Vec2::ZERO);
            let Some(declaration) = self.read_placements(room, &probe, &handler) else {
                continue;
            };
            let limits = self.node_limits(room, &probe);

            for template in declaration.templates() {
                match self.build_placement(&handler, layer, &declaration, template, limits) {
                    Ok(placement) => placements.push(placement),
                    Err(err) => warn!(entity_type = %handler.name, "skipping placement: {err}"),
                }
            }
        }

        placements
    }

    /// A placement that reproduces `entity`.
    ///
    /// Uses the handler's `cloneItem` when it has one and it succeeds;
    /// otherwise names the placement after the type's first template and
    /// copies the instance as the template.
    pub fn clone_from_instance(&mut self, room: &Room, entity: &EntityInstance) -> Placement {
        let handler = self.registry.lookup(&entity.entity_type);

        if let Some(hook) = &handler.clone_item {
            let cloned = self.barrier.guard(
                &entity.entity_type,
                entity.id,
                Operation::CloneItem,
                || {
                    hook(room, entity)
                        .map(Some)
                        .map_err(|source| HandlerFault::capability("cloneItem", source))
                },
                || None,
            );
            if let Some(placement) = cloned {
                return placement;
            }
        }

        let declaration = self.read_placements(room, entity, &handler);
        let template = declaration.as_ref().and_then(PlacementDeclaration::first);
        let limits = self.node_limits(room, entity);

        let name = template.map_or_else(|| entity.entity_type.clone(), |t| t.name.clone());
        let placement_type = template
            .and_then(|t| t.placement_type)
            .unwrap_or_else(|| PlacementType::infer_for_instance(entity, limits));
        let layer = room.layer_of(entity.id).unwrap_or(handler.layer);
        let (display_name, tooltip_text) = self.localize(&handler, layer, &name);

        let mut item_template = entity.clone();
        item_template.id = EntityId::UNASSIGNED;

        Placement {
            name,
            display_name,
            tooltip_text,
            layer,
            placement_type,
            item_template,
        }
    }

    fn read_placements(
        &mut self,
        room: &Room,
        entity: &EntityInstance,
        handler: &Handler,
    ) -> Option<PlacementDeclaration> {
        let cx = CapabilityContext::new(room, entity);
        self.barrier.guard(
            &entity.entity_type,
            entity.id,
            Operation::Placements,
            || resolve_opt(handler.placements.as_ref(), &cx, "placements"),
            || None,
        )
    }

    fn build_placement(
        &self,
        handler: &Handler,
        layer: Layer,
        declaration: &PlacementDeclaration,
        template: &PlacementTemplate,
        limits: NodeLimits,
    ) -> Result<Placement, EngineError> {
        let data = declaration.merged_data(template);
        let placement_type = template
            .placement_type
            .unwrap_or_else(|| PlacementType::infer(&data, limits));

        let item_template =
            EntityInstance::from_fields(&handler.name, data).map_err(|source| EngineError::InvalidTemplate {
                entity_type: handler.name.clone(),
                placement: template.name.clone(),
                source,
            })?;
        let (display_name, tooltip_text) = self.localize(handler, layer, &template.name);

        Ok(Placement {
            name: template.name.clone(),
            display_name,
            tooltip_text,
            layer,
            placement_type,
            item_template,
        })
    }

    /// Display name and tooltip of one placement.
    fn localize(&self, handler: &Handler, layer: Layer, placement: &str) -> (String, Option<String>) {
        let lookup = |kind: &str| {
            handler
                .language_data
                .as_ref()
                .and_then(|local| local.text(&["placements", kind, placement]))
                .or_else(|| {
                    self.services
                        .language
                        .text(&[layer.key(), handler.name.as_str(), "placements", kind, placement])
                })
        };

        let mut display_name = lookup("name").unwrap_or_else(|| placement.to_string());
        if let Some(mod_name) = self.registry.origin(&handler.name).and_then(|origin| origin.mod_name()) {
            display_name = format!("{display_name} ({mod_name})");
        }

        (display_name, lookup("description"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::config::EngineConfig;
    use crate::handler::{Capability, ContentOrigin, HandlerRegistry};
    use crate::services::{LanguageTable, Services, TextureTable};

    fn engine_with(registry: HandlerRegistry, language: LanguageTable) -> Engine {
        Engine::with_parts(
            registry,
            Services::new(TextureTable::new(), language),
            EngineConfig::default(),
        )
    }

    mod list_tests {
        use super::*;

        #[test]
        fn lists_layer_in_name_order() {
            let mut registry = HandlerRegistry::new();
            registry.register(Handler::new("spring").with_placements(PlacementDeclaration::single(
                PlacementTemplate::new("normal"),
            )));
            registry.register(Handler::new("bumper").with_placements(PlacementDeclaration::list(vec![
                PlacementTemplate::new("a"),
                PlacementTemplate::new("b"),
            ])));
            registry.register(
                Handler::new("changeRespawn")
                    .with_layer(Layer::Triggers)
                    .with_placements(PlacementDeclaration::single(PlacementTemplate::new("default"))),
            );
            let mut engine = engine_with(registry, LanguageTable::new());

            let names: Vec<_> = engine
                .list_placements(&Room::new("r"), Layer::Entities)
                .into_iter()
                .map(|p| (p.item_template.entity_type, p.name))
                .collect();
            assert_eq!(
                names,
                vec![
                    ("bumper".to_string(), "a".to_string()),
                    ("bumper".to_string(), "b".to_string()),
                    ("spring".to_string(), "normal".to_string()),
                ]
            );
        }

        #[test]
        fn merges_defaults_and_infers_type() {
            let mut registry = HandlerRegistry::new();
            registry.register(
                Handler::new("block")
                    .with_placements(
                        PlacementDeclaration::list(vec![
                            PlacementTemplate::new("small"),
                            PlacementTemplate::new("big").with_field("width", 32.0).with_field("height", 32.0),
                        ])
                        .with_default(json!({"tiletype": "3"}).as_object().cloned().unwrap()),
                    ),
            );
            let mut engine = engine_with(registry, LanguageTable::new());

            let placements = engine.list_placements(&Room::new("r"), Layer::Entities);
            assert_eq!(placements[0].placement_type, PlacementType::Point);
            assert_eq!(placements[1].placement_type, PlacementType::Rectangle);
            assert_eq!(placements[1].item_template.width, Some(32.0));
            assert_eq!(placements[1].item_template.fields["tiletype"], "3");
        }

        #[test]
        fn single_node_types_place_as_lines() {
            let mut registry = HandlerRegistry::new();
            registry.register(
                Handler::new("zipMover")
                    .with_node_limits(NodeLimits::new(1, Some(1)))
                    .with_placements(PlacementDeclaration::single(PlacementTemplate::new("default"))),
            );
            let mut engine = engine_with(registry, LanguageTable::new());

            let placements = engine.list_placements(&Room::new("r"), Layer::Entities);
            assert_eq!(placements[0].placement_type, PlacementType::Line);
        }

        #[test]
        fn malformed_template_is_skipped() {
            let mut registry = HandlerRegistry::new();
            registry.register(Handler::new("bad").with_placements(PlacementDeclaration::list(vec![
                PlacementTemplate::new("broken").with_field("x", "left"),
                PlacementTemplate::new("fine"),
            ])));
            let mut engine = engine_with(registry, LanguageTable::new());

            let placements = engine.list_placements(&Room::new("r"), Layer::Entities);
            assert_eq!(placements.len(), 1);
            assert_eq!(placements[0].name, "fine");
        }

        #[test]
        fn failing_declaration_is_skipped() {
            let mut registry = HandlerRegistry::new();
            registry.register(
                Handler::new("flaky")
                    .with_placements(Capability::<PlacementDeclaration>::derived(|_| anyhow::bail!("oops"))),
            );
            let mut engine = engine_with(registry, LanguageTable::new());

            assert!(engine.list_placements(&Room::new("r"), Layer::Entities).is_empty());
            assert_eq!(engine.barrier().reported(), 1);
        }
    }

    mod localization_tests {
        use super::*;

        #[test]
        fn handler_language_data_wins() {
            let mut registry = HandlerRegistry::new();
            registry.register(
                Handler::new("spring")
                    .with_placements(PlacementDeclaration::single(PlacementTemplate::new("normal")))
                    .with_language_data(LanguageTable::new().with("placements.name.normal", "Local Spring")),
            );
            let language = LanguageTable::new()
                .with("entities.spring.placements.name.normal", "Global Spring")
                .with("entities.spring.placements.description.normal", "Bounces");
            let mut engine = engine_with(registry, language);

            let placement = &engine.list_placements(&Room::new("r"), Layer::Entities)[0];
            assert_eq!(placement.display_name, "Local Spring");
            assert_eq!(placement.tooltip_text.as_deref(), Some("Bounces"));
        }

        #[test]
        fn falls_back_to_placement_name_with_mod_suffix() {
            let mut registry = HandlerRegistry::new();
            registry.register_from(
                Handler::new("customSpinner")
                    .with_placements(PlacementDeclaration::single(PlacementTemplate::new("spinner"))),
                ContentOrigin::Mod("Spins".to_string()),
            );
            let mut engine = engine_with(registry, LanguageTable::new());

            let placement = &engine.list_placements(&Room::new("r"), Layer::Entities)[0];
            assert_eq!(placement.display_name, "spinner (Spins)");
            assert_eq!(placement.tooltip_text, None);
        }
    }

    mod clone_tests {
        use super::*;

        #[test]
        fn default_clone_copies_instance() {
            let mut registry = HandlerRegistry::new();
            registry.register(
                Handler::new("block")
                    .with_placements(PlacementDeclaration::single(PlacementTemplate::new("solid"))),
            );
            let mut engine = engine_with(registry, LanguageTable::new());
            let mut room = Room::new("r");
            let id = room.add(
                Layer::Entities,
                EntityInstance::new("block", Vec2::new(8.0, 8.0))
                    .with_size(24.0, 16.0)
                    .with_field("tiletype", "g"),
            );
            let entity = room.get(id).cloned().unwrap();

            let placement = engine.clone_from_instance(&room, &entity);
            assert_eq!(placement.name, "solid");
            assert_eq!(placement.placement_type, PlacementType::Rectangle);
            assert!(placement.item_template.id.is_unassigned());
            assert_eq!(placement.item_template.fields["tiletype"], "g");
        }

        #[test]
        fn clone_hook_wins_and_failure_falls_back() {
            let mut registry = HandlerRegistry::new();
            registry.register(Handler::new("custom").with_clone_item(|_, entity| {
                Ok(Placement {
                    name: "hooked".into(),
                    display_name: "Hooked".into(),
                    tooltip_text: None,
                    layer: Layer::Entities,
                    placement_type: PlacementType::Point,
                    item_template: entity.clone(),
                })
            }));
            registry.register(Handler::new("broken").with_clone_item(|_, _| anyhow::bail!("no clone")));
            let mut engine = engine_with(registry, LanguageTable::new());
            let room = Room::new("r");

            let hooked = engine.clone_from_instance(&room, &EntityInstance::new("custom", Vec2::ZERO));
            assert_eq!(hooked.name, "hooked");

            let fallback = engine.clone_from_instance(&room, &EntityInstance::new("broken", Vec2::ZERO));
            assert_eq!(fallback.name, "broken");
            assert_eq!(engine.barrier().reported(), 1);
        }
    }
}
