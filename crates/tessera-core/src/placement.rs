//! Placement templates: the palette entries an entity type offers.
//!
//! A handler declares its templates with a [`PlacementDeclaration`]: one
//! template or a list of them, plus optional default data shared by all of
//! them. The catalog merges each template's data over the defaults and turns
//! the result into a ready-to-place [`Placement`].
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use serde_json::json;
//! use tessera_core::placement::{PlacementDeclaration, PlacementTemplate};
//!
//! let declaration = PlacementDeclaration::list(vec![
//!     PlacementTemplate::new("normal"),
//!     PlacementTemplate::new("wide").with_field("width", 32.0),
//! ])
//! .with_default(json!({ "color": "red" }).as_object().cloned().unwrap_or_default());
//!
//! assert_eq!(declaration.templates().len(), 2);
//! assert_eq!(declaration.first().map(|t| t.name.as_str()), Some("normal"));
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::{EntityId, EntityInstance, NodeLimits};
use crate::room::Layer;

/// Field data of a template, in the flat instance shape.
pub type TemplateData = Map<String, Value>;

/// How the editor places a template: one click, a drag along a line, or a
/// dragged rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementType {
    /// Placed at the cursor.
    #[default]
    Point,
    /// Dragged from the entity to its first node.
    Line,
    /// Dragged out as a rectangle.
    Rectangle,
}

impl PlacementType {
    /// Infers the placement type of template data.
    ///
    /// Data with a width or height is a rectangle; data with nodes, or a type
    /// that takes exactly one node, is a line; anything else is a point.
    ///
    /// ```
    /// use serde_json::json;
    /// use tessera_core::entity::NodeLimits;
    /// use tessera_core::placement::PlacementType;
    ///
    /// let data = json!({ "width": 10 }).as_object().cloned().unwrap_or_default();
    /// assert_eq!(PlacementType::infer(&data, NodeLimits::NONE), PlacementType::Rectangle);
    /// ```
    #[must_use]
    pub fn infer(data: &TemplateData, limits: NodeLimits) -> Self {
        Self::from_shape(
            data.contains_key("width") || data.contains_key("height"),
            data.contains_key("nodes"),
            limits,
        )
    }

    /// Infers the placement type of an existing instance.
    #[must_use]
    pub fn infer_for_instance(entity: &EntityInstance, limits: NodeLimits) -> Self {
        Self::from_shape(entity.is_sized(), entity.nodes.is_some(), limits)
    }

    fn from_shape(sized: bool, has_nodes: bool, limits: NodeLimits) -> Self {
        if sized {
            Self::Rectangle
        } else if has_nodes || limits.is_single_node() {
            Self::Line
        } else {
            Self::Point
        }
    }
}

/// One named template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementTemplate {
    /// Placement name, also the localization key.
    pub name: String,
    /// Fields of the placed instance.
    #[serde(default)]
    pub data: TemplateData,
    /// Explicit placement type; inferred from `data` when absent.
    #[serde(default, rename = "placementType", skip_serializing_if = "Option::is_none")]
    pub placement_type: Option<PlacementType>,
}

impl PlacementTemplate {
    /// A template with no data.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder: set one field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    /// Builder: replace all data.
    #[must_use]
    pub fn with_data(mut self, data: TemplateData) -> Self {
        self.data = data;
        self
    }

    /// Builder: set the placement type explicitly.
    #[must_use]
    pub fn with_placement_type(mut self, placement_type: PlacementType) -> Self {
        self.placement_type = Some(placement_type);
        self
    }
}

/// One template, or several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlacementTemplates {
    /// A list of templates, offered in order.
    List(Vec<PlacementTemplate>),
    /// A single template.
    Single(PlacementTemplate),
}

/// The `placements` capability of a handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementDeclaration {
    /// Data every template starts from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<TemplateData>,
    /// Declared templates.
    pub templates: PlacementTemplates,
}

impl PlacementDeclaration {
    /// Declares a single template.
    #[must_use]
    pub fn single(template: PlacementTemplate) -> Self {
        Self {
            default: None,
            templates: PlacementTemplates::Single(template),
        }
    }

    /// Declares a list of templates.
    #[must_use]
    pub fn list(templates: Vec<PlacementTemplate>) -> Self {
        Self {
            default: None,
            templates: PlacementTemplates::List(templates),
        }
    }

    /// Builder: set the shared default data.
    #[must_use]
    pub fn with_default(mut self, default: TemplateData) -> Self {
        self.default = Some(default);
        self
    }

    /// Declared templates, in order.
    #[must_use]
    pub fn templates(&self) -> &[PlacementTemplate] {
        match &self.templates {
            PlacementTemplates::Single(template) => std::slice::from_ref(template),
            PlacementTemplates::List(templates) => templates,
        }
    }

    /// The first declared template.
    #[must_use]
    pub fn first(&self) -> Option<&PlacementTemplate> {
        self.templates().first()
    }

    /// Template data merged over the defaults; template fields win.
    #[must_use]
    pub fn merged_data(&self, template: &PlacementTemplate) -> TemplateData {
        let mut data = self.default.clone().unwrap_or_default();
        data.extend(template.data.clone());
        data
    }
}

impl From<PlacementTemplate> for PlacementDeclaration {
    fn from(template: PlacementTemplate) -> Self {
        Self::single(template)
    }
}

impl From<Vec<PlacementTemplate>> for PlacementDeclaration {
    fn from(templates: Vec<PlacementTemplate>) -> Self {
        Self::list(templates)
    }
}

/// A palette entry, ready to be placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// Placement name.
    pub name: String,
    /// Localized name shown in the palette.
    pub display_name: String,
    /// Localized description, if any.
    pub tooltip_text: Option<String>,
    /// Layer the placed instance goes on.
    pub layer: Layer,
    /// How the instance is placed.
    pub placement_type: PlacementType,
    /// Instance every placement copies.
    pub item_template: EntityInstance,
}

impl Placement {
    /// A fresh instance at `position`, ready for
    /// [`Room::add`](crate::room::Room::add).
    ///
    /// Nodes keep their offset from the entity.
    ///
    /// ```
    /// use glam::Vec2;
    /// use tessera_core::entity::EntityInstance;
    /// use tessera_core::placement::{Placement, PlacementType};
    /// use tessera_core::room::Layer;
    ///
    /// let placement = Placement {
    ///     name: "default".into(),
    ///     display_name: "Zip Mover".into(),
    ///     tooltip_text: None,
    ///     layer: Layer::Entities,
    ///     placement_type: PlacementType::Line,
    ///     item_template: EntityInstance::new("zipMover", Vec2::ZERO).with_nodes([Vec2::new(16.0, 0.0)]),
    /// };
    ///
    /// let entity = placement.instantiate(Vec2::new(40.0, 8.0));
    /// assert_eq!(entity.position(), Vec2::new(40.0, 8.0));
    /// assert_eq!(entity.node(1).map(|n| n.position()), Some(Vec2::new(56.0, 8.0)));
    /// ```
    #[must_use]
    pub fn instantiate(&self, position: Vec2) -> EntityInstance {
        let mut entity = self.item_template.clone();
        let offset = position - entity.position();

        entity.id = EntityId::UNASSIGNED;
        entity.set_position(position);
        for node in entity.nodes.iter_mut().flatten() {
            node.translate(offset);
        }
        entity
    }
}
