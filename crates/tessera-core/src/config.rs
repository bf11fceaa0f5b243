//! Engine configuration.
//!
//! Every value has a default, so a config file only needs to name what it
//! changes:
//!
//! ```
//! use tessera_core::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "node_offset": 16.0 }"#).unwrap();
//! assert_eq!(config.node_offset, 16.0);
//! assert_eq!(config.minimum_size, glam::Vec2::new(8.0, 8.0));
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::drawable::Color;
use crate::error::ConfigError;

/// Tunable defaults used by the resolvers and mutation operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Depth used when a handler declares none.
    pub default_depth: i32,
    /// Horizontal gap between an anchor and a newly added node.
    pub node_offset: f32,
    /// Smallest size a resize may produce.
    pub minimum_size: Vec2,
    /// Largest size a resize may produce; `None` is unbounded.
    pub maximum_size: Option<Vec2>,
    /// Size used for the missing axis of an entity that has only one of
    /// width or height.
    pub default_rectangle_size: f32,
    /// Side of the square selection marker for point entities.
    pub point_marker_size: f32,
    /// Fill colour of implicit rectangles.
    pub fill_color: Color,
    /// Border colour of implicit rectangles.
    pub border_color: Color,
    /// Colour of node connection lines.
    pub node_line_color: Color,
    /// Colour of the unknown-entity placeholder.
    pub missing_color: Color,
    /// Colour of the broken-entity placeholder.
    pub erroring_color: Color,
    /// Texture drawn in place of textures that cannot be found.
    pub missing_texture: String,
    /// Size assumed for the missing-texture sprite.
    pub missing_texture_size: Vec2,
    /// Sprite justification when a handler declares none.
    pub default_justification: Vec2,
    /// How many distinct handler faults are remembered for deduplication.
    pub fault_report_capacity: usize,
    /// Property panel order when a handler declares none.
    pub field_order: Vec<String>,
    /// Fields hidden from the property panel when a handler declares none.
    pub ignored_fields: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_depth: 0,
            node_offset: 8.0,
            minimum_size: Vec2::splat(8.0),
            maximum_size: None,
            default_rectangle_size: 8.0,
            point_marker_size: 8.0,
            fill_color: Color::rgba(0.7, 0.7, 0.7, 0.8),
            border_color: Color::rgba(0.9, 0.9, 0.9, 1.0),
            node_line_color: Color::rgba(1.0, 1.0, 1.0, 0.6),
            missing_color: Color::rgba(0.8, 0.2, 0.8, 0.8),
            erroring_color: Color::rgba(1.0, 0.1, 0.1, 0.8),
            missing_texture: "@internal@/missing_image".to_string(),
            missing_texture_size: Vec2::splat(8.0),
            default_justification: Vec2::splat(0.5),
            fault_report_capacity: 1024,
            field_order: ["x", "y", "width", "height"].map(String::from).to_vec(),
            ignored_fields: ["_name", "_id", "originX", "originY"].map(String::from).to_vec(),
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from JSON, filling unspecified fields with
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::InvalidValue`] when a value fails [`Self::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse but make no sense.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fault_report_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fault_report_capacity",
                reason: "must be at least 1".to_string(),
            });
        }

        if self.minimum_size.min_element() < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "minimum_size",
                reason: format!("{:?} has a negative axis", self.minimum_size),
            });
        }

        if let Some(max) = self.maximum_size {
            if max.x < self.minimum_size.x || max.y < self.minimum_size.y {
                return Err(ConfigError::InvalidValue {
                    field: "maximum_size",
                    reason: format!("{max:?} is below minimum_size {:?}", self.minimum_size),
                });
            }
        }

        Ok(())
    }
}
