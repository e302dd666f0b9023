//! Tunable parameters of the placement engine.

use crate::page::POINTS_PER_INCH;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Settings that control how fields are created and moved.
///
/// All fields have defaults, so a host only needs to provide the knobs it wants
/// to change when loading the settings from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlacementSettings {
    /// How far (in pixels) the pointer has to travel before a press on a field
    /// turns into a drag. Anything shorter is treated as a click.
    pub drag_threshold: f64,
    /// Width of a newly dropped field, in pixels of the rendered page image.
    pub default_field_width: f64,
    /// Height of a newly dropped field, in pixels of the rendered page image.
    pub default_field_height: f64,
    /// Whether newly dropped fields are clamped into the page.
    ///
    /// When disabled, a field dropped close to a page edge may stick out of the
    /// page until it is moved for the first time.
    pub clamp_on_create: bool,
    /// The `required` flag of newly created fields.
    pub default_required: bool,
    /// The preview DPI assumed when a document does not specify one.
    pub default_dpi: f64,
}

impl PlacementSettings {
    /// Parse settings from JSON. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The default footprint of a new field in viewport pixels.
    pub fn default_field_size(&self) -> Size {
        Size::new(self.default_field_width, self.default_field_height)
    }
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            drag_threshold: 5.0,
            default_field_width: 200.0,
            default_field_height: 30.0,
            clamp_on_create: true,
            default_required: true,
            default_dpi: POINTS_PER_INCH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let settings = PlacementSettings::from_json(r#"{"dragThreshold": 8, "clampOnCreate": false}"#)
            .unwrap();
        assert_eq!(settings.drag_threshold, 8.0);
        assert!(!settings.clamp_on_create);
        assert_eq!(settings.default_field_size(), Size::new(200.0, 30.0));
        assert!(settings.default_required);
    }

    #[test]
    fn empty_object_is_default() {
        let settings = PlacementSettings::from_json("{}").unwrap();
        assert_eq!(settings, PlacementSettings::default());
    }
}
