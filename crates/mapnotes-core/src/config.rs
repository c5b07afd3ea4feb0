//! Environment-driven layer settings.

use std::env;

use crate::defaults;
use crate::traits::LayerSettings;

/// Layer settings resolved from the environment.
///
/// Stands in for the external settings store where none is wired up.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerConfig {
    pub offline_editing: bool,
    pub show_closed: bool,
    pub min_zoom: i32,
    pub text_scale: f32,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            offline_editing: false,
            show_closed: false,
            min_zoom: defaults::MIN_ZOOM,
            text_scale: defaults::TEXT_SCALE,
        }
    }
}

impl LayerConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `MAPNOTES_OFFLINE` | `false` | Send all commits to the local store |
    /// | `MAPNOTES_SHOW_CLOSED` | `false` | Draw closed notes |
    /// | `MAPNOTES_MIN_ZOOM` | `8` | Minimum zoom for the layer |
    /// | `MAPNOTES_TEXT_SCALE` | `1.0` | Icon/touch scale factor |
    pub fn from_env() -> Self {
        let offline_editing = env_flag("MAPNOTES_OFFLINE").unwrap_or(false);
        let show_closed = env_flag("MAPNOTES_SHOW_CLOSED").unwrap_or(false);

        let min_zoom = env::var("MAPNOTES_MIN_ZOOM")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(defaults::MIN_ZOOM);

        let text_scale = env::var("MAPNOTES_TEXT_SCALE")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .filter(|s| *s > 0.0)
            .unwrap_or(defaults::TEXT_SCALE);

        Self {
            offline_editing,
            show_closed,
            min_zoom,
            text_scale,
        }
    }

    pub fn with_offline_editing(mut self, offline: bool) -> Self {
        self.offline_editing = offline;
        self
    }

    pub fn with_show_closed(mut self, show: bool) -> Self {
        self.show_closed = show;
        self
    }

    pub fn with_min_zoom(mut self, zoom: i32) -> Self {
        self.min_zoom = zoom;
        self
    }
}

impl LayerSettings for LayerConfig {
    fn offline_editing(&self) -> bool {
        self.offline_editing
    }

    fn show_closed_notes(&self) -> bool {
        self.show_closed
    }

    fn min_zoom(&self) -> i32 {
        self.min_zoom
    }

    fn text_scale(&self) -> f32 {
        self.text_scale
    }
}

/// Parse a boolean flag: "false"/"0" are false, anything else true.
pub fn env_flag(name: &str) -> Option<bool> {
    env::var(name).ok().map(|v| v != "false" && v != "0")
}
