//! Viewer configuration.
//!
//! Every knob has a default matching the stock scene. Overrides use the same
//! comma separated `key=value` parameter strings as the renderer factories,
//! e.g. `"fov=45,snap=10,model_path=assets/model/house.bin"`.

use glam::Vec3;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_MODEL_PATH: &str = "assets/model/multimaterial.dae";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },

    #[error("unsupported parameter: {0}")]
    UnsupportedParameter(String),
}

/// Parse a `key=value,key=value` string into a map.
///
/// Whitespace around keys and values is trimmed and empty entries are
/// skipped. An entry without `=` maps to `"true"`, so `"antialias"` works as
/// a flag.
pub fn parse_parameters(parameters: &str) -> HashMap<String, String> {
    parameters
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
            None => (entry.to_string(), "true".to_string()),
        })
        .collect()
}

/// Parse a single parameter value, naming the key in the error.
pub fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Parse `x;y;z` into a vector.
fn parse_vec3(key: &str, value: &str) -> Result<Vec3, ConfigError> {
    let parts: Vec<&str> = value.split(';').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(Vec3::new(
        parse_value(key, parts[0])?,
        parse_value(key, parts[1])?,
        parse_value(key, parts[2])?,
    ))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Vertical field of view in degrees.
    pub field_of_view: f32,
    pub near_clipping_plane: f32,
    pub far_clipping_plane: f32,
    pub camera_position: Vec3,
    /// Grid pitch marker positions snap to.
    pub snap: f32,
    pub marker_height: f32,
    /// `None` keeps every marker.
    pub marker_limit: Option<usize>,
    pub model_path: PathBuf,
    pub renderer: String,
    pub renderer_parameters: String,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// World distance within which a pick ray hits a helper line.
    pub line_threshold: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            field_of_view: 60.0,
            near_clipping_plane: 1.0,
            far_clipping_plane: 1100.0,
            camera_position: crate::camera::DEFAULT_CAMERA_POSITION,
            snap: 20.0,
            marker_height: 5.0,
            marker_limit: Some(1024),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            renderer: "cpu_reference".to_string(),
            renderer_parameters: String::new(),
            rotate_speed: 1.0,
            zoom_speed: 1.2,
            line_threshold: crate::picking::DEFAULT_LINE_THRESHOLD,
        }
    }
}

impl ViewerConfig {
    /// Defaults overridden by `parameters`.
    ///
    /// Renderer parameters cannot be nested in the comma separated string;
    /// set [`ViewerConfig::renderer_parameters`] directly instead.
    pub fn from_parameters(parameters: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for (key, value) in parse_parameters(parameters) {
            match key.as_str() {
                "fov" | "field_of_view" => config.field_of_view = parse_value(&key, &value)?,
                "near" => config.near_clipping_plane = parse_value(&key, &value)?,
                "far" => config.far_clipping_plane = parse_value(&key, &value)?,
                "camera_position" => config.camera_position = parse_vec3(&key, &value)?,
                "snap" => config.snap = parse_value(&key, &value)?,
                "marker_height" => config.marker_height = parse_value(&key, &value)?,
                "marker_limit" => {
                    config.marker_limit = match value.as_str() {
                        "none" | "unbounded" => None,
                        _ => Some(parse_value(&key, &value)?),
                    }
                }
                "model_path" => config.model_path = PathBuf::from(value),
                "renderer" => config.renderer = value,
                "rotate_speed" => config.rotate_speed = parse_value(&key, &value)?,
                "zoom_speed" => config.zoom_speed = parse_value(&key, &value)?,
                "line_threshold" => config.line_threshold = parse_value(&key, &value)?,
                _ => return Err(ConfigError::UnsupportedParameter(key)),
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_renderer_parameters(mut self, parameters: impl Into<String>) -> Self {
        self.renderer_parameters = parameters.into();
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, value: f32| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        if !(self.field_of_view > 0.0 && self.field_of_view < 180.0) {
            return Err(invalid("fov", self.field_of_view));
        }
        if !(self.near_clipping_plane > 0.0 && self.near_clipping_plane.is_finite()) {
            return Err(invalid("near", self.near_clipping_plane));
        }
        if !(self.far_clipping_plane > self.near_clipping_plane && self.far_clipping_plane.is_finite()) {
            return Err(invalid("far", self.far_clipping_plane));
        }
        if !self.camera_position.is_finite() {
            return Err(ConfigError::InvalidValue {
                key: "camera_position".to_string(),
                value: format!("{:?}", self.camera_position),
            });
        }
        if !(self.snap > 0.0 && self.snap.is_finite()) {
            return Err(invalid("snap", self.snap));
        }
        if !self.marker_height.is_finite() {
            return Err(invalid("marker_height", self.marker_height));
        }
        if self.marker_limit == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "marker_limit".to_string(),
                value: "0".to_string(),
            });
        }
        if !(self.rotate_speed.is_finite() && self.rotate_speed >= 0.0) {
            return Err(invalid("rotate_speed", self.rotate_speed));
        }
        if !(self.zoom_speed > 0.0 && self.zoom_speed.is_finite()) {
            return Err(invalid("zoom_speed", self.zoom_speed));
        }
        if !(self.line_threshold >= 0.0 && self.line_threshold.is_finite()) {
            return Err(invalid("line_threshold", self.line_threshold));
        }
        Ok(())
    }
}
