//! Render settings
//!
//! Plain value objects describing how the pipeline behaves: opaque sorting, shadow
//! map placement and resolution, reflection map resolution, and fog. Everything
//! has a sensible [`Default`], can be tweaked with `with_*` builders, and can be
//! loaded from a TOML file where any omitted key keeps its default.
//!
//! ```toml
//! sort_opaque_near_to_far = true
//!
//! [shadow]
//! relative_to_view = true
//! offset = 60.0
//! snap_interval = 4.0
//!
//! [reflection]
//! map_ratio = 0.5
//! ```

use std::path::Path;

use cgmath::{Point3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// Top-level settings for a [`Scene`](crate::gfx::scene::Scene)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Sort opaque surfaces near-to-far before drawing (early depth rejection hint)
    pub sort_opaque_near_to_far: bool,
    /// Backbuffer clear colour (RGBA)
    pub clear_color: [f32; 4],
    /// Directional shadow map settings shared by every shadowed light
    pub shadow: ShadowSettings,
    /// Planar reflection settings shared by every water surface
    pub reflection: ReflectionSettings,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            sort_opaque_near_to_far: true,
            clear_color: [0.1, 0.2, 0.3, 1.0],
            shadow: ShadowSettings::default(),
            reflection: ReflectionSettings::default(),
        }
    }
}

impl RenderSettings {
    /// Parses settings from TOML text
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads and parses a TOML settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loading render settings from {}", path.as_ref().display());
        Self::from_toml_str(&source)
    }

    /// Rejects values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        self.shadow.validate()?;
        self.reflection.validate()
    }

    pub fn with_opaque_sorting(mut self, enabled: bool) -> Self {
        self.sort_opaque_near_to_far = enabled;
        self
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_shadow(mut self, shadow: ShadowSettings) -> Self {
        self.shadow = shadow;
        self
    }

    pub fn with_reflection(mut self, reflection: ReflectionSettings) -> Self {
        self.reflection = reflection;
        self
    }
}

/// Placement and resolution of a directional light's shadow camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    /// Shadow map size as a fraction of the backbuffer size
    pub map_ratio: f32,
    /// Orthographic view width in world units
    pub width: f32,
    /// Orthographic view height in world units
    pub height: f32,
    pub near: f32,
    pub far: f32,
    /// Follow the view camera instead of staying at `fixed_position`
    pub relative_to_view: bool,
    /// World position used when `relative_to_view` is off
    pub fixed_position: [f32; 3],
    /// Distance the shadow camera is pulled back along the light direction
    pub offset: f32,
    /// Grid the relative position is snapped to; zero disables snapping
    pub snap_interval: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            map_ratio: 1.0,
            width: 100.0,
            height: 100.0,
            near: 1.0,
            far: 200.0,
            relative_to_view: true,
            fixed_position: [0.0, 100.0, 0.0],
            offset: 100.0,
            snap_interval: 4.0,
        }
    }
}

impl ShadowSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.map_ratio > 0.0) {
            return Err(RenderError::InvalidArgument(format!(
                "shadow map ratio must be positive, got {}",
                self.map_ratio
            )));
        }
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(RenderError::InvalidArgument(format!(
                "shadow view size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.near < self.far) {
            return Err(RenderError::InvalidArgument(format!(
                "shadow near plane {} must be closer than far plane {}",
                self.near, self.far
            )));
        }
        if self.snap_interval < 0.0 {
            return Err(RenderError::InvalidArgument(format!(
                "shadow snap interval must not be negative, got {}",
                self.snap_interval
            )));
        }
        Ok(())
    }

    pub fn fixed_position(&self) -> Point3<f32> {
        Point3::from(self.fixed_position)
    }

    pub fn with_map_ratio(mut self, ratio: f32) -> Self {
        self.map_ratio = ratio;
        self
    }

    pub fn with_view_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_depth_range(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Keeps the shadow camera at a fixed world position
    pub fn with_fixed_position(mut self, position: Point3<f32>) -> Self {
        self.relative_to_view = false;
        self.fixed_position = position.into();
        self
    }

    /// Makes the shadow camera follow the view camera
    pub fn with_relative_placement(mut self, offset: f32, snap_interval: f32) -> Self {
        self.relative_to_view = true;
        self.offset = offset;
        self.snap_interval = snap_interval;
        self
    }
}

/// Resolution and clipping of the planar water reflection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionSettings {
    /// Reflection map size as a fraction of the backbuffer size
    pub map_ratio: f32,
    /// Distance the clip plane is pushed past the water, keeping geometry that touches it
    pub clip_bias: f32,
    /// Clear colour of the reflection target (RGBA)
    pub clear_color: [f32; 4],
}

impl Default for ReflectionSettings {
    fn default() -> Self {
        Self {
            map_ratio: 0.5,
            clip_bias: 0.0,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl ReflectionSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.map_ratio > 0.0) {
            return Err(RenderError::InvalidArgument(format!(
                "reflection map ratio must be positive, got {}",
                self.map_ratio
            )));
        }
        Ok(())
    }

    pub fn with_map_ratio(mut self, ratio: f32) -> Self {
        self.map_ratio = ratio;
        self
    }

    pub fn with_clip_bias(mut self, bias: f32) -> Self {
        self.clip_bias = bias;
        self
    }
}

/// Linear distance fog
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fog {
    pub enabled: bool,
    pub color: [f32; 3],
    pub start: f32,
    pub end: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            enabled: false,
            color: [0.5, 0.6, 0.7],
            start: 50.0,
            end: 300.0,
        }
    }
}

impl Fog {
    pub fn new(color: Vector3<f32>, start: f32, end: f32) -> Self {
        Self {
            enabled: true,
            color: color.into(),
            start,
            end,
        }
    }

    /// Fog parameters packed as `(start, end, enabled, 0)` for shaders
    pub fn range_vector(&self) -> Vector4<f32> {
        let enabled = if self.enabled { 1.0 } else { 0.0 };
        Vector4::new(self.start, self.end, enabled, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RenderSettings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = RenderSettings::from_toml_str(
            r#"
            sort_opaque_near_to_far = false

            [shadow]
            snap_interval = 8.0
            relative_to_view = false
            fixed_position = [10.0, 50.0, -4.0]
            "#,
        )
        .unwrap();

        assert!(!settings.sort_opaque_near_to_far);
        assert_eq!(settings.shadow.snap_interval, 8.0);
        assert!(!settings.shadow.relative_to_view);
        assert_eq!(settings.shadow.fixed_position(), Point3::new(10.0, 50.0, -4.0));
        assert_eq!(settings.shadow.map_ratio, ShadowSettings::default().map_ratio);
        assert_eq!(settings.reflection, ReflectionSettings::default());
    }

    #[test]
    fn test_rejects_inverted_shadow_depth_range() {
        let result = RenderSettings::from_toml_str(
            r#"
            [shadow]
            near = 10.0
            far = 5.0
            "#,
        );
        assert!(matches!(result, Err(RenderError::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let result = RenderSettings::from_toml_str("sort_opaque_near_to_far = \"yes\"");
        assert!(matches!(result, Err(RenderError::Config(_))));
    }

    #[test]
    fn test_builders_compose() {
        let settings = RenderSettings::default()
            .with_opaque_sorting(false)
            .with_shadow(ShadowSettings::default().with_fixed_position(Point3::new(0.0, 5.0, 0.0)))
            .with_reflection(ReflectionSettings::default().with_clip_bias(0.25));

        assert!(!settings.sort_opaque_near_to_far);
        assert!(!settings.shadow.relative_to_view);
        assert_eq!(settings.reflection.clip_bias, 0.25);
    }
}
