//! Light actors and the per-frame light cache

use cgmath::{InnerSpace, Matrix4, Point3, Transform, Vector3};

use crate::config::ShadowSettings;
use crate::error::{RenderError, Result};
use crate::gfx::rendering::device::{
    DirectionalParams, GraphicsDevice, LightingParams, PointParams, MAX_POINT_LIGHTS,
};
use crate::gfx::rendering::shadow::{ShadowMap, ShadowPass};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
}

impl AmbientLight {
    pub fn new(color: [f32; 3]) -> Self {
        Self { color }
    }
}

/// Parallel light that can own a shadow pass
pub struct DirectionalLight {
    direction: Vector3<f32>,
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    shadow: ShadowPass,
}

impl DirectionalLight {
    /// Light travelling along `direction`; shadows start disabled
    pub fn new(direction: Vector3<f32>, diffuse: [f32; 3], specular: [f32; 3]) -> Result<Self> {
        if direction.magnitude2() == 0.0 {
            return Err(RenderError::InvalidArgument(
                "directional light needs a non-zero direction".to_string(),
            ));
        }
        Ok(Self {
            direction: direction.normalize(),
            diffuse,
            specular,
            shadow: ShadowPass::disabled(),
        })
    }

    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Vector3<f32>) -> Result<()> {
        if direction.magnitude2() == 0.0 {
            return Err(RenderError::InvalidArgument(
                "directional light needs a non-zero direction".to_string(),
            ));
        }
        self.direction = direction.normalize();
        Ok(())
    }

    /// Swaps the shadow pass variant; the old pass's target is released first
    pub fn set_shadow_enabled(
        &mut self,
        enabled: bool,
        device: &mut dyn GraphicsDevice,
        settings: &ShadowSettings,
    ) -> Result<()> {
        if enabled == self.shadow.is_enabled() {
            return Ok(());
        }
        settings.validate()?;

        self.shadow.release(device);
        self.shadow = if enabled {
            ShadowPass::directional(device, settings)?
        } else {
            ShadowPass::disabled()
        };
        log::debug!("Directional shadow {}", if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    pub fn shadow_enabled(&self) -> bool {
        self.shadow.is_enabled()
    }

    pub fn shadow_pass(&self) -> &ShadowPass {
        &self.shadow
    }

    pub fn shadow_map(&self) -> Option<ShadowMap> {
        self.shadow.shadow_map()
    }

    fn params(&self) -> DirectionalParams {
        DirectionalParams {
            direction: self.direction,
            diffuse: self.diffuse,
            specular: self.specular,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub range: f32,
    pub falloff: f32,
}

impl PointLight {
    pub fn new(diffuse: [f32; 3], range: f32) -> Self {
        Self {
            diffuse,
            specular: diffuse,
            range,
            falloff: 1.0,
        }
    }

    pub fn with_falloff(mut self, falloff: f32) -> Self {
        self.falloff = falloff;
        self
    }
}

/// An owned light of any kind
pub enum Light {
    Ambient(AmbientLight),
    Directional(DirectionalLight),
    Point(PointLight),
}

impl Light {
    pub fn as_ref(&self) -> LightRef<'_> {
        match self {
            Light::Ambient(light) => LightRef::Ambient(light),
            Light::Directional(light) => LightRef::Directional(light),
            Light::Point(light) => LightRef::Point(light),
        }
    }

    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if let Light::Directional(light) = self {
            light.shadow.release(device);
            light.shadow = ShadowPass::disabled();
        }
    }
}

impl From<AmbientLight> for Light {
    fn from(light: AmbientLight) -> Self {
        Light::Ambient(light)
    }
}

impl From<DirectionalLight> for Light {
    fn from(light: DirectionalLight) -> Self {
        Light::Directional(light)
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}

/// Borrowed light kind, resolved once while caching actors
#[derive(Clone, Copy)]
pub enum LightRef<'a> {
    Ambient(&'a AmbientLight),
    Directional(&'a DirectionalLight),
    Point(&'a PointLight),
}

/// Lights of the frame partitioned by kind
#[derive(Default)]
pub struct LightCache<'a> {
    ambient: Vec<&'a AmbientLight>,
    directional: Vec<&'a DirectionalLight>,
    point: Vec<(Point3<f32>, &'a PointLight)>,
}

impl<'a> LightCache<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files `light` under its kind; point lights take their position from `world`
    pub fn insert(&mut self, light: LightRef<'a>, world: &Matrix4<f32>) {
        match light {
            LightRef::Ambient(ambient) => self.ambient.push(ambient),
            LightRef::Directional(directional) => self.directional.push(directional),
            LightRef::Point(point) => self
                .point
                .push((world.transform_point(Point3::new(0.0, 0.0, 0.0)), point)),
        }
    }

    pub fn ambient(&self) -> &[&'a AmbientLight] {
        &self.ambient
    }

    pub fn directional(&self) -> &[&'a DirectionalLight] {
        &self.directional
    }

    pub fn point(&self) -> &[(Point3<f32>, &'a PointLight)] {
        &self.point
    }

    pub fn len(&self) -> usize {
        self.ambient.len() + self.directional.len() + self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.ambient.clear();
        self.directional.clear();
        self.point.clear();
    }

    /// Summed ambient, the first directional light and the nearest point lights
    pub fn lighting_at(&self, position: Point3<f32>) -> LightingParams {
        let mut ambient = [0.0; 3];
        for light in &self.ambient {
            for (sum, channel) in ambient.iter_mut().zip(light.color) {
                *sum += channel;
            }
        }

        let mut nearest: Vec<_> = self
            .point
            .iter()
            .map(|(at, light)| ((at - position).magnitude2(), *at, *light))
            .collect();
        nearest.sort_by(|a, b| a.0.total_cmp(&b.0));

        LightingParams {
            ambient,
            directional: self.directional.first().map(|light| light.params()),
            points: nearest
                .into_iter()
                .take(MAX_POINT_LIGHTS)
                .map(|(_, at, light)| PointParams {
                    position: at,
                    diffuse: light.diffuse,
                    specular: light.specular,
                    range: light.range,
                    falloff: light.falloff,
                })
                .collect(),
        }
    }

    /// Map of the first cached directional light that published one
    pub fn shadow_map(&self) -> Option<ShadowMap> {
        self.directional.iter().find_map(|light| light.shadow_map())
    }
}
