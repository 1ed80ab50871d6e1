//! Actors as the render pipeline sees them
//!
//! The pipeline needs very little from an actor: its flags, its world transform,
//! whether it is a light, and the surfaces it wants drawn.

use cgmath::{Matrix4, One, Quaternion, Vector3, Zero};

use crate::config::ShadowSettings;
use crate::error::Result;
use crate::gfx::rendering::device::GraphicsDevice;
use crate::gfx::surface::Surface;

use super::light::{DirectionalLight, Light, LightRef};

/// Translation, rotation and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Quaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// Flags and placement every actor carries
#[derive(Debug, Clone, PartialEq)]
pub struct ActorState {
    pub name: String,
    pub enabled: bool,
    pub visible: bool,
    pub transform: Transform,
}

impl ActorState {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
            visible: true,
            transform: Transform::default(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Enabled and visible
    pub fn is_active(&self) -> bool {
        self.enabled && self.visible
    }
}

/// Something the scene can cache and draw
pub trait Actor {
    fn state(&self) -> &ActorState;

    fn state_mut(&mut self) -> &mut ActorState;

    fn world_transform(&self) -> Matrix4<f32> {
        self.state().transform.matrix()
    }

    /// The light this actor provides, if it is one
    fn light(&self) -> Option<LightRef<'_>> {
        None
    }

    fn light_mut(&mut self) -> Option<&mut Light> {
        None
    }

    /// Appends the surfaces to draw this frame
    fn collect_surfaces<'a>(&'a self, _out: &mut Vec<&'a dyn Surface>) {}

    /// Frees everything the actor owns on the GPU; called once on removal
    fn release(&mut self, _device: &mut dyn GraphicsDevice) {}
}

/// An actor that owns a list of surfaces
pub struct SurfaceActor {
    state: ActorState,
    surfaces: Vec<Box<dyn Surface>>,
}

impl SurfaceActor {
    pub fn new(state: ActorState) -> Self {
        Self {
            state,
            surfaces: Vec::new(),
        }
    }

    pub fn with_surface(mut self, surface: impl Surface + 'static) -> Self {
        self.surfaces.push(Box::new(surface));
        self
    }

    pub fn surfaces(&self) -> &[Box<dyn Surface>] {
        &self.surfaces
    }

    /// Replaces the surfaces, releasing the old ones first
    pub fn rebuild_surfaces(
        &mut self,
        surfaces: Vec<Box<dyn Surface>>,
        device: &mut dyn GraphicsDevice,
    ) {
        for surface in self.surfaces.drain(..) {
            surface.release(device);
        }
        self.surfaces = surfaces;
    }
}

impl Actor for SurfaceActor {
    fn state(&self) -> &ActorState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ActorState {
        &mut self.state
    }

    fn collect_surfaces<'a>(&'a self, out: &mut Vec<&'a dyn Surface>) {
        out.extend(self.surfaces.iter().map(|surface| &**surface));
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) {
        for surface in self.surfaces.drain(..) {
            surface.release(device);
        }
    }
}

/// An actor that is a light
pub struct LightActor {
    state: ActorState,
    light: Light,
}

impl LightActor {
    pub fn new(state: ActorState, light: impl Into<Light>) -> Self {
        Self {
            state,
            light: light.into(),
        }
    }
}

impl Actor for LightActor {
    fn state(&self) -> &ActorState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ActorState {
        &mut self.state
    }

    fn light(&self) -> Option<LightRef<'_>> {
        Some(self.light.as_ref())
    }

    fn light_mut(&mut self) -> Option<&mut Light> {
        Some(&mut self.light)
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) {
        self.light.release(device);
    }
}

/// Convenience for building light actors that start with shadows on
pub fn shadowed_sun(
    name: &str,
    direction: Vector3<f32>,
    device: &mut dyn GraphicsDevice,
    settings: &ShadowSettings,
) -> Result<LightActor> {
    let mut sun = DirectionalLight::new(direction, [1.0; 3], [1.0; 3])?;
    sun.set_shadow_enabled(true, device, settings)?;
    Ok(LightActor::new(ActorState::new(name), sun))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::{Deg, Point3, Rotation3, Transform as _};

    #[test]
    fn test_transform_order_is_scale_rotate_translate() {
        let transform = Transform::from_position(Vector3::new(10.0, 0.0, 0.0))
            .with_rotation(Quaternion::from_angle_y(Deg(90.0_f32)))
            .with_scale(Vector3::new(2.0, 2.0, 2.0));
        let p = transform.matrix().transform_point(Point3::new(1.0, 0.0, 0.0));

        assert_relative_eq!(p.x, 10.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, -2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_active_needs_both_flags() {
        let mut state = ActorState::new("crate");
        assert!(state.is_active());
        state.visible = false;
        assert!(!state.is_active());
        state.visible = true;
        state.enabled = false;
        assert!(!state.is_active());
    }
}
