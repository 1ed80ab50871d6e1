//! Directional shadow passes
//!
//! Each directional light owns a [`ShadowPass`]. The disabled variant keeps a
//! placeholder camera and never publishes a map, so consumers only ever ask
//! [`ShadowPass::shadow_map`] and never branch on whether shadowing is on.

use std::cell::{Cell, RefCell};

use cgmath::{Matrix4, Point3, Vector3};

use crate::config::ShadowSettings;
use crate::error::Result;
use crate::gfx::camera::Camera;
use crate::gfx::surface::{DrawContext, DrawPass, DrawProperties, FrameInputs};

use super::device::{
    GraphicsDevice, RenderTarget, RenderTargetDesc, RenderTargetHandle, TargetFormat, TextureHandle,
};

/// A resolved shadow map and the light view-projection that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowMap {
    pub texture: TextureHandle,
    pub view_projection: Matrix4<f32>,
}

/// Shadow state of one directional light
pub enum ShadowPass {
    Disabled(NullShadow),
    Directional(DirectionalShadow),
}

impl ShadowPass {
    pub fn disabled() -> Self {
        ShadowPass::Disabled(NullShadow::new())
    }

    /// Real shadow pass with its target sized from the current backbuffer
    pub fn directional(device: &mut dyn GraphicsDevice, settings: &ShadowSettings) -> Result<Self> {
        Ok(ShadowPass::Directional(DirectionalShadow::new(device, settings)?))
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, ShadowPass::Directional(_))
    }

    /// Snapshot of the pass camera
    pub fn camera(&self) -> Camera {
        match self {
            ShadowPass::Disabled(null) => null.camera.clone(),
            ShadowPass::Directional(shadow) => shadow.camera.borrow().clone(),
        }
    }

    /// The last published map; always `None` when disabled
    pub fn shadow_map(&self) -> Option<ShadowMap> {
        match self {
            ShadowPass::Disabled(_) => None,
            ShadowPass::Directional(shadow) => shadow.map.get(),
        }
    }

    pub fn draw(
        &self,
        direction: Vector3<f32>,
        view_camera: &Camera,
        inputs: FrameInputs<'_>,
        device: &mut dyn GraphicsDevice,
    ) -> Result<()> {
        match self {
            ShadowPass::Disabled(_) => Ok(()),
            ShadowPass::Directional(shadow) => shadow.draw(direction, view_camera, inputs, device),
        }
    }

    pub fn release(&self, device: &mut dyn GraphicsDevice) {
        if let ShadowPass::Directional(shadow) = self {
            shadow.release(device);
        }
    }
}

/// Stand-in used while shadowing is off
pub struct NullShadow {
    camera: Camera,
}

impl NullShadow {
    fn new() -> Self {
        Self {
            camera: Camera::default(),
        }
    }
}

pub struct DirectionalShadow {
    camera: RefCell<Camera>,
    target: Cell<Option<(RenderTargetHandle, (u32, u32))>>,
    map: Cell<Option<ShadowMap>>,
}

impl DirectionalShadow {
    fn new(device: &mut dyn GraphicsDevice, settings: &ShadowSettings) -> Result<Self> {
        if settings.relative_to_view && settings.snap_interval == 0.0 {
            log::warn!("Shadow snap interval is zero; the shadow map will shimmer as the view moves");
        }

        let shadow = Self {
            camera: RefCell::new(Camera::orthographic(
                settings.width,
                settings.height,
                settings.near,
                settings.far,
            )?),
            target: Cell::new(None),
            map: Cell::new(None),
        };
        shadow.ensure_target(device, settings)?;
        Ok(shadow)
    }

    fn ensure_target(
        &self,
        device: &mut dyn GraphicsDevice,
        settings: &ShadowSettings,
    ) -> Result<RenderTargetHandle> {
        let desc = RenderTargetDesc::scaled(
            "Shadow Map",
            device.backbuffer_size(),
            settings.map_ratio,
            TargetFormat::ShadowDepth,
        );

        match self.target.get() {
            Some((target, size)) if size == desc.size() => Ok(target),
            previous => {
                if let Some((old, _)) = previous {
                    device.release_render_target(old);
                    self.map.set(None);
                }
                let target = device.create_render_target(&desc)?;
                log::info!("Created {}x{} shadow map target", desc.width, desc.height);
                self.target.set(Some((target, desc.size())));
                Ok(target)
            }
        }
    }

    fn draw(
        &self,
        direction: Vector3<f32>,
        view_camera: &Camera,
        inputs: FrameInputs<'_>,
        device: &mut dyn GraphicsDevice,
    ) -> Result<()> {
        let settings = &inputs.settings.shadow;
        let target = self.ensure_target(device, settings)?;

        let mut camera = self.camera.borrow_mut();
        camera.set_orthographic_size(settings.width, settings.height)?;
        camera.set_depth_range(settings.near, settings.far)?;
        let position = shadow_camera_position(settings, view_camera.position(), direction);
        camera.set_transform_by_look_forward(position, Vector3::unit_y(), direction)?;

        device.set_render_target(RenderTarget::Offscreen(target))?;
        device.clear([1.0; 4])?;

        let mut casters = 0;
        {
            let mut ctx = DrawContext::new(inputs, &camera, DrawPass::DirectionalShadow, device);
            for instance in inputs.surfaces {
                if instance.has_draw_properties(DrawProperties::SHADOWING)
                    && instance.is_visible_from(&camera)
                {
                    instance.draw(&mut ctx)?;
                    casters += 1;
                }
            }
        }

        let texture = device.resolve_render_target(target)?;
        self.map.set(Some(ShadowMap {
            texture,
            view_projection: camera.view_projection(),
        }));
        log::debug!("Shadow pass drew {} casters from {:?}", casters, position);
        Ok(())
    }

    fn release(&self, device: &mut dyn GraphicsDevice) {
        if let Some((target, _)) = self.target.take() {
            device.release_render_target(target);
        }
        self.map.set(None);
    }
}

/// Where the shadow camera sits for the given view position
pub fn shadow_camera_position(
    settings: &ShadowSettings,
    view_position: Point3<f32>,
    direction: Vector3<f32>,
) -> Point3<f32> {
    if !settings.relative_to_view {
        return settings.fixed_position();
    }
    snap_to_grid(view_position - direction * settings.offset, settings.snap_interval)
}

/// Rounds each axis to the nearest multiple of `interval`, halves away from zero
///
/// A non-positive interval leaves the point unchanged.
pub fn snap_to_grid(point: Point3<f32>, interval: f32) -> Point3<f32> {
    if interval <= 0.0 {
        return point;
    }
    let snap = |v: f32| (v / interval).round() * interval;
    Point3::new(snap(point.x), snap(point.y), snap(point.z))
}
