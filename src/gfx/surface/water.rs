//! Water with a planar reflection
//!
//! Before the main pass, every water surface renders the reflecting part of the
//! scene from a camera mirrored across its plane into its own offscreen target.
//! The main draw then samples that target with the mirrored view-projection.

use std::cell::Cell;

use cgmath::{Matrix4, Point3, Transform, Vector3};

use crate::config::ReflectionSettings;
use crate::error::Result;
use crate::gfx::camera::Camera;
use crate::gfx::geometry::{Aabb, Plane};
use crate::gfx::rendering::device::{
    GraphicsDevice, MeshHandle, ProgramHandle, ReflectionSample, RenderTarget, RenderTargetDesc,
    RenderTargetHandle, TargetFormat,
};
use crate::gfx::rendering::surface_drawer::{draw_bucket, DrawBuckets};

use super::{
    CullMode, DrawContext, DrawPass, DrawProperties, DrawStyle, PreDrawContext, Surface,
    SurfaceProperties,
};

pub struct WaterSurface {
    properties: SurfaceProperties,
    mesh: MeshHandle,
    program: ProgramHandle,
    local_bounds: Aabb,
    /// Surface scroll speed in texture units per second
    flow: [f32; 2],
    target: Cell<Option<(RenderTargetHandle, (u32, u32))>>,
    reflection: Cell<Option<ReflectionSample>>,
}

impl WaterSurface {
    /// `local_bounds` should be flat; its centre defines the water height
    pub fn new(mesh: MeshHandle, local_bounds: Aabb, program: ProgramHandle) -> Self {
        Self {
            properties: SurfaceProperties::new(DrawStyle::Transparent)
                .with_cull_mode(CullMode::None)
                .with_diffuse([0.2, 0.35, 0.45, 0.75])
                .with_specular([1.0; 3], 64.0),
            mesh,
            program,
            local_bounds,
            flow: [0.02, 0.01],
            target: Cell::new(None),
            reflection: Cell::new(None),
        }
    }

    pub fn with_flow(mut self, flow: [f32; 2]) -> Self {
        self.flow = flow;
        self
    }

    pub fn with_properties(mut self, properties: SurfaceProperties) -> Self {
        self.properties = properties;
        self
    }

    /// World-space height of the water plane
    pub fn height(&self, world: &Matrix4<f32>) -> f32 {
        world.transform_point(self.local_bounds.center()).y
    }

    /// Reflection produced by the last pre-draw, if any
    pub fn reflection(&self) -> Option<ReflectionSample> {
        self.reflection.get()
    }

    fn ensure_target(
        &self,
        device: &mut dyn GraphicsDevice,
        settings: &ReflectionSettings,
    ) -> Result<RenderTargetHandle> {
        let desc = RenderTargetDesc::scaled(
            "Reflection Map",
            device.backbuffer_size(),
            settings.map_ratio,
            TargetFormat::Color,
        );

        match self.target.get() {
            Some((target, size)) if size == desc.size() => Ok(target),
            previous => {
                if let Some((old, _)) = previous {
                    device.release_render_target(old);
                    self.reflection.set(None);
                }
                let target = device.create_render_target(&desc)?;
                log::info!("Created {}x{} reflection target", desc.width, desc.height);
                self.target.set(Some((target, desc.size())));
                Ok(target)
            }
        }
    }

    fn draw_reflection(
        &self,
        height: f32,
        target: RenderTargetHandle,
        real: &Camera,
        ctx: &mut PreDrawContext<'_>,
    ) -> Result<()> {
        let settings = &ctx.inputs.settings.reflection;

        let (position, look_target) =
            reflect_camera_transform(real.position(), real.look_target(), height);
        ctx.camera
            .set_transform_by_look_target(position, Vector3::unit_y(), look_target)?;
        let clip_plane = reflection_clip_plane(real.position(), height, settings.clip_bias);

        let camera: &Camera = &*ctx.camera;
        let mut buckets = DrawBuckets::new();
        for instance in ctx.inputs.surfaces {
            if instance.is(self)
                || !instance.has_draw_properties(DrawProperties::REFLECTING)
                || !instance.is_visible_from(camera)
            {
                continue;
            }
            buckets.classify(*instance, true);
        }
        buckets.sort(camera.position(), ctx.inputs.settings.sort_opaque_near_to_far);

        ctx.device.set_render_target(RenderTarget::Offscreen(target))?;
        ctx.device.clear(settings.clear_color)?;

        let mut draw_ctx = DrawContext::new(ctx.inputs, camera, DrawPass::Normal, &mut *ctx.device);
        draw_bucket(&buckets.dependent, &mut draw_ctx)?;
        draw_ctx.device.set_clip_plane(Some(clip_plane));
        let drawn = buckets.draw_ordered(&mut draw_ctx);
        draw_ctx.device.set_clip_plane(None);
        drawn?;

        let texture = ctx.device.resolve_render_target(target)?;
        self.reflection.set(Some(ReflectionSample {
            texture,
            view_projection: camera.view_projection(),
        }));
        log::debug!(
            "Reflection at height {} drew {} surfaces",
            height,
            buckets.len()
        );
        Ok(())
    }
}

impl Surface for WaterSurface {
    fn properties(&self) -> &SurfaceProperties {
        &self.properties
    }

    fn bounding_box(&self, world: &Matrix4<f32>) -> Aabb {
        self.local_bounds.transformed(world)
    }

    fn pre_draw(&self, world: &Matrix4<f32>, ctx: &mut PreDrawContext<'_>) -> Result<()> {
        let target = self.ensure_target(ctx.device, &ctx.inputs.settings.reflection)?;
        let height = self.height(world);

        let real = ctx.camera.clone();
        let result = self.draw_reflection(height, target, &real, ctx);
        *ctx.camera = real;
        result
    }

    fn draw(&self, world: &Matrix4<f32>, ctx: &mut DrawContext<'_>) -> Result<()> {
        if ctx.pass != DrawPass::Normal {
            return Ok(());
        }

        let mut call = self.properties.draw_call(self.mesh, self.program, *world, ctx);
        call.reflection = self.reflection.get();
        call.material.uv_offset = [
            self.flow[0] * ctx.time.elapsed,
            self.flow[1] * ctx.time.elapsed,
        ];
        ctx.device.draw(&call)
    }

    fn release(&self, device: &mut dyn GraphicsDevice) {
        if let Some((target, _)) = self.target.take() {
            device.release_render_target(target);
        }
        self.reflection.set(None);
    }
}

/// Mirrors a camera position and look target across the plane `y = height`
pub fn reflect_camera_transform(
    position: Point3<f32>,
    target: Point3<f32>,
    height: f32,
) -> (Point3<f32>, Point3<f32>) {
    let mirror = |p: Point3<f32>| Point3::new(p.x, 2.0 * height - p.y, p.z);
    (mirror(position), mirror(target))
}

/// Plane keeping the side of the water the real camera is on
///
/// The plane is pushed `clip_bias` away from the kept side so geometry touching
/// the water does not leave a seam.
pub fn reflection_clip_plane(eye: Point3<f32>, height: f32, clip_bias: f32) -> Plane {
    let normal = if eye.y >= height {
        Vector3::unit_y()
    } else {
        -Vector3::unit_y()
    };
    Plane::from_point_normal(Point3::new(0.0, height, 0.0) - normal * clip_bias, normal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::Deg;

    use crate::config::{Fog, RenderSettings};
    use crate::gfx::rendering::command_list::{CommandList, RenderCommand};
    use crate::gfx::scene::actor::{Actor, ActorState, SurfaceActor, Transform as Placement};
    use crate::gfx::scene::light::LightCache;
    use crate::gfx::surface::{
        FrameInputs, FrameTime, MeshSurface, SkyboxSurface, SurfaceInstance, SurfacePrograms,
    };

    const SKY: MeshHandle = MeshHandle(1);
    const ROCK: MeshHandle = MeshHandle(2);
    const LAKE: MeshHandle = MeshHandle(3);

    fn programs() -> SurfacePrograms {
        SurfacePrograms {
            normal: ProgramHandle(0),
            shadow: ProgramHandle(1),
        }
    }

    fn placed(name: &str, x: f32, y: f32, z: f32) -> ActorState {
        ActorState::new(name).with_transform(Placement::from_position(Vector3::new(x, y, z)))
    }

    fn lake_actors() -> Vec<SurfaceActor> {
        let unit = Aabb::from_center(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.5));
        let flat = Aabb::new(Point3::new(-50.0, 0.0, -50.0), Point3::new(50.0, 0.0, 50.0));
        vec![
            SurfaceActor::new(ActorState::new("sky"))
                .with_surface(SkyboxSurface::new(SKY, ProgramHandle(0))),
            SurfaceActor::new(placed("rock", 0.0, 15.0, 10.0))
                .with_surface(MeshSurface::new(ROCK, unit, programs())),
            SurfaceActor::new(placed("lake", 0.0, 10.0, 0.0))
                .with_surface(WaterSurface::new(LAKE, flat, ProgramHandle(0))),
        ]
    }

    fn instances(actors: &[SurfaceActor]) -> Vec<SurfaceInstance<'_>> {
        let mut instances = Vec::new();
        for actor in actors {
            let mut surfaces = Vec::new();
            actor.collect_surfaces(&mut surfaces);
            instances.extend(
                surfaces
                    .into_iter()
                    .map(|surface| SurfaceInstance::new(actor as &dyn Actor, surface)),
            );
        }
        instances
    }

    fn viewer() -> Camera {
        let mut camera = Camera::perspective(Deg(60.0_f32), 1.0, 0.1, 500.0).unwrap();
        camera
            .set_transform_by_look_target(
                Point3::new(0.0, 20.0, -20.0),
                Vector3::unit_y(),
                Point3::new(0.0, 10.0, 10.0),
            )
            .unwrap();
        camera
    }

    #[test]
    fn test_reflected_camera_example() {
        let (position, target) =
            reflect_camera_transform(Point3::new(0.0, 20.0, 0.0), Point3::new(0.0, 20.0, 5.0), 10.0);
        assert_eq!(position, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(target, Point3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_clip_plane_keeps_camera_side() {
        let above = reflection_clip_plane(Point3::new(0.0, 20.0, 0.0), 10.0, 0.5);
        assert!(above.distance(Point3::new(0.0, 12.0, 0.0)) > 0.0);
        assert!(above.distance(Point3::new(0.0, 8.0, 0.0)) < 0.0);
        assert_relative_eq!(above.distance(Point3::new(0.0, 10.0, 0.0)), 0.5);

        let below = reflection_clip_plane(Point3::new(0.0, 2.0, 0.0), 10.0, 0.0);
        assert!(below.distance(Point3::new(0.0, 8.0, 0.0)) > 0.0);
    }

    #[test]
    fn test_reflection_pass_order_and_camera_restore() {
        let actors = lake_actors();
        let surfaces = instances(&actors);
        let lights = LightCache::new();
        let fog = Fog::default();
        let settings = RenderSettings::default();
        let inputs = FrameInputs {
            time: FrameTime::default(),
            surfaces: &surfaces,
            lights: &lights,
            fog: &fog,
            settings: &settings,
        };

        let mut device = CommandList::new(640, 480);
        let mut camera = viewer();
        let before = camera.clone();
        {
            let mut ctx = PreDrawContext {
                inputs,
                camera: &mut camera,
                device: &mut device,
            };
            surfaces[2].pre_draw(&mut ctx).unwrap();
        }

        assert_eq!(camera.position(), before.position());
        assert_eq!(camera.view_projection(), before.view_projection());

        let draws = device.draws();
        let meshes: Vec<_> = draws.iter().map(|d| d.call.mesh).collect();
        assert_eq!(meshes, vec![SKY, ROCK]);
        assert!(draws[0].clip_plane.is_none());
        let plane = draws[1].clip_plane.unwrap();
        assert_relative_eq!(plane.normal.y, 1.0);

        assert!(matches!(
            device.commands().last(),
            Some(RenderCommand::Resolve { .. })
        ));
        assert!(matches!(
            device.commands()[device.commands().len() - 2],
            RenderCommand::SetClipPlane(None)
        ));
        assert!(device.first_backbuffer_bind().is_none());
    }

    #[test]
    fn test_release_frees_target() {
        let actors = lake_actors();
        let surfaces = instances(&actors);
        let lights = LightCache::new();
        let fog = Fog::default();
        let settings = RenderSettings::default();
        let inputs = FrameInputs {
            time: FrameTime::default(),
            surfaces: &surfaces,
            lights: &lights,
            fog: &fog,
            settings: &settings,
        };
        let mut device = CommandList::new(640, 480);
        let mut camera = viewer();
        surfaces[2]
            .pre_draw(&mut PreDrawContext {
                inputs,
                camera: &mut camera,
                device: &mut device,
            })
            .unwrap();
        assert_eq!(device.live_target_count(), 1);

        let mut lake = actors.into_iter().nth(2).unwrap();
        lake.release(&mut device);
        assert_eq!(device.live_target_count(), 0);
    }
}
