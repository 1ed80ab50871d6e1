use cgmath::{Matrix4, Point3, Vector3};

use crate::error::Result;
use crate::gfx::geometry::Aabb;
use crate::gfx::rendering::device::{MeshHandle, TextureHandle};

use super::{
    DrawContext, DrawPass, DrawProperties, DrawStyle, Surface, SurfacePrograms, SurfaceProperties,
};

/// Ground that is never culled; casts and receives shadows
pub struct TerrainSurface {
    properties: SurfaceProperties,
    mesh: MeshHandle,
    programs: SurfacePrograms,
    texture: Option<TextureHandle>,
    /// How often the texture repeats across the mesh
    pub tiling: f32,
}

impl TerrainSurface {
    pub fn new(mesh: MeshHandle, programs: SurfacePrograms) -> Self {
        Self {
            properties: SurfaceProperties::new(DrawStyle::Opaque)
                .boundless()
                .with_draw_properties(DrawProperties::SHADOWING | DrawProperties::REFLECTING),
            mesh,
            programs,
            texture: None,
            tiling: 1.0,
        }
    }

    pub fn with_texture(mut self, texture: TextureHandle, tiling: f32) -> Self {
        self.texture = Some(texture);
        self.tiling = tiling;
        self
    }

    pub fn with_properties(mut self, properties: SurfaceProperties) -> Self {
        self.properties = properties.boundless();
        self
    }
}

impl Surface for TerrainSurface {
    fn properties(&self) -> &SurfaceProperties {
        &self.properties
    }

    // Boundless; the box is only a placeholder at the owner's origin
    fn bounding_box(&self, world: &Matrix4<f32>) -> Aabb {
        Aabb::from_center(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0)).transformed(world)
    }

    fn draw(&self, world: &Matrix4<f32>, ctx: &mut DrawContext<'_>) -> Result<()> {
        let mut call =
            self.properties
                .draw_call(self.mesh, self.programs.for_pass(ctx.pass), *world, ctx);
        if ctx.pass == DrawPass::Normal {
            call.diffuse_texture = self.texture;
            call.material.uv_scale = [self.tiling; 2];
        }
        ctx.device.draw(&call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Deg;

    use crate::gfx::camera::Camera;
    use crate::gfx::rendering::command_list::CommandList;
    use crate::gfx::rendering::device::{DrawCall, ProgramHandle, RenderTarget};
    use crate::gfx::scene::actor::shadowed_sun;
    use crate::gfx::scene::{ActorState, Scene, SurfaceActor, Transform};
    use crate::gfx::surface::FrameTime;

    const GROUND: MeshHandle = MeshHandle(9);
    const GRASS: TextureHandle = TextureHandle(3);

    fn ground_actor(position: Vector3<f32>) -> SurfaceActor {
        let programs = SurfacePrograms {
            normal: ProgramHandle(0),
            shadow: ProgramHandle(1),
        };
        SurfaceActor::new(
            ActorState::new("ground").with_transform(Transform::from_position(position)),
        )
        .with_surface(TerrainSurface::new(GROUND, programs).with_texture(GRASS, 8.0))
    }

    fn render(scene: &Scene, device: &mut CommandList) {
        crate::logging::init_for_tests();
        let mut camera = Camera::perspective(Deg(60.0_f32), 1.0, 0.1, 100.0).unwrap();
        camera
            .set_transform_by_look_forward(Point3::new(0.0, 0.0, 0.0), Vector3::unit_y(), -Vector3::unit_z())
            .unwrap();
        let time = FrameTime::default();
        let mut frame = scene.pre_draw(time, &mut camera, device).unwrap();
        scene
            .draw(&mut frame, time, &camera, DrawPass::Normal, device)
            .unwrap();
    }

    fn ground_draws(device: &CommandList, pass: DrawPass) -> Vec<DrawCall> {
        device
            .draws()
            .into_iter()
            .filter(|draw| draw.call.mesh == GROUND && draw.call.pass == pass)
            .map(|draw| draw.call.clone())
            .collect()
    }

    #[test]
    fn test_terrain_is_never_culled() {
        let mut scene = Scene::default();
        // Well behind the viewer
        scene.add_actor(ground_actor(Vector3::new(0.0, 0.0, 500.0)));

        let mut device = CommandList::new(640, 480);
        render(&scene, &mut device);

        let draws = device.draws_into(RenderTarget::Backbuffer);
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].mesh, GROUND);
    }

    #[test]
    fn test_tiling_only_applies_to_normal_pass() {
        let mut device = CommandList::new(640, 480);
        let mut scene = Scene::default();
        let sun = shadowed_sun("sun", -Vector3::unit_y(), &mut device, &scene.settings().shadow)
            .unwrap();
        scene.add_actor(sun);
        scene.add_actor(ground_actor(Vector3::new(0.0, -1.0, 0.0)));
        render(&scene, &mut device);

        let normal = ground_draws(&device, DrawPass::Normal);
        assert_eq!(normal.len(), 1);
        assert_eq!(normal[0].diffuse_texture, Some(GRASS));
        assert_eq!(normal[0].material.uv_scale, [8.0, 8.0]);
        assert_eq!(normal[0].program, ProgramHandle(0));

        let shadow = ground_draws(&device, DrawPass::DirectionalShadow);
        assert_eq!(shadow.len(), 1);
        assert_eq!(shadow[0].diffuse_texture, None);
        assert_eq!(shadow[0].material.uv_scale, [1.0, 1.0]);
        assert_eq!(shadow[0].program, ProgramHandle(1));
    }

    #[test]
    fn test_custom_properties_stay_boundless() {
        let programs = SurfacePrograms {
            normal: ProgramHandle(0),
            shadow: ProgramHandle(1),
        };
        let terrain = TerrainSurface::new(GROUND, programs)
            .with_properties(SurfaceProperties::new(DrawStyle::Opaque));
        assert!(terrain.properties().boundless);
    }
}
